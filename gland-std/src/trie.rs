//! Segment trie over colon-delimited event names.
//!
//! Each node covers one segment position and holds:
//!
//! - static children keyed by literal segment
//! - at most one dynamic child, reached by any segment starting with `*`
//! - an optional value; a node with a value is an endpoint
//!
//! Every node gets an id on creation. Ids are never reused, so they can key
//! side tables such as [`PresenceIndex`](crate::presence::PresenceIndex).
//!
//! # Complexity
//!
//! Insert, exact lookup and remove are O(depth) in the number of segments.
//! Matching is O(depth) when no branch has to be retried.
//!
//! # Example
//!
//! ```rust
//! use gland_std::trie::EventTrie;
//!
//! let mut trie = EventTrie::new();
//! trie.insert("order:*id:paid", "handler");
//!
//! let found = trie.find("order:42:paid").unwrap();
//! assert_eq!(*found.value, "handler");
//! assert_eq!(found.params.get("id"), Some("42"));
//! assert!(trie.find("order:42:paid:late").is_none());
//! ```

use gland_core::{
    Params,
    path::{self, WILDCARD},
};
use std::collections::HashMap;

#[derive(Debug)]
struct TrieNode<V> {
    id: usize,
    statics: HashMap<String, TrieNode<V>>,
    /// Full segment text (`*` or `*name`) and the child node.
    dynamic: Option<(String, Box<TrieNode<V>>)>,
    value: Option<V>,
}

impl<V> TrieNode<V> {
    fn new(id: usize) -> Self {
        Self {
            id,
            statics: HashMap::new(),
            dynamic: None,
            value: None,
        }
    }

    fn is_prunable(&self) -> bool {
        self.value.is_none() && self.statics.is_empty() && self.dynamic.is_none()
    }

    fn child(&self, segment: &str) -> Option<&TrieNode<V>> {
        if path::is_dynamic(segment) {
            self.dynamic.as_ref().map(|(_, child)| child.as_ref())
        } else {
            self.statics.get(segment)
        }
    }

    fn child_mut(&mut self, segment: &str) -> Option<&mut TrieNode<V>> {
        if path::is_dynamic(segment) {
            self.dynamic.as_mut().map(|(_, child)| child.as_mut())
        } else {
            self.statics.get_mut(segment)
        }
    }
}

/// A successful match.
#[derive(Debug)]
pub struct Match<'a, V> {
    /// Id of the endpoint node.
    pub id: usize,
    /// Value stored at the endpoint.
    pub value: &'a V,
    /// Wildcard captures, in pattern order.
    pub params: Params,
}

/// A trie keyed by event-name segments.
#[derive(Debug)]
pub struct EventTrie<V> {
    root: TrieNode<V>,
    next_id: usize,
    size: usize,
}

impl<V> Default for EventTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> EventTrie<V> {
    /// Create an empty trie. The root has id 0.
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(0),
            next_id: 1,
            size: 0,
        }
    }

    /// Insert a value, replacing any previous value at the same pattern.
    ///
    /// Returns the endpoint id and the replaced value.
    pub fn insert(&mut self, name: &str, value: V) -> (usize, Option<V>) {
        let node = self.walk_or_create(name);
        let old = node.value.replace(value);
        let id = node.id;
        if old.is_none() {
            self.size += 1;
        }
        (id, old)
    }

    /// Get the value at `name`, inserting `default()` if there is none.
    ///
    /// This is the read-modify-write entry point for accumulating values.
    pub fn get_or_insert_with<F>(&mut self, name: &str, default: F) -> (usize, &mut V)
    where
        F: FnOnce() -> V,
    {
        let segments = path::split(name);
        let fresh = self.lookup(&segments).is_none_or(|node| node.value.is_none());
        if fresh {
            self.size += 1;
        }
        let node = self.walk_or_create(name);
        let id = node.id;
        (id, node.value.get_or_insert_with(default))
    }

    /// Look up a pattern literally: wildcard segments address the dynamic
    /// slot rather than matching anything.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.lookup(&path::split(name))?.value.as_ref()
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        let mut node = &mut self.root;
        for segment in path::split(name) {
            node = node.child_mut(segment)?;
        }
        node.value.as_mut()
    }

    /// Id of the node at a literal pattern, whether or not it is an endpoint.
    pub fn node_id(&self, name: &str) -> Option<usize> {
        self.lookup(&path::split(name)).map(|node| node.id)
    }

    /// Match a concrete event name.
    ///
    /// Static children are preferred. When a static branch dead-ends the
    /// dynamic child at the same depth is tried, binding the segment as a
    /// capture. Each wildcard matches exactly one segment.
    pub fn find(&self, name: &str) -> Option<Match<'_, V>> {
        let segments = path::split(name);
        let mut params = Params::new();
        let node = find_node(&self.root, &segments, &mut params)?;
        node.value.as_ref().map(|value| Match {
            id: node.id,
            value,
            params,
        })
    }

    /// Whether a concrete event name reaches an endpoint.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Remove the value at a literal pattern and prune now-empty nodes
    /// bottom-up. Pruning stops at the first ancestor that still has a
    /// value or other children.
    pub fn remove(&mut self, name: &str) -> Option<V> {
        let segments = path::split(name);
        let removed = remove_at(&mut self.root, &segments);
        if removed.is_some() {
            self.size -= 1;
        }
        removed
    }

    /// Endpoints at or below the node for `prefix`, as `(event name, id)`
    /// pairs in creation order.
    pub fn endpoints_under(&self, prefix: &str) -> Vec<(String, usize)> {
        let segments = path::split(prefix);
        let Some(start) = self.lookup(&segments) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut trail: Vec<&str> = segments;
        collect(start, &mut trail, &mut out);
        out.sort_by_key(|(_, id)| *id);
        out
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the trie has no endpoints.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether the trie has no nodes below the root.
    pub fn is_bare(&self) -> bool {
        self.root.statics.is_empty() && self.root.dynamic.is_none()
    }

    fn lookup(&self, segments: &[&str]) -> Option<&TrieNode<V>> {
        let mut node = &self.root;
        for segment in segments {
            node = node.child(segment)?;
        }
        Some(node)
    }

    fn walk_or_create(&mut self, name: &str) -> &mut TrieNode<V> {
        let next_id = &mut self.next_id;
        let mut node = &mut self.root;
        for segment in path::split(name) {
            if path::is_dynamic(segment) {
                let (existing, child) = node.dynamic.get_or_insert_with(|| {
                    let child = TrieNode::new(*next_id);
                    *next_id += 1;
                    (segment.to_owned(), Box::new(child))
                });
                if existing.as_str() != segment {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        kept = %existing,
                        requested = %segment,
                        "wildcard slot already named; sharing it"
                    );
                }
                node = child.as_mut();
            } else {
                node = node.statics.entry(segment.to_owned()).or_insert_with(|| {
                    let child = TrieNode::new(*next_id);
                    *next_id += 1;
                    child
                });
            }
        }
        node
    }
}

fn find_node<'a, V>(
    node: &'a TrieNode<V>,
    segments: &[&str],
    params: &mut Params,
) -> Option<&'a TrieNode<V>> {
    let Some((first, rest)) = segments.split_first() else {
        return node.value.is_some().then_some(node);
    };
    if let Some(found) = node
        .statics
        .get(*first)
        .and_then(|child| find_node(child, rest, params))
    {
        return Some(found);
    }
    let (segment, child) = node.dynamic.as_ref()?;
    params.push(segment.trim_start_matches(WILDCARD), *first);
    let found = find_node(child, rest, params);
    if found.is_none() {
        params.pop();
    }
    found
}

fn remove_at<V>(node: &mut TrieNode<V>, segments: &[&str]) -> Option<V> {
    let Some((first, rest)) = segments.split_first() else {
        return node.value.take();
    };
    let child = node.child_mut(first)?;
    let removed = remove_at(child, rest);
    if child.is_prunable() {
        if path::is_dynamic(first) {
            node.dynamic = None;
        } else {
            node.statics.remove(*first);
        }
    }
    removed
}

fn collect<'a, V>(node: &'a TrieNode<V>, trail: &mut Vec<&'a str>, out: &mut Vec<(String, usize)>) {
    if node.value.is_some() {
        out.push((path::join(trail.iter()), node.id));
    }
    for (segment, child) in &node.statics {
        trail.push(segment.as_str());
        collect(child, trail, out);
        trail.pop();
    }
    if let Some((segment, child)) = &node.dynamic {
        trail.push(segment.as_str());
        collect(child, trail, out);
        trail.pop();
    }
}
