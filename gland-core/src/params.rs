//! Wildcard captures produced by trie matching.

/// Segments bound to wildcards while matching an event name.
///
/// Captures keep the order of the wildcards in the pattern. A bare `*`
/// captures with an empty name and is only reachable by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    captures: Vec<(String, String)>,
}

impl Params {
    /// Create an empty capture set.
    pub const fn new() -> Self {
        Self {
            captures: Vec::new(),
        }
    }

    /// Record a capture.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.captures.push((name.into(), value.into()));
    }

    /// Drop the most recent capture. Used when matching backtracks.
    pub fn pop(&mut self) -> Option<(String, String)> {
        self.captures.pop()
    }

    /// Look up a named capture.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|(n, _)| !n.is_empty() && n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a capture by position.
    pub fn get_index(&self, index: usize) -> Option<&str> {
        self.captures.get(index).map(|(_, v)| v.as_str())
    }

    /// Number of captures.
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// Iterate `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.captures.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}
