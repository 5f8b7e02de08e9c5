//! # Event Router
//!
//! Owns the [`EventTrie`] of listener sets, the [`PresenceIndex`] over its
//! node ids, and one [`EventQueue`] per event name that was emitted with
//! [`EmitFlags::QUEUE`] while nothing listened on it.
//!
//! # Per-name lifecycle
//!
//! ```text
//! no node ──on──▶ node + listeners ──off (last)──▶ no node (pruned)
//! ```
//!
//! # Dispatch
//!
//! `emit` snapshots the matching listener list, releases the lock and then
//! invokes each listener in registration order. A listener added or removed
//! while an emit is running affects later emits only. Listeners may call
//! back into the router.
//!
//! # Failure policy
//!
//! Emitting to a name with no listeners fails with
//! [`RouterError::NoListeners`] unless the emit asked for queuing, in which
//! case the event is buffered and a warning is logged. A queue bound of zero
//! turns that into [`Emitted::Dropped`].

use crate::{
    presence::PresenceIndex,
    queue::{EventQueue, QueuedEvent},
    trie::EventTrie,
};
use gland_core::{
    EmitFlags, Emitted, EventPath, ListenFlags, Listener, ListenerId, Params, Payload,
    RouterError, path, same_listener,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Queue settings for an [`EventRouter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Initial ring-buffer capacity of each pending queue.
    pub queue_capacity: usize,
    /// Maximum buffered events per name; the oldest is dropped beyond it.
    pub max_queued: Option<usize>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 16,
            max_queued: None,
        }
    }
}

struct Entry<D> {
    id: ListenerId,
    listener: Listener<D>,
}

struct RouterState<D> {
    trie: EventTrie<Vec<Entry<D>>>,
    presence: PresenceIndex,
    queues: HashMap<String, EventQueue<QueuedEvent<D>>>,
    next_seq: u64,
    config: RouterConfig,
}

impl<D: Payload> RouterState<D> {
    fn insert(&mut self, event: &str, id: ListenerId, listener: Listener<D>) -> ListenerId {
        let (node, set) = self.trie.get_or_insert_with(event, Vec::new);
        if let Some(existing) = set.iter().find(|e| same_listener(&e.listener, &listener)) {
            return existing.id;
        }
        set.push(Entry { id, listener });
        self.presence.set(node);
        id
    }

    fn retain<F>(&mut self, event: &str, keep: F) -> usize
    where
        F: FnMut(&Entry<D>) -> bool,
    {
        let Some(node) = self.trie.node_id(event) else {
            return 0;
        };
        let Some(set) = self.trie.get_mut(event) else {
            return 0;
        };
        let before = set.len();
        set.retain(keep);
        let removed = before - set.len();
        if set.is_empty() {
            self.trie.remove(event);
            self.presence.clear(node);
            if let Some(queue) = self.queues.remove(&path::normalize(event)) {
                #[cfg(feature = "tracing")]
                tracing::debug!(event, discarded = queue.len(), "discarding pending queue");
                drop(queue);
            }
        }
        removed
    }

    /// Live listeners for a concrete name, with captures.
    fn snapshot(&self, event: &str) -> Option<(Vec<Listener<D>>, Params)> {
        let found = self.trie.find(event)?;
        if !self.presence.get(found.id) {
            return None;
        }
        let listeners = found.value.iter().map(|e| e.listener.clone()).collect();
        Some((listeners, found.params))
    }

    fn enqueue(&mut self, event: &str, data: D) -> Result<Emitted, RouterError> {
        if self.config.max_queued == Some(0) {
            #[cfg(feature = "tracing")]
            tracing::warn!(event, "no listeners and queuing disabled; event dropped");
            return Ok(Emitted::Dropped);
        }
        let name = path::normalize(event);
        let seq = self.next_seq;
        self.next_seq += 1;
        let config = self.config;
        let queue = self
            .queues
            .entry(name.clone())
            .or_insert_with(|| EventQueue::with_capacity(config.queue_capacity, config.max_queued));
        let evicted = queue.enqueue(QueuedEvent { name, data, seq })?;
        #[cfg(feature = "tracing")]
        {
            tracing::warn!(event, pending = queue.len(), "no listeners; event queued");
            if let Some(old) = &evicted {
                tracing::warn!(event, dropped_seq = old.seq, "queue full; dropped oldest event");
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (event, queue);
        drop(evicted);
        Ok(Emitted::Queued)
    }

    /// Detach every queue whose name `pattern` now matches.
    fn take_matching_queues(&mut self, pattern: &EventPath) -> Vec<EventQueue<QueuedEvent<D>>> {
        let names: Vec<String> = self
            .queues
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect();
        names
            .iter()
            .filter_map(|name| self.queues.remove(name))
            .collect()
    }
}

/// Handle to a listener registration.
///
/// Dropping the handle leaves the listener registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
pub struct Subscription<D> {
    state: Weak<Mutex<RouterState<D>>>,
    event: String,
    id: ListenerId,
}

impl<D: Payload> Subscription<D> {
    /// Id of the registration.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Event name the listener is registered under.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Remove this registration. Returns whether it was still registered.
    pub fn unsubscribe(self) -> bool {
        match self.state.upgrade() {
            Some(state) => EventRouter { state }.remove_id(&self.event, self.id),
            None => false,
        }
    }
}

impl<D> std::fmt::Debug for Subscription<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}

/// The event routing engine.
///
/// Cloning is cheap; clones share the same trie and queues.
pub struct EventRouter<D> {
    state: Arc<Mutex<RouterState<D>>>,
}

impl<D> Clone for EventRouter<D> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<D: Payload> Default for EventRouter<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Payload> EventRouter<D> {
    /// Create a router with default queue settings.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router with explicit queue settings.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(RouterState {
                trie: EventTrie::new(),
                presence: PresenceIndex::new(),
                queues: HashMap::new(),
                next_seq: 0,
                config,
            })),
        }
    }

    /// Register a listener.
    ///
    /// Listeners at one path accumulate in registration order; registering
    /// the same [`Listener`] handle twice keeps a single registration.
    ///
    /// With [`ListenFlags::QUEUE`], events buffered under names this pattern
    /// matches are replayed oldest-first before returning. With
    /// [`ListenFlags::ONCE`], the listener removes itself on first call.
    pub fn on(
        &self,
        event: &str,
        listener: Listener<D>,
        flags: ListenFlags,
    ) -> Result<Subscription<D>, RouterError> {
        let pattern = EventPath::parse(event);
        if pattern.is_root() {
            return Err(RouterError::EmptyEventName);
        }
        let name = pattern.to_string();
        let id = ListenerId::next();
        let listener = if flags.contains(ListenFlags::ONCE) {
            self.once_shim(&name, id, listener)
        } else {
            listener
        };

        let (id, pending) = {
            let mut state = self.state.lock();
            let id = state.insert(&name, id, listener);
            let pending = if flags.contains(ListenFlags::QUEUE) {
                state.take_matching_queues(&pattern)
            } else {
                Vec::new()
            };
            (id, pending)
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(event = %name, listener = id.get(), "listener registered");

        if !pending.is_empty() {
            self.replay(pending)?;
        }

        Ok(Subscription {
            state: Arc::downgrade(&self.state),
            event: name,
            id,
        })
    }

    /// Register a listener that fires at most once.
    pub fn once(&self, event: &str, listener: Listener<D>) -> Result<Subscription<D>, RouterError> {
        self.on(event, listener, ListenFlags::ONCE)
    }

    /// Remove one listener, or every listener at `event` when `listener` is
    /// `None`. Returns how many registrations were removed.
    ///
    /// When the last listener at a path goes, its node is pruned and any
    /// pending queue for that name is discarded.
    pub fn off(&self, event: &str, listener: Option<&Listener<D>>) -> usize {
        let removed = {
            let mut state = self.state.lock();
            match listener {
                Some(target) => state.retain(event, |e| !same_listener(&e.listener, target)),
                None => state.retain(event, |_| false),
            }
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(event, removed, "listeners removed");
        removed
    }

    /// Remove a single registration by id.
    pub fn remove_id(&self, event: &str, id: ListenerId) -> bool {
        self.state.lock().retain(event, |e| e.id != id) > 0
    }

    /// Emit an event without queuing.
    pub fn emit(&self, event: &str, data: D) -> Result<Emitted, RouterError> {
        self.emit_with(event, data, EmitFlags::empty())
    }

    /// Emit an event.
    ///
    /// Listeners run synchronously, in registration order, with the
    /// payload and the wildcard captures of the match.
    pub fn emit_with(
        &self,
        event: &str,
        data: D,
        flags: EmitFlags,
    ) -> Result<Emitted, RouterError> {
        if path::split(event).is_empty() {
            return Err(RouterError::EmptyEventName);
        }
        let snapshot = {
            let mut state = self.state.lock();
            match state.snapshot(event) {
                Some(snapshot) => snapshot,
                None if flags.contains(EmitFlags::QUEUE) => {
                    return state.enqueue(event, data);
                }
                None => return Err(RouterError::NoListeners(event.to_owned())),
            }
        };

        let (listeners, params) = snapshot;
        #[cfg(feature = "tracing")]
        tracing::trace!(event, listeners = listeners.len(), "dispatching");
        for listener in &listeners {
            let _ = listener(&data, &params);
        }
        Ok(Emitted::Delivered(listeners.len()))
    }

    /// Invoke every listener matching `event` and collect their replies in
    /// registration order. No listeners yields an empty list.
    pub fn collect(&self, event: &str, data: &D) -> Vec<D> {
        let Some((listeners, params)) = self.state.lock().snapshot(event) else {
            return Vec::new();
        };
        listeners
            .iter()
            .filter_map(|listener| listener(data, &params))
            .collect()
    }

    /// Listeners an emit of `event` would invoke.
    pub fn listeners(&self, event: &str) -> Vec<Listener<D>> {
        self.state
            .lock()
            .snapshot(event)
            .map(|(listeners, _)| listeners)
            .unwrap_or_default()
    }

    /// Whether an emit of `event` would reach a listener.
    pub fn has_listeners(&self, event: &str) -> bool {
        self.state.lock().snapshot(event).is_some()
    }

    /// Whether any listener is registered anywhere.
    pub fn is_idle(&self) -> bool {
        !self.state.lock().presence.any()
    }

    /// Event names with listeners at or below `prefix`, in registration
    /// order of their nodes.
    pub fn events_by_prefix(&self, prefix: &str) -> Vec<String> {
        let state = self.state.lock();
        let Some(start) = state.trie.node_id(prefix) else {
            return Vec::new();
        };
        // Descendants are created after their ancestors, so their ids are larger.
        if !state.presence.has_any_in_range(start, usize::MAX) {
            return Vec::new();
        }
        state
            .trie
            .endpoints_under(prefix)
            .into_iter()
            .filter(|(_, id)| state.presence.get(*id))
            .map(|(name, _)| name)
            .collect()
    }

    /// Number of events buffered under a concrete name.
    pub fn pending(&self, event: &str) -> usize {
        self.state
            .lock()
            .queues
            .get(&path::normalize(event))
            .map_or(0, EventQueue::len)
    }

    /// Discard every pending queue.
    pub fn clear_queues(&self) {
        let mut state = self.state.lock();
        for queue in state.queues.values_mut() {
            queue.clear();
        }
        state.queues.clear();
    }

    fn once_shim(&self, event: &str, id: ListenerId, listener: Listener<D>) -> Listener<D> {
        let state = Arc::downgrade(&self.state);
        let event = event.to_owned();
        let fired = AtomicBool::new(false);
        Arc::new(move |data: &D, params: &Params| {
            if fired.swap(true, Ordering::AcqRel) {
                return None;
            }
            if let Some(state) = state.upgrade() {
                EventRouter { state }.remove_id(&event, id);
            }
            listener(data, params)
        })
    }

    fn replay(&self, queues: Vec<EventQueue<QueuedEvent<D>>>) -> Result<(), RouterError> {
        let mut events = Vec::new();
        for mut queue in queues {
            for item in queue.drain() {
                events.push(item?);
            }
        }
        events.sort_by_key(|event| event.seq);

        #[cfg(feature = "tracing")]
        tracing::debug!(replayed = events.len(), "draining pending events");

        for QueuedEvent { name, data, .. } in events {
            self.emit_with(&name, data, EmitFlags::QUEUE)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gland_core::{listener, responder};
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Listener<u32>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        (
            hits,
            listener(move |_: &u32, _| {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn test_on_emit_off() {
        let router = EventRouter::new();
        let (hits, l) = counter();
        router.on("user:created", l.clone(), ListenFlags::empty()).unwrap();

        assert_eq!(router.emit("user:created", 1), Ok(Emitted::Delivered(1)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert_eq!(router.off("user:created", Some(&l)), 1);
        assert!(!router.has_listeners("user:created"));
        assert!(router.is_idle());
    }

    #[test]
    fn test_emit_without_listener_fails() {
        let router: EventRouter<u32> = EventRouter::new();
        assert_eq!(
            router.emit("y", 0),
            Err(RouterError::NoListeners("y".to_string()))
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let router: EventRouter<u32> = EventRouter::new();
        let (_, l) = counter();
        assert_eq!(
            router.on("::", l, ListenFlags::empty()).unwrap_err(),
            RouterError::EmptyEventName
        );
        assert_eq!(router.emit("", 0), Err(RouterError::EmptyEventName));
    }

    #[test]
    fn test_listeners_accumulate_and_dedupe() {
        let router = EventRouter::new();
        let (_, a) = counter();
        let (_, b) = counter();
        let first = router.on("x", a.clone(), ListenFlags::empty()).unwrap();
        let again = router.on("x", a.clone(), ListenFlags::empty()).unwrap();
        router.on("x", b, ListenFlags::empty()).unwrap();

        assert_eq!(first.id(), again.id());
        assert_eq!(router.listeners("x").len(), 2);
    }

    #[test]
    fn test_off_all() {
        let router = EventRouter::new();
        for _ in 0..3 {
            let (_, l) = counter();
            router.on("x", l, ListenFlags::empty()).unwrap();
        }
        assert_eq!(router.off("x", None), 3);
        assert!(router.emit("x", 0).is_err());
    }

    #[test]
    fn test_wildcard_params_reach_listener() {
        let router = EventRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        router
            .on(
                "order:*id:paid",
                listener(move |amount: &u32, params| {
                    s.lock().push((params.get("id").map(str::to_owned), *amount));
                }),
                ListenFlags::empty(),
            )
            .unwrap();

        router.emit("order:17:paid", 250).unwrap();
        assert_eq!(*seen.lock(), vec![(Some("17".to_string()), 250)]);
    }

    #[test]
    fn test_once_fires_once_even_when_reentrant() {
        let router = EventRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let inner = router.clone();
        router
            .once(
                "tick",
                listener(move |_: &u32, _| {
                    h.fetch_add(1, Ordering::SeqCst);
                    let _ = inner.emit("tick", 0);
                }),
            )
            .unwrap();

        router.emit("tick", 0).unwrap();
        assert!(router.emit("tick", 0).is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_snapshot_isolates_in_flight_registration() {
        let router = EventRouter::new();
        let (late_hits, late) = counter();
        let inner = router.clone();
        router
            .on(
                "x",
                listener(move |_: &u32, _| {
                    let _ = inner.on("x", late.clone(), ListenFlags::empty());
                }),
                ListenFlags::empty(),
            )
            .unwrap();

        assert_eq!(router.emit("x", 0), Ok(Emitted::Delivered(1)));
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);
        assert_eq!(router.emit("x", 0), Ok(Emitted::Delivered(2)));
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_queued_event_replays_on_queue_listen() {
        let router = EventRouter::new();
        assert_eq!(router.emit_with("x", 7, EmitFlags::QUEUE), Ok(Emitted::Queued));
        assert_eq!(router.pending("x"), 1);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        router
            .on("x", listener(move |n: &u32, _| s.lock().push(*n)), ListenFlags::QUEUE)
            .unwrap();

        assert_eq!(*seen.lock(), vec![7]);
        assert_eq!(router.pending("x"), 0);
    }

    #[test]
    fn test_plain_listen_leaves_queue_alone() {
        let router = EventRouter::new();
        router.emit_with("x", 1, EmitFlags::QUEUE).unwrap();
        let (hits, l) = counter();
        router.on("x", l, ListenFlags::empty()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(router.pending("x"), 1);

        router.off("x", None);
        assert_eq!(router.pending("x"), 0);
    }

    #[test]
    fn test_wildcard_listener_drains_matching_queues_in_order() {
        let router = EventRouter::new();
        router.emit_with("job:b:done", 2, EmitFlags::QUEUE).unwrap();
        router.emit_with("job:a:done", 1, EmitFlags::QUEUE).unwrap();
        router.emit_with("job:b:done", 3, EmitFlags::QUEUE).unwrap();
        router.emit_with("other", 9, EmitFlags::QUEUE).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        router
            .on(
                "job:*:done",
                listener(move |n: &u32, _| s.lock().push(*n)),
                ListenFlags::QUEUE,
            )
            .unwrap();

        assert_eq!(*seen.lock(), vec![2, 1, 3]);
        assert_eq!(router.pending("other"), 1);
    }

    #[test]
    fn test_bounded_queue_drops_oldest() {
        let router = EventRouter::with_config(RouterConfig {
            queue_capacity: 4,
            max_queued: Some(2),
        });
        for n in 0..5 {
            router.emit_with("x", n, EmitFlags::QUEUE).unwrap();
        }
        assert_eq!(router.pending("x"), 2);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        router
            .on("x", listener(move |n: &u32, _| s.lock().push(*n)), ListenFlags::QUEUE)
            .unwrap();
        assert_eq!(*seen.lock(), vec![3, 4]);
    }

    #[test]
    fn test_zero_bound_reports_drop() {
        let router = EventRouter::with_config(RouterConfig {
            queue_capacity: 4,
            max_queued: Some(0),
        });
        assert_eq!(router.emit_with("x", 1, EmitFlags::QUEUE), Ok(Emitted::Dropped));
        assert_eq!(router.pending("x"), 0);
        assert!(router.state.lock().queues.is_empty());

        let (hits, l) = counter();
        router.on("x", l, ListenFlags::QUEUE).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_collect_skips_silent_listeners() {
        let router = EventRouter::new();
        let (_, silent) = counter();
        router.on("q", silent, ListenFlags::empty()).unwrap();
        router
            .on("q", responder(|n: &u32, _| Some(n + 1)), ListenFlags::empty())
            .unwrap();

        assert_eq!(router.collect("q", &1), vec![2]);
        assert!(router.collect("none", &1).is_empty());
    }

    #[test]
    fn test_events_by_prefix_skips_dead_nodes() {
        let router = EventRouter::new();
        let (_, a) = counter();
        let (_, b) = counter();
        router.on("user:created", a, ListenFlags::empty()).unwrap();
        router.on("user:updated", b.clone(), ListenFlags::empty()).unwrap();
        router.off("user:updated", Some(&b));

        assert_eq!(router.events_by_prefix("user"), vec!["user:created"]);
        assert!(router.events_by_prefix("order").is_empty());
    }

    #[test]
    fn test_subscription_unsubscribe() {
        let router = EventRouter::new();
        let (_, l) = counter();
        let sub = router.on("x", l, ListenFlags::empty()).unwrap();
        assert_eq!(sub.event(), "x");
        assert!(sub.unsubscribe());
        assert!(!router.has_listeners("x"));
    }

    #[test]
    fn test_clear_queues() {
        let router: EventRouter<u32> = EventRouter::new();
        router.emit_with("a", 1, EmitFlags::QUEUE).unwrap();
        router.emit_with("b", 2, EmitFlags::QUEUE).unwrap();
        router.clear_queues();
        assert_eq!(router.pending("a") + router.pending("b"), 0);
    }
}
