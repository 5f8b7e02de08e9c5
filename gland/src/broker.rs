//! # Broker
//!
//! The application-facing event object. A broker wraps one
//! [`EventRouter`] and adds:
//!
//! - request/response on top of emit/listen ([`respond`](Broker::respond),
//!   [`request`](Broker::request))
//! - fan-out by topic prefix ([`broadcast`](Broker::broadcast))
//! - namespaced views ([`channel`](Broker::channel))
//! - an undirected connection graph between brokers, with point-to-point
//!   ([`emit_to`](Broker::emit_to)) and one-to-many
//!   ([`broadcast_to`](Broker::broadcast_to), [`relay_to`](Broker::relay_to))
//!   delivery
//!
//! Brokers are explicit values: build one, clone the handle where needed.
//! Peers are held by id through weak handles, so a fully connected graph of
//! brokers still frees each broker when its last handle goes.

use crate::{channel::Channel, config::BrokerConfig};
use gland_core::{
    BrokerError, BrokerId, Collected, EmitFlags, Emitted, ListenFlags, Listener, Params, Payload,
    RouterError, Strategy, listener, path, responder,
};
use gland_std::router::{EventRouter, Subscription};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

struct Shared<D> {
    id: BrokerId,
    router: EventRouter<D>,
    peers: Mutex<HashMap<BrokerId, Weak<Shared<D>>>>,
    channels: Mutex<HashMap<String, Arc<str>>>,
}

/// Event broker handle. Clones share the same broker.
pub struct Broker<D> {
    shared: Arc<Shared<D>>,
}

impl<D> Clone for Broker<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D> fmt::Debug for Broker<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("id", &self.shared.id)
            .field("peers", &self.shared.peers.lock().len())
            .finish()
    }
}

impl<D: Payload> Default for Broker<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Payload> Broker<D> {
    /// Create a broker with a generated id and default settings.
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::default())
    }

    /// Create a broker from a configuration.
    pub fn with_config(config: BrokerConfig) -> Self {
        let (id, router) = config.into_parts();
        Self {
            shared: Arc::new(Shared {
                id,
                router: EventRouter::with_config(router),
                peers: Mutex::new(HashMap::new()),
                channels: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// This broker's id.
    pub fn id(&self) -> &BrokerId {
        &self.shared.id
    }

    /// The underlying router.
    pub fn router(&self) -> &EventRouter<D> {
        &self.shared.router
    }

    // ------------------------------------------------------------------
    // Local emit / listen
    // ------------------------------------------------------------------

    /// Register a listener.
    pub fn on<F>(&self, event: &str, f: F) -> Result<Subscription<D>, RouterError>
    where
        F: Fn(&D, &Params) + Send + Sync + 'static,
    {
        self.on_with(event, listener(f), ListenFlags::empty())
    }

    /// Register a listener handle with options.
    ///
    /// Passing the same handle again at the same event is a no-op.
    pub fn on_with(
        &self,
        event: &str,
        listener: Listener<D>,
        flags: ListenFlags,
    ) -> Result<Subscription<D>, RouterError> {
        self.shared.router.on(event, listener, flags)
    }

    /// Register a listener that fires at most once.
    pub fn once<F>(&self, event: &str, f: F) -> Result<Subscription<D>, RouterError>
    where
        F: Fn(&D, &Params) + Send + Sync + 'static,
    {
        self.on_with(event, listener(f), ListenFlags::ONCE)
    }

    /// Remove one listener handle from `event`.
    pub fn off(&self, event: &str, listener: &Listener<D>) -> usize {
        self.shared.router.off(event, Some(listener))
    }

    /// Remove every listener registered at `event`.
    pub fn off_all(&self, event: &str) -> usize {
        self.shared.router.off(event, None)
    }

    /// Emit an event. Fails if nothing listens on it.
    pub fn emit(&self, event: &str, data: D) -> Result<Emitted, RouterError> {
        self.shared.router.emit(event, data)
    }

    /// Emit an event with options, e.g. [`EmitFlags::QUEUE`].
    pub fn emit_with(
        &self,
        event: &str,
        data: D,
        flags: EmitFlags,
    ) -> Result<Emitted, RouterError> {
        self.shared.router.emit_with(event, data, flags)
    }

    /// Listeners an emit of `event` would invoke.
    pub fn listeners(&self, event: &str) -> Vec<Listener<D>> {
        self.shared.router.listeners(event)
    }

    /// Whether an emit of `event` would reach a listener.
    pub fn has_listeners(&self, event: &str) -> bool {
        self.shared.router.has_listeners(event)
    }

    /// Event names with listeners at or below `prefix`.
    pub fn events_by_prefix(&self, prefix: &str) -> Vec<String> {
        self.shared.router.events_by_prefix(prefix)
    }

    /// Number of events buffered for `event`.
    pub fn pending(&self, event: &str) -> usize {
        self.shared.router.pending(event)
    }

    /// Drop every buffered event.
    pub fn clear_queues(&self) {
        self.shared.router.clear_queues();
    }

    // ------------------------------------------------------------------
    // Request / response
    // ------------------------------------------------------------------

    /// Register a responder whose `Some` replies feed [`request`](Self::request).
    pub fn respond<F>(&self, event: &str, f: F) -> Result<Subscription<D>, RouterError>
    where
        F: Fn(&D, &Params) -> Option<D> + Send + Sync + 'static,
    {
        self.on_with(event, responder(f), ListenFlags::empty())
    }

    /// Invoke every listener at `event` and aggregate the replies.
    ///
    /// Unlike [`emit`](Self::emit), no listeners is not an error: the result
    /// is `One(None)` or `All([])`.
    pub fn request(&self, event: &str, data: D, strategy: Strategy) -> Collected<D> {
        let replies = self.shared.router.collect(event, &data);
        Collected::from_replies(strategy, replies)
    }

    // ------------------------------------------------------------------
    // Namespacing and fan-out
    // ------------------------------------------------------------------

    /// A view that qualifies event names with `name:`.
    pub fn channel(&self, name: &str) -> Channel<D> {
        let key = path::normalize(name);
        let interned = Arc::clone(
            self.shared
                .channels
                .lock()
                .entry(key)
                .or_insert_with_key(|key| Arc::from(key.as_str())),
        );
        Channel::new(self.clone(), interned)
    }

    /// Emit `data` to every event with listeners at or below `prefix`.
    ///
    /// Returns how many events were reached.
    pub fn broadcast(&self, prefix: &str, data: D) -> usize {
        let mut reached = 0;
        for event in self.events_by_prefix(prefix) {
            match self.emit(&event, data.clone()) {
                Ok(_) => reached += 1,
                Err(_err) => {
                    // Listener went away between lookup and emit.
                    #[cfg(feature = "tracing")]
                    tracing::debug!(event = %event, error = %_err, "broadcast target vanished");
                }
            }
        }
        reached
    }

    // ------------------------------------------------------------------
    // Connection graph
    // ------------------------------------------------------------------

    /// Connect to another broker. Both sides see each other afterwards.
    ///
    /// Connecting an already connected pair is a no-op. A different broker
    /// reusing a connected peer's id is rejected with
    /// [`BrokerError::DuplicateId`].
    pub fn connect_to(&self, other: &Broker<D>) -> Result<(), BrokerError> {
        if Arc::ptr_eq(&self.shared, &other.shared) || self.id() == other.id() {
            return Err(BrokerError::SelfConnect(self.id().clone()));
        }
        if self.holds_other(other) {
            return Err(BrokerError::DuplicateId(other.id().clone()));
        }
        if other.holds_other(self) {
            return Err(BrokerError::DuplicateId(self.id().clone()));
        }
        self.link(other);
        other.link(self);
        #[cfg(feature = "tracing")]
        tracing::debug!(from = %self.id(), to = %other.id(), "brokers connected");
        Ok(())
    }

    /// Disconnect from a peer, on both sides. Returns whether it was connected.
    pub fn disconnect(&self, id: &BrokerId) -> bool {
        let Some(peer) = self.shared.peers.lock().remove(id) else {
            return false;
        };
        if let Some(peer) = peer.upgrade() {
            let mut back = peer.peers.lock();
            if back
                .get(self.id())
                .is_some_and(|link| Weak::ptr_eq(link, &Arc::downgrade(&self.shared)))
            {
                back.remove(self.id());
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(from = %self.id(), to = %id, "brokers disconnected");
        true
    }

    /// Ids of live peers, sorted.
    pub fn connections(&self) -> Vec<BrokerId> {
        let mut ids: Vec<BrokerId> = self
            .live_peers()
            .into_iter()
            .map(|p| p.id().clone())
            .collect();
        ids.sort();
        ids
    }

    /// Whether `id` is a live peer.
    pub fn is_connected_to(&self, id: &BrokerId) -> bool {
        self.peer(id).is_ok()
    }

    /// Emit on one peer.
    pub fn emit_to(&self, id: &BrokerId, event: &str, data: D) -> Result<Emitted, BrokerError> {
        Ok(self.peer(id)?.emit(event, data)?)
    }

    /// Request from one peer.
    pub fn request_to(
        &self,
        id: &BrokerId,
        event: &str,
        data: D,
        strategy: Strategy,
    ) -> Result<Collected<D>, BrokerError> {
        Ok(self.peer(id)?.request(event, data, strategy))
    }

    /// Emit on every peer. Returns how many peers had listeners.
    pub fn broadcast_to(&self, event: &str, data: D) -> usize {
        self.relay_to(event, data, None)
    }

    /// Emit on every peer except `exclude`, typically the peer the event
    /// came from. Returns how many peers had listeners.
    pub fn relay_to(&self, event: &str, data: D, exclude: Option<&BrokerId>) -> usize {
        let mut delivered = 0;
        for peer in self.live_peers() {
            if exclude == Some(peer.id()) {
                continue;
            }
            match peer.emit(event, data.clone()) {
                Ok(_) => delivered += 1,
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(peer = %peer.id(), event, error = %_err, "peer skipped");
                }
            }
        }
        delivered
    }

    /// Forward every local `event` to a connected peer under the same name.
    ///
    /// Wildcards in `event` are filled with the captured segments, so piping
    /// `"job:*:done"` forwards `"job:7:done"` as `"job:7:done"`. Forwarding
    /// stops silently once the peer is disconnected.
    pub fn pipe_to(&self, event: &str, id: &BrokerId) -> Result<Subscription<D>, BrokerError> {
        self.peer(id)?;
        let source = Arc::downgrade(&self.shared);
        let target = id.clone();
        let pattern = path::normalize(event);
        let forward = listener(move |data: &D, params: &Params| {
            let Some(shared) = source.upgrade() else {
                return;
            };
            let name = instantiate(&pattern, params);
            if let Err(_err) = (Broker { shared }).emit_to(&target, &name, data.clone()) {
                #[cfg(feature = "tracing")]
                tracing::debug!(event = %name, peer = %target, error = %_err, "pipe dropped event");
            }
        });
        Ok(self.on_with(event, forward, ListenFlags::empty())?)
    }

    /// Whether a live peer other than `other` is registered under its id.
    fn holds_other(&self, other: &Broker<D>) -> bool {
        self.shared
            .peers
            .lock()
            .get(other.id())
            .and_then(Weak::upgrade)
            .is_some_and(|peer| !Arc::ptr_eq(&peer, &other.shared))
    }

    fn link(&self, other: &Broker<D>) {
        self.shared
            .peers
            .lock()
            .insert(other.id().clone(), Arc::downgrade(&other.shared));
    }

    fn peer(&self, id: &BrokerId) -> Result<Broker<D>, BrokerError> {
        let mut peers = self.shared.peers.lock();
        match peers.get(id).map(Weak::upgrade) {
            Some(Some(shared)) => Ok(Broker { shared }),
            Some(None) => {
                peers.remove(id);
                Err(BrokerError::NotConnected(id.clone()))
            }
            None => Err(BrokerError::NotConnected(id.clone())),
        }
    }

    fn live_peers(&self) -> Vec<Broker<D>> {
        let mut peers = self.shared.peers.lock();
        peers.retain(|_, peer| peer.strong_count() > 0);
        peers
            .values()
            .filter_map(Weak::upgrade)
            .map(|shared| Broker { shared })
            .collect()
    }
}

/// Fill the wildcard segments of `pattern` with captures, in order.
fn instantiate(pattern: &str, params: &Params) -> String {
    let mut captures = params.iter().map(|(_, value)| value);
    path::join(path::split(pattern).into_iter().map(|segment| {
        if path::is_dynamic(segment) {
            captures.next().unwrap_or(segment)
        } else {
            segment
        }
    }))
}
