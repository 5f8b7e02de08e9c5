//! Namespaced views over a [`Broker`].
//!
//! A channel named `user` turns `emit("created", ..)` into
//! `emit("user:created", ..)`. Methods that address the channel's own name
//! are separate (`emit_root`, `on_root`) rather than inferred from
//! arguments. Channels hold no state beyond their name.

use crate::broker::Broker;
use gland_core::{
    Collected, EmitFlags, Emitted, ListenFlags, Listener, Params, Payload, RouterError, Strategy,
    path,
};
use gland_std::router::Subscription;
use std::sync::Arc;

/// A broker view scoped to one event-name prefix.
pub struct Channel<D> {
    broker: Broker<D>,
    name: Arc<str>,
}

impl<D> Clone for Channel<D> {
    fn clone(&self) -> Self {
        Self {
            broker: self.broker.clone(),
            name: Arc::clone(&self.name),
        }
    }
}

impl<D> std::fmt::Debug for Channel<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").field("name", &self.name).finish()
    }
}

impl<D: Payload> Channel<D> {
    pub(crate) fn new(broker: Broker<D>, name: Arc<str>) -> Self {
        Self { broker, name }
    }

    /// The channel prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    /// The broker this channel forwards to.
    pub fn broker(&self) -> &Broker<D> {
        &self.broker
    }

    /// Fully qualified name of a sub-event.
    pub fn event(&self, sub: &str) -> String {
        path::qualify(&self.name, sub)
    }

    /// A nested channel, `name:sub`.
    pub fn channel(&self, sub: &str) -> Channel<D> {
        self.broker.channel(&self.event(sub))
    }

    /// Emit `name:sub`.
    pub fn emit(&self, sub: &str, data: D) -> Result<Emitted, RouterError> {
        self.broker.emit(&self.event(sub), data)
    }

    /// Emit `name:sub` with options.
    pub fn emit_with(&self, sub: &str, data: D, flags: EmitFlags) -> Result<Emitted, RouterError> {
        self.broker.emit_with(&self.event(sub), data, flags)
    }

    /// Emit the channel's own name.
    pub fn emit_root(&self, data: D) -> Result<Emitted, RouterError> {
        self.broker.emit(&self.name, data)
    }

    /// Listen on `name:sub`.
    pub fn on<F>(&self, sub: &str, f: F) -> Result<Subscription<D>, RouterError>
    where
        F: Fn(&D, &Params) + Send + Sync + 'static,
    {
        self.broker.on(&self.event(sub), f)
    }

    /// Listen on `name:sub` with a listener handle and options.
    pub fn on_with(
        &self,
        sub: &str,
        listener: Listener<D>,
        flags: ListenFlags,
    ) -> Result<Subscription<D>, RouterError> {
        self.broker.on_with(&self.event(sub), listener, flags)
    }

    /// Listen on the channel's own name.
    pub fn on_root<F>(&self, f: F) -> Result<Subscription<D>, RouterError>
    where
        F: Fn(&D, &Params) + Send + Sync + 'static,
    {
        self.broker.on(&self.name, f)
    }

    /// Listen once on `name:sub`.
    pub fn once<F>(&self, sub: &str, f: F) -> Result<Subscription<D>, RouterError>
    where
        F: Fn(&D, &Params) + Send + Sync + 'static,
    {
        self.broker.once(&self.event(sub), f)
    }

    /// Remove a listener handle from `name:sub`.
    pub fn off(&self, sub: &str, listener: &Listener<D>) -> usize {
        self.broker.off(&self.event(sub), listener)
    }

    /// Remove every listener from `name:sub`.
    pub fn off_all(&self, sub: &str) -> usize {
        self.broker.off_all(&self.event(sub))
    }

    /// Register a responder on `name:sub`.
    pub fn respond<F>(&self, sub: &str, f: F) -> Result<Subscription<D>, RouterError>
    where
        F: Fn(&D, &Params) -> Option<D> + Send + Sync + 'static,
    {
        self.broker.respond(&self.event(sub), f)
    }

    /// Request on `name:sub`.
    pub fn request(&self, sub: &str, data: D, strategy: Strategy) -> Collected<D> {
        self.broker.request(&self.event(sub), data, strategy)
    }

    /// Emit to every event with listeners under this channel.
    pub fn broadcast(&self, data: D) -> usize {
        self.broker.broadcast(&self.name, data)
    }

    /// Whether `name:sub` has listeners.
    pub fn has_listeners(&self, sub: &str) -> bool {
        self.broker.has_listeners(&self.event(sub))
    }
}
