//! Testing utilities for Gland.
//!
//! # Features
//!
//! - [`RecordingListener`]: records every payload and capture set it receives
//! - [`CountingListener`]: counts invocations and optionally replies

use gland_core::{Listener, Params, Payload};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// A listener that records every call.
///
/// # Example
///
/// ```rust
/// use gland_std::{router::EventRouter, testing::RecordingListener};
/// use gland_core::ListenFlags;
///
/// let router = EventRouter::new();
/// let recorder = RecordingListener::<u32>::new();
/// router.on("x", recorder.listener(), ListenFlags::empty()).unwrap();
/// router.emit("x", 5).unwrap();
/// assert_eq!(recorder.payloads(), vec![5]);
/// ```
pub struct RecordingListener<D> {
    calls: Arc<Mutex<Vec<(D, Params)>>>,
    reply: Option<D>,
}

impl<D: Payload> Default for RecordingListener<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Payload> RecordingListener<D> {
    /// Create a recorder that replies `None`.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply: None,
        }
    }

    /// Create a recorder that replies with `reply` on every call.
    pub fn replying(reply: D) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply: Some(reply),
        }
    }

    /// A [`Listener`] feeding this recorder. Every call returns a new handle.
    pub fn listener(&self) -> Listener<D> {
        let calls = Arc::clone(&self.calls);
        let reply = self.reply.clone();
        Arc::new(move |data: &D, params: &Params| {
            calls.lock().push((data.clone(), params.clone()));
            reply.clone()
        })
    }

    /// Payloads received, in call order.
    pub fn payloads(&self) -> Vec<D> {
        self.calls.lock().iter().map(|(d, _)| d.clone()).collect()
    }

    /// Captures received, in call order.
    pub fn params(&self) -> Vec<Params> {
        self.calls.lock().iter().map(|(_, p)| p.clone()).collect()
    }

    /// Number of calls.
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl<D> Clone for RecordingListener<D>
where
    D: Clone,
{
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
            reply: self.reply.clone(),
        }
    }
}

/// A listener that counts calls.
#[derive(Clone, Default)]
pub struct CountingListener {
    hits: Arc<AtomicUsize>,
}

impl CountingListener {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`Listener`] incrementing this counter.
    pub fn listener<D: Payload>(&self) -> Listener<D> {
        let hits = Arc::clone(&self.hits);
        Arc::new(move |_: &D, _: &Params| {
            hits.fetch_add(1, Ordering::SeqCst);
            None
        })
    }

    /// Calls so far.
    pub fn count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
