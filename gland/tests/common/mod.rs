#![allow(dead_code)]

use gland::{Broker, Listener, Params, listener};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Test Payloads
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserEvent {
    pub id: u64,
    pub name: String,
}

impl UserEvent {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

// ============================================================================
// Test Listeners
// ============================================================================

/// Counts invocations across clones.
#[derive(Clone, Default)]
pub struct Hits(pub Arc<AtomicUsize>);

impl Hits {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn listener<D: gland::Payload>(&self) -> Listener<D> {
        let hits = self.0.clone();
        listener(move |_: &D, _: &Params| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// Records `(tag, payload)` pairs so tests can check cross-listener order.
#[derive(Clone, Default)]
pub struct Journal<D>(pub Arc<Mutex<Vec<(&'static str, D)>>>);

impl<D: gland::Payload> Journal<D> {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn listener(&self, tag: &'static str) -> Listener<D> {
        let log = self.0.clone();
        listener(move |data: &D, _: &Params| log.lock().push((tag, data.clone())))
    }

    pub fn entries(&self) -> Vec<(&'static str, D)> {
        self.0.lock().clone()
    }
}

pub fn pair<D: gland::Payload>() -> (Broker<D>, Broker<D>) {
    let a = Broker::new();
    let b = Broker::new();
    a.connect_to(&b).unwrap();
    (a, b)
}
