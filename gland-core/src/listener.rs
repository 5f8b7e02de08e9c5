//! # Listener handles
//!
//! A listener is any `Fn(&D, &Params)` callback. Responders additionally
//! return `Option<D>`, which `request` collects. Both kinds are stored as the
//! same type-erased [`Listener`] so they can share one node in the trie.
//!
//! # Identity
//!
//! Listener sets collapse duplicates by `Arc` pointer identity. Register the
//! same [`Listener`] twice at one path and the second call is a no-op; wrap
//! the same closure twice and you get two listeners.

use crate::{params::Params, payload::Payload};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A type-erased, shareable listener callback.
pub type Listener<D> = Arc<dyn Fn(&D, &Params) -> Option<D> + Send + Sync>;

/// Wrap a fire-and-forget callback as a [`Listener`].
pub fn listener<D, F>(f: F) -> Listener<D>
where
    D: Payload,
    F: Fn(&D, &Params) + Send + Sync + 'static,
{
    Arc::new(move |data: &D, params: &Params| {
        f(data, params);
        None
    })
}

/// Wrap a value-returning callback as a [`Listener`].
pub fn responder<D, F>(f: F) -> Listener<D>
where
    D: Payload,
    F: Fn(&D, &Params) -> Option<D> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Whether two handles refer to the same listener.
pub fn same_listener<D>(a: &Listener<D>, b: &Listener<D>) -> bool {
    Arc::ptr_eq(a, b)
}

/// Identifier of one listener registration.
///
/// Ids are allocated from a process-wide counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate the next id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}
