//! Broker identifiers.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a broker in a connection graph.
///
/// Cloning is O(1); the name is shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BrokerId(Arc<str>);

impl BrokerId {
    /// Create an id from an explicit name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Allocate a fresh `broker-N` id, unique within the process.
    pub fn generate() -> Self {
        let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self(Arc::from(format!("broker-{n}")))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BrokerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for BrokerId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}
