//! Broker configuration.

use gland_core::BrokerId;
use gland_std::router::RouterConfig;

/// Settings for constructing a [`Broker`](crate::Broker).
///
/// # Example
///
/// ```rust
/// use gland::{Broker, BrokerConfig};
///
/// let broker: Broker<String> = Broker::with_config(
///     BrokerConfig::default().id("orders").queue_capacity(64).max_queued(1000),
/// );
/// assert_eq!(broker.id().as_str(), "orders");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BrokerConfig {
    id: Option<BrokerId>,
    router: RouterConfig,
}

impl BrokerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit broker id instead of a generated one.
    pub fn id(mut self, id: impl Into<BrokerId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Initial ring-buffer capacity of each pending-event queue.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.router.queue_capacity = capacity;
        self
    }

    /// Bound each pending-event queue; the oldest entry is dropped beyond it.
    ///
    /// A bound of zero disables queuing: queued emits report
    /// [`Emitted::Dropped`](crate::Emitted::Dropped).
    pub fn max_queued(mut self, limit: usize) -> Self {
        self.router.max_queued = Some(limit);
        self
    }

    pub(crate) fn into_parts(self) -> (BrokerId, RouterConfig) {
        (self.id.unwrap_or_else(BrokerId::generate), self.router)
    }
}
