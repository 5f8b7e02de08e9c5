//! Payload trait for event data.

/// A marker trait for data carried by events.
///
/// Payloads are cloned when an event is buffered for later replay or fanned
/// out to several brokers, and must be thread-safe so broker handles can be
/// shared across threads.
///
/// # Example
///
/// ```rust
/// use gland_core::Payload;
///
/// #[derive(Clone)]
/// struct UserCreated { id: u64 }
///
/// fn assert_payload<P: Payload>() {}
/// assert_payload::<UserCreated>();
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Payload",
    label = "must be `Clone + Send + Sync + 'static`",
    note = "Event data in Gland is cloned on queueing and must be thread-safe."
)]
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}
