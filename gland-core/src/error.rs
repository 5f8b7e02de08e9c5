//! Error types for Gland.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`GlandError`] - Umbrella type that every other error converts into
//! - [`RouterError`] - Errors raised while dispatching to the event trie
//! - [`BrokerError`] - Errors from the broker connection graph
//! - [`DequeError`] - Internal invariant violations in deque storage

use crate::broker_id::BrokerId;
use thiserror::Error;

/// Umbrella error for callers that mix router, broker and storage calls.
///
/// Operations return their narrow error type; `?` lifts any of them into
/// this one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlandError {
    /// An error occurred while routing an event.
    #[error("router error: {0}")]
    Router(#[from] RouterError),

    /// An error occurred in the broker graph.
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    /// Deque storage was found in an inconsistent state.
    #[error("storage error: {0}")]
    Deque(#[from] DequeError),
}

/// Errors that can occur when routing an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The event was emitted without queuing and nothing listens on it.
    #[error("no listeners for event: {0}")]
    NoListeners(String),

    /// The event name had no segments after normalization.
    #[error("event name is empty")]
    EmptyEventName,

    /// A pending queue could not be replayed.
    #[error(transparent)]
    Storage(#[from] DequeError),
}

/// Errors that can occur in the broker connection graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// A broker tried to connect to itself.
    #[error("broker {0} cannot connect to itself")]
    SelfConnect(BrokerId),

    /// A different broker with this id is already connected.
    #[error("another broker with id {0} is already connected")]
    DuplicateId(BrokerId),

    /// The target broker is not (or no longer) connected.
    #[error("broker {0} is not connected")]
    NotConnected(BrokerId),

    /// Routing failed on the target broker.
    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Errors raised by the circular deque storage layer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DequeError {
    /// A cell referenced a boxed id that is not in the object map, or an
    /// inline value the item type cannot decode.
    #[error("corrupted deque cell {cell:#010x}")]
    Corrupted {
        /// Raw cell contents.
        cell: u32,
    },
}
