//! # gland-core
//!
//! Core vocabulary for the Gland event routing engine.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! code that only needs to name Gland types, not run a broker.
//!
//! # Event Names
//!
//! Events are addressed by colon-delimited names such as `"user:created"`.
//! A segment beginning with `*` is a wildcard that matches exactly one
//! segment; see [`path`] for normalization rules.
//!
//! # Listeners
//!
//! A [`Listener`] receives the payload and the wildcard [`Params`] bound
//! during matching. Responders return `Some(reply)`, which
//! [`Strategy`]-driven requests aggregate into a [`Collected`] value.
//!
//! # Error Types
//!
//! - [`GlandError`] - Umbrella error every other error converts into
//! - [`RouterError`] - Dispatch errors
//! - [`BrokerError`] - Connection graph errors
//! - [`DequeError`] - Storage invariant violations

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod broker_id;
mod error;
mod listener;
mod options;
mod params;
mod payload;
pub mod path;

// Re-exports
pub use broker_id::BrokerId;
pub use error::{BrokerError, DequeError, GlandError, RouterError};
pub use listener::{Listener, ListenerId, listener, responder, same_listener};
pub use options::{Collected, EmitFlags, Emitted, ListenFlags, Strategy};
pub use params::Params;
pub use path::EventPath;
pub use payload::Payload;
