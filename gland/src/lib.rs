//! # gland - Event Routing and Brokering
//!
//! `gland` routes in-process events addressed by colon-delimited names
//! (`"user:created"`, `"order:*id:paid"`) to listeners, with request/response,
//! prefix broadcast, deferred delivery and broker-to-broker links on top.
//!
//! ## Quick Start
//!
//! ```rust
//! use gland::{Broker, Strategy};
//!
//! let broker: Broker<String> = Broker::new();
//!
//! broker.on("user:created", |name, _| println!("welcome {name}")).unwrap();
//! broker.emit("user:created", "ada".to_string()).unwrap();
//!
//! broker.respond("user:lookup", |name, _| Some(name.to_uppercase())).unwrap();
//! let reply = broker.request("user:lookup", "ada".into(), Strategy::First);
//! assert_eq!(reply.into_one().as_deref(), Some("ADA"));
//! ```
//!
//! ## Deferred delivery
//!
//! ```rust
//! use gland::{Broker, EmitFlags, Emitted, ListenFlags, listener};
//!
//! let broker: Broker<u32> = Broker::new();
//! assert!(broker.emit("ready", 1).is_err());
//! assert_eq!(broker.emit_with("ready", 1, EmitFlags::QUEUE), Ok(Emitted::Queued));
//!
//! broker
//!     .on_with("ready", listener(|n: &u32, _| assert_eq!(*n, 1)), ListenFlags::QUEUE)
//!     .unwrap();
//! assert_eq!(broker.pending("ready"), 0);
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod broker;
mod channel;
mod config;

pub use broker::Broker;
pub use channel::Channel;
pub use config::BrokerConfig;

// Identity and payload
pub use gland_core::{BrokerId, Payload};

// Errors
pub use gland_core::{BrokerError, DequeError, GlandError, RouterError};

// Delivery options and request aggregation
pub use gland_core::{Collected, EmitFlags, Emitted, ListenFlags, Strategy};

// Listeners
pub use gland_core::{Listener, ListenerId, listener, responder, same_listener};

// Paths
pub use gland_core::{EventPath, Params, path};

// Engine
pub use gland_std::router::{EventRouter, RouterConfig, Subscription};

/// Engine data structures.
pub mod engine {
    pub use gland_std::{
        deque::{CircularDeque, DequeItem},
        presence::PresenceIndex,
        queue::{EventQueue, QueuedEvent},
        trie::{EventTrie, Match},
    };
}

/// Testing utilities.
pub mod testing {
    pub use gland_std::testing::{CountingListener, RecordingListener};
}

/// Prelude module - common imports for Gland.
///
/// # Usage
///
/// ```rust,ignore
/// use gland::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Broker, BrokerConfig, BrokerError, Channel, Collected, EmitFlags, Emitted, ListenFlags,
        Listener, Params, Payload, RouterError, Strategy, Subscription, listener, responder,
    };
}
