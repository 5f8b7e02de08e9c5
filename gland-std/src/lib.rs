//! # gland-std
//!
//! Standard implementations for the Gland event routing engine.
//!
//! This crate provides:
//! - **Event trie**: [`EventTrie`] over colon-delimited names with wildcards
//! - **Presence index**: [`PresenceIndex`], a bitset over trie node ids
//! - **Ring buffer**: [`CircularDeque`] with inline/boxed `u32` cells
//! - **Pending queues**: [`EventQueue`] for events emitted with no listener
//! - **Routing**: [`EventRouter`], tying the above together
//!
//! [`EventTrie`]: trie::EventTrie
//! [`PresenceIndex`]: presence::PresenceIndex
//! [`CircularDeque`]: deque::CircularDeque
//! [`EventQueue`]: queue::EventQueue
//! [`EventRouter`]: router::EventRouter

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use gland_core;

// Modules
pub mod deque;
pub mod presence;
pub mod queue;
pub mod router;
pub mod testing;
pub mod trie;
