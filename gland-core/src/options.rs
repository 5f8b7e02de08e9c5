//! Delivery flags and request aggregation strategies.

use bitflags::bitflags;

bitflags! {
    /// Options for emitting an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EmitFlags: u8 {
        /// Buffer the event when nothing listens on it instead of failing.
        const QUEUE = 0b0000_0001;
    }
}

bitflags! {
    /// Options for registering a listener.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ListenFlags: u8 {
        /// Replay events buffered for names this listener now matches.
        const QUEUE = 0b0000_0001;
        /// Remove the listener after its first invocation.
        const ONCE = 0b0000_0010;
    }
}

/// How `request` aggregates responder replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// The reply of the earliest registered responder that answered.
    #[default]
    First,
    /// The reply of the latest registered responder that answered.
    Last,
    /// Every reply, in registration order.
    All,
}

/// Replies gathered by `request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collected<D> {
    /// Result of [`Strategy::First`] or [`Strategy::Last`].
    One(Option<D>),
    /// Result of [`Strategy::All`].
    All(Vec<D>),
}

impl<D> Collected<D> {
    /// Reduce a list of replies according to `strategy`.
    pub fn from_replies(strategy: Strategy, replies: Vec<D>) -> Self {
        match strategy {
            Strategy::First => Collected::One(replies.into_iter().next()),
            Strategy::Last => Collected::One(replies.into_iter().next_back()),
            Strategy::All => Collected::All(replies),
        }
    }

    /// The single reply, or the first of many.
    pub fn into_one(self) -> Option<D> {
        match self {
            Collected::One(reply) => reply,
            Collected::All(replies) => replies.into_iter().next(),
        }
    }

    /// All replies as a list.
    pub fn into_all(self) -> Vec<D> {
        match self {
            Collected::One(reply) => reply.into_iter().collect(),
            Collected::All(replies) => replies,
        }
    }
}

/// Outcome of a successful emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitted {
    /// Listeners were invoked; carries how many.
    Delivered(usize),
    /// Nothing listened and the event was buffered.
    Queued,
    /// Nothing listened and the queue bound is zero, so the event was
    /// discarded.
    Dropped,
}

impl Emitted {
    /// Number of listeners invoked (zero when queued or dropped).
    pub fn delivered(&self) -> usize {
        match self {
            Emitted::Delivered(n) => *n,
            Emitted::Queued | Emitted::Dropped => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategies_select_replies() {
        let replies = || vec!["R1", "R2"];
        assert_eq!(
            Collected::from_replies(Strategy::First, replies()),
            Collected::One(Some("R1"))
        );
        assert_eq!(
            Collected::from_replies(Strategy::Last, replies()),
            Collected::One(Some("R2"))
        );
        assert_eq!(
            Collected::from_replies(Strategy::All, replies()),
            Collected::All(vec!["R1", "R2"])
        );
    }

    #[test]
    fn test_no_replies() {
        let none: Vec<u8> = Vec::new();
        assert_eq!(Collected::from_replies(Strategy::First, none.clone()).into_one(), None);
        assert!(Collected::from_replies(Strategy::All, none).into_all().is_empty());
    }

    #[test]
    fn test_flags_compose() {
        let flags = ListenFlags::QUEUE | ListenFlags::ONCE;
        assert!(flags.contains(ListenFlags::ONCE));
        assert!(!EmitFlags::default().contains(EmitFlags::QUEUE));
    }
}
