//! Entity identification system.
//!
//! Every stateful object in a game (player, card, event, event group, info
//! record) is named by a small copyable id. Cross references between objects
//! are always stored as ids and resolved through the owning arena, never as
//! pointers, so there are no reference cycles.
//!
//! ## Allocation
//!
//! Ids are handed out by an [`IdAllocator`] owned by the game, not by global
//! counters. A fresh game starts every sequence at zero, which keeps tests
//! deterministic.
//!
//! ```
//! use hidden_letters::core::{IdAllocator, PlayerId, CardId};
//!
//! let mut ids = IdAllocator::default();
//! assert_eq!(ids.player(), PlayerId::new(0));
//! assert_eq!(ids.player(), PlayerId::new(1));
//! assert_eq!(ids.card(), CardId::new(0));
//! ```

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $raw:ty, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub $raw);

        impl $name {
            /// Create an id from its raw value.
            #[must_use]
            pub const fn new(id: $raw) -> Self {
                Self(id)
            }

            /// Get the raw id value.
            #[must_use]
            pub const fn raw(self) -> $raw {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

id_type!(
    /// Stable identity of a participant. Also the key of every per-observer cache.
    PlayerId, u32, "Player"
);
id_type!(
    /// Identity of a physical card in the game.
    CardId, u32, "Card"
);
id_type!(
    /// Identity of an event. Monotonic in creation order.
    EventId, u64, "Event"
);
id_type!(
    /// Identity of a set of events ordered together as one unit.
    GroupId, u64, "Group"
);
id_type!(
    /// Sequence id of an info record. Monotonic in emission order.
    InfoId, u64, "Info"
);

impl PlayerId {
    /// Index into the player arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl CardId {
    /// Index into the card arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotonic id source for one game.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next_player: u32,
    next_card: u32,
    next_event: u64,
    next_group: u64,
    next_info: u64,
}

impl IdAllocator {
    /// Allocate the next player id.
    pub fn player(&mut self) -> PlayerId {
        let id = PlayerId(self.next_player);
        self.next_player += 1;
        id
    }

    /// Allocate the next card id.
    pub fn card(&mut self) -> CardId {
        let id = CardId(self.next_card);
        self.next_card += 1;
        id
    }

    /// Allocate the next event id.
    pub fn event(&mut self) -> EventId {
        let id = EventId(self.next_event);
        self.next_event += 1;
        id
    }

    /// Allocate the next group id.
    pub fn group(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    /// Allocate the next info sequence id.
    pub fn info(&mut self) -> InfoId {
        let id = InfoId(self.next_info);
        self.next_info += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_per_kind() {
        let mut ids = IdAllocator::default();

        assert_eq!(ids.event(), EventId(0));
        assert_eq!(ids.event(), EventId(1));
        assert_eq!(ids.group(), GroupId(0));
        assert_eq!(ids.info(), InfoId(0));
        assert_eq!(ids.event(), EventId(2));
    }

    #[test]
    fn test_fresh_allocator_restarts() {
        let mut first = IdAllocator::default();
        first.card();
        first.card();

        let mut second = IdAllocator::default();
        assert_eq!(second.card(), CardId(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PlayerId(3)), "Player(3)");
        assert_eq!(format!("{}", CardId(42)), "Card(42)");
        assert_eq!(format!("{}", EventId(7)), "Event(7)");
    }

    #[test]
    fn test_serialization() {
        let id = CardId(123);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: CardId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
