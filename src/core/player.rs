//! Seated participants as game entities.
//!
//! ## Player
//!
//! The engine-side record of one participant: round bookkeeping, score and
//! the hand/discard zones. Players use a [`ReactiveCache`]: every mutation
//! made through [`GameState`](super::GameState) rebuilds all projections
//! already handed out, so a participant holding their own projection never
//! sees a stale one.
//!
//! ## Self view
//!
//! Asking for a player's public projection on behalf of that same player
//! yields the private projection, and asking for the private projection on
//! behalf of anyone else yields the public one. The flavor is settled by
//! [`Player::effective_flavor`] before the cache is consulted.

use crate::visibility::{Entity, Flavor, ObserverKey, Projected, ProjectionBuilder, ReactiveCache, View};

use super::entity::{CardId, PlayerId};

const PLAYER_ATTRS: &[&str] = &[
    "uid",
    "name",
    "turns_played",
    "alive",
    "protected",
    "hearts",
    "insane_hearts",
    "hand",
    "discard",
];

/// A participant's seat.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: String,

    // === Round state ===
    pub(crate) turns_played: u32,
    pub(crate) alive: bool,
    pub(crate) protected: bool,

    // === Score ===
    pub(crate) hearts: u32,
    pub(crate) insane_hearts: u32,

    // === Zones ===
    pub(crate) hand: Vec<CardId>,
    pub(crate) discard: Vec<CardId>,

    pub(crate) cache: ReactiveCache,
}

impl Player {
    /// Create a fresh player.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            turns_played: 0,
            alive: true,
            protected: false,
            hearts: 0,
            insane_hearts: 0,
            hand: Vec::new(),
            discard: Vec::new(),
            cache: ReactiveCache::default(),
        }
    }

    /// Stable identity.
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Turns taken this round.
    #[must_use]
    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    /// Still in the round?
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Immune to targeting?
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Sane round wins.
    #[must_use]
    pub fn hearts(&self) -> u32 {
        self.hearts
    }

    /// Insane round wins.
    #[must_use]
    pub fn insane_hearts(&self) -> u32 {
        self.insane_hearts
    }

    /// Cards held, oldest first.
    #[must_use]
    pub fn hand(&self) -> &[CardId] {
        &self.hand
    }

    /// Cards discarded this round, oldest first.
    #[must_use]
    pub fn discard(&self) -> &[CardId] {
        &self.discard
    }

    /// Flavor actually served to `observer` when `requested` is asked for.
    #[must_use]
    pub fn effective_flavor(&self, _requested: Flavor, observer: ObserverKey) -> Flavor {
        if observer == ObserverKey::Player(self.id) {
            Flavor::Private
        } else {
            Flavor::Public
        }
    }

    /// Set or clear protection from targeting.
    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }

    /// Clear round state. Score survives.
    pub(crate) fn reset(&mut self) {
        self.turns_played = 0;
        self.alive = true;
        self.protected = false;
        self.hand.clear();
        self.discard.clear();
    }
}

impl Entity for Player {
    const KIND: &'static str = "player";
    const PUBLIC_ATTRS: &'static [&'static str] = PLAYER_ATTRS;
    const PRIVATE_ATTRS: &'static [&'static str] = PLAYER_ATTRS;

    fn attribute(&self, name: &str, view: &View<'_>) -> Projected {
        match name {
            "uid" => view.project(&self.id.raw()),
            "name" => view.project(&self.name),
            "turns_played" => view.project(&self.turns_played),
            "alive" => view.project(&self.alive),
            "protected" => view.project(&self.protected),
            "hearts" => view.project(&self.hearts),
            "insane_hearts" => view.project(&self.insane_hearts),
            "hand" => view.project(&self.hand),
            "discard" => view.project(&self.discard),
            other => view.integrity("undeclared player attribute", other.to_string()),
        }
    }

    fn subject(&self) -> Option<PlayerId> {
        Some(self.id)
    }

    fn finish(&self, builder: ProjectionBuilder, _view: &View<'_>) -> ProjectionBuilder {
        builder.label(self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player() {
        let player = Player::new(PlayerId(2), "Beth");
        assert_eq!(player.id(), PlayerId(2));
        assert_eq!(player.name(), "Beth");
        assert!(player.is_alive());
        assert!(player.hand().is_empty());
    }

    #[test]
    fn test_self_view_is_private() {
        let player = Player::new(PlayerId(1), "Alex");

        assert_eq!(
            player.effective_flavor(Flavor::Public, ObserverKey::Player(PlayerId(1))),
            Flavor::Private
        );
        assert_eq!(
            player.effective_flavor(Flavor::Private, ObserverKey::Player(PlayerId(0))),
            Flavor::Public
        );
        assert_eq!(
            player.effective_flavor(Flavor::Private, ObserverKey::Spectator),
            Flavor::Public
        );
    }

    #[test]
    fn test_reset_keeps_score() {
        let mut player = Player::new(PlayerId(0), "Alex");
        player.hearts = 1;
        player.alive = false;
        player.hand.push(CardId(3));

        player.reset();

        assert!(player.is_alive());
        assert!(player.hand().is_empty());
        assert_eq!(player.hearts(), 1);
    }
}
