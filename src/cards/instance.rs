//! Physical cards in a game.
//!
//! A `Card` is one physical card: a shared [`CardDefinition`] plus where the
//! card is and how it was last played. Cards use a [`LazyCache`]; anything
//! that changes what an observer could learn from a card (zone changes, a
//! reshuffle, a "which card?" question) invalidates it.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::core::{CardId, EventId, PlayerId};
use crate::visibility::{Entity, Flavor, LazyCache, Projected, ProjectionBuilder, View};

use super::definition::CardDefinition;
use super::play::PlayOption;

/// Public attributes masked unless the card is face up.
const FACE_ATTRS: &[&str] = &["name", "kind", "value", "insane", "cardfront", "played_as", "turn_played"];

/// A card instance.
#[derive(Debug)]
pub struct Card {
    id: CardId,
    def: Arc<CardDefinition>,

    // === Location ===
    pub(crate) holder: Option<PlayerId>,
    pub(crate) controller: Option<PlayerId>,
    pub(crate) discarded: bool,

    // === Play tracking ===
    pub(crate) played_as: Option<PlayOption>,
    pub(crate) played_events: SmallVec<[EventId; 2]>,
    pub(crate) turn_played: Option<u32>,

    pub(crate) cache: LazyCache,
}

impl Card {
    /// Create a card outside any zone.
    pub fn new(id: CardId, def: Arc<CardDefinition>) -> Self {
        Self {
            id,
            def,
            holder: None,
            controller: None,
            discarded: false,
            played_as: None,
            played_events: SmallVec::new(),
            turn_played: None,
            cache: LazyCache::default(),
        }
    }

    /// Card id.
    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    /// Shared definition.
    #[must_use]
    pub fn def(&self) -> &Arc<CardDefinition> {
        &self.def
    }

    /// Player holding the card (hand or discard).
    #[must_use]
    pub fn holder(&self) -> Option<PlayerId> {
        self.holder
    }

    /// Player the card's effects are attributed to.
    #[must_use]
    pub fn controller(&self) -> Option<PlayerId> {
        self.controller
    }

    /// In a discard pile?
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    /// Face up (discarded cards are).
    #[must_use]
    pub fn is_faceup(&self) -> bool {
        self.discarded
    }

    /// How the card was last played.
    #[must_use]
    pub fn played_as(&self) -> Option<&PlayOption> {
        self.played_as.as_ref()
    }

    /// Events the last play produced.
    #[must_use]
    pub fn played_events(&self) -> &[EventId] {
        &self.played_events
    }

    /// Holder's turn count when the card was played.
    #[must_use]
    pub fn turn_played(&self) -> Option<u32> {
        self.turn_played
    }

    /// Forget location and play history.
    pub(crate) fn reset(&mut self) {
        self.holder = None;
        self.controller = None;
        self.discarded = false;
        self.played_as = None;
        self.played_events.clear();
        self.turn_played = None;
        self.cache.invalidate_all();
    }
}

impl Entity for Card {
    const KIND: &'static str = "card";
    const PUBLIC_ATTRS: &'static [&'static str] = &[
        "name",
        "kind",
        "value",
        "insane",
        "cardfront",
        "played_as",
        "turn_played",
        "cardback",
        "holder",
        "discarded",
        "faceup",
        "controller",
    ];
    const PRIVATE_ATTRS: &'static [&'static str] = &["name", "kind", "value", "insane", "cardback", "cardfront"];

    fn attribute(&self, name: &str, view: &View<'_>) -> Projected {
        if view.flavor() == Flavor::Public && !self.is_faceup() && FACE_ATTRS.contains(&name) {
            return Projected::Hidden;
        }
        match name {
            "name" => view.project(&self.def.name),
            "kind" => view.project(&self.def.kind),
            "value" => view.project(&self.def.value),
            "insane" => view.project(&self.def.insane),
            "cardfront" => view.project(&self.def.cardfront),
            "cardback" => view.project(&self.def.cardback),
            "played_as" => match &self.played_as {
                Some(option) => option.project_detached(view),
                None => Projected::Null,
            },
            "turn_played" => view.project(&self.turn_played),
            "holder" => view.project(&self.holder),
            "discarded" => view.project(&self.discarded),
            "faceup" => view.project(&self.is_faceup()),
            "controller" => view.project(&self.controller),
            other => view.integrity("undeclared card attribute", other.to_string()),
        }
    }

    fn finish(&self, builder: ProjectionBuilder, view: &View<'_>) -> ProjectionBuilder {
        if view.flavor() == Flavor::Public && !self.is_faceup() {
            builder.label(self.def.cardback.clone())
        } else {
            builder.label(self.def.name.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_play_tracking() {
        let def = Arc::new(CardDefinition::new("GUARD", "Guard", 1));
        let mut card = Card::new(CardId(0), def);
        card.holder = Some(PlayerId(1));
        card.discarded = true;
        card.turn_played = Some(2);
        card.played_events.push(EventId(9));

        card.reset();

        assert_eq!(card.holder(), None);
        assert!(!card.is_faceup());
        assert_eq!(card.turn_played(), None);
        assert!(card.played_events().is_empty());
    }
}
