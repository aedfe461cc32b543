//! Card definitions: what a kind of card does.
//!
//! A `CardDefinition` is a capability record. The printed data (kind, name,
//! value, insanity, art) sits next to optional behavior closures, and
//! every closure has a default so a plain card needs none of them.
//! Shared behavior (looking at a hand, killing a target) lives in
//! [`rules`](crate::rules) as plain functions, not in a definition
//! hierarchy.
//!
//! Instance-specific data (holder, how it was played) is stored
//! separately in [`Card`](super::Card).

use std::fmt;
use std::sync::Arc;

use crate::core::{CardId, EngineResult, EventId, GameState};
use crate::events::{Context, Event, Source};
use crate::stack::Game;

use super::play::{Forcing, PlayOption};

/// Legal play options of a held card.
pub type PlayOptionsFn = Arc<dyn Fn(&GameState, CardId) -> Vec<(PlayOption, Forcing)>>;

/// Register (but do not queue) the events a play produces.
pub type PlayEventsFn = Arc<dyn Fn(&mut Game, &PlayOption) -> Vec<EventId>>;

/// Resolution effect of the default single play event.
pub type OnPlayFn = Arc<dyn Fn(&mut Game, EventId) -> EngineResult<()>>;

/// Reactive hook run during the observer pass of every fired event.
///
/// Returns the quick-response options this card offers its holder.
pub type OnEventFn = Arc<dyn Fn(&mut Game, CardId, EventId) -> EngineResult<Vec<PlayOption>>>;

/// Zone lifecycle hook.
pub type ZoneHookFn = Arc<dyn Fn(&mut GameState, CardId)>;

/// Hook run when the card is discarded, inside the discard effect.
pub type OnDiscardFn = Arc<dyn Fn(&mut Game, CardId, EventId) -> EngineResult<()>>;

/// Adjust a holder's end-of-round showdown score.
pub type ScoreEditFn = Arc<dyn Fn(&GameState, CardId, i64) -> i64>;

/// Static card definition.
///
/// ## Example
///
/// ```
/// use hidden_letters::cards::CardDefinition;
///
/// let handmaid = CardDefinition::new("HANDMAID", "Handmaid", 4).with_cardback("0");
///
/// assert_eq!(handmaid.value, 4);
/// assert_eq!(handmaid.insane, 0);
/// assert!(!handmaid.has_reaction());
/// ```
#[derive(Clone)]
pub struct CardDefinition {
    /// Kind identifier, used for deck stacking and matching.
    pub kind: String,

    /// Display name.
    pub name: String,

    /// Showdown value.
    pub value: i64,

    /// Insanity carried while discarded (may exceed 1).
    pub insane: u32,

    /// Back art; the only thing a face-down card shows.
    pub cardback: String,

    /// Front art.
    pub cardfront: String,

    play_options: Option<PlayOptionsFn>,
    play_events: Option<PlayEventsFn>,
    on_play: Option<OnPlayFn>,
    on_event: Option<OnEventFn>,
    on_enter_zone: Option<ZoneHookFn>,
    on_leave_zone: Option<ZoneHookFn>,
    on_discard: Option<OnDiscardFn>,
    score_edit: Option<ScoreEditFn>,
}

impl CardDefinition {
    /// Create a definition with default behavior.
    #[must_use]
    pub fn new(kind: impl Into<String>, name: impl Into<String>, value: i64) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            value,
            insane: 0,
            cardback: "DEFAULT".into(),
            cardfront: "BLANK".into(),
            play_options: None,
            play_events: None,
            on_play: None,
            on_event: None,
            on_enter_zone: None,
            on_leave_zone: None,
            on_discard: None,
            score_edit: None,
        }
    }

    /// Set the insanity level.
    #[must_use]
    pub fn with_insane(mut self, insane: u32) -> Self {
        self.insane = insane;
        self
    }

    /// Set the back art.
    #[must_use]
    pub fn with_cardback(mut self, cardback: impl Into<String>) -> Self {
        self.cardback = cardback.into();
        self
    }

    /// Set the front art.
    #[must_use]
    pub fn with_cardfront(mut self, cardfront: impl Into<String>) -> Self {
        self.cardfront = cardfront.into();
        self
    }

    /// Set the play-option generator.
    #[must_use]
    pub fn with_play_options(
        mut self,
        f: impl Fn(&GameState, CardId) -> Vec<(PlayOption, Forcing)> + 'static,
    ) -> Self {
        self.play_options = Some(Arc::new(f));
        self
    }

    /// Replace the default single play event.
    #[must_use]
    pub fn with_play_events(mut self, f: impl Fn(&mut Game, &PlayOption) -> Vec<EventId> + 'static) -> Self {
        self.play_events = Some(Arc::new(f));
        self
    }

    /// Set the effect of the default play event.
    #[must_use]
    pub fn with_on_play(mut self, f: impl Fn(&mut Game, EventId) -> EngineResult<()> + 'static) -> Self {
        self.on_play = Some(Arc::new(f));
        self
    }

    /// Set the reactive hook.
    #[must_use]
    pub fn with_on_event(
        mut self,
        f: impl Fn(&mut Game, CardId, EventId) -> EngineResult<Vec<PlayOption>> + 'static,
    ) -> Self {
        self.on_event = Some(Arc::new(f));
        self
    }

    /// Set the hook run after the card enters a holder's zone.
    #[must_use]
    pub fn with_on_enter_zone(mut self, f: impl Fn(&mut GameState, CardId) + 'static) -> Self {
        self.on_enter_zone = Some(Arc::new(f));
        self
    }

    /// Set the hook run after the card leaves a holder.
    #[must_use]
    pub fn with_on_leave_zone(mut self, f: impl Fn(&mut GameState, CardId) + 'static) -> Self {
        self.on_leave_zone = Some(Arc::new(f));
        self
    }

    /// Replace the default discard hook.
    #[must_use]
    pub fn with_on_discard(mut self, f: impl Fn(&mut Game, CardId, EventId) -> EngineResult<()> + 'static) -> Self {
        self.on_discard = Some(Arc::new(f));
        self
    }

    /// Set the showdown score adjustment.
    #[must_use]
    pub fn with_score_edit(mut self, f: impl Fn(&GameState, CardId, i64) -> i64 + 'static) -> Self {
        self.score_edit = Some(Arc::new(f));
        self
    }

    /// Does this card react to other events?
    #[must_use]
    pub fn has_reaction(&self) -> bool {
        self.on_event.is_some()
    }

    /// Legal play options for `card`. Defaults to one untargeted, unforced option.
    #[must_use]
    pub fn play_options(&self, state: &GameState, card: CardId) -> Vec<(PlayOption, Forcing)> {
        match &self.play_options {
            Some(f) => f(state, card),
            None => vec![(PlayOption::new(card, self.name.clone()), Forcing::Unforced)],
        }
    }

    /// Register the events a play produces.
    ///
    /// Defaults to one card-play event whose effect is the `on_play` hook.
    pub fn play_events(&self, game: &mut Game, option: &PlayOption) -> Vec<EventId> {
        if let Some(f) = &self.play_events {
            return f(game, option);
        }
        let Some(player) = game.state().card(option.card).and_then(|card| card.controller()) else {
            tracing::warn!(card = %option.card, "play requested for a card nobody controls");
            return Vec::new();
        };
        let context = Context::CardPlay {
            player,
            card: option.card,
            play_option: option.clone(),
        };
        let mut event = Event::new(context);
        if let Some(on_play) = self.on_play.clone() {
            event = event.on_resolve(move |game, uid| on_play(game, uid));
        }
        vec![game.register(event)]
    }

    /// Run the reactive hook.
    pub fn on_event(&self, game: &mut Game, card: CardId, event: EventId) -> EngineResult<Vec<PlayOption>> {
        match &self.on_event {
            Some(f) => f(game, card, event),
            None => Ok(Vec::new()),
        }
    }

    /// Run the enter-zone hook.
    pub fn on_enter_zone(&self, state: &mut GameState, card: CardId) {
        if let Some(f) = &self.on_enter_zone {
            f(state, card);
        }
    }

    /// Run the leave-zone hook.
    pub fn on_leave_zone(&self, state: &mut GameState, card: CardId) {
        if let Some(f) = &self.on_leave_zone {
            f(state, card);
        }
    }

    /// Run the discard hook.
    ///
    /// Default: an insane card discarded by an insanity check kills its holder.
    pub fn on_discard(&self, game: &mut Game, card: CardId, event: EventId) -> EngineResult<()> {
        if let Some(f) = &self.on_discard {
            return f(game, card, event);
        }
        let Some(Context::Discard { player, source, .. }) = game.event(event).map(|ev| ev.context().clone()) else {
            return Ok(());
        };
        if self.insane > 0 && source == Source::InsanityCheck {
            crate::rules::trigger_death(game, player, Source::InsanityCheck, Some(card))?;
        }
        Ok(())
    }

    /// Showdown score with this card's adjustment applied.
    #[must_use]
    pub fn score_edit(&self, state: &GameState, card: CardId, score: i64) -> i64 {
        match &self.score_edit {
            Some(f) => f(state, card, score),
            None => score,
        }
    }
}

impl fmt::Debug for CardDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDefinition")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("insane", &self.insane)
            .field("cardback", &self.cardback)
            .field("reacts", &self.has_reaction())
            .finish_non_exhaustive()
    }
}
