//! Typed contexts: what an event or decision is about.
//!
//! A [`Context`] is immutable once its event is registered (the one
//! exception is the card a draw produced, filled in by the draw effect
//! through the engine). Each variant carries the fields the original
//! occurrence needs; the shared accessors ([`Context::player`],
//! [`Context::players`], [`Context::card`], ...) give the resolution engine
//! a uniform view for ordering and targeting.
//!
//! Projection copies those shared fields through the observer's view and
//! renders the flavor's narration template as the projection label, so the
//! public narration of a draw only ever names the cardback.

use serde::{Deserialize, Serialize};

use crate::cards::PlayOption;
use crate::core::{CardId, EventId, PlayerId};
use crate::visibility::{EntityStore, Flavor, ObserverKey, Projected, Projection, View, Visible};

use super::narrate;

/// Why something happened.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Played,
    Random,
    Joined,
    QuickPlay,
    StartOfTurn,
    OutOfTurn,
    ByChoice,
    New,
    DeckEmpty,
    LastAlive,
    HighestCard,
    OneLeft,
    MutualAnnihilation,
    NoSurvivors,
    InsanityCheck,
    Death,
    WonHearts,
    WonInsaneHearts,
    /// A participant's choice or action.
    Player(PlayerId),
    /// A card's effect.
    Card(CardId),
    /// A specific play of a card.
    Play(Box<PlayOption>),
}

impl Source {
    /// Narration word for sources that are not entities.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Played => "being played",
            Self::Random => "random choice",
            Self::Joined => "joining",
            Self::QuickPlay => "a quick play",
            Self::StartOfTurn => "start of turn",
            Self::OutOfTurn => "out of turn",
            Self::ByChoice => "choice",
            Self::New => "new",
            Self::DeckEmpty => "the deck running out",
            Self::LastAlive => "being the last one alive",
            Self::HighestCard => "holding the highest card",
            Self::OneLeft => "only one player being left",
            Self::MutualAnnihilation => "mutual annihilation",
            Self::NoSurvivors => "nobody surviving",
            Self::InsanityCheck => "an insanity check",
            Self::Death => "death",
            Self::WonHearts => "winning enough hearts",
            Self::WonInsaneHearts => "winning enough insane hearts",
            Self::Player(_) | Self::Card(_) | Self::Play(_) => return None,
        })
    }
}

impl Visible for Source {
    fn project(&self, view: &View<'_>) -> Projected {
        match self {
            Self::Player(player) => view.project(player),
            Self::Card(card) => view.project(card),
            Self::Play(option) => view.project(option.as_ref()),
            other => Projected::Text(other.name().unwrap_or_default().to_string()),
        }
    }
}

/// Scoring token a round winner earns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Earned {
    Heart,
    InsaneHeart,
}

/// Who receives the private view of a context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Nobody,
    Players(Vec<PlayerId>),
}

impl Audience {
    /// Is `player` entitled to the private view?
    #[must_use]
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Self::Everyone => true,
            Self::Nobody => false,
            Self::Players(players) => players.contains(&player),
        }
    }
}

/// Which narration template to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Narration {
    /// Logs and error messages; sees everything.
    Internal,
    Public,
    Private,
}

impl From<Flavor> for Narration {
    fn from(flavor: Flavor) -> Self {
        match flavor {
            Flavor::Public => Self::Public,
            Flavor::Private => Self::Private,
        }
    }
}

/// A context defined by a card plug-in.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomContext {
    pub kind: String,
    pub player: Option<PlayerId>,
    pub players: Vec<PlayerId>,
    pub card: Option<CardId>,
    pub source: Option<Source>,
    pub number: Option<i64>,
    pub template: String,
    pub public_template: Option<String>,
    pub private_template: Option<String>,
    /// Overrides the default private-audience rule.
    pub audience: Option<Audience>,
    /// Emit an info record when the event first fires.
    pub announce: bool,
}

impl CustomContext {
    /// Create a custom context with one template for every audience.
    pub fn new(kind: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            player: None,
            players: Vec::new(),
            card: None,
            source: None,
            number: None,
            template: template.into(),
            public_template: None,
            private_template: None,
            audience: None,
            announce: false,
        }
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    #[must_use]
    pub fn with_players(mut self, players: Vec<PlayerId>) -> Self {
        self.players = players;
        self
    }

    #[must_use]
    pub fn with_card(mut self, card: CardId) -> Self {
        self.card = Some(card);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_number(mut self, number: i64) -> Self {
        self.number = Some(number);
        self
    }

    #[must_use]
    pub fn with_public_template(mut self, template: impl Into<String>) -> Self {
        self.public_template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_private_template(mut self, template: impl Into<String>) -> Self {
        self.private_template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = Some(audience);
        self
    }

    #[must_use]
    pub fn announced(mut self) -> Self {
        self.announce = true;
        self
    }
}

/// What an event or decision is about.
#[derive(Clone, Debug, PartialEq)]
pub enum Context {
    // === Game membership ===
    Join { player: PlayerId, source: Source },
    Leave { player: PlayerId, source: Source },

    // === Round flow ===
    RoundStart { players: Vec<PlayerId> },
    RoundEnd { players: Vec<PlayerId>, source: Source },
    Starting { player: PlayerId, source: Source },
    Win { player: PlayerId, source: Source },
    Tie { source: Source },
    Scored { player: PlayerId, source: Source, earned: Earned },
    Annihilation { players: Vec<PlayerId>, number: i64 },
    TurnStart { player: PlayerId, number: i64 },
    TurnEnd { player: PlayerId },
    InsanityChecks { player: PlayerId, number: i64 },
    InsanityCheck { player: PlayerId, number: i64 },

    // === Card movement ===
    CardPlay { player: PlayerId, card: CardId, play_option: PlayOption },
    Draw { player: PlayerId, source: Source, card: Option<CardId> },
    Discard { player: PlayerId, card: CardId, source: Source },
    SeeCard { players: Vec<PlayerId>, card: CardId, source: Source },
    Shuffle { card: CardId, source: Source },

    // === Life and death ===
    Death { player: PlayerId, source: Source, card: Option<CardId> },
    CancelDeath { player: PlayerId, source: Source, death: EventId },
    ProtectionLoss { player: PlayerId, source: Source },

    // === Decisions ===
    WhichPlay { player: PlayerId },
    MultiPlay { player: PlayerId },
    WhoStarts { player: PlayerId },
    WhichCard { player: PlayerId, source: Source },
    QuickPlay { player: PlayerId, trigger: Box<Context> },
    OrderEventGroups { player: PlayerId },

    Custom(Box<CustomContext>),
}

impl Context {
    /// Stable kind name.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Join { .. } => "JOIN",
            Self::Leave { .. } => "LEAVE",
            Self::RoundStart { .. } => "ROUND_START",
            Self::RoundEnd { .. } => "ROUND_END",
            Self::Starting { .. } => "STARTING",
            Self::Win { .. } => "WIN",
            Self::Tie { .. } => "TIE",
            Self::Scored { .. } => "SCORED",
            Self::Annihilation { .. } => "ANNIHILATION",
            Self::TurnStart { .. } => "TURN_START",
            Self::TurnEnd { .. } => "TURN_END",
            Self::InsanityChecks { .. } => "INSANITY_CHECKS",
            Self::InsanityCheck { .. } => "INSANITY_CHECK",
            Self::CardPlay { .. } => "CARD_PLAY",
            Self::Draw { .. } => "DRAW",
            Self::Discard { .. } => "DISCARD",
            Self::SeeCard { .. } => "SEE_CARD",
            Self::Shuffle { .. } => "SHUFFLE",
            Self::Death { .. } => "DEATH",
            Self::CancelDeath { .. } => "CANCEL_DEATH",
            Self::ProtectionLoss { .. } => "PROTECTION_LOSS",
            Self::WhichPlay { .. } => "WHICH_PLAY",
            Self::MultiPlay { .. } => "MULTI_PLAY",
            Self::WhoStarts { .. } => "WHO_STARTS",
            Self::WhichCard { .. } => "WHICH_CARD",
            Self::QuickPlay { .. } => "QUICK_PLAY",
            Self::OrderEventGroups { .. } => "ORDER_EVENT_GROUPS",
            Self::Custom(custom) => &custom.kind,
        }
    }

    /// The single player this is about, if any. Owns the event for ordering.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Self::Join { player, .. }
            | Self::Leave { player, .. }
            | Self::Starting { player, .. }
            | Self::Win { player, .. }
            | Self::Scored { player, .. }
            | Self::TurnStart { player, .. }
            | Self::TurnEnd { player }
            | Self::InsanityChecks { player, .. }
            | Self::InsanityCheck { player, .. }
            | Self::CardPlay { player, .. }
            | Self::Draw { player, .. }
            | Self::Discard { player, .. }
            | Self::Death { player, .. }
            | Self::CancelDeath { player, .. }
            | Self::ProtectionLoss { player, .. }
            | Self::WhichPlay { player }
            | Self::MultiPlay { player }
            | Self::WhoStarts { player }
            | Self::WhichCard { player, .. }
            | Self::QuickPlay { player, .. }
            | Self::OrderEventGroups { player } => Some(*player),
            Self::Custom(custom) => custom.player,
            Self::RoundStart { .. }
            | Self::RoundEnd { .. }
            | Self::Tie { .. }
            | Self::Annihilation { .. }
            | Self::SeeCard { .. }
            | Self::Shuffle { .. } => None,
        }
    }

    /// Players this is about, for multi-player contexts.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        match self {
            Self::RoundStart { players }
            | Self::RoundEnd { players, .. }
            | Self::Annihilation { players, .. }
            | Self::SeeCard { players, .. } => players,
            Self::Custom(custom) => &custom.players,
            _ => &[],
        }
    }

    /// The card involved, if known.
    #[must_use]
    pub fn card(&self) -> Option<CardId> {
        match self {
            Self::CardPlay { card, .. }
            | Self::Discard { card, .. }
            | Self::SeeCard { card, .. }
            | Self::Shuffle { card, .. } => Some(*card),
            Self::Draw { card, .. } | Self::Death { card, .. } => *card,
            Self::Custom(custom) => custom.card,
            _ => None,
        }
    }

    /// Why it happened.
    #[must_use]
    pub fn source(&self) -> Option<&Source> {
        match self {
            Self::Join { source, .. }
            | Self::Leave { source, .. }
            | Self::RoundEnd { source, .. }
            | Self::Starting { source, .. }
            | Self::Win { source, .. }
            | Self::Tie { source }
            | Self::Scored { source, .. }
            | Self::Draw { source, .. }
            | Self::Discard { source, .. }
            | Self::SeeCard { source, .. }
            | Self::Shuffle { source, .. }
            | Self::Death { source, .. }
            | Self::CancelDeath { source, .. }
            | Self::ProtectionLoss { source, .. }
            | Self::WhichCard { source, .. } => Some(source),
            Self::Custom(custom) => custom.source.as_ref(),
            _ => None,
        }
    }

    /// Count or score carried by the context.
    #[must_use]
    pub fn number(&self) -> Option<i64> {
        match self {
            Self::Annihilation { number, .. }
            | Self::TurnStart { number, .. }
            | Self::InsanityChecks { number, .. }
            | Self::InsanityCheck { number, .. } => Some(*number),
            Self::Custom(custom) => custom.number,
            _ => None,
        }
    }

    /// The play being made, for card plays.
    #[must_use]
    pub fn play_option(&self) -> Option<&PlayOption> {
        match self {
            Self::CardPlay { play_option, .. } => Some(play_option),
            _ => None,
        }
    }

    /// Players the event is aimed at; they get first chance to respond.
    #[must_use]
    pub fn targets(&self) -> &[PlayerId] {
        self.play_option().map_or(&[], |option| &option.targets)
    }

    /// Who gets the private view.
    ///
    /// Defaults to the context's player, else its players, else nobody.
    #[must_use]
    pub fn audience(&self) -> Audience {
        if let Self::Custom(custom) = self {
            if let Some(audience) = &custom.audience {
                return audience.clone();
            }
        }
        match (self.player(), self.players()) {
            (Some(player), _) => Audience::Players(vec![player]),
            (None, []) => Audience::Nobody,
            (None, players) => Audience::Players(players.to_vec()),
        }
    }

    /// Does an info record go out when the event first fires?
    #[must_use]
    pub fn announces_on_fire(&self) -> bool {
        match self {
            Self::CardPlay { .. } => true,
            Self::Custom(custom) => custom.announce,
            _ => false,
        }
    }

    /// Narration template for an audience.
    #[must_use]
    pub fn template(&self, narration: Narration) -> &str {
        match (self, narration) {
            (Self::Draw { .. }, Narration::Public) => "{p} draws for {s} (cardback: {c}).",
            (Self::CardPlay { play_option, .. }, _) if play_option.label.is_some() => {
                play_option.label.as_deref().unwrap_or_default()
            }
            (Self::Custom(custom), Narration::Public) if custom.public_template.is_some() => {
                custom.public_template.as_deref().unwrap_or_default()
            }
            (Self::Custom(custom), Narration::Private) if custom.private_template.is_some() => {
                custom.private_template.as_deref().unwrap_or_default()
            }
            _ => self.base_template(),
        }
    }

    fn base_template(&self) -> &str {
        match self {
            Self::Join { .. } => "{p} joined as a {s} player.",
            Self::Leave { .. } => "{p} left the game.",
            Self::RoundStart { .. } => "Started the round, with {ps} playing.",
            Self::RoundEnd { .. } => "Round ended due to {s}: {ps} made it to the end!",
            Self::Starting { .. } => "{p} starts the round.",
            Self::Win { .. } => "{p} won, due to {s}!",
            Self::Tie { .. } => "It was a tie, due to {s}.",
            Self::Scored { .. } => "{p} earned a token, due to {s}.",
            Self::Annihilation { .. } => "{ps} annihilated at the end of the round: they each had an effective {n}.",
            Self::TurnStart { .. } => "{p} starts their {nth} turn.",
            Self::TurnEnd { .. } => "{p} ends their turn.",
            Self::InsanityChecks { .. } => "{p} starts insanity checks ({n} to do).",
            Self::InsanityCheck { .. } => "{p} does their {nth} insanity check.",
            Self::CardPlay { .. } => "{p} goes to play {c} as {po:mode} targeting {po:targets}.",
            Self::Draw { .. } => "{p} draws {c} for {s}.",
            Self::Discard { .. } => "{p} discards {c} due to {s}.",
            Self::SeeCard { .. } => "Showing {ps:1}'s {c} to {ps:0} (due to {s}).",
            Self::Shuffle { .. } => "Shuffled {c} into the deck.",
            Self::Death { .. } => "{p} dies due to {s}.",
            Self::CancelDeath { .. } => "But {p} did not die, due to {s}.",
            Self::ProtectionLoss { .. } => "{p}'s protection from {s} wore off.",
            Self::WhichPlay { .. } => "Asked what card/option to play.",
            Self::MultiPlay { .. } => "Forced to play.",
            Self::WhoStarts { .. } => "Asked who starts.",
            Self::WhichCard { .. } => "Asked which card to be involved in {s}.",
            Self::QuickPlay { .. } => "Asked whether to respond to: {e}",
            Self::OrderEventGroups { .. } => "Asked how to order these events.",
            Self::Custom(custom) => &custom.template,
        }
    }

    /// Internal narration, for logs and error messages.
    #[must_use]
    pub fn describe(&self, store: &dyn EntityStore) -> String {
        let view = View::new(Flavor::Private, ObserverKey::Spectator, store);
        self.render(&view, Narration::Internal)
            .label()
            .unwrap_or_default()
            .to_string()
    }

    fn render(&self, view: &View<'_>, narration: Narration) -> Projection {
        let mut builder = Projection::builder("context", view.flavor(), view.observer())
            .attr("type", Projected::Text(self.kind().to_string()));
        if let Some(player) = self.player() {
            builder = builder.attr("player", view.project(&player)).subject(player);
        }
        if !self.players().is_empty() {
            builder = builder.attr("players", view.project(self.players()));
        }
        if let Some(card) = self.card() {
            builder = builder.attr("card", view.project(&card));
        }
        if let Some(source) = self.source() {
            builder = builder.attr("source", view.project(source));
        }
        if let Some(number) = self.number() {
            builder = builder.attr("number", Projected::Int(number));
        }
        if let Some(option) = self.play_option() {
            builder = builder.attr("play_option", view.project(option));
        }
        match self {
            Self::Scored { earned, .. } => {
                let earned = match earned {
                    Earned::Heart => "heart",
                    Earned::InsaneHeart => "insane heart",
                };
                builder = builder.attr("earned", Projected::Text(earned.into()));
            }
            Self::QuickPlay { trigger, .. } => {
                // The responder only sees the trigger's private side if its
                // audience includes them.
                let entitled = narration == Narration::Internal
                    || view
                        .observer()
                        .player()
                        .is_some_and(|player| trigger.audience().includes(player));
                let trigger_view = if entitled { *view } else { view.with_flavor(Flavor::Public) };
                builder = builder.attr("trigger", trigger_view.project(trigger.as_ref()));
            }
            _ => {}
        }
        let label = narrate::render(self.template(narration), |name| builder.get(name));
        builder.label(label).build()
    }
}

impl Visible for Context {
    fn project(&self, view: &View<'_>) -> Projected {
        Projected::Entity(self.render(view, view.flavor().into()).into())
    }
}
