//! # hidden-letters
//!
//! Event-resolution and visibility engine for hidden-information
//! elimination card games in the style of Love Letter.
//!
//! ## Design Principles
//!
//! 1. **Everything is an event**: draws, discards, deaths and plays are
//!    registered as events and resolved from a LIFO queue, so any card can
//!    respond to, reorder or cancel any other card's effect.
//!
//! 2. **Projections, never state**: participants only ever receive
//!    per-observer, read-only projections. What a player may see is
//!    declared once per entity type.
//!
//! 3. **Replayable history**: every announcement is captured once, in both
//!    flavors, so a participant joining late sees exactly what a
//!    participant watching from the start saw.
//!
//! ## Modules
//!
//! - `core`: ids, game state, players, RNG, configuration, errors
//! - `visibility`: public/private projections and their caches
//! - `cards`: card definitions, instances, play options
//! - `events`: events, contexts and narration
//! - `decisions`: questions to one participant, ordering permutations
//! - `info`: info records and the game/round history
//! - `participants`: the participant contract
//! - `stack`: the resolution engine (`Game`)
//! - `rules`: round flow and event helpers

pub mod core;
pub mod visibility;
pub mod cards;
pub mod events;
pub mod decisions;
pub mod info;
pub mod participants;
pub mod stack;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    CardId, EventId, GroupId, InfoId, PlayerId,
    EngineError, EngineResult, Exhausted,
    GameConfig, GameRng, GameState, OrderStart, Player,
};

pub use crate::visibility::{
    private, public, EntityStore, Flavor, ObserverKey, PlayerTag, Projected, Projection, Visible, View,
};

pub use crate::cards::{Card, CardDefinition, Forcing, Param, Params, PlayOption};

pub use crate::events::{Audience, CancelCause, Context, CustomContext, Earned, Event, Source, Status};

pub use crate::decisions::{Decision, DecisionKind, DecisionView, OptionsView, Permutations};

pub use crate::info::{HistoryScope, InfoLog, InfoRecord, InfoView, Stage};

pub use crate::participants::{Participant, RandomParticipant, Unimplemented};

pub use crate::stack::{EventGroup, Game};
