//! Engine error types.
//!
//! Only two kinds of failure ever reach a caller as a hard error:
//! invariant violations and failures raised inside a resolution effect.
//! Protocol violations by participants and visibility integrity gaps are
//! logged and recovered from in place; exhaustion of the draw source is
//! converted into a round end by the effect that hit it.

use thiserror::Error;

use super::entity::{CardId, EventId, PlayerId};

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Someone tried to set an attribute on a constructed projection.
    #[error("projection of {kind} is frozen: cannot set '{attribute}'")]
    FrozenProjection {
        /// Entity kind of the projection.
        kind: &'static str,
        /// Attribute that was written.
        attribute: String,
    },

    /// An event that already resolved or was cancelled was operated on.
    #[error("{uid} is terminal ({context}); it cannot be {operation}")]
    TerminalEvent {
        /// The offending event.
        uid: EventId,
        /// Internal narration of the event's context.
        context: String,
        /// What was attempted ("queued", "cancelled", ...).
        operation: &'static str,
    },

    /// An event id that the engine does not know.
    #[error("unknown event {0}")]
    UnknownEvent(EventId),

    /// A player id that the engine does not know.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// A card id that the engine does not know.
    #[error("unknown card {0}")]
    UnknownCard(CardId),

    /// A fired event whose effect already ran (and failed) was resolved again.
    #[error("{uid} ({context}) already consumed its effect; abandon the queue to recover")]
    EffectAlreadyConsumed {
        /// The offending event.
        uid: EventId,
        /// Internal narration of the event's context.
        context: String,
    },

    /// A resolution effect failed. The event stays on the queue, fired but unresolved.
    #[error("effect of {uid} ({context}) failed: {source}")]
    EffectFailed {
        /// The offending event.
        uid: EventId,
        /// Internal narration of the event's context.
        context: String,
        /// Underlying failure.
        #[source]
        source: Box<EngineError>,
    },

    /// A card was expected in a zone it is not in.
    #[error("{card} is not in {player}'s {zone}")]
    NotInZone {
        /// The card.
        card: CardId,
        /// Owner of the zone.
        player: PlayerId,
        /// Zone name ("hand", "discard").
        zone: &'static str,
    },

    /// An operation that is only legal between rounds was attempted mid-round.
    #[error("cannot {0} while a round is running")]
    RoundActive(&'static str),

    /// A round was started without enough seated players.
    #[error("a round needs {needed} seated players, {seated} are seated")]
    NotEnoughPlayers {
        /// Minimum seated players.
        needed: usize,
        /// Players seated.
        seated: usize,
    },

    /// Failure reported by a card plug-in.
    #[error("card plug-in failed: {0}")]
    Plugin(String),
}

impl EngineError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::FrozenProjection { .. } => "FROZEN_PROJECTION",
            Self::TerminalEvent { .. } => "TERMINAL_EVENT",
            Self::UnknownEvent(_) => "UNKNOWN_EVENT",
            Self::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            Self::UnknownCard(_) => "UNKNOWN_CARD",
            Self::EffectAlreadyConsumed { .. } => "EFFECT_CONSUMED",
            Self::EffectFailed { .. } => "EFFECT_FAILED",
            Self::NotInZone { .. } => "NOT_IN_ZONE",
            Self::RoundActive(_) => "ROUND_ACTIVE",
            Self::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            Self::Plugin(_) => "PLUGIN",
        }
    }

    /// Whether the current round can continue after this error.
    ///
    /// Every engine error is fatal to the operation that raised it; an
    /// effect failure is also fatal to the draining pass.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RoundActive(_) | Self::NotEnoughPlayers { .. })
    }
}

/// A finite shared resource was empty when requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{resource} is exhausted")]
pub struct Exhausted {
    /// What ran out ("deck", "aside").
    pub resource: &'static str,
}

/// Convenience alias used throughout the crate.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let err = EngineError::FrozenProjection {
            kind: "card",
            attribute: "name".into(),
        };
        assert_eq!(err.code(), "FROZEN_PROJECTION");
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_effect_failure_carries_context() {
        let err = EngineError::EffectFailed {
            uid: EventId(4),
            context: "Alex draws".into(),
            source: Box::new(EngineError::Plugin("boom".into())),
        };
        let msg = err.to_string();
        assert!(msg.contains("Event(4)"));
        assert!(msg.contains("Alex draws"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_exhausted_message() {
        assert_eq!(Exhausted { resource: "deck" }.to_string(), "deck is exhausted");
    }
}
