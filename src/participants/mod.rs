//! Participants: whoever answers decisions and receives info for a seat.
//!
//! The engine calls a [`Participant`] synchronously. Both callbacks have
//! defaults returning [`Unimplemented`], which the engine treats as a
//! protocol violation: decisions fall back to a random choice, info is
//! dropped for that participant.
//!
//! Strategies and bots live outside the crate; [`RandomParticipant`] is
//! the one reference implementation.

use thiserror::Error;

use crate::core::GameRng;
use crate::decisions::{DecisionView, OptionsView};
use crate::info::InfoView;
use crate::visibility::Projected;

/// A participant callback the implementation does not provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("participant callback not implemented")]
pub struct Unimplemented;

/// Decision and notification surface of one seat.
pub trait Participant {
    /// Choose one of `decision.options()` and return it as projected.
    fn decide(&mut self, decision: &DecisionView) -> Result<Projected, Unimplemented> {
        let _ = decision;
        Err(Unimplemented)
    }

    /// Receive an info record.
    fn notify(&mut self, info: &InfoView) -> Result<(), Unimplemented> {
        let _ = info;
        Err(Unimplemented)
    }
}

/// Answers every decision uniformly at random and ignores info.
#[derive(Clone, Debug)]
pub struct RandomParticipant {
    rng: GameRng,
}

impl RandomParticipant {
    /// Create with its own seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: GameRng::new(seed) }
    }
}

impl Participant for RandomParticipant {
    fn decide(&mut self, decision: &DecisionView) -> Result<Projected, Unimplemented> {
        let options: &OptionsView = decision.options();
        let count = options.count();
        if count == 0 {
            return Ok(Projected::Null);
        }
        Ok(options.answer_at(self.rng.gen_index(count)).unwrap_or(Projected::Null))
    }

    fn notify(&mut self, _info: &InfoView) -> Result<(), Unimplemented> {
        Ok(())
    }
}
