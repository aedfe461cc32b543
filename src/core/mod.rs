//! Core engine types: ids, state arena, players, RNG, configuration, errors.
//!
//! Nothing in here knows about events or participants. The resolution
//! engine in [`crate::stack`] drives `GameState` through its public
//! mutators.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod error;
pub mod state;

pub use entity::{CardId, EventId, GroupId, IdAllocator, InfoId, PlayerId};
pub use player::Player;
pub use rng::GameRng;
pub use config::GameConfig;
pub use error::{EngineError, EngineResult, Exhausted};
pub use state::{GameState, OrderStart};
