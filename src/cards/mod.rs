//! Card system: definitions, instances, play options.
//!
//! ## Card Definitions vs Instances
//!
//! - `CardDefinition`: printed data and behavior of a kind of card, shared
//!   by every copy through an `Arc`
//! - `Card`: one physical card in a game (holder, discard state, how it
//!   was played, projection cache)
//!
//! ## Play options
//!
//! A card offers `PlayOption`s tagged with a [`Forcing`] level. The turn's
//! play decision is built from the options of every held card.

pub mod attributes;
pub mod definition;
pub mod instance;
pub mod play;

pub use attributes::{Param, Params};
pub use definition::CardDefinition;
pub use instance::Card;
pub use play::{Forcing, PlayOption};
