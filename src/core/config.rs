//! Game configuration.
//!
//! Hosts configure a game once, before the first round, with a
//! [`GameConfig`]. The engine never hardcodes scoring thresholds or deck
//! setup.

use serde::{Deserialize, Serialize};

/// Configuration for one game.
///
/// ```
/// use hidden_letters::core::GameConfig;
///
/// let config = GameConfig::new(7)
///     .with_hearts_to_win(1)
///     .with_stacking(vec![vec!["GUARD".into(), "PRIEST".into()]]);
///
/// assert_eq!(config.hearts_to_win, 1);
/// assert_eq!(config.stacking_for_round(0), Some(&["GUARD".to_string(), "PRIEST".to_string()][..]));
/// assert_eq!(config.stacking_for_round(1), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the game RNG.
    pub seed: u64,

    /// Sane round wins needed to win the game.
    pub hearts_to_win: u32,

    /// Insane round wins needed to win the game.
    pub insane_hearts_to_win: u32,

    /// Cards set aside from the deck at the start of each round.
    pub aside_count: usize,

    /// Per round, card kinds forced to the top of the deck (first drawn first).
    pub deck_stacking: Vec<Vec<String>>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            hearts_to_win: 2,
            insane_hearts_to_win: 3,
            aside_count: 2,
            deck_stacking: Vec::new(),
        }
    }
}

impl GameConfig {
    /// Default configuration with a specific seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Set the sane round wins needed.
    #[must_use]
    pub fn with_hearts_to_win(mut self, hearts: u32) -> Self {
        self.hearts_to_win = hearts;
        self
    }

    /// Set the insane round wins needed.
    #[must_use]
    pub fn with_insane_hearts_to_win(mut self, hearts: u32) -> Self {
        self.insane_hearts_to_win = hearts;
        self
    }

    /// Set how many cards are put aside each round.
    #[must_use]
    pub fn with_aside(mut self, count: usize) -> Self {
        self.aside_count = count;
        self
    }

    /// Set the deck stacking for successive rounds.
    #[must_use]
    pub fn with_stacking(mut self, stacking: Vec<Vec<String>>) -> Self {
        self.deck_stacking = stacking;
        self
    }

    /// Stacking for a zero-based round index, if any.
    #[must_use]
    pub fn stacking_for_round(&self, round: usize) -> Option<&[String]> {
        self.deck_stacking.get(round).map(Vec::as_slice)
    }
}
