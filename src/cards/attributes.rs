//! Play-option parameters.
//!
//! Cards attach free-form parameters to a play option (the number a Guard
//! names, the card a Capitalist picked). The engine never interprets them;
//! it only projects them for observers.
//!
//! ## Param Types
//!
//! - `Int`: Numbers (a named card value)
//! - `Bool`: Flags
//! - `Text`: Strings (a named card kind)
//! - `Player`: A participant, projected as an identity tag
//! - `Card`: A card, projected through its own cache
//! - `Opaque`: Plug-in data the visibility layer cannot classify

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{CardId, PlayerId};
use crate::visibility::{Projected, View, Visible};

/// Value of one parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Param {
    /// Integer value.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Text value.
    Text(String),
    /// Reference to a player.
    Player(PlayerId),
    /// Reference to a card.
    Card(CardId),
    /// Plug-in data with no projection rule. Projecting it is an integrity warning.
    Opaque(String),
}

impl Param {
    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Param::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Param::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Param::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the player if this is a Player value.
    #[must_use]
    pub fn as_player(&self) -> Option<PlayerId> {
        match self {
            Param::Player(p) => Some(*p),
            _ => None,
        }
    }

    /// Get the card if this is a Card value.
    #[must_use]
    pub fn as_card(&self) -> Option<CardId> {
        match self {
            Param::Card(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<i32> for Param {
    fn from(v: i32) -> Self {
        Param::Int(i64::from(v))
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<PlayerId> for Param {
    fn from(v: PlayerId) -> Self {
        Param::Player(v)
    }
}

impl From<CardId> for Param {
    fn from(v: CardId) -> Self {
        Param::Card(v)
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Param::Int(v) => write!(f, "{v}"),
            Param::Bool(v) => write!(f, "{v}"),
            Param::Text(s) | Param::Opaque(s) => f.write_str(s),
            Param::Player(p) => write!(f, "{p}"),
            Param::Card(c) => write!(f, "{c}"),
        }
    }
}

impl Visible for Param {
    fn project(&self, view: &View<'_>) -> Projected {
        match self {
            Param::Int(v) => Projected::Int(*v),
            Param::Bool(v) => Projected::Bool(*v),
            Param::Text(s) => Projected::Text(s.clone()),
            Param::Player(p) => view.project(p),
            Param::Card(c) => view.project(c),
            Param::Opaque(raw) => view.integrity("opaque play-option parameter", raw.clone()),
        }
    }
}

/// Collection of parameters, ordered by name.
pub type Params = BTreeMap<String, Param>;
