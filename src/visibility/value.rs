//! Projected values and the [`Visible`] capability.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{CardId, PlayerId};

use super::{Projection, View};

/// Public identity of a player as it appears inside other projections.
///
/// Player references nested in a projection (a card's holder, a context's
/// subject) are identity tags rather than nested player projections, so
/// projecting a card never recurses back into its holder's hand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlayerTag {
    /// Stable identity.
    pub id: PlayerId,
    /// Display name.
    pub name: Arc<str>,
}

impl PlayerTag {
    /// Create a tag.
    pub fn new(id: PlayerId, name: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for PlayerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A value as one observer sees it.
#[derive(Clone, Debug, PartialEq)]
pub enum Projected {
    /// Absent value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Text scalar.
    Text(String),
    /// Identity of a player.
    Player(PlayerTag),
    /// Projection of a nested entity.
    Entity(Arc<Projection>),
    /// Sequence, projected element-wise.
    List(Vec<Projected>),
    /// Mapping, projected value-wise.
    Map(BTreeMap<String, Projected>),
    /// A value the observer is not entitled to see.
    Hidden,
    /// Unclassified value passed through after an integrity warning.
    Raw(String),
}

impl Projected {
    /// Text content, if this is a text scalar.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer scalar.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean scalar.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Player identity, if this is a player reference.
    #[must_use]
    pub fn as_player(&self) -> Option<&PlayerTag> {
        match self {
            Self::Player(tag) => Some(tag),
            _ => None,
        }
    }

    /// Nested projection, if this is an entity.
    #[must_use]
    pub fn as_entity(&self) -> Option<&Arc<Projection>> {
        match self {
            Self::Entity(p) => Some(p),
            _ => None,
        }
    }

    /// Elements, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Projected]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Is this value masked?
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Does this value, or anything nested in it, equal `needle`?
    ///
    /// Used by tests to check a secret never appears anywhere in a projection.
    #[must_use]
    pub fn mentions(&self, needle: &Projected) -> bool {
        if self == needle {
            return true;
        }
        match self {
            Self::Entity(p) => p.attributes().any(|(_, v)| v.mentions(needle)),
            Self::List(items) => items.iter().any(|v| v.mentions(needle)),
            Self::Map(map) => map.values().any(|v| v.mentions(needle)),
            _ => false,
        }
    }
}

impl fmt::Display for Projected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("nobody"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) | Self::Raw(s) => f.write_str(s),
            Self::Player(tag) => write!(f, "{tag}"),
            Self::Entity(p) => write!(f, "{p}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Hidden => f.write_str("?"),
        }
    }
}

/// Anything that can be projected for an observer.
///
/// Implemented for scalars (pass through), containers (element-wise), ids
/// (resolved through the view's store) and the domain types that carry
/// nested state.
pub trait Visible {
    /// Project this value with the view's flavor and observer.
    fn project(&self, view: &View<'_>) -> Projected;
}

impl Visible for Projected {
    fn project(&self, _view: &View<'_>) -> Projected {
        self.clone()
    }
}

impl Visible for bool {
    fn project(&self, _view: &View<'_>) -> Projected {
        Projected::Bool(*self)
    }
}

macro_rules! visible_int {
    ($($ty:ty),*) => {
        $(
            impl Visible for $ty {
                fn project(&self, _view: &View<'_>) -> Projected {
                    Projected::Int(i64::from(*self))
                }
            }
        )*
    };
}

visible_int!(i32, i64, u8, u32);

impl Visible for usize {
    fn project(&self, view: &View<'_>) -> Projected {
        match i64::try_from(*self) {
            Ok(v) => Projected::Int(v),
            Err(_) => view.integrity("usize out of range", self.to_string()),
        }
    }
}

impl Visible for str {
    fn project(&self, _view: &View<'_>) -> Projected {
        Projected::Text(self.to_string())
    }
}

impl Visible for String {
    fn project(&self, _view: &View<'_>) -> Projected {
        Projected::Text(self.clone())
    }
}

impl<T: Visible + ?Sized> Visible for &T {
    fn project(&self, view: &View<'_>) -> Projected {
        (**self).project(view)
    }
}

impl<T: Visible + ?Sized> Visible for Box<T> {
    fn project(&self, view: &View<'_>) -> Projected {
        (**self).project(view)
    }
}

impl<T: Visible + ?Sized> Visible for Arc<T> {
    fn project(&self, view: &View<'_>) -> Projected {
        (**self).project(view)
    }
}

impl<T: Visible> Visible for Option<T> {
    fn project(&self, view: &View<'_>) -> Projected {
        match self {
            Some(value) => value.project(view),
            None => Projected::Null,
        }
    }
}

impl<T: Visible> Visible for [T] {
    fn project(&self, view: &View<'_>) -> Projected {
        Projected::List(self.iter().map(|item| item.project(view)).collect())
    }
}

impl<T: Visible> Visible for Vec<T> {
    fn project(&self, view: &View<'_>) -> Projected {
        self.as_slice().project(view)
    }
}

impl<T: Visible> Visible for BTreeMap<String, T> {
    fn project(&self, view: &View<'_>) -> Projected {
        Projected::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.project(view)))
                .collect(),
        )
    }
}

impl Visible for PlayerId {
    fn project(&self, view: &View<'_>) -> Projected {
        match view.store().player_tag(*self) {
            Some(tag) => Projected::Player(tag),
            None => view.integrity("reference to unknown player", self.to_string()),
        }
    }
}

impl Visible for CardId {
    fn project(&self, view: &View<'_>) -> Projected {
        match view.store().card_projection(*self, view.flavor(), view.observer()) {
            Some(projection) => Projected::Entity(projection),
            None => view.integrity("reference to unknown card", self.to_string()),
        }
    }
}
