//! Visibility layer: per-observer, read-only projections of mutable state.
//!
//! Every piece of game state a participant can see reaches them as a
//! [`Projection`] built for that participant. An entity declares a public
//! attribute set (everyone, though values may be masked) and a private
//! attribute set (only the entitled owner) once per type; a projection copies
//! those attributes, recursing into nested entities with the same observer,
//! and is frozen from then on.
//!
//! ## Entry points
//!
//! [`public`] and [`private`] project any [`Visible`] value for an observer.
//! Containers recurse element-wise, scalars pass through, entities delegate
//! to their own cached projection.
//!
//! ## Caching
//!
//! - [`LazyCache`]: projections are cached per observer, marked invalid on
//!   demand and rebuilt on the next request (cards).
//! - [`ReactiveCache`]: every mutation rebuilds all issued projections
//!   immediately, so the cache is never stale (players).
//!
//! ## Integrity warnings
//!
//! A value the layer cannot classify (an opaque plug-in parameter, an id that
//! resolves to nothing) is logged and counted through
//! [`EntityStore::integrity_warning`], then passed through raw. Projection
//! continues.

mod cache;
mod projection;
mod value;

pub use cache::{LazyCache, ReactiveCache};
pub use projection::{Entity, Projection, ProjectionBuilder};
pub use value::{PlayerTag, Projected, Visible};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{CardId, PlayerId};

/// Which attribute set a projection exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flavor {
    /// Attributes every observer may see (possibly masked).
    Public,
    /// Attributes only the entitled owner may see.
    Private,
}

/// Normalized identity of whoever a projection is built for.
///
/// Anything that stands for a participant (its id, its identity tag, its
/// own projection) converts to the same key, so a live object and a cached
/// reference to the same participant share one cache slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObserverKey {
    /// A seated participant.
    Player(PlayerId),
    /// An observer with no seat (narration, logs, tests).
    Spectator,
}

impl ObserverKey {
    /// The participant behind this key, if any.
    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Self::Player(id) => Some(id),
            Self::Spectator => None,
        }
    }
}

impl From<PlayerId> for ObserverKey {
    fn from(id: PlayerId) -> Self {
        Self::Player(id)
    }
}

impl From<&PlayerTag> for ObserverKey {
    fn from(tag: &PlayerTag) -> Self {
        Self::Player(tag.id)
    }
}

/// Read access the layer needs to resolve ids while projecting.
pub trait EntityStore {
    /// Cached projection of a card, or `None` if the id is unknown.
    fn card_projection(&self, card: CardId, flavor: Flavor, observer: ObserverKey) -> Option<Arc<Projection>>;

    /// Public identity tag of a player, or `None` if the id is unknown.
    fn player_tag(&self, player: PlayerId) -> Option<PlayerTag>;

    /// Record that a value could not be classified.
    fn integrity_warning(&self, detail: &str);
}

/// Projection parameters threaded through a recursive projection.
#[derive(Clone, Copy)]
pub struct View<'a> {
    flavor: Flavor,
    observer: ObserverKey,
    store: &'a dyn EntityStore,
}

impl<'a> View<'a> {
    /// Create a view.
    pub fn new(flavor: Flavor, observer: ObserverKey, store: &'a dyn EntityStore) -> Self {
        Self {
            flavor,
            observer,
            store,
        }
    }

    /// Attribute set being projected.
    #[must_use]
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Who the projection is for.
    #[must_use]
    pub fn observer(&self) -> ObserverKey {
        self.observer
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &'a dyn EntityStore {
        self.store
    }

    /// Same observer and store, different attribute set.
    #[must_use]
    pub fn with_flavor(self, flavor: Flavor) -> Self {
        Self { flavor, ..self }
    }

    /// Is this view built for `player`?
    #[must_use]
    pub fn is_for(&self, player: PlayerId) -> bool {
        self.observer == ObserverKey::Player(player)
    }

    /// Project a nested value with this view.
    pub fn project<V: Visible + ?Sized>(&self, value: &V) -> Projected {
        value.project(self)
    }

    /// Report an unclassifiable value and fall back to its raw rendering.
    pub fn integrity(&self, detail: &str, raw: String) -> Projected {
        self.store.integrity_warning(detail);
        Projected::Raw(raw)
    }
}

/// Project `value` with its public attributes for `observer`.
pub fn public<V: Visible + ?Sized>(
    value: &V,
    observer: impl Into<ObserverKey>,
    store: &dyn EntityStore,
) -> Projected {
    value.project(&View::new(Flavor::Public, observer.into(), store))
}

/// Project `value` with its private attributes for `observer`.
pub fn private<V: Visible + ?Sized>(
    value: &V,
    observer: impl Into<ObserverKey>,
    store: &dyn EntityStore,
) -> Projected {
    value.project(&View::new(Flavor::Private, observer.into(), store))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeMap;

    use super::*;

    /// Store with one card and one player, projecting the card's name only privately.
    struct TinyStore {
        warnings: Cell<u32>,
        cache: LazyCache,
        builds: Cell<u32>,
    }

    impl TinyStore {
        fn new() -> Self {
            Self {
                warnings: Cell::new(0),
                cache: LazyCache::default(),
                builds: Cell::new(0),
            }
        }
    }

    impl EntityStore for TinyStore {
        fn card_projection(&self, card: CardId, flavor: Flavor, observer: ObserverKey) -> Option<Arc<Projection>> {
            if card != CardId(1) {
                return None;
            }
            Some(self.cache.get_or_build(flavor, observer, || {
                self.builds.set(self.builds.get() + 1);
                let name = match flavor {
                    Flavor::Public => Projected::Hidden,
                    Flavor::Private => Projected::Text("Guard".into()),
                };
                Projection::builder("card", flavor, observer).attr("name", name).build()
            }))
        }

        fn player_tag(&self, player: PlayerId) -> Option<PlayerTag> {
            (player == PlayerId(0)).then(|| PlayerTag::new(player, "Alex"))
        }

        fn integrity_warning(&self, _detail: &str) {
            self.warnings.set(self.warnings.get() + 1);
        }
    }

    #[test]
    fn test_scalars_pass_through() {
        let store = TinyStore::new();
        assert_eq!(public(&5i64, PlayerId(0), &store), Projected::Int(5));
        assert_eq!(public("hi", PlayerId(0), &store), Projected::Text("hi".into()));
        assert_eq!(private(&Option::<i64>::None, PlayerId(0), &store), Projected::Null);
        assert_eq!(store.warnings.get(), 0);
    }

    #[test]
    fn test_containers_recurse() {
        let store = TinyStore::new();
        let cards = vec![CardId(1), CardId(1)];

        let Projected::List(items) = private(&cards, PlayerId(0), &store) else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
        let Projected::Entity(card) = &items[0] else {
            panic!("expected entity");
        };
        assert_eq!(card.get("name"), Some(&Projected::Text("Guard".into())));

        let mut map = BTreeMap::new();
        map.insert("who".to_string(), PlayerId(0));
        let Projected::Map(projected) = public(&map, PlayerId(0), &store) else {
            panic!("expected map");
        };
        assert_eq!(projected["who"], Projected::Player(PlayerTag::new(PlayerId(0), "Alex")));
    }

    #[test]
    fn test_public_masks_private_attribute() {
        let store = TinyStore::new();
        let Projected::Entity(card) = public(&CardId(1), PlayerId(0), &store) else {
            panic!("expected entity");
        };
        assert_eq!(card.get("name"), Some(&Projected::Hidden));
    }

    #[test]
    fn test_observer_normalization_shares_cache_slot() {
        let store = TinyStore::new();
        let tag = PlayerTag::new(PlayerId(0), "Alex");

        public(&CardId(1), PlayerId(0), &store);
        public(&CardId(1), &tag, &store);

        assert_eq!(store.builds.get(), 1);
    }

    #[test]
    fn test_dangling_ids_are_integrity_warnings() {
        let store = TinyStore::new();

        let projected = public(&CardId(99), PlayerId(0), &store);
        assert!(matches!(projected, Projected::Raw(_)));

        let projected = public(&PlayerId(7), PlayerId(0), &store);
        assert!(matches!(projected, Projected::Raw(_)));

        assert_eq!(store.warnings.get(), 2);
    }
}
