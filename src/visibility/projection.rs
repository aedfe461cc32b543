//! Frozen projections and the [`Entity`] capability that builds them.

use std::fmt;

use crate::core::{EngineError, EngineResult, PlayerId};

use super::{Flavor, ObserverKey, Projected, View};

/// Immutable, observer-specific snapshot of an entity.
///
/// Built in one step by a [`ProjectionBuilder`]; there is no way to change
/// a projection afterwards. [`Projection::try_set`] exists so callers that
/// attempt a write get a typed error instead of silently diverging.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    kind: &'static str,
    flavor: Flavor,
    observer: ObserverKey,
    subject: Option<PlayerId>,
    attrs: Vec<(&'static str, Projected)>,
    label: Option<String>,
}

impl Projection {
    /// Start building a projection.
    pub fn builder(kind: &'static str, flavor: Flavor, observer: ObserverKey) -> ProjectionBuilder {
        ProjectionBuilder {
            inner: Projection {
                kind,
                flavor,
                observer,
                subject: None,
                attrs: Vec::new(),
                label: None,
            },
        }
    }

    /// Entity kind ("card", "player", "context", ...).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Attribute set this projection exposes.
    #[must_use]
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Who this projection was built for.
    #[must_use]
    pub fn observer(&self) -> ObserverKey {
        self.observer
    }

    /// The participant this projection describes, for player projections.
    #[must_use]
    pub fn subject(&self) -> Option<PlayerId> {
        self.subject
    }

    /// Narration label, if the entity provides one.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Projected> {
        self.attrs.iter().find(|(key, _)| *key == name).map(|(_, value)| value)
    }

    /// Is the attribute present in this projection?
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Text attribute.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Projected::as_text)
    }

    /// Integer attribute.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Projected::as_int)
    }

    /// Boolean attribute.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Projected::as_bool)
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, &Projected)> {
        self.attrs.iter().map(|(key, value)| (*key, value))
    }

    /// Attempt to write an attribute. Always fails.
    pub fn try_set(&self, attribute: &str, _value: Projected) -> EngineResult<()> {
        Err(EngineError::FrozenProjection {
            kind: self.kind,
            attribute: attribute.to_string(),
        })
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => f.write_str(label),
            None => f.write_str(self.kind),
        }
    }
}

/// One-shot constructor for a [`Projection`].
#[derive(Debug)]
pub struct ProjectionBuilder {
    inner: Projection,
}

impl ProjectionBuilder {
    /// Add an attribute. A repeated name replaces the earlier value.
    #[must_use]
    pub fn attr(mut self, name: &'static str, value: Projected) -> Self {
        match self.inner.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.inner.attrs.push((name, value)),
        }
        self
    }

    /// Record which participant the projection describes.
    #[must_use]
    pub fn subject(mut self, player: PlayerId) -> Self {
        self.inner.subject = Some(player);
        self
    }

    /// Set the narration label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.inner.label = Some(label.into());
        self
    }

    /// Peek at an attribute added so far.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Projected> {
        self.inner.get(name)
    }

    /// Freeze.
    #[must_use]
    pub fn build(self) -> Projection {
        self.inner
    }
}

/// A domain object with declared public and private attribute sets.
///
/// The sets are associated constants, so they are fixed per type and can
/// never change at runtime.
pub trait Entity {
    /// Kind recorded on every projection of this type.
    const KIND: &'static str;

    /// Attributes every observer may see (values may still be masked).
    const PUBLIC_ATTRS: &'static [&'static str];

    /// Attributes only the entitled owner may see.
    const PRIVATE_ATTRS: &'static [&'static str];

    /// Project one declared attribute.
    fn attribute(&self, name: &str, view: &View<'_>) -> Projected;

    /// Participant described by this entity, if any.
    fn subject(&self) -> Option<PlayerId> {
        None
    }

    /// Final touches on a projection (usually the narration label).
    fn finish(&self, builder: ProjectionBuilder, _view: &View<'_>) -> ProjectionBuilder {
        builder
    }

    /// Build a fresh projection for the view.
    fn build_projection(&self, view: &View<'_>) -> Projection {
        let names = match view.flavor() {
            Flavor::Public => Self::PUBLIC_ATTRS,
            Flavor::Private => Self::PRIVATE_ATTRS,
        };
        let mut builder = Projection::builder(Self::KIND, view.flavor(), view.observer());
        for name in names {
            builder = builder.attr(name, self.attribute(name, view));
        }
        if let Some(subject) = self.subject() {
            builder = builder.subject(subject);
        }
        self.finish(builder, view).build()
    }
}
