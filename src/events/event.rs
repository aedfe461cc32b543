//! Events: units of game causality.
//!
//! An [`Event`] is built with a context and optional callbacks, then handed
//! to [`Game::register`](crate::stack::Game::register), which gives it an
//! id and a group. From then on the engine owns it and drives it through
//! its lifecycle:
//!
//! ```text
//! registered -> queued -> fired -> (pre-events drain) -> resolved
//!                  \          \                      \-> cancelled
//!                   \          \-> interrupted (back to queued)
//!                    \-> cancelled
//! ```
//!
//! Resolved and cancelled are terminal. A terminal event is never queued
//! again.

use std::fmt;

use smallvec::SmallVec;

use crate::core::{EngineResult, EventId, GroupId};
use crate::stack::Game;

use super::context::{Context, Source};

/// Resolution effect. Runs at most once.
pub type EffectFn = Box<dyn FnOnce(&mut Game, EventId) -> EngineResult<()>>;

/// Cancellation callback. Runs instead of the effect.
pub type CancelFn = Box<dyn FnOnce(&mut Game, EventId, &CancelCause) -> EngineResult<()>>;

/// Why an event was cancelled.
#[derive(Clone, Debug, PartialEq)]
pub enum CancelCause {
    /// Cancelled directly.
    Cause(Source),
    /// Inherited from a cancelled parent.
    Fizzled { parent: EventId },
    /// Dropped from the queue by [`Game::abandon_queue`](crate::stack::Game::abandon_queue).
    Abandoned,
}

/// Lifecycle position of an event.
#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    Registered,
    Queued,
    /// Fired and not interrupted since.
    Fired,
    Resolved,
    Cancelled(CancelCause),
}

impl Status {
    /// Resolved or cancelled.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled(_))
    }
}

/// An event and its bookkeeping.
pub struct Event {
    context: Context,
    pub(crate) effect: Option<EffectFn>,
    pub(crate) on_cancel: Option<CancelFn>,

    // === Structure ===
    pub(crate) pre: SmallVec<[EventId; 2]>,
    pub(crate) post: SmallVec<[EventId; 2]>,
    pub(crate) parent: Option<EventId>,
    pub(crate) group: Option<GroupId>,

    // === Lifecycle ===
    pub(crate) status: Status,
    pub(crate) ever_fired: bool,
    pub(crate) effect_consumed: bool,
    pub(crate) finalized: bool,
}

impl Event {
    /// Create an event with no effect.
    #[must_use]
    pub fn new(context: Context) -> Self {
        Self {
            context,
            effect: None,
            on_cancel: None,
            pre: SmallVec::new(),
            post: SmallVec::new(),
            parent: None,
            group: None,
            status: Status::Registered,
            ever_fired: false,
            effect_consumed: false,
            finalized: false,
        }
    }

    /// Set the resolution effect.
    #[must_use]
    pub fn on_resolve(mut self, effect: impl FnOnce(&mut Game, EventId) -> EngineResult<()> + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    /// Set the cancellation callback.
    #[must_use]
    pub fn on_cancel(
        mut self,
        callback: impl FnOnce(&mut Game, EventId, &CancelCause) -> EngineResult<()> + 'static,
    ) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    /// Add a registered event that must resolve before this one.
    #[must_use]
    pub fn with_pre(mut self, event: EventId) -> Self {
        self.pre.push(event);
        self
    }

    /// Add a registered event to queue once this one resolves.
    #[must_use]
    pub fn with_post(mut self, event: EventId) -> Self {
        self.post.push(event);
        self
    }

    /// What the event is about.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub(crate) fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Lifecycle position.
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Fired and not interrupted since.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.status == Status::Fired
    }

    /// Fired at least once.
    #[must_use]
    pub fn was_fired(&self) -> bool {
        self.ever_fired
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.status == Status::Resolved
    }

    /// Cancellation cause, if cancelled.
    #[must_use]
    pub fn cancel_cause(&self) -> Option<&CancelCause> {
        match &self.status {
            Status::Cancelled(cause) => Some(cause),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_cause().is_some()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    #[must_use]
    pub fn pre_events(&self) -> &[EventId] {
        &self.pre
    }

    #[must_use]
    pub fn post_events(&self) -> &[EventId] {
        &self.post
    }

    /// Event this one is a pre- or post-event of.
    #[must_use]
    pub fn parent(&self) -> Option<EventId> {
        self.parent
    }

    /// Ordering group (set on registration).
    #[must_use]
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.context.kind())
            .field("status", &self.status)
            .field("group", &self.group)
            .field("pre", &self.pre)
            .field("post", &self.post)
            .field("has_effect", &self.effect.is_some())
            .finish_non_exhaustive()
    }
}
