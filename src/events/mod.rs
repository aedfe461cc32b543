//! Event protocol: events, their contexts and narration.
//!
//! ## Events
//!
//! An [`Event`] couples a [`Context`] with an optional resolution effect, a
//! cancellation callback, pre-events (must resolve first, may cancel it)
//! and post-events (queued once it resolves). Events are owned by the
//! resolution engine in [`stack`](crate::stack) and addressed by
//! [`EventId`](crate::core::EventId).
//!
//! ## Contexts
//!
//! A [`Context`] is a typed description of one occurrence. It decides who
//! sees its private view ([`Audience`]) and carries narration templates for
//! internal, public and private use.

mod context;
mod event;
pub mod narrate;

pub use context::{Audience, Context, CustomContext, Earned, Narration, Source};
pub use event::{CancelCause, CancelFn, EffectFn, Event, Status};
