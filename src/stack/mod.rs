//! The resolution engine.
//!
//! [`Game`] owns the state, the event arena, the pending queue, the info log
//! and the participants. Everything that changes the game happens inside an
//! event effect, and every event goes through the queue:
//!
//! 1. The top of the queue is **fired**: announced (if its context
//!    announces itself) and shown to every living player's cards in
//!    priority order. A card may answer with a quick play, which queues new
//!    events on top and *interrupts* the firing; the event goes back to
//!    queued and fires again once the responses are done.
//! 2. A fired event that reaches the top again is **resolved**: its
//!    pre-events are queued first, then its effect runs, its post-events are
//!    queued and the result is announced.
//! 3. A cancelled event is **finalized** when it reaches the top: its cancel
//!    callback runs and its children fizzle with it.
//!
//! Draining can be paused. Pauses nest; only the outermost resume drains.
//! Effects always run paused, so an effect that queues events finishes
//! before any of them fire.
//!
//! ## Example
//!
//! ```
//! use hidden_letters::core::GameConfig;
//! use hidden_letters::events::{Context, Event};
//! use hidden_letters::stack::Game;
//!
//! let mut game = Game::new(GameConfig::default());
//! let alice = game.state_mut().add_player("Alice");
//! let uid = game
//!     .trigger(Event::new(Context::TurnEnd { player: alice }))
//!     .unwrap();
//! assert!(game.event(uid).unwrap().is_resolved());
//! assert!(game.queued().is_empty());
//! ```

mod ordering;
mod queue;
mod resolve;

pub use ordering::EventGroup;
pub use queue::EventQueue;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::{EngineError, EngineResult, EventId, GameConfig, GameState, GroupId, PlayerId};
use crate::events::{CancelCause, Context, Event, Source, Status};
use crate::info::{HistoryScope, InfoLog, InfoRecord, Stage};
use crate::participants::Participant;
use crate::visibility::{Flavor, ObserverKey, Projection};

/// A game in progress.
pub struct Game {
    state: GameState,
    participants: FxHashMap<PlayerId, Box<dyn Participant>>,

    // === Events ===
    events: FxHashMap<EventId, Event>,
    groups: FxHashMap<GroupId, SmallVec<[EventId; 4]>>,
    queue: EventQueue,

    // === Draining ===
    paused: u32,
    draining: bool,
    /// Set whenever something is queued; read by the firing pass.
    interrupted: bool,

    info: InfoLog,
}

impl Game {
    /// Create a game with no players.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self::with_state(GameState::new(config))
    }

    /// Create a game around prepared state.
    #[must_use]
    pub fn with_state(state: GameState) -> Self {
        Self {
            state,
            participants: FxHashMap::default(),
            events: FxHashMap::default(),
            groups: FxHashMap::default(),
            queue: EventQueue::new(),
            paused: 0,
            draining: false,
            interrupted: false,
            info: InfoLog::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    // === Participants ===

    /// Attach (or replace) the participant answering for `player`.
    pub fn set_participant(&mut self, player: PlayerId, participant: Box<dyn Participant>) {
        self.participants.insert(player, participant);
    }

    /// Detach the participant of `player`.
    pub fn remove_participant(&mut self, player: PlayerId) -> Option<Box<dyn Participant>> {
        self.participants.remove(&player)
    }

    pub fn participant_mut(&mut self, player: PlayerId) -> Option<&mut (dyn Participant + 'static)> {
        self.participants.get_mut(&player).map(|p| p.as_mut())
    }

    /// A player's projection for an observer.
    #[must_use]
    pub fn player_view(
        &self,
        player: PlayerId,
        flavor: Flavor,
        observer: impl Into<ObserverKey>,
    ) -> Option<Arc<Projection>> {
        self.state.player_view(player, flavor, observer)
    }

    // === Event arena ===

    /// Take ownership of an event and give it an id and its own group.
    ///
    /// Pre- and post-events named by the event get it as their parent.
    pub fn register(&mut self, mut event: Event) -> EventId {
        let uid = self.state.ids.event();
        let group = self.state.ids.group();
        event.group = Some(group);
        for child in event.pre.iter().chain(event.post.iter()) {
            if let Some(child) = self.events.get_mut(child) {
                child.parent = Some(uid);
            }
        }
        tracing::trace!(%uid, kind = event.context().kind(), "registered");
        self.groups.entry(group).or_default().push(uid);
        self.events.insert(uid, event);
        uid
    }

    #[must_use]
    pub fn event(&self, uid: EventId) -> Option<&Event> {
        self.events.get(&uid)
    }

    pub(crate) fn event_mut(&mut self, uid: EventId) -> EngineResult<&mut Event> {
        self.events.get_mut(&uid).ok_or(EngineError::UnknownEvent(uid))
    }

    fn event_ref(&self, uid: EventId) -> EngineResult<&Event> {
        self.events.get(&uid).ok_or(EngineError::UnknownEvent(uid))
    }

    /// Internal narration of an event.
    #[must_use]
    pub fn describe(&self, uid: EventId) -> String {
        match self.events.get(&uid) {
            Some(event) => event.context().describe(&self.state),
            None => format!("unknown {uid}"),
        }
    }

    fn terminal_error(&self, uid: EventId, operation: &'static str) -> EngineError {
        EngineError::TerminalEvent {
            uid,
            context: self.describe(uid),
            operation,
        }
    }

    /// Add `pre` as a pre-event of `uid`.
    pub fn add_pre(&mut self, uid: EventId, pre: EventId) -> EngineResult<()> {
        if self.event_ref(uid)?.is_terminal() {
            return Err(self.terminal_error(uid, "extended"));
        }
        self.event_mut(pre)?.parent = Some(uid);
        self.event_mut(uid)?.pre.push(pre);
        Ok(())
    }

    /// Add `post` as a post-event of `uid`: it is queued once `uid` resolves.
    pub fn then_run(&mut self, uid: EventId, post: EventId) -> EngineResult<()> {
        if self.event_ref(uid)?.is_terminal() {
            return Err(self.terminal_error(uid, "extended"));
        }
        self.event_mut(post)?.parent = Some(uid);
        self.event_mut(uid)?.post.push(post);
        Ok(())
    }

    /// Merge the groups of `others` into the group of `uid`.
    ///
    /// Grouped events stay together when simultaneous events are ordered.
    pub fn group_with(&mut self, uid: EventId, others: &[EventId]) -> EngineResult<GroupId> {
        let target = self.event_ref(uid)?.group.ok_or(EngineError::UnknownEvent(uid))?;
        for other in others {
            let group = self.event_ref(*other)?.group.ok_or(EngineError::UnknownEvent(*other))?;
            if group == target {
                continue;
            }
            let members = self.groups.remove(&group).unwrap_or_default();
            for member in &members {
                if let Some(event) = self.events.get_mut(member) {
                    event.group = Some(target);
                }
            }
            self.groups.entry(target).or_default().extend(members);
        }
        Ok(target)
    }

    /// Events sharing a group.
    #[must_use]
    pub fn group_members(&self, group: GroupId) -> &[EventId] {
        self.groups.get(&group).map_or(&[], |members| members.as_slice())
    }

    // === Queueing ===

    /// Queued events, bottom first.
    #[must_use]
    pub fn queued(&self) -> &[EventId] {
        self.queue.as_slice()
    }

    /// Put an event on top of the queue and drain.
    ///
    /// Queueing an already queued event does nothing.
    pub fn queue(&mut self, uid: EventId) -> EngineResult<()> {
        self.enqueue(uid, None)?;
        self.drain()
    }

    /// Queue an event directly above `after` (at the bottom if `after` is not
    /// queued) and drain.
    pub fn queue_after(&mut self, uid: EventId, after: EventId) -> EngineResult<()> {
        self.enqueue(uid, Some(after))?;
        self.drain()
    }

    /// Queue events so they resolve in the given order, then drain.
    pub fn queue_all(&mut self, events: &[EventId]) -> EngineResult<()> {
        for uid in events.iter().rev() {
            self.enqueue(*uid, None)?;
        }
        self.drain()
    }

    /// Register and queue.
    pub fn trigger(&mut self, event: Event) -> EngineResult<EventId> {
        let uid = self.register(event);
        self.queue(uid)?;
        Ok(uid)
    }

    fn enqueue(&mut self, uid: EventId, after: Option<EventId>) -> EngineResult<()> {
        let event = self.event_ref(uid)?;
        if event.is_terminal() {
            return Err(self.terminal_error(uid, "queued"));
        }
        if self.queue.contains(uid) {
            tracing::debug!(%uid, "already queued");
            return Ok(());
        }
        let event = self.event_mut(uid)?;
        if event.status == Status::Registered {
            event.status = Status::Queued;
        }
        match after {
            Some(after) => self.queue.insert_after(uid, after),
            None => self.queue.push(uid),
        }
        self.interrupted = true;
        tracing::trace!(%uid, depth = self.queue.len(), "queued");
        Ok(())
    }

    // === Cancellation ===

    /// Cancel an event. Its pre- and post-events fizzle with it.
    ///
    /// The cancel callback runs when the event is finalized: when it reaches
    /// the top of the queue, or immediately if it is not queued.
    pub fn cancel(&mut self, uid: EventId, source: Source) -> EngineResult<()> {
        if self.event_ref(uid)?.is_terminal() {
            return Err(self.terminal_error(uid, "cancelled"));
        }
        tracing::debug!(%uid, event = %self.describe(uid), cause = ?source, "cancelled");
        self.event_mut(uid)?.status = Status::Cancelled(CancelCause::Cause(source));
        self.fizzle_children(uid);
        if !self.queue.contains(uid) {
            self.finalize_cancelled(uid)?;
        }
        Ok(())
    }

    fn fizzle_children(&mut self, parent: EventId) {
        let children: SmallVec<[EventId; 4]> = match self.events.get(&parent) {
            Some(event) => event.pre.iter().chain(event.post.iter()).copied().collect(),
            None => return,
        };
        for child in children {
            let Some(event) = self.events.get_mut(&child) else {
                continue;
            };
            if event.is_terminal() {
                continue;
            }
            event.status = Status::Cancelled(CancelCause::Fizzled { parent });
            self.fizzle_children(child);
        }
    }

    /// Drop everything queued without running effects or callbacks.
    ///
    /// The way out after an effect failure. Returns the dropped events.
    pub fn abandon_queue(&mut self) -> Vec<EventId> {
        let dropped = self.queue.take_all();
        for uid in &dropped {
            if let Some(event) = self.events.get_mut(uid) {
                if !event.is_terminal() {
                    event.status = Status::Cancelled(CancelCause::Abandoned);
                }
                event.effect = None;
                event.on_cancel = None;
                event.finalized = true;
            }
        }
        if !dropped.is_empty() {
            tracing::warn!(count = dropped.len(), "queue abandoned");
        }
        self.paused = 0;
        self.draining = false;
        dropped
    }

    // === Pausing ===

    /// Stop draining until the matching [`resume`](Self::resume).
    ///
    /// Returns whether draining was already paused.
    pub fn pause(&mut self) -> bool {
        let was_paused = self.paused > 0;
        self.paused += 1;
        was_paused
    }

    /// Undo one pause; drain if it was the last.
    pub fn resume(&mut self) -> EngineResult<()> {
        self.resume_without_drain();
        self.drain()
    }

    /// Undo one pause without draining.
    pub fn resume_without_drain(&mut self) {
        if self.paused == 0 {
            tracing::warn!("resume without a matching pause");
            return;
        }
        self.paused -= 1;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused > 0
    }

    /// Is a draining pass running?
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining
    }

    // === Info ===

    #[must_use]
    pub fn info(&self) -> &InfoLog {
        &self.info
    }

    /// Start a fresh round history.
    pub(crate) fn start_round_history(&mut self) {
        self.info.start_round();
    }

    /// Announce a context that no event carries.
    pub fn announce(&mut self, context: &Context) {
        self.emit(None, context, Stage::Resolved);
    }

    pub(crate) fn emit_for(&mut self, uid: EventId, stage: Stage) {
        let Some(context) = self.events.get(&uid).map(|event| event.context().clone()) else {
            return;
        };
        self.emit(Some(uid), &context, stage);
    }

    fn emit(&mut self, event: Option<EventId>, context: &Context, stage: Stage) {
        let id = self.state.ids.info();
        let record = self.info.push(InfoRecord::capture(id, stage, event, context, &self.state));
        tracing::debug!(info = %id, kind = record.kind(), "{}", record.context(Flavor::Public));
        for player in self.state.seated().to_vec() {
            self.deliver(&record, player, false);
        }
    }

    fn deliver(&mut self, record: &InfoRecord, player: PlayerId, force: bool) {
        if !self.info.mark_sent(record.id(), player) && !force {
            return;
        }
        let Some(participant) = self.participants.get_mut(&player) else {
            return;
        };
        if participant.notify(&record.view_for(player)).is_err() {
            tracing::debug!(%player, info = %record.id(), "participant does not take info");
        }
    }

    /// Send `player` a history. Records they already received are skipped
    /// unless `force` is set.
    pub fn show_history(&mut self, player: PlayerId, scope: HistoryScope, force: bool) {
        for record in self.info.history(scope) {
            self.deliver(&record, player, force);
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("queue", &self.queue)
            .field("paused", &self.paused)
            .field("draining", &self.draining)
            .field("events", &self.events.len())
            .field("info", &self.info.len())
            .finish_non_exhaustive()
    }
}
