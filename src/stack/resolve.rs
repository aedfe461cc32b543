//! Draining: firing, resolving and finalizing the top of the queue.

use smallvec::SmallVec;

use crate::cards::PlayOption;
use crate::core::{CardId, EngineError, EngineResult, EventId, PlayerId};
use crate::decisions::{Decision, DecisionKind};
use crate::events::{Context, Source, Status};
use crate::info::Stage;

use super::Game;

impl Game {
    /// Work the queue until it is empty or paused.
    ///
    /// Does nothing while paused or when a draining pass is already running
    /// further up the call stack.
    pub fn drain(&mut self) -> EngineResult<()> {
        if self.draining || self.paused > 0 {
            return Ok(());
        }
        self.draining = true;
        let result = self.drain_queue();
        self.draining = false;
        result
    }

    fn drain_queue(&mut self) -> EngineResult<()> {
        let mut survivors_checked = false;
        loop {
            while self.paused == 0 {
                let Some(top) = self.queue.top() else {
                    break;
                };
                let event = self.event_ref(top)?;
                if event.is_cancelled() || event.is_fired() {
                    self.resolve(top)?;
                } else {
                    self.fire(top)?;
                }
            }
            if self.paused > 0 || survivors_checked {
                return Ok(());
            }
            survivors_checked = true;
            if !self.check_survivors()? {
                return Ok(());
            }
        }
    }

    /// Announce an event and give every living player's cards a chance to
    /// respond. A response interrupts the firing.
    fn fire(&mut self, uid: EventId) -> EngineResult<()> {
        self.interrupted = false;
        let event = self.event_mut(uid)?;
        let first = !event.ever_fired;
        event.ever_fired = true;
        event.status = Status::Fired;
        let context = event.context().clone();
        tracing::trace!(%uid, first, "firing");

        if first && context.announces_on_fire() {
            self.emit(Some(uid), &context, Stage::Fired);
        }
        if !self.state.is_active() {
            return Ok(());
        }

        let living = self.state.living();
        for player in self.state.priority_order(context.targets(), &living) {
            self.offer_responses(player, uid, &context)?;
            if self.interrupted {
                let event = self.event_mut(uid)?;
                if event.status == Status::Fired {
                    event.status = Status::Queued;
                }
                tracing::debug!(%uid, %player, "firing interrupted");
                return Ok(());
            }
        }
        Ok(())
    }

    /// Ask `player` whether to answer a firing event with a quick play.
    fn offer_responses(&mut self, player: PlayerId, uid: EventId, context: &Context) -> EngineResult<()> {
        let Some(record) = self.state.player(player) else {
            return Ok(());
        };
        let cards: SmallVec<[CardId; 8]> = record.discard().iter().chain(record.hand()).copied().collect();

        let mut responses: Vec<Option<PlayOption>> = Vec::new();
        for card in cards {
            let Some(def) = self.state.definition(card) else {
                continue;
            };
            if !def.has_reaction() {
                continue;
            }
            for option in def.on_event(self, card, uid)? {
                responses.push(Some(option.quick()));
            }
        }
        if responses.is_empty() {
            return Ok(());
        }

        // Not responding is always an option, and the default.
        responses.insert(0, None);
        let decision = Decision::new(
            DecisionKind::QuickPlay,
            Context::QuickPlay {
                player,
                trigger: Box::new(context.clone()),
            },
            responses,
        );
        if let Some(Some(option)) = decision.ask(self, player) {
            tracing::debug!(%uid, %player, card = %option.card, "quick play in response");
            crate::rules::trigger_play(self, option)?;
        }
        Ok(())
    }

    /// Resolve the top event: finalize it if cancelled, otherwise queue its
    /// pending pre-events or run its effect.
    fn resolve(&mut self, uid: EventId) -> EngineResult<()> {
        let event = self.event_ref(uid)?;
        if event.is_cancelled() {
            return self.finalize_cancelled(uid);
        }

        let pending: SmallVec<[EventId; 2]> = event
            .pre
            .iter()
            .copied()
            .filter(|pre| self.events.get(pre).is_some_and(|pre| !pre.is_terminal()))
            .collect();
        if !pending.is_empty() {
            for pre in &pending {
                self.queue.remove(*pre);
            }
            tracing::trace!(%uid, count = pending.len(), "queueing pre-events");
            return self.queue_ordered(uid, &pending);
        }

        let event = self.event_mut(uid)?;
        let effect = event.effect.take();
        if effect.is_none() && event.effect_consumed {
            return Err(EngineError::EffectAlreadyConsumed {
                uid,
                context: self.describe(uid),
            });
        }
        event.effect_consumed = true;

        self.pause();
        if let Some(effect) = effect {
            if let Err(source) = effect(self, uid) {
                self.resume_without_drain();
                tracing::error!(%uid, event = %self.describe(uid), %source, "effect failed");
                return Err(EngineError::EffectFailed {
                    uid,
                    context: self.describe(uid),
                    source: Box::new(source),
                });
            }
        }

        if self.event_ref(uid)?.is_cancelled() {
            // Cancelled by its own effect: no post-events, no announcement.
            self.event_mut(uid)?.finalized = true;
            self.queue.remove(uid);
            self.finalize_children(uid)?;
            self.resume_without_drain();
            return Ok(());
        }

        let post: SmallVec<[EventId; 2]> = self.event_ref(uid)?.post.clone();
        self.queue_ordered(uid, &post)?;
        self.event_mut(uid)?.status = Status::Resolved;
        self.queue.remove(uid);
        tracing::trace!(%uid, "resolved");
        self.emit_for(uid, Stage::Resolved);
        self.resume_without_drain();
        Ok(())
    }

    /// Run the cancel callback of a cancelled event, once.
    pub(super) fn finalize_cancelled(&mut self, uid: EventId) -> EngineResult<()> {
        let event = self.event_mut(uid)?;
        if event.finalized {
            return Ok(());
        }
        let Some(cause) = event.cancel_cause().cloned() else {
            return Ok(());
        };
        event.finalized = true;
        event.effect = None;
        let callback = event.on_cancel.take();
        self.queue.remove(uid);
        tracing::trace!(%uid, ?cause, "finalizing cancelled event");

        if let Some(callback) = callback {
            self.pause();
            let result = callback(self, uid, &cause);
            self.resume_without_drain();
            result?;
        }
        self.finalize_children(uid)
    }

    /// Finalize cancelled children that will never reach the top of the queue.
    fn finalize_children(&mut self, uid: EventId) -> EngineResult<()> {
        let event = self.event_ref(uid)?;
        let children: SmallVec<[EventId; 4]> = event.pre.iter().chain(event.post.iter()).copied().collect();
        for child in children {
            let unqueued = !self.queue.contains(child);
            let cancelled = self.events.get(&child).is_some_and(|child| child.is_cancelled());
            if unqueued && cancelled {
                self.finalize_cancelled(child)?;
            }
        }
        Ok(())
    }

    /// Queue `events` on behalf of `main` so they resolve in an order the
    /// owners agree on. Terminal and already queued events are skipped.
    fn queue_ordered(&mut self, main: EventId, events: &[EventId]) -> EngineResult<()> {
        let ready: Vec<EventId> = events
            .iter()
            .copied()
            .filter(|uid| !self.queue.contains(*uid))
            .filter(|uid| self.events.get(uid).is_some_and(|event| !event.is_terminal()))
            .collect();
        if ready.is_empty() {
            return Ok(());
        }
        let order = if ready.len() > 1 {
            self.order_events(main, &ready)
        } else {
            ready
        };
        for uid in order.into_iter().rev() {
            self.enqueue(uid, None)?;
        }
        Ok(())
    }

    /// End the round if at most one player is left standing.
    ///
    /// Returns whether anything was triggered.
    fn check_survivors(&mut self) -> EngineResult<bool> {
        if !self.state.is_active() || self.state.ending {
            return Ok(false);
        }
        let living = self.state.living();
        match living.as_slice() {
            [survivor] => {
                tracing::debug!(player = %survivor, "one survivor");
                crate::rules::trigger_round_win(self, *survivor, Source::LastAlive)?;
                Ok(true)
            }
            [] => {
                tracing::debug!("no survivors");
                crate::rules::end_round(self, Source::NoSurvivors, None)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
