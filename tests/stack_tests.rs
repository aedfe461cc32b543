//! Resolution engine integration tests.
//!
//! These tests drive the event queue directly: ordering, pausing,
//! cancellation, failure recovery and the ordering of simultaneous events.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use hidden_letters::core::{EngineError, EventId, GameConfig, PlayerId};
use hidden_letters::decisions::DecisionKind;
use hidden_letters::events::{CancelCause, Context, Event, Source, Status};
use hidden_letters::info::HistoryScope;
use hidden_letters::stack::Game;
use hidden_letters::visibility::Projected;

use common::{table, Answer};

type Log = Rc<RefCell<Vec<String>>>;

fn solo() -> (Game, PlayerId) {
    let mut game = Game::new(GameConfig::new(3));
    let player = game.state_mut().add_player("Ann");
    game.state_mut().seat(player, None).unwrap();
    (game, player)
}

/// An event that records `name` when it resolves.
fn logged(log: &Log, name: impl Into<String>, player: PlayerId) -> Event {
    let log = Rc::clone(log);
    let name = name.into();
    Event::new(Context::TurnEnd { player }).on_resolve(move |_, _| {
        log.borrow_mut().push(name);
        Ok(())
    })
}

/// An event that records `name` when its cancellation is finalized, and
/// "effect ran" if it resolves instead.
fn cancel_logged(log: &Log, name: impl Into<String>, player: PlayerId) -> Event {
    let cancelled = Rc::clone(log);
    let name = name.into();
    logged(log, "effect ran", player).on_cancel(move |_, _, cause| {
        cancelled.borrow_mut().push(format!("{name} {cause:?}"));
        Ok(())
    })
}

// =============================================================================
// Queue order
// =============================================================================

/// Run a queue of events, some of which queue a follow-up from their effect.
fn run_with_followups(spawns: &[bool]) -> Vec<String> {
    let (mut game, player) = solo();
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    game.pause();
    for (i, spawn) in spawns.iter().enumerate() {
        let inner = Rc::clone(&log);
        let spawn = *spawn;
        let event = Event::new(Context::TurnEnd { player }).on_resolve(move |game, _| {
            inner.borrow_mut().push(i.to_string());
            if spawn {
                let followup = logged(&inner, format!("{i}'"), player);
                game.trigger(followup)?;
            }
            Ok(())
        });
        let uid = game.register(event);
        game.queue(uid).unwrap();
    }
    game.resume().unwrap();
    assert!(game.queued().is_empty());
    let out = log.borrow().clone();
    out
}

proptest! {
    /// Test that the queue resolves last-in first-out, with events queued by
    /// an effect resolving right after it, and that runs are reproducible.
    #[test]
    fn test_lifo_is_deterministic(spawns in proptest::collection::vec(any::<bool>(), 0..12)) {
        let mut expected = Vec::new();
        for (i, spawn) in spawns.iter().enumerate().rev() {
            expected.push(i.to_string());
            if *spawn {
                expected.push(format!("{i}'"));
            }
        }

        let first = run_with_followups(&spawns);
        prop_assert_eq!(&first, &expected);
        prop_assert_eq!(run_with_followups(&spawns), first);
    }
}

/// Test that events queued inside an effect wait for that effect to finish.
#[test]
fn test_effect_runs_paused() {
    let (mut game, player) = solo();
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let inner = Rc::clone(&log);
    let outer = Event::new(Context::TurnEnd { player }).on_resolve(move |game, _| {
        game.trigger(logged(&inner, "child", player))?;
        inner.borrow_mut().push("parent done".into());
        Ok(())
    });
    game.trigger(outer).unwrap();

    assert_eq!(*log.borrow(), vec!["parent done", "child"]);
}

/// Test that only the outermost resume drains the queue, and that pausing
/// reports whether the queue was already paused.
#[test]
fn test_nested_pauses() {
    let (mut game, player) = solo();
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    assert!(!game.pause());
    assert!(game.pause());
    let uid = game.register(logged(&log, "a", player));
    game.queue(uid).unwrap();

    game.resume().unwrap();
    assert!(game.is_paused());
    assert!(log.borrow().is_empty());

    game.resume().unwrap();
    assert!(!game.is_paused());
    assert_eq!(*log.borrow(), vec!["a"]);
}

/// Test that pre-events resolve before their parent and post-events after.
#[test]
fn test_pre_and_post_events() {
    let (mut game, player) = solo();
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let pre = game.register(logged(&log, "pre", player));
    let post = game.register(logged(&log, "post", player));
    let main = game.register(logged(&log, "main", player).with_pre(pre).with_post(post));

    game.queue(main).unwrap();

    assert_eq!(*log.borrow(), vec!["pre", "main", "post"]);
    assert_eq!(game.event(pre).unwrap().parent(), Some(main));
    assert!(game.event(post).unwrap().is_resolved());
}

/// Test that a resolved event cannot be queued or extended again.
#[test]
fn test_terminal_events_reject_operations() {
    let (mut game, player) = solo();
    let done = game.trigger(Event::new(Context::TurnEnd { player })).unwrap();
    let other = game.register(Event::new(Context::TurnEnd { player }));

    assert_eq!(game.queue(done).unwrap_err().code(), "TERMINAL_EVENT");
    assert_eq!(game.cancel(done, Source::Random).unwrap_err().code(), "TERMINAL_EVENT");
    assert_eq!(game.then_run(done, other).unwrap_err().code(), "TERMINAL_EVENT");
}

// =============================================================================
// Cancellation
// =============================================================================

/// Test that cancelling an event fizzles its descendants and leaves settled
/// children alone.
#[test]
fn test_cancel_cascade() {
    let (mut game, player) = solo();
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    let settled = game.trigger(Event::new(Context::TurnEnd { player })).unwrap();
    let grandchild = game.register(cancel_logged(&log, "grandchild", player));
    let child = game.register(cancel_logged(&log, "child", player).with_post(grandchild));
    let parent = game.register(cancel_logged(&log, "parent", player).with_post(child));
    game.then_run(parent, settled).unwrap();

    game.cancel(parent, Source::Player(player)).unwrap();

    assert_eq!(
        game.event(parent).unwrap().cancel_cause(),
        Some(&CancelCause::Cause(Source::Player(player)))
    );
    assert_eq!(
        game.event(child).unwrap().cancel_cause(),
        Some(&CancelCause::Fizzled { parent })
    );
    assert_eq!(
        game.event(grandchild).unwrap().cancel_cause(),
        Some(&CancelCause::Fizzled { parent: child })
    );
    assert!(game.event(settled).unwrap().is_resolved());

    // Not queued, so every callback ran at once, parent first.
    let log = log.borrow();
    assert_eq!(log.len(), 3);
    assert!(log[0].starts_with("parent"));
    assert!(log[1].starts_with("child"));
    assert!(log[2].starts_with("grandchild"));
}

/// Test that resolved children keep their status when the parent is cancelled.
#[test]
fn test_cancel_skips_resolved_children() {
    let (mut game, player) = solo();
    let pre = game.register(Event::new(Context::TurnEnd { player }));
    let parent = game.register(Event::new(Context::TurnEnd { player }).with_pre(pre));
    game.queue(pre).unwrap();
    assert!(game.event(pre).unwrap().is_resolved());

    game.cancel(parent, Source::Random).unwrap();

    assert_eq!(game.event(pre).unwrap().status(), &Status::Resolved);
    assert!(game.event(parent).unwrap().is_cancelled());
}

/// Test that a queued cancelled event runs its callback when it reaches the
/// top, and never its effect.
#[test]
fn test_queued_cancel_finalizes_at_top() {
    let (mut game, player) = solo();
    let log: Log = Rc::new(RefCell::new(Vec::new()));

    game.pause();
    let uid = game.register(cancel_logged(&log, "victim", player));
    game.queue(uid).unwrap();
    game.cancel(uid, Source::Random).unwrap();
    assert!(log.borrow().is_empty());

    game.resume().unwrap();

    assert_eq!(log.borrow().len(), 1);
    assert!(log.borrow()[0].starts_with("victim"));
    assert!(!log.borrow().iter().any(|entry| entry == "effect ran"));
    assert!(game.queued().is_empty());
}

/// Test that an effect cancelling its own event skips its post-events.
#[test]
fn test_self_cancel_skips_post_events() {
    let (mut game, player) = solo();
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let post = game.register(cancel_logged(&log, "post", player));
    let event = Event::new(Context::TurnEnd { player })
        .with_post(post)
        .on_resolve(|game, uid| game.cancel(uid, Source::DeckEmpty));
    let uid = game.trigger(event).unwrap();

    assert!(game.event(uid).unwrap().is_cancelled());
    assert_eq!(
        game.event(post).unwrap().cancel_cause(),
        Some(&CancelCause::Fizzled { parent: uid })
    );
    assert!(game.info().history(HistoryScope::Game).is_empty());
}

// =============================================================================
// Failure recovery
// =============================================================================

/// Test that a failed effect leaves its event fired on the queue, that
/// resolving it again is an error, and that abandoning the queue recovers.
#[test]
fn test_effect_failure_and_recovery() {
    let (mut game, player) = solo();
    let uid = game.register(
        Event::new(Context::TurnEnd { player })
            .on_resolve(|_, _| Err(EngineError::Plugin("card exploded".into()))),
    );

    let err = game.queue(uid).unwrap_err();
    assert_eq!(err.code(), "EFFECT_FAILED");
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.to_string().contains("card exploded"));
    assert_eq!(game.queued(), &[uid]);
    assert_eq!(game.event(uid).unwrap().status(), &Status::Fired);
    assert!(!game.is_paused());
    assert!(!game.is_draining());

    let err = game.drain().unwrap_err();
    assert_eq!(err.code(), "EFFECT_CONSUMED");

    assert_eq!(game.abandon_queue(), vec![uid]);
    assert_eq!(game.event(uid).unwrap().cancel_cause(), Some(&CancelCause::Abandoned));
    assert!(game.queued().is_empty());

    let next = game.trigger(Event::new(Context::TurnEnd { player })).unwrap();
    assert!(game.event(next).unwrap().is_resolved());
}

// =============================================================================
// Ordering simultaneous events
// =============================================================================

/// Test that a player owning several ready groups chooses their order, and
/// that players are taken in turn order.
#[test]
fn test_owner_orders_groups() {
    let (mut game, p, seats) = table(GameConfig::new(5), &["Ann", "Bo"]);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let bo = game.register(logged(&log, "bo", p[1]));
    let ann_first = game.register(logged(&log, "ann 1", p[0]));
    let ann_second = game.register(logged(&log, "ann 2", p[0]));
    let main = game.register(
        Event::new(Context::TurnEnd { player: p[0] })
            .with_post(bo)
            .with_post(ann_first)
            .with_post(ann_second),
    );

    seats[0].script([Answer::Index(1)]);
    game.queue(main).unwrap();

    assert_eq!(seats[0].asked(DecisionKind::OrderEventGroups), 1);
    assert_eq!(seats[1].asked(DecisionKind::OrderEventGroups), 0);
    assert_eq!(*log.borrow(), vec!["ann 2", "ann 1", "bo"]);
}

/// Test that grouped events stay together and a single group is not asked
/// about.
#[test]
fn test_grouped_events_stay_together() {
    let (mut game, p, seats) = table(GameConfig::new(5), &["Ann", "Bo"]);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let first = game.register(logged(&log, "first", p[0]));
    let second = game.register(logged(&log, "second", p[0]));
    game.group_with(first, &[second]).unwrap();
    let main = game.register(Event::new(Context::TurnEnd { player: p[0] }).with_post(first).with_post(second));

    game.queue(main).unwrap();

    assert_eq!(seats[0].asked(DecisionKind::OrderEventGroups), 0);
    assert_eq!(*log.borrow(), vec!["first", "second"]);
}

/// Test that an invalid ordering answer still resolves every event once.
#[test]
fn test_invalid_ordering_answer_falls_back() {
    let (mut game, p, seats) = table(GameConfig::new(5), &["Ann", "Bo"]);
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let uids: Vec<EventId> = (0..3).map(|i| game.register(logged(&log, format!("e{i}"), p[0]))).collect();
    let mut main = Event::new(Context::TurnEnd { player: p[0] });
    for uid in &uids {
        main = main.with_post(*uid);
    }
    let main = game.register(main);

    seats[0].script([Answer::Raw(Projected::Int(4))]);
    game.queue(main).unwrap();

    let mut resolved = log.borrow().clone();
    resolved.sort();
    assert_eq!(resolved, vec!["e0", "e1", "e2"]);
}
