//! Info distribution integration tests.
//!
//! These tests check who receives which flavor of each record, that
//! records are captured once and replayed verbatim, and that delivery
//! happens at most once per participant unless forced.

mod common;

use hidden_letters::cards::PlayOption;
use hidden_letters::core::PlayerId;
use hidden_letters::info::{HistoryScope, InfoView, Stage};
use hidden_letters::rules;
use hidden_letters::stack::Game;
use hidden_letters::visibility::{Flavor, Projected};

use common::{add_cards, held, kind_of, numbered, plain, stacked, table, Seat};

/// A round in progress: Ann holds the Princess, Bo the Guard.
fn dealt() -> (Game, Vec<PlayerId>, Vec<Seat>) {
    let (mut game, p, seats) = table(stacked(11, &["PRINCESS", "GUARD"]), &["Ann", "Bo"]);
    let mut deck = vec![plain("PRINCESS", 8), plain("GUARD", 1)];
    deck.extend(numbered(4));
    add_cards(&mut game, deck);
    rules::start_round(&mut game).unwrap();
    (game, p, seats)
}

/// The draw record about `player` in a list of infos.
fn draw_about(infos: &[InfoView], name: &str) -> InfoView {
    infos
        .iter()
        .find(|info| {
            kind_of(&info.context) == Some("DRAW")
                && info
                    .context
                    .as_entity()
                    .and_then(|ctx| ctx.get("player"))
                    .and_then(Projected::as_player)
                    .is_some_and(|tag| &*tag.name == name)
        })
        .cloned()
        .unwrap_or_else(|| panic!("no draw about {name}"))
}

fn princess() -> Projected {
    Projected::Text("PRINCESS".into())
}

// =============================================================================
// Audiences
// =============================================================================

/// Test that a draw is private to the drawer and public to everyone else.
#[test]
fn test_draw_flavors_follow_audience() {
    let (_game, _, seats) = dealt();

    let ann_sees = draw_about(&seats[0].infos(), "Ann");
    let bo_sees = draw_about(&seats[1].infos(), "Ann");

    assert_eq!(ann_sees.id, bo_sees.id);
    assert_eq!(ann_sees.flavor, Flavor::Private);
    assert_eq!(bo_sees.flavor, Flavor::Public);
    assert!(ann_sees.context.mentions(&princess()));
    assert!(!bo_sees.context.mentions(&princess()));
    assert!(bo_sees.narration().contains("cardback"));
}

/// Test that a record keeps the values it had when it was emitted.
#[test]
fn test_records_are_captured_at_emission() {
    let (mut game, p, _) = dealt();
    let card = held(&game, p[0]);

    game.state_mut().hand_to_discard(p[0], card).unwrap();

    let record = game
        .info()
        .history(HistoryScope::Round)
        .into_iter()
        .find(|record| record.kind() == "DRAW" && record.audience().includes(p[0]))
        .unwrap();
    assert!(!record.context(Flavor::Public).mentions(&princess()));
    assert!(record.context(Flavor::Private).mentions(&princess()));
}

/// Test that a card play is announced when it fires and again when it
/// resolves.
#[test]
fn test_card_play_announced_twice() {
    let (mut game, p, _) = dealt();
    let card = held(&game, p[0]);

    rules::trigger_play(&mut game, PlayOption::new(card, "Princess")).unwrap();

    let stages: Vec<Stage> = game
        .info()
        .history(HistoryScope::Round)
        .iter()
        .filter(|record| record.kind() == "CARD_PLAY")
        .map(|record| record.stage())
        .collect();
    assert_eq!(stages, vec![Stage::Fired, Stage::Resolved]);
    assert!(game.state().player(p[0]).unwrap().discard().contains(&card));
}

// =============================================================================
// Replay
// =============================================================================

/// Test that a replayed history is exactly what was delivered live.
#[test]
fn test_replay_matches_live_delivery() {
    let (mut game, p, seats) = dealt();
    let live = seats[0].infos();
    assert!(!live.is_empty());

    let replacement = Seat::new();
    rules::rejoin(&mut game, p[0], replacement.participant(), HistoryScope::Game).unwrap();

    assert_eq!(replacement.infos(), live);
}

/// Test that someone joining mid-round first receives the round so far, as
/// any other outsider saw it, and sits the round out.
#[test]
fn test_late_joiner_receives_round_history() {
    let (mut game, p, seats) = dealt();
    let round: Vec<_> = game.info().history(HistoryScope::Round).iter().map(|r| r.id()).collect();

    let late = Seat::new();
    let cy = rules::join(&mut game, "Cy", late.participant(), None).unwrap();

    let received = late.infos();
    let replayed: Vec<_> = received.iter().take(round.len()).map(|info| info.id).collect();
    assert_eq!(replayed, round);
    assert_eq!(kind_of(&received[0].context), Some("ROUND_START"));
    assert!(received[..round.len()].iter().all(|info| info.flavor == Flavor::Public));
    assert_eq!(draw_about(&received, "Ann"), draw_about(&seats[1].infos(), "Ann"));

    assert_eq!(kind_of(&received[round.len()].context), Some("JOIN"));
    assert!(!game.state().player(cy).unwrap().is_alive());
    assert_eq!(game.state().living(), p);
}

// =============================================================================
// Delivery
// =============================================================================

/// Test that a record reaches a participant at most once unless forced.
#[test]
fn test_delivery_at_most_once_unless_forced() {
    let (mut game, p, seats) = dealt();
    let before = seats[0].infos().len();

    game.show_history(p[0], HistoryScope::Game, false);
    assert_eq!(seats[0].infos().len(), before);

    game.show_history(p[0], HistoryScope::Round, true);
    let round = game.info().history(HistoryScope::Round).len();
    assert_eq!(seats[0].infos().len(), before + round);
}

/// Test that every seated participant receives every record.
#[test]
fn test_everyone_receives_everything() {
    let (game, p, seats) = dealt();
    let round = game.info().history(HistoryScope::Round);

    for (player, seat) in p.iter().zip(&seats) {
        for record in round.iter() {
            assert!(game.info().was_sent(record.id(), *player));
        }
        assert!(seat.infos().len() >= round.len());
    }
}
