//! Decision protocol integration tests.
//!
//! These tests check how questions reach participants, how answers map
//! back to internal options, and what happens when an answer is unusable.

mod common;

use std::collections::HashSet;

use proptest::prelude::*;

use hidden_letters::core::GameConfig;
use hidden_letters::decisions::{Decision, DecisionKind, OptionsView, Permutations};
use hidden_letters::events::{Context, Source};
use hidden_letters::participants::Participant;
use hidden_letters::rules;
use hidden_letters::stack::Game;
use hidden_letters::visibility::Projected;

use common::{add_cards, plain, table, Answer};

fn factorial(k: usize) -> usize {
    (1..=k).product()
}

// =============================================================================
// Permutations
// =============================================================================

proptest! {
    /// Test that every rank maps to an ordering whose rank is itself.
    #[test]
    fn test_permutation_rank_round_trip(k in 0usize..=6, seed in any::<usize>()) {
        let orders = Permutations::new((0..k as i64).collect()).unwrap();
        prop_assert_eq!(orders.count(), factorial(k));

        let index = seed % orders.count();
        let order = orders.element_at(index).unwrap();
        prop_assert!(orders.contains(&order));
        prop_assert_eq!(orders.index_of(&order).unwrap(), index);
    }
}

/// Test that all ranks of a small set are distinct orderings.
#[test]
fn test_permutations_are_distinct() {
    let orders = Permutations::new(vec!['a', 'b', 'c', 'd']).unwrap();
    let all: HashSet<Vec<char>> = (0..orders.count()).map(|i| orders.element_at(i).unwrap()).collect();

    assert_eq!(all.len(), 24);
    assert_eq!(orders.element_at(24), None);
}

/// Test that repeated items and non-orderings are rejected.
#[test]
fn test_permutation_errors() {
    assert!(Permutations::new(vec![1, 2, 1]).is_err());

    let orders = Permutations::new(vec![1, 2, 3]).unwrap();
    assert!(orders.index_of(&[1, 2]).is_err());
    assert!(orders.index_of(&[1, 2, 4]).is_err());
}

// =============================================================================
// Asking
// =============================================================================

/// Test that a single option is taken without asking when no confirmation
/// is needed.
#[test]
fn test_single_option_is_automatic() {
    let (mut game, p, seats) = table(GameConfig::new(1), &["Ann", "Bo"]);
    let cards = add_cards(&mut game, vec![plain("GUARD", 1)]);

    let decision = Decision::new(
        DecisionKind::WhichCard,
        Context::WhichCard {
            player: p[0],
            source: Source::ByChoice,
        },
        vec![cards[0]],
    );

    assert_eq!(decision.ask(&mut game, p[0]), Some(cards[0]));
    assert!(seats[0].decisions().is_empty());
}

/// Test that confirmation kinds are asked even with one option.
#[test]
fn test_confirmation_asks_single_option() {
    let (mut game, p, seats) = table(GameConfig::new(1), &["Ann", "Bo"]);

    let decision = Decision::new(DecisionKind::WhoStarts, Context::WhoStarts { player: p[0] }, vec![p[1]]);

    assert_eq!(decision.ask(&mut game, p[0]), Some(p[1]));
    assert_eq!(seats[0].asked(DecisionKind::WhoStarts), 1);
}

/// Test that the chosen projected option maps back to its internal option.
#[test]
fn test_answer_maps_to_option() {
    let (mut game, p, seats) = table(GameConfig::new(1), &["Ann", "Bo", "Cy"]);
    seats[0].script([Answer::Index(2)]);

    let decision = Decision::new(DecisionKind::WhoStarts, Context::WhoStarts { player: p[0] }, p.clone());

    assert_eq!(decision.ask(&mut game, p[0]), Some(p[2]));
    let asked = &seats[0].decisions()[0];
    assert_eq!(asked.player(), p[0]);
    assert_eq!(asked.options().count(), 3);
}

/// Test that options are projected privately for the participant asked.
#[test]
fn test_options_are_projected_for_the_asked() {
    let (mut game, p, seats) = table(GameConfig::new(1), &["Ann", "Bo"]);
    let cards = add_cards(&mut game, vec![plain("GUARD", 1), plain("PRIEST", 2)]);
    game.state_mut().give(p[0], cards[0]).unwrap();
    game.state_mut().give(p[0], cards[1]).unwrap();
    seats[0].script([Answer::Index(1)]);

    let chosen = rules::ask_which_card(&mut game, p[0], Source::ByChoice).unwrap();

    assert_eq!(chosen, Some(cards[1]));
    let asked = &seats[0].decisions()[0];
    let OptionsView::List(options) = asked.options() else {
        panic!("expected a list of cards");
    };
    assert_eq!(options[0].as_entity().unwrap().text("name"), Some("GUARD"));
    assert_eq!(options[1].as_entity().unwrap().text("name"), Some("PRIEST"));
}

/// Test that an answer naming one of several identical cards may stand for
/// any of them.
#[test]
fn test_identical_options_are_interchangeable() {
    let (mut game, p, seats) = table(GameConfig::new(3), &["Ann", "Bo"]);
    let cards = add_cards(&mut game, vec![plain("GUARD", 1), plain("GUARD", 1)]);
    game.state_mut().give(p[0], cards[0]).unwrap();
    game.state_mut().give(p[0], cards[1]).unwrap();

    let mut chosen = HashSet::new();
    for _ in 0..40 {
        seats[0].script([Answer::Index(0)]);
        let decision = Decision::new(
            DecisionKind::WhichCard,
            Context::WhichCard {
                player: p[0],
                source: Source::ByChoice,
            },
            cards.clone(),
        );
        chosen.insert(decision.ask(&mut game, p[0]).unwrap());
    }

    assert_eq!(chosen.len(), 2);
    let OptionsView::List(options) = seats[0].decisions()[0].options().clone() else {
        panic!("expected a list of cards");
    };
    assert_eq!(options[0], options[1]);
}

/// Test that an ordering decision takes a whole ordering as its answer.
#[test]
fn test_permutation_decision() {
    let (mut game, p, seats) = table(GameConfig::new(1), &["Ann", "Bo"]);
    let answer = Projected::List(vec![Projected::Int(3), Projected::Int(1), Projected::Int(2)]);
    seats[0].script([Answer::Raw(answer)]);

    let decision = Decision::new(
        DecisionKind::OrderEventGroups,
        Context::OrderEventGroups { player: p[0] },
        Permutations::new(vec![1i64, 2, 3]).unwrap(),
    );

    assert_eq!(decision.ask(&mut game, p[0]), Some(vec![3, 1, 2]));
    assert!(matches!(seats[0].decisions()[0].options(), OptionsView::Permutations(_)));
}

// =============================================================================
// Protocol violations
// =============================================================================

/// Test that an answer outside the option set is replaced by a random option.
#[test]
fn test_invalid_answer_falls_back_to_random() {
    let (mut game, p, seats) = table(GameConfig::new(1), &["Ann", "Bo", "Cy"]);
    seats[0].script([Answer::Raw(Projected::Text("nobody".into()))]);

    let decision = Decision::new(DecisionKind::WhoStarts, Context::WhoStarts { player: p[0] }, p.clone());
    let chosen = decision.ask(&mut game, p[0]).unwrap();

    assert!(p.contains(&chosen));
    assert_eq!(seats[0].asked(DecisionKind::WhoStarts), 1);
}

/// Test that a participant refusing to decide gets a random option.
#[test]
fn test_unimplemented_answer_falls_back_to_random() {
    let (mut game, p, seats) = table(GameConfig::new(1), &["Ann", "Bo"]);
    seats[0].script([Answer::Unimplemented]);

    let decision = Decision::new(DecisionKind::WhoStarts, Context::WhoStarts { player: p[0] }, p.clone());

    assert!(decision.ask(&mut game, p[0]).is_some_and(|chosen| p.contains(&chosen)));
}

/// Test that a participant with no callbacks at all can still play.
#[test]
fn test_default_participant_is_answered_for() {
    struct Silent;
    impl Participant for Silent {}

    let mut game = Game::new(GameConfig::new(9));
    let ann = rules::join(&mut game, "Ann", Box::new(Silent), None).unwrap();
    let bo = rules::join(&mut game, "Bo", Box::new(Silent), None).unwrap();

    let decision = Decision::new(DecisionKind::WhoStarts, Context::WhoStarts { player: ann }, vec![ann, bo]);

    assert!(decision.ask(&mut game, ann).is_some());
}

/// Test that a decision with no options yields nothing.
#[test]
fn test_empty_decision() {
    let (mut game, p, seats) = table(GameConfig::new(1), &["Ann", "Bo"]);

    let decision = Decision::new(DecisionKind::WhoStarts, Context::WhoStarts { player: p[0] }, Vec::<i64>::new());

    assert_eq!(decision.ask(&mut game, p[0]), None);
    assert!(seats[0].decisions().is_empty());
}
