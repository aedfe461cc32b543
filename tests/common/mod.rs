//! Shared fixtures for the integration tests: a scripted participant and a
//! small catalog of test cards.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use hidden_letters::cards::{CardDefinition, PlayOption};
use hidden_letters::core::{CardId, EngineResult, EventId, GameConfig, PlayerId};
use hidden_letters::decisions::{DecisionKind, DecisionView};
use hidden_letters::events::{Context, Source};
use hidden_letters::info::InfoView;
use hidden_letters::participants::{Participant, Unimplemented};
use hidden_letters::rules;
use hidden_letters::stack::Game;
use hidden_letters::visibility::Projected;

// =============================================================================
// Scripted participant
// =============================================================================

/// One scripted reply.
#[derive(Clone, Debug)]
pub enum Answer {
    /// The option at this position of the projected option set.
    Index(usize),
    /// Exactly this value, valid or not.
    Raw(Projected),
    /// Refuse to decide.
    Unimplemented,
}

/// What a scripted seat was asked and told.
#[derive(Default)]
pub struct Script {
    pub answers: VecDeque<Answer>,
    pub decisions: Vec<DecisionView>,
    pub infos: Vec<InfoView>,
}

/// Handle on a scripted seat, shared with the participant the game owns.
#[derive(Clone, Default)]
pub struct Seat(Rc<RefCell<Script>>);

impl Seat {
    pub fn new() -> Self {
        Self::default()
    }

    /// A participant answering for this seat.
    pub fn participant(&self) -> Box<dyn Participant> {
        Box::new(Scripted(self.clone()))
    }

    /// Queue the next replies. Unscripted decisions take the first option.
    pub fn script(&self, answers: impl IntoIterator<Item = Answer>) {
        self.0.borrow_mut().answers.extend(answers);
    }

    /// Decisions of one kind asked so far.
    pub fn asked(&self, kind: DecisionKind) -> usize {
        self.0.borrow().decisions.iter().filter(|d| d.kind() == kind).count()
    }

    pub fn decisions(&self) -> Vec<DecisionView> {
        self.0.borrow().decisions.clone()
    }

    pub fn infos(&self) -> Vec<InfoView> {
        self.0.borrow().infos.clone()
    }

    /// Context kinds of the received infos, in delivery order.
    pub fn info_kinds(&self) -> Vec<String> {
        self.0
            .borrow()
            .infos
            .iter()
            .filter_map(|info| kind_of(&info.context).map(str::to_string))
            .collect()
    }
}

struct Scripted(Seat);

impl Participant for Scripted {
    fn decide(&mut self, decision: &DecisionView) -> Result<Projected, Unimplemented> {
        let mut script = (self.0).0.borrow_mut();
        script.decisions.push(decision.clone());
        match script.answers.pop_front() {
            Some(Answer::Index(i)) => Ok(decision.options().answer_at(i).unwrap_or(Projected::Null)),
            Some(Answer::Raw(value)) => Ok(value),
            Some(Answer::Unimplemented) => Err(Unimplemented),
            None => Ok(decision.options().answer_at(0).unwrap_or(Projected::Null)),
        }
    }

    fn notify(&mut self, info: &InfoView) -> Result<(), Unimplemented> {
        (self.0).0.borrow_mut().infos.push(info.clone());
        Ok(())
    }
}

/// Context kind of a projected context.
pub fn kind_of(context: &Projected) -> Option<&str> {
    context.as_entity().and_then(|entity| entity.text("type"))
}

// =============================================================================
// Tables
// =============================================================================

/// A game with scripted players joined in order.
pub fn table(config: GameConfig, names: &[&str]) -> (Game, Vec<PlayerId>, Vec<Seat>) {
    let mut game = Game::new(config);
    let mut players = Vec::new();
    let mut seats = Vec::new();
    for name in names {
        let seat = Seat::new();
        let player = rules::join(&mut game, *name, seat.participant(), None).unwrap();
        players.push(player);
        seats.push(seat);
    }
    (game, players, seats)
}

/// Deterministic config: no cards set aside, hands dealt in seat order
/// from `stacking`.
pub fn stacked(seed: u64, stacking: &[&str]) -> GameConfig {
    GameConfig::new(seed)
        .with_aside(0)
        .with_stacking(vec![stacking.iter().map(|kind| kind.to_string()).collect()])
}

pub fn add_cards(game: &mut Game, defs: Vec<CardDefinition>) -> Vec<CardId> {
    defs.into_iter()
        .map(|def| game.state_mut().add_card(Arc::new(def)))
        .collect()
}

/// The only card `player` holds.
pub fn held(game: &Game, player: PlayerId) -> CardId {
    let hand = game.state().player(player).unwrap().hand();
    assert_eq!(hand.len(), 1, "expected exactly one card in hand");
    hand[0]
}

// =============================================================================
// Cards
// =============================================================================

/// A card with no behavior beyond its value.
pub fn plain(kind: &str, value: i64) -> CardDefinition {
    CardDefinition::new(kind, kind, value)
}

/// Plain cards `C1..=Cn`, valued 1 to n.
pub fn numbered(n: i64) -> Vec<CardDefinition> {
    (1..=n).map(|v| plain(&format!("C{v}"), v)).collect()
}

/// Offer one quick play against any other player's pending card play.
fn answer_other_plays(
    in_hand_only: bool,
) -> impl Fn(&mut Game, CardId, EventId) -> EngineResult<Vec<PlayOption>> + 'static {
    move |game, card, event| {
        let state = game.state();
        let Some(holder) = state.card(card).and_then(|c| c.holder()) else {
            return Ok(Vec::new());
        };
        let in_hand = state.player(holder).is_some_and(|p| p.hand().contains(&card));
        let other_play = game.event(event).is_some_and(|ev| {
            !ev.is_terminal() && matches!(ev.context(), Context::CardPlay { player, .. } if *player != holder)
        });
        if other_play && (in_hand || !in_hand_only) {
            Ok(vec![PlayOption::new(card, "respond").with_param("event", event.raw() as i64)])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Cancels the card play it answers. Only usable from the hand.
pub fn nope() -> CardDefinition {
    CardDefinition::new("NOPE", "Nope", 0)
        .with_on_event(answer_other_plays(true))
        .with_on_play(|game, uid| {
            let card = game.event(uid).and_then(|ev| ev.context().card());
            let target = game
                .event(uid)
                .and_then(|ev| ev.context().play_option())
                .and_then(|option| option.param("event"))
                .and_then(|param| param.as_int())
                .map(|raw| EventId::new(raw as u64));
            match (card, target) {
                (Some(card), Some(target)) if game.event(target).is_some_and(|ev| !ev.is_terminal()) => {
                    game.cancel(target, Source::Card(card))
                }
                _ => Ok(()),
            }
        })
}

/// Answers a play with a play that does nothing. Only usable from the hand.
pub fn bystander() -> CardDefinition {
    CardDefinition::new("BYSTANDER", "Bystander", 0).with_on_event(answer_other_plays(true))
}

/// Answers a play with a play that does nothing, from hand or discard.
pub fn watcher() -> CardDefinition {
    CardDefinition::new("WATCHER", "Watcher", 0).with_on_event(answer_other_plays(false))
}

/// Counts how often its own play resolved.
pub fn counted(kind: &str, value: i64, counter: Rc<RefCell<u32>>) -> CardDefinition {
    plain(kind, value).with_on_play(move |_, _| {
        *counter.borrow_mut() += 1;
        Ok(())
    })
}
