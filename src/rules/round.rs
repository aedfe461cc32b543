//! Round and game flow.
//!
//! A round: reset, announce, pick who starts, deal one card each, then
//! turns in seat order until the round ends. It ends when one player is
//! left standing (checked by the engine whenever the queue empties) or
//! when a draw finds the deck empty, in which case the highest card left
//! wins. A game is rounds until someone collects enough hearts.

use std::collections::BTreeMap;

use crate::cards::{Forcing, PlayOption};
use crate::core::{EngineError, EngineResult, EventId, PlayerId};
use crate::decisions::{Decision, DecisionKind};
use crate::events::{Context, Event, Source};
use crate::stack::Game;

use super::triggers::{make_round_winner, trigger_discard, trigger_draw, trigger_play};

/// Fewest seated players a round can start with.
pub const MIN_PLAYERS: usize = 2;

// === Round boundaries ===

/// Set up a round and mark it active.
pub fn start_round(game: &mut Game) -> EngineResult<()> {
    if game.state().is_active() {
        return Err(EngineError::RoundActive("start a round"));
    }
    let seated = game.state().seated().to_vec();
    if seated.len() < MIN_PLAYERS {
        return Err(EngineError::NotEnoughPlayers {
            needed: MIN_PLAYERS,
            seated: seated.len(),
        });
    }

    game.start_round_history();
    let state = game.state_mut();
    state.ending = false;
    state.round_winner = None;
    state.reset_players()?;
    state.reset_deck();
    let stacking = state.config().stacking_for_round(state.round_count).map(<[String]>::to_vec);
    if let Some(kinds) = stacking {
        state.stack_deck(&kinds);
    }
    state.round_count += 1;
    tracing::info!(round = state.round_count, players = seated.len(), "round starting");

    game.trigger(Event::new(Context::RoundStart { players: seated.clone() }))?;
    choose_first_player(game, &seated)?;
    // Nobody can respond to the deal.
    for player in seated {
        trigger_draw(game, player, Source::Joined, false)?;
    }
    game.state_mut().active = true;
    Ok(())
}

/// Random when nobody has lost yet; otherwise the last loser chooses.
fn choose_first_player(game: &mut Game, seated: &[PlayerId]) -> EngineResult<()> {
    match game.state().last_loser().filter(|loser| seated.contains(loser)) {
        None => {
            let starter = game.state_mut().rng.choose(seated).copied();
            if let Some(starter) = starter {
                trigger_starting(game, starter, Source::Random)?;
            }
        }
        Some(asker) => {
            let decision = Decision::new(
                DecisionKind::WhoStarts,
                Context::WhoStarts { player: asker },
                seated.to_vec(),
            );
            decision.ask_then(game, asker, |game, chosen| {
                trigger_starting(game, chosen, Source::Player(asker))
            })?;
        }
    }
    Ok(())
}

fn trigger_starting(game: &mut Game, player: PlayerId, source: Source) -> EngineResult<EventId> {
    let event = Event::new(Context::Starting { player, source }).on_resolve(move |game, _| {
        game.state_mut().current_player = Some(player);
        Ok(())
    });
    game.trigger(event)
}

/// End the round, once. Resolving the round end awards `winner`, if any.
///
/// Returns `None` when the round is not running or already ending.
pub fn end_round(game: &mut Game, source: Source, winner: Option<PlayerId>) -> EngineResult<Option<EventId>> {
    if !game.state().is_active() || game.state().ending {
        tracing::debug!(?source, "round already over");
        return Ok(None);
    }
    let source = match source {
        Source::LastAlive => Source::OneLeft,
        Source::HighestCard => Source::DeckEmpty,
        other => other,
    };
    game.state_mut().ending = true;
    let players = game.state().living();
    let scored_for = source.clone();
    let event = Event::new(Context::RoundEnd { players, source }).on_resolve(move |game, _| {
        game.state_mut().active = false;
        tracing::info!(round = game.state().round_count(), "round over");
        if let Some(winner) = winner {
            make_round_winner(game, winner, scored_for)?;
        }
        Ok(())
    });
    game.trigger(event).map(Some)
}

/// Settle a round that ran out of cards: the highest score among the living
/// wins; players tied on a score annihilate each other.
pub fn check_round_end_win(game: &mut Game) -> EngineResult<Option<PlayerId>> {
    let mut scores: BTreeMap<i64, Vec<PlayerId>> = BTreeMap::new();
    let state = game.state();
    for player in state.living() {
        let Some(record) = state.player(player) else {
            continue;
        };
        let Some(mut score) = record
            .hand()
            .iter()
            .filter_map(|card| state.card(*card))
            .map(|card| card.def().value)
            .max()
        else {
            continue;
        };
        for card in record.hand().iter().chain(record.discard()) {
            if let Some(def) = state.definition(*card) {
                score = def.score_edit(state, *card, score);
            }
        }
        scores.entry(score).or_default().push(player);
    }

    let mut winner = None;
    for (score, players) in scores.into_iter().rev() {
        if let [single] = players.as_slice() {
            winner = Some(*single);
            break;
        }
        game.trigger(Event::new(Context::Annihilation { players, number: score }))?;
    }
    match winner {
        Some(player) => {
            let event = Event::new(Context::Win {
                player,
                source: Source::HighestCard,
            })
            .on_resolve(move |game, _| make_round_winner(game, player, Source::HighestCard).map(|_| ()));
            game.trigger(event)?;
        }
        None => {
            game.trigger(Event::new(Context::Tie {
                source: Source::MutualAnnihilation,
            }))?;
        }
    }
    Ok(winner)
}

// === Turns ===

type TurnStep = fn(&mut Game, PlayerId) -> EngineResult<()>;

/// Play one turn. Returns whether the round is still running.
///
/// Each step only runs while the round is active and `player` is alive.
pub fn play_turn(game: &mut Game, player: PlayerId) -> EngineResult<bool> {
    let steps: [TurnStep; 5] = [start_turn, insanity_checks, draw_for_turn, make_play, end_turn];
    for step in steps {
        let alive = game.state().player(player).is_some_and(|p| p.is_alive());
        if !alive || !game.state().is_active() {
            break;
        }
        step(game, player)?;
    }
    Ok(game.state().is_active())
}

fn start_turn(game: &mut Game, player: PlayerId) -> EngineResult<()> {
    let number = game.state().player(player).map_or(0, |p| p.turns_played()) + 1;
    let event = Event::new(Context::TurnStart {
        player,
        number: i64::from(number),
    })
    .on_resolve(move |game, _| game.state_mut().update_player(player, |p| p.turns_played += 1));
    game.trigger(event).map(|_| ())
}

/// One insanity check per point of insanity, first check first.
fn insanity_checks(game: &mut Game, player: PlayerId) -> EngineResult<()> {
    let level = game.state().insanity(player);
    if level == 0 {
        return Ok(());
    }
    let event = Event::new(Context::InsanityChecks {
        player,
        number: i64::from(level),
    })
    .on_resolve(move |game, _| {
        for n in (1..=level).rev() {
            let check = Event::new(Context::InsanityCheck {
                player,
                number: i64::from(n),
            })
            .on_resolve(move |game, _| insanity_check(game, player));
            let uid = game.register(check);
            game.queue(uid)?;
        }
        Ok(())
    });
    game.trigger(event).map(|_| ())
}

/// Discard the top card of the deck. An insane card kills.
fn insanity_check(game: &mut Game, player: PlayerId) -> EngineResult<()> {
    if !game.state().player(player).is_some_and(|p| p.is_alive()) {
        return Ok(());
    }
    match game.state_mut().draw(false) {
        Ok(card) => trigger_discard(game, player, Source::InsanityCheck, card).map(|_| ()),
        Err(exhausted) => {
            tracing::debug!(%player, %exhausted, "insanity check skipped");
            Ok(())
        }
    }
}

fn draw_for_turn(game: &mut Game, player: PlayerId) -> EngineResult<()> {
    trigger_draw(game, player, Source::StartOfTurn, false).map(|_| ())
}

/// Ask which card to play and play it.
///
/// All-forced options are played together after a confirmation; otherwise
/// the choice is among the forced options, or failing those the unforced
/// ones.
fn make_play(game: &mut Game, player: PlayerId) -> EngineResult<()> {
    let hand = game.state().player(player).map(|p| p.hand().to_vec()).unwrap_or_default();
    let mut unforced: Vec<PlayOption> = Vec::new();
    let mut forced: Vec<PlayOption> = Vec::new();
    let mut all_forced: Vec<PlayOption> = Vec::new();
    for card in hand {
        let Some(def) = game.state().definition(card) else {
            continue;
        };
        for (option, forcing) in def.play_options(game.state(), card) {
            match forcing {
                Forcing::Unforced => unforced.push(option),
                Forcing::Forced => forced.push(option),
                Forcing::AllForced => all_forced.push(option),
            }
        }
    }
    tracing::trace!(%player, unforced = unforced.len(), forced = forced.len(), all_forced = all_forced.len(), "play options");

    if !all_forced.is_empty() {
        let decision = Decision::new(DecisionKind::MultiPlay, Context::MultiPlay { player }, vec![all_forced]);
        decision.ask_then(game, player, |game, options| {
            options.into_iter().try_for_each(|option| trigger_play(game, option))
        })?;
        return Ok(());
    }
    let options = if forced.is_empty() { unforced } else { forced };
    Decision::new(DecisionKind::WhichPlay, Context::WhichPlay { player }, options).ask_then(game, player, trigger_play)?;
    Ok(())
}

fn end_turn(game: &mut Game, player: PlayerId) -> EngineResult<()> {
    game.trigger(Event::new(Context::TurnEnd { player })).map(|_| ())
}

// === Running ===

/// Run one round to its end.
///
/// Returns false if the game was won outright during the round.
pub fn run_round(game: &mut Game) -> EngineResult<bool> {
    start_round(game)?;
    while let Some(player) = game.state().current_player() {
        if !play_turn(game, player)? {
            break;
        }
        let next = game.state().next_seat(player);
        game.state_mut().current_player = next;
    }
    if game.state().winner().is_some() {
        return Ok(false);
    }
    if game.state().round_winner().is_none() {
        check_round_end_win(game)?;
    }
    Ok(true)
}

/// Run rounds until someone wins the game.
pub fn run_game(game: &mut Game) -> EngineResult<Option<PlayerId>> {
    while run_round(game)? {
        let (hearts, insane_hearts) = {
            let config = game.state().config();
            (config.hearts_to_win, config.insane_hearts_to_win)
        };
        let seated = game.state().seated().to_vec();
        for player in seated {
            let Some(record) = game.state().player(player) else {
                continue;
            };
            let source = if record.hearts() >= hearts {
                Source::WonHearts
            } else if record.insane_hearts() >= insane_hearts {
                Source::WonInsaneHearts
            } else {
                continue;
            };
            win_game(game, player, source)?;
            break;
        }
        if game.state().winner().is_some() {
            break;
        }
    }
    tracing::info!(winner = ?game.state().winner(), rounds = game.state().round_count(), "game over");
    Ok(game.state().winner())
}

/// Declare the winner of the whole game, ending any running round.
pub fn win_game(game: &mut Game, player: PlayerId, source: Source) -> EngineResult<EventId> {
    end_round(game, source.clone(), None)?;
    let event = Event::new(Context::Win { player, source }).on_resolve(move |game, _| {
        game.state_mut().winner = Some(player);
        Ok(())
    });
    game.trigger(event)
}
