//! Event helpers for the everyday occurrences of a round.
//!
//! Each `trigger_*` function registers one event and queues it. When called
//! from inside an effect the queue is paused, so the event is only queued;
//! otherwise it is drained before the function returns.

use std::sync::Arc;

use crate::cards::{CardDefinition, PlayOption};
use crate::core::{CardId, EngineError, EngineResult, EventId, Player, PlayerId};
use crate::decisions::{Decision, DecisionKind};
use crate::events::{Context, Earned, Event, Source};
use crate::stack::Game;

use super::round::end_round;

fn player_record(game: &Game, player: PlayerId) -> EngineResult<&Player> {
    game.state().player(player).ok_or(EngineError::UnknownPlayer(player))
}

// === Life and death ===

/// Kill `player`. Does nothing if they are already dead.
pub fn trigger_death(
    game: &mut Game,
    player: PlayerId,
    source: Source,
    card: Option<CardId>,
) -> EngineResult<Option<EventId>> {
    if !player_record(game, player)?.is_alive() {
        tracing::debug!(%player, "not killing a dead player");
        return Ok(None);
    }
    let event = Event::new(Context::Death { player, source, card }).on_resolve(move |game, _| kill_player(game, player));
    game.trigger(event).map(Some)
}

/// Mark a player dead and discard their hand.
///
/// The first player to die after having played a turn becomes the round's
/// last loser.
pub fn kill_player(game: &mut Game, player: PlayerId) -> EngineResult<()> {
    let (hand, turns_played) = game.state_mut().update_player(player, |p| {
        p.alive = false;
        (p.hand.clone(), p.turns_played)
    })?;
    tracing::info!(%player, "player died");
    if turns_played > 0 && game.state().last_loser().is_none() {
        game.state_mut().last_loser = Some(player);
    }
    for card in hand {
        trigger_discard(game, player, Source::Death, card)?;
    }
    Ok(())
}

/// Take away a player's protection.
pub fn trigger_protection_loss(game: &mut Game, player: PlayerId, source: Source) -> EngineResult<EventId> {
    let event = Event::new(Context::ProtectionLoss { player, source })
        .on_resolve(move |game, _| game.state_mut().update_player(player, |p| p.set_protected(false)));
    game.trigger(event)
}

/// Save a player from a pending death.
pub fn trigger_cancel_death(
    game: &mut Game,
    player: PlayerId,
    source: Source,
    death: EventId,
) -> EngineResult<EventId> {
    let cause = source.clone();
    let event = Event::new(Context::CancelDeath { player, source, death }).on_resolve(move |game, _| {
        if game.event(death).is_some_and(|event| !event.is_terminal()) {
            game.cancel(death, cause)
        } else {
            tracing::debug!(%death, "death already settled");
            Ok(())
        }
    });
    game.trigger(event)
}

// === Card movement ===

/// A discard event, registered but not queued.
///
/// Insanity checks discard straight from the deck; everything else
/// discards from the hand. The card's discard hook runs afterwards.
pub fn discard_event(player: PlayerId, source: Source, card: CardId) -> Event {
    let from_deck = source == Source::InsanityCheck;
    Event::new(Context::Discard { player, card, source }).on_resolve(move |game, uid| {
        if from_deck {
            game.state_mut().put_in_discard(player, card)?;
        } else {
            game.state_mut().hand_to_discard(player, card)?;
        }
        let def = game.state().definition(card).ok_or(EngineError::UnknownCard(card))?;
        def.on_discard(game, card, uid)
    })
}

pub fn trigger_discard(game: &mut Game, player: PlayerId, source: Source, card: CardId) -> EngineResult<EventId> {
    game.trigger(discard_event(player, source, card))
}

/// A draw event, registered but not queued.
///
/// If nothing can be drawn the event cancels itself and ends the round.
pub fn draw_event(player: PlayerId, source: Source, from_aside: bool) -> Event {
    Event::new(Context::Draw { player, source, card: None }).on_resolve(move |game, uid| {
        let card = match game.state_mut().draw(from_aside) {
            Ok(card) => card,
            Err(exhausted) => {
                tracing::info!(%player, %exhausted, "nothing left to draw");
                game.cancel(uid, Source::DeckEmpty)?;
                end_round(game, Source::DeckEmpty, None)?;
                return Ok(());
            }
        };
        if let Context::Draw { card: drawn, .. } = game.event_mut(uid)?.context_mut() {
            *drawn = Some(card);
        }
        game.state_mut().give(player, card)
    })
}

pub fn trigger_draw(game: &mut Game, player: PlayerId, source: Source, from_aside: bool) -> EngineResult<EventId> {
    game.trigger(draw_event(player, source, from_aside))
}

/// Shuffle a card back into the deck, taking it from whoever holds it.
pub fn trigger_shuffle(game: &mut Game, card: CardId, source: Source) -> EngineResult<EventId> {
    let event = Event::new(Context::Shuffle { card, source }).on_resolve(move |game, _| {
        game.state_mut().take_from_holder(card)?;
        game.state_mut().shuffle_in(card)
    });
    game.trigger(event)
}

/// Show cards of `lookee` to `looker`: the whole hand, or one card `lookee`
/// picks.
pub fn trigger_look(
    game: &mut Game,
    looker: PlayerId,
    lookee: PlayerId,
    source: Source,
    whole_hand: bool,
) -> EngineResult<Vec<EventId>> {
    let cards = if whole_hand {
        player_record(game, lookee)?.hand().to_vec()
    } else {
        ask_which_card(game, lookee, source.clone())?.into_iter().collect()
    };
    let mut seen = Vec::with_capacity(cards.len());
    for card in cards {
        let context = Context::SeeCard {
            players: vec![looker, lookee],
            card,
            source: source.clone(),
        };
        seen.push(game.trigger(Event::new(context))?);
    }
    Ok(seen)
}

/// Ask `player` which of their held cards is involved.
///
/// With more than one card in hand, every held card's projections are
/// rebuilt first.
pub fn ask_which_card(game: &mut Game, player: PlayerId, source: Source) -> EngineResult<Option<CardId>> {
    let hand = player_record(game, player)?.hand().to_vec();
    if hand.len() > 1 {
        for card in &hand {
            game.state().invalidate_card(*card, None);
        }
    }
    let decision = Decision::new(DecisionKind::WhichCard, Context::WhichCard { player, source }, hand);
    Ok(decision.ask(game, player))
}

// === Plays ===

/// Play a card as `option`.
///
/// The card's play events go on the queue, then its discard (if it is
/// played from the hand) and, for a quick play, a replacement draw. The
/// discard and draw happen before the play events resolve.
pub fn trigger_play(game: &mut Game, option: PlayOption) -> EngineResult<()> {
    let card = option.card;
    let record = game.state().card(card).ok_or(EngineError::UnknownCard(card))?;
    let def = Arc::clone(record.def());
    let Some(player) = record.controller().or(record.holder()) else {
        return Err(EngineError::Plugin(format!("{card} was played by nobody")));
    };
    let holder = player_record(game, player)?;
    let from_hand = holder.hand().contains(&card);
    let turn = holder.turns_played();
    tracing::debug!(%player, %card, mode = %option.mode, quick = option.quick, "playing");

    game.pause();
    let queued = queue_play(game, def.as_ref(), &option, player, turn, from_hand);
    match queued {
        Ok(()) => game.resume(),
        Err(err) => {
            game.resume_without_drain();
            Err(err)
        }
    }
}

fn queue_play(
    game: &mut Game,
    def: &CardDefinition,
    option: &PlayOption,
    player: PlayerId,
    turn: u32,
    from_hand: bool,
) -> EngineResult<()> {
    let card = option.card;
    let events = def.play_events(game, option);
    game.state_mut().update_card(card, |c| {
        c.played_as = Some(option.clone());
        c.turn_played = Some(turn);
        c.played_events = events.iter().copied().collect();
    })?;
    for uid in events.iter().rev() {
        game.queue(*uid)?;
    }
    if option.quick {
        trigger_draw(game, player, Source::QuickPlay, true)?;
    }
    if from_hand {
        trigger_discard(game, player, Source::Played, card)?;
    }
    Ok(())
}

/// Cancel every unsettled event a card's last play produced.
pub fn cancel_play(game: &mut Game, card: CardId, source: Source) -> EngineResult<()> {
    let events = game
        .state()
        .card(card)
        .ok_or(EngineError::UnknownCard(card))?
        .played_events()
        .to_vec();
    for uid in events {
        if game.event(uid).is_some_and(|event| !event.is_terminal()) {
            game.cancel(uid, source.clone())?;
        }
    }
    Ok(())
}

// === Winning ===

/// Announce `player` as the round's winner; resolving it ends the round.
pub fn trigger_round_win(game: &mut Game, player: PlayerId, source: Source) -> EngineResult<EventId> {
    let cause = source.clone();
    let event = Event::new(Context::Win { player, source })
        .on_resolve(move |game, _| end_round(game, cause, Some(player)).map(|_| ()));
    game.trigger(event)
}

/// Record `player` as round winner and award a heart, or an insane heart
/// if they are insane.
pub fn make_round_winner(game: &mut Game, player: PlayerId, source: Source) -> EngineResult<EventId> {
    let earned = if game.state().insanity(player) > 0 {
        Earned::InsaneHeart
    } else {
        Earned::Heart
    };
    game.state_mut().round_winner = Some(player);
    tracing::info!(%player, ?earned, "round won");
    let event = Event::new(Context::Scored { player, source, earned }).on_resolve(move |game, _| {
        game.state_mut().update_player(player, |p| match earned {
            Earned::Heart => p.hearts += 1,
            Earned::InsaneHeart => p.insane_hearts += 1,
        })
    });
    game.trigger(event)
}
