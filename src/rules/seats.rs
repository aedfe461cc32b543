//! Joining and leaving.

use crate::core::{EngineError, EngineResult, EventId, PlayerId};
use crate::events::{Context, Event, Source};
use crate::info::HistoryScope;
use crate::participants::Participant;
use crate::stack::Game;

/// Add a player with their participant.
///
/// The participant first receives the current round's history, then the
/// player is seated by a join event (at `seat`, or last). Someone joining
/// mid-round sits the rest of it out.
pub fn join(
    game: &mut Game,
    name: impl Into<String>,
    participant: Box<dyn Participant>,
    seat: Option<usize>,
) -> EngineResult<PlayerId> {
    let player = game.state_mut().add_player(name);
    game.set_participant(player, participant);
    game.show_history(player, HistoryScope::Round, false);

    let event = Event::new(Context::Join {
        player,
        source: Source::New,
    })
    .on_resolve(move |game, _| {
        game.state_mut().seat(player, seat)?;
        if game.state().is_active() {
            game.state_mut().update_player(player, |p| p.alive = false)?;
        }
        Ok(())
    });
    game.trigger(event)?;
    tracing::info!(%player, "joined");
    Ok(player)
}

/// Reattach a participant to an existing seat and replay a history to it.
///
/// Everything in the history is delivered again, including records the
/// seat already received.
pub fn rejoin(
    game: &mut Game,
    player: PlayerId,
    participant: Box<dyn Participant>,
    scope: HistoryScope,
) -> EngineResult<()> {
    if game.state().player(player).is_none() {
        return Err(EngineError::UnknownPlayer(player));
    }
    game.set_participant(player, participant);
    game.show_history(player, scope, true);
    tracing::info!(%player, ?scope, "rejoined");
    Ok(())
}

/// Remove a player from the table. Only possible between rounds.
pub fn leave(game: &mut Game, player: PlayerId, source: Source) -> EngineResult<EventId> {
    if game.state().is_active() {
        return Err(EngineError::RoundActive("leave the game"));
    }
    if game.state().player(player).is_none() {
        return Err(EngineError::UnknownPlayer(player));
    }
    let event = Event::new(Context::Leave { player, source }).on_resolve(move |game, _| {
        game.state_mut().unseat(player);
        game.remove_participant(player);
        Ok(())
    });
    game.trigger(event)
}
