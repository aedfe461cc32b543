//! Game rules built on the resolution engine.
//!
//! Nothing here touches the queue directly: rules register events and let
//! [`Game`](crate::stack::Game) resolve them. Cards plug into the same
//! helpers through their hooks, so a card that kills, draws or looks goes
//! through exactly the events a turn does.
//!
//! - [`triggers`]: death, discard, draw, look, shuffle, play, win
//! - [`round`]: round start and end, turns, the end-of-deck showdown, scoring
//! - [`seats`]: join, rejoin, leave

pub mod round;
pub mod seats;
pub mod triggers;

pub use round::{
    check_round_end_win, end_round, play_turn, run_game, run_round, start_round, win_game, MIN_PLAYERS,
};
pub use seats::{join, leave, rejoin};
pub use triggers::{
    ask_which_card, cancel_play, discard_event, draw_event, kill_player, make_round_winner, trigger_cancel_death,
    trigger_death, trigger_discard, trigger_draw, trigger_look, trigger_play, trigger_protection_loss,
    trigger_round_win, trigger_shuffle,
};
