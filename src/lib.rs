//! Authoritative match engine for a stacking-deck shedding card game with
//! 2-8 remote seats, rotational or team-alternating turn order, and a turn
//! clock that can force a draw.

pub mod action;
pub mod bot;
pub mod bots;
pub mod card;
pub mod deck;
pub mod effect;
pub mod error;
pub mod game;
pub mod obligation;
pub mod sequencer;
pub mod session;
pub mod state;
pub mod visualize;
pub mod wire;

pub use crate::action::{Command, Outcome, SeatId};
pub use crate::bot::Bot;
pub use crate::bots::RandomBot;
pub use crate::card::{Card, Color, Rank};
pub use crate::deck::DeckManager;
pub use crate::effect::{CardEffect, DiscardTop, can_play, effect};
pub use crate::error::{ConfigError, MatchError};
pub use crate::game::{MatchBuilder, MatchConfig, MatchState};
pub use crate::obligation::{Obligation, ObligationTracker};
pub use crate::sequencer::{Direction, TeamRotation, TurnOrder};
pub use crate::session::{
    Broadcaster, MatchDirectory, MatchId, MatchSession, SessionConfig, TimerToken,
    TokioTurnClock, TurnClock,
};
pub use crate::state::{
    ChallengeTarget, MatchStatus, MatchView, OpponentView, SeatSpec, TurnPhase,
};
pub use crate::visualize::{VisualOptions, describe_command, render_view};
pub use crate::wire::{WireError, decode_view, encode_view};
