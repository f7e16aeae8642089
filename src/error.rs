use thiserror::Error;

use crate::action::SeatId;

/// Failures of a single command. They are reported back to the issuing seat
/// only and never leave the match in a modified state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("it is not this seat's turn")]
    NotYourTurn,
    #[error("hand index {0} is out of range")]
    InvalidCardIndex(usize),
    #[error("card cannot be played on the current discard")]
    IllegalPlay,
    #[error("a wild color must be chosen first")]
    PendingColorChoice,
    #[error("no color choice is pending for this seat")]
    NoPendingColorChoice,
    #[error("unknown color {0:?}")]
    InvalidColor(String),
    #[error("a seat cannot challenge itself")]
    SelfChallenge,
    #[error("seat does not hold exactly one card")]
    NotSingleCard,
    #[error("seat's last card was already declared or penalized")]
    AlreadyDeclared,
    #[error("no cards left to draw")]
    NothingToDraw,
    #[error("seat {0:?} is not part of this match")]
    UnknownSeat(SeatId),
    #[error("match is already over")]
    MatchOver,
    #[error("match {0:?} does not exist")]
    UnknownMatch(String),
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
}

/// Problems with the roster or deck handed over at construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("seat count {0} is outside 2..=8")]
    SeatCount(usize),
    #[error("seat id {0:?} appears more than once")]
    DuplicateSeat(SeatId),
    #[error("team mode requires a team for seat {0:?}")]
    MissingTeam(SeatId),
    #[error("team mode requires at least two teams")]
    TooFewTeams,
    #[error("hand size must be positive")]
    HandSize,
    #[error("deck has {available} cards but dealing needs {needed}")]
    DeckTooSmall { needed: usize, available: usize },
    #[error("deck has no card that can open the discard pile")]
    NoOpeningCard,
}
