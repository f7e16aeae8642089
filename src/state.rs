use serde::{Deserialize, Serialize};

use crate::action::SeatId;
use crate::card::{Card, Color};
use crate::sequencer::Direction;

/// Roster entry handed over by the room registry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatSpec {
    pub id: SeatId,
    pub name: String,
    pub team: Option<u8>,
}

impl SeatSpec {
    pub fn new(id: impl Into<SeatId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), team: None }
    }

    pub fn with_team(mut self, team: u8) -> Self {
        self.team = Some(team);
        self
    }
}

/// Status of the entire match.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchStatus {
    Ongoing,
    Finished {
        winner: SeatId,
        winner_name: String,
        winning_team: Option<u8>,
    },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingAction,
    AwaitingColorChoice,
    Finished,
}

/// What a seat may see about another seat.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpponentView {
    pub id: SeatId,
    pub name: String,
    pub seat_index: usize,
    pub team: Option<u8>,
    pub hand_size: usize,
    /// Only filled in for a teammate in team mode.
    pub hand: Option<Vec<Card>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeTarget {
    pub id: SeatId,
    pub name: String,
    pub seat_index: usize,
}

/// Sanitized snapshot of a match for a single seat.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchView {
    pub self_seat: SeatId,
    pub seat_index: usize,
    pub team: Option<u8>,
    pub seat_count: usize,
    pub hand: Vec<Card>,
    pub opponents: Vec<OpponentView>,
    pub discard_top: Option<Card>,
    pub discard_color: Option<Color>,
    pub deck_count: usize,
    pub current_seat: usize,
    pub is_my_turn: bool,
    pub direction: Direction,
    pub phase: TurnPhase,
    pub awaiting_my_color: bool,
    pub status: MatchStatus,
    pub draw_pending: bool,
    /// Cards the acting seat must draw unless it stacks; 0 when none pending.
    pub pending_draw: u32,
    pub can_declare_uno: bool,
    pub has_declared: bool,
    pub challengeable: Vec<ChallengeTarget>,
}
