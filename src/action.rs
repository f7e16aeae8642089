use serde::{Deserialize, Serialize};

use crate::card::{Card, Color};

/// Opaque seat identifier handed over by the room registry (a connection id).
pub type SeatId = String;

/// Command a seat can issue against a running match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Play the card at the given hand index onto the discard pile.
    Play { card_index: usize },
    /// Draw the pending forced-draw amount (one card when nothing is pending).
    Draw,
    /// Resolve an outstanding wild play.
    ChooseColor(Color),
    /// Announce holding a single card.
    DeclareUno,
    /// Catch another seat that holds one card without having declared.
    ChallengeUno { target: SeatId },
}

impl Command {
    /// Returns true for commands that move the turn forward.
    pub fn is_turn_action(&self) -> bool {
        matches!(
            self,
            Command::Play { .. } | Command::Draw | Command::ChooseColor(_)
        )
    }
}

/// Success payload of a mutating operation, for collaborator-side effects.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Played {
        seat: SeatId,
        card: Card,
        awaiting_color: bool,
        winner: Option<SeatId>,
    },
    ColorChosen {
        seat: SeatId,
        color: Color,
    },
    Drew {
        seat: SeatId,
        cards: Vec<Card>,
    },
    Declared {
        seat: SeatId,
    },
    Challenged {
        challenger: SeatId,
        target: SeatId,
        penalty_cards: usize,
    },
    SeatRemoved {
        seat: SeatId,
        winner: Option<SeatId>,
    },
}

impl Outcome {
    pub fn winner(&self) -> Option<&SeatId> {
        match self {
            Outcome::Played { winner, .. } | Outcome::SeatRemoved { winner, .. } => {
                winner.as_ref()
            }
            _ => None,
        }
    }
}
