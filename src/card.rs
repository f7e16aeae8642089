use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

pub const HAND_SIZE: usize = 7;
pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 8;
pub const STANDARD_DECK_SIZE: usize = 108;
pub const UNO_PENALTY: usize = 2;

/// One of the four suit colors. Wild-family cards have none of their own.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MatchError::InvalidColor(s.to_string()))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Rank {
    /// Number card between 0 and 9.
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

/// A single card. Wild-family cards carry no color; the color chosen for them
/// lives on the discard pile, not on the card.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub color: Option<Color>,
}

impl Card {
    pub fn number(color: Color, value: u8) -> Self {
        debug_assert!(value <= 9);
        Self { rank: Rank::Number(value), color: Some(color) }
    }

    pub fn skip(color: Color) -> Self {
        Self { rank: Rank::Skip, color: Some(color) }
    }

    pub fn reverse(color: Color) -> Self {
        Self { rank: Rank::Reverse, color: Some(color) }
    }

    pub fn draw_two(color: Color) -> Self {
        Self { rank: Rank::DrawTwo, color: Some(color) }
    }

    pub fn wild() -> Self {
        Self { rank: Rank::Wild, color: None }
    }

    pub fn wild_draw_four() -> Self {
        Self { rank: Rank::WildDrawFour, color: None }
    }

    /// Returns true for cards whose color is chosen by the player.
    #[inline]
    pub fn is_wild(&self) -> bool {
        matches!(self.rank, Rank::Wild | Rank::WildDrawFour)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self.rank {
            Rank::Number(value) => value.to_string(),
            Rank::Skip => String::from("skip"),
            Rank::Reverse => String::from("reverse"),
            Rank::DrawTwo => String::from("+2"),
            Rank::Wild => String::from("wild"),
            Rank::WildDrawFour => String::from("wild +4"),
        };
        match self.color {
            Some(color) => write!(f, "{color} {rank}"),
            None => f.write_str(&rank),
        }
    }
}

/// Builds the standard 108-card deck in deterministic order (unshuffled).
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(STANDARD_DECK_SIZE);
    for color in Color::ALL {
        deck.push(Card::number(color, 0));
        for value in 1..=9 {
            deck.push(Card::number(color, value));
            deck.push(Card::number(color, value));
        }
        for _ in 0..2 {
            deck.push(Card::skip(color));
            deck.push(Card::reverse(color));
            deck.push(Card::draw_two(color));
        }
    }
    for _ in 0..4 {
        deck.push(Card::wild());
        deck.push(Card::wild_draw_four());
    }
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_deck_composition() {
        let deck = full_deck();
        assert_eq!(deck.len(), STANDARD_DECK_SIZE);
        assert_eq!(deck.iter().filter(|c| c.is_wild()).count(), 8);
        assert_eq!(
            deck.iter()
                .filter(|c| c.rank == Rank::Number(0))
                .count(),
            4
        );
        assert_eq!(deck.iter().filter(|c| c.rank == Rank::DrawTwo).count(), 8);
        assert!(deck.iter().all(|c| c.is_wild() == c.color.is_none()));
    }

    #[test]
    fn colors_parse_case_insensitively() {
        assert_eq!("Blue".parse::<Color>().ok(), Some(Color::Blue));
        assert_eq!(" red ".parse::<Color>().ok(), Some(Color::Red));
        assert_eq!(
            "purple".parse::<Color>(),
            Err(MatchError::InvalidColor(String::from("purple")))
        );
    }
}
