use log::debug;
use rand::RngCore;
use rand::seq::SliceRandom;

use crate::card::{Card, Color};
use crate::effect::DiscardTop;
use crate::error::ConfigError;

/// Owns the draw pile and the discard pile. The top of either pile is the last
/// element of its vector.
pub struct DeckManager {
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
    top_color: Option<Color>,
    rng: Box<dyn RngCore + Send>,
}

impl DeckManager {
    pub fn new(cards: Vec<Card>, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            draw_pile: cards,
            discard_pile: Vec::new(),
            top_color: None,
            rng,
        }
    }

    pub fn shuffle(&mut self) {
        self.draw_pile.shuffle(&mut self.rng);
    }

    /// Pops the draw pile, recycling the discard pile (minus its top) when the
    /// draw pile is exhausted. `None` means no card is available anywhere.
    pub fn draw(&mut self) -> Option<Card> {
        if let Some(card) = self.draw_pile.pop() {
            return Some(card);
        }
        if self.discard_pile.len() <= 1 {
            return None;
        }
        self.reshuffle_discard();
        self.draw_pile.pop()
    }

    /// Returns true if `draw` would produce a card.
    pub fn can_draw(&self) -> bool {
        !self.draw_pile.is_empty() || self.discard_pile.len() > 1
    }

    fn reshuffle_discard(&mut self) {
        let Some(top) = self.discard_pile.pop() else {
            return;
        };
        self.draw_pile.append(&mut self.discard_pile);
        self.discard_pile.push(top);
        self.shuffle();
        debug!("reshuffled {} discards into the draw pile", self.draw_pile.len());
    }

    /// Turns the first non-wild card of the draw pile face up. Wild-family
    /// cards met on the way go back into the pile, which is reshuffled.
    pub fn open(&mut self) -> Result<Card, ConfigError> {
        if self.draw_pile.iter().all(Card::is_wild) {
            return Err(ConfigError::NoOpeningCard);
        }
        loop {
            let card = self.draw_pile.pop().ok_or(ConfigError::NoOpeningCard)?;
            if !card.is_wild() {
                self.discard(card, card.color);
                return Ok(card);
            }
            self.draw_pile.push(card);
            self.shuffle();
        }
    }

    /// Places a card face up. `color` is unset for a wild awaiting its color.
    pub fn discard(&mut self, card: Card, color: Option<Color>) {
        self.discard_pile.push(card);
        self.top_color = color;
    }

    pub fn set_top_color(&mut self, color: Color) {
        self.top_color = Some(color);
    }

    pub fn top(&self) -> Option<DiscardTop> {
        self.discard_pile.last().map(|&card| DiscardTop {
            card,
            color: self.top_color,
        })
    }

    /// Slides cards under the draw pile, leaving the current top untouched.
    pub fn return_to_bottom(&mut self, cards: Vec<Card>) {
        self.draw_pile.splice(0..0, cards);
    }

    pub fn draw_count(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn discard_count(&self) -> usize {
        self.discard_pile.len()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn manager(cards: Vec<Card>) -> DeckManager {
        DeckManager::new(cards, Box::new(StdRng::seed_from_u64(7)))
    }

    #[test]
    fn draw_pops_from_top() {
        let mut deck = manager(vec![Card::number(Color::Red, 1), Card::number(Color::Red, 2)]);
        assert_eq!(deck.draw(), Some(Card::number(Color::Red, 2)));
        assert_eq!(deck.draw_count(), 1);
    }

    #[test]
    fn reshuffle_keeps_discard_top() {
        let mut deck = manager(Vec::new());
        deck.discard(Card::number(Color::Red, 1), Some(Color::Red));
        deck.discard(Card::number(Color::Red, 2), Some(Color::Red));
        deck.discard(Card::number(Color::Blue, 2), Some(Color::Blue));

        assert!(deck.can_draw());
        let drawn = deck.draw().expect("recycled card");
        assert_ne!(drawn, Card::number(Color::Blue, 2));
        assert_eq!(deck.discard_count(), 1);
        assert_eq!(deck.draw_count(), 1);
        let top = deck.top().expect("top");
        assert_eq!(top.card, Card::number(Color::Blue, 2));
        assert_eq!(top.color, Some(Color::Blue));
    }

    #[test]
    fn exhausted_when_only_top_remains() {
        let mut deck = manager(Vec::new());
        deck.discard(Card::number(Color::Green, 9), Some(Color::Green));
        assert!(!deck.can_draw());
        assert_eq!(deck.draw(), None);
        assert_eq!(deck.discard_count(), 1);
    }

    #[test]
    fn open_skips_wild_family() {
        let mut deck = manager(vec![
            Card::number(Color::Yellow, 3),
            Card::wild(),
            Card::wild_draw_four(),
        ]);
        let opening = deck.open().expect("opening card");
        assert_eq!(opening, Card::number(Color::Yellow, 3));
        assert_eq!(deck.draw_count(), 2);
        assert!(deck.top().is_some_and(|top| top.color == Some(Color::Yellow)));
    }

    #[test]
    fn open_fails_on_all_wild_pile() {
        let mut deck = manager(vec![Card::wild(), Card::wild()]);
        assert_eq!(deck.open(), Err(ConfigError::NoOpeningCard));
    }

    #[test]
    fn same_seed_same_shuffle() {
        let cards = crate::card::full_deck();
        let mut a = manager(cards.clone());
        let mut b = manager(cards);
        a.shuffle();
        b.shuffle();
        let left: Vec<_> = std::iter::from_fn(|| a.draw()).collect();
        let right: Vec<_> = std::iter::from_fn(|| b.draw()).collect();
        assert_eq!(left, right);
    }
}
