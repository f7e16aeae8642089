//! Card effects and the playability predicate.

use crate::card::{Card, Color, Rank};

/// What a played card does to the turn order.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CardEffect {
    pub skip: bool,
    pub reverse: bool,
    pub forced_draw: u32,
    pub requires_color_choice: bool,
}

/// Face-up card of the discard pile together with its effective color.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DiscardTop {
    pub card: Card,
    /// Chosen color for wild-family cards, the card's own color otherwise.
    /// Unset only while a color choice is outstanding.
    pub color: Option<Color>,
}

impl DiscardTop {
    pub fn new(card: Card) -> Self {
        Self { card, color: card.color }
    }
}

pub fn effect(card: Card) -> CardEffect {
    match card.rank {
        Rank::Number(_) => CardEffect::default(),
        Rank::Skip => CardEffect { skip: true, ..CardEffect::default() },
        Rank::Reverse => CardEffect { reverse: true, ..CardEffect::default() },
        Rank::DrawTwo => CardEffect {
            skip: true,
            forced_draw: 2,
            ..CardEffect::default()
        },
        Rank::Wild => CardEffect {
            requires_color_choice: true,
            ..CardEffect::default()
        },
        Rank::WildDrawFour => CardEffect {
            skip: true,
            forced_draw: 4,
            requires_color_choice: true,
            ..CardEffect::default()
        },
    }
}

/// Checks whether `card` may be played on `top`.
///
/// While a forced draw is pending only a stacking card is legal: `DrawTwo` or
/// `WildDrawFour` on a `DrawTwo`, and only `WildDrawFour` on a `WildDrawFour`.
pub fn can_play(card: Card, top: Option<DiscardTop>, draw_pending: bool) -> bool {
    let Some(top) = top else {
        return true;
    };
    if draw_pending {
        return match top.card.rank {
            Rank::DrawTwo => matches!(card.rank, Rank::DrawTwo | Rank::WildDrawFour),
            Rank::WildDrawFour => card.rank == Rank::WildDrawFour,
            _ => false,
        };
    }
    if card.is_wild() {
        return true;
    }
    // A wild top without a chosen color matches nothing but another wild.
    (top.color.is_some() && card.color == top.color) || card.rank == top.card.rank
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(card: Card) -> Option<DiscardTop> {
        Some(DiscardTop::new(card))
    }

    #[test]
    fn effect_table() {
        assert_eq!(effect(Card::number(Color::Red, 5)), CardEffect::default());
        assert!(effect(Card::skip(Color::Red)).skip);
        let reverse = effect(Card::reverse(Color::Red));
        assert!(reverse.reverse && !reverse.skip);
        let draw_two = effect(Card::draw_two(Color::Red));
        assert!(draw_two.skip);
        assert_eq!(draw_two.forced_draw, 2);
        assert!(!draw_two.requires_color_choice);
        let wild = effect(Card::wild());
        assert!(wild.requires_color_choice && !wild.skip);
        assert_eq!(wild.forced_draw, 0);
        let wild4 = effect(Card::wild_draw_four());
        assert!(wild4.skip && wild4.requires_color_choice);
        assert_eq!(wild4.forced_draw, 4);
    }

    #[test]
    fn anything_opens_an_empty_pile() {
        assert!(can_play(Card::number(Color::Blue, 3), None, false));
    }

    #[test]
    fn number_matches_by_color_or_rank() {
        let red7 = top(Card::number(Color::Red, 7));
        assert!(can_play(Card::number(Color::Red, 2), red7, false));
        assert!(can_play(Card::number(Color::Blue, 7), red7, false));
        assert!(!can_play(Card::number(Color::Blue, 2), red7, false));
        assert!(can_play(Card::skip(Color::Red), red7, false));
        assert!(!can_play(Card::skip(Color::Green), red7, false));
        assert!(can_play(Card::skip(Color::Green), top(Card::skip(Color::Red)), false));
    }

    #[test]
    fn wilds_are_always_playable_without_pending_draw() {
        let green1 = top(Card::number(Color::Green, 1));
        assert!(can_play(Card::wild(), green1, false));
        assert!(can_play(Card::wild_draw_four(), green1, false));
    }

    #[test]
    fn chosen_wild_color_restricts_by_color_only() {
        let chosen = Some(DiscardTop { card: Card::wild(), color: Some(Color::Yellow) });
        assert!(can_play(Card::number(Color::Yellow, 4), chosen, false));
        assert!(!can_play(Card::number(Color::Red, 4), chosen, false));
        assert!(can_play(Card::wild(), chosen, false));
    }

    #[test]
    fn uncolored_wild_top_only_takes_wilds() {
        let orphaned = Some(DiscardTop { card: Card::wild(), color: None });
        assert!(!can_play(Card::number(Color::Blue, 3), orphaned, false));
        assert!(!can_play(Card::skip(Color::Red), orphaned, false));
        assert!(can_play(Card::wild(), orphaned, false));
        assert!(can_play(Card::wild_draw_four(), orphaned, false));
    }

    #[test]
    fn stacking_table_under_pending_draw() {
        let draw_two = top(Card::draw_two(Color::Red));
        assert!(can_play(Card::draw_two(Color::Blue), draw_two, true));
        assert!(can_play(Card::wild_draw_four(), draw_two, true));
        assert!(!can_play(Card::number(Color::Red, 2), draw_two, true));
        assert!(!can_play(Card::wild(), draw_two, true));

        let wild4 = Some(DiscardTop { card: Card::wild_draw_four(), color: Some(Color::Red) });
        assert!(can_play(Card::wild_draw_four(), wild4, true));
        assert!(!can_play(Card::draw_two(Color::Red), wild4, true));
        assert!(!can_play(Card::wild(), wild4, true));
    }
}
