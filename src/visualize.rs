use std::fmt::Write;

use crate::action::Command;
use crate::sequencer::Direction;
use crate::state::{MatchStatus, MatchView, TurnPhase};

/// Customize view rendering for CLI visualization.
#[derive(Clone, Copy, Debug)]
pub struct VisualOptions {
    pub show_teammate_hands: bool,
    pub show_challengeable: bool,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            show_teammate_hands: true,
            show_challengeable: true,
        }
    }
}

pub fn render_view(view: &MatchView) -> String {
    render_view_with_options(view, VisualOptions::default())
}

pub fn render_view_with_options(view: &MatchView, options: VisualOptions) -> String {
    let mut out = String::new();
    let status = match &view.status {
        MatchStatus::Ongoing => String::from("Ongoing"),
        MatchStatus::Finished {
            winner_name,
            winning_team: Some(team),
            ..
        } => format!("Finished (winner: {winner_name}, team {team})"),
        MatchStatus::Finished { winner_name, .. } => format!("Finished (winner: {winner_name})"),
    };
    let _ = writeln!(out, "Match status: {status}");
    let phase = match view.phase {
        TurnPhase::AwaitingAction => "awaiting action",
        TurnPhase::AwaitingColorChoice => "awaiting color choice",
        TurnPhase::Finished => "finished",
    };
    let direction = match view.direction {
        Direction::Clockwise => "clockwise",
        Direction::CounterClockwise => "counter-clockwise",
    };
    let _ = writeln!(out, "Phase: {phase}  |  Direction: {direction}");
    let top = match (view.discard_top, view.discard_color) {
        (Some(card), Some(color)) if card.is_wild() => format!("{card} ({color})"),
        (Some(card), _) => card.to_string(),
        (None, _) => String::from("--"),
    };
    let _ = writeln!(out, "Discard: {top}  |  Deck: {}", view.deck_count);
    if view.draw_pending {
        let _ = writeln!(out, "Pending draw: {}", view.pending_draw);
    }
    let _ = writeln!(out, "Seats:");
    let mut seats: Vec<(usize, String)> = view
        .opponents
        .iter()
        .map(|opponent| {
            let mut line = format!(
                "  [{}] {} - {} cards",
                opponent.seat_index, opponent.name, opponent.hand_size
            );
            if options.show_teammate_hands {
                if let Some(hand) = &opponent.hand {
                    let cards = hand.iter().map(ToString::to_string).collect::<Vec<_>>();
                    let _ = write!(line, " (teammate: {})", cards.join(", "));
                }
            }
            (opponent.seat_index, line)
        })
        .collect();
    let hand = if view.hand.is_empty() {
        String::from("(empty)")
    } else {
        view.hand
            .iter()
            .enumerate()
            .map(|(index, card)| format!("{index}:{card}"))
            .collect::<Vec<_>>()
            .join("  ")
    };
    seats.push((
        view.seat_index,
        format!("  [{}] You - {hand}", view.seat_index),
    ));
    seats.sort_by_key(|(index, _)| *index);
    for (index, line) in seats {
        let marker = if index == view.current_seat { " <- current" } else { "" };
        let _ = writeln!(out, "{line}{marker}");
    }
    if options.show_challengeable && !view.challengeable.is_empty() {
        let names = view
            .challengeable
            .iter()
            .map(|target| target.name.as_str())
            .collect::<Vec<_>>();
        let _ = writeln!(out, "Undeclared single card: {}", names.join(", "));
    }
    out
}

pub fn describe_command(view: &MatchView, command: &Command) -> String {
    match command {
        Command::Play { card_index } => match view.hand.get(*card_index) {
            Some(card) => format!("Play hand[{card_index}] {card}"),
            None => format!("Play hand[{card_index}]"),
        },
        Command::Draw if view.draw_pending => format!("Draw {} cards", view.pending_draw),
        Command::Draw => String::from("Draw a card"),
        Command::ChooseColor(color) => format!("Choose {color}"),
        Command::DeclareUno => String::from("Declare last card"),
        Command::ChallengeUno { target } => {
            let name = view
                .opponents
                .iter()
                .find(|opponent| &opponent.id == target)
                .map(|opponent| opponent.name.as_str())
                .unwrap_or(target.as_str());
            format!("Challenge {name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Color;
    use crate::game::MatchBuilder;
    use crate::state::SeatSpec;

    #[test]
    fn render_and_describe_include_expected_phrases() {
        let roster = vec![SeatSpec::new("a", "Ann"), SeatSpec::new("b", "Bo")];
        let state = MatchBuilder::new(roster)
            .expect("roster")
            .with_seed(11)
            .build()
            .expect("match");
        let view = state.view_for("a").expect("view");
        let text = render_view(&view);
        assert!(text.contains("You - 0:"));
        assert!(text.contains("Bo - 7 cards"));
        assert!(text.contains("Discard:"));

        assert!(describe_command(&view, &Command::Play { card_index: 0 }).starts_with("Play hand[0]"));
        assert_eq!(describe_command(&view, &Command::ChooseColor(Color::Green)), "Choose green");
        assert_eq!(
            describe_command(&view, &Command::ChallengeUno { target: String::from("b") }),
            "Challenge Bo"
        );
    }
}
