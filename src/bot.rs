use crate::action::Command;
use crate::state::MatchView;

/// Interface for automated seats. `None` means the seat has nothing it may do.
pub trait Bot {
    fn select_command(&mut self, view: &MatchView, legal_commands: &[Command]) -> Option<Command>;
}
