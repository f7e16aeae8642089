use rand::Rng;
use rand::seq::SliceRandom;

use crate::action::Command;
use crate::bot::Bot;
use crate::state::MatchView;

/// Baseline bot that samples uniformly from the legal command set.
pub struct RandomBot<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomBot<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Bot for RandomBot<R> {
    fn select_command(&mut self, _view: &MatchView, legal_commands: &[Command]) -> Option<Command> {
        legal_commands.choose(&mut self.rng).cloned()
    }
}
