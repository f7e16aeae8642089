use std::collections::HashMap;

use crate::action::SeatId;
use crate::error::MatchError;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Obligation {
    pub required: bool,
    pub declared: bool,
}

/// Tracks seats holding a single card: whether they still owe a declaration
/// and whether they have made it.
#[derive(Clone, Debug, Default)]
pub struct ObligationTracker {
    entries: HashMap<SeatId, Obligation>,
}

impl ObligationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Syncs the entry of `seat` with its new hand size.
    pub fn observe(&mut self, seat: &str, hand_size: usize) {
        if hand_size == 1 {
            self.entries
                .entry(seat.to_string())
                .or_insert(Obligation { required: true, declared: false });
        } else {
            self.entries.remove(seat);
        }
    }

    pub fn declare(&mut self, seat: &str, hand_size: usize) -> Result<(), MatchError> {
        if hand_size != 1 {
            return Err(MatchError::NotSingleCard);
        }
        let entry = self.entries.entry(seat.to_string()).or_default();
        entry.declared = true;
        entry.required = false;
        Ok(())
    }

    /// Validates a challenge against `target`; the caller applies the penalty
    /// and then calls [`ObligationTracker::resolve`].
    pub fn check_challenge(
        &self,
        challenger: &str,
        target: &str,
        target_hand_size: usize,
    ) -> Result<(), MatchError> {
        if challenger == target {
            return Err(MatchError::SelfChallenge);
        }
        if target_hand_size != 1 {
            return Err(MatchError::NotSingleCard);
        }
        // Declaring or an earlier successful challenge settles the obligation.
        if !self.is_required(target) {
            return Err(MatchError::AlreadyDeclared);
        }
        Ok(())
    }

    pub fn resolve(&mut self, seat: &str) {
        self.entries.remove(seat);
    }

    pub fn forget(&mut self, seat: &str) {
        self.entries.remove(seat);
    }

    pub fn has_declared(&self, seat: &str) -> bool {
        self.entries.get(seat).is_some_and(|entry| entry.declared)
    }

    pub fn is_required(&self, seat: &str) -> bool {
        self.entries.get(seat).is_some_and(|entry| entry.required)
    }

    pub fn get(&self, seat: &str) -> Option<Obligation> {
        self.entries.get(seat).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_follows_hand_size() {
        let mut tracker = ObligationTracker::new();
        tracker.observe("a", 2);
        assert_eq!(tracker.get("a"), None);
        tracker.observe("a", 1);
        assert!(tracker.is_required("a"));
        tracker.observe("a", 3);
        assert_eq!(tracker.get("a"), None);
    }

    #[test]
    fn declaration_clears_requirement() -> Result<(), MatchError> {
        let mut tracker = ObligationTracker::new();
        tracker.observe("a", 1);
        tracker.declare("a", 1)?;
        assert_eq!(tracker.get("a"), Some(Obligation { required: false, declared: true }));
        assert_eq!(
            tracker.check_challenge("b", "a", 1),
            Err(MatchError::AlreadyDeclared)
        );
        Ok(())
    }

    #[test]
    fn declaring_needs_single_card() {
        let mut tracker = ObligationTracker::new();
        assert_eq!(tracker.declare("a", 2), Err(MatchError::NotSingleCard));
        assert!(!tracker.has_declared("a"));
    }

    #[test]
    fn challenge_validation_order() {
        let mut tracker = ObligationTracker::new();
        tracker.observe("a", 1);
        assert_eq!(tracker.check_challenge("a", "a", 1), Err(MatchError::SelfChallenge));
        assert_eq!(tracker.check_challenge("b", "a", 2), Err(MatchError::NotSingleCard));
        assert_eq!(tracker.check_challenge("b", "a", 1), Ok(()));
        tracker.resolve("a");
        assert_eq!(tracker.get("a"), None);
        assert_eq!(tracker.check_challenge("b", "a", 1), Err(MatchError::AlreadyDeclared));
    }
}
