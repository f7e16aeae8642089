//! Turn order strategies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    pub fn step(self) -> isize {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Strategy selected once per match that picks the next acting seat.
#[derive(Clone, Debug)]
pub enum TurnOrder {
    Rotational,
    TeamAlternating(TeamRotation),
}

impl TurnOrder {
    pub fn advance(
        &mut self,
        current: usize,
        seat_count: usize,
        direction: Direction,
        skip: bool,
    ) -> usize {
        match self {
            TurnOrder::Rotational => {
                let steps = if skip { 2 } else { 1 };
                rotate(current, seat_count, direction, steps)
            }
            TurnOrder::TeamAlternating(rotation) => rotation.advance(skip),
        }
    }

    pub fn is_team_mode(&self) -> bool {
        matches!(self, TurnOrder::TeamAlternating(_))
    }
}

/// Moves `steps` seats around a table of `seat_count` seats.
pub fn rotate(current: usize, seat_count: usize, direction: Direction, steps: isize) -> usize {
    let n = seat_count as isize;
    (current as isize + direction.step() * steps).rem_euclid(n) as usize
}

#[derive(Clone, Debug)]
struct TeamSlot {
    members: Vec<usize>,
    cursor: usize,
}

/// Teams act in ascending team-id order; inside a team, members take turns
/// through a round-robin cursor that moves each time the team acts.
#[derive(Clone, Debug)]
pub struct TeamRotation {
    slots: Vec<TeamSlot>,
    pointer: usize,
}

impl TeamRotation {
    /// Builds the rotation from the team of every seat (by seat index), with
    /// `anchor` treated as the seat currently acting.
    pub fn new(teams: &[u8], anchor: usize) -> Self {
        let mut grouped: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
        for (seat, &team) in teams.iter().enumerate() {
            grouped.entry(team).or_default().push(seat);
        }
        let mut slots: Vec<TeamSlot> = grouped
            .into_values()
            .map(|members| TeamSlot { members, cursor: 0 })
            .collect();

        let mut pointer = 0;
        for (index, slot) in slots.iter_mut().enumerate() {
            if let Some(position) = slot.members.iter().position(|&seat| seat == anchor) {
                pointer = index;
                slot.cursor = (position + 1) % slot.members.len();
            }
        }
        Self { slots, pointer }
    }

    pub fn advance(&mut self, skip: bool) -> usize {
        let steps = if skip { 2 } else { 1 };
        self.pointer = (self.pointer + steps) % self.slots.len();
        let slot = &mut self.slots[self.pointer];
        let seat = slot.members[slot.cursor];
        slot.cursor = (slot.cursor + 1) % slot.members.len();
        seat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotational_plain_and_skip() {
        for n in 2..=8 {
            let mut order = TurnOrder::Rotational;
            for current in 0..n {
                assert_eq!(
                    order.advance(current, n, Direction::Clockwise, false),
                    (current + 1) % n
                );
                assert_eq!(
                    order.advance(current, n, Direction::Clockwise, true),
                    (current + 2) % n
                );
                assert_eq!(
                    order.advance(current, n, Direction::CounterClockwise, false),
                    (current + n - 1) % n
                );
                assert_eq!(
                    order.advance(current, n, Direction::CounterClockwise, true),
                    (current + 2 * n - 2) % n
                );
            }
        }
    }

    #[test]
    fn teams_alternate_and_members_round_robin() {
        // Seats 0 and 2 are team 1, seats 1 and 3 are team 2.
        let mut rotation = TeamRotation::new(&[1, 2, 1, 2], 0);
        let order: Vec<usize> = (0..7).map(|_| rotation.advance(false)).collect();
        assert_eq!(order, vec![1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn team_ids_are_visited_in_ascending_order() {
        // Seat order does not follow team order here.
        let mut rotation = TeamRotation::new(&[3, 1, 2, 1], 0);
        assert_eq!(rotation.advance(false), 1);
        assert_eq!(rotation.advance(false), 2);
        assert_eq!(rotation.advance(false), 0);
        assert_eq!(rotation.advance(false), 3);
    }

    #[test]
    fn team_skip_jumps_over_next_team() {
        let mut rotation = TeamRotation::new(&[0, 1, 2, 0, 1, 2], 0);
        // Team 0 acted with seat 0; a skip passes over team 1 entirely.
        assert_eq!(rotation.advance(true), 2);
        assert_eq!(rotation.advance(false), 3);
    }

    #[test]
    fn team_skip_with_two_teams_returns_to_same_team() {
        let mut rotation = TeamRotation::new(&[0, 1, 0, 1], 0);
        assert_eq!(rotation.advance(true), 2);
        assert_eq!(rotation.advance(false), 1);
    }
}
