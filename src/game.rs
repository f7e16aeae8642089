use std::collections::HashSet;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::action::{Command, Outcome, SeatId};
use crate::card::{Card, Color, HAND_SIZE, MAX_SEATS, MIN_SEATS, UNO_PENALTY, full_deck};
use crate::deck::DeckManager;
use crate::effect::{CardEffect, DiscardTop, can_play, effect};
use crate::error::{ConfigError, MatchError};
use crate::obligation::ObligationTracker;
use crate::sequencer::{Direction, TeamRotation, TurnOrder};
use crate::state::{
    ChallengeTarget, MatchStatus, MatchView, OpponentView, SeatSpec, TurnPhase,
};

/// Configuration required to bootstrap a match.
#[derive(Clone, Copy, Debug)]
pub struct MatchConfig {
    pub hand_size: usize,
    /// Shuffle seed; `None` draws one from the operating system.
    pub seed: Option<u64>,
    pub team_mode: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            hand_size: HAND_SIZE,
            seed: None,
            team_mode: false,
        }
    }
}

/// Builder that enables deterministic deck and RNG injection for testing.
pub struct MatchBuilder {
    roster: Vec<SeatSpec>,
    config: MatchConfig,
    deck: Option<Vec<Card>>,
    rng: Option<Box<dyn RngCore + Send>>,
}

impl MatchBuilder {
    pub fn new(roster: Vec<SeatSpec>) -> Result<Self, ConfigError> {
        if !(MIN_SEATS..=MAX_SEATS).contains(&roster.len()) {
            return Err(ConfigError::SeatCount(roster.len()));
        }
        {
            let mut seen = HashSet::new();
            for seat in &roster {
                if !seen.insert(seat.id.as_str()) {
                    return Err(ConfigError::DuplicateSeat(seat.id.clone()));
                }
            }
        }
        Ok(Self {
            roster,
            config: MatchConfig::default(),
            deck: None,
            rng: None,
        })
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Replaces the shuffle generator entirely. Takes precedence over a seed.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Uses `deck` as the draw pile without shuffling it. The last card is the
    /// top: seat 0 is dealt first, then the opening card is turned.
    pub fn with_deck(mut self, deck: Vec<Card>) -> Self {
        self.deck = Some(deck);
        self
    }

    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.config.hand_size = hand_size;
        self
    }

    /// Switches to team-alternating turn order. Every seat must carry a team.
    pub fn with_team_mode(mut self) -> Self {
        self.config.team_mode = true;
        self
    }

    pub fn build(self) -> Result<MatchState, ConfigError> {
        MatchState::from_builder(self)
    }
}

#[derive(Clone, Debug)]
struct SeatState {
    id: SeatId,
    name: String,
    seat_index: usize,
    team: Option<u8>,
    hand: Vec<Card>,
}

#[derive(Clone, Debug)]
struct PendingWild {
    owner: SeatId,
    card: Card,
}

#[derive(Clone, Debug)]
struct Winner {
    id: SeatId,
    name: String,
    team: Option<u8>,
}

/// Authoritative state of one match. All mutations go through the command
/// methods; each either applies completely or returns an error untouched.
pub struct MatchState {
    seats: Vec<SeatState>,
    deck: DeckManager,
    deck_size: usize,
    current: usize,
    direction: Direction,
    pending_wild: Option<PendingWild>,
    forced_draw: u32,
    obligations: ObligationTracker,
    winner: Option<Winner>,
    turn_order: TurnOrder,
}

impl MatchState {
    pub fn builder(roster: Vec<SeatSpec>) -> Result<MatchBuilder, ConfigError> {
        MatchBuilder::new(roster)
    }

    fn from_builder(builder: MatchBuilder) -> Result<Self, ConfigError> {
        let MatchBuilder {
            roster,
            config,
            deck,
            rng,
        } = builder;
        if config.hand_size == 0 {
            return Err(ConfigError::HandSize);
        }
        let turn_order = if config.team_mode {
            let mut teams = Vec::with_capacity(roster.len());
            for seat in &roster {
                teams.push(seat.team.ok_or_else(|| ConfigError::MissingTeam(seat.id.clone()))?);
            }
            if teams.iter().collect::<HashSet<_>>().len() < 2 {
                return Err(ConfigError::TooFewTeams);
            }
            TurnOrder::TeamAlternating(TeamRotation::new(&teams, 0))
        } else {
            TurnOrder::Rotational
        };

        let rng: Box<dyn RngCore + Send> = match (rng, config.seed) {
            (Some(rng), _) => rng,
            (None, Some(seed)) => Box::new(StdRng::seed_from_u64(seed)),
            (None, None) => Box::new(StdRng::from_entropy()),
        };
        let (cards, shuffle) = match deck {
            Some(deck) => (deck, false),
            None => (full_deck(), true),
        };
        let deck_size = cards.len();
        let needed = roster.len() * config.hand_size + 1;
        if deck_size < needed {
            return Err(ConfigError::DeckTooSmall {
                needed,
                available: deck_size,
            });
        }
        let mut deck = DeckManager::new(cards, rng);
        if shuffle {
            deck.shuffle();
        }

        let mut seats = Vec::with_capacity(roster.len());
        for (seat_index, spec) in roster.into_iter().enumerate() {
            let mut hand = Vec::with_capacity(config.hand_size);
            for _ in 0..config.hand_size {
                hand.push(deck.draw().ok_or(ConfigError::DeckTooSmall {
                    needed,
                    available: deck_size,
                })?);
            }
            seats.push(SeatState {
                id: spec.id,
                name: spec.name,
                seat_index,
                team: spec.team,
                hand,
            });
        }
        let opening = deck.open()?;

        let mut obligations = ObligationTracker::new();
        for seat in &seats {
            obligations.observe(&seat.id, seat.hand.len());
        }

        let mut state = MatchState {
            seats,
            deck,
            deck_size,
            current: 0,
            direction: Direction::Clockwise,
            pending_wild: None,
            forced_draw: 1,
            obligations,
            winner: None,
            turn_order,
        };
        state.apply_opening(opening);
        info!(
            "match created with {} seats ({}), opening card {opening}",
            state.seats.len(),
            if state.turn_order.is_team_mode() { "team mode" } else { "rotational" }
        );
        Ok(state)
    }

    /// The opening card acts as if played just before seat 0's turn.
    fn apply_opening(&mut self, opening: Card) {
        let mut opening_effect = effect(opening);
        if opening_effect.reverse {
            self.direction = self.direction.reversed();
            if self.seats.len() == 2 {
                opening_effect.skip = true;
            }
        }
        if opening_effect.forced_draw > 0 {
            self.forced_draw = opening_effect.forced_draw;
        } else if opening_effect.skip {
            self.advance(false);
        }
    }

    pub fn status(&self) -> MatchStatus {
        match &self.winner {
            Some(winner) => MatchStatus::Finished {
                winner: winner.id.clone(),
                winner_name: winner.name.clone(),
                winning_team: winner.team,
            },
            None => MatchStatus::Ongoing,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        if self.winner.is_some() {
            TurnPhase::Finished
        } else if self.pending_wild.is_some() {
            TurnPhase::AwaitingColorChoice
        } else {
            TurnPhase::AwaitingAction
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<&SeatId> {
        self.winner.as_ref().map(|winner| &winner.id)
    }

    pub fn winning_team(&self) -> Option<u8> {
        self.winner.as_ref().and_then(|winner| winner.team)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_seat(&self) -> Option<&SeatId> {
        self.seats.get(self.current).map(|seat| &seat.id)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Forced-draw accumulator; 1 means no penalty is pending.
    pub fn forced_draw(&self) -> u32 {
        self.forced_draw
    }

    pub fn draw_pending(&self) -> bool {
        self.forced_draw > 1
    }

    pub fn pending_color_owner(&self) -> Option<&SeatId> {
        self.pending_wild.as_ref().map(|pending| &pending.owner)
    }

    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.seats.iter().map(|seat| seat.id.clone()).collect()
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn hand(&self, seat: &str) -> Option<&[Card]> {
        self.seats
            .iter()
            .find(|state| state.id == seat)
            .map(|state| state.hand.as_slice())
    }

    pub fn discard_top(&self) -> Option<DiscardTop> {
        self.deck.top()
    }

    pub fn draw_count(&self) -> usize {
        self.deck.draw_count()
    }

    pub fn discard_count(&self) -> usize {
        self.deck.discard_count()
    }

    /// Number of cards the match was built with.
    pub fn deck_size(&self) -> usize {
        self.deck_size
    }

    /// Cards currently accounted for across piles and hands.
    pub fn card_total(&self) -> usize {
        self.deck.draw_count()
            + self.deck.discard_count()
            + self.seats.iter().map(|seat| seat.hand.len()).sum::<usize>()
    }

    pub fn apply(&mut self, seat: &str, command: &Command) -> Result<Outcome, MatchError> {
        match command {
            Command::Play { card_index } => self.play_card(seat, *card_index),
            Command::Draw => self.draw_card(seat),
            Command::ChooseColor(color) => self.choose_color(seat, *color),
            Command::DeclareUno => self.declare_uno(seat),
            Command::ChallengeUno { target } => self.challenge_uno(seat, target),
        }
    }

    pub fn play_card(&mut self, seat: &str, card_index: usize) -> Result<Outcome, MatchError> {
        let index = self.require_turn(seat)?;
        let card = *self.seats[index]
            .hand
            .get(card_index)
            .ok_or(MatchError::InvalidCardIndex(card_index))?;
        if !can_play(card, self.deck.top(), self.draw_pending()) {
            return Err(MatchError::IllegalPlay);
        }

        let hand = &mut self.seats[index].hand;
        hand.remove(card_index);
        let remaining = hand.len();
        debug!("seat {seat} plays {card}, {remaining} left");
        if remaining == 0 {
            self.deck.discard(card, card.color);
            self.obligations.forget(seat);
            self.finish(index);
            return Ok(Outcome::Played {
                seat: seat.to_string(),
                card,
                awaiting_color: false,
                winner: Some(seat.to_string()),
            });
        }
        self.obligations.observe(seat, remaining);

        let mut card_effect = effect(card);
        if card_effect.reverse {
            self.direction = self.direction.reversed();
            if self.seats.len() == 2 {
                card_effect.skip = true;
            }
        }
        if card_effect.requires_color_choice {
            self.deck.discard(card, None);
            self.pending_wild = Some(PendingWild {
                owner: seat.to_string(),
                card,
            });
            return Ok(Outcome::Played {
                seat: seat.to_string(),
                card,
                awaiting_color: true,
                winner: None,
            });
        }

        self.deck.discard(card, card.color);
        self.resolve_turn(card_effect);
        Ok(Outcome::Played {
            seat: seat.to_string(),
            card,
            awaiting_color: false,
            winner: None,
        })
    }

    pub fn choose_color(&mut self, seat: &str, color: Color) -> Result<Outcome, MatchError> {
        self.ensure_ongoing()?;
        self.seat_index(seat)?;
        let card = match &self.pending_wild {
            Some(pending) if pending.owner == seat => pending.card,
            _ => return Err(MatchError::NoPendingColorChoice),
        };
        self.deck.set_top_color(color);
        self.pending_wild = None;
        debug!("seat {seat} chooses {color}");
        self.resolve_turn(effect(card));
        Ok(Outcome::ColorChosen {
            seat: seat.to_string(),
            color,
        })
    }

    pub fn draw_card(&mut self, seat: &str) -> Result<Outcome, MatchError> {
        let index = self.require_turn(seat)?;
        let wanted = self.forced_draw.max(1);
        let mut cards = Vec::with_capacity(wanted as usize);
        for _ in 0..wanted {
            match self.deck.draw() {
                Some(card) => cards.push(card),
                None => break,
            }
        }
        if cards.is_empty() {
            return Err(MatchError::NothingToDraw);
        }
        if cards.len() < wanted as usize {
            debug!("seat {seat} owed {wanted} cards but only {} were left", cards.len());
        }

        let hand = &mut self.seats[index].hand;
        hand.extend_from_slice(&cards);
        let size = hand.len();
        self.obligations.observe(seat, size);
        self.forced_draw = 1;
        self.advance(false);
        Ok(Outcome::Drew {
            seat: seat.to_string(),
            cards,
        })
    }

    pub fn declare_uno(&mut self, seat: &str) -> Result<Outcome, MatchError> {
        self.ensure_ongoing()?;
        let index = self.seat_index(seat)?;
        self.ensure_no_pending_color()?;
        self.obligations.declare(seat, self.seats[index].hand.len())?;
        info!("seat {seat} declares a single card");
        Ok(Outcome::Declared {
            seat: seat.to_string(),
        })
    }

    pub fn challenge_uno(&mut self, challenger: &str, target: &str) -> Result<Outcome, MatchError> {
        self.ensure_ongoing()?;
        self.seat_index(challenger)?;
        let target_index = self.seat_index(target)?;
        self.ensure_no_pending_color()?;
        self.obligations
            .check_challenge(challenger, target, self.seats[target_index].hand.len())?;

        let mut penalty_cards = 0;
        for _ in 0..UNO_PENALTY {
            match self.deck.draw() {
                Some(card) => {
                    self.seats[target_index].hand.push(card);
                    penalty_cards += 1;
                }
                None => break,
            }
        }
        self.obligations.resolve(target);
        info!("seat {challenger} caught {target}, penalty {penalty_cards} cards");
        Ok(Outcome::Challenged {
            challenger: challenger.to_string(),
            target: target.to_string(),
            penalty_cards,
        })
    }

    /// Drops a seat that lost its connection. Always succeeds for a seat that
    /// is still present; ends the match when a single seat remains.
    pub fn remove_seat(&mut self, seat: &str) -> Result<Outcome, MatchError> {
        let index = self.seat_index(seat)?;
        let was_current = index == self.current;
        let successor = if was_current && !self.is_finished() && self.seats.len() > 2 {
            let next =
                self.turn_order
                    .advance(self.current, self.seats.len(), self.direction, false);
            (next != index).then_some(next)
        } else {
            None
        };

        let removed = self.seats.remove(index);
        self.deck.return_to_bottom(removed.hand);
        self.obligations.forget(seat);
        if self
            .pending_wild
            .as_ref()
            .is_some_and(|pending| pending.owner == seat)
        {
            self.pending_wild = None;
        }
        for (seat_index, state) in self.seats.iter_mut().enumerate() {
            state.seat_index = seat_index;
        }
        info!("seat {seat} removed, {} remain", self.seats.len());

        if self.is_finished() {
            self.current = self.current.min(self.seats.len().saturating_sub(1));
            return Ok(Outcome::SeatRemoved {
                seat: seat.to_string(),
                winner: None,
            });
        }
        if self.seats.len() == 1 {
            self.current = 0;
            self.finish(0);
            return Ok(Outcome::SeatRemoved {
                seat: seat.to_string(),
                winner: self.winner().cloned(),
            });
        }

        if was_current {
            self.current = match successor {
                Some(next) if next > index => next - 1,
                Some(next) => next,
                None => index % self.seats.len(),
            };
        } else if index < self.current {
            self.current -= 1;
        }
        if self.turn_order.is_team_mode() {
            let teams: Vec<u8> = self
                .seats
                .iter()
                .map(|state| state.team.unwrap_or_default())
                .collect();
            self.turn_order = TurnOrder::TeamAlternating(TeamRotation::new(&teams, self.current));
        }
        Ok(Outcome::SeatRemoved {
            seat: seat.to_string(),
            winner: None,
        })
    }

    /// Every command `seat` may legally issue right now.
    pub fn legal_commands(&self, seat: &str) -> Result<Vec<Command>, MatchError> {
        let index = self.seat_index(seat)?;
        if self.is_finished() {
            return Ok(Vec::new());
        }
        // The color window belongs to the wild's owner alone.
        if let Some(pending) = &self.pending_wild {
            return Ok(if pending.owner == seat {
                Color::ALL.into_iter().map(Command::ChooseColor).collect()
            } else {
                Vec::new()
            });
        }
        let mut commands = Vec::new();
        let hand = &self.seats[index].hand;
        if index == self.current {
            let top = self.deck.top();
            let pending = self.draw_pending();
            commands.extend(
                hand.iter()
                    .enumerate()
                    .filter(|(_, card)| can_play(**card, top, pending))
                    .map(|(card_index, _)| Command::Play { card_index }),
            );
            if self.deck.can_draw() {
                commands.push(Command::Draw);
            }
        }
        if hand.len() == 1 && self.obligations.is_required(seat) {
            commands.push(Command::DeclareUno);
        }
        for other in &self.seats {
            if other.id != seat && self.is_challengeable(other) {
                commands.push(Command::ChallengeUno {
                    target: other.id.clone(),
                });
            }
        }
        Ok(commands)
    }

    /// Snapshot of the match as `seat` is allowed to see it.
    pub fn view_for(&self, seat: &str) -> Result<MatchView, MatchError> {
        let index = self.seat_index(seat)?;
        let me = &self.seats[index];
        let team_mode = self.turn_order.is_team_mode();
        let color_window = self.pending_wild.is_some();
        let opponents = self
            .seats
            .iter()
            .filter(|other| other.id != me.id)
            .map(|other| OpponentView {
                id: other.id.clone(),
                name: other.name.clone(),
                seat_index: other.seat_index,
                team: other.team,
                hand_size: other.hand.len(),
                hand: (team_mode && other.team.is_some() && other.team == me.team)
                    .then(|| other.hand.clone()),
            })
            .collect();
        let challengeable = self
            .seats
            .iter()
            .filter(|other| !color_window && other.id != me.id && self.is_challengeable(other))
            .map(|other| ChallengeTarget {
                id: other.id.clone(),
                name: other.name.clone(),
                seat_index: other.seat_index,
            })
            .collect();
        let top = self.deck.top();
        let ongoing = !self.is_finished();
        let has_declared = self.obligations.has_declared(seat);

        Ok(MatchView {
            self_seat: me.id.clone(),
            seat_index: me.seat_index,
            team: me.team,
            seat_count: self.seats.len(),
            hand: me.hand.clone(),
            opponents,
            discard_top: top.map(|top| top.card),
            discard_color: top.and_then(|top| top.color),
            deck_count: self.deck.draw_count(),
            current_seat: self.current,
            is_my_turn: ongoing && index == self.current,
            direction: self.direction,
            phase: self.phase(),
            awaiting_my_color: self
                .pending_wild
                .as_ref()
                .is_some_and(|pending| pending.owner == seat),
            status: self.status(),
            draw_pending: self.draw_pending(),
            pending_draw: if self.draw_pending() { self.forced_draw } else { 0 },
            can_declare_uno: ongoing
                && !color_window
                && self.obligations.is_required(seat)
                && me.hand.len() == 1,
            has_declared,
            challengeable,
        })
    }

    fn is_challengeable(&self, seat: &SeatState) -> bool {
        seat.hand.len() == 1 && self.obligations.is_required(&seat.id)
    }

    fn seat_index(&self, seat: &str) -> Result<usize, MatchError> {
        self.seats
            .iter()
            .position(|state| state.id == seat)
            .ok_or_else(|| MatchError::UnknownSeat(seat.to_string()))
    }

    fn ensure_ongoing(&self) -> Result<(), MatchError> {
        if self.is_finished() {
            return Err(MatchError::MatchOver);
        }
        Ok(())
    }

    fn ensure_no_pending_color(&self) -> Result<(), MatchError> {
        if self.pending_wild.is_some() {
            return Err(MatchError::PendingColorChoice);
        }
        Ok(())
    }

    /// Validates that `seat` may take a turn action and returns its index.
    fn require_turn(&self, seat: &str) -> Result<usize, MatchError> {
        self.ensure_ongoing()?;
        let index = self.seat_index(seat)?;
        if index != self.current {
            return Err(MatchError::NotYourTurn);
        }
        if self.pending_wild.is_some() {
            return Err(MatchError::PendingColorChoice);
        }
        Ok(index)
    }

    /// Folds a forced draw into the accumulator and passes the turn. A card
    /// that forces a draw does not skip: the next seat may stack or draw.
    fn resolve_turn(&mut self, mut card_effect: CardEffect) {
        if card_effect.forced_draw > 0 {
            self.forced_draw = if self.draw_pending() {
                self.forced_draw + card_effect.forced_draw
            } else {
                card_effect.forced_draw
            };
            card_effect.skip = false;
        }
        self.advance(card_effect.skip);
    }

    fn advance(&mut self, skip: bool) {
        self.current = self
            .turn_order
            .advance(self.current, self.seats.len(), self.direction, skip);
    }

    fn finish(&mut self, index: usize) {
        let seat = &self.seats[index];
        let team = if self.turn_order.is_team_mode() { seat.team } else { None };
        info!("seat {} ({}) wins the match", seat.id, seat.name);
        self.winner = Some(Winner {
            id: seat.id.clone(),
            name: seat.name.clone(),
            team,
        });
    }
}
