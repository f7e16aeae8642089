//! Single-writer access to running matches and the turn clock plumbing.
//!
//! Every command against a match runs inside that match's mutex, so player
//! commands and timer callbacks never interleave. After each mutation the
//! per-seat views are taken and handed to the [`Broadcaster`] before the lock
//! is released, so no reader ever sees a half-applied command.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;

use crate::action::{Command, Outcome, SeatId};
use crate::card::Color;
use crate::error::MatchError;
use crate::game::MatchState;
use crate::state::{MatchView, TurnPhase};

pub type MatchId = String;

const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifies one armed timer. A token is only honoured while the match is
/// still on the same turn generation and the same seat is acting.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub match_id: MatchId,
    pub seat: SeatId,
    pub generation: u64,
}

/// Timeout scheduler. Expiry is reported back through
/// [`MatchDirectory::force_timeout`].
pub trait TurnClock: Send + Sync {
    fn arm(&self, token: TimerToken, after: Duration);
    fn disarm(&self, match_id: &str);
}

/// Per-seat delivery of match views.
pub trait Broadcaster: Send + Sync {
    fn deliver(&self, match_id: &str, view: MatchView);
}

#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub turn_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turn_timeout: DEFAULT_TURN_TIMEOUT,
        }
    }
}

struct SessionInner {
    state: MatchState,
    generation: u64,
}

/// Serialized execution context of one match.
#[derive(Clone)]
pub struct MatchSession {
    id: MatchId,
    inner: Arc<Mutex<SessionInner>>,
    clock: Arc<dyn TurnClock>,
    broadcaster: Arc<dyn Broadcaster>,
    config: SessionConfig,
}

impl MatchSession {
    pub fn new(
        id: impl Into<MatchId>,
        state: MatchState,
        clock: Arc<dyn TurnClock>,
        broadcaster: Arc<dyn Broadcaster>,
        config: SessionConfig,
    ) -> Self {
        Self {
            id: id.into(),
            inner: Arc::new(Mutex::new(SessionInner {
                state,
                generation: 0,
            })),
            clock,
            broadcaster,
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Arms the first turn and sends the opening views.
    pub async fn start(&self) {
        let mut inner = self.inner.lock().await;
        self.rearm(&mut inner);
        self.publish(&inner.state);
    }

    pub async fn play_card(&self, seat: &str, card_index: usize) -> Result<Outcome, MatchError> {
        self.turn_action(|state| state.play_card(seat, card_index))
            .await
    }

    pub async fn draw_card(&self, seat: &str) -> Result<Outcome, MatchError> {
        self.turn_action(|state| state.draw_card(seat)).await
    }

    /// Takes the color as sent over the wire.
    pub async fn choose_color(&self, seat: &str, color: &str) -> Result<Outcome, MatchError> {
        let color: Color = color.parse()?;
        self.turn_action(|state| state.choose_color(seat, color))
            .await
    }

    pub async fn declare_uno(&self, seat: &str) -> Result<Outcome, MatchError> {
        self.side_action(|state| state.declare_uno(seat)).await
    }

    pub async fn challenge_uno(&self, challenger: &str, target: &str) -> Result<Outcome, MatchError> {
        self.side_action(|state| state.challenge_uno(challenger, target))
            .await
    }

    pub async fn apply(&self, seat: &str, command: &Command) -> Result<Outcome, MatchError> {
        if command.is_turn_action() {
            self.turn_action(|state| state.apply(seat, command)).await
        } else {
            self.side_action(|state| state.apply(seat, command)).await
        }
    }

    /// Disconnect path. Re-arms the clock only when the acting seat or phase
    /// changed as a result.
    pub async fn remove_seat(&self, seat: &str) -> Result<Outcome, MatchError> {
        let mut inner = self.inner.lock().await;
        let before = (inner.state.current_seat().cloned(), inner.state.phase());
        let outcome = inner.state.remove_seat(seat)?;
        let after = (inner.state.current_seat().cloned(), inner.state.phase());
        if before != after {
            self.rearm(&mut inner);
        }
        self.publish(&inner.state);
        Ok(outcome)
    }

    /// Timer callback. Applies a draw for the token's seat only if the turn has
    /// not moved on since the timer was armed; otherwise does nothing.
    pub async fn force_timeout(&self, token: &TimerToken) -> Result<Option<Outcome>, MatchError> {
        let mut inner = self.inner.lock().await;
        let stale = token.generation != inner.generation
            || inner.state.is_finished()
            || inner.state.current_seat() != Some(&token.seat);
        if stale {
            debug!(
                "ignoring stale timer for seat {} in match {} (generation {} vs {})",
                token.seat, self.id, token.generation, inner.generation
            );
            return Ok(None);
        }
        let outcome = match inner.state.draw_card(&token.seat) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("forced draw for seat {} in match {} failed: {err}", token.seat, self.id);
                return Err(err);
            }
        };
        info!("seat {} timed out in match {}", token.seat, self.id);
        self.rearm(&mut inner);
        self.publish(&inner.state);
        Ok(Some(outcome))
    }

    pub async fn view_for(&self, seat: &str) -> Result<MatchView, MatchError> {
        self.inner.lock().await.state.view_for(seat)
    }

    /// Read access to the state between commands.
    pub async fn inspect<R>(&self, f: impl FnOnce(&MatchState) -> R) -> R {
        let inner = self.inner.lock().await;
        f(&inner.state)
    }

    async fn turn_action<F>(&self, f: F) -> Result<Outcome, MatchError>
    where
        F: FnOnce(&mut MatchState) -> Result<Outcome, MatchError>,
    {
        let mut inner = self.inner.lock().await;
        let outcome = f(&mut inner.state)?;
        self.rearm(&mut inner);
        self.publish(&inner.state);
        Ok(outcome)
    }

    async fn side_action<F>(&self, f: F) -> Result<Outcome, MatchError>
    where
        F: FnOnce(&mut MatchState) -> Result<Outcome, MatchError>,
    {
        let mut inner = self.inner.lock().await;
        let outcome = f(&mut inner.state)?;
        self.publish(&inner.state);
        Ok(outcome)
    }

    /// Cancels the running timer and starts a new turn generation.
    fn rearm(&self, inner: &mut SessionInner) {
        self.clock.disarm(&self.id);
        inner.generation += 1;
        if inner.state.phase() != TurnPhase::AwaitingAction {
            return;
        }
        if let Some(seat) = inner.state.current_seat() {
            self.clock.arm(
                TimerToken {
                    match_id: self.id.clone(),
                    seat: seat.clone(),
                    generation: inner.generation,
                },
                self.config.turn_timeout,
            );
        }
    }

    fn publish(&self, state: &MatchState) {
        for seat in state.seat_ids() {
            match state.view_for(&seat) {
                Ok(view) => self.broadcaster.deliver(&self.id, view),
                Err(err) => warn!("could not build view for seat {seat}: {err}"),
            }
        }
    }
}

/// All running matches, keyed by match id.
#[derive(Default)]
pub struct MatchDirectory {
    sessions: RwLock<HashMap<MatchId, MatchSession>>,
}

impl MatchDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: MatchSession) {
        let id = session.id().to_string();
        if self.sessions.write().await.insert(id.clone(), session).is_some() {
            warn!("replaced existing session for match {id}");
        }
    }

    pub async fn get(&self, match_id: &str) -> Result<MatchSession, MatchError> {
        self.sessions
            .read()
            .await
            .get(match_id)
            .cloned()
            .ok_or_else(|| MatchError::UnknownMatch(match_id.to_string()))
    }

    pub async fn remove(&self, match_id: &str) -> Option<MatchSession> {
        self.sessions.write().await.remove(match_id)
    }

    /// Entry point for the turn clock. Tokens for matches that no longer
    /// exist are ignored.
    pub async fn force_timeout(&self, token: &TimerToken) -> Result<Option<Outcome>, MatchError> {
        match self.get(&token.match_id).await {
            Ok(session) => session.force_timeout(token).await,
            Err(_) => {
                debug!("timer fired for unknown match {}", token.match_id);
                Ok(None)
            }
        }
    }

    /// Drains expired timers until the clock is dropped.
    pub async fn run_timeouts(&self, mut expired: mpsc::UnboundedReceiver<TimerToken>) {
        while let Some(token) = expired.recv().await {
            if let Err(err) = self.force_timeout(&token).await {
                warn!("timeout in match {} not applied: {err}", token.match_id);
            }
        }
    }
}

/// [`TurnClock`] backed by tokio timers, one per match. Expired tokens are
/// sent over the channel returned by [`TokioTurnClock::new`].
pub struct TokioTurnClock {
    expired: mpsc::UnboundedSender<TimerToken>,
    timers: StdMutex<HashMap<MatchId, JoinHandle<()>>>,
}

impl TokioTurnClock {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerToken>) {
        let (expired, receiver) = mpsc::unbounded_channel();
        let clock = Self {
            expired,
            timers: StdMutex::new(HashMap::new()),
        };
        (clock, receiver)
    }
}

impl TurnClock for TokioTurnClock {
    fn arm(&self, token: TimerToken, after: Duration) {
        let expired = self.expired.clone();
        let match_id = token.match_id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if expired.send(token).is_err() {
                debug!("timeout receiver dropped");
            }
        });
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timers.insert(match_id, handle) {
            previous.abort();
        }
    }

    fn disarm(&self, match_id: &str) {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timers.remove(match_id) {
            handle.abort();
        }
    }
}
