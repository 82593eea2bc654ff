use common::{GameState, Pacing, PlaybackPhase, PlayerId, Rosters, Snapshot, StateError, TeamSide};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::{RwLock, broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::{PlayRequest, SimulationClient, SimulationError};
use crate::config::PlaybackConfig;
use crate::engine::{Cancelled, EventPlaybackEngine, PlaybackObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("no ball holder assigned")]
    NoBallHolder,
    #[error("a play is already in progress")]
    AlreadySimulating,
}

#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    #[error("play request rejected: {0}")]
    RequestRejected(#[from] RejectReason),
    #[error("simulation unavailable: {0}")]
    SimulationUnavailable(#[from] SimulationError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot change the court while a play is running")]
    Busy,
    #[error(transparent)]
    State(#[from] StateError),
}

/// Puts the session back to Idle however `play` exits, including when its
/// future is dropped mid-playback. Disarmed once a completed play hands the
/// phase back itself.
struct IdleOnDrop<'a> {
    observer: &'a PlaybackObserver,
    armed: bool,
}

impl<'a> IdleOnDrop<'a> {
    fn new(observer: &'a PlaybackObserver) -> Self {
        Self { observer, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.observer.set_phase(PlaybackPhase::Idle);
        }
    }
}

/// Owns the court state between plays and runs one play at a time against it.
pub struct PlaySession {
    engine: EventPlaybackEngine,
    client: Arc<dyn SimulationClient>,
    state: RwLock<GameState>,
    observer: PlaybackObserver,
    next_play_id: AtomicU32,
}

impl PlaySession {
    pub fn new(
        rosters: Arc<Rosters>,
        client: Arc<dyn SimulationClient>,
        pacing: Pacing,
        snapshot_buffer: usize,
    ) -> Self {
        Self {
            engine: EventPlaybackEngine::new(rosters, pacing),
            client,
            state: RwLock::new(GameState::initial()),
            observer: PlaybackObserver::new(snapshot_buffer),
            next_play_id: AtomicU32::new(1),
        }
    }

    pub fn from_config(
        rosters: Arc<Rosters>,
        client: Arc<dyn SimulationClient>,
        config: &PlaybackConfig,
    ) -> Self {
        Self::new(rosters, client, config.pacing(), config.snapshot_buffer)
    }

    pub fn rosters(&self) -> &Rosters {
        self.engine.rosters()
    }

    /// Last committed state. While a play runs this is the pre-play state;
    /// live progress goes out through `subscribe`.
    pub async fn state(&self) -> GameState {
        self.state.read().await.clone()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.observer.phase()
    }

    pub fn is_simulating(&self) -> bool {
        self.phase() != PlaybackPhase::Idle
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.observer.subscribe()
    }

    pub fn watch_phase(&self) -> watch::Receiver<PlaybackPhase> {
        self.observer.watch_phase()
    }

    pub async fn assign_ball_holder(&self, id: PlayerId) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        if self.is_simulating() {
            return Err(SessionError::Busy);
        }
        state.set_ball_holder(id, self.engine.rosters())?;
        Ok(())
    }

    pub async fn set_possession(&self, side: TeamSide) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        if self.is_simulating() {
            return Err(SessionError::Busy);
        }
        state.set_possession(side, self.engine.rosters());
        Ok(())
    }

    /// Back to a fresh court: home ball, nobody holding it, scoreboard cleared.
    pub async fn reset(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        if self.is_simulating() {
            return Err(SessionError::Busy);
        }
        *state = GameState::initial();
        Ok(())
    }

    /// Requests a possession from the simulation client and plays it back.
    ///
    /// The committed state only changes when playback runs to completion; a
    /// rejected, failed or cancelled play leaves it exactly as it was.
    pub async fn play(&self, cancel: CancellationToken) -> Result<GameState, PlayError> {
        let (play_id, request, initial) = {
            let state = self.state.read().await;
            let request = PlayRequest::from_state(&state, self.engine.rosters())
                .ok_or(RejectReason::NoBallHolder)?;
            if !self.observer.try_begin() {
                return Err(RejectReason::AlreadySimulating.into());
            }
            let play_id = self.next_play_id.fetch_add(1, Ordering::Relaxed);
            (play_id, request, state.settled())
        };
        let mut idle = IdleOnDrop::new(&self.observer);

        info!(play_id, ball_handler = %request.ball_handler, "Requesting simulated play");
        let events = tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(Cancelled.into()),
            result = self.client.simulate(&request) => result,
        };
        let events = match events {
            Ok(events) if events.is_empty() => Err(SimulationError::Empty),
            other => other,
        }
        .inspect_err(|e| warn!(play_id, error = %e, "Simulation failed, staying idle"))?;

        let final_state = self
            .engine
            .run(play_id, &events, &initial, &self.observer, &cancel)
            .await
            .inspect_err(|_| info!(play_id, "Playback cancelled"))?;

        // Stored before the terminal snapshot goes out
        *self.state.write().await = final_state.clone();
        idle.disarm();
        self.observer.finish(play_id, &final_state);
        Ok(final_state)
    }
}
