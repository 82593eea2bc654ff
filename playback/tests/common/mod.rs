#![allow(dead_code)]

use ::common::{GameEvent, Pacing, PlayerId, Rosters, Snapshot};
use anyhow::{Result, bail};
use playback::{PlayRequest, PlaySession, SimulationClient, SimulationError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

pub const SNAPSHOT_BUFFER: usize = 64;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

pub fn rosters() -> Arc<Rosters> {
    Arc::new(Rosters::warriors_rockets())
}

/// Session with real pacing and CURRY holding the ball for home.
pub async fn ready_session(client: Arc<dyn SimulationClient>) -> Result<PlaySession> {
    let session = PlaySession::new(rosters(), client, Pacing::default(), SNAPSHOT_BUFFER);
    session.assign_ball_holder(PlayerId::new("gsw1")).await?;
    Ok(session)
}

/// Reads snapshots until the terminal one arrives.
pub async fn drain_play(rx: &mut broadcast::Receiver<Snapshot>) -> Result<Vec<Snapshot>> {
    let mut snapshots = Vec::new();
    loop {
        let snapshot = rx.recv().await?;
        let done = snapshot.is_terminal();
        snapshots.push(snapshot);
        if done {
            return Ok(snapshots);
        }
        if snapshots.len() > 1000 {
            bail!("playback never reached a terminal snapshot");
        }
    }
}

/// Service that is down.
pub struct FailingClient;

#[async_trait::async_trait]
impl SimulationClient for FailingClient {
    async fn simulate(&self, _request: &PlayRequest) -> Result<Vec<GameEvent>, SimulationError> {
        Err(SimulationError::Status {
            status: 503,
            body: "model not loaded".to_string(),
        })
    }
}

/// Answers after `delay` with a fixed script.
pub struct SlowClient {
    pub delay: Duration,
    pub events: Vec<GameEvent>,
}

#[async_trait::async_trait]
impl SimulationClient for SlowClient {
    async fn simulate(&self, _request: &PlayRequest) -> Result<Vec<GameEvent>, SimulationError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.events.clone())
    }
}
