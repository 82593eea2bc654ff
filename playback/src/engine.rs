use common::transition::{self, PlayContext};
use common::{GameEvent, GameState, Pacing, PlaybackPhase, Rosters, Snapshot, StepOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("playback cancelled")]
pub struct Cancelled;

/// Fan-out for playback progress: snapshots over a broadcast channel, the
/// current phase over a watch channel.
#[derive(Clone)]
pub struct PlaybackObserver {
    snapshots: broadcast::Sender<Snapshot>,
    phase: Arc<watch::Sender<PlaybackPhase>>,
}

impl PlaybackObserver {
    pub fn new(buffer: usize) -> Self {
        let (snapshots, _) = broadcast::channel(buffer);
        let (phase, _) = watch::channel(PlaybackPhase::Idle);
        Self {
            snapshots,
            phase: Arc::new(phase),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    pub fn watch_phase(&self) -> watch::Receiver<PlaybackPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> PlaybackPhase {
        *self.phase.borrow()
    }

    pub(crate) fn set_phase(&self, phase: PlaybackPhase) {
        self.phase.send_replace(phase);
    }

    /// Idle -> AwaitingEvents in one step. False if a play is already running.
    pub(crate) fn try_begin(&self) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase == PlaybackPhase::Idle {
                *phase = PlaybackPhase::AwaitingEvents;
                true
            } else {
                false
            }
        })
    }

    /// Completed -> Idle, then the terminal snapshot. Anyone reacting to the
    /// terminal snapshot already sees an idle observer.
    pub(crate) fn finish(&self, play_id: u32, final_state: &GameState) {
        self.set_phase(PlaybackPhase::Idle);
        self.publish(Snapshot {
            play_id,
            phase: PlaybackPhase::Idle,
            state: final_state.clone(),
        });
    }

    fn publish(&self, snapshot: Snapshot) {
        // Nobody listening is fine
        let _ = self.snapshots.send(snapshot);
    }
}

/// Replays an event list against a game state with the configured pacing.
pub struct EventPlaybackEngine {
    rosters: Arc<Rosters>,
    pacing: Pacing,
}

impl EventPlaybackEngine {
    pub fn new(rosters: Arc<Rosters>, pacing: Pacing) -> Self {
        Self { rosters, pacing }
    }

    pub fn rosters(&self) -> &Rosters {
        &self.rosters
    }

    /// Applies `events` in order, publishing one snapshot per event and a final
    /// idle snapshot. Returns the settled end-of-possession state.
    ///
    /// Nothing is published once `cancel` fires.
    pub async fn play(
        &self,
        play_id: u32,
        events: &[GameEvent],
        initial: &GameState,
        observer: &PlaybackObserver,
        cancel: &CancellationToken,
    ) -> Result<GameState, Cancelled> {
        let final_state = self.run(play_id, events, initial, observer, cancel).await?;
        observer.finish(play_id, &final_state);
        Ok(final_state)
    }

    /// Same as `play` but stops at `Completed` without the terminal snapshot,
    /// so the caller can store the result before announcing it.
    pub async fn run(
        &self,
        play_id: u32,
        events: &[GameEvent],
        initial: &GameState,
        observer: &PlaybackObserver,
        cancel: &CancellationToken,
    ) -> Result<GameState, Cancelled> {
        let ctx = PlayContext {
            rosters: self.rosters.as_ref(),
            offense: initial.possession(),
            pacing: &self.pacing,
        };
        info!(
            play_id,
            events = events.len(),
            offense = %ctx.offense,
            "Starting playback"
        );

        let mut state = initial.settled();
        let mut skipped = 0usize;
        let mut paced = self.pacing.trailing();
        for (index, event) in events.iter().enumerate() {
            let phase = PlaybackPhase::PlayingEvent(index);
            observer.set_phase(phase);

            let step = transition::step(&state, event, &ctx);
            debug!(play_id, index, outcome = ?step.outcome, "{}", event);
            if step.outcome == StepOutcome::Unresolved {
                skipped += 1;
            }
            paced += step.duration();

            pause(step.lead, cancel).await?;
            state = step.next;
            observer.publish(Snapshot {
                play_id,
                phase,
                state: state.clone(),
            });
            pause(step.hold, cancel).await?;
        }

        pause(self.pacing.trailing(), cancel).await?;
        observer.set_phase(PlaybackPhase::Completed);
        let final_state = state.settled();

        if skipped > 0 {
            warn!(play_id, skipped, "Playback skipped events with unknown players");
        }
        info!(
            play_id,
            possession = %final_state.possession(),
            holder = ?final_state.ball_holder(),
            ?paced,
            "Playback complete"
        );
        Ok(final_state)
    }
}

async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), Cancelled> {
    if duration.is_zero() {
        return if cancel.is_cancelled() { Err(Cancelled) } else { Ok(()) };
    }
    tokio::select! {
        biased;

        _ = cancel.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
