use serde::{Deserialize, Serialize};
use std::fmt;

use crate::GameState;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    AwaitingEvents,
    PlayingEvent(usize),
    Completed,
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackPhase::Idle => write!(f, "idle"),
            PlaybackPhase::AwaitingEvents => write!(f, "awaiting events"),
            PlaybackPhase::PlayingEvent(index) => write!(f, "event {}", index + 1),
            PlaybackPhase::Completed => write!(f, "completed"),
        }
    }
}

/// State published to observers after each event, plus one terminal idle snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub play_id: u32,
    pub phase: PlaybackPhase,
    pub state: GameState,
}

impl Snapshot {
    pub fn is_terminal(&self) -> bool {
        self.phase == PlaybackPhase::Idle
    }
}
