use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Display window of a pass in milliseconds
pub const PASS_DISPLAY_MS: u64 = 800;

/// Display window of a turnover in milliseconds
pub const TURNOVER_DISPLAY_MS: u64 = 1500;

/// Wait before an out-of-bounds turnover hands the ball over
pub const TURNOVER_PRE_FLIP_MS: u64 = 1500;

/// Wait between the shot going up and its result
pub const SHOT_PRE_RESULT_MS: u64 = 800;

/// How long a made basket stays on screen
pub const SCORE_DISPLAY_MS: u64 = 2000;

/// How long a miss stays on screen
pub const MISS_DISPLAY_MS: u64 = 1000;

/// Wait before a defensive rebound changes possession
pub const REBOUND_PRE_FLIP_MS: u64 = 800;

/// Display window of a rebound in milliseconds
pub const REBOUND_DISPLAY_MS: u64 = 1200;

/// Delay for events that change nothing
pub const PASS_THROUGH_MS: u64 = 800;

/// Pause after the last event before returning to idle
pub const TRAILING_MS: u64 = 1000;

/// Shots from this distance or further are worth three.
pub const THREE_POINT_DISTANCE: f64 = 22.0;

/// Pacing delays applied during playback, in milliseconds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Pacing {
    pub pass_display_ms: u64,
    pub turnover_display_ms: u64,
    pub turnover_pre_flip_ms: u64,
    pub shot_pre_result_ms: u64,
    pub score_display_ms: u64,
    pub miss_display_ms: u64,
    pub rebound_pre_flip_ms: u64,
    pub rebound_display_ms: u64,
    pub pass_through_ms: u64,
    pub trailing_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            pass_display_ms: PASS_DISPLAY_MS,
            turnover_display_ms: TURNOVER_DISPLAY_MS,
            turnover_pre_flip_ms: TURNOVER_PRE_FLIP_MS,
            shot_pre_result_ms: SHOT_PRE_RESULT_MS,
            score_display_ms: SCORE_DISPLAY_MS,
            miss_display_ms: MISS_DISPLAY_MS,
            rebound_pre_flip_ms: REBOUND_PRE_FLIP_MS,
            rebound_display_ms: REBOUND_DISPLAY_MS,
            pass_through_ms: PASS_THROUGH_MS,
            trailing_ms: TRAILING_MS,
        }
    }
}

impl Pacing {
    /// Every delay zeroed.
    pub fn instant() -> Self {
        Pacing {
            pass_display_ms: 0,
            turnover_display_ms: 0,
            turnover_pre_flip_ms: 0,
            shot_pre_result_ms: 0,
            score_display_ms: 0,
            miss_display_ms: 0,
            rebound_pre_flip_ms: 0,
            rebound_display_ms: 0,
            pass_through_ms: 0,
            trailing_ms: 0,
        }
    }

    /// Playback at `speed` times normal. Non-positive speeds leave pacing unchanged.
    pub fn scaled(&self, speed: f64) -> Self {
        if speed <= 0.0 || !speed.is_finite() {
            return *self;
        }
        let scale = |ms: u64| (ms as f64 / speed).round() as u64;
        Pacing {
            pass_display_ms: scale(self.pass_display_ms),
            turnover_display_ms: scale(self.turnover_display_ms),
            turnover_pre_flip_ms: scale(self.turnover_pre_flip_ms),
            shot_pre_result_ms: scale(self.shot_pre_result_ms),
            score_display_ms: scale(self.score_display_ms),
            miss_display_ms: scale(self.miss_display_ms),
            rebound_pre_flip_ms: scale(self.rebound_pre_flip_ms),
            rebound_display_ms: scale(self.rebound_display_ms),
            pass_through_ms: scale(self.pass_through_ms),
            trailing_ms: scale(self.trailing_ms),
        }
    }

    pub fn pass_display(&self) -> Duration {
        Duration::from_millis(self.pass_display_ms)
    }

    pub fn turnover_display(&self) -> Duration {
        Duration::from_millis(self.turnover_display_ms)
    }

    pub fn turnover_pre_flip(&self) -> Duration {
        Duration::from_millis(self.turnover_pre_flip_ms)
    }

    pub fn shot_pre_result(&self) -> Duration {
        Duration::from_millis(self.shot_pre_result_ms)
    }

    pub fn score_display(&self) -> Duration {
        Duration::from_millis(self.score_display_ms)
    }

    pub fn miss_display(&self) -> Duration {
        Duration::from_millis(self.miss_display_ms)
    }

    pub fn rebound_pre_flip(&self) -> Duration {
        Duration::from_millis(self.rebound_pre_flip_ms)
    }

    pub fn rebound_display(&self) -> Duration {
        Duration::from_millis(self.rebound_display_ms)
    }

    pub fn pass_through(&self) -> Duration {
        Duration::from_millis(self.pass_through_ms)
    }

    pub fn trailing(&self) -> Duration {
        Duration::from_millis(self.trailing_ms)
    }
}
