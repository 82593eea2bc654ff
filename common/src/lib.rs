mod constants;
mod game_event;
mod game_state;
mod snapshot;
mod team;

pub mod transition;

pub use constants::*;
pub use game_event::*;
pub use game_state::*;
pub use snapshot::*;
pub use team::*;
pub use transition::{PlayContext, Step, StepOutcome, replay_events, shot_value};
