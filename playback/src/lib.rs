pub mod client;
pub mod config;
pub mod engine;
pub mod session;

pub use client::{
    HttpSimulationClient, PlayRequest, ScriptedSimulationClient, SimulationClient, SimulationError,
};
pub use config::PlaybackConfig;
pub use engine::{Cancelled, EventPlaybackEngine, PlaybackObserver};
pub use session::{PlayError, PlaySession, RejectReason, SessionError};
