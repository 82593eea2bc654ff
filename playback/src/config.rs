use anyhow::{Context, Result, bail};
use common::Pacing;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SIM_URL: &str = "http://localhost:8000";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SNAPSHOT_BUFFER: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// Base URL of the play simulation service
    pub sim_url: Url,
    /// Multiplier applied to every pacing delay
    pub playback_speed: f64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
    /// Snapshots a slow observer may fall behind before it starts lagging
    pub snapshot_buffer: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sim_url: Url::parse(DEFAULT_SIM_URL).expect("default URL is valid"),
            playback_speed: 1.0,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            snapshot_buffer: DEFAULT_SNAPSHOT_BUFFER,
        }
    }
}

impl PlaybackConfig {
    /// Reads `COURTSIDE_*` variables, loading a `.env` file first if there is one.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let sim_url = match lookup("COURTSIDE_SIM_URL") {
            Some(raw) => Url::parse(&raw)
                .map(with_trailing_slash)
                .with_context(|| format!("COURTSIDE_SIM_URL is not a valid URL: {}", raw))?,
            None => defaults.sim_url,
        };
        let playback_speed = parse_or(&lookup, "COURTSIDE_PLAYBACK_SPEED", defaults.playback_speed)?;
        if playback_speed <= 0.0 || !playback_speed.is_finite() {
            bail!("COURTSIDE_PLAYBACK_SPEED must be a positive number, got {}", playback_speed);
        }
        let timeout_secs = parse_or(
            &lookup,
            "COURTSIDE_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let snapshot_buffer = parse_or(&lookup, "COURTSIDE_SNAPSHOT_BUFFER", defaults.snapshot_buffer)?;
        if snapshot_buffer == 0 {
            bail!("COURTSIDE_SNAPSHOT_BUFFER must be at least 1");
        }

        Ok(Self {
            sim_url,
            playback_speed,
            max_tokens: parse_or(&lookup, "COURTSIDE_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_or(&lookup, "COURTSIDE_TEMPERATURE", defaults.temperature)?,
            request_timeout: Duration::from_secs(timeout_secs),
            snapshot_buffer,
        })
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::default().scaled(self.playback_speed)
    }
}

/// Endpoints are joined onto the base, which drops a last path segment unless
/// it ends in `/`.
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
