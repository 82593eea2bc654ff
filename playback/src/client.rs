use anyhow::Context;
use common::{DecodeError, GameEvent, GameState, Rosters, parse_event_list};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::config::{PlaybackConfig, with_trailing_slash};

/// What the simulation service needs to script one possession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub offense: Vec<String>,
    pub defense: Vec<String>,
    pub ball_handler: String,
}

impl PlayRequest {
    /// Lineups come from the team in possession; `None` without a ball holder.
    pub fn from_state(state: &GameState, rosters: &Rosters) -> Option<Self> {
        let holder = rosters.player(state.ball_holder()?)?;
        let offense = state.possession();
        Some(Self {
            offense: rosters.team(offense).lineup_names(),
            defense: rosters.team(offense.opponent()).lineup_names(),
            ball_handler: holder.name.clone(),
        })
    }

    /// Prompt text in the format the service's system prompt expects.
    pub fn question(&self) -> String {
        format!(
            "Offense: [{}]\nDefense: [{}]\nBall handler: {}",
            self.offense.join(", "),
            self.defense.join(", "),
            self.ball_handler
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("simulation service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("simulation service answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode simulated events: {0}")]
    Decode(#[from] DecodeError),
    #[error("simulation returned no events")]
    Empty,
}

/// Source of scripted possessions.
#[async_trait::async_trait]
pub trait SimulationClient: Send + Sync {
    /// Produce the ordered event list for one possession. Any failure must be
    /// reported before a single event is handed out.
    async fn simulate(&self, request: &PlayRequest) -> Result<Vec<GameEvent>, SimulationError>;
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    question: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    response: String,
    #[serde(default)]
    usage: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// Client for the HTTP play simulation service (`POST /analyze`, `GET /health`).
pub struct HttpSimulationClient {
    http: reqwest::Client,
    analyze_url: Url,
    health_url: Url,
    max_tokens: u32,
    temperature: f32,
}

impl HttpSimulationClient {
    pub fn new(config: &PlaybackConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let base = with_trailing_slash(config.sim_url.clone());
        let analyze_url = base
            .join("analyze")
            .context("Failed to build analyze endpoint URL")?;
        let health_url = base
            .join("health")
            .context("Failed to build health endpoint URL")?;

        Ok(Self {
            http,
            analyze_url,
            health_url,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub async fn health(&self) -> Result<bool, SimulationError> {
        let response = self.http.get(self.health_url.clone()).send().await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let health: HealthResponse = response.json().await?;
        Ok(health.status == "healthy")
    }
}

#[async_trait::async_trait]
impl SimulationClient for HttpSimulationClient {
    async fn simulate(&self, request: &PlayRequest) -> Result<Vec<GameEvent>, SimulationError> {
        let question = request.question();
        debug!(url = %self.analyze_url, "Requesting play simulation:\n{}", question);

        let response = self
            .http
            .post(self.analyze_url.clone())
            .json(&AnalyzeRequest {
                question: &question,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SimulationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: AnalyzeResponse = response.json().await?;
        if let Some(usage) = &reply.usage {
            debug!(%usage, "Simulation token usage");
        }

        let events = parse_event_list(&reply.response)?;
        info!(count = events.len(), "Received simulated events");
        Ok(events)
    }
}

/// Local client that hands out a fixed script and remembers what it was asked.
pub struct ScriptedSimulationClient {
    events: Vec<GameEvent>,
    requests: Mutex<Vec<PlayRequest>>,
}

impl ScriptedSimulationClient {
    pub fn new(events: Vec<GameEvent>) -> Self {
        Self {
            events,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Loads a script in the service's wire format.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event script: {:?}", path))?;
        let events = parse_event_list(&raw)
            .with_context(|| format!("Failed to parse event script: {:?}", path))?;
        Ok(Self::new(events))
    }

    pub async fn requests(&self) -> Vec<PlayRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl SimulationClient for ScriptedSimulationClient {
    async fn simulate(&self, request: &PlayRequest) -> Result<Vec<GameEvent>, SimulationError> {
        self.requests.lock().await.push(request.clone());
        Ok(self.events.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{PlayerId, TeamSide};

    #[test]
    fn request_is_built_from_the_team_with_the_ball() {
        let rosters = Rosters::warriors_rockets();
        let mut state = GameState::initial();
        assert_eq!(PlayRequest::from_state(&state, &rosters), None);

        state.set_possession(TeamSide::Away, &rosters);
        state.set_ball_holder(PlayerId::new("rkt4"), &rosters).unwrap();
        let request = PlayRequest::from_state(&state, &rosters).unwrap();

        assert_eq!(request.ball_handler, "VANVLEET");
        assert_eq!(request.offense, vec!["SENGUN", "GREEN", "SMITH", "VANVLEET", "BROOKS"]);
        assert_eq!(request.defense, vec!["CURRY", "THOMPSON", "GREEN", "WIGGINS", "LOONEY"]);
        assert_eq!(
            request.question(),
            "Offense: [SENGUN, GREEN, SMITH, VANVLEET, BROOKS]\n\
             Defense: [CURRY, THOMPSON, GREEN, WIGGINS, LOONEY]\n\
             Ball handler: VANVLEET"
        );
    }

    #[tokio::test]
    async fn scripted_client_replays_its_script() {
        let script = vec![GameEvent::pass("CURRY", "GREEN")];
        let client = ScriptedSimulationClient::new(script.clone());
        let request = PlayRequest {
            offense: vec!["CURRY".to_string()],
            defense: vec!["SENGUN".to_string()],
            ball_handler: "CURRY".to_string(),
        };

        assert_eq!(client.simulate(&request).await.unwrap(), script);
        assert_eq!(client.requests().await, vec![request]);
    }
}
