use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

use crate::PlayerId;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShotOutcome {
    Make,
    Miss,
}

/// A player named by an event. The id, when the simulation service sends one,
/// is authoritative; the name is the fallback join key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    pub name: String,
    pub id: Option<PlayerId>,
}

impl PlayerRef {
    pub fn named(name: impl Into<String>) -> Self {
        PlayerRef { name: name.into(), id: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Pass { to: PlayerRef },
    Turnover { subtype: String },
    ShotAttempt { outcome: ShotOutcome, distance: f64 },
    Rebound,
    Other { label: String, details: Value },
}

impl EventKind {
    pub fn label(&self) -> &str {
        match self {
            EventKind::Pass { .. } => "PASS",
            EventKind::Turnover { .. } => "TURNOVER",
            EventKind::ShotAttempt { .. } => "SHOT_ATTEMPT",
            EventKind::Rebound => "REBOUND",
            EventKind::Other { label, .. } => label,
        }
    }
}

/// One entry of the play-by-play produced by the simulation service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub struct GameEvent {
    /// Shot clock remaining, "MM:SS".
    pub clock: Option<String>,
    pub player: PlayerRef,
    pub kind: EventKind,
}

impl GameEvent {
    fn new(player: &str, kind: EventKind) -> Self {
        GameEvent {
            clock: None,
            player: PlayerRef::named(player),
            kind,
        }
    }

    pub fn pass(from: &str, to: &str) -> Self {
        Self::new(from, EventKind::Pass { to: PlayerRef::named(to) })
    }

    pub fn turnover(player: &str, subtype: &str) -> Self {
        Self::new(player, EventKind::Turnover { subtype: subtype.to_string() })
    }

    pub fn shot(player: &str, outcome: ShotOutcome, distance: f64) -> Self {
        Self::new(player, EventKind::ShotAttempt { outcome, distance })
    }

    pub fn rebound(player: &str) -> Self {
        Self::new(player, EventKind::Rebound)
    }

    pub fn other(label: &str, player: &str) -> Self {
        Self::new(
            player,
            EventKind::Other { label: label.to_string(), details: json!({}) },
        )
    }

    pub fn with_player_id(mut self, id: PlayerId) -> Self {
        self.player.id = Some(id);
        self
    }

    pub fn with_clock(mut self, clock: &str) -> Self {
        self.clock = Some(clock.to_string());
        self
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EventKind::Pass { to } => write!(f, "PASS {} -> {}", self.player.name, to.name),
            EventKind::Turnover { subtype } => {
                write!(f, "TURNOVER {} ({})", self.player.name, subtype)
            }
            EventKind::ShotAttempt { outcome, distance } => {
                write!(f, "SHOT_ATTEMPT {} {:?} from {}", self.player.name, outcome, distance)
            }
            EventKind::Rebound => write!(f, "REBOUND {}", self.player.name),
            EventKind::Other { label, .. } => write!(f, "{} {}", label, self.player.name),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("event payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{kind} event has malformed details: {source}")]
    Details {
        kind: String,
        source: serde_json::Error,
    },
    #[error("event payload has no events list")]
    MissingEvents,
}

// Wire shape: {"time", "type", "player", "details"} plus optional stable ids.
#[derive(Debug, Serialize, Deserialize, Clone)]
struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    player: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player_id: Option<PlayerId>,
    #[serde(default)]
    details: Value,
}

#[derive(Deserialize)]
struct PassDetails {
    to: String,
    #[serde(default)]
    to_id: Option<PlayerId>,
}

#[derive(Deserialize)]
struct TurnoverDetails {
    subtype: String,
}

#[derive(Deserialize)]
struct ShotDetails {
    distance: f64,
    outcome: ShotOutcome,
}

fn details<T: for<'de> Deserialize<'de>>(kind: &str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::Details {
        kind: kind.to_string(),
        source,
    })
}

impl TryFrom<RawEvent> for GameEvent {
    type Error = DecodeError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let label = raw.kind.trim().to_ascii_uppercase();
        let kind = match label.as_str() {
            "PASS" => {
                let d: PassDetails = details(&label, raw.details)?;
                EventKind::Pass { to: PlayerRef { name: d.to, id: d.to_id } }
            }
            "TURNOVER" => {
                let d: TurnoverDetails = details(&label, raw.details)?;
                EventKind::Turnover { subtype: d.subtype }
            }
            "SHOT_ATTEMPT" => {
                let d: ShotDetails = details(&label, raw.details)?;
                EventKind::ShotAttempt { outcome: d.outcome, distance: d.distance }
            }
            "REBOUND" => EventKind::Rebound,
            _ => EventKind::Other { label, details: raw.details },
        };

        Ok(GameEvent {
            clock: raw.time,
            player: PlayerRef { name: raw.player, id: raw.player_id },
            kind,
        })
    }
}

impl From<GameEvent> for RawEvent {
    fn from(event: GameEvent) -> Self {
        let (kind, details) = match event.kind {
            EventKind::Pass { to } => match to.id {
                Some(id) => ("PASS".to_string(), json!({ "to": to.name, "to_id": id })),
                None => ("PASS".to_string(), json!({ "to": to.name })),
            },
            EventKind::Turnover { subtype } => {
                ("TURNOVER".to_string(), json!({ "subtype": subtype }))
            }
            EventKind::ShotAttempt { outcome, distance } => (
                "SHOT_ATTEMPT".to_string(),
                json!({ "distance": distance, "outcome": outcome }),
            ),
            EventKind::Rebound => ("REBOUND".to_string(), json!({})),
            EventKind::Other { label, details } => (label, details),
        };

        RawEvent {
            time: event.clock,
            kind,
            player: event.player.name,
            player_id: event.player.id,
            details,
        }
    }
}

/// Decodes a full play-by-play. Accepts `{"events": [...]}` or a bare array,
/// optionally wrapped in a markdown code fence. All-or-nothing.
pub fn parse_event_list(text: &str) -> Result<Vec<GameEvent>, DecodeError> {
    let payload: Value = serde_json::from_str(strip_code_fence(text))?;
    let events = match payload {
        Value::Object(mut map) => map.remove("events").ok_or(DecodeError::MissingEvents)?,
        list @ Value::Array(_) => list,
        _ => return Err(DecodeError::MissingEvents),
    };
    Ok(serde_json::from_value(events)?)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
