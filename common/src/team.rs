use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Number of players a team has on the court.
pub const LINEUP_SIZE: usize = 5;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSide::Home => write!(f, "home"),
            TeamSide::Away => write!(f, "away"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
}

impl Player {
    fn new(id: &str, name: &str, position: Position) -> Self {
        Player {
            id: PlayerId::new(id),
            name: name.to_string(),
            position,
        }
    }

    /// Case-insensitive, whitespace-trimmed display name comparison.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Team {
    pub name: String,
    pub players: Vec<Player>,
    pub active: Vec<PlayerId>,
}

impl Team {
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn is_active(&self, id: &PlayerId) -> bool {
        self.active.contains(id)
    }

    /// Active players in lineup order.
    pub fn lineup(&self) -> impl Iterator<Item = &Player> {
        self.active.iter().filter_map(|id| self.player(id))
    }

    pub fn lineup_names(&self) -> Vec<String> {
        self.lineup().map(|p| p.name.clone()).collect()
    }

    pub fn active_by_name(&self, name: &str) -> Option<&Player> {
        self.lineup().find(|p| p.answers_to(name))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("player id {0} appears more than once")]
    DuplicateId(PlayerId),
    #[error("team {team} lists player name {name} more than once")]
    DuplicateName { team: String, name: String },
    #[error("team {team} has active id {id} that is not on its roster")]
    UnknownActive { team: String, id: PlayerId },
    #[error("team {team} has {count} active players, expected {}", LINEUP_SIZE)]
    LineupSize { team: String, count: usize },
}

/// The two teams taking part in a play. Read-only for the engine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Rosters {
    pub home: Team,
    pub away: Team,
}

impl Rosters {
    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn side_of(&self, id: &PlayerId) -> Option<TeamSide> {
        [TeamSide::Home, TeamSide::Away]
            .into_iter()
            .find(|side| self.team(*side).player(id).is_some())
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.side_of(id).and_then(|side| self.team(side).player(id))
    }

    /// Looks a name up in the active lineups, `preferred` team first.
    pub fn resolve_name(&self, name: &str, preferred: TeamSide) -> Option<(TeamSide, &Player)> {
        [preferred, preferred.opponent()]
            .into_iter()
            .find_map(|side| self.team(side).active_by_name(name).map(|p| (side, p)))
    }

    /// Resolves an active player by stable id when one is given, by name otherwise.
    pub fn resolve(
        &self,
        id: Option<&PlayerId>,
        name: &str,
        preferred: TeamSide,
    ) -> Option<(TeamSide, &Player)> {
        match id {
            Some(id) => {
                let side = self.side_of(id)?;
                let team = self.team(side);
                if !team.is_active(id) {
                    return None;
                }
                team.player(id).map(|p| (side, p))
            }
            None => self.resolve_name(name, preferred),
        }
    }

    pub fn validate(&self) -> Result<(), RosterError> {
        let mut ids = HashSet::new();
        for team in [&self.home, &self.away] {
            let mut names = HashSet::new();
            for player in &team.players {
                if !ids.insert(player.id.clone()) {
                    return Err(RosterError::DuplicateId(player.id.clone()));
                }
                if !names.insert(player.name.trim().to_ascii_uppercase()) {
                    return Err(RosterError::DuplicateName {
                        team: team.name.clone(),
                        name: player.name.clone(),
                    });
                }
            }
            if let Some(id) = team.active.iter().find(|id| team.player(id).is_none()) {
                return Err(RosterError::UnknownActive {
                    team: team.name.clone(),
                    id: id.clone(),
                });
            }
            if team.active.len() != LINEUP_SIZE {
                return Err(RosterError::LineupSize {
                    team: team.name.clone(),
                    count: team.active.len(),
                });
            }
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file: {:?}", path))?;
        let rosters: Rosters =
            serde_json::from_str(&raw).context("Failed to parse roster file")?;
        rosters.validate().context("Invalid roster table")?;
        Ok(rosters)
    }

    /// Golden State (home) against Houston (away), everyone active.
    pub fn warriors_rockets() -> Self {
        let home = Team {
            name: "GSW".to_string(),
            players: vec![
                Player::new("gsw1", "CURRY", Position::PG),
                Player::new("gsw2", "THOMPSON", Position::SG),
                Player::new("gsw3", "GREEN", Position::PF),
                Player::new("gsw4", "WIGGINS", Position::SF),
                Player::new("gsw5", "LOONEY", Position::C),
            ],
            active: ["gsw1", "gsw2", "gsw3", "gsw4", "gsw5"]
                .into_iter()
                .map(PlayerId::new)
                .collect(),
        };
        let away = Team {
            name: "Rockets".to_string(),
            players: vec![
                Player::new("rkt1", "SENGUN", Position::C),
                Player::new("rkt2", "GREEN", Position::SG),
                Player::new("rkt3", "SMITH", Position::PF),
                Player::new("rkt4", "VANVLEET", Position::PG),
                Player::new("rkt5", "BROOKS", Position::SF),
            ],
            active: ["rkt1", "rkt2", "rkt3", "rkt4", "rkt5"]
                .into_iter()
                .map(PlayerId::new)
                .collect(),
        };
        Rosters { home, away }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        assert_eq!(Rosters::warriors_rockets().validate(), Ok(()));
    }

    #[test]
    fn name_lookup_prefers_the_given_team() {
        let rosters = Rosters::warriors_rockets();

        let (side, player) = rosters.resolve_name("GREEN", TeamSide::Home).unwrap();
        assert_eq!(side, TeamSide::Home);
        assert_eq!(player.id.as_str(), "gsw3");

        let (side, player) = rosters.resolve_name("green ", TeamSide::Away).unwrap();
        assert_eq!(side, TeamSide::Away);
        assert_eq!(player.id.as_str(), "rkt2");

        // Falls through to the other team when the preferred one has no match
        let (side, player) = rosters.resolve_name("Sengun", TeamSide::Home).unwrap();
        assert_eq!(side, TeamSide::Away);
        assert_eq!(player.id.as_str(), "rkt1");

        assert!(rosters.resolve_name("JORDAN", TeamSide::Home).is_none());
    }

    #[test]
    fn stable_id_wins_over_name() {
        let rosters = Rosters::warriors_rockets();
        let id = PlayerId::new("rkt2");
        let (side, player) = rosters.resolve(Some(&id), "CURRY", TeamSide::Home).unwrap();
        assert_eq!(side, TeamSide::Away);
        assert_eq!(player.name, "GREEN");

        assert!(rosters.resolve(Some(&PlayerId::new("nope")), "CURRY", TeamSide::Home).is_none());
    }

    #[test]
    fn bench_players_do_not_resolve() {
        let mut rosters = Rosters::warriors_rockets();
        rosters.home.players.push(Player::new("gsw6", "PAYTON", Position::PG));
        assert!(rosters.resolve_name("PAYTON", TeamSide::Home).is_none());
        assert!(rosters.resolve(Some(&PlayerId::new("gsw6")), "", TeamSide::Home).is_none());
        assert_eq!(rosters.side_of(&PlayerId::new("gsw6")), Some(TeamSide::Home));
    }

    #[test]
    fn validation_catches_bad_tables() {
        let mut rosters = Rosters::warriors_rockets();
        rosters.away.players[0].id = PlayerId::new("gsw1");
        assert_eq!(
            rosters.validate(),
            Err(RosterError::DuplicateId(PlayerId::new("gsw1")))
        );

        let mut rosters = Rosters::warriors_rockets();
        rosters.home.players[1].name = "curry".to_string();
        assert!(matches!(rosters.validate(), Err(RosterError::DuplicateName { .. })));

        let mut rosters = Rosters::warriors_rockets();
        rosters.home.active.pop();
        assert_eq!(
            rosters.validate(),
            Err(RosterError::LineupSize { team: "GSW".to_string(), count: 4 })
        );

        let mut rosters = Rosters::warriors_rockets();
        rosters.away.active[4] = PlayerId::new("rkt9");
        assert!(matches!(rosters.validate(), Err(RosterError::UnknownActive { .. })));
    }

    #[test]
    fn roster_json_round_trips_through_serde() {
        let rosters = Rosters::warriors_rockets();
        let json = serde_json::to_string(&rosters).unwrap();
        assert!(json.contains("\"id\":\"gsw1\""));
        let back: Rosters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rosters);
    }
}
