use serde::{Deserialize, Serialize};

use crate::{PlayerId, Rosters, ShotOutcome, TeamSide};

/// What the court overlay shows for the event currently on display.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum EventDisplay {
    Pass { from: String, to: String },
    Turnover { player: String, subtype: String },
    Shot { player: String, outcome: ShotOutcome, distance: f64 },
    Rebound { player: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScoreDisplay {
    pub value: u8,
    pub team: TeamSide,
    pub player: PlayerId,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scoreboard {
    pub home: u32,
    pub away: u32,
}

impl Scoreboard {
    pub fn points(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    fn add(&mut self, side: TeamSide, points: u8) {
        match side {
            TeamSide::Home => self.home += points as u32,
            TeamSide::Away => self.away += points as u32,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("player {0} is not on either roster")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is not in the active lineup")]
    NotActive(PlayerId),
    #[error("player {player} is not on the {possession} team, which has possession")]
    NotInPossession { player: PlayerId, possession: TeamSide },
}

/// Match state shown on the court.
///
/// The score and event overlays are `Option`s: a value is present exactly while
/// it is visible, so nothing stale can be read once the overlay clears.
/// Invariant: the ball holder, when set, is an active player of the team in
/// possession.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameState {
    possession: TeamSide,
    ball_holder: Option<PlayerId>,
    current_event: Option<EventDisplay>,
    score: Option<ScoreDisplay>,
    shot_missed: bool,
    scoreboard: Scoreboard,
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

impl GameState {
    /// The one place a fresh state is built. Home starts with the ball, nobody holds it.
    pub fn initial() -> Self {
        GameState {
            possession: TeamSide::Home,
            ball_holder: None,
            current_event: None,
            score: None,
            shot_missed: false,
            scoreboard: Scoreboard::default(),
        }
    }

    pub fn possession(&self) -> TeamSide {
        self.possession
    }

    pub fn ball_holder(&self) -> Option<&PlayerId> {
        self.ball_holder.as_ref()
    }

    pub fn current_event(&self) -> Option<&EventDisplay> {
        self.current_event.as_ref()
    }

    pub fn score(&self) -> Option<&ScoreDisplay> {
        self.score.as_ref()
    }

    pub fn event_visible(&self) -> bool {
        self.current_event.is_some()
    }

    pub fn score_visible(&self) -> bool {
        self.score.is_some()
    }

    pub fn shot_missed(&self) -> bool {
        self.shot_missed
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    /// Nothing transient on display.
    pub fn is_settled(&self) -> bool {
        !self.event_visible() && !self.score_visible() && !self.shot_missed
    }

    /// Same possession, holder and scoreboard with every overlay cleared.
    pub fn settled(&self) -> Self {
        GameState {
            current_event: None,
            score: None,
            shot_missed: false,
            ..self.clone()
        }
    }

    pub fn set_ball_holder(&mut self, id: PlayerId, rosters: &Rosters) -> Result<(), StateError> {
        let side = rosters
            .side_of(&id)
            .ok_or_else(|| StateError::UnknownPlayer(id.clone()))?;
        if !rosters.team(side).is_active(&id) {
            return Err(StateError::NotActive(id));
        }
        if side != self.possession {
            return Err(StateError::NotInPossession {
                player: id,
                possession: self.possession,
            });
        }
        self.ball_holder = Some(id);
        Ok(())
    }

    /// Switches possession. A holder from the other team loses the ball.
    pub fn set_possession(&mut self, side: TeamSide, rosters: &Rosters) {
        self.possession = side;
        if let Some(holder) = &self.ball_holder {
            if rosters.side_of(holder) != Some(side) {
                self.ball_holder = None;
            }
        }
    }

    pub(crate) fn show_event(&mut self, display: EventDisplay) {
        self.current_event = Some(display);
    }

    /// Possession and holder change together.
    pub(crate) fn give_ball(&mut self, side: TeamSide, holder: PlayerId) {
        self.possession = side;
        self.ball_holder = Some(holder);
    }

    pub(crate) fn flip_possession(&mut self) {
        self.possession = self.possession.opponent();
        self.ball_holder = None;
    }

    pub(crate) fn record_score(&mut self, score: ScoreDisplay) {
        self.scoreboard.add(score.team, score.value);
        self.score = Some(score);
    }

    pub(crate) fn mark_missed(&mut self) {
        self.shot_missed = true;
    }
}
