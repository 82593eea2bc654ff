use common::{EventDisplay, GameState, Rosters, ShotOutcome, Snapshot, TeamSide};
use std::fmt::Write;

/// Turns snapshots into one-line court summaries.
pub struct SnapshotRenderer<'a> {
    rosters: &'a Rosters,
}

impl<'a> SnapshotRenderer<'a> {
    pub fn new(rosters: &'a Rosters) -> Self {
        Self { rosters }
    }

    pub fn team_name(&self, side: TeamSide) -> &str {
        &self.rosters.team(side).name
    }

    /// `[event 1] GSW ball, GREEN | PASS CURRY -> GREEN | GSW 0 - 0 Rockets`
    pub fn render(&self, snapshot: &Snapshot) -> String {
        let state = &snapshot.state;
        let mut line = format!("[{}] {}", snapshot.phase, self.court(state));

        if let Some(event) = state.current_event() {
            let _ = write!(line, " | {}", describe(event));
        }
        if let Some(score) = state.score() {
            let scorer = self
                .rosters
                .player(&score.player)
                .map(|p| p.name.as_str())
                .unwrap_or(score.player.as_str());
            let _ = write!(line, " | +{} {} ({})", score.value, self.team_name(score.team), scorer);
        }
        let _ = write!(line, " | {}", self.scoreboard(state));
        line
    }

    pub fn court(&self, state: &GameState) -> String {
        let team = self.team_name(state.possession());
        match state.ball_holder().and_then(|id| self.rosters.player(id)) {
            Some(holder) => format!("{} ball, {}", team, holder.name),
            None => format!("{} ball, loose", team),
        }
    }

    pub fn scoreboard(&self, state: &GameState) -> String {
        let board = state.scoreboard();
        format!(
            "{} {} - {} {}",
            self.team_name(TeamSide::Home),
            board.home,
            board.away,
            self.team_name(TeamSide::Away)
        )
    }
}

fn describe(event: &EventDisplay) -> String {
    match event {
        EventDisplay::Pass { from, to } => format!("PASS {} -> {}", from, to),
        EventDisplay::Turnover { player, subtype } => format!("TURNOVER {} ({})", player, subtype),
        EventDisplay::Shot { player, outcome, distance } => {
            let result = match outcome {
                ShotOutcome::Make => "MAKE",
                ShotOutcome::Miss => "MISS",
            };
            format!("SHOT {} {} from {}ft", player, result, distance)
        }
        EventDisplay::Rebound { player } => format!("REBOUND {}", player),
    }
}
