use log::warn;
use std::time::Duration;

use crate::{
    EventDisplay, EventKind, GameEvent, GameState, Pacing, Player, PlayerRef, Rosters,
    ScoreDisplay, ShotOutcome, TeamSide, THREE_POINT_DISTANCE,
};

/// Everything a transition needs besides the state itself.
#[derive(Debug, Clone, Copy)]
pub struct PlayContext<'a> {
    pub rosters: &'a Rosters,
    /// Team that had the ball when the play started.
    pub offense: TeamSide,
    pub pacing: &'a Pacing,
}

impl<'a> PlayContext<'a> {
    fn resolve(&self, player: &PlayerRef, preferred: TeamSide) -> Option<(TeamSide, &'a Player)> {
        self.rosters.resolve(player.id.as_ref(), &player.name, preferred)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    /// Event kind that carries no state change.
    PassThrough,
    /// A referenced player could not be found; the event was skipped.
    Unresolved,
}

/// Result of applying one event: wait `lead`, publish `next`, then hold it for `hold`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub lead: Duration,
    pub next: GameState,
    pub hold: Duration,
    pub outcome: StepOutcome,
}

impl Step {
    pub fn duration(&self) -> Duration {
        self.lead + self.hold
    }
}

pub fn shot_value(distance: f64) -> u8 {
    if distance >= THREE_POINT_DISTANCE { 3 } else { 2 }
}

pub fn is_out_of_bounds(subtype: &str) -> bool {
    subtype.to_lowercase().contains("out of bounds")
}

/// Computes the state after `event`. The previous event's overlays are cleared
/// first since its display window ended with its hold.
pub fn step(state: &GameState, event: &GameEvent, ctx: &PlayContext) -> Step {
    let mut next = state.settled();
    let possession = next.possession();
    let pacing = ctx.pacing;

    let skip = |next: GameState, outcome: StepOutcome| Step {
        lead: Duration::ZERO,
        next,
        hold: pacing.pass_through(),
        outcome,
    };

    match &event.kind {
        EventKind::Other { .. } => skip(next, StepOutcome::PassThrough),

        EventKind::Pass { to } => {
            let Some((_, from)) = ctx.resolve(&event.player, possession) else {
                warn!("Skipping {}: passer not in either lineup", event);
                return skip(next, StepOutcome::Unresolved);
            };
            let Some((side, target)) = ctx.resolve(to, possession) else {
                warn!("Skipping {}: receiver not in either lineup", event);
                return skip(next, StepOutcome::Unresolved);
            };
            if side != possession {
                warn!("Skipping {}: receiver is not on the team with the ball", event);
                return skip(next, StepOutcome::Unresolved);
            }

            next.show_event(EventDisplay::Pass {
                from: from.name.clone(),
                to: target.name.clone(),
            });
            next.give_ball(side, target.id.clone());
            Step {
                lead: Duration::ZERO,
                next,
                hold: pacing.pass_display(),
                outcome: StepOutcome::Applied,
            }
        }

        EventKind::Turnover { subtype } => {
            let Some((_, player)) = ctx.resolve(&event.player, possession) else {
                warn!("Skipping {}: player not in either lineup", event);
                return skip(next, StepOutcome::Unresolved);
            };

            next.show_event(EventDisplay::Turnover {
                player: player.name.clone(),
                subtype: subtype.clone(),
            });
            let lead = if is_out_of_bounds(subtype) {
                next.flip_possession();
                pacing.turnover_pre_flip()
            } else {
                Duration::ZERO
            };
            Step {
                lead,
                next,
                hold: pacing.turnover_display(),
                outcome: StepOutcome::Applied,
            }
        }

        EventKind::ShotAttempt { outcome, distance } => {
            let Some((_, shooter)) = ctx.resolve(&event.player, possession) else {
                warn!("Skipping {}: shooter not in either lineup", event);
                return skip(next, StepOutcome::Unresolved);
            };

            next.show_event(EventDisplay::Shot {
                player: shooter.name.clone(),
                outcome: *outcome,
                distance: *distance,
            });
            let hold = match outcome {
                ShotOutcome::Make => {
                    next.record_score(ScoreDisplay {
                        value: shot_value(*distance),
                        team: possession,
                        player: shooter.id.clone(),
                    });
                    pacing.score_display()
                }
                ShotOutcome::Miss => {
                    next.mark_missed();
                    pacing.miss_display()
                }
            };
            Step {
                lead: pacing.shot_pre_result(),
                next,
                hold,
                outcome: StepOutcome::Applied,
            }
        }

        EventKind::Rebound => {
            let Some((side, rebounder)) = ctx.resolve(&event.player, ctx.offense) else {
                warn!("Skipping {}: rebounder not in either lineup", event);
                return skip(next, StepOutcome::Unresolved);
            };

            next.show_event(EventDisplay::Rebound { player: rebounder.name.clone() });
            let lead = if side != possession {
                pacing.rebound_pre_flip()
            } else {
                Duration::ZERO
            };
            next.give_ball(side, rebounder.id.clone());
            Step {
                lead,
                next,
                hold: pacing.rebound_display(),
                outcome: StepOutcome::Applied,
            }
        }
    }
}

/// Folds `events` over `initial` without any timing. Returns one state per
/// event followed by the settled end-of-possession state.
pub fn replay_events(initial: &GameState, events: &[GameEvent], rosters: &Rosters) -> Vec<GameState> {
    let pacing = Pacing::instant();
    let ctx = PlayContext {
        rosters,
        offense: initial.possession(),
        pacing: &pacing,
    };

    let mut states = Vec::with_capacity(events.len() + 1);
    let mut state = initial.settled();
    for event in events {
        state = step(&state, event, &ctx).next;
        states.push(state.clone());
    }
    states.push(state.settled());
    states
}
