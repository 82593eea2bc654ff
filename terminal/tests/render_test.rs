use common::{
    GameEvent, GameState, PlaybackPhase, PlayerId, Rosters, ShotOutcome, Snapshot, replay_events,
};
use terminal::SnapshotRenderer;

fn snapshots_for(events: &[GameEvent]) -> Vec<Snapshot> {
    let rosters = Rosters::warriors_rockets();
    let mut initial = GameState::initial();
    initial.set_ball_holder(PlayerId::new("gsw1"), &rosters).unwrap();

    let states = replay_events(&initial, events, &rosters);
    let last = states.len() - 1;
    states
        .into_iter()
        .enumerate()
        .map(|(i, state)| Snapshot {
            play_id: 1,
            phase: if i == last { PlaybackPhase::Idle } else { PlaybackPhase::PlayingEvent(i) },
            state,
        })
        .collect()
}

#[test]
fn renders_a_scoring_possession() {
    let rosters = Rosters::warriors_rockets();
    let renderer = SnapshotRenderer::new(&rosters);
    let snapshots = snapshots_for(&[
        GameEvent::pass("CURRY", "GREEN"),
        GameEvent::shot("GREEN", ShotOutcome::Make, 25.0),
    ]);

    let lines: Vec<String> = snapshots.iter().map(|s| renderer.render(s)).collect();

    assert_eq!(
        lines,
        vec![
            "[event 1] GSW ball, GREEN | PASS CURRY -> GREEN | GSW 0 - 0 Rockets",
            "[event 2] GSW ball, GREEN | SHOT GREEN MAKE from 25ft | +3 GSW (GREEN) | GSW 3 - 0 Rockets",
            "[idle] GSW ball, GREEN | GSW 3 - 0 Rockets",
        ]
    );
}

#[test]
fn renders_a_loose_ball_after_turnover() {
    let rosters = Rosters::warriors_rockets();
    let renderer = SnapshotRenderer::new(&rosters);
    let snapshots = snapshots_for(&[GameEvent::turnover("CURRY", "Out of Bounds - Bad Pass")]);

    assert_eq!(
        renderer.render(&snapshots[0]),
        "[event 1] Rockets ball, loose | TURNOVER CURRY (Out of Bounds - Bad Pass) | GSW 0 - 0 Rockets"
    );
    assert_eq!(renderer.court(&snapshots[1].state), "Rockets ball, loose");
}
