//! Property tests over random operation sequences.

mod common;

use std::time::Duration;

use common::{CITIZENS, Harness, Pads};
use lurker_session::{PhaseDurations, SessionConfig, SessionState};
use lurker_sim::EntityId;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Advance(u64),
    TogglePause,
    KillPlayer(usize),
    KillCitizen(usize),
    Transform,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1u64..3_000).prop_map(Op::Advance),
        2 => Just(Op::TogglePause),
        1 => any::<usize>().prop_map(Op::KillPlayer),
        1 => any::<usize>().prop_map(Op::KillCitizen),
        1 => Just(Op::Transform),
    ]
}

fn allowed(from: SessionState, to: SessionState) -> bool {
    use SessionState::*;
    matches!(
        (from, to),
        (FirstPhase, Paused | SecondPhase | Ended)
            | (SecondPhase, Paused | SecondPhase | Ended)
            | (Paused, FirstPhase | SecondPhase | Ended)
    )
}

fn player_ids(harness: &Harness) -> Vec<EntityId> {
    let players = harness.session.players();
    players
        .roster()
        .iter()
        .chain(players.monster())
        .map(|e| e.id())
        .collect()
}

fn run(seed: u64, pads: u32, ops: &[Op]) -> Harness {
    let config = SessionConfig {
        seed,
        phases: PhaseDurations {
            first_phase_length: 5.0,
            second_phase_length: 12.0,
            ended_phase_length: 20.0,
        },
        ..Default::default()
    };
    let mut harness = Harness::started(config, Pads::new(pads));
    let monster_source = harness.session.monster_binding().map(|b| b.source());
    let mut now = Duration::ZERO;

    for op in ops {
        match *op {
            Op::Advance(ms) => {
                now += Duration::from_millis(ms);
                harness.session.tick(now);
            }
            Op::TogglePause => harness.session.request_pause_toggle(now),
            Op::KillPlayer(pick) => {
                let ids = player_ids(&harness);
                if !ids.is_empty() {
                    harness.session.kill_player(ids[pick % ids.len()]);
                }
            }
            Op::KillCitizen(pick) => {
                harness.session.kill_citizen((pick % CITIZENS) as u64 + 1);
            }
            Op::Transform => harness.session.transform_player_into_monster(),
        }

        // The monster binding is chosen once and never moves
        let monsters = harness
            .session
            .bindings()
            .iter()
            .filter(|b| b.is_monster())
            .count();
        assert!(monsters <= 1);
        assert_eq!(
            harness.session.monster_binding().map(|b| b.source()),
            monster_source
        );
    }
    harness
}

proptest! {
    #[test]
    fn test_published_transitions_follow_the_state_graph(
        seed in any::<u64>(),
        pads in 0u32..6,
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let harness = run(seed, pads, &ops);
        let changes = harness.changes.borrow();

        prop_assert_eq!(changes.first().map(|c| c.state), Some(SessionState::FirstPhase));
        for pair in changes.windows(2) {
            prop_assert!(
                allowed(pair[0].state, pair[1].state),
                "illegal transition {} -> {}",
                pair[0].state,
                pair[1].state
            );
            prop_assert!(pair[0].elapsed <= pair[1].elapsed);
        }
    }

    #[test]
    fn test_paused_iff_state_to_restore(
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let harness = run(seed, 4, &ops);
        let paused = harness.session.state() == Some(SessionState::Paused);

        prop_assert_eq!(paused, harness.session.last_state().is_some());
        let expected_scale = if paused { 0.0 } else { 1.0 };
        prop_assert_eq!(harness.session.time_scale(), expected_scale);
    }

    #[test]
    fn test_at_most_one_transformation(
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let harness = run(seed, 4, &ops);
        let players = harness.session.players();

        // Four avatars were bound; at most one left the roster to become the monster
        let expected = if players.monster().is_some() { 3 } else { 4 };
        prop_assert_eq!(players.roster().len(), expected);
    }
}
