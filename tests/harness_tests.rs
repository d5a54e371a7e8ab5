use battle_matrix::battle::{simulate_battle, simulate_random_battle};
use battle_matrix::model::RosterFile;
use battle_matrix::series::{battle_seed, run_series};
use battle_matrix::{load_config, load_content, load_roster};
use battle_core::prelude::*;
use std::path::PathBuf;

fn sample_roster_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("rosters/sample.json")
}

fn sample_state() -> BattleState {
    let dex = load_content(None).unwrap();
    let roster = load_roster(&sample_roster_path()).unwrap();
    roster.build_state(&dex, BattleConfig::default()).unwrap()
}

/// Always uses its first move and sends in the first replacement offered.
struct FirstMove;

impl DecisionSource for FirstMove {
    fn decide(&mut self, _state: &BattleState, legal: &[Action]) -> Option<Action> {
        legal
            .iter()
            .find(|action| matches!(action.kind, ActionKind::Fight { .. }))
            .copied()
    }

    fn choose_replacement(&mut self, _state: &BattleState, options: &[usize]) -> Option<usize> {
        options.first().copied()
    }
}

#[test]
fn sample_roster_builds_with_builtin_content() {
    let state = sample_state();
    assert_eq!(state.side(SideId::A).bench.len(), 4);
    assert_eq!(state.side(SideId::B).name, "Blue");
    assert_eq!(state.side(SideId::A).inventory[0].count, 2);
    assert_eq!(state.side(SideId::B).inventory[0].count, 1);
}

#[test]
fn unknown_move_in_roster_is_reported() {
    let raw = r#"{
        "side_a": {"members": [{"species": "pikachu", "moves": ["thunderpunch"]}]},
        "side_b": {"members": [{"species": "snorlax", "moves": ["tackle"]}]}
    }"#;
    let roster: RosterFile = serde_json::from_str(raw).unwrap();
    let dex = load_content(None).unwrap();
    let err = roster.build_state(&dex, BattleConfig::default()).unwrap_err();
    assert!(format!("{err:#}").contains("thunderpunch"));
}

#[test]
fn missing_config_falls_back_to_defaults() {
    assert_eq!(load_config(None).unwrap(), BattleConfig::default());
    assert!(load_roster(&PathBuf::from("does/not/exist.json")).is_err());
}

#[test]
fn random_battle_finishes_and_replays() {
    let seed = battle_seed(7, 0);
    let first = simulate_random_battle(sample_state(), seed).unwrap();
    let second = simulate_random_battle(sample_state(), seed).unwrap();
    assert_eq!(first.log, second.log);
    assert_eq!(first.result, second.result);
    assert!(first.turns <= BattleConfig::default().max_turns);
}

#[test]
fn scripted_policies_play_to_a_result() {
    let mut policy_a = FirstMove;
    let mut policy_b = FirstMove;
    let report = simulate_battle(sample_state(), 3, &mut policy_a, &mut policy_b).unwrap();
    assert!(report.result.is_some());
    assert!(report
        .log
        .iter()
        .any(|event| matches!(event, BattleEvent::BattleEnded { .. })));
}

#[test]
fn turn_cap_leaves_the_battle_unfinished() {
    let mut state = sample_state();
    state.config.max_turns = 1;
    let report = simulate_random_battle(state, 11).unwrap();
    assert!(report.turns <= 1);
}

#[test]
fn series_is_deterministic_and_accounts_for_every_battle() {
    let state = sample_state();
    let first = run_series(&state, 12, 99).unwrap();
    let second = run_series(&state, 12, 99).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.a_wins + first.b_wins + first.draws + first.unfinished,
        12
    );
    let rate = first.win_rate_a();
    assert!((0.0..=1.0).contains(&rate));
}
