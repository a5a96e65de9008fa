//! Configuration validation and store round-trips.

use realeffort_core::config::SessionConfig;
use realeffort_core::error::GameError;
use realeffort_core::event::GameEvent;
use realeffort_core::player::PlayerRecord;
use realeffort_core::puzzle_session::PuzzleRecord;
use realeffort_core::settlement::GroupRecord;
use realeffort_core::store::GameStore;
use realeffort_core::voting::Treatment;

fn store() -> GameStore {
    let s = GameStore::in_memory().unwrap();
    s.migrate().unwrap();
    s.insert_session("s", 1, "transcription", "test", "t0")
        .unwrap();
    s
}

/// "No cap" is None; a zero cap is a config error, not a synonym.
#[test]
fn zero_iteration_cap_rejected() {
    let err = SessionConfig::new(1.0, 1.0, 1, Some(0)).unwrap_err();
    assert!(matches!(err, GameError::InvalidConfig(_)));

    assert!(SessionConfig::new(1.0, 1.0, 1, None).is_ok());
    assert!(SessionConfig::new(1.0, 1.0, 1, Some(1)).is_ok());
}

/// Zero attempts and negative or non-finite delays are rejected.
#[test]
fn degenerate_params_rejected() {
    assert!(SessionConfig::new(1.0, 1.0, 0, None).is_err());
    assert!(SessionConfig::new(-1.0, 1.0, 1, None).is_err());
    assert!(SessionConfig::new(1.0, f64::NAN, 1, None).is_err());
    // Zero delays are legitimate (no rate limiting).
    assert!(SessionConfig::new(0.0, 0.0, 1, None).is_ok());
}

/// Derived constants: the vote round sits in the middle, and the
/// penalty rate cancels the tax rate.
#[test]
fn derived_constants() {
    let config = SessionConfig::default_session();
    assert_eq!(config.num_rounds(), 2 * config.vote_round - 1);
    assert!((config.penalty_multiplier * config.tax_rate - 1.0).abs() < 1e-12);
    assert_eq!(config.players_per_group, 3);
}

/// Player rows round-trip, including nullable financial fields.
#[test]
fn player_row_roundtrip() {
    let store = store();
    let mut player = PlayerRecord::new("s", "p1", "g1", 1);
    store.insert_player(&player).unwrap();

    let loaded = store.player("s", "p1", 1).unwrap();
    assert_eq!(loaded.iteration, 0);
    assert!(loaded.reported_income.is_none());
    assert!(loaded.if_vote.is_none());

    player.iteration = 3;
    player.num_trials = 3;
    player.num_correct = 2;
    player.num_failed = 1;
    store.update_progress(&player).unwrap();
    store.set_reported_income("s", "p1", 1, 150.0).unwrap();
    store.apply_settlement("s", "p1", 1, 60.0, true, 190.0).unwrap();

    let loaded = store.player("s", "p1", 1).unwrap();
    assert_eq!(loaded.num_correct, 2);
    assert_eq!(loaded.reported_income, Some(150.0));
    assert_eq!(loaded.if_audited, Some(true));
    assert_eq!(loaded.payoff, Some(190.0));
}

/// A missing player is an explicit error, not a silent default.
#[test]
fn missing_player_is_an_error() {
    let store = store();
    let err = store.player("s", "ghost", 1).unwrap_err();
    assert!(matches!(err, GameError::PlayerNotFound(_, 1)));
}

/// Puzzle rows round-trip and answers persist.
#[test]
fn puzzle_row_roundtrip() {
    let store = store();
    let mut puzzle = PuzzleRecord {
        session_id: "s".to_string(),
        player_id: "p1".to_string(),
        round: 1,
        iteration: 1,
        attempts: 0,
        timestamp: 100.0,
        text: "ABC".to_string(),
        solution: "ABC".to_string(),
        response: None,
        response_timestamp: None,
        is_correct: None,
    };
    store.insert_puzzle(&puzzle).unwrap();

    let loaded = store.puzzle("s", "p1", 1, 1).unwrap().unwrap();
    assert!(loaded.response.is_none());
    assert!(loaded.is_correct.is_none());

    puzzle.attempts = 1;
    puzzle.response = Some("abc".to_string());
    puzzle.response_timestamp = Some(110.0);
    puzzle.is_correct = Some(true);
    store.update_answer(&puzzle).unwrap();

    let loaded = store.puzzle("s", "p1", 1, 1).unwrap().unwrap();
    assert_eq!(loaded.response.as_deref(), Some("abc"));
    assert_eq!(loaded.is_correct, Some(true));
    assert_eq!(store.puzzle_count("s", "p1", 1).unwrap(), 1);
}

/// The schema forbids two puzzle rows for the same iteration — there is
/// never more than one "current" puzzle.
#[test]
fn duplicate_iteration_rejected_by_schema() {
    let store = store();
    let puzzle = PuzzleRecord {
        session_id: "s".to_string(),
        player_id: "p1".to_string(),
        round: 1,
        iteration: 1,
        attempts: 0,
        timestamp: 100.0,
        text: "ABC".to_string(),
        solution: "ABC".to_string(),
        response: None,
        response_timestamp: None,
        is_correct: None,
    };
    store.insert_puzzle(&puzzle).unwrap();
    assert!(store.insert_puzzle(&puzzle).is_err());
}

/// Group rows round-trip treatment labels through their string
/// encoding.
#[test]
fn group_row_roundtrip() {
    let store = store();
    store.insert_group(&GroupRecord::new("s", "g1", 2)).unwrap();

    assert!(store.treatment("s", "g1", 2).unwrap().is_none());

    store
        .set_treatment("s", "g1", 2, Treatment::ExoNo, 2, true)
        .unwrap();
    store.set_audit_weight("s", "g1", 2, 0.5).unwrap();
    store.set_settlement("s", "g1", 2, 240.0, 40.0).unwrap();

    let group = store.group("s", "g1", 2).unwrap();
    assert_eq!(group.treatment, Some(Treatment::ExoNo));
    assert_eq!(group.total_if_vote, Some(2));
    assert_eq!(group.if_override, Some(true));
    assert_eq!(group.audit_weight, Some(0.5));
    assert_eq!(group.total_tax_paid, Some(240.0));
}

/// Events append in order and count by type.
#[test]
fn event_log_appends_in_order() {
    let store = store();
    for iteration in 1..=3 {
        store
            .append_game_event(
                "s",
                1,
                "p1",
                &GameEvent::PuzzleIssued {
                    player_id: "p1".to_string(),
                    round: 1,
                    iteration,
                },
            )
            .unwrap();
    }

    let events = store.events_for_round("s", 1).unwrap();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.event_type == "puzzle_issued"));
    assert_eq!(store.count_events("s", "puzzle_issued").unwrap(), 3);
    assert_eq!(store.count_events("s", "group_settled").unwrap(), 0);
}
