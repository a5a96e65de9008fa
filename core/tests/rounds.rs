//! Round finalization tests — integrity gate, income conversion, audit
//! weight, and treatment propagation.

use realeffort_core::config::SessionConfig;
use realeffort_core::error::GameError;
use realeffort_core::protocol::ClientMessage;
use realeffort_core::session::GameSession;
use realeffort_core::store::GameStore;

fn groups() -> Vec<(String, Vec<String>)> {
    vec![(
        "g1".to_string(),
        vec!["p1".to_string(), "p2".to_string(), "p3".to_string()],
    )]
}

fn build_session(max_iterations: Option<u32>) -> GameSession {
    let store = GameStore::in_memory().unwrap();
    store.migrate().unwrap();
    let config = SessionConfig::new(1.0, 1.0, 1, max_iterations).unwrap();
    GameSession::build_named(store, config, "transcription", 7, "test").unwrap()
}

/// Solve every puzzle up to the configured cap, correctly.
fn exhaust_cap(session: &mut GameSession, player_id: &str, round: u32, cap: u32) {
    let mut now = 100.0;
    for _ in 0..cap {
        session
            .handle_message_at(player_id, round, &ClientMessage::Next, now)
            .unwrap();
        let answer = session
            .current_puzzle(player_id, round)
            .unwrap()
            .unwrap()
            .solution;
        now += 2.0;
        session
            .handle_message_at(player_id, round, &ClientMessage::Answer { answer }, now)
            .unwrap();
        now += 2.0;
    }
}

/// Submitting early — no timeout, no exhausted cap — is a forged
/// submission and blocks progression.
#[test]
fn early_submission_blocked() {
    let session = build_session(None);
    session.init_round(1, &groups()).unwrap();

    let err = session.finalize_effort_phase("p1", 1, false).unwrap_err();
    assert!(matches!(err, GameError::IntegrityViolation(_)));
}

/// A page timeout is always a legitimate way to finish.
#[test]
fn timeout_submission_accepted() {
    let session = build_session(None);
    session.init_round(1, &groups()).unwrap();

    let income = session.finalize_effort_phase("p1", 1, true).unwrap();
    assert_eq!(income, 0.0);
    assert_eq!(
        session.player("p1", 1).unwrap().real_effort_income,
        Some(0.0)
    );
}

/// Exhausting a configured cap legitimizes a non-timeout submission,
/// and each correct puzzle is worth the real-effort multiplier.
#[test]
fn exhausted_cap_submission_accepted() {
    let mut session = build_session(Some(2));
    session.init_round(1, &groups()).unwrap();

    exhaust_cap(&mut session, "p1", 1, 2);
    let income = session.finalize_effort_phase("p1", 1, false).unwrap();
    assert_eq!(income, 200.0);
}

/// Rounds before the vote round always use the default audit weight.
#[test]
fn pre_vote_round_uses_default_audit_weight() {
    let session = build_session(None);
    session.init_round(1, &groups()).unwrap();
    session.finalize_effort_phase("p1", 1, true).unwrap();

    let group = session.group("g1", 1).unwrap();
    assert_eq!(
        group.audit_weight,
        Some(session.config().default_audit_prob)
    );
    assert!(group.treatment.is_none());
}

/// The treatment fixed at the vote round is read back unchanged by a
/// later round, which derives its audit weight from it.
#[test]
fn treatment_propagates_to_later_rounds() {
    let mut session = build_session(None);

    session.init_round(2, &groups()).unwrap();
    for player_id in ["p1", "p2", "p3"] {
        session.submit_vote(player_id, true).unwrap();
    }
    let assignment = session.assign_treatment("g1").unwrap();

    session.init_round(3, &groups()).unwrap();
    session.finalize_effort_phase("p1", 3, true).unwrap();

    let group = session.group("g1", 3).unwrap();
    assert_eq!(group.treatment, Some(assignment.treatment));
    assert_eq!(
        session.group("g1", 2).unwrap().treatment,
        Some(assignment.treatment)
    );

    let expected_weight = if assignment.treatment.raises_audit_prob() {
        session.config().modified_audit_prob
    } else {
        session.config().default_audit_prob
    };
    assert_eq!(group.audit_weight, Some(expected_weight));
}

/// A post-vote round cannot finalize before the treatment exists.
#[test]
fn finalize_requires_assigned_treatment() {
    let session = build_session(None);
    session.init_round(3, &groups()).unwrap();

    let err = session.finalize_effort_phase("p1", 3, true).unwrap_err();
    assert!(matches!(err, GameError::TreatmentNotAssigned(_)));
}

/// There is no effort phase to finalize at the vote round.
#[test]
fn finalize_rejected_at_vote_round() {
    let session = build_session(None);
    session.init_round(2, &groups()).unwrap();

    let err = session.finalize_effort_phase("p1", 2, true).unwrap_err();
    assert!(matches!(err, GameError::WrongRound { .. }));
}
