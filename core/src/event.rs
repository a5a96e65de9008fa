//! Experiment event log.
//!
//! Every significant transition is appended to the event log as a
//! tagged JSON payload. The log is append-only measurement output —
//! nothing in the engine reads it back to make decisions.

use crate::types::{GroupId, PlayerId, Round, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    SessionInitialized {
        session_id: SessionId,
        seed: u64,
        task_kind: String,
    },
    PuzzleIssued {
        player_id: PlayerId,
        round: Round,
        iteration: u32,
    },
    AnswerJudged {
        player_id: PlayerId,
        round: Round,
        iteration: u32,
        attempt: u32,
        is_correct: bool,
    },
    EffortPhaseFinalized {
        player_id: PlayerId,
        round: Round,
        real_effort_income: f64,
    },
    GroupSettled {
        group_id: GroupId,
        round: Round,
        total_tax_paid: f64,
        individual_share: f64,
    },
    TreatmentAssigned {
        group_id: GroupId,
        round: Round,
        treatment: String,
        total_if_vote: u32,
        if_override: bool,
    },
}

impl GameEvent {
    /// Stable string name, used for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SessionInitialized { .. } => "session_initialized",
            Self::PuzzleIssued { .. } => "puzzle_issued",
            Self::AnswerJudged { .. } => "answer_judged",
            Self::EffortPhaseFinalized { .. } => "effort_phase_finalized",
            Self::GroupSettled { .. } => "group_settled",
            Self::TreatmentAssigned { .. } => "treatment_assigned",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub session_id: SessionId,
    pub round: Round,
    /// Player id for live-protocol events, group id for barrier events.
    pub actor: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized GameEvent
}
