//! Per-round player record and progress counters.
//!
//! RULE: Progress counters are mutated only by the live protocol;
//! financial and audit fields only at round barriers. The undo-then-redo
//! dance for retries lives here, behind two explicit operations —
//! callers never touch the counters directly.

use crate::types::{GroupId, Iteration, PlayerId, Round, SessionId};
use serde::{Deserialize, Serialize};

/// One row per (participant, round).
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub group_id: GroupId,
    pub round: Round,
    /// Puzzle sequence number; equals the count of successful issues
    /// over the whole session. Carried forward across rounds, never
    /// reset.
    pub iteration: Iteration,
    pub num_trials: u32,
    pub num_correct: u32,
    pub num_failed: u32,
    pub real_effort_income: Option<f64>,
    pub reported_income: Option<f64>,
    pub tax_paid: Option<f64>,
    pub if_audited: Option<bool>,
    pub if_vote: Option<bool>,
    pub payoff: Option<f64>,
}

impl PlayerRecord {
    pub fn new(
        session_id: &str,
        player_id: &str,
        group_id: &str,
        round: Round,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            player_id: player_id.to_string(),
            group_id: group_id.to_string(),
            round,
            iteration: 0,
            num_trials: 0,
            num_correct: 0,
            num_failed: 0,
            real_effort_income: None,
            reported_income: None,
            tax_paid: None,
            if_audited: None,
            if_vote: None,
            payoff: None,
        }
    }

    /// Count a judged attempt.
    pub fn apply_attempt(&mut self, is_correct: bool) {
        self.num_trials += 1;
        if is_correct {
            self.num_correct += 1;
        } else {
            self.num_failed += 1;
        }
    }

    /// Reverse the counter effect of the previous attempt on the same
    /// puzzle, so that after the retry is applied the counters reflect
    /// only the latest judged attempt.
    pub fn retract_attempt(&mut self, was_correct: bool) {
        self.num_trials -= 1;
        if was_correct {
            self.num_correct -= 1;
        } else {
            self.num_failed -= 1;
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            num_trials: self.num_trials,
            num_correct: self.num_correct,
            num_incorrect: self.num_failed,
            iteration: self.iteration,
        }
    }
}

/// Progress snapshot embedded in every live-protocol response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub num_trials: u32,
    pub num_correct: u32,
    pub num_incorrect: u32,
    pub iteration: Iteration,
}
