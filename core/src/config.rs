//! Session configuration.
//!
//! RULE: One immutable `SessionConfig` is constructed at session start
//! and passed to every component that needs it. Nothing reads ambient
//! global state.

use crate::error::{GameError, GameResult};
use crate::types::Round;
use serde::Deserialize;

/// The four per-session tunables, as found in a params file.
/// Everything absent falls back to the defaults below.
#[derive(Debug, Clone, Deserialize)]
struct SessionParamsFile {
    retry_delay: Option<f64>,
    puzzle_delay: Option<f64>,
    attempts_per_puzzle: Option<u32>,
    max_iterations: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    // ── Tunables, resolved once at session start ───────────────
    /// Seconds a player must wait between retries of one puzzle.
    pub retry_delay: f64,
    /// Seconds between answering one puzzle and requesting the next.
    pub puzzle_delay: f64,
    /// Retry limit per puzzle.
    pub attempts_per_puzzle: u32,
    /// Cap on puzzles per player per round. `None` means no cap —
    /// never `Some(0)`, which the constructor rejects.
    pub max_iterations: Option<u32>,

    // ── Fixed experiment constants ─────────────────────────────
    pub players_per_group: u32,
    pub vote_round: Round,
    pub tax_rate: f64,
    pub redistribution_multiplier: f64,
    /// Always 1 / tax_rate, so the penalty rate is independent of
    /// the nominal tax rate.
    pub penalty_multiplier: f64,
    pub default_audit_prob: f64,
    pub modified_audit_prob: f64,
    /// Points of income per correctly solved puzzle.
    pub real_effort_multiplier: f64,
    /// Length of generated captcha-style puzzles.
    pub captcha_length: usize,
}

impl SessionConfig {
    pub fn new(
        retry_delay: f64,
        puzzle_delay: f64,
        attempts_per_puzzle: u32,
        max_iterations: Option<u32>,
    ) -> GameResult<Self> {
        if !(retry_delay.is_finite() && retry_delay >= 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "retry_delay must be a non-negative number, got {retry_delay}"
            )));
        }
        if !(puzzle_delay.is_finite() && puzzle_delay >= 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "puzzle_delay must be a non-negative number, got {puzzle_delay}"
            )));
        }
        if attempts_per_puzzle == 0 {
            return Err(GameError::InvalidConfig(
                "attempts_per_puzzle must be at least 1".into(),
            ));
        }
        // "No cap" is None; a zero cap would make every round unplayable
        // and is indistinguishable from a missing-params bug.
        if max_iterations == Some(0) {
            return Err(GameError::InvalidConfig(
                "max_iterations must be positive; use None for no cap".into(),
            ));
        }

        let tax_rate = 0.4;
        Ok(Self {
            retry_delay,
            puzzle_delay,
            attempts_per_puzzle,
            max_iterations,
            players_per_group: 3,
            vote_round: 2,
            tax_rate,
            redistribution_multiplier: 0.5,
            penalty_multiplier: 1.0 / tax_rate,
            default_audit_prob: 0.2,
            modified_audit_prob: 0.5,
            real_effort_multiplier: 100.0,
            captcha_length: 3,
        })
    }

    /// Load tunables from a JSON params file, defaulting each missing
    /// field. The fixed experiment constants are never file-driven.
    pub fn load(path: &str) -> GameResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GameError::InvalidConfig(format!("Cannot read {path}: {e}")))?;
        let file: SessionParamsFile = serde_json::from_str(&content)?;
        Self::new(
            file.retry_delay.unwrap_or(1.0),
            file.puzzle_delay.unwrap_or(1.0),
            file.attempts_per_puzzle.unwrap_or(1),
            file.max_iterations,
        )
    }

    /// Config with the stock defaults, for use in tests.
    pub fn default_session() -> Self {
        Self::new(1.0, 1.0, 1, None).expect("default params are valid")
    }

    /// Total rounds in the session. The vote round sits in the middle:
    /// the same number of contribution rounds before and after it.
    pub fn num_rounds(&self) -> Round {
        2 * self.vote_round - 1
    }
}
