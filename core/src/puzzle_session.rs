//! Puzzle lifecycle state machine.
//!
//! States per player: Idle (no current puzzle) → Issued (current puzzle,
//! unanswered) → Answered (≥1 response, attempts under the limit) →
//! Exhausted (limit reached, or retired by advancing). The state is not
//! stored anywhere — it is derived from the current puzzle row on each
//! transition, so a reconnecting player resumes exactly where they left.
//!
//! RULE: Every precondition failure is a protocol violation and aborts
//! the interaction. Running out of iterations is the one exception: it
//! is a defined terminal status, not an error.

use crate::config::SessionConfig;
use crate::error::{GameError, GameResult};
use crate::player::PlayerRecord;
use crate::rng::RandomSource;
use crate::store::GameStore;
use crate::task::TaskProvider;
use crate::types::{Iteration, PlayerId, Round, SessionId, UnixTime};

/// One row per (player, iteration). Append-only; rows other than the
/// current one are historical and immutable.
#[derive(Debug, Clone)]
pub struct PuzzleRecord {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub round: Round,
    pub iteration: Iteration,
    pub attempts: u32,
    /// Creation time, seconds since epoch.
    pub timestamp: UnixTime,
    /// Provider-defined content; opaque to the core.
    pub text: String,
    /// Provider-defined canonical solution; opaque to the core.
    pub solution: String,
    pub response: Option<String>,
    pub response_timestamp: Option<UnixTime>,
    pub is_correct: Option<bool>,
}

/// Result of an `issue` transition.
#[derive(Debug)]
pub enum IssueOutcome {
    Issued(PuzzleRecord),
    /// The configured iteration cap is reached. Terminal for the
    /// session, reported to the client as a status, never an error.
    IterationsExhausted,
}

#[derive(Debug, Clone, Copy)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub retries_left: u32,
}

pub struct PuzzleSession<'a> {
    store: &'a GameStore,
    config: &'a SessionConfig,
    provider: &'a dyn TaskProvider,
}

impl<'a> PuzzleSession<'a> {
    pub fn new(
        store: &'a GameStore,
        config: &'a SessionConfig,
        provider: &'a dyn TaskProvider,
    ) -> Self {
        Self {
            store,
            config,
            provider,
        }
    }

    /// The puzzle whose iteration matches the player's counter, if any.
    /// At most one such row exists (unique index on iteration).
    pub fn current(&self, player: &PlayerRecord) -> GameResult<Option<PuzzleRecord>> {
        if player.iteration == 0 {
            return Ok(None);
        }
        self.store.puzzle(
            &player.session_id,
            &player.player_id,
            player.round,
            player.iteration,
        )
    }

    /// The `issue` transition: retire the previous puzzle and create the
    /// next one.
    ///
    /// Fails if the current puzzle is still unanswered, or if the
    /// inter-puzzle delay since its response has not elapsed. Reports
    /// `IterationsExhausted` once the configured cap is reached.
    pub fn issue(
        &self,
        player: &mut PlayerRecord,
        rng: &mut dyn RandomSource,
        now: UnixTime,
    ) -> GameResult<IssueOutcome> {
        if let Some(current) = self.current(player)? {
            let answered_at = match current.response_timestamp {
                None => return Err(GameError::PuzzleUnanswered),
                Some(t) => t,
            };
            if now < answered_at + self.config.puzzle_delay {
                return Err(GameError::PuzzleDelay);
            }
            if let Some(cap) = self.config.max_iterations {
                if current.iteration >= cap {
                    return Ok(IssueOutcome::IterationsExhausted);
                }
            }
        }

        let fields = self.provider.generate(rng);
        player.iteration += 1;
        let record = PuzzleRecord {
            session_id: player.session_id.clone(),
            player_id: player.player_id.clone(),
            round: player.round,
            iteration: player.iteration,
            attempts: 0,
            timestamp: now,
            text: fields.text,
            solution: fields.solution,
            response: None,
            response_timestamp: None,
            is_correct: None,
        };
        self.store.insert_puzzle(&record)?;
        self.store.update_progress(player)?;
        log::debug!(
            "player={} round={} issued iteration {}",
            player.player_id,
            player.round,
            player.iteration
        );
        Ok(IssueOutcome::Issued(record))
    }

    /// The `answer` transition: judge a response to the current puzzle.
    ///
    /// On a retry, the counter effect of the previous attempt is
    /// reversed before the new one is applied, so the player's counters
    /// always reflect only the latest judged attempt per puzzle.
    pub fn answer(
        &self,
        player: &mut PlayerRecord,
        answer: &str,
        now: UnixTime,
    ) -> GameResult<(PuzzleRecord, AnswerFeedback)> {
        let mut current = self.current(player)?.ok_or(GameError::NoCurrentPuzzle)?;

        if answer.trim().is_empty() {
            return Err(GameError::EmptyAnswer);
        }

        if let Some(answered_at) = current.response_timestamp {
            // Retry path.
            if current.attempts >= self.config.attempts_per_puzzle {
                return Err(GameError::AttemptsExhausted);
            }
            if now < answered_at + self.config.retry_delay {
                return Err(GameError::RetryDelay);
            }
            player.retract_attempt(current.is_correct.unwrap_or(false));
        }

        let is_correct = self.provider.judge(answer, &current);
        current.response = Some(answer.to_string());
        current.response_timestamp = Some(now);
        current.is_correct = Some(is_correct);
        current.attempts += 1;
        player.apply_attempt(is_correct);

        self.store.update_answer(&current)?;
        self.store.update_progress(player)?;

        let retries_left = self.config.attempts_per_puzzle - current.attempts;
        log::debug!(
            "player={} round={} iteration={} attempt={} correct={}",
            player.player_id,
            player.round,
            current.iteration,
            current.attempts,
            is_correct
        );
        Ok((
            current,
            AnswerFeedback {
                is_correct,
                retries_left,
            },
        ))
    }
}
