//! Live message protocol.
//!
//! A pure request/response reducer: one inbound client message → one
//! response, invoked per player. The handler itself holds no mutable
//! state — everything is read from and written to the store before the
//! response is returned, which is what makes `load` a safe page-refresh
//! recovery path.

use crate::config::SessionConfig;
use crate::error::{GameError, GameResult};
use crate::event::GameEvent;
use crate::player::Progress;
use crate::puzzle_session::{IssueOutcome, PuzzleSession};
use crate::rng::RandomSource;
use crate::store::GameStore;
use crate::task::TaskProvider;
use crate::types::{Round, UnixTime};
use serde::{Deserialize, Serialize};

/// Messages a client may send. Unknown kinds fail at deserialization,
/// which the transport layer surfaces as a protocol violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Page loaded; report progress and the mid-flight puzzle, if any.
    Load,
    /// Request the next (or first) puzzle.
    Next,
    /// Answer the current puzzle.
    Answer { answer: String },
    /// Reveal the solution. Honored in debug builds only.
    Cheat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Status {
        progress: Progress,
        #[serde(skip_serializing_if = "Option::is_none")]
        puzzle: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        iterations_left: Option<u32>,
    },
    Puzzle {
        puzzle: serde_json::Value,
        progress: Progress,
    },
    Feedback {
        is_correct: bool,
        retries_left: u32,
        progress: Progress,
    },
    Solution {
        solution: String,
    },
}

pub struct LiveHandler<'a> {
    store: &'a GameStore,
    config: &'a SessionConfig,
    provider: &'a dyn TaskProvider,
    session_id: &'a str,
}

impl<'a> LiveHandler<'a> {
    pub fn new(
        store: &'a GameStore,
        config: &'a SessionConfig,
        provider: &'a dyn TaskProvider,
        session_id: &'a str,
    ) -> Self {
        Self {
            store,
            config,
            provider,
            session_id,
        }
    }

    /// Dispatch one inbound message for one player.
    pub fn handle(
        &self,
        player_id: &str,
        round: Round,
        msg: &ClientMessage,
        rng: &mut dyn RandomSource,
        now: UnixTime,
    ) -> GameResult<ServerMessage> {
        let mut player = self.store.player(self.session_id, player_id, round)?;
        let session = PuzzleSession::new(self.store, self.config, self.provider);

        match msg {
            ClientMessage::Load => {
                let puzzle = session
                    .current(&player)?
                    .map(|p| self.provider.render(&p));
                Ok(ServerMessage::Status {
                    progress: player.progress(),
                    puzzle,
                    iterations_left: None,
                })
            }

            ClientMessage::Cheat => {
                if !cfg!(debug_assertions) {
                    return Err(GameError::UnknownMessage);
                }
                let current = session.current(&player)?.ok_or(GameError::NoCurrentPuzzle)?;
                Ok(ServerMessage::Solution {
                    solution: current.solution,
                })
            }

            ClientMessage::Next => match session.issue(&mut player, rng, now)? {
                IssueOutcome::Issued(record) => {
                    self.store.append_game_event(
                        self.session_id,
                        round,
                        player_id,
                        &GameEvent::PuzzleIssued {
                            player_id: player_id.to_string(),
                            round,
                            iteration: record.iteration,
                        },
                    )?;
                    Ok(ServerMessage::Puzzle {
                        puzzle: self.provider.render(&record),
                        progress: player.progress(),
                    })
                }
                IssueOutcome::IterationsExhausted => Ok(ServerMessage::Status {
                    progress: player.progress(),
                    puzzle: None,
                    iterations_left: Some(0),
                }),
            },

            ClientMessage::Answer { answer } => {
                let (record, feedback) = session.answer(&mut player, answer, now)?;
                self.store.append_game_event(
                    self.session_id,
                    round,
                    player_id,
                    &GameEvent::AnswerJudged {
                        player_id: player_id.to_string(),
                        round,
                        iteration: record.iteration,
                        attempt: record.attempts,
                        is_correct: feedback.is_correct,
                    },
                )?;
                Ok(ServerMessage::Feedback {
                    is_correct: feedback.is_correct,
                    retries_left: feedback.retries_left,
                    progress: player.progress(),
                })
            }
        }
    }
}
