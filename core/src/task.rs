//! Task provider contract and registry.
//!
//! RULE: The core depends only on this contract — generate, render,
//! judge, input metadata. The kind identifier is consulted exactly once,
//! at session configuration time; after `resolve_provider` returns, no
//! component knows or cares which puzzle kind is running.

use crate::config::SessionConfig;
use crate::error::{GameError, GameResult};
use crate::puzzle_session::PuzzleRecord;
use crate::rng::RandomSource;

/// Provider-defined puzzle content. `text` is whatever the provider
/// needs to reconstruct the puzzle (often JSON); `solution` is the
/// canonical answer. Both are opaque to the core.
#[derive(Debug, Clone)]
pub struct PuzzleFields {
    pub text: String,
    pub solution: String,
}

/// What kind of input widget the client should present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Number,
}

/// The contract every puzzle kind must fulfill.
pub trait TaskProvider: Send {
    /// Unique stable name for this puzzle kind.
    fn name(&self) -> &'static str;

    /// Produce fresh puzzle content. All randomness flows through `rng`.
    fn generate(&self, rng: &mut dyn RandomSource) -> PuzzleFields;

    /// Renderable representation of an issued puzzle, sent to the
    /// client verbatim. Must not leak the solution.
    fn render(&self, puzzle: &PuzzleRecord) -> serde_json::Value;

    /// Judge a player's answer against the puzzle record.
    fn judge(&self, answer: &str, puzzle: &PuzzleRecord) -> bool;

    fn input_kind(&self) -> InputKind;

    /// Placeholder hint shown in the client's input field.
    fn input_hint(&self) -> &'static str;
}

/// Fixed registry: kind identifier → provider, resolved once.
pub fn resolve_provider(
    kind: &str,
    config: &SessionConfig,
) -> GameResult<Box<dyn TaskProvider>> {
    match kind {
        "transcription" => Ok(Box::new(
            crate::task_transcription::TranscriptionTask::new(config.captcha_length),
        )),
        "decoding" => Ok(Box::new(crate::task_decoding::DecodingTask::new(
            config.captcha_length,
        ))),
        "matrix" => Ok(Box::new(crate::task_matrix::MatrixTask::new())),
        other => Err(GameError::InvalidConfig(format!(
            "unknown task kind '{other}'"
        ))),
    }
}
