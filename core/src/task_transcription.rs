//! Transcription task: the player copies a short distorted string.
//!
//! The charset avoids lookalike glyphs (0/O, 1/I/L) so judging can be
//! strict about content while forgiving about case.

use crate::puzzle_session::PuzzleRecord;
use crate::rng::RandomSource;
use crate::task::{InputKind, PuzzleFields, TaskProvider};

const CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub struct TranscriptionTask {
    length: usize,
}

impl TranscriptionTask {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl TaskProvider for TranscriptionTask {
    fn name(&self) -> &'static str {
        "transcription"
    }

    fn generate(&self, rng: &mut dyn RandomSource) -> PuzzleFields {
        let text: String = (0..self.length)
            .map(|_| CHARSET[rng.next_below(CHARSET.len())] as char)
            .collect();
        PuzzleFields {
            solution: text.clone(),
            text,
        }
    }

    fn render(&self, puzzle: &PuzzleRecord) -> serde_json::Value {
        serde_json::json!({
            "kind": "transcription",
            "text": puzzle.text,
        })
    }

    fn judge(&self, answer: &str, puzzle: &PuzzleRecord) -> bool {
        answer.trim().eq_ignore_ascii_case(&puzzle.solution)
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Text
    }

    fn input_hint(&self) -> &'static str {
        "type the text shown above"
    }
}
