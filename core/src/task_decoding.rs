//! Decoding task: digits are enciphered through a fresh digit→letter
//! table each puzzle; the player reads the table and types the digits
//! back.
//!
//! The puzzle `text` stores the cipher table and the enciphered string
//! as JSON, so a mid-game page reload can re-render the exact puzzle.

use crate::puzzle_session::PuzzleRecord;
use crate::rng::RandomSource;
use crate::task::{InputKind, PuzzleFields, TaskProvider};

const LETTER_POOL: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ";

pub struct DecodingTask {
    length: usize,
}

impl DecodingTask {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl TaskProvider for DecodingTask {
    fn name(&self) -> &'static str {
        "decoding"
    }

    fn generate(&self, rng: &mut dyn RandomSource) -> PuzzleFields {
        // Draw ten distinct letters, one per digit.
        let mut pool: Vec<u8> = LETTER_POOL.to_vec();
        let mut table = [0u8; 10];
        for slot in table.iter_mut() {
            *slot = pool.remove(rng.next_below(pool.len()));
        }

        let digits: String = (0..self.length)
            .map(|_| char::from(b'0' + rng.next_below(10) as u8))
            .collect();
        let encoded: String = digits
            .bytes()
            .map(|d| table[(d - b'0') as usize] as char)
            .collect();

        let cipher: serde_json::Map<String, serde_json::Value> = table
            .iter()
            .enumerate()
            .map(|(digit, letter)| {
                (digit.to_string(), serde_json::Value::from((*letter as char).to_string()))
            })
            .collect();

        let text = serde_json::json!({
            "cipher": cipher,
            "encoded": encoded,
        })
        .to_string();

        PuzzleFields {
            text,
            solution: digits,
        }
    }

    fn render(&self, puzzle: &PuzzleRecord) -> serde_json::Value {
        let body: serde_json::Value =
            serde_json::from_str(&puzzle.text).unwrap_or(serde_json::Value::Null);
        serde_json::json!({
            "kind": "decoding",
            "puzzle": body,
        })
    }

    fn judge(&self, answer: &str, puzzle: &PuzzleRecord) -> bool {
        answer.trim() == puzzle.solution
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Number
    }

    fn input_hint(&self) -> &'static str {
        "enter the decoded digits"
    }
}
