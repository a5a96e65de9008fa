//! Matrix task: count how many cells of a symbol grid contain the
//! target symbol.

use crate::puzzle_session::PuzzleRecord;
use crate::rng::RandomSource;
use crate::task::{InputKind, PuzzleFields, TaskProvider};

const GRID_SIZE: usize = 5;
const TARGET: char = '#';
const FILLERS: [char; 3] = ['o', '+', 'x'];

pub struct MatrixTask;

impl MatrixTask {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MatrixTask {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskProvider for MatrixTask {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn generate(&self, rng: &mut dyn RandomSource) -> PuzzleFields {
        let mut count = 0u32;
        let mut rows: Vec<String> = Vec::with_capacity(GRID_SIZE);
        for _ in 0..GRID_SIZE {
            let row: String = (0..GRID_SIZE)
                .map(|_| {
                    // Roughly a quarter of cells are targets.
                    if rng.chance(0.25) {
                        count += 1;
                        TARGET
                    } else {
                        FILLERS[rng.next_below(FILLERS.len())]
                    }
                })
                .collect();
            rows.push(row);
        }

        let text = serde_json::json!({
            "grid": rows,
            "target": TARGET.to_string(),
        })
        .to_string();

        PuzzleFields {
            text,
            solution: count.to_string(),
        }
    }

    fn render(&self, puzzle: &PuzzleRecord) -> serde_json::Value {
        let body: serde_json::Value =
            serde_json::from_str(&puzzle.text).unwrap_or(serde_json::Value::Null);
        serde_json::json!({
            "kind": "matrix",
            "puzzle": body,
        })
    }

    fn judge(&self, answer: &str, puzzle: &PuzzleRecord) -> bool {
        match answer.trim().parse::<u32>() {
            Ok(n) => puzzle.solution.parse::<u32>().map(|s| s == n).unwrap_or(false),
            Err(_) => false,
        }
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Number
    }

    fn input_hint(&self) -> &'static str {
        "how many target symbols?"
    }
}
