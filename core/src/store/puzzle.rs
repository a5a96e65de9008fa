use super::GameStore;
use crate::error::GameResult;
use crate::puzzle_session::PuzzleRecord;
use crate::types::{Iteration, Round};
use rusqlite::{params, OptionalExtension};

impl GameStore {
    // ── Puzzle ─────────────────────────────────────────────────

    pub fn insert_puzzle(&self, z: &PuzzleRecord) -> GameResult<()> {
        self.conn().execute(
            "INSERT INTO puzzle (
                session_id, player_id, round, iteration, attempts,
                timestamp, text, solution
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                z.session_id,
                z.player_id,
                z.round,
                z.iteration,
                z.attempts,
                z.timestamp,
                z.text,
                z.solution,
            ],
        )?;
        Ok(())
    }

    pub fn puzzle(
        &self,
        session_id: &str,
        player_id: &str,
        round: Round,
        iteration: Iteration,
    ) -> GameResult<Option<PuzzleRecord>> {
        let record = self
            .conn()
            .query_row(
                "SELECT session_id, player_id, round, iteration, attempts,
                        timestamp, text, solution, response, response_timestamp,
                        is_correct
                 FROM puzzle
                 WHERE session_id = ?1 AND player_id = ?2 AND round = ?3
                   AND iteration = ?4",
                params![session_id, player_id, round, iteration],
                |row| {
                    Ok(PuzzleRecord {
                        session_id: row.get(0)?,
                        player_id: row.get(1)?,
                        round: row.get(2)?,
                        iteration: row.get(3)?,
                        attempts: row.get(4)?,
                        timestamp: row.get(5)?,
                        text: row.get(6)?,
                        solution: row.get(7)?,
                        response: row.get(8)?,
                        response_timestamp: row.get(9)?,
                        is_correct: row.get::<_, Option<i32>>(10)?.map(|v| v != 0),
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Persist a judged answer on the current puzzle row.
    pub fn update_answer(&self, z: &PuzzleRecord) -> GameResult<()> {
        self.conn().execute(
            "UPDATE puzzle
             SET attempts = ?1, response = ?2, response_timestamp = ?3, is_correct = ?4
             WHERE session_id = ?5 AND player_id = ?6 AND round = ?7 AND iteration = ?8",
            params![
                z.attempts,
                z.response,
                z.response_timestamp,
                z.is_correct.map(|v| v as i32),
                z.session_id,
                z.player_id,
                z.round,
                z.iteration,
            ],
        )?;
        Ok(())
    }

    pub fn puzzle_count(
        &self,
        session_id: &str,
        player_id: &str,
        round: Round,
    ) -> GameResult<u32> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM puzzle
             WHERE session_id = ?1 AND player_id = ?2 AND round = ?3",
            params![session_id, player_id, round],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
