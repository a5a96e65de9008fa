use super::GameStore;
use crate::error::{GameError, GameResult};
use crate::player::PlayerRecord;
use crate::types::Round;
use rusqlite::{params, OptionalExtension};

impl GameStore {
    // ── Player ─────────────────────────────────────────────────

    pub fn insert_player(&self, p: &PlayerRecord) -> GameResult<()> {
        self.conn().execute(
            "INSERT INTO player (
                session_id, player_id, group_id, round,
                iteration, num_trials, num_correct, num_failed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                p.session_id,
                p.player_id,
                p.group_id,
                p.round,
                p.iteration,
                p.num_trials,
                p.num_correct,
                p.num_failed,
            ],
        )?;
        Ok(())
    }

    pub fn player(
        &self,
        session_id: &str,
        player_id: &str,
        round: Round,
    ) -> GameResult<PlayerRecord> {
        self.conn()
            .query_row(
                "SELECT session_id, player_id, group_id, round, iteration,
                        num_trials, num_correct, num_failed, real_effort_income,
                        reported_income, tax_paid, if_audited, if_vote, payoff
                 FROM player
                 WHERE session_id = ?1 AND player_id = ?2 AND round = ?3",
                params![session_id, player_id, round],
                row_to_player,
            )
            .optional()?
            .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string(), round))
    }

    pub fn players_in_group(
        &self,
        session_id: &str,
        group_id: &str,
        round: Round,
    ) -> GameResult<Vec<PlayerRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT session_id, player_id, group_id, round, iteration,
                    num_trials, num_correct, num_failed, real_effort_income,
                    reported_income, tax_paid, if_audited, if_vote, payoff
             FROM player
             WHERE session_id = ?1 AND group_id = ?2 AND round = ?3
             ORDER BY player_id ASC",
        )?;
        let rows = stmt
            .query_map(params![session_id, group_id, round], row_to_player)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Persist the live-protocol progress fields.
    pub fn update_progress(&self, p: &PlayerRecord) -> GameResult<()> {
        self.conn().execute(
            "UPDATE player
             SET iteration = ?1, num_trials = ?2, num_correct = ?3, num_failed = ?4
             WHERE session_id = ?5 AND player_id = ?6 AND round = ?7",
            params![
                p.iteration,
                p.num_trials,
                p.num_correct,
                p.num_failed,
                p.session_id,
                p.player_id,
                p.round,
            ],
        )?;
        Ok(())
    }

    pub fn set_real_effort_income(
        &self,
        session_id: &str,
        player_id: &str,
        round: Round,
        income: f64,
    ) -> GameResult<()> {
        self.conn().execute(
            "UPDATE player SET real_effort_income = ?1
             WHERE session_id = ?2 AND player_id = ?3 AND round = ?4",
            params![income, session_id, player_id, round],
        )?;
        Ok(())
    }

    pub fn set_reported_income(
        &self,
        session_id: &str,
        player_id: &str,
        round: Round,
        reported: f64,
    ) -> GameResult<()> {
        self.conn().execute(
            "UPDATE player SET reported_income = ?1
             WHERE session_id = ?2 AND player_id = ?3 AND round = ?4",
            params![reported, session_id, player_id, round],
        )?;
        Ok(())
    }

    pub fn set_vote(
        &self,
        session_id: &str,
        player_id: &str,
        round: Round,
        if_vote: bool,
    ) -> GameResult<()> {
        self.conn().execute(
            "UPDATE player SET if_vote = ?1
             WHERE session_id = ?2 AND player_id = ?3 AND round = ?4",
            params![if_vote as i32, session_id, player_id, round],
        )?;
        Ok(())
    }

    /// Write the settlement outputs for one player.
    pub fn apply_settlement(
        &self,
        session_id: &str,
        player_id: &str,
        round: Round,
        tax_paid: f64,
        if_audited: bool,
        payoff: f64,
    ) -> GameResult<()> {
        self.conn().execute(
            "UPDATE player SET tax_paid = ?1, if_audited = ?2, payoff = ?3
             WHERE session_id = ?4 AND player_id = ?5 AND round = ?6",
            params![tax_paid, if_audited as i32, payoff, session_id, player_id, round],
        )?;
        Ok(())
    }
}

fn row_to_player(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlayerRecord> {
    Ok(PlayerRecord {
        session_id: row.get(0)?,
        player_id: row.get(1)?,
        group_id: row.get(2)?,
        round: row.get(3)?,
        iteration: row.get(4)?,
        num_trials: row.get(5)?,
        num_correct: row.get(6)?,
        num_failed: row.get(7)?,
        real_effort_income: row.get(8)?,
        reported_income: row.get(9)?,
        tax_paid: row.get(10)?,
        if_audited: row.get::<_, Option<i32>>(11)?.map(|v| v != 0),
        if_vote: row.get::<_, Option<i32>>(12)?.map(|v| v != 0),
        payoff: row.get(13)?,
    })
}
