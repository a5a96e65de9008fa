use super::GameStore;
use crate::error::{GameError, GameResult};
use crate::settlement::GroupRecord;
use crate::types::Round;
use crate::voting::Treatment;
use anyhow::anyhow;
use rusqlite::{params, OptionalExtension};

impl GameStore {
    // ── Group ──────────────────────────────────────────────────

    pub fn insert_group(&self, g: &GroupRecord) -> GameResult<()> {
        self.conn().execute(
            "INSERT INTO group_round (session_id, group_id, round)
             VALUES (?1, ?2, ?3)",
            params![g.session_id, g.group_id, g.round],
        )?;
        Ok(())
    }

    pub fn group(
        &self,
        session_id: &str,
        group_id: &str,
        round: Round,
    ) -> GameResult<GroupRecord> {
        let row = self
            .conn()
            .query_row(
                "SELECT session_id, group_id, round, total_tax_paid,
                        individual_share, treatment, total_if_vote, if_override,
                        audit_weight
                 FROM group_round
                 WHERE session_id = ?1 AND group_id = ?2 AND round = ?3",
                params![session_id, group_id, round],
                |row| {
                    Ok((
                        GroupRecord {
                            session_id: row.get(0)?,
                            group_id: row.get(1)?,
                            round: row.get(2)?,
                            total_tax_paid: row.get(3)?,
                            individual_share: row.get(4)?,
                            treatment: None,
                            total_if_vote: row.get(6)?,
                            if_override: row.get::<_, Option<i32>>(7)?.map(|v| v != 0),
                            audit_weight: row.get(8)?,
                        },
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        let (mut group, label) =
            row.ok_or_else(|| GameError::GroupNotFound(group_id.to_string(), round))?;
        group.treatment = match label {
            None => None,
            Some(s) => Some(
                Treatment::from_str(&s)
                    .ok_or_else(|| anyhow!("unknown treatment label '{s}'"))?,
            ),
        };
        Ok(group)
    }

    /// The stored treatment label for a (group, round), if assigned.
    pub fn treatment(
        &self,
        session_id: &str,
        group_id: &str,
        round: Round,
    ) -> GameResult<Option<Treatment>> {
        let label: Option<Option<String>> = self
            .conn()
            .query_row(
                "SELECT treatment FROM group_round
                 WHERE session_id = ?1 AND group_id = ?2 AND round = ?3",
                params![session_id, group_id, round],
                |row| row.get(0),
            )
            .optional()?;
        match label.flatten() {
            None => Ok(None),
            Some(s) => Ok(Some(
                Treatment::from_str(&s)
                    .ok_or_else(|| anyhow!("unknown treatment label '{s}'"))?,
            )),
        }
    }

    /// Write the vote-round outcome: treatment, tally, and override flag.
    pub fn set_treatment(
        &self,
        session_id: &str,
        group_id: &str,
        round: Round,
        treatment: Treatment,
        total_if_vote: u32,
        if_override: bool,
    ) -> GameResult<()> {
        self.conn().execute(
            "UPDATE group_round
             SET treatment = ?1, total_if_vote = ?2, if_override = ?3
             WHERE session_id = ?4 AND group_id = ?5 AND round = ?6",
            params![
                treatment.as_str(),
                total_if_vote,
                if_override as i32,
                session_id,
                group_id,
                round,
            ],
        )?;
        Ok(())
    }

    /// Copy the treatment label into a later round's group row.
    pub fn set_treatment_label(
        &self,
        session_id: &str,
        group_id: &str,
        round: Round,
        treatment: Treatment,
    ) -> GameResult<()> {
        self.conn().execute(
            "UPDATE group_round SET treatment = ?1
             WHERE session_id = ?2 AND group_id = ?3 AND round = ?4",
            params![treatment.as_str(), session_id, group_id, round],
        )?;
        Ok(())
    }

    pub fn set_audit_weight(
        &self,
        session_id: &str,
        group_id: &str,
        round: Round,
        audit_weight: f64,
    ) -> GameResult<()> {
        self.conn().execute(
            "UPDATE group_round SET audit_weight = ?1
             WHERE session_id = ?2 AND group_id = ?3 AND round = ?4",
            params![audit_weight, session_id, group_id, round],
        )?;
        Ok(())
    }

    /// Write the settlement totals for a (group, round).
    pub fn set_settlement(
        &self,
        session_id: &str,
        group_id: &str,
        round: Round,
        total_tax_paid: f64,
        individual_share: f64,
    ) -> GameResult<()> {
        self.conn().execute(
            "UPDATE group_round SET total_tax_paid = ?1, individual_share = ?2
             WHERE session_id = ?3 AND group_id = ?4 AND round = ?5",
            params![total_tax_paid, individual_share, session_id, group_id, round],
        )?;
        Ok(())
    }
}
