//! Voting and treatment assignment.
//!
//! Runs once per group, at the designated vote round. The resulting
//! treatment label is written exactly once and looked up unchanged by
//! every later round — it is never recomputed.

use crate::config::SessionConfig;
use crate::error::{GameError, GameResult};
use crate::event::GameEvent;
use crate::rng::RandomSource;
use crate::store::GameStore;
use crate::types::Round;

/// The four experimental treatments. "Endo" outcomes come from the
/// group's own vote; "Exo" outcomes from the computer override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Treatment {
    EndoYes,
    EndoNo,
    ExoYes,
    ExoNo,
}

impl Treatment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndoYes => "EndoYes",
            Self::EndoNo => "EndoNo",
            Self::ExoYes => "ExoYes",
            Self::ExoNo => "ExoNo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "EndoYes" => Some(Self::EndoYes),
            "EndoNo" => Some(Self::EndoNo),
            "ExoYes" => Some(Self::ExoYes),
            "ExoNo" => Some(Self::ExoNo),
            _ => None,
        }
    }

    /// "Yes" treatments raise the audit probability from the default to
    /// the modified level for all rounds after the vote round.
    pub fn raises_audit_prob(&self) -> bool {
        matches!(self, Self::EndoYes | Self::ExoYes)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TreatmentAssignment {
    pub treatment: Treatment,
    pub total_if_vote: u32,
    pub if_override: bool,
}

/// Tally the group's votes and fix the treatment.
///
/// Strictly more than half the group voting yes yields the tentative
/// "EndoYes", otherwise "EndoNo". A fair coin then decides whether the
/// computer overrides; if it does, a second fair coin picks "ExoYes" or
/// "ExoNo", discarding the vote outcome (the tally is still recorded
/// for measurement).
///
/// Barrier operation: the caller must invoke it exactly once per group,
/// after every member's vote is in. A second invocation fails.
pub fn assign_treatment(
    store: &GameStore,
    config: &SessionConfig,
    rng: &mut dyn RandomSource,
    session_id: &str,
    group_id: &str,
) -> GameResult<TreatmentAssignment> {
    let round = config.vote_round;
    let group = store.group(session_id, group_id, round)?;
    if group.treatment.is_some() {
        return Err(GameError::BarrierAlreadyRun("treatment assignment"));
    }

    let players = store.players_in_group(session_id, group_id, round)?;
    let total_if_vote = players
        .iter()
        .filter(|p| p.if_vote == Some(true))
        .count() as u32;

    let mut treatment = if f64::from(total_if_vote) > f64::from(config.players_per_group) / 2.0 {
        Treatment::EndoYes
    } else {
        Treatment::EndoNo
    };

    let if_override = rng.fair_coin();
    if if_override {
        treatment = if rng.fair_coin() {
            Treatment::ExoYes
        } else {
            Treatment::ExoNo
        };
    }

    store.set_treatment(session_id, group_id, round, treatment, total_if_vote, if_override)?;
    store.append_game_event(
        session_id,
        round,
        group_id,
        &GameEvent::TreatmentAssigned {
            group_id: group_id.to_string(),
            round,
            treatment: treatment.as_str().to_string(),
            total_if_vote,
            if_override,
        },
    )?;
    log::info!(
        "group={group_id} treatment={} votes={total_if_vote} override={if_override}",
        treatment.as_str()
    );

    Ok(TreatmentAssignment {
        treatment,
        total_if_vote,
        if_override,
    })
}

/// Audit probability for a round, from the round's position relative to
/// the vote round and, for later rounds, the stored treatment.
pub fn audit_weight_for_round(
    config: &SessionConfig,
    round: Round,
    treatment: Option<Treatment>,
) -> f64 {
    if round < config.vote_round {
        return config.default_audit_prob;
    }
    match treatment {
        Some(t) if t.raises_audit_prob() => config.modified_audit_prob,
        _ => config.default_audit_prob,
    }
}
