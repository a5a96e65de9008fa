//! Economic settlement.
//!
//! Runs once per group per contribution round, after every member has
//! submitted a reported income. By the time it runs, submissions are
//! assumed well-formed — validation happened at submission time.

use crate::config::SessionConfig;
use crate::error::{GameError, GameResult};
use crate::event::GameEvent;
use crate::rng::RandomSource;
use crate::store::GameStore;
use crate::types::{GroupId, PlayerId, Round, SessionId};
use crate::voting::Treatment;
use anyhow::anyhow;

/// One row per (group, round).
#[derive(Debug, Clone)]
pub struct GroupRecord {
    pub session_id: SessionId,
    pub group_id: GroupId,
    pub round: Round,
    pub total_tax_paid: Option<f64>,
    pub individual_share: Option<f64>,
    pub treatment: Option<Treatment>,
    pub total_if_vote: Option<u32>,
    pub if_override: Option<bool>,
    pub audit_weight: Option<f64>,
}

impl GroupRecord {
    pub fn new(session_id: &str, group_id: &str, round: Round) -> Self {
        Self {
            session_id: session_id.to_string(),
            group_id: group_id.to_string(),
            round,
            total_tax_paid: None,
            individual_share: None,
            treatment: None,
            total_if_vote: None,
            if_override: None,
            audit_weight: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerSettlement {
    pub player_id: PlayerId,
    pub tax_paid: f64,
    pub if_audited: bool,
    pub payoff: f64,
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub total_tax_paid: f64,
    pub individual_share: f64,
    pub players: Vec<PlayerSettlement>,
}

/// Compute tax, audits, redistribution, and payoffs for one group.
///
/// Per player: `tax_paid = reported_income × tax_rate`, then an
/// independent Bernoulli draw at the group's audit weight decides the
/// audit. The redistribution share is equal for everyone regardless of
/// audit outcome. An audited player additionally loses
/// `penalty_multiplier × tax_rate × (real_effort_income − reported_income)`.
///
/// Barrier operation: invoked exactly once per group per round by the
/// caller, with exclusive access to the group record. A second
/// invocation fails rather than overwrite payoffs.
pub fn settle_group(
    store: &GameStore,
    config: &SessionConfig,
    rng: &mut dyn RandomSource,
    session_id: &str,
    group_id: &str,
    round: Round,
) -> GameResult<Settlement> {
    if round == config.vote_round {
        return Err(GameError::WrongRound {
            op: "settlement",
            round,
        });
    }
    let group = store.group(session_id, group_id, round)?;
    if group.total_tax_paid.is_some() {
        return Err(GameError::BarrierAlreadyRun("settlement"));
    }
    let audit_weight = group.audit_weight.ok_or_else(|| {
        anyhow!("group '{group_id}' round {round}: audit weight not set before settlement")
    })?;

    let mut players = store.players_in_group(session_id, group_id, round)?;

    // First pass: taxes and independent audit draws.
    let mut total_tax_paid = 0.0;
    for p in &mut players {
        let reported = p.reported_income.ok_or_else(|| {
            anyhow!("player '{}' round {round}: no reported income at settlement", p.player_id)
        })?;
        p.tax_paid = Some(reported * config.tax_rate);
        p.if_audited = Some(rng.chance(audit_weight));
        total_tax_paid += reported * config.tax_rate;
    }

    let individual_share =
        total_tax_paid * config.redistribution_multiplier / f64::from(config.players_per_group);

    // Second pass: payoffs, with the underreporting penalty for the
    // audited.
    let mut settlements = Vec::with_capacity(players.len());
    for p in &mut players {
        let real = p.real_effort_income.ok_or_else(|| {
            anyhow!("player '{}' round {round}: no real effort income at settlement", p.player_id)
        })?;
        let reported = p.reported_income.unwrap_or(0.0);
        let tax_paid = p.tax_paid.unwrap_or(0.0);
        let if_audited = p.if_audited.unwrap_or(false);

        let mut payoff = real - tax_paid + individual_share;
        if if_audited {
            payoff -= config.penalty_multiplier * config.tax_rate * (real - reported);
        }
        p.payoff = Some(payoff);

        store.apply_settlement(session_id, &p.player_id, round, tax_paid, if_audited, payoff)?;
        settlements.push(PlayerSettlement {
            player_id: p.player_id.clone(),
            tax_paid,
            if_audited,
            payoff,
        });
    }

    store.set_settlement(session_id, group_id, round, total_tax_paid, individual_share)?;
    store.append_game_event(
        session_id,
        round,
        group_id,
        &GameEvent::GroupSettled {
            group_id: group_id.to_string(),
            round,
            total_tax_paid,
            individual_share,
        },
    )?;
    log::info!(
        "group={group_id} round={round} settled: total_tax={total_tax_paid:.2} share={individual_share:.2}"
    );

    Ok(Settlement {
        total_tax_paid,
        individual_share,
        players: settlements,
    })
}
