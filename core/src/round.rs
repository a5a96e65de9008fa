//! Round finalization — the seam between the live puzzle phase and the
//! settlement barrier.
//!
//! Converts a player's effort into income, verifies the submission was
//! genuine, and fixes the group's audit weight for the round (looking
//! up the vote-round treatment for rounds after it).

use crate::config::SessionConfig;
use crate::error::{GameError, GameResult};
use crate::event::GameEvent;
use crate::store::GameStore;
use crate::types::Round;
use crate::voting;

/// Close a player's puzzle phase for the round.
///
/// A submission is genuine if the page timed out, or if a configured
/// iteration cap exists and the player exhausted it. Anything else is a
/// forged early submission and blocks progression.
pub fn finalize_effort_phase(
    store: &GameStore,
    config: &SessionConfig,
    session_id: &str,
    player_id: &str,
    round: Round,
    timeout_happened: bool,
) -> GameResult<f64> {
    if round == config.vote_round {
        return Err(GameError::WrongRound {
            op: "finalize_effort_phase",
            round,
        });
    }

    let player = store.player(session_id, player_id, round)?;

    let cap_exhausted = config
        .max_iterations
        .map_or(false, |cap| player.iteration >= cap);
    if !timeout_happened && !cap_exhausted {
        return Err(GameError::IntegrityViolation(player_id.to_string()));
    }

    let real_effort_income = f64::from(player.num_correct) * config.real_effort_multiplier;
    store.set_real_effort_income(session_id, player_id, round, real_effort_income)?;

    // Fix the group's audit weight for this round. Rounds after the
    // vote round propagate the stored treatment label into their own
    // group row so it is visible alongside the round's results.
    let audit_weight = if round < config.vote_round {
        voting::audit_weight_for_round(config, round, None)
    } else {
        let treatment = store
            .treatment(session_id, &player.group_id, config.vote_round)?
            .ok_or_else(|| GameError::TreatmentNotAssigned(player.group_id.clone()))?;
        store.set_treatment_label(session_id, &player.group_id, round, treatment)?;
        voting::audit_weight_for_round(config, round, Some(treatment))
    };
    store.set_audit_weight(session_id, &player.group_id, round, audit_weight)?;

    store.append_game_event(
        session_id,
        round,
        player_id,
        &GameEvent::EffortPhaseFinalized {
            player_id: player_id.to_string(),
            round,
            real_effort_income,
        },
    )?;
    log::debug!(
        "player={player_id} round={round} income={real_effort_income} audit_weight={audit_weight}"
    );

    Ok(real_effort_income)
}
