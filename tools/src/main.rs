//! session-runner: headless scripted driver for the real-effort
//! tax-compliance experiment.
//!
//! Drives one three-player group through every round with bot players
//! (uneven solving accuracy, uneven underreporting, a split vote) and
//! prints the settlement of each round plus the assigned treatment.
//!
//! Usage:
//!   session-runner --seed 12345 --db session.db --task transcription
//!   session-runner --seed 12345 --json

use anyhow::{anyhow, bail, Result};
use realeffort_core::{
    config::SessionConfig,
    protocol::{ClientMessage, ServerMessage},
    session::GameSession,
    store::GameStore,
    types::Round,
};
use std::env;

const GROUP: &str = "g1";
const PLAYERS: [&str; 3] = ["p1", "p2", "p3"];
/// Correct answers each bot aims for, per round.
const CORRECT_QUOTA: [u32; 3] = [4, 3, 2];
/// Fraction of real income each bot reports.
const REPORT_FRACTION: [f64; 3] = [1.0, 0.5, 0.0];
/// Votes for a higher audit probability.
const VOTES: [bool; 3] = [true, true, false];

#[derive(serde::Serialize)]
struct RoundSummary {
    round: Round,
    total_tax_paid: f64,
    individual_share: f64,
    payoffs: Vec<(String, f64)>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let json = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let task = args
        .windows(2)
        .find(|w| w[0] == "--task")
        .map(|w| w[1].as_str())
        .unwrap_or("transcription");

    if !json {
        println!("realeffort — session-runner");
        println!("  seed:    {seed}");
        println!("  db:      {db}");
        println!("  task:    {task}");
        println!("  started: {}", chrono::Utc::now().to_rfc3339());
        println!();
    }

    let store = if db == ":memory:" {
        GameStore::in_memory()?
    } else {
        GameStore::open(db)?
    };
    store.migrate()?;

    // Two attempts per puzzle, capped at four puzzles per round so the
    // bots can finish without a page timeout.
    let config = SessionConfig::new(1.0, 1.0, 2, Some(4))?;
    let num_rounds = config.num_rounds();
    let vote_round = config.vote_round;
    let mut session = GameSession::build(store, config, task, seed)?;

    let groups = vec![(
        GROUP.to_string(),
        PLAYERS.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
    )];

    // Scripted wall clock, stepped past every configured delay.
    let mut now = 1_700_000_000.0;
    let mut summaries = Vec::new();

    for round in 1..=num_rounds {
        session.init_round(round, &groups)?;

        if round == vote_round {
            for (player_id, vote) in PLAYERS.iter().zip(VOTES) {
                session.submit_vote(player_id, vote)?;
            }
            let assignment = session.assign_treatment(GROUP)?;
            if !json {
                println!(
                    "round {round} (vote): treatment={} votes={} override={}",
                    assignment.treatment.as_str(),
                    assignment.total_if_vote,
                    assignment.if_override
                );
            }
            continue;
        }

        for (idx, player_id) in PLAYERS.iter().enumerate() {
            play_effort_phase(&mut session, player_id, round, CORRECT_QUOTA[idx], &mut now)?;
            let income = session.finalize_effort_phase(player_id, round, false)?;
            session.submit_report(player_id, round, income * REPORT_FRACTION[idx])?;
        }

        let settlement = session.settle_group(GROUP, round)?;
        if !json {
            println!(
                "round {round}: total_tax={:.0} share={:.1}",
                settlement.total_tax_paid, settlement.individual_share
            );
            for p in &settlement.players {
                println!(
                    "  {}: tax={:.0} audited={} payoff={:.1}",
                    p.player_id, p.tax_paid, p.if_audited, p.payoff
                );
            }
        }
        summaries.push(RoundSummary {
            round,
            total_tax_paid: settlement.total_tax_paid,
            individual_share: settlement.individual_share,
            payoffs: settlement
                .players
                .iter()
                .map(|p| (p.player_id.clone(), p.payoff))
                .collect(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!();
        println!(
            "events: {} puzzles issued, {} answers judged, {} groups settled",
            session.count_events("puzzle_issued")?,
            session.count_events("answer_judged")?,
            session.count_events("group_settled")?,
        );
    }

    Ok(())
}

/// Solve puzzles until the iteration cap, answering correctly up to the
/// bot's quota and bogusly after it.
fn play_effort_phase(
    session: &mut GameSession,
    player_id: &str,
    round: Round,
    quota: u32,
    now: &mut f64,
) -> Result<()> {
    session.handle_message_at(player_id, round, &ClientMessage::Load, *now)?;

    let mut solved = 0u32;
    loop {
        *now += 2.0;
        match session.handle_message_at(player_id, round, &ClientMessage::Next, *now)? {
            ServerMessage::Puzzle { .. } => {
                let puzzle = session
                    .current_puzzle(player_id, round)?
                    .ok_or_else(|| anyhow!("puzzle missing right after issue"))?;
                let answer = if solved < quota {
                    puzzle.solution
                } else {
                    "bogus".to_string()
                };
                *now += 2.0;
                let reply = session.handle_message_at(
                    player_id,
                    round,
                    &ClientMessage::Answer { answer },
                    *now,
                )?;
                match reply {
                    ServerMessage::Feedback { is_correct, .. } => {
                        if is_correct {
                            solved += 1;
                        }
                    }
                    other => bail!("unexpected answer reply: {other:?}"),
                }
            }
            ServerMessage::Status {
                iterations_left: Some(0),
                ..
            } => break,
            other => bail!("unexpected next reply: {other:?}"),
        }
    }
    log::debug!("player={player_id} round={round} solved={solved}");
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
