//! The session facade — wires store, config, task provider, rng
//! streams, and clock into one handle the surrounding round/page
//! framework drives.
//!
//! Barrier discipline is the caller's contract: `settle_group` and
//! `assign_treatment` must be invoked exactly once per group per round,
//! after every member's submission is in. The session verifies the
//! round is the right kind and that a barrier has not already run; it
//! cannot verify arrival.

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::{GameError, GameResult};
use crate::event::{EventLogEntry, GameEvent};
use crate::player::{PlayerRecord, Progress};
use crate::protocol::{ClientMessage, LiveHandler, ServerMessage};
use crate::puzzle_session::{PuzzleRecord, PuzzleSession};
use crate::rng::{DrawRng, DrawSlot, RngBank};
use crate::settlement::{self, GroupRecord, Settlement};
use crate::store::GameStore;
use crate::task::{self, TaskProvider};
use crate::types::{GroupId, PlayerId, Round, SessionId, UnixTime};
use crate::voting::{self, TreatmentAssignment};

pub struct GameSession {
    session_id: SessionId,
    config: SessionConfig,
    store: GameStore,
    provider: Box<dyn TaskProvider>,
    task_rng: DrawRng,
    audit_rng: DrawRng,
    override_rng: DrawRng,
    clock: Box<dyn Clock>,
}

impl GameSession {
    /// Build a fully wired session with a generated id and the system
    /// clock.
    pub fn build(
        store: GameStore,
        config: SessionConfig,
        task_kind: &str,
        seed: u64,
    ) -> GameResult<Self> {
        let session_id = format!("session-{}", uuid::Uuid::new_v4());
        Self::build_named(store, config, task_kind, seed, &session_id)
    }

    /// Build with a caller-chosen session id. Used by tests and replay
    /// tooling, where ids must be stable.
    pub fn build_named(
        store: GameStore,
        config: SessionConfig,
        task_kind: &str,
        seed: u64,
        session_id: &str,
    ) -> GameResult<Self> {
        let provider = task::resolve_provider(task_kind, &config)?;
        let bank = RngBank::new(seed);

        store.insert_session(
            session_id,
            seed,
            task_kind,
            env!("CARGO_PKG_VERSION"),
            &chrono::Utc::now().to_rfc3339(),
        )?;
        store.append_game_event(
            session_id,
            0,
            "session",
            &GameEvent::SessionInitialized {
                session_id: session_id.to_string(),
                seed,
                task_kind: task_kind.to_string(),
            },
        )?;
        log::info!("session={session_id} task={task_kind} seed={seed}");

        Ok(Self {
            session_id: session_id.to_string(),
            config,
            store,
            provider,
            task_rng: bank.for_slot(DrawSlot::Task),
            audit_rng: bank.for_slot(DrawSlot::Audit),
            override_rng: bank.for_slot(DrawSlot::Override),
            clock: Box::new(SystemClock),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create the player and group rows for one round.
    pub fn init_round(
        &self,
        round: Round,
        groups: &[(GroupId, Vec<PlayerId>)],
    ) -> GameResult<()> {
        if round == 0 || round > self.config.num_rounds() {
            return Err(GameError::WrongRound {
                op: "init_round",
                round,
            });
        }
        for (group_id, members) in groups {
            if members.len() != self.config.players_per_group as usize {
                return Err(GameError::InvalidConfig(format!(
                    "group '{group_id}' has {} members, expected {}",
                    members.len(),
                    self.config.players_per_group
                )));
            }
            self.store
                .insert_group(&GroupRecord::new(&self.session_id, group_id, round))?;
            for player_id in members {
                let mut record =
                    PlayerRecord::new(&self.session_id, player_id, group_id, round);
                // The iteration counter is cumulative: it carries across
                // rounds and never resets within a session.
                if round > 1 {
                    match self.store.player(&self.session_id, player_id, round - 1) {
                        Ok(prev) => record.iteration = prev.iteration,
                        Err(GameError::PlayerNotFound(..)) => {}
                        Err(e) => return Err(e),
                    }
                }
                self.store.insert_player(&record)?;
            }
        }
        Ok(())
    }

    // ── Live play ──────────────────────────────────────────────

    /// Handle one live message at the current wall-clock time.
    pub fn handle_message(
        &mut self,
        player_id: &str,
        round: Round,
        msg: &ClientMessage,
    ) -> GameResult<ServerMessage> {
        let now = self.clock.now();
        self.handle_message_at(player_id, round, msg, now)
    }

    /// Handle one live message at an explicit timestamp. Deterministic
    /// drivers (tests, the scripted runner) use this to step time.
    pub fn handle_message_at(
        &mut self,
        player_id: &str,
        round: Round,
        msg: &ClientMessage,
        now: UnixTime,
    ) -> GameResult<ServerMessage> {
        if round == self.config.vote_round {
            return Err(GameError::WrongRound {
                op: "live play",
                round,
            });
        }
        LiveHandler::new(
            &self.store,
            &self.config,
            self.provider.as_ref(),
            &self.session_id,
        )
        .handle(player_id, round, msg, &mut self.task_rng, now)
    }

    // ── Round boundaries ───────────────────────────────────────

    /// Close a player's puzzle phase; see `round::finalize_effort_phase`.
    pub fn finalize_effort_phase(
        &self,
        player_id: &str,
        round: Round,
        timeout_happened: bool,
    ) -> GameResult<f64> {
        crate::round::finalize_effort_phase(
            &self.store,
            &self.config,
            &self.session_id,
            player_id,
            round,
            timeout_happened,
        )
    }

    /// Record a player's self-reported income for a contribution round.
    pub fn submit_report(
        &self,
        player_id: &str,
        round: Round,
        reported_income: f64,
    ) -> GameResult<()> {
        if round == self.config.vote_round {
            return Err(GameError::WrongRound {
                op: "submit_report",
                round,
            });
        }
        self.store
            .set_reported_income(&self.session_id, player_id, round, reported_income)
    }

    /// Record a player's vote. Only meaningful at the vote round.
    pub fn submit_vote(&self, player_id: &str, if_vote: bool) -> GameResult<()> {
        self.store
            .set_vote(&self.session_id, player_id, self.config.vote_round, if_vote)
    }

    /// Settlement barrier for one group; see `settlement::settle_group`.
    pub fn settle_group(&mut self, group_id: &str, round: Round) -> GameResult<Settlement> {
        settlement::settle_group(
            &self.store,
            &self.config,
            &mut self.audit_rng,
            &self.session_id,
            group_id,
            round,
        )
    }

    /// Voting barrier for one group; see `voting::assign_treatment`.
    pub fn assign_treatment(&mut self, group_id: &str) -> GameResult<TreatmentAssignment> {
        voting::assign_treatment(
            &self.store,
            &self.config,
            &mut self.override_rng,
            &self.session_id,
            group_id,
        )
    }

    // ── Queries for tooling and tests ──────────────────────────

    pub fn player(&self, player_id: &str, round: Round) -> GameResult<PlayerRecord> {
        self.store.player(&self.session_id, player_id, round)
    }

    pub fn progress(&self, player_id: &str, round: Round) -> GameResult<Progress> {
        Ok(self.player(player_id, round)?.progress())
    }

    pub fn group(&self, group_id: &str, round: Round) -> GameResult<GroupRecord> {
        self.store.group(&self.session_id, group_id, round)
    }

    pub fn current_puzzle(
        &self,
        player_id: &str,
        round: Round,
    ) -> GameResult<Option<PuzzleRecord>> {
        let player = self.player(player_id, round)?;
        PuzzleSession::new(&self.store, &self.config, self.provider.as_ref()).current(&player)
    }

    pub fn events_for_round(&self, round: Round) -> GameResult<Vec<EventLogEntry>> {
        self.store.events_for_round(&self.session_id, round)
    }

    pub fn count_events(&self, event_type: &str) -> GameResult<i64> {
        self.store.count_events(&self.session_id, event_type)
    }
}
