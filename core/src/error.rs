use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    #[error("Player '{0}' not found in round {1}")]
    PlayerNotFound(String, u32),

    #[error("Group '{0}' not found in round {1}")]
    GroupNotFound(String, u32),

    #[error("No treatment assigned for group '{0}'")]
    TreatmentNotAssigned(String),

    #[error("'{op}' is not valid in round {round}")]
    WrongRound { op: &'static str, round: u32 },

    #[error("{0} already ran for this group and round")]
    BarrierAlreadyRun(&'static str),

    // ── Live protocol violations ───────────────────────────────
    // Each of these aborts the interaction; none is ever coerced
    // into a valid state.
    #[error("trying to skip over unsolved puzzle")]
    PuzzleUnanswered,

    #[error("requesting next puzzle too fast")]
    PuzzleDelay,

    #[error("trying to answer no puzzle")]
    NoCurrentPuzzle,

    #[error("no more attempts allowed")]
    AttemptsExhausted,

    #[error("retrying too fast")]
    RetryDelay,

    #[error("bogus answer")]
    EmptyAnswer,

    #[error("unrecognized message from client")]
    UnknownMessage,

    #[error("non-genuine round submission by player '{0}'")]
    IntegrityViolation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
