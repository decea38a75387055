use thiserror::Error;

use crate::models::PlayerId;

/// Errors surfaced by the matching core and the player registry
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Insufficient players: {available} available, {required} required")]
    InsufficientPlayers { available: usize, required: usize },

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("No compatible group of {goal_size} players")]
    NoCompatibleGroup { goal_size: usize },

    #[error("Search budget exceeded after {expansions} expansions")]
    SearchBudgetExceeded { expansions: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Player already registered: {0}")]
    DuplicatePlayer(PlayerId),

    #[error("Unknown match: {0}")]
    UnknownMatch(uuid::Uuid),

    #[error("Outcome already reported for match {0}")]
    DuplicateOutcome(uuid::Uuid),

    #[error("Player {0} cannot play against themselves")]
    SelfMatch(PlayerId),

    #[error("Match request cancelled")]
    Cancelled,

    #[error("Match task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl From<validator::ValidationErrors> for MatchError {
    fn from(errors: validator::ValidationErrors) -> Self {
        MatchError::InvalidRequest(errors.to_string())
    }
}

impl MatchError {
    /// Whether the orchestrator should try the next strategy instead of failing
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MatchError::SearchBudgetExceeded { .. } | MatchError::NoCompatibleGroup { .. }
        )
    }
}
