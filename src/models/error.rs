//! EngineError: the single error type returned by every engine operation.

use crate::models::team::Group;
use uuid::Uuid;

/// Errors that can occur during scheduling, draw, and match operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EngineError {
    /// Missing or malformed required field (caller error, never retried).
    Validation(String),
    /// Stage, team, match, or event id does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// A draw needs at least two teams linked to the stage.
    InsufficientTeams { found: usize },
    /// One of the groups has no teams; the fixture generator needs both.
    EmptyGroup(Group),
    /// No matches exist for the stage.
    NoMatches,
    /// The store could not be reached or is in a broken state.
    StoreUnavailable(String),
    /// The external finals generator reported a failure (payload verbatim).
    DelegateFailed(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        EngineError::NotFound { entity, id }
    }

    /// Stable taxonomy code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "VALIDATION_FAILED",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::InsufficientTeams { .. } => "INSUFFICIENT_TEAMS",
            EngineError::EmptyGroup(_) => "EMPTY_GROUP",
            EngineError::NoMatches => "NO_MATCHES",
            EngineError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            EngineError::DelegateFailed(_) => "DELEGATE_FAILED",
        }
    }

    /// True when the whole operation may simply be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::StoreUnavailable(_))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            EngineError::NotFound { entity, id } => write!(f, "{} {} not found", entity, id),
            EngineError::InsufficientTeams { found } => {
                write!(f, "Insufficient teams for a draw (need at least 2, found {})", found)
            }
            EngineError::EmptyGroup(group) => write!(f, "Group {} has no teams", group),
            EngineError::NoMatches => write!(f, "No matches found for stage"),
            EngineError::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            EngineError::DelegateFailed(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EngineError {}
