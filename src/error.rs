//! Error taxonomy for tournament operations.

use crate::models::PlayoffStage;
use crate::store::StoreError;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TournamentError>;

/// Broad class of a [`TournamentError`], used by the request boundary to pick a reply.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Invalid state for the requested transition; nothing was changed.
    Precondition,
    /// Malformed user input; the caller should re-prompt.
    Validation,
    /// Unknown tournament, participant, team or category.
    NotFound,
    /// The request collides with existing state.
    Conflict,
    /// A collaborator failed.
    Storage,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("{0}")]
    Precondition(String),

    #[error("not enough teams in the category: {needed} needed, {available} available")]
    InsufficientTeams { needed: usize, available: usize },

    /// The group stage is not in a state that allows the playoff to start.
    #[error("{0}")]
    Stage(String),

    #[error("playoff has not started")]
    PlayoffNotStarted,

    #[error("the {0} has already been decided")]
    StageAlreadyDecided(PlayoffStage),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("a match entry is already in progress; finish it or /cancel first")]
    ConversationInProgress,

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            Precondition(_) | InsufficientTeams { .. } | Stage(_) | PlayoffNotStarted => {
                ErrorKind::Precondition
            }
            Validation(_) => ErrorKind::Validation,
            NotFound(_) => ErrorKind::NotFound,
            Conflict(_) | ConversationInProgress | StageAlreadyDecided(_) => ErrorKind::Conflict,
            Storage(StoreError::NotFound(_)) => ErrorKind::NotFound,
            Storage(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
