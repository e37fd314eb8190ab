//! Storage seam for tournaments, participants, team categories and admins.

mod memory;

pub use memory::MemoryStore;

use crate::models::{Participant, TeamCategory, Tournament, TournamentId, TournamentStat, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Failures reported by a [`Store`] backend.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Abstract store trait for different storage backends.
#[async_trait]
pub trait Store: Send + Sync {
    // Tournament operations
    async fn insert_tournament(&self, tournament: &Tournament) -> StoreResult<()>;
    async fn get_tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;
    /// The tournament with `active = true`, if any.
    async fn find_active_tournament(&self) -> StoreResult<Option<Tournament>>;
    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>>;
    /// Replace the stored tournament with the same id.
    async fn update_tournament(&self, tournament: &Tournament) -> StoreResult<()>;
    async fn delete_tournament(&self, id: TournamentId) -> StoreResult<()>;
    /// Reserve the next per-day tournament number (1 for the first of the day).
    async fn next_tournament_number(&self, date: NaiveDate) -> StoreResult<u32>;

    // Participant operations
    async fn add_participant(&self, participant: &Participant) -> StoreResult<()>;
    async fn participant_exists(&self, name: &str) -> StoreResult<bool>;
    async fn list_participants(&self) -> StoreResult<Vec<Participant>>;
    /// Add one tournament to the participant's season totals and history in a single write.
    ///
    /// Idempotent per tournament: if the history already holds `stat.tournament_id`
    /// the call succeeds without changing anything.
    async fn apply_season_record(&self, name: &str, stat: &TournamentStat) -> StoreResult<()>;

    // Team category operations
    async fn add_team_category(&self, category: &TeamCategory) -> StoreResult<()>;
    async fn get_team_category(&self, name: &str) -> StoreResult<Option<TeamCategory>>;
    async fn list_team_categories(&self) -> StoreResult<Vec<TeamCategory>>;
    async fn remove_team_category(&self, name: &str) -> StoreResult<()>;

    // Admin operations
    async fn is_admin(&self, user_id: UserId) -> StoreResult<bool>;
    async fn add_admin(&self, user_id: UserId) -> StoreResult<()>;
    async fn remove_admin(&self, user_id: UserId) -> StoreResult<()>;
}

/// Decides who may run privileged commands.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn is_admin(&self, user_id: UserId) -> bool;
}

#[async_trait]
impl<S: Store + ?Sized> Authorizer for S {
    async fn is_admin(&self, user_id: UserId) -> bool {
        match Store::is_admin(self, user_id).await {
            Ok(admin) => admin,
            Err(e) => {
                log::error!("Admin lookup for {} failed: {}", user_id, e);
                false
            }
        }
    }
}
