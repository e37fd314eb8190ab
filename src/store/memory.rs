//! In-process store backed by hash maps.

use super::{Store, StoreError, StoreResult};
use crate::models::{Participant, TeamCategory, Tournament, TournamentId, TournamentStat, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    tournaments: HashMap<TournamentId, Tournament>,
    day_counters: HashMap<NaiveDate, u32>,
    participants: HashMap<String, Participant>,
    categories: HashMap<String, TeamCategory>,
    admins: HashSet<UserId>,
}

/// Keeps everything in memory; contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with bootstrap admins.
    pub fn with_admins(admins: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            state: RwLock::new(State {
                admins: admins.into_iter().collect(),
                ..State::default()
            }),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_tournament(&self, tournament: &Tournament) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.tournaments.contains_key(&tournament.id) {
            return Err(StoreError::Duplicate(format!("tournament {}", tournament.id)));
        }
        state.tournaments.insert(tournament.id, tournament.clone());
        Ok(())
    }

    async fn get_tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.state.read().await.tournaments.get(&id).cloned())
    }

    async fn find_active_tournament(&self) -> StoreResult<Option<Tournament>> {
        let state = self.state.read().await;
        Ok(state.tournaments.values().find(|t| t.active).cloned())
    }

    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        let state = self.state.read().await;
        let mut tournaments: Vec<Tournament> = state.tournaments.values().cloned().collect();
        tournaments.sort_by_key(|t| t.created_at);
        Ok(tournaments)
    }

    async fn update_tournament(&self, tournament: &Tournament) -> StoreResult<()> {
        let mut state = self.state.write().await;
        match state.tournaments.get_mut(&tournament.id) {
            Some(stored) => {
                *stored = tournament.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("tournament {}", tournament.id))),
        }
    }

    async fn delete_tournament(&self, id: TournamentId) -> StoreResult<()> {
        self.state
            .write()
            .await
            .tournaments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("tournament {id}")))
    }

    async fn next_tournament_number(&self, date: NaiveDate) -> StoreResult<u32> {
        let mut state = self.state.write().await;
        let counter = state.day_counters.entry(date).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn add_participant(&self, participant: &Participant) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.participants.contains_key(&participant.name) {
            return Err(StoreError::Duplicate(format!(
                "participant {}",
                participant.name
            )));
        }
        state
            .participants
            .insert(participant.name.clone(), participant.clone());
        Ok(())
    }

    async fn participant_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.state.read().await.participants.contains_key(name))
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        let state = self.state.read().await;
        let mut participants: Vec<Participant> = state.participants.values().cloned().collect();
        participants.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(participants)
    }

    async fn apply_season_record(&self, name: &str, stat: &TournamentStat) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let participant = state
            .participants
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(format!("participant {name}")))?;
        if participant
            .stats
            .history
            .iter()
            .any(|s| s.tournament_id == stat.tournament_id)
        {
            log::debug!(
                "Season record of {} already holds tournament {}",
                name,
                stat.tournament_id
            );
            return Ok(());
        }
        participant.stats.apply(stat.clone());
        Ok(())
    }

    async fn add_team_category(&self, category: &TeamCategory) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.categories.contains_key(&category.name) {
            return Err(StoreError::Duplicate(format!("category {}", category.name)));
        }
        state
            .categories
            .insert(category.name.clone(), category.clone());
        Ok(())
    }

    async fn get_team_category(&self, name: &str) -> StoreResult<Option<TeamCategory>> {
        Ok(self.state.read().await.categories.get(name).cloned())
    }

    async fn list_team_categories(&self) -> StoreResult<Vec<TeamCategory>> {
        let state = self.state.read().await;
        let mut categories: Vec<TeamCategory> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn remove_team_category(&self, name: &str) -> StoreResult<()> {
        self.state
            .write()
            .await
            .categories
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("category {name}")))
    }

    async fn is_admin(&self, user_id: UserId) -> StoreResult<bool> {
        Ok(self.state.read().await.admins.contains(&user_id))
    }

    async fn add_admin(&self, user_id: UserId) -> StoreResult<()> {
        if !self.state.write().await.admins.insert(user_id) {
            return Err(StoreError::Duplicate(format!("admin {user_id}")));
        }
        Ok(())
    }

    async fn remove_admin(&self, user_id: UserId) -> StoreResult<()> {
        if !self.state.write().await.admins.remove(&user_id) {
            return Err(StoreError::NotFound(format!("admin {user_id}")));
        }
        Ok(())
    }
}
