//! Async orchestration: load a tournament, apply one operation, write it back.
//!
//! Every mutation runs under a single advisory lock and works on a loaded copy, so a
//! failed operation leaves storage untouched.

use crate::catalog::parse_category;
use crate::config::Settings;
use crate::error::{Result, TournamentError};
use crate::logic::{self, DeletedMatch, PlayoffOutcome, PlayoffResult};
use crate::models::{
    Match, Participant, Playoff, PlayoffStage, TeamCategory, Tournament, TournamentId, UserId,
};
use crate::notify::{Notification, Notifier};
use crate::store::{Store, StoreError};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;

fn duplicate_as_conflict(e: StoreError) -> TournamentError {
    match e {
        StoreError::Duplicate(what) => TournamentError::conflict(format!("{what} already exists")),
        other => TournamentError::Storage(other),
    }
}

pub struct TournamentService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    settings: Settings,
    lock: Mutex<()>,
}

impl TournamentService {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, settings: Settings) -> Self {
        Self {
            store,
            notifier,
            settings,
            lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub async fn tournament(&self, id: TournamentId) -> Result<Tournament> {
        self.store
            .get_tournament(id)
            .await?
            .ok_or_else(|| TournamentError::not_found(format!("tournament {id}")))
    }

    pub async fn active_tournament(&self) -> Result<Option<Tournament>> {
        Ok(self.store.find_active_tournament().await?)
    }

    /// The active tournament, or else the newest one still in setup.
    pub async fn current_tournament(&self) -> Result<Option<Tournament>> {
        if let Some(active) = self.store.find_active_tournament().await? {
            return Ok(Some(active));
        }
        let tournaments = self.store.list_tournaments().await?;
        Ok(tournaments
            .into_iter()
            .filter(|t| !t.completed)
            .max_by_key(|t| t.created_at))
    }

    // Tournament lifecycle

    pub async fn create_tournament(&self, now: DateTime<Utc>) -> Result<Tournament> {
        let _guard = self.lock.lock().await;
        if let Some(active) = self.store.find_active_tournament().await? {
            return Err(TournamentError::conflict(format!(
                "{} is still running; finish or delete it first",
                active.name
            )));
        }
        let number = self.store.next_tournament_number(now.date_naive()).await?;
        let tournament = Tournament::new(
            logic::tournament_name(now.date_naive(), number),
            self.settings.min_participants,
            self.settings.max_participants,
            now,
        );
        self.store.insert_tournament(&tournament).await?;
        log::info!("Created tournament {} ({})", tournament.name, tournament.id);
        Ok(tournament)
    }

    /// Add or remove a registered participant. Returns the tournament and whether they were added.
    pub async fn toggle_participant(
        &self,
        id: TournamentId,
        name: &str,
    ) -> Result<(Tournament, bool)> {
        let _guard = self.lock.lock().await;
        let mut tournament = self.tournament(id).await?;
        if !tournament.has_participant(name) && !self.store.participant_exists(name).await? {
            return Err(TournamentError::not_found(format!("participant {name}")));
        }
        let added = tournament.toggle_participant(name)?;
        self.store.update_tournament(&tournament).await?;
        log::debug!(
            "{} {} {}",
            name,
            if added { "joined" } else { "left" },
            tournament.name
        );
        Ok((tournament, added))
    }

    pub async fn set_team_category(&self, id: TournamentId, category: &str) -> Result<Tournament> {
        let _guard = self.lock.lock().await;
        let mut tournament = self.tournament(id).await?;
        if self.store.get_team_category(category).await?.is_none() {
            return Err(TournamentError::not_found(format!("category {category}")));
        }
        tournament.set_team_category(category)?;
        self.store.update_tournament(&tournament).await?;
        Ok(tournament)
    }

    /// Draw teams from the chosen category and open the group stage.
    pub async fn start_tournament<R: Rng + ?Sized>(
        &self,
        id: TournamentId,
        rng: &mut R,
    ) -> Result<Tournament> {
        let _guard = self.lock.lock().await;
        let mut tournament = self.tournament(id).await?;
        if let Some(active) = self.store.find_active_tournament().await? {
            if active.id != id {
                return Err(TournamentError::precondition(format!(
                    "{} is already running",
                    active.name
                )));
            }
        }
        let name = tournament
            .team_category
            .clone()
            .ok_or_else(|| TournamentError::precondition("no team category has been chosen"))?;
        let category = self
            .store
            .get_team_category(&name)
            .await?
            .ok_or_else(|| TournamentError::not_found(format!("category {name}")))?;
        logic::start_tournament(&mut tournament, &category, rng)?;
        self.store.update_tournament(&tournament).await?;
        self.notifier
            .notify(Notification::tournament_started(&tournament))
            .await;
        Ok(tournament)
    }

    pub async fn record_group_match(
        &self,
        id: TournamentId,
        team1: &str,
        team2: &str,
        score1: u32,
        score2: u32,
    ) -> Result<Match> {
        let _guard = self.lock.lock().await;
        let mut tournament = self.tournament(id).await?;
        let recorded = logic::record_group_match(&mut tournament, team1, team2, score1, score2)?;
        self.store.update_tournament(&tournament).await?;
        self.notifier
            .notify(Notification::MatchRecorded {
                tournament_id: id,
                game: recorded.clone(),
                standings: logic::ranked_standings(&tournament),
            })
            .await;
        Ok(recorded)
    }

    pub async fn start_playoff(&self, id: TournamentId) -> Result<Playoff> {
        let _guard = self.lock.lock().await;
        let mut tournament = self.tournament(id).await?;
        logic::start_playoff(&mut tournament)?;
        self.store.update_tournament(&tournament).await?;
        let playoff = tournament
            .playoff
            .clone()
            .ok_or(TournamentError::PlayoffNotStarted)?;
        self.notifier
            .notify(Notification::PlayoffStarted {
                tournament_id: id,
                seeds: playoff.seeds.clone(),
            })
            .await;
        Ok(playoff)
    }

    /// Apply a playoff result. Deciding the final completes the tournament and folds it into
    /// the season; if that fails the tournament is restored as it was before this call.
    pub async fn record_playoff_match(
        &self,
        id: TournamentId,
        result: &PlayoffResult,
    ) -> Result<PlayoffOutcome> {
        let _guard = self.lock.lock().await;
        let snapshot = self.tournament(id).await?;
        let mut tournament = snapshot.clone();
        let outcome = logic::record_playoff_match(&mut tournament, result)?;
        match outcome {
            PlayoffOutcome::NeedsExtraTime | PlayoffOutcome::NeedsPenalties => return Ok(outcome),
            PlayoffOutcome::Advanced { .. } => {
                self.store.update_tournament(&tournament).await?;
            }
            PlayoffOutcome::Champion { ref winner } => {
                self.store.update_tournament(&tournament).await?;
                if let Err(e) = self.aggregate_season(&tournament).await {
                    log::error!(
                        "Season update for {} failed, restoring the tournament: {}",
                        tournament.name,
                        e
                    );
                    if let Err(restore) = self.store.update_tournament(&snapshot).await {
                        log::error!("Failed to restore {}: {}", snapshot.name, restore);
                    }
                    return Err(e);
                }
                self.notifier
                    .notify(Notification::TournamentCompleted {
                        tournament_id: id,
                        winner: winner.clone(),
                    })
                    .await;
                let table = logic::season_table(self.store.list_participants().await?);
                self.notifier
                    .notify(Notification::SeasonUpdated { table })
                    .await;
            }
        }
        self.notifier
            .notify(Notification::PlayoffMatchRecorded {
                tournament_id: id,
                stage: result.stage,
                outcome: outcome.clone(),
            })
            .await;
        Ok(outcome)
    }

    /// Write each participant's contribution; keeps going past failures and reports the first.
    async fn aggregate_season(&self, tournament: &Tournament) -> Result<()> {
        let mut first_error = None;
        for (participant, stat) in logic::tournament_stats(tournament)? {
            if let Err(e) = self.store.apply_season_record(&participant, &stat).await {
                log::error!("Season record for {} failed: {}", participant, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(TournamentError::Storage(e)),
            None => Ok(()),
        }
    }

    pub async fn last_match(&self, id: TournamentId) -> Result<Option<(Option<PlayoffStage>, Match)>> {
        let tournament = self.tournament(id).await?;
        Ok(logic::last_match(&tournament).map(|(stage, m)| (stage, m.clone())))
    }

    pub async fn delete_last_match(&self, id: TournamentId) -> Result<DeletedMatch> {
        let _guard = self.lock.lock().await;
        let mut tournament = self.tournament(id).await?;
        let deleted = logic::delete_last_match(&mut tournament)?;
        self.store.update_tournament(&tournament).await?;
        Ok(deleted)
    }

    pub async fn delete_tournament(&self, id: TournamentId) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.store.delete_tournament(id).await?;
        log::info!("Deleted tournament {}", id);
        Ok(())
    }

    /// Idle or never-started tournaments older than the configured threshold.
    pub async fn reapable_tournaments(&self, now: DateTime<Utc>) -> Result<Vec<Tournament>> {
        let threshold = self.settings.reap_after();
        Ok(self
            .store
            .list_tournaments()
            .await?
            .into_iter()
            .filter(|t| logic::is_reapable(t, now, threshold))
            .collect())
    }

    /// Delete every reapable tournament; returns how many were removed.
    pub async fn reap(&self, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let threshold = self.settings.reap_after();
        let mut removed = 0;
        for tournament in self.store.list_tournaments().await? {
            if !logic::is_reapable(&tournament, now, threshold) {
                continue;
            }
            match self.store.delete_tournament(tournament.id).await {
                Ok(()) => {
                    log::info!("Reaped idle tournament {}", tournament.name);
                    removed += 1;
                }
                Err(e) => log::warn!("Failed to reap {}: {}", tournament.name, e),
            }
        }
        Ok(removed)
    }

    // Registries

    pub async fn add_participant(&self, name: &str) -> Result<Participant> {
        let name = name.trim();
        if !Participant::is_valid_name(name) {
            return Err(TournamentError::validation(
                "participant names may only contain letters and spaces",
            ));
        }
        let participant = Participant::new(name);
        self.store
            .add_participant(&participant)
            .await
            .map_err(duplicate_as_conflict)?;
        log::info!("Registered participant {}", name);
        Ok(participant)
    }

    pub async fn participants(&self) -> Result<Vec<Participant>> {
        Ok(self.store.list_participants().await?)
    }

    pub async fn season_table(&self) -> Result<Vec<Participant>> {
        Ok(logic::season_table(self.store.list_participants().await?))
    }

    /// Register a category from `name,team1,team2,...`.
    pub async fn add_team_category(&self, input: &str) -> Result<TeamCategory> {
        let category = parse_category(input)?;
        self.store
            .add_team_category(&category)
            .await
            .map_err(duplicate_as_conflict)?;
        log::info!(
            "Added team category {} with {} teams",
            category.name,
            category.teams.len()
        );
        Ok(category)
    }

    pub async fn remove_team_category(&self, name: &str) -> Result<()> {
        self.store.remove_team_category(name.trim()).await?;
        Ok(())
    }

    pub async fn team_categories(&self) -> Result<Vec<TeamCategory>> {
        Ok(self.store.list_team_categories().await?)
    }

    /// Add catalog categories that are not registered yet. Returns how many were added.
    pub async fn seed_categories(&self, categories: Vec<TeamCategory>) -> Result<usize> {
        let mut added = 0;
        for category in categories {
            match self.store.add_team_category(&category).await {
                Ok(()) => added += 1,
                Err(StoreError::Duplicate(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(added)
    }

    pub async fn add_admin(&self, user_id: UserId) -> Result<()> {
        self.store
            .add_admin(user_id)
            .await
            .map_err(duplicate_as_conflict)
    }

    pub async fn remove_admin(&self, user_id: UserId) -> Result<()> {
        Ok(self.store.remove_admin(user_id).await?)
    }
}
