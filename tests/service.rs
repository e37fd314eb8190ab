//! End-to-end tests through the async service and the in-memory store.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use football_tournament_bot::logic::{PlayoffOutcome, PlayoffResult};
use football_tournament_bot::models::{Place, TournamentStat};
use football_tournament_bot::notify::LogNotifier;
use football_tournament_bot::store::StoreResult;
use football_tournament_bot::{
    ErrorKind, MemoryStore, Participant, Phase, PlayoffStage, RoundSlot, Settings, Store,
    StoreError, TeamCategory, Tournament, TournamentError, TournamentId, TournamentService, UserId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

const NAMES: [&str; 5] = ["Anna", "Boris", "Clara", "Dmitri", "Elena"];

/// Delegates to a [`MemoryStore`] but refuses season writes for one participant until recovered.
struct FailingSeasonStore {
    inner: MemoryStore,
    reject: Mutex<Option<String>>,
}

impl FailingSeasonStore {
    fn rejecting(name: &str) -> Self {
        Self {
            inner: MemoryStore::new(),
            reject: Mutex::new(Some(name.to_string())),
        }
    }

    fn recover(&self) {
        *self.reject.lock().unwrap() = None;
    }
}

#[async_trait]
impl Store for FailingSeasonStore {
    async fn insert_tournament(&self, t: &Tournament) -> StoreResult<()> {
        self.inner.insert_tournament(t).await
    }
    async fn get_tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        self.inner.get_tournament(id).await
    }
    async fn find_active_tournament(&self) -> StoreResult<Option<Tournament>> {
        self.inner.find_active_tournament().await
    }
    async fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        self.inner.list_tournaments().await
    }
    async fn update_tournament(&self, t: &Tournament) -> StoreResult<()> {
        self.inner.update_tournament(t).await
    }
    async fn delete_tournament(&self, id: TournamentId) -> StoreResult<()> {
        self.inner.delete_tournament(id).await
    }
    async fn next_tournament_number(&self, date: NaiveDate) -> StoreResult<u32> {
        self.inner.next_tournament_number(date).await
    }
    async fn add_participant(&self, p: &Participant) -> StoreResult<()> {
        self.inner.add_participant(p).await
    }
    async fn participant_exists(&self, name: &str) -> StoreResult<bool> {
        self.inner.participant_exists(name).await
    }
    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        self.inner.list_participants().await
    }
    async fn apply_season_record(&self, name: &str, stat: &TournamentStat) -> StoreResult<()> {
        if self.reject.lock().unwrap().as_deref() == Some(name) {
            return Err(StoreError::Backend("disk full".into()));
        }
        self.inner.apply_season_record(name, stat).await
    }
    async fn add_team_category(&self, c: &TeamCategory) -> StoreResult<()> {
        self.inner.add_team_category(c).await
    }
    async fn get_team_category(&self, name: &str) -> StoreResult<Option<TeamCategory>> {
        self.inner.get_team_category(name).await
    }
    async fn list_team_categories(&self) -> StoreResult<Vec<TeamCategory>> {
        self.inner.list_team_categories().await
    }
    async fn remove_team_category(&self, name: &str) -> StoreResult<()> {
        self.inner.remove_team_category(name).await
    }
    async fn is_admin(&self, user_id: UserId) -> StoreResult<bool> {
        Store::is_admin(&self.inner, user_id).await
    }
    async fn add_admin(&self, user_id: UserId) -> StoreResult<()> {
        self.inner.add_admin(user_id).await
    }
    async fn remove_admin(&self, user_id: UserId) -> StoreResult<()> {
        self.inner.remove_admin(user_id).await
    }
}

fn service_with(store: Arc<dyn Store>) -> TournamentService {
    TournamentService::new(store, Arc::new(LogNotifier), Settings::default())
}

/// Registers participants and a category, then starts a 5-team tournament.
async fn started(service: &TournamentService) -> (TournamentId, Vec<String>) {
    for name in NAMES {
        service.add_participant(name).await.unwrap();
    }
    service
        .add_team_category("Clubs,Arsenal,Barcelona,Chelsea,Dortmund,Everton,Fiorentina")
        .await
        .unwrap();
    let t = service.create_tournament(Utc::now()).await.unwrap();
    for name in NAMES {
        let (_, added) = service.toggle_participant(t.id, name).await.unwrap();
        assert!(added);
    }
    service.set_team_category(t.id, "Clubs").await.unwrap();
    let t = service
        .start_tournament(t.id, &mut StdRng::seed_from_u64(5))
        .await
        .unwrap();
    let teams = t.teams().iter().map(|s| s.to_string()).collect();
    (t.id, teams)
}

/// Plays the full round robin so the ranking follows participant order, then opens the playoff.
async fn to_playoff(service: &TournamentService, id: TournamentId, teams: &[String]) {
    for i in 0..teams.len() {
        for j in (i + 1)..teams.len() {
            service
                .record_group_match(id, &teams[i], &teams[j], 1, 0)
                .await
                .unwrap();
        }
    }
    service.start_playoff(id).await.unwrap();
}

fn result(stage: PlayoffStage, team1: &str, team2: &str, s1: u32, s2: u32) -> PlayoffResult {
    PlayoffResult {
        stage,
        team1: team1.to_string(),
        team2: team2.to_string(),
        score1: s1,
        score2: s2,
        extra_time: false,
        penalties: None,
    }
}

#[tokio::test]
async fn full_tournament_updates_the_season() {
    let service = service_with(Arc::new(MemoryStore::new()));
    let (id, teams) = started(&service).await;

    let err = service.start_playoff(id).await.unwrap_err();
    assert!(matches!(err, TournamentError::Stage(_)));

    to_playoff(&service, id, &teams).await;
    service
        .record_playoff_match(id, &result(PlayoffStage::Quarter, &teams[2], &teams[3], 0, 2))
        .await
        .unwrap();
    service
        .record_playoff_match(id, &result(PlayoffStage::Semi, &teams[1], &teams[3], 2, 0))
        .await
        .unwrap();
    let outcome = service
        .record_playoff_match(id, &result(PlayoffStage::Final, &teams[0], &teams[1], 0, 1))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        PlayoffOutcome::Champion {
            winner: teams[1].clone()
        }
    );

    let t = service.tournament(id).await.unwrap();
    assert_eq!(t.phase(), Phase::Completed);
    assert!(service.active_tournament().await.unwrap().is_none());

    let table = service.season_table().await.unwrap();
    let names: Vec<&str> = table.iter().map(|p| p.name.as_str()).collect();
    // Boris 8+2, Anna 4+2, Dmitri 2 (semifinal loser, fourth in the group), Clara 2 (bonus only).
    assert_eq!(names, ["Boris", "Anna", "Clara", "Dmitri", "Elena"]);
    assert_eq!(table[0].stats.total_points, 10);
    assert_eq!(table[1].stats.total_points, 6);
    assert_eq!(table[2].stats.total_points, 2);
    assert_eq!(table[3].stats.total_points, 2);
    assert_eq!(table[3].stats.history[0].place, Place::Third);
    assert!(table.iter().all(|p| p.stats.tournaments_played == 1));
}

#[tokio::test]
async fn failed_season_update_restores_the_tournament() {
    let store = Arc::new(FailingSeasonStore::rejecting("Clara"));
    let service = service_with(store.clone());
    let (id, teams) = started(&service).await;
    to_playoff(&service, id, &teams).await;
    service
        .record_playoff_match(id, &result(PlayoffStage::Quarter, &teams[2], &teams[3], 1, 0))
        .await
        .unwrap();
    service
        .record_playoff_match(id, &result(PlayoffStage::Semi, &teams[1], &teams[2], 1, 0))
        .await
        .unwrap();
    let before = service.tournament(id).await.unwrap();

    let err = service
        .record_playoff_match(id, &result(PlayoffStage::Final, &teams[0], &teams[1], 1, 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);

    let after = service.tournament(id).await.unwrap();
    assert_eq!(after, before);
    let playoff = after.playoff.as_ref().unwrap();
    assert!(matches!(playoff.final_match, RoundSlot::Pending { .. }));
    assert!(playoff.winner.is_none());
    assert!(after.active && !after.completed);
}

#[tokio::test]
async fn retried_final_counts_the_season_once() {
    let store = Arc::new(FailingSeasonStore::rejecting("Clara"));
    let service = service_with(store.clone());
    let (id, teams) = started(&service).await;
    to_playoff(&service, id, &teams).await;
    service
        .record_playoff_match(id, &result(PlayoffStage::Quarter, &teams[2], &teams[3], 1, 0))
        .await
        .unwrap();
    service
        .record_playoff_match(id, &result(PlayoffStage::Semi, &teams[1], &teams[2], 1, 0))
        .await
        .unwrap();
    let last = result(PlayoffStage::Final, &teams[0], &teams[1], 1, 0);

    let err = service.record_playoff_match(id, &last).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);

    store.recover();
    let outcome = service.record_playoff_match(id, &last).await.unwrap();
    assert_eq!(
        outcome,
        PlayoffOutcome::Champion {
            winner: teams[0].clone()
        }
    );
    assert_eq!(service.tournament(id).await.unwrap().phase(), Phase::Completed);

    let table = service.season_table().await.unwrap();
    assert_eq!(table.len(), NAMES.len());
    for participant in &table {
        assert_eq!(participant.stats.tournaments_played, 1, "{}", participant.name);
        assert_eq!(participant.stats.history.len(), 1, "{}", participant.name);
    }
    let anna = table.iter().find(|p| p.name == "Anna").unwrap();
    assert_eq!(anna.stats.total_points, 10);
}

#[tokio::test]
async fn only_one_tournament_can_run() {
    let service = service_with(Arc::new(MemoryStore::new()));
    let (_, _) = started(&service).await;

    let err = service.create_tournament(Utc::now()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn tournaments_are_numbered_per_day() {
    let service = service_with(Arc::new(MemoryStore::new()));
    let now = Utc::now();
    let first = service.create_tournament(now).await.unwrap();
    let second = service.create_tournament(now).await.unwrap();
    let date = now.format("%Y-%m-%d").to_string();
    assert_eq!(first.name, format!("{date} Tournament #1"));
    assert_eq!(second.name, format!("{date} Tournament #2"));
    assert_eq!(first.min_participants, 5);
    assert_eq!(first.max_participants, 6);
}

#[tokio::test]
async fn registries_reject_bad_input() {
    let service = service_with(Arc::new(MemoryStore::new()));

    let err = service.add_participant("R2D2").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    service.add_participant("Anna").await.unwrap();
    let err = service.add_participant("Anna").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = service.add_team_category("Empty").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    service.add_team_category("Clubs, Arsenal, Chelsea").await.unwrap();
    let categories = service.team_categories().await.unwrap();
    assert_eq!(categories[0].teams, ["Arsenal", "Chelsea"]);
    service.remove_team_category("Clubs").await.unwrap();
    let err = service.remove_team_category("Clubs").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let t = service.create_tournament(Utc::now()).await.unwrap();
    let err = service.toggle_participant(t.id, "Nobody").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = service.set_team_category(t.id, "Clubs").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service.delete_tournament(uuid::Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn failed_operations_leave_storage_untouched() {
    let service = service_with(Arc::new(MemoryStore::new()));
    let (id, teams) = started(&service).await;
    service
        .record_group_match(id, &teams[0], &teams[1], 1, 1)
        .await
        .unwrap();
    let before = service.tournament(id).await.unwrap();

    let err = service
        .record_group_match(id, &teams[1], &teams[0], 3, 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(service.tournament(id).await.unwrap(), before);

    let deleted = service.delete_last_match(id).await.unwrap();
    assert_eq!(deleted.removed.team1, teams[0]);
    let t = service.tournament(id).await.unwrap();
    assert!(t.matches.is_empty());
}

#[tokio::test]
async fn reaper_removes_stale_setups_only() {
    let service = service_with(Arc::new(MemoryStore::new()));
    let now = Utc::now();
    let stale = service
        .create_tournament(now - Duration::hours(30))
        .await
        .unwrap();
    let fresh = service
        .create_tournament(now - Duration::hours(2))
        .await
        .unwrap();

    let reapable = service.reapable_tournaments(now).await.unwrap();
    assert_eq!(reapable.len(), 1);
    assert_eq!(reapable[0].id, stale.id);

    assert_eq!(service.reap(now).await.unwrap(), 1);
    assert!(service.tournament(stale.id).await.is_err());
    assert!(service.tournament(fresh.id).await.is_ok());
}

#[tokio::test]
async fn catalog_seeding_skips_known_categories() {
    let service = service_with(Arc::new(MemoryStore::new()));
    service.add_team_category("Clubs,Arsenal,Chelsea").await.unwrap();
    let added = service
        .seed_categories(vec![
            TeamCategory::new("Clubs", vec!["Everton".into()]),
            TeamCategory::new("Nations", vec!["Brazil".into(), "France".into()]),
        ])
        .await
        .unwrap();
    assert_eq!(added, 1);
    assert_eq!(service.team_categories().await.unwrap().len(), 2);
}
