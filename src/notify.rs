//! Structured notifications about tournament progress.

use crate::logic::PlayoffOutcome;
use crate::models::{Match, Participant, PlayoffStage, Standing, Tournament, TournamentId};
use async_trait::async_trait;
use serde::Serialize;

/// Snapshot emitted after a successful state change.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    TournamentStarted {
        tournament_id: TournamentId,
        name: String,
        /// Participant and drawn team, in participant order.
        assignments: Vec<(String, String)>,
    },
    MatchRecorded {
        tournament_id: TournamentId,
        game: Match,
        standings: Vec<Standing>,
    },
    PlayoffStarted {
        tournament_id: TournamentId,
        seeds: [String; 4],
    },
    PlayoffMatchRecorded {
        tournament_id: TournamentId,
        stage: PlayoffStage,
        outcome: PlayoffOutcome,
    },
    TournamentCompleted {
        tournament_id: TournamentId,
        winner: String,
    },
    SeasonUpdated {
        table: Vec<Participant>,
    },
}

impl Notification {
    pub fn tournament_started(tournament: &Tournament) -> Self {
        Notification::TournamentStarted {
            tournament_id: tournament.id,
            name: tournament.name.clone(),
            assignments: tournament
                .participants
                .iter()
                .filter_map(|p| tournament.team_of(p).map(|t| (p.clone(), t.to_string())))
                .collect(),
        }
    }
}

/// Receives notifications; delivery failures are the implementor's concern.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Writes each notification to the log as JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) {
        match serde_json::to_string(&notification) {
            Ok(json) => log::info!("notification: {}", json),
            Err(e) => log::warn!("Failed to serialize notification: {}", e),
        }
    }
}
