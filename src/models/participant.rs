//! Participant and season-long statistics.

use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};

/// Final placement of a participant in one tournament.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Place {
    First,
    Second,
    Third,
    /// Did not reach the last three.
    Group,
}

/// One tournament's contribution to a participant's season.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentStat {
    pub tournament_id: TournamentId,
    pub place: Place,
    pub points: u32,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub matches_played: u32,
}

/// Cumulative season record.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub total_points: u32,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub matches_played: u32,
    pub tournaments_played: u32,
    pub history: Vec<TournamentStat>,
}

impl SeasonStats {
    /// Add one tournament's totals and append it to the history.
    pub fn apply(&mut self, stat: TournamentStat) {
        self.total_points += stat.points;
        self.goals_scored += stat.goals_scored;
        self.goals_conceded += stat.goals_conceded;
        self.wins += stat.wins;
        self.losses += stat.losses;
        self.draws += stat.draws;
        self.matches_played += stat.matches_played;
        self.tournaments_played += 1;
        self.history.push(stat);
    }
}

/// A registered player who can join tournaments.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub stats: SeasonStats,
}

impl Participant {
    /// Create a participant with an empty season record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: SeasonStats::default(),
        }
    }

    /// Participant names: letters (Latin or Cyrillic) and spaces only.
    pub fn is_valid_name(name: &str) -> bool {
        let name = name.trim();
        !name.is_empty()
            && name.chars().all(|c| {
                c == ' ' || c.is_ascii_alphabetic() || matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
            })
    }
}
