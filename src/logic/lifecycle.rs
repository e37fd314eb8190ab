//! Phase-level operations: naming, undoing the last result, and reaping idle tournaments.

use crate::error::{Result, TournamentError};
use crate::logic::playoff::delete_last_playoff_match;
use crate::logic::standings::delete_last_group_match;
use crate::models::{Match, Phase, PlayoffStage, Tournament};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Display name of the `number`-th tournament created on `date`.
pub fn tournament_name(date: NaiveDate, number: u32) -> String {
    format!("{} Tournament #{}", date.format("%Y-%m-%d"), number)
}

/// A match removed by [`delete_last_match`], with the playoff round it came from.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeletedMatch {
    /// `None` for a group match.
    pub stage: Option<PlayoffStage>,
    pub removed: Match,
}

/// The result [`delete_last_match`] would remove, for confirmation prompts.
pub fn last_match(tournament: &Tournament) -> Option<(Option<PlayoffStage>, &Match)> {
    match tournament.phase() {
        Phase::Group => tournament.matches.last().map(|m| (None, m)),
        Phase::Playoff => {
            let playoff = tournament.playoff.as_ref()?;
            playoff
                .decided_matches()
                .last()
                .map(|(stage, m)| (Some(stage), m))
        }
        Phase::Draft | Phase::Completed => None,
    }
}

/// Undo the most recent result of the running stage.
pub fn delete_last_match(tournament: &mut Tournament) -> Result<DeletedMatch> {
    match tournament.phase() {
        Phase::Group => Ok(DeletedMatch {
            stage: None,
            removed: delete_last_group_match(tournament)?,
        }),
        Phase::Playoff => {
            let (stage, removed) = delete_last_playoff_match(tournament)?;
            Ok(DeletedMatch {
                stage: Some(stage),
                removed,
            })
        }
        Phase::Draft => Err(TournamentError::precondition(
            "the tournament has not started; there are no results to delete",
        )),
        Phase::Completed => Err(TournamentError::precondition(
            "the tournament is completed; its results are final",
        )),
    }
}

/// Tournaments left unstarted or abandoned past `threshold` are eligible for deletion.
/// Completed tournaments are kept for the season history.
pub fn is_reapable(tournament: &Tournament, now: DateTime<Utc>, threshold: Duration) -> bool {
    !tournament.completed
        && (!tournament.setup_completed || !tournament.active)
        && now - tournament.created_at > threshold
}
