//! Setup phase: team draw and the Draft -> Group transition.

use crate::error::{Result, TournamentError};
use crate::models::{Phase, Standing, TeamCategory, Tournament};
use rand::seq::SliceRandom;
use rand::Rng;

/// Pair each participant (in order) with a team from a uniformly shuffled copy of the pool.
pub fn draw_teams<R: Rng + ?Sized>(
    participants: &[String],
    pool: &[String],
    rng: &mut R,
) -> Result<Vec<(String, String)>> {
    if pool.len() < participants.len() {
        return Err(TournamentError::InsufficientTeams {
            needed: participants.len(),
            available: pool.len(),
        });
    }
    let mut teams = pool.to_vec();
    teams.shuffle(rng);
    Ok(participants.iter().cloned().zip(teams).collect())
}

/// Start the tournament: check the roster and category, draw teams and open the group stage.
///
/// Nothing is changed when any check fails.
pub fn start_tournament<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    category: &TeamCategory,
    rng: &mut R,
) -> Result<()> {
    if tournament.active {
        return Err(TournamentError::precondition("the tournament is already active"));
    }
    if tournament.phase() != Phase::Draft {
        return Err(TournamentError::precondition("the tournament is already finished"));
    }
    let count = tournament.participants.len();
    if count < tournament.min_participants {
        return Err(TournamentError::precondition(format!(
            "the tournament requires at least {} participants to start",
            tournament.min_participants
        )));
    }
    if count > tournament.max_participants {
        return Err(TournamentError::precondition(format!(
            "the tournament exceeds the maximum of {} participants",
            tournament.max_participants
        )));
    }
    match tournament.team_category.as_deref() {
        None => {
            return Err(TournamentError::precondition(
                "no team category has been chosen",
            ))
        }
        Some(name) if name != category.name => {
            return Err(TournamentError::precondition(format!(
                "the tournament uses category {name}, not {}",
                category.name
            )))
        }
        Some(_) => {}
    }

    let assignment = draw_teams(&tournament.participants, &category.teams, rng)?;
    tournament.standings = assignment
        .iter()
        .map(|(_, team)| Standing::new(team.clone()))
        .collect();
    tournament.participant_teams = assignment.into_iter().collect();
    tournament.matches.clear();
    tournament.playoff = None;
    tournament.active = true;
    tournament.setup_completed = true;
    log::info!(
        "Tournament {} started with {} participants ({})",
        tournament.name,
        count,
        category.name
    );
    Ok(())
}
