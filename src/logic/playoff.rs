//! Playoff bracket: seeding from the group ranking and advancing match by match.
//!
//! Seed 3 plays seed 4 in the quarterfinal, the winner meets seed 2 in the semifinal,
//! and that winner meets seed 1 in the final.

use crate::error::{Result, TournamentError};
use crate::logic::standings::{group_stage_complete, ranked_standings};
use crate::models::{Match, Phase, Playoff, PlayoffStage, RoundSlot, Tournament};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A playoff result as submitted by the match-entry conversation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayoffResult {
    /// Round the submitter is entering a result for.
    pub stage: PlayoffStage,
    pub team1: String,
    pub team2: String,
    /// Goals, including extra time when `extra_time` is set.
    pub score1: u32,
    pub score2: u32,
    pub extra_time: bool,
    /// Shootout score, when penalties were taken.
    pub penalties: Option<(u32, u32)>,
}

/// What happened to a submitted playoff result.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlayoffOutcome {
    /// Level after regulation: resubmit with the score after extra time.
    NeedsExtraTime,
    /// Level after extra time: resubmit with the shootout score.
    NeedsPenalties,
    /// Round decided; the winner moved on to `next`.
    Advanced {
        decided: PlayoffStage,
        winner: String,
        next: PlayoffStage,
        next_team1: String,
        next_team2: String,
    },
    /// Final decided; the tournament is complete.
    Champion { winner: String },
}

/// Open the playoff: rank the group, seed the top four and create the quarterfinal.
pub fn start_playoff(tournament: &mut Tournament) -> Result<()> {
    if !tournament.setup_completed || tournament.phase() == Phase::Draft {
        return Err(TournamentError::precondition(
            "the tournament setup is not completed",
        ));
    }
    if tournament.phase() == Phase::Completed {
        return Err(TournamentError::precondition("the tournament is already finished"));
    }
    if tournament.playoff.is_some() {
        return Err(TournamentError::conflict("the playoff has already started"));
    }
    if tournament.standings.len() < 4 {
        return Err(TournamentError::Stage(format!(
            "the playoff needs at least 4 ranked teams, the group has {}",
            tournament.standings.len()
        )));
    }
    if !group_stage_complete(tournament) {
        let teams = tournament.standings.len();
        return Err(TournamentError::Stage(format!(
            "the group stage is not complete: {} of {} matches played",
            tournament.matches.len(),
            teams * (teams - 1) / 2
        )));
    }

    let ranked = ranked_standings(tournament);
    let seeds = [
        ranked[0].team.clone(),
        ranked[1].team.clone(),
        ranked[2].team.clone(),
        ranked[3].team.clone(),
    ];
    log::info!(
        "Playoff started in {}: seeds {:?}",
        tournament.name,
        seeds
    );
    tournament.playoff = Some(Playoff::seeded(seeds));
    Ok(())
}

fn validate_result(result: &PlayoffResult) -> Result<()> {
    if let Some((p1, p2)) = result.penalties {
        if !result.extra_time {
            return Err(TournamentError::validation(
                "penalties are only taken after extra time",
            ));
        }
        if result.score1 != result.score2 {
            return Err(TournamentError::validation(
                "penalties are only taken when the score is level",
            ));
        }
        if p1 == p2 {
            return Err(TournamentError::validation(
                "a penalty shootout cannot end level",
            ));
        }
    }
    Ok(())
}

/// Apply a result to the open slot of the bracket.
///
/// A level score is not stored: the caller is asked for extra time, then for penalties.
/// A decisive result counts the match, advances the stage and wires the winner into the
/// next round; deciding the final completes the tournament.
pub fn record_playoff_match(
    tournament: &mut Tournament,
    result: &PlayoffResult,
) -> Result<PlayoffOutcome> {
    let playoff = tournament
        .playoff
        .as_mut()
        .ok_or(TournamentError::PlayoffNotStarted)?;

    match playoff.slot(result.stage) {
        None => {
            return Err(TournamentError::validation("the playoff is already over"));
        }
        Some(RoundSlot::Decided(_)) => {
            return Err(TournamentError::StageAlreadyDecided(result.stage));
        }
        Some(RoundSlot::Empty) => {
            return Err(TournamentError::conflict(format!(
                "the {} pairing is not known yet",
                result.stage
            )));
        }
        Some(RoundSlot::Pending { team1, team2 }) => {
            if *team1 != result.team1 || *team2 != result.team2 {
                return Err(TournamentError::validation(format!(
                    "{} vs {} is not the open {} ({} vs {})",
                    result.team1, result.team2, result.stage, team1, team2
                )));
            }
        }
    }
    validate_result(result)?;

    if result.penalties.is_none() && result.score1 == result.score2 {
        return Ok(if result.extra_time {
            PlayoffOutcome::NeedsPenalties
        } else {
            PlayoffOutcome::NeedsExtraTime
        });
    }

    let (penalty_score1, penalty_score2) = result.penalties.unwrap_or((0, 0));
    let decided = Match {
        team1: result.team1.clone(),
        team2: result.team2.clone(),
        score1: result.score1,
        score2: result.score2,
        extra_time: result.extra_time,
        penalties: result.penalties.is_some(),
        penalty_score1,
        penalty_score2,
        date: Utc::now(),
        counted: true,
    };
    let winner = decided
        .winner_team()
        .map(str::to_string)
        .ok_or_else(|| TournamentError::validation("the result has no winner"))?;

    let stage = result.stage;
    if let Some(slot) = playoff.slot_mut(stage) {
        *slot = RoundSlot::Decided(decided);
    }
    playoff.stage = stage.next();
    log::info!("Playoff {} decided: {} goes through", stage, winner);

    let next = playoff.stage;
    if let Some(bye) = playoff.bye_team(next).map(str::to_string) {
        if let Some(slot) = playoff.slot_mut(next) {
            *slot = RoundSlot::pending(bye.clone(), winner.clone());
        }
        return Ok(PlayoffOutcome::Advanced {
            decided: stage,
            winner: winner.clone(),
            next,
            next_team1: bye,
            next_team2: winner,
        });
    }

    playoff.winner = Some(winner.clone());
    tournament.active = false;
    tournament.completed = true;
    log::info!("Tournament {} won by {}", tournament.name, winner);
    Ok(PlayoffOutcome::Champion { winner })
}

/// Undo the most recently decided playoff round.
///
/// The slot goes back to pending and every later round is rebuilt empty from the seeds.
pub fn delete_last_playoff_match(tournament: &mut Tournament) -> Result<(PlayoffStage, Match)> {
    if tournament.completed {
        return Err(TournamentError::precondition(
            "the tournament is completed; its results are final",
        ));
    }
    let playoff = tournament
        .playoff
        .as_mut()
        .ok_or(TournamentError::PlayoffNotStarted)?;
    let stage = playoff
        .last_decided()
        .ok_or_else(|| TournamentError::not_found("playoff match"))?;

    let removed = match playoff.slot_mut(stage) {
        Some(slot) => match std::mem::take(slot) {
            RoundSlot::Decided(m) => {
                *slot = RoundSlot::pending(m.team1.clone(), m.team2.clone());
                m
            }
            other => {
                *slot = other;
                return Err(TournamentError::not_found("playoff match"));
            }
        },
        None => return Err(TournamentError::not_found("playoff match")),
    };
    for later in [PlayoffStage::Semi, PlayoffStage::Final] {
        if later > stage {
            if let Some(slot) = playoff.slot_mut(later) {
                *slot = RoundSlot::Empty;
            }
        }
    }
    playoff.stage = stage;
    playoff.winner = None;
    log::info!(
        "Deleted playoff {} result {} {}-{} {}",
        stage,
        removed.team1,
        removed.score1,
        removed.score2,
        removed.team2
    );
    Ok((stage, removed))
}
