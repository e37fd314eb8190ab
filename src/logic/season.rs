//! Season statistics: what one completed tournament contributes to each participant.

use crate::error::{Result, TournamentError};
use crate::logic::standings::ranked_standings;
use crate::models::{Match, Participant, Place, Tournament, TournamentStat};

pub const POINTS_FIRST: u32 = 8;
pub const POINTS_SECOND: u32 = 4;
pub const POINTS_THIRD: u32 = 2;
/// Extra points for finishing the group stage in the top three.
pub const GROUP_TOP_THREE_BONUS: u32 = 2;

fn place_of(tournament: &Tournament, team: &str) -> Place {
    let Some(playoff) = tournament.playoff.as_ref() else {
        return Place::Group;
    };
    if playoff.winner.as_deref() == Some(team) {
        return Place::First;
    }
    if let Some(m) = playoff.final_match.decided() {
        if m.loser_team() == Some(team) {
            return Place::Second;
        }
    }
    if let Some(m) = playoff.semi_final.decided() {
        if m.loser_team() == Some(team) {
            return Place::Third;
        }
    }
    Place::Group
}

fn placement_points(place: Place) -> u32 {
    match place {
        Place::First => POINTS_FIRST,
        Place::Second => POINTS_SECOND,
        Place::Third => POINTS_THIRD,
        Place::Group => 0,
    }
}

fn fold_matches<'a>(stat: &mut TournamentStat, team: &str, matches: impl Iterator<Item = &'a Match>) {
    for m in matches {
        let Some((scored, conceded)) = m.goals_for(team) else {
            continue;
        };
        stat.goals_scored += scored;
        stat.goals_conceded += conceded;
        stat.matches_played += 1;
        match m.winner_team() {
            Some(w) if w == team => stat.wins += 1,
            Some(_) => stat.losses += 1,
            None => stat.draws += 1,
        }
    }
}

/// Per-participant contribution of a completed tournament, in participant order.
///
/// Counted group matches and decided playoff matches both count; placement points
/// and the group bonus are added on top.
pub fn tournament_stats(tournament: &Tournament) -> Result<Vec<(String, TournamentStat)>> {
    if !tournament.completed {
        return Err(TournamentError::precondition(
            "season statistics are only collected from completed tournaments",
        ));
    }
    let top_three: Vec<String> = ranked_standings(tournament)
        .into_iter()
        .take(3)
        .map(|s| s.team)
        .collect();

    let mut stats = Vec::with_capacity(tournament.participants.len());
    for participant in &tournament.participants {
        let Some(team) = tournament.team_of(participant) else {
            continue;
        };
        let place = place_of(tournament, team);
        let mut stat = TournamentStat {
            tournament_id: tournament.id,
            place,
            points: placement_points(place),
            goals_scored: 0,
            goals_conceded: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            matches_played: 0,
        };
        if top_three.iter().any(|t| t == team) {
            stat.points += GROUP_TOP_THREE_BONUS;
        }
        fold_matches(
            &mut stat,
            team,
            tournament.matches.iter().filter(|m| m.counted),
        );
        if let Some(playoff) = tournament.playoff.as_ref() {
            fold_matches(&mut stat, team, playoff.decided_matches().map(|(_, m)| m));
        }
        stats.push((participant.clone(), stat));
    }
    Ok(stats)
}

/// Participants ordered for the season rating: total points, then name.
pub fn season_table(mut participants: Vec<Participant>) -> Vec<Participant> {
    participants.sort_by(|a, b| {
        b.stats
            .total_points
            .cmp(&a.stats.total_points)
            .then_with(|| a.name.cmp(&b.name))
    });
    participants
}
