//! Group stage: recording results, maintaining the table and the ranking order.

use crate::error::{Result, TournamentError};
use crate::models::{Match, Phase, Standing, Tournament};
use std::cmp::Ordering;

/// Record a group-stage result and fold it into the standings.
///
/// Each pair of teams meets once: a second result for the same pairing (either order) is a conflict.
pub fn record_group_match(
    tournament: &mut Tournament,
    team1: &str,
    team2: &str,
    score1: u32,
    score2: u32,
) -> Result<Match> {
    if tournament.phase() != Phase::Group {
        return Err(TournamentError::precondition(
            "group results can only be entered while the group stage is running",
        ));
    }
    for team in [team1, team2] {
        if !tournament.has_team(team) {
            return Err(TournamentError::not_found(format!("team {team}")));
        }
    }
    if team1 == team2 {
        return Err(TournamentError::validation("a team cannot play against itself"));
    }
    if tournament.matches.iter().any(|m| m.is_between(team1, team2)) {
        return Err(TournamentError::conflict(format!(
            "the result of {team1} vs {team2} has already been recorded"
        )));
    }

    tournament.matches.push(Match::new(team1, team2, score1, score2));
    reconcile_standings(tournament);
    log::info!(
        "Group match recorded in {}: {} {}-{} {}",
        tournament.name,
        team1,
        score1,
        score2,
        team2
    );
    Ok(tournament.matches[tournament.matches.len() - 1].clone())
}

/// Fold every not-yet-counted group match into the two teams' rows and mark it counted.
///
/// Counted matches are skipped, so running this twice changes nothing.
pub fn reconcile_standings(tournament: &mut Tournament) {
    let Tournament {
        matches, standings, ..
    } = tournament;
    for m in matches.iter_mut().filter(|m| !m.counted) {
        fold_match(standings, m);
        m.counted = true;
    }
}

/// Standings derived from scratch from the counted group matches.
pub fn recompute_standings(tournament: &Tournament) -> Vec<Standing> {
    let mut rows: Vec<Standing> = tournament.teams().into_iter().map(Standing::new).collect();
    for m in tournament.matches.iter().filter(|m| m.counted) {
        fold_match(&mut rows, m);
    }
    rows
}

fn fold_match(rows: &mut [Standing], m: &Match) {
    let sides = [
        (&m.team1, m.score1, m.score2),
        (&m.team2, m.score2, m.score1),
    ];
    for (team, scored, conceded) in sides {
        if let Some(row) = rows.iter_mut().find(|s| &s.team == team) {
            row.record(scored, conceded);
        }
    }
}

/// Remove the most recently recorded group match and restore the table without it.
pub fn delete_last_group_match(tournament: &mut Tournament) -> Result<Match> {
    if tournament.phase() != Phase::Group {
        return Err(TournamentError::precondition(
            "group matches can only be deleted while the group stage is running",
        ));
    }
    let removed = tournament
        .matches
        .pop()
        .ok_or_else(|| TournamentError::not_found("group match"))?;
    tournament.standings = recompute_standings(tournament);
    log::info!(
        "Deleted group match {} {}-{} {} from {}",
        removed.team1,
        removed.score1,
        removed.score2,
        removed.team2,
        tournament.name
    );
    Ok(removed)
}

/// True once every team has met every other team.
pub fn group_stage_complete(tournament: &Tournament) -> bool {
    let opponents = tournament.standings.len().saturating_sub(1) as u32;
    !tournament.standings.is_empty() && tournament.standings.iter().all(|s| s.played == opponents)
}

/// Compares mutual results: `Greater` if `a` won more of their counted matches than `b`.
pub fn head_to_head(a: &str, b: &str, matches: &[Match]) -> Ordering {
    let (mut a_wins, mut b_wins) = (0u32, 0u32);
    for m in matches.iter().filter(|m| m.counted && m.is_between(a, b)) {
        match m.winner_team() {
            Some(w) if w == a => a_wins += 1,
            Some(_) => b_wins += 1,
            None => {}
        }
    }
    a_wins.cmp(&b_wins)
}

fn compare_records(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| b.played.cmp(&a.played))
}

/// Ranking comparator; `Less` means `a` ranks above `b`.
///
/// Points, goal difference, goals scored, matches played, head-to-head wins, then team name.
///
/// Not transitive when head-to-head results form a cycle, so do not hand it to `sort_by`;
/// rank a table through [`rank_standings`].
pub fn compare_standings(a: &Standing, b: &Standing, matches: &[Match]) -> Ordering {
    compare_records(a, b)
        .then_with(|| head_to_head(&a.team, &b.team, matches).reverse())
        .then_with(|| a.team.cmp(&b.team))
}

/// Standings in ranking order.
pub fn rank_standings(standings: &[Standing], matches: &[Match]) -> Vec<Standing> {
    let mut ranked = standings.to_vec();
    ranked.sort_by(|a, b| compare_records(a, b).then_with(|| a.team.cmp(&b.team)));

    // Head-to-head can cycle across three teams, so it only reorders runs tied on the record.
    let mut start = 0;
    while start < ranked.len() {
        let tied = ranked[start..]
            .iter()
            .take_while(|s| compare_records(&ranked[start], s) == Ordering::Equal)
            .count();
        let run = &mut ranked[start..start + tied];
        for i in 1..run.len() {
            let mut j = i;
            while j > 0 && compare_standings(&run[j - 1], &run[j], matches) == Ordering::Greater {
                run.swap(j - 1, j);
                j -= 1;
            }
        }
        start += tied;
    }
    ranked
}

/// The tournament's standings in ranking order.
pub fn ranked_standings(tournament: &Tournament) -> Vec<Standing> {
    rank_standings(&tournament.standings, &tournament.matches)
}
