//! Integration tests for season statistics.

use chrono::Utc;
use football_tournament_bot::logic::{
    record_group_match, record_playoff_match, season_table, start_playoff, start_tournament,
    tournament_stats, PlayoffResult,
};
use football_tournament_bot::models::{Place, SeasonStats, TournamentStat};
use football_tournament_bot::{ErrorKind, Participant, PlayoffStage, TeamCategory, Tournament};
use rand::rngs::StdRng;
use rand::SeedableRng;

const NAMES: [&str; 5] = ["Anna", "Boris", "Clara", "Dmitri", "Elena"];

fn decide(t: &mut Tournament, stage: PlayoffStage, team1: &str, team2: &str, s1: u32, s2: u32) {
    let result = PlayoffResult {
        stage,
        team1: team1.to_string(),
        team2: team2.to_string(),
        score1: s1,
        score2: s2,
        extra_time: false,
        penalties: None,
    };
    record_playoff_match(t, &result).unwrap();
}

/// Round robin won 2-0 by the earlier participant every time, then:
/// QF seed 3 beats seed 4 1-0, SF seed 3 beats seed 2 2-1, F seed 1 beats seed 3 3-0.
fn completed_tournament() -> (Tournament, Vec<String>) {
    let mut t = Tournament::new("2026-10-19 Tournament #1", 5, 6, Utc::now());
    for name in NAMES {
        t.toggle_participant(name).unwrap();
    }
    let category = TeamCategory::new(
        "Clubs",
        ["Arsenal", "Barcelona", "Chelsea", "Dortmund", "Everton"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    t.set_team_category("Clubs").unwrap();
    start_tournament(&mut t, &category, &mut StdRng::seed_from_u64(11)).unwrap();
    let teams: Vec<String> = t.teams().iter().map(|s| s.to_string()).collect();
    for i in 0..teams.len() {
        for j in (i + 1)..teams.len() {
            record_group_match(&mut t, &teams[i], &teams[j], 2, 0).unwrap();
        }
    }
    start_playoff(&mut t).unwrap();
    decide(&mut t, PlayoffStage::Quarter, &teams[2], &teams[3], 1, 0);
    decide(&mut t, PlayoffStage::Semi, &teams[1], &teams[2], 1, 2);
    decide(&mut t, PlayoffStage::Final, &teams[0], &teams[2], 3, 0);
    (t, teams)
}

fn stat_of<'a>(stats: &'a [(String, TournamentStat)], name: &str) -> &'a TournamentStat {
    &stats.iter().find(|(p, _)| p == name).unwrap().1
}

#[test]
fn placements_and_points() {
    let (t, _) = completed_tournament();
    let stats = tournament_stats(&t).unwrap();
    assert_eq!(stats.len(), 5);

    // Anna seed 1, Boris seed 2, Clara seed 3, Dmitri seed 4, Elena last in the group.
    let anna = stat_of(&stats, "Anna");
    assert_eq!(anna.place, Place::First);
    assert_eq!(anna.points, 8 + 2);

    let clara = stat_of(&stats, "Clara");
    assert_eq!(clara.place, Place::Second);
    assert_eq!(clara.points, 4 + 2);

    let boris = stat_of(&stats, "Boris");
    assert_eq!(boris.place, Place::Third);
    assert_eq!(boris.points, 2 + 2);

    let dmitri = stat_of(&stats, "Dmitri");
    assert_eq!(dmitri.place, Place::Group);
    assert_eq!(dmitri.points, 0);

    assert_eq!(stat_of(&stats, "Elena").points, 0);
    assert!(stats.iter().all(|(_, s)| s.tournament_id == t.id));
}

#[test]
fn match_totals_include_group_and_playoff() {
    let (t, _) = completed_tournament();
    let stats = tournament_stats(&t).unwrap();

    // Clara: group W2 L2 (4:4), QF 1-0 win, SF 2-1 win, F 0-3 loss.
    let clara = stat_of(&stats, "Clara");
    assert_eq!(clara.matches_played, 7);
    assert_eq!((clara.wins, clara.losses, clara.draws), (4, 3, 0));
    assert_eq!((clara.goals_scored, clara.goals_conceded), (7, 8));

    // Elena: four group defeats, no playoff.
    let elena = stat_of(&stats, "Elena");
    assert_eq!(elena.matches_played, 4);
    assert_eq!((elena.wins, elena.losses), (0, 4));
    assert_eq!((elena.goals_scored, elena.goals_conceded), (0, 8));
}

#[test]
fn stats_need_a_completed_tournament() {
    let t = Tournament::new("draft", 5, 6, Utc::now());
    let err = tournament_stats(&t).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn applying_a_stat_accumulates_and_records_history() {
    let (t, _) = completed_tournament();
    let stats = tournament_stats(&t).unwrap();
    let mut season = SeasonStats::default();
    season.apply(stat_of(&stats, "Anna").clone());
    season.apply(stat_of(&stats, "Anna").clone());

    assert_eq!(season.tournaments_played, 2);
    assert_eq!(season.total_points, 20);
    assert_eq!(season.history.len(), 2);
    assert_eq!(season.wins, 2 * stat_of(&stats, "Anna").wins);
}

#[test]
fn season_table_orders_by_points_then_name() {
    let mut boris = Participant::new("Boris");
    boris.stats.total_points = 10;
    let mut anna = Participant::new("Anna");
    anna.stats.total_points = 4;
    let mut clara = Participant::new("Clara");
    clara.stats.total_points = 10;

    let table: Vec<String> = season_table(vec![anna, boris, clara])
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(table, ["Boris", "Clara", "Anna"]);
}

#[test]
fn participant_names_are_letters_and_spaces() {
    assert!(Participant::is_valid_name("Anna Petrova"));
    assert!(Participant::is_valid_name("Иван Петров"));
    assert!(!Participant::is_valid_name("R2D2"));
    assert!(!Participant::is_valid_name("   "));
    assert!(!Participant::is_valid_name("Anna_P"));
}
