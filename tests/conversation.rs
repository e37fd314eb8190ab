//! Integration tests for the match-entry conversation and its session store.

use football_tournament_bot::bot::Action;
use football_tournament_bot::conversation::{
    parse_score_pair, EntryKind, Input, MatchEntry, SessionStore, Step, Submission, Transition,
};
use football_tournament_bot::logic::PlayoffResult;
use football_tournament_bot::{ErrorKind, PlayoffStage, TournamentError};
use std::sync::Arc;
use uuid::Uuid;

fn text(s: &str) -> Input {
    Input::Text(s.to_string())
}

fn pick(team: &str) -> Input {
    Input::PickTeam(team.to_string())
}

#[test]
fn group_entry_collects_teams_then_scores() {
    let id = Uuid::new_v4();
    let mut entry = MatchEntry::group(id);
    assert_eq!(entry.kind, EntryKind::Group);
    assert!(!entry.awaiting_score());

    assert_eq!(entry.advance(pick("Arsenal")), Transition::Next(Step::SelectTeam2));
    assert!(matches!(entry.advance(pick("Arsenal")), Transition::Reprompt(_)));
    assert_eq!(entry.step, Step::SelectTeam2);

    assert_eq!(entry.advance(pick("Chelsea")), Transition::Next(Step::AwaitScore1));
    assert!(entry.awaiting_score());

    let before = entry.clone();
    assert!(matches!(entry.advance(text("two")), Transition::Reprompt(_)));
    assert!(matches!(entry.advance(text("-1")), Transition::Reprompt(_)));
    assert_eq!(entry, before);

    assert_eq!(entry.advance(text("2")), Transition::Next(Step::AwaitScore2));
    assert_eq!(
        entry.advance(text(" 1 ")),
        Transition::Submit(Submission::Group {
            team1: "Arsenal".into(),
            team2: "Chelsea".into(),
            score1: 2,
            score2: 1,
        })
    );
}

#[test]
fn team_buttons_are_ignored_once_scores_are_expected() {
    let mut entry = MatchEntry::playoff(Uuid::new_v4(), PlayoffStage::Semi, "Arsenal", "Chelsea");
    assert_eq!(entry.step, Step::AwaitScore1);
    assert!(matches!(entry.advance(pick("Everton")), Transition::Reprompt(_)));
    assert_eq!(entry.team1.as_deref(), Some("Arsenal"));
}

#[test]
fn playoff_entry_walks_through_extra_time_and_penalties() {
    let mut entry = MatchEntry::playoff(Uuid::new_v4(), PlayoffStage::Final, "Arsenal", "Chelsea");
    entry.advance(text("1"));
    let first = entry.advance(text("1"));
    assert!(matches!(
        first,
        Transition::Submit(Submission::Playoff(PlayoffResult {
            extra_time: false,
            penalties: None,
            ..
        }))
    ));

    entry.require_extra_time();
    assert!(matches!(entry.advance(text("2-2")), Transition::Reprompt(_)));
    assert_eq!(entry.step, Step::AwaitExtraTime);
    let after_extra = entry.advance(text("2:2"));
    assert!(matches!(
        after_extra,
        Transition::Submit(Submission::Playoff(PlayoffResult {
            score1: 2,
            score2: 2,
            extra_time: true,
            penalties: None,
            ..
        }))
    ));

    entry.require_penalties();
    assert!(matches!(entry.advance(text("five:four")), Transition::Reprompt(_)));
    let Transition::Submit(Submission::Playoff(result)) = entry.advance(text("5:4")) else {
        panic!("expected a playoff submission");
    };
    assert_eq!(result.stage, PlayoffStage::Final);
    assert_eq!((result.score1, result.score2), (2, 2));
    assert!(result.extra_time);
    assert_eq!(result.penalties, Some((5, 4)));
}

#[test]
fn cancel_is_accepted_at_any_step() {
    let mut entry = MatchEntry::group(Uuid::new_v4());
    assert_eq!(entry.advance(Input::Cancel), Transition::Cancelled);
    entry.advance(pick("Arsenal"));
    assert_eq!(entry.advance(Input::Cancel), Transition::Cancelled);
}

#[test]
fn score_pairs_parse_strictly() {
    assert_eq!(parse_score_pair("3:1"), Some((3, 1)));
    assert_eq!(parse_score_pair(" 0 : 0 "), Some((0, 0)));
    assert_eq!(parse_score_pair("3"), None);
    assert_eq!(parse_score_pair("3:1:2"), None);
    assert_eq!(parse_score_pair("a:1"), None);
    assert_eq!(parse_score_pair("-1:2"), None);
}

#[tokio::test]
async fn second_entry_for_the_same_user_conflicts() {
    let sessions = SessionStore::new();
    let first = MatchEntry::group(Uuid::new_v4());
    sessions.create(7, first.clone()).await.unwrap();

    let err = sessions
        .create(7, MatchEntry::playoff(Uuid::new_v4(), PlayoffStage::Quarter, "A", "B"))
        .await
        .unwrap_err();
    assert_eq!(err, TournamentError::ConversationInProgress);
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(sessions.get(7).await, Some(first));

    // Other users are independent.
    sessions.create(8, MatchEntry::group(Uuid::new_v4())).await.unwrap();
    assert_eq!(sessions.open_count().await, 2);

    assert!(sessions.delete(7).await);
    assert!(!sessions.delete(7).await);
    assert_eq!(sessions.get(7).await, None);
    assert_eq!(sessions.open_count().await, 1);
}

#[tokio::test]
async fn steps_of_one_user_are_serialized() {
    let sessions = Arc::new(SessionStore::new());
    sessions.create(1, MatchEntry::group(Uuid::new_v4())).await.unwrap();

    let mut guard = sessions.lock(1).await;
    let waiting = {
        let sessions = sessions.clone();
        tokio::spawn(async move { sessions.get(1).await })
    };
    tokio::task::yield_now().await;
    assert!(!waiting.is_finished());

    if let Some(entry) = (*guard).as_mut() {
        entry.advance(pick("Arsenal"));
    }
    drop(guard);

    let seen = waiting.await.unwrap().unwrap();
    assert_eq!(seen.step, Step::SelectTeam2);
}

#[test]
fn button_payloads_round_trip() {
    for action in [
        Action::ToggleParticipant("Anna Petrova".into()),
        Action::ChooseCategory,
        Action::PickCategory("Premier League".into()),
        Action::PickTeam("Manchester United".into()),
        Action::DeleteTournament(Uuid::new_v4()),
        Action::ConfirmDeleteLast,
        Action::CancelDeleteLast,
    ] {
        assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
    }
    assert!("explode:now".parse::<Action>().is_err());
    assert!("delete:not-a-uuid".parse::<Action>().is_err());
}
