//! Step-by-step collection of one match result.

use crate::logic::PlayoffResult;
use crate::models::{PlayoffStage, TournamentId};
use serde::{Deserialize, Serialize};

/// Which table the result is for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Group,
    Playoff(PlayoffStage),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    SelectTeam1,
    SelectTeam2,
    AwaitScore1,
    AwaitScore2,
    /// Expecting the score after extra time as `a:b`.
    AwaitExtraTime,
    /// Expecting the shootout score as `a:b`.
    AwaitPenalties,
}

/// User input fed to [`MatchEntry::advance`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Input {
    PickTeam(String),
    Text(String),
    Cancel,
}

/// A result ready to be applied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Submission {
    Group {
        team1: String,
        team2: String,
        score1: u32,
        score2: u32,
    },
    Playoff(PlayoffResult),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    /// Moved on; ask for the input of the new step.
    Next(Step),
    /// Input rejected, state unchanged; the reason is shown to the user.
    Reprompt(String),
    Submit(Submission),
    Cancelled,
}

/// One user's in-flight match entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub tournament_id: TournamentId,
    pub kind: EntryKind,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub extra_time: bool,
    pub penalties: Option<(u32, u32)>,
    pub step: Step,
}

fn parse_score(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

/// `"a:b"` with two non-negative integers.
pub fn parse_score_pair(text: &str) -> Option<(u32, u32)> {
    let (a, b) = text.trim().split_once(':')?;
    Some((parse_score(a)?, parse_score(b)?))
}

impl MatchEntry {
    /// Group entry: both teams still to be picked.
    pub fn group(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id,
            kind: EntryKind::Group,
            team1: None,
            team2: None,
            score1: None,
            score2: None,
            extra_time: false,
            penalties: None,
            step: Step::SelectTeam1,
        }
    }

    /// Playoff entry for the open pairing; starts at the first score.
    pub fn playoff(
        tournament_id: TournamentId,
        stage: PlayoffStage,
        team1: impl Into<String>,
        team2: impl Into<String>,
    ) -> Self {
        Self {
            kind: EntryKind::Playoff(stage),
            team1: Some(team1.into()),
            team2: Some(team2.into()),
            step: Step::AwaitScore1,
            ..Self::group(tournament_id)
        }
    }

    pub fn awaiting_score(&self) -> bool {
        !matches!(self.step, Step::SelectTeam1 | Step::SelectTeam2)
    }

    /// Apply one input. Invalid input leaves the entry untouched.
    pub fn advance(&mut self, input: Input) -> Transition {
        match (self.step, input) {
            (_, Input::Cancel) => Transition::Cancelled,
            (Step::SelectTeam1, Input::PickTeam(team)) => {
                self.team1 = Some(team);
                self.step = Step::SelectTeam2;
                Transition::Next(self.step)
            }
            (Step::SelectTeam2, Input::PickTeam(team)) => {
                if self.team1.as_deref() == Some(team.as_str()) {
                    return Transition::Reprompt(format!(
                        "{team} is already the first team; pick its opponent"
                    ));
                }
                self.team2 = Some(team);
                self.step = Step::AwaitScore1;
                Transition::Next(self.step)
            }
            (Step::SelectTeam1 | Step::SelectTeam2, Input::Text(_)) => {
                Transition::Reprompt("pick a team with the buttons".to_string())
            }
            (_, Input::PickTeam(_)) => {
                Transition::Reprompt("the teams are already chosen; enter the score".to_string())
            }
            (Step::AwaitScore1, Input::Text(text)) => match parse_score(&text) {
                Some(score) => {
                    self.score1 = Some(score);
                    self.step = Step::AwaitScore2;
                    Transition::Next(self.step)
                }
                None => Transition::Reprompt("the score must be a non-negative whole number".into()),
            },
            (Step::AwaitScore2, Input::Text(text)) => match parse_score(&text) {
                Some(score) => {
                    self.score2 = Some(score);
                    self.submission()
                }
                None => Transition::Reprompt("the score must be a non-negative whole number".into()),
            },
            (Step::AwaitExtraTime, Input::Text(text)) => match parse_score_pair(&text) {
                Some((a, b)) => {
                    self.score1 = Some(a);
                    self.score2 = Some(b);
                    self.extra_time = true;
                    self.submission()
                }
                None => Transition::Reprompt("enter the score after extra time as a:b".into()),
            },
            (Step::AwaitPenalties, Input::Text(text)) => match parse_score_pair(&text) {
                Some(pair) => {
                    self.penalties = Some(pair);
                    self.submission()
                }
                None => Transition::Reprompt("enter the penalty shootout score as a:b".into()),
            },
        }
    }

    /// The playoff engine found the score level after regulation.
    pub fn require_extra_time(&mut self) {
        self.step = Step::AwaitExtraTime;
    }

    /// Still level after extra time.
    pub fn require_penalties(&mut self) {
        self.step = Step::AwaitPenalties;
    }

    fn submission(&self) -> Transition {
        let (Some(team1), Some(team2), Some(score1), Some(score2)) = (
            self.team1.clone(),
            self.team2.clone(),
            self.score1,
            self.score2,
        ) else {
            return Transition::Reprompt("the match entry is incomplete; /cancel and retry".into());
        };
        Transition::Submit(match self.kind {
            EntryKind::Group => Submission::Group {
                team1,
                team2,
                score1,
                score2,
            },
            EntryKind::Playoff(stage) => Submission::Playoff(PlayoffResult {
                stage,
                team1,
                team2,
                score1,
                score2,
                extra_time: self.extra_time,
                penalties: self.penalties,
            }),
        })
    }
}
