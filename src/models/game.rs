//! Match record shared by the group stage and the playoff bracket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

/// A single played match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub team1: String,
    pub team2: String,
    /// Goals including extra time, when extra time was played.
    pub score1: u32,
    pub score2: u32,
    pub extra_time: bool,
    pub penalties: bool,
    pub penalty_score1: u32,
    pub penalty_score2: u32,
    pub date: DateTime<Utc>,
    /// True once the match has been folded into standings/statistics.
    pub counted: bool,
}

impl Match {
    /// A regulation-time result, not yet counted.
    pub fn new(team1: impl Into<String>, team2: impl Into<String>, score1: u32, score2: u32) -> Self {
        Self {
            team1: team1.into(),
            team2: team2.into(),
            score1,
            score2,
            extra_time: false,
            penalties: false,
            penalty_score1: 0,
            penalty_score2: 0,
            date: Utc::now(),
            counted: false,
        }
    }

    /// Winning side. Penalties decide when they were taken; `None` is a draw.
    pub fn winner(&self) -> Option<Side> {
        let (a, b) = if self.penalties {
            (self.penalty_score1, self.penalty_score2)
        } else {
            (self.score1, self.score2)
        };
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn winner_team(&self) -> Option<&str> {
        self.winner().map(|side| self.team(side))
    }

    pub fn loser_team(&self) -> Option<&str> {
        self.winner().map(|side| match side {
            Side::One => self.team2.as_str(),
            Side::Two => self.team1.as_str(),
        })
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::One => &self.team1,
            Side::Two => &self.team2,
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }

    /// True if this match is between `a` and `b`, in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.team1 == a && self.team2 == b) || (self.team1 == b && self.team2 == a)
    }

    /// (scored, conceded) from `team`'s point of view, or `None` if it did not play.
    pub fn goals_for(&self, team: &str) -> Option<(u32, u32)> {
        if self.team1 == team {
            Some((self.score1, self.score2))
        } else if self.team2 == team {
            Some((self.score2, self.score1))
        } else {
            None
        }
    }
}
