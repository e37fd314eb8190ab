//! Playoff bracket: fixed top-4 knockout with byes for the two best seeds.

use crate::models::game::Match;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Round of the bracket that is currently open.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffStage {
    Quarter,
    Semi,
    Final,
    /// Final decided; nothing left to play.
    Done,
}

impl PlayoffStage {
    pub fn next(self) -> Self {
        match self {
            PlayoffStage::Quarter => PlayoffStage::Semi,
            PlayoffStage::Semi => PlayoffStage::Final,
            PlayoffStage::Final | PlayoffStage::Done => PlayoffStage::Done,
        }
    }

    /// Short tag used in button payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            PlayoffStage::Quarter => "quarter",
            PlayoffStage::Semi => "semi",
            PlayoffStage::Final => "final",
            PlayoffStage::Done => "done",
        }
    }
}

impl fmt::Display for PlayoffStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayoffStage::Quarter => write!(f, "quarterfinal"),
            PlayoffStage::Semi => write!(f, "semifinal"),
            PlayoffStage::Final => write!(f, "final"),
            PlayoffStage::Done => write!(f, "finished playoff"),
        }
    }
}

/// One round's match slot.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoundSlot {
    /// At least one participant is still unknown.
    #[default]
    Empty,
    /// Both teams known, result not entered yet.
    Pending { team1: String, team2: String },
    /// Result entered and counted.
    Decided(Match),
}

impl RoundSlot {
    pub fn pending(team1: impl Into<String>, team2: impl Into<String>) -> Self {
        RoundSlot::Pending {
            team1: team1.into(),
            team2: team2.into(),
        }
    }

    /// The two teams of this slot, if known.
    pub fn teams(&self) -> Option<(&str, &str)> {
        match self {
            RoundSlot::Empty => None,
            RoundSlot::Pending { team1, team2 } => Some((team1, team2)),
            RoundSlot::Decided(m) => Some((&m.team1, &m.team2)),
        }
    }

    pub fn decided(&self) -> Option<&Match> {
        match self {
            RoundSlot::Decided(m) => Some(m),
            _ => None,
        }
    }
}

/// Bracket state owned by a tournament once the group stage is over.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Playoff {
    pub stage: PlayoffStage,
    /// Seeds 1..=4 in ranking order.
    pub seeds: [String; 4],
    pub quarter_final: RoundSlot,
    pub semi_final: RoundSlot,
    pub final_match: RoundSlot,
    pub winner: Option<String>,
}

impl Playoff {
    /// Fresh bracket: seed 3 vs seed 4 is the only playable match.
    pub fn seeded(seeds: [String; 4]) -> Self {
        let quarter_final = RoundSlot::pending(seeds[2].clone(), seeds[3].clone());
        Self {
            stage: PlayoffStage::Quarter,
            seeds,
            quarter_final,
            semi_final: RoundSlot::Empty,
            final_match: RoundSlot::Empty,
            winner: None,
        }
    }

    /// Team waiting in `stage` thanks to its bye (seed 2 in the semi, seed 1 in the final).
    pub fn bye_team(&self, stage: PlayoffStage) -> Option<&str> {
        match stage {
            PlayoffStage::Semi => Some(&self.seeds[1]),
            PlayoffStage::Final => Some(&self.seeds[0]),
            PlayoffStage::Quarter | PlayoffStage::Done => None,
        }
    }

    pub fn slot(&self, stage: PlayoffStage) -> Option<&RoundSlot> {
        match stage {
            PlayoffStage::Quarter => Some(&self.quarter_final),
            PlayoffStage::Semi => Some(&self.semi_final),
            PlayoffStage::Final => Some(&self.final_match),
            PlayoffStage::Done => None,
        }
    }

    pub fn slot_mut(&mut self, stage: PlayoffStage) -> Option<&mut RoundSlot> {
        match stage {
            PlayoffStage::Quarter => Some(&mut self.quarter_final),
            PlayoffStage::Semi => Some(&mut self.semi_final),
            PlayoffStage::Final => Some(&mut self.final_match),
            PlayoffStage::Done => None,
        }
    }

    /// Open stage and its pairing, if a match is waiting for a result.
    pub fn current_pairing(&self) -> Option<(PlayoffStage, &str, &str)> {
        match self.slot(self.stage)? {
            RoundSlot::Pending { team1, team2 } => Some((self.stage, team1, team2)),
            _ => None,
        }
    }

    /// Decided slots in bracket order.
    pub fn decided_matches(&self) -> impl Iterator<Item = (PlayoffStage, &Match)> {
        [
            (PlayoffStage::Quarter, &self.quarter_final),
            (PlayoffStage::Semi, &self.semi_final),
            (PlayoffStage::Final, &self.final_match),
        ]
        .into_iter()
        .filter_map(|(stage, slot)| slot.decided().map(|m| (stage, m)))
    }

    /// Most advanced decided round.
    pub fn last_decided(&self) -> Option<PlayoffStage> {
        self.decided_matches().map(|(stage, _)| stage).last()
    }
}
