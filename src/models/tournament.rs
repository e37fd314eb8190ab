//! Tournament and its lifecycle phase.

use crate::error::{Result, TournamentError};
use crate::models::game::Match;
use crate::models::playoff::Playoff;
use crate::models::standing::Standing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle phase, derived from the tournament's flags.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Collecting participants and a team category.
    Draft,
    /// Round robin in progress.
    Group,
    /// Knockout bracket in progress.
    Playoff,
    /// Final decided, season stats folded in.
    Completed,
}

/// Full tournament state: roster, draw, group matches, standings and bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Participant names in join order.
    pub participants: Vec<String>,
    pub min_participants: usize,
    pub max_participants: usize,
    pub team_category: Option<String>,
    /// Participant → team; filled by the draw.
    pub participant_teams: HashMap<String, String>,
    /// Group-stage matches in recording order.
    pub matches: Vec<Match>,
    /// One row per assigned team, in participant order.
    pub standings: Vec<Standing>,
    pub active: bool,
    pub setup_completed: bool,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub playoff: Option<Playoff>,
}

impl Tournament {
    /// Create a draft tournament with no participants.
    pub fn new(
        name: impl Into<String>,
        min_participants: usize,
        max_participants: usize,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            participants: Vec::new(),
            min_participants,
            max_participants,
            team_category: None,
            participant_teams: HashMap::new(),
            matches: Vec::new(),
            standings: Vec::new(),
            active: false,
            setup_completed: false,
            completed: false,
            created_at,
            playoff: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.completed {
            Phase::Completed
        } else if !self.active {
            Phase::Draft
        } else if self.playoff.is_some() {
            Phase::Playoff
        } else {
            Phase::Group
        }
    }

    pub fn has_participant(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }

    pub fn team_of(&self, participant: &str) -> Option<&str> {
        self.participant_teams.get(participant).map(String::as_str)
    }

    pub fn participant_of(&self, team: &str) -> Option<&str> {
        self.participant_teams
            .iter()
            .find(|(_, t)| t.as_str() == team)
            .map(|(p, _)| p.as_str())
    }

    /// Assigned teams in participant order.
    pub fn teams(&self) -> Vec<&str> {
        self.participants
            .iter()
            .filter_map(|p| self.team_of(p))
            .collect()
    }

    pub fn has_team(&self, team: &str) -> bool {
        self.participant_teams.values().any(|t| t == team)
    }

    /// Add the participant if absent, remove it if present (Draft only). Returns true if added.
    pub fn toggle_participant(&mut self, name: &str) -> Result<bool> {
        if self.phase() != Phase::Draft {
            return Err(TournamentError::precondition(
                "the tournament has already started; the roster is locked",
            ));
        }
        if let Some(idx) = self.participants.iter().position(|p| p == name) {
            self.participants.remove(idx);
            return Ok(false);
        }
        if self.participants.len() >= self.max_participants {
            return Err(TournamentError::precondition(format!(
                "the tournament has reached the maximum of {} participants",
                self.max_participants
            )));
        }
        self.participants.push(name.to_string());
        Ok(true)
    }

    /// Choose the team pool for the draw (Draft only).
    pub fn set_team_category(&mut self, category: &str) -> Result<()> {
        if self.phase() != Phase::Draft {
            return Err(TournamentError::precondition(
                "the tournament has already started; the category is locked",
            ));
        }
        self.team_category = Some(category.to_string());
        Ok(())
    }
}
