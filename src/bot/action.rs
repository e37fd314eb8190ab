//! Button payloads, encoded as `verb` or `verb:arg`.

use crate::error::TournamentError;
use crate::models::TournamentId;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    /// Add or remove a participant from the draft roster.
    ToggleParticipant(String),
    /// Show the team category picker.
    ChooseCategory,
    /// Use this category, draw teams and start.
    PickCategory(String),
    PickTeam(String),
    DeleteTournament(TournamentId),
    ConfirmDeleteLast,
    CancelDeleteLast,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ToggleParticipant(name) => write!(f, "toggle:{name}"),
            Action::ChooseCategory => write!(f, "categories"),
            Action::PickCategory(name) => write!(f, "category:{name}"),
            Action::PickTeam(team) => write!(f, "team:{team}"),
            Action::DeleteTournament(id) => write!(f, "delete:{id}"),
            Action::ConfirmDeleteLast => write!(f, "dellast:yes"),
            Action::CancelDeleteLast => write!(f, "dellast:no"),
        }
    }
}

impl FromStr for Action {
    type Err = TournamentError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let (verb, arg) = payload.split_once(':').unwrap_or((payload, ""));
        let action = match (verb, arg) {
            ("toggle", name) if !name.is_empty() => Action::ToggleParticipant(name.to_string()),
            ("categories", "") => Action::ChooseCategory,
            ("category", name) if !name.is_empty() => Action::PickCategory(name.to_string()),
            ("team", team) if !team.is_empty() => Action::PickTeam(team.to_string()),
            ("delete", id) => Action::DeleteTournament(id.parse().map_err(|_| {
                TournamentError::validation(format!("invalid tournament id {id:?}"))
            })?),
            ("dellast", "yes") => Action::ConfirmDeleteLast,
            ("dellast", "no") => Action::CancelDeleteLast,
            _ => {
                return Err(TournamentError::validation(format!(
                    "unknown button {payload:?}"
                )))
            }
        };
        Ok(action)
    }
}
