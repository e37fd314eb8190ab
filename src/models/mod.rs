//! Data structures for the tournament: matches, standings, bracket, participants.

mod category;
mod game;
mod participant;
mod playoff;
mod standing;
mod tournament;

pub use category::TeamCategory;
pub use game::{Match, Side};
pub use participant::{Participant, Place, SeasonStats, TournamentStat};
pub use playoff::{Playoff, PlayoffStage, RoundSlot};
pub use standing::{Standing, POINTS_FOR_DRAW, POINTS_FOR_WIN};
pub use tournament::{Phase, Tournament, TournamentId};

/// Chat-network user id of whoever sent an update.
pub type UserId = i64;
