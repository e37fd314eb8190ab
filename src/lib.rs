//! Football tournament bot: group stage, top-4 playoff and season rating.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod conversation;
pub mod error;
pub mod logic;
pub mod models;
pub mod notify;
pub mod service;
pub mod store;

pub use bot::{Dispatcher, Inbound, Reply};
pub use config::Settings;
pub use error::{ErrorKind, Result, TournamentError};
pub use models::{
    Match, Participant, Phase, Playoff, PlayoffStage, RoundSlot, Standing, TeamCategory,
    Tournament, TournamentId, UserId,
};
pub use service::TournamentService;
pub use store::{MemoryStore, Store, StoreError};
