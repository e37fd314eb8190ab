//! Runtime settings read from the environment.
//!
//! HOST, PORT, MIN_PARTICIPANTS, MAX_PARTICIPANTS, REAP_AFTER_HOURS, REAP_INTERVAL_MINUTES,
//! ADMIN_IDS (comma-separated) and TEAM_CATALOG (optional CSV path).

use crate::models::UserId;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("MIN_PARTICIPANTS ({min}) is greater than MAX_PARTICIPANTS ({max})")]
    ParticipantBounds { min: usize, max: usize },
}

/// Tournament rules and server settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub min_participants: usize,
    pub max_participants: usize,
    pub reap_after_hours: i64,
    pub reap_interval_minutes: u64,
    pub admin_ids: Vec<UserId>,
    pub team_catalog: Option<PathBuf>,
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_min_participants() -> usize {
    5
}

pub fn default_max_participants() -> usize {
    6
}

pub fn default_reap_after_hours() -> i64 {
    24
}

pub fn default_reap_interval_minutes() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            min_participants: default_min_participants(),
            max_participants: default_max_participants(),
            reap_after_hours: default_reap_after_hours(),
            reap_interval_minutes: default_reap_interval_minutes(),
            admin_ids: Vec::new(),
            team_catalog: None,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: fn() -> T) -> T {
    match raw {
        None => default(),
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!("Invalid {}={:?}, using the default", key, value);
            default()
        }),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unparseable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let admin_ids = lookup("ADMIN_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .filter_map(|id| match id.parse() {
                        Ok(id) => Some(id),
                        Err(_) => {
                            log::warn!("Ignoring invalid admin id {:?}", id);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let settings = Self {
            host: lookup("HOST").unwrap_or_else(default_host),
            port: parse_or("PORT", lookup("PORT"), default_port),
            min_participants: parse_or(
                "MIN_PARTICIPANTS",
                lookup("MIN_PARTICIPANTS"),
                default_min_participants,
            ),
            max_participants: parse_or(
                "MAX_PARTICIPANTS",
                lookup("MAX_PARTICIPANTS"),
                default_max_participants,
            ),
            reap_after_hours: parse_or(
                "REAP_AFTER_HOURS",
                lookup("REAP_AFTER_HOURS"),
                default_reap_after_hours,
            ),
            reap_interval_minutes: parse_or(
                "REAP_INTERVAL_MINUTES",
                lookup("REAP_INTERVAL_MINUTES"),
                default_reap_interval_minutes,
            ),
            admin_ids,
            team_catalog: lookup("TEAM_CATALOG")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };
        if settings.min_participants > settings.max_participants {
            return Err(ConfigError::ParticipantBounds {
                min: settings.min_participants,
                max: settings.max_participants,
            });
        }
        Ok(settings)
    }

    pub fn reap_after(&self) -> chrono::Duration {
        chrono::Duration::hours(self.reap_after_hours)
    }
}
