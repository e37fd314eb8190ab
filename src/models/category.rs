//! Team pools available for the draw.

use serde::{Deserialize, Serialize};

/// Named pool of team labels (e.g. "Premier League").
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamCategory {
    pub name: String,
    pub teams: Vec<String>,
}

impl TeamCategory {
    pub fn new(name: impl Into<String>, teams: Vec<String>) -> Self {
        Self {
            name: name.into(),
            teams,
        }
    }
}
