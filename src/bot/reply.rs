//! Transport-neutral payloads exchanged with the chat adapter.

use crate::models::UserId;
use serde::{Deserialize, Serialize};

/// One update from the chat network.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Inbound {
    pub user_id: UserId,
    pub chat_id: i64,
    pub event: Event,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// `/name args`, with the leading slash stripped.
    Command {
        name: String,
        #[serde(default)]
        args: String,
    },
    /// Inline button press carrying an encoded action.
    Button { payload: String },
    Text { text: String },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Message to display: text plus rows of buttons.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub chat_id: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Vec<Button>>,
}

impl Reply {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<Vec<Button>>) -> Self {
        self.buttons = buttons;
        self
    }
}
