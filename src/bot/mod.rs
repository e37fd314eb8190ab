//! Chat-facing layer: inbound events, button actions and the dispatcher.

mod action;
mod handlers;
mod reply;

pub use action::Action;
pub use handlers::{render_season, render_tournament, Dispatcher};
pub use reply::{Button, Event, Inbound, Reply};
