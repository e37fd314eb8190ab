//! Match-entry conversations: the step machine and the per-user session store.

mod entry;
mod sessions;

pub use entry::{parse_score_pair, EntryKind, Input, MatchEntry, Step, Submission, Transition};
pub use sessions::{SessionGuard, SessionStore};
