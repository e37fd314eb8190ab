//! Per-user session map with one async lock per user.

use super::MatchEntry;
use crate::error::{Result, TournamentError};
use crate::models::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<Option<MatchEntry>>>;

/// Exclusive access to one user's session until dropped.
pub type SessionGuard = OwnedMutexGuard<Option<MatchEntry>>;

/// Open match entries keyed by user.
///
/// The outer map lock is only held to find a user's slot; steps of the same user
/// serialize on the slot's async mutex, different users proceed in parallel.
#[derive(Default)]
pub struct SessionStore {
    slots: Mutex<HashMap<UserId, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, user_id: UserId) -> Slot {
        let mut slots = match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slots.entry(user_id).or_default().clone()
    }

    /// Lock the user's session; the guard holds `None` when no entry is open.
    pub async fn lock(&self, user_id: UserId) -> SessionGuard {
        self.slot(user_id).lock_owned().await
    }

    /// Open a new entry; fails if the user already has one, which is left untouched.
    pub async fn create(&self, user_id: UserId, entry: MatchEntry) -> Result<()> {
        let mut session = self.lock(user_id).await;
        if session.is_some() {
            return Err(TournamentError::ConversationInProgress);
        }
        *session = Some(entry);
        Ok(())
    }

    /// Snapshot of the user's open entry.
    pub async fn get(&self, user_id: UserId) -> Option<MatchEntry> {
        self.lock(user_id).await.clone()
    }

    /// Drop the user's entry. Returns true if one was open.
    pub async fn delete(&self, user_id: UserId) -> bool {
        self.lock(user_id).await.take().is_some()
    }

    /// Number of users with an open entry.
    pub async fn open_count(&self) -> usize {
        let slots: Vec<Slot> = match self.slots.lock() {
            Ok(guard) => guard.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        };
        let mut open = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                open += 1;
            }
        }
        open
    }
}
