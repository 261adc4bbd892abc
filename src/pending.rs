//! Per-user pending-action tracker.
//!
//! Remembers, for each user, whether the next free-form message should be
//! read as the text of a new task or as the replacement text of an existing
//! one. State lives in process memory only and is lost on restart.
//!
//! At most one entry exists per user. Setting a new action overwrites the
//! previous one, and [`PendingActions::take`] removes the entry in the same
//! lock acquisition that reads it, so two racing messages from one user can
//! never both consume the same action.

use crate::types::{PendingAction, TaskId, UserId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Tracks the pending action of every user with an open prompt.
///
/// Thread-safe: uses an internal `Mutex` so it can be shared across async
/// tasks without requiring `&mut self`.
pub struct PendingActions {
    entries: Mutex<HashMap<UserId, PendingAction>>,
}

impl PendingActions {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave the map half-updated:
    // every operation is a single insert/remove/get.
    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, PendingAction>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the user's next plain-text message as a new task.
    pub fn set_awaiting_add(&self, user_id: UserId) {
        self.lock().insert(user_id, PendingAction::AwaitingNewTaskText);
    }

    /// Read the user's next plain-text message as new text for `task_id`.
    pub fn set_awaiting_edit(&self, user_id: UserId, task_id: TaskId) {
        self.lock()
            .insert(user_id, PendingAction::AwaitingEditText(task_id));
    }

    /// Remove and return the user's pending action.
    pub fn take(&self, user_id: UserId) -> Option<PendingAction> {
        self.lock().remove(&user_id)
    }

    /// Drop the user's pending action. Returns `true` if one was present.
    pub fn clear(&self, user_id: UserId) -> bool {
        self.lock().remove(&user_id).is_some()
    }

    /// Current pending action without consuming it.
    pub fn peek(&self, user_id: UserId) -> Option<PendingAction> {
        self.lock().get(&user_id).copied()
    }

    /// Number of users with a pending action.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for PendingActions {
    fn default() -> Self {
        Self::new()
    }
}
