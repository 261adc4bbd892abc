//! Core types for the task chat bot.

use serde::Serialize;

/// Task identifier assigned by the store. Never reused after deletion.
pub type TaskId = i64;

/// Opaque chat-platform user identifier. Doubles as the task owner.
pub type UserId = i64;

/// Chat/conversation identifier replies are sent to.
pub type ChatId = i64;

/// A task in a user's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: UserId,
    pub text: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// What the next free-form message from a user should be interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingAction {
    /// The next plain-text message becomes a new task.
    AwaitingNewTaskText,
    /// The next plain-text message replaces the text of the given task.
    AwaitingEditText(TaskId),
}

impl PendingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingAction::AwaitingNewTaskText => "awaiting_new_task_text",
            PendingAction::AwaitingEditText(_) => "awaiting_edit_text",
        }
    }
}

/// Number of tasks held by one owner, as reported by the `stats` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerStats {
    pub owner_id: UserId,
    pub task_count: i64,
    /// Creation time of the owner's newest task (ms since epoch).
    pub last_created_at: i64,
}
