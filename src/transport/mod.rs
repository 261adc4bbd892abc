//! Chat transport abstraction.
//!
//! The router talks to the chat platform only through [`ChatTransport`], so
//! it can be driven by the Telegram client in production and by a recording
//! fake in tests.

pub mod telegram;

use crate::types::{ChatId, TaskId, UserId};
use async_trait::async_trait;

/// Longest text sent in one message, in UTF-16 code units. Telegram's hard
/// limit is 4096 units, so one emoji outside the BMP costs two.
pub const MAX_MESSAGE_UNITS: usize = 3800;

/// Button layout attached to an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMarkup {
    /// Leave whatever keyboard the user currently has.
    None,
    /// Persistent two-button keyboard: "Add task" / "My tasks".
    QuickActions,
    /// Hide the persistent keyboard.
    RemoveKeyboard,
    /// Inline "Edit" / "Delete" pair for one task.
    TaskActions(TaskId),
}

/// Reference to a message that was sent, used to edit it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: i64,
}

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A text message: a command, a keyboard button label, or free-form text.
    Text { text: String },
    /// An inline button press.
    Callback {
        id: String,
        data: String,
        /// Message the pressed button was attached to.
        message: Option<MessageRef>,
    },
}

/// An event delivered by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn text(user_id: UserId, chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id,
            kind: EventKind::Text { text: text.into() },
        }
    }

    pub fn callback(
        user_id: UserId,
        chat_id: ChatId,
        id: impl Into<String>,
        data: impl Into<String>,
        message: Option<MessageRef>,
    ) -> Self {
        Self {
            user_id,
            chat_id,
            kind: EventKind::Callback {
                id: id.into(),
                data: data.into(),
                message,
            },
        }
    }
}

/// Errors from the chat platform.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{method} request failed: {source}")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} rejected: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

/// Outbound operations on the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a text message, optionally with a button layout.
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: ReplyMarkup,
    ) -> Result<MessageRef, TransportError>;

    /// Replace the text of a previously sent message.
    async fn edit_message_text(&self, message: MessageRef, text: &str)
    -> Result<(), TransportError>;

    /// Acknowledge a button press, optionally with a toast or an alert.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError>;
}

/// Cut `raw` to at most `max_units` UTF-16 code units, marking the cut.
/// Characters are never split.
pub fn truncate_message(raw: &str, max_units: usize) -> String {
    if raw.encode_utf16().count() <= max_units {
        return raw.to_owned();
    }
    // The ellipsis itself is one unit.
    let budget = max_units.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in raw.chars() {
        used += ch.len_utf16();
        if used > budget {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}
