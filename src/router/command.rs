//! Parsing of inbound text and button payloads.
//!
//! Everything stringly-typed from the chat platform is turned into an enum
//! here, once, so the router only ever matches on variants.

use crate::error::{BotError, BotResult};
use crate::types::TaskId;

/// Prefix that marks a message as a command.
pub const COMMAND_PREFIX: char = '/';

/// A slash command with its raw argument string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/add` with the task text, if any was given inline.
    Add(Option<String>),
    /// `/mytasks` or `/list`.
    List,
    Cancel,
    /// `/delete` with its unparsed argument.
    Delete(String),
    /// `/edit` with its unparsed argument.
    Edit(String),
    /// Any other slash command. Ignored by the router.
    Unknown(String),
}

impl Command {
    /// Parse a trimmed message. Returns `None` for text that is not a command.
    ///
    /// A `@botname` suffix on the command name is dropped, so `/add@my_bot milk`
    /// is the same as `/add milk`.
    pub fn parse(text: &str) -> Option<Command> {
        let body = text.strip_prefix(COMMAND_PREFIX)?;
        let (head, arg) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };
        let name = head.split_once('@').map_or(head, |(name, _)| name);

        let command = match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "add" => Command::Add((!arg.is_empty()).then(|| arg.to_string())),
            "mytasks" | "list" => Command::List,
            "cancel" => Command::Cancel,
            "delete" => Command::Delete(arg.to_string()),
            "edit" => Command::Edit(arg.to_string()),
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Parse a task id the way a user types it: ASCII digits only.
pub fn parse_task_id(raw: &str) -> BotResult<TaskId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BotError::missing_argument("id"));
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BotError::invalid_argument("id", "id must be a non-negative integer"));
    }
    raw.parse::<TaskId>()
        .map_err(|_| BotError::invalid_argument("id", "id is out of range"))
}

/// Split an `/edit` argument into the task id and the full new text.
///
/// The text is everything after the id and may itself contain whitespace.
pub fn parse_edit_args(arg: &str) -> BotResult<(TaskId, String)> {
    let arg = arg.trim();
    let Some((id, text)) = arg.split_once(char::is_whitespace) else {
        return Err(BotError::missing_argument("text"));
    };
    let id = parse_task_id(id)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(BotError::missing_argument("text"));
    }
    Ok((id, text.to_string()))
}

/// Action encoded in an inline button payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Edit(TaskId),
    Delete(TaskId),
}

/// Why a button payload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CallbackParseError {
    #[error("payload has no action separator")]
    MissingSeparator,
    #[error("payload id is not a non-negative integer")]
    InvalidId,
    #[error("unknown payload action")]
    UnknownAction,
}

impl CallbackAction {
    /// Parse an `action:id` payload.
    pub fn parse(data: &str) -> Result<Self, CallbackParseError> {
        let (action, id) = data
            .split_once(':')
            .ok_or(CallbackParseError::MissingSeparator)?;
        let id = parse_task_id(id).map_err(|_| CallbackParseError::InvalidId)?;
        match action {
            "edit" => Ok(CallbackAction::Edit(id)),
            "delete" => Ok(CallbackAction::Delete(id)),
            _ => Err(CallbackParseError::UnknownAction),
        }
    }

    /// Encode as a button payload.
    pub fn payload(&self) -> String {
        match self {
            CallbackAction::Edit(id) => format!("edit:{}", id),
            CallbackAction::Delete(id) => format!("delete:{}", id),
        }
    }
}
