//! Structured error types for bot request handling.

use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation errors
    MissingArgument,
    InvalidArgument,

    // Internal errors
    DatabaseError,
    TransportError,
}

/// Error raised while handling one inbound event.
///
/// Validation errors are answered with a hint to the user; everything else
/// is a fault that fails the current request only.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct BotError {
    pub code: ErrorCode,
    pub message: String,
    pub field: Option<String>,
}

impl BotError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn missing_argument(field: &str) -> Self {
        Self::new(ErrorCode::MissingArgument, format!("{} is required", field)).with_field(field)
    }

    pub fn invalid_argument(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidArgument, reason).with_field(field)
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn transport(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::TransportError, err.to_string())
    }

    /// True for errors caused by the user's input rather than a fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::MissingArgument | ErrorCode::InvalidArgument
        )
    }
}

// Storage code returns anyhow; keep an existing BotError, otherwise treat it
// as a storage fault.
impl From<anyhow::Error> for BotError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<BotError>() {
            Ok(bot_err) => bot_err,
            Err(err) => BotError::database(format!("{:#}", err)),
        }
    }
}

/// Result type for request handling.
pub type BotResult<T> = std::result::Result<T, BotError>;
