//! Task Chat Bot Library
//!
//! A personal task list driven through Telegram. This module exports the
//! core components for testing and integration.

pub mod bot;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod pending;
pub mod router;
pub mod transport;
pub mod types;
