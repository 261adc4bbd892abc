//! Command and callback router.
//!
//! Every inbound event goes through [`Router::handle`], which picks exactly
//! one handler. For a text message the checks run in this order:
//!
//! | # | Input | Handler |
//! |---|-------|---------|
//! | 1 | `/start` | welcome text, quick-action buttons |
//! | 2 | "Add task" button, `/add` without text | wait for task text, hide buttons |
//! | 3 | `/add <text>` | add task |
//! | 4 | "My tasks" button, `/mytasks`, `/list` | list tasks with inline actions |
//! | 5 | `/cancel` | drop pending action |
//! | 6 | `/delete <id>` | delete task |
//! | 7 | `/edit <id> <text>` | replace task text |
//! | 9 | free-form text | resolve the pending action, if any |
//! | 10 | other `/...` | ignored |
//!
//! Inline button presses (row 8) are callbacks and never reach the text
//! checks. `/help` resends the welcome text without touching the keyboard.

pub mod command;

use crate::config::{Messages, with_id};
use crate::db::Database;
use crate::error::{BotError, BotResult, ErrorCode};
use crate::pending::PendingActions;
use crate::transport::{
    ChatTransport, EventKind, InboundEvent, MAX_MESSAGE_UNITS, MessageRef, ReplyMarkup,
    truncate_message,
};
use crate::types::{ChatId, PendingAction, Task, TaskId, UserId};
use command::{CallbackAction, CallbackParseError, Command, parse_edit_args, parse_task_id};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dispatches inbound events to the task store and replies through the
/// transport.
#[derive(Clone)]
pub struct Router {
    db: Database,
    pending: Arc<PendingActions>,
    transport: Arc<dyn ChatTransport>,
    messages: Arc<Messages>,
}

/// Render one task the way it appears in the list.
pub fn format_task_line(task: &Task) -> String {
    truncate_message(&format!("{}. {}", task.id, task.text), MAX_MESSAGE_UNITS)
}

impl Router {
    pub fn new(
        db: Database,
        pending: Arc<PendingActions>,
        transport: Arc<dyn ChatTransport>,
        messages: Arc<Messages>,
    ) -> Self {
        Self {
            db,
            pending,
            transport,
            messages,
        }
    }

    /// Handle one inbound event to completion.
    ///
    /// Storage faults are reported to the user as a generic failure and do
    /// not fail the call. Transport faults are returned.
    pub async fn handle(&self, event: InboundEvent) -> BotResult<()> {
        let InboundEvent {
            user_id,
            chat_id,
            kind,
        } = event;

        match kind {
            EventKind::Text { text } => {
                let result = self.handle_text(user_id, chat_id, &text).await;
                match result {
                    Err(err) if err.code == ErrorCode::DatabaseError => {
                        warn!(user_id, error = %err, "Storage failure while handling message");
                        self.send(
                            chat_id,
                            &self.messages.storage_failure,
                            ReplyMarkup::QuickActions,
                        )
                        .await
                    }
                    other => other,
                }
            }
            EventKind::Callback { id, data, message } => {
                let result = self
                    .handle_callback(user_id, chat_id, &id, &data, message)
                    .await;
                match result {
                    Err(err) if err.code == ErrorCode::DatabaseError => {
                        warn!(user_id, error = %err, "Storage failure while handling button");
                        self.answer(&id, Some(self.messages.storage_failure.as_str()), true)
                            .await
                    }
                    other => other,
                }
            }
        }
    }

    async fn handle_text(&self, user_id: UserId, chat_id: ChatId, raw: &str) -> BotResult<()> {
        let text = raw.trim();
        if text.is_empty() {
            return Ok(());
        }

        if let Some(command) = Command::parse(text) {
            debug!(user_id, ?command, "Dispatching command");
            return self.handle_command(user_id, chat_id, command).await;
        }

        if text == self.messages.add_button.trim() {
            return self.prompt_new_task(user_id, chat_id).await;
        }
        if text == self.messages.list_button.trim() {
            return self.send_task_list(user_id, chat_id).await;
        }

        self.handle_free_text(user_id, chat_id, text).await
    }

    async fn handle_command(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        command: Command,
    ) -> BotResult<()> {
        match command {
            Command::Start => {
                self.send(chat_id, &self.messages.welcome, ReplyMarkup::QuickActions)
                    .await
            }
            Command::Help => {
                self.send(chat_id, &self.messages.welcome, ReplyMarkup::None)
                    .await
            }
            Command::Add(None) => self.prompt_new_task(user_id, chat_id).await,
            Command::Add(Some(text)) => self.add_task(user_id, chat_id, &text).await,
            Command::List => self.send_task_list(user_id, chat_id).await,
            Command::Cancel => self.cancel(user_id, chat_id).await,
            Command::Delete(arg) => self.delete_by_command(user_id, chat_id, &arg).await,
            Command::Edit(arg) => self.edit_by_command(user_id, chat_id, &arg).await,
            Command::Unknown(name) => {
                debug!(user_id, command = %name, "Ignoring unknown command");
                Ok(())
            }
        }
    }

    async fn prompt_new_task(&self, user_id: UserId, chat_id: ChatId) -> BotResult<()> {
        self.pending.set_awaiting_add(user_id);
        self.send(
            chat_id,
            &self.messages.prompt_new_task,
            ReplyMarkup::RemoveKeyboard,
        )
        .await
    }

    async fn add_task(&self, user_id: UserId, chat_id: ChatId, text: &str) -> BotResult<()> {
        let id = self.db.add_task(user_id, text)?;
        info!(user_id, task_id = id, "Task added");
        self.send(
            chat_id,
            &with_id(&self.messages.task_added, id),
            ReplyMarkup::QuickActions,
        )
        .await
    }

    async fn send_task_list(&self, user_id: UserId, chat_id: ChatId) -> BotResult<()> {
        let tasks = self.db.list_tasks(user_id)?;
        if tasks.is_empty() {
            return self
                .send(chat_id, &self.messages.no_tasks, ReplyMarkup::QuickActions)
                .await;
        }

        for task in &tasks {
            self.send(
                chat_id,
                &format_task_line(task),
                ReplyMarkup::TaskActions(task.id),
            )
            .await?;
        }
        self.send(chat_id, &self.messages.choose_next, ReplyMarkup::QuickActions)
            .await
    }

    async fn cancel(&self, user_id: UserId, chat_id: ChatId) -> BotResult<()> {
        let text = if self.pending.clear(user_id) {
            &self.messages.cancelled
        } else {
            &self.messages.nothing_to_cancel
        };
        self.send(chat_id, text, ReplyMarkup::QuickActions).await
    }

    async fn delete_by_command(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        arg: &str,
    ) -> BotResult<()> {
        let task_id = match parse_task_id(arg) {
            Ok(id) => id,
            Err(err) => return self.usage_hint(chat_id, err, &self.messages.delete_usage).await,
        };

        let text = if self.db.delete_task(user_id, task_id)? {
            info!(user_id, task_id, "Task deleted");
            &self.messages.task_deleted
        } else {
            &self.messages.not_found
        };
        self.send(chat_id, text, ReplyMarkup::QuickActions).await
    }

    async fn edit_by_command(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        arg: &str,
    ) -> BotResult<()> {
        let (task_id, new_text) = match parse_edit_args(arg) {
            Ok(parsed) => parsed,
            Err(err) => return self.usage_hint(chat_id, err, &self.messages.edit_usage).await,
        };

        let text = if self.db.edit_task(user_id, task_id, &new_text)? {
            info!(user_id, task_id, "Task edited");
            with_id(&self.messages.task_updated, task_id)
        } else {
            self.messages.not_found.clone()
        };
        self.send(chat_id, &text, ReplyMarkup::QuickActions).await
    }

    async fn handle_free_text(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        text: &str,
    ) -> BotResult<()> {
        let action = self.pending.take(user_id);
        if let Some(action) = action {
            debug!(user_id, pending = action.as_str(), "Consumed pending action");
        }
        match action {
            Some(PendingAction::AwaitingEditText(task_id)) => {
                let text = if self.db.edit_task(user_id, task_id, text)? {
                    info!(user_id, task_id, "Task edited");
                    with_id(&self.messages.task_updated, task_id)
                } else {
                    self.messages.edit_failed.clone()
                };
                self.send(chat_id, &text, ReplyMarkup::QuickActions).await
            }
            Some(PendingAction::AwaitingNewTaskText) => self.add_task(user_id, chat_id, text).await,
            None => {
                self.send(
                    chat_id,
                    &self.messages.no_pending_hint,
                    ReplyMarkup::QuickActions,
                )
                .await
            }
        }
    }

    async fn handle_callback(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        callback_id: &str,
        data: &str,
        message: Option<MessageRef>,
    ) -> BotResult<()> {
        let action = match CallbackAction::parse(data) {
            Ok(action) => action,
            Err(err) => {
                debug!(user_id, data, error = %err, "Rejected button payload");
                let (text, show_alert) = match err {
                    CallbackParseError::MissingSeparator => (&self.messages.unknown_button, false),
                    CallbackParseError::InvalidId => (&self.messages.invalid_id, false),
                    CallbackParseError::UnknownAction => (&self.messages.unknown_action, true),
                };
                return self.answer(callback_id, Some(text.as_str()), show_alert).await;
            }
        };

        match action {
            CallbackAction::Delete(task_id) => {
                self.delete_by_button(user_id, task_id, callback_id, message)
                    .await
            }
            CallbackAction::Edit(task_id) => {
                self.select_for_edit(user_id, chat_id, task_id, callback_id)
                    .await
            }
        }
    }

    async fn delete_by_button(
        &self,
        user_id: UserId,
        task_id: TaskId,
        callback_id: &str,
        message: Option<MessageRef>,
    ) -> BotResult<()> {
        if !self.db.delete_task(user_id, task_id)? {
            return self
                .answer(callback_id, Some(self.messages.not_found.as_str()), true)
                .await;
        }
        info!(user_id, task_id, "Task deleted");

        // Cosmetic only: the message may already be gone or edited.
        if let Some(message) = message {
            let text = with_id(&self.messages.task_deleted_inline, task_id);
            if let Err(err) = self.transport.edit_message_text(message, &text).await {
                debug!(user_id, task_id, error = %err, "Could not rewrite deleted task message");
            }
        }

        self.answer(callback_id, Some(self.messages.task_deleted_toast.as_str()), false)
            .await
    }

    async fn select_for_edit(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        task_id: TaskId,
        callback_id: &str,
    ) -> BotResult<()> {
        if self.db.get_task(user_id, task_id)?.is_none() {
            return self
                .answer(callback_id, Some(self.messages.edit_target_not_found.as_str()), true)
                .await;
        }

        self.pending.set_awaiting_edit(user_id, task_id);
        // The callback is acknowledged even when the prompt cannot be sent.
        self.answer(callback_id, None, false).await?;
        self.send(
            chat_id,
            &self.messages.prompt_edit_text,
            ReplyMarkup::RemoveKeyboard,
        )
        .await
    }

    async fn usage_hint(&self, chat_id: ChatId, err: BotError, usage: &str) -> BotResult<()> {
        debug!(error = %err, "Rejected command arguments");
        self.send(chat_id, usage, ReplyMarkup::None).await
    }

    async fn send(&self, chat_id: ChatId, text: &str, markup: ReplyMarkup) -> BotResult<()> {
        self.transport
            .send_message(chat_id, text, markup)
            .await
            .map_err(BotError::transport)?;
        Ok(())
    }

    async fn answer(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> BotResult<()> {
        self.transport
            .answer_callback(callback_id, text, show_alert)
            .await
            .map_err(BotError::transport)
    }
}
