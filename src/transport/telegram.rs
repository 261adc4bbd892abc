//! Telegram Bot API transport over HTTPS long polling.

use super::{ChatTransport, EventKind, InboundEvent, MessageRef, ReplyMarkup, TransportError};
use crate::config::{Messages, TelegramConfig};
use crate::router::command::CallbackAction;
use crate::types::ChatId;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

/// Button captions rendered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonLabels {
    pub add: String,
    pub list: String,
    pub edit: String,
    pub delete: String,
}

impl ButtonLabels {
    pub fn from_messages(messages: &Messages) -> Self {
        Self {
            add: messages.add_button.clone(),
            list: messages.list_button.clone(),
            edit: messages.edit_button.clone(),
            delete: messages.delete_button.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TelegramApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
    #[serde(default)]
    pub callback_query: Option<TelegramCallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramCallbackQuery {
    pub id: String,
    pub from: TelegramUser,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

impl TelegramUpdate {
    /// Convert to an inbound event. Updates without a sender or without
    /// text (stickers, photos, channel posts) yield `None`.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(cb) = self.callback_query {
            let message = cb.message.as_ref().map(|m| MessageRef {
                chat_id: m.chat.id,
                message_id: m.message_id,
            });
            let chat_id = message.map_or(cb.from.id, |m| m.chat_id);
            return Some(InboundEvent {
                user_id: cb.from.id,
                chat_id,
                kind: EventKind::Callback {
                    id: cb.id,
                    data: cb.data.unwrap_or_default(),
                    message,
                },
            });
        }

        let msg = self.message?;
        let from = msg.from?;
        let text = msg.text?;
        Some(InboundEvent::text(from.id, msg.chat.id, text))
    }
}

/// Render a button layout as a Bot API `reply_markup` object.
pub fn render_markup(markup: ReplyMarkup, labels: &ButtonLabels) -> Option<Value> {
    match markup {
        ReplyMarkup::None => None,
        ReplyMarkup::QuickActions => Some(json!({
            "keyboard": [[
                { "text": labels.add },
                { "text": labels.list },
            ]],
            "resize_keyboard": true,
        })),
        ReplyMarkup::RemoveKeyboard => Some(json!({ "remove_keyboard": true })),
        ReplyMarkup::TaskActions(task_id) => Some(json!({
            "inline_keyboard": [[
                {
                    "text": labels.edit,
                    "callback_data": CallbackAction::Edit(task_id).payload(),
                },
                {
                    "text": labels.delete,
                    "callback_data": CallbackAction::Delete(task_id).payload(),
                },
            ]],
        })),
    }
}

/// Bot API client.
pub struct TelegramTransport {
    http: reqwest::Client,
    api_base: String,
    token: String,
    poll_timeout_secs: u64,
    labels: ButtonLabels,
}

impl TelegramTransport {
    pub fn new(
        config: &TelegramConfig,
        token: String,
        labels: ButtonLabels,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            token,
            poll_timeout_secs: config.poll_timeout_secs,
            labels,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: &Value,
    ) -> Result<T, TransportError> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);
        // The URL embeds the token; strip it from any error we keep.
        let http_err = |source: reqwest::Error| TransportError::Http {
            method,
            source: source.without_url(),
        };

        let res = self.http.post(url).json(body).send().await.map_err(http_err)?;
        let parsed = res
            .json::<TelegramApiResponse<T>>()
            .await
            .map_err(http_err)?;

        if !parsed.ok {
            return Err(TransportError::Api {
                method,
                description: parsed
                    .description
                    .unwrap_or_else(|| format!("telegram {} failed", method)),
            });
        }
        parsed.result.ok_or_else(|| TransportError::Api {
            method,
            description: "response has no result".to_string(),
        })
    }

    /// Bot username, used to check the token at startup.
    pub async fn get_me(&self) -> Result<String, TransportError> {
        let me: TelegramUser = self.call("getMe", &json!({})).await?;
        Ok(me.username.unwrap_or_else(|| me.id.to_string()))
    }

    /// Long-poll for updates after `offset`. Returns the updates and the
    /// offset to pass next time.
    pub async fn get_updates(
        &self,
        offset: i64,
    ) -> Result<(Vec<TelegramUpdate>, i64), TransportError> {
        let body = json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        let updates: Vec<TelegramUpdate> = self.call("getUpdates", &body).await?;
        let next_offset = next_offset(offset, &updates);
        Ok((updates, next_offset))
    }
}

/// Offset acknowledging every update in the batch.
pub fn next_offset(offset: i64, updates: &[TelegramUpdate]) -> i64 {
    updates
        .iter()
        .fold(offset, |acc, u| acc.max(u.update_id.saturating_add(1)))
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
    chat: TelegramChat,
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: ReplyMarkup,
    ) -> Result<MessageRef, TransportError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        if let Some(markup) = render_markup(markup, &self.labels) {
            body["reply_markup"] = markup;
        }

        let sent: SentMessage = self.call("sendMessage", &body).await?;
        Ok(MessageRef {
            chat_id: sent.chat.id,
            message_id: sent.message_id,
        })
    }

    async fn edit_message_text(
        &self,
        message: MessageRef,
        text: &str,
    ) -> Result<(), TransportError> {
        let body = json!({
            "chat_id": message.chat_id,
            "message_id": message.message_id,
            "text": text,
        });
        // Returns the edited Message, or `true` for inline messages.
        let _: Value = self.call("editMessageText", &body).await?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError> {
        let mut body = json!({ "callback_query_id": callback_id });
        if let Some(text) = text {
            body["text"] = json!(text);
            body["show_alert"] = json!(show_alert);
        }
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> ButtonLabels {
        ButtonLabels::from_messages(&Messages::default())
    }

    #[test]
    fn text_message_becomes_text_event() {
        let update: TelegramUpdate = serde_json::from_value(json!({
            "update_id": 10,
            "message": {
                "message_id": 5,
                "chat": { "id": 100, "type": "private" },
                "from": { "id": 42, "is_bot": false, "first_name": "A" },
                "text": "/add buy milk"
            }
        }))
        .unwrap();

        assert_eq!(
            update.into_event(),
            Some(InboundEvent::text(42, 100, "/add buy milk"))
        );
    }

    #[test]
    fn callback_carries_message_ref() {
        let update: TelegramUpdate = serde_json::from_value(json!({
            "update_id": 11,
            "callback_query": {
                "id": "cb-1",
                "from": { "id": 42, "is_bot": false, "first_name": "A" },
                "data": "delete:3",
                "message": { "message_id": 77, "chat": { "id": 100, "type": "private" } }
            }
        }))
        .unwrap();

        assert_eq!(
            update.into_event(),
            Some(InboundEvent::callback(
                42,
                100,
                "cb-1",
                "delete:3",
                Some(MessageRef { chat_id: 100, message_id: 77 })
            ))
        );
    }

    #[test]
    fn non_text_message_is_skipped() {
        let update: TelegramUpdate = serde_json::from_value(json!({
            "update_id": 12,
            "message": {
                "message_id": 6,
                "chat": { "id": 100, "type": "private" },
                "from": { "id": 42, "is_bot": false, "first_name": "A" },
                "sticker": {}
            }
        }))
        .unwrap();

        assert_eq!(update.into_event(), None);
    }

    #[test]
    fn next_offset_acknowledges_highest_update() {
        let updates: Vec<TelegramUpdate> = serde_json::from_value(json!([
            { "update_id": 7 },
            { "update_id": 9 },
            { "update_id": 8 },
        ]))
        .unwrap();
        assert_eq!(next_offset(0, &updates), 10);
        assert_eq!(next_offset(20, &updates), 20);
        assert_eq!(next_offset(5, &[]), 5);
    }

    #[test]
    fn task_actions_encode_payloads() {
        let markup = render_markup(ReplyMarkup::TaskActions(4), &labels()).unwrap();
        let row = &markup["inline_keyboard"][0];
        assert_eq!(row[0]["callback_data"], "edit:4");
        assert_eq!(row[1]["callback_data"], "delete:4");
    }

    #[test]
    fn quick_actions_and_removal() {
        let markup = render_markup(ReplyMarkup::QuickActions, &labels()).unwrap();
        assert_eq!(markup["keyboard"][0][0]["text"], "Add task");
        assert_eq!(markup["keyboard"][0][1]["text"], "My tasks");
        assert_eq!(markup["resize_keyboard"], true);

        let markup = render_markup(ReplyMarkup::RemoveKeyboard, &labels()).unwrap();
        assert_eq!(markup["remove_keyboard"], true);

        assert_eq!(render_markup(ReplyMarkup::None, &labels()), None);
    }

    // Same bound as `TelegramTransport::call`.
    fn parse_response<T: DeserializeOwned>(body: Value) -> TelegramApiResponse<T> {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn ok_response_parses_for_any_result_type() {
        let parsed: TelegramApiResponse<TelegramUser> = parse_response(json!({
            "ok": true,
            "result": { "id": 99, "is_bot": true, "first_name": "Bot", "username": "tasks_bot" }
        }));
        assert!(parsed.ok);
        let me = parsed.result.unwrap();
        assert_eq!(me.id, 99);
        assert_eq!(me.username.as_deref(), Some("tasks_bot"));

        let sent: TelegramApiResponse<SentMessage> = parse_response(json!({
            "ok": true,
            "result": { "message_id": 5, "chat": { "id": 100, "type": "private" }, "date": 0 }
        }));
        assert_eq!(sent.result.unwrap().message_id, 5);
    }

    #[test]
    fn api_error_response_parses() {
        let parsed: TelegramApiResponse<bool> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: message to edit not found"
        }))
        .unwrap();
        assert!(!parsed.ok);
        assert!(parsed.result.is_none());
        assert_eq!(
            parsed.description.as_deref(),
            Some("Bad Request: message to edit not found")
        );
    }
}
