//! Telegram Bot API client and wire types.
//!
//! Covers the three methods the bot needs: `getMe` for startup validation,
//! `getUpdates` for long polling, and `sendMessage` for replies. Only the
//! fields the bot reads are modeled; unknown fields are ignored on decode.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infra::{GeofenceError, Result};

/// Default Telegram Bot API endpoint.
const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Label of the reply-keyboard button that requests the user's location.
pub const SHARE_LOCATION_LABEL: &str = "\u{1F4CD} Share location";

/// Envelope every Bot API response is wrapped in.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// One inbound update from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// An inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// A Telegram account, as attached to messages and returned by `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// Display label: the username when set, the first name otherwise.
    pub fn label(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.first_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// A shared location.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Reply keyboard shown under the input field.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
    pub one_time_keyboard: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_location: Option<bool>,
}

/// One-button keyboard that asks the client to share its location.
pub fn location_keyboard() -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup {
        keyboard: vec![vec![KeyboardButton {
            text: SHARE_LOCATION_LABEL.to_string(),
            request_location: Some(true),
        }]],
        resize_keyboard: true,
        one_time_keyboard: false,
    }
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyKeyboardMarkup>,
}

/// HTTP client for the Telegram Bot API.
pub struct BotClient {
    /// API base URL without the trailing slash.
    base_url: String,
    /// Bot token; part of every request path, never logged.
    token: String,
    /// Reusable HTTP client.
    client: reqwest::Client,
}

impl BotClient {
    /// Create a client against the production Telegram endpoint.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: TELEGRAM_API_URL.to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client against a custom endpoint (tests, proxies).
    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Fetch the bot's own account; fails on an invalid token.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({}), Duration::from_secs(10))
            .await
    }

    /// Long-poll for updates with `update_id >= offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        // The HTTP timeout has to outlast the server-side poll timeout.
        self.call(
            "getUpdates",
            &request,
            Duration::from_secs(timeout_secs + 10),
        )
        .await
    }

    /// Send a plain text reply.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup: None,
        };
        let _: serde_json::Value = self
            .call("sendMessage", &request, Duration::from_secs(10))
            .await?;
        Ok(())
    }

    /// Send a text reply together with a reply keyboard.
    pub async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        markup: &ReplyKeyboardMarkup,
    ) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup: Some(markup),
        };
        let _: serde_json::Value = self
            .call("sendMessage", &request, Duration::from_secs(10))
            .await?;
        Ok(())
    }

    /// POST one Bot API method and unwrap the response envelope.
    ///
    /// Errors mention the method name only; the URL embeds the token.
    async fn call<T, B>(&self, method: &str, body: &B, timeout: Duration) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self
            .client
            .post(self.method_url(method))
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| GeofenceError::Telegram(format!("{method}: {e}")))?;

        if !resp.status().is_success() {
            return Err(GeofenceError::Telegram(format!(
                "HTTP {} from {method}",
                resp.status()
            )));
        }

        let api: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| GeofenceError::Telegram(format!("{method}: {e}")))?;

        if !api.ok {
            return Err(GeofenceError::Telegram(format!(
                "{method}: {}",
                api.description.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        api.result
            .ok_or_else(|| GeofenceError::Telegram(format!("{method}: missing result")))
    }
}
