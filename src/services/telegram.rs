// src/services/telegram.rs

//! Telegram Bot API delivery.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::TelegramConfig;

/// Text formatting mode understood by the messaging surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// A message ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: ParseMode,
}

impl OutboundMessage {
    /// An HTML-formatted message for `chat_id`.
    pub fn html(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: ParseMode::Html,
        }
    }
}

/// Anything that can post a message to a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post one message; returns once the surface accepted it.
    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API client posting through `sendMessage`.
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
    debug: bool,
}

impl TelegramClient {
    /// Create a client from the bot settings.
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            debug: config.send_debug,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        if self.debug {
            log::debug!("sendMessage request: {}", serde_json::to_string(message)?);
        }

        let response = self
            .client
            .post(self.endpoint("sendMessage"))
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::delivery(e.without_url()))?;

        let status = response.status();
        let body = response.text().await.map_err(AppError::delivery)?;

        if self.debug {
            log::debug!("sendMessage response ({}): {}", status, body);
        }

        check_response(status, &body)
    }
}

/// Interpret a Bot API reply.
fn check_response(status: StatusCode, body: &str) -> Result<()> {
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(reply) if reply.ok && status.is_success() => Ok(()),
        Ok(reply) => Err(AppError::delivery(format!(
            "Telegram rejected message ({}): {}",
            status,
            reply.description.unwrap_or_default()
        ))),
        Err(_) => Err(AppError::delivery(format!(
            "Unexpected Telegram reply ({}): {}",
            status, body
        ))),
    }
}
