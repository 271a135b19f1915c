use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Dispatcher;
use crate::error::{RelayError, Result};
use crate::render::{Markup, RenderedMessage};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// `sendMessage` text limit. Counted on the raw text, which is never shorter
/// than the parsed one.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Telegram Bot API `sendMessage` to one fixed chat.
#[derive(Clone)]
pub struct TelegramDispatcher {
    client: Client,
    // Carries the bot token; never log it.
    endpoint: String,
    chat_id: String,
    markup: Markup,
}

impl TelegramDispatcher {
    pub fn new(bot_token: &str, chat_id: impl Into<String>, api_base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(4)))
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/bot{bot_token}/sendMessage", api_base.trim_end_matches('/')),
            chat_id: chat_id.into(),
            markup: Markup::MarkdownV2,
        })
    }

    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait::async_trait]
impl Dispatcher for TelegramDispatcher {
    async fn dispatch(&self, message: &RenderedMessage) -> Result<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: message.as_str(),
            parse_mode: message.markup().telegram_parse_mode(),
        };

        let rsp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Delivery(format!("telegram request failed: {}", e.without_url())))?;

        let status = rsp.status();
        let parsed: Option<ApiResponse> = rsp.json().await.ok();
        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiResponse { description, .. }) => Err(RelayError::Delivery(format!(
                "telegram rejected message ({status}): {}",
                description.unwrap_or_else(|| "no description".into())
            ))),
            None => Err(RelayError::Delivery(format!(
                "telegram returned unreadable body ({status})"
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "telegram"
    }

    fn markup(&self) -> Markup {
        self.markup
    }

    fn max_message_chars(&self) -> Option<usize> {
        Some(MAX_MESSAGE_CHARS)
    }
}
