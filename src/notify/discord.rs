use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Dispatcher;
use crate::error::{RelayError, Result};
use crate::render::{Markup, RenderedMessage};

/// Discord rejects `content` longer than this.
pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Clone)]
pub struct DiscordDispatcher {
    // Secret: the webhook URL embeds its token.
    webhook: String,
    client: Client,
    timeout: Duration,
}

impl DiscordDispatcher {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct DiscordWebhookPayload<'a> {
    content: &'a str,
    allowed_mentions: AllowedMentions,
}

/// Empty `parse` list: item text can never ping users, roles or @everyone.
#[derive(Serialize, Default)]
struct AllowedMentions {
    parse: Vec<&'static str>,
}

#[async_trait::async_trait]
impl Dispatcher for DiscordDispatcher {
    async fn dispatch(&self, message: &RenderedMessage) -> Result<()> {
        if message.as_str().chars().count() > MAX_CONTENT_CHARS {
            return Err(RelayError::Delivery(format!(
                "discord content exceeds {MAX_CONTENT_CHARS} chars"
            )));
        }

        let rsp = self
            .client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(&DiscordWebhookPayload {
                content: message.as_str(),
                allowed_mentions: AllowedMentions::default(),
            })
            .send()
            .await
            .map_err(|e| RelayError::Delivery(format!("discord request failed: {}", e.without_url())))?;

        rsp.error_for_status()
            .map_err(|e| RelayError::Delivery(format!("discord webhook HTTP error: {}", e.without_url())))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }

    fn markup(&self) -> Markup {
        Markup::Discord
    }

    fn max_message_chars(&self) -> Option<usize> {
        Some(MAX_CONTENT_CHARS)
    }
}
