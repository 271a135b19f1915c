//! OpenAI adapter: chat-completion client, classifier strategy and text enhancer.
//!
//! Both consumers are total: transport errors, non-2xx statuses, timeouts and
//! off-enumeration replies are logged and resolved to a safe value.

use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};

use super::{Category, Classifier};
use crate::error::{RelayError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

const CLASSIFY_SYSTEM: &str = "You classify announcements posted by a web3 project. \
Label the post 'important', 'normal' or 'ignore' based on its content. \
Use 'ignore' for memes, greetings and low-effort posts.";

const ENHANCE_SYSTEM: &str = "You are a social media editor. Rewrite the post to be more \
engaging, with a few emojis and some excitement, without changing its meaning. \
Output only the rewritten post.";

/// Thin Chat Completions client shared by the classifier and the enhancer.
#[derive(Clone)]
pub struct OpenAiChat {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiChat {
    /// `api_base` is e.g. `https://api.openai.com/v1`; `timeout` bounds the whole call.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tweet-relay/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout.min(Duration::from_secs(4)))
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One-shot completion. Returns the first choice's content, trimmed.
    pub async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            #[serde(default)]
            content: Option<String>,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.2,
            max_tokens,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| RelayError::OpenAi(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RelayError::OpenAi(format!("status {status}")));
        }
        let body: Resp = resp
            .json()
            .await
            .map_err(|e| RelayError::OpenAi(format!("decode: {e}")))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RelayError::OpenAi("empty completion".into()))
    }
}

/// Classifier strategy backed by a chat model.
pub struct OpenAiClassifier {
    chat: OpenAiChat,
    fallback: Category,
}

impl OpenAiClassifier {
    pub fn new(chat: OpenAiChat, fallback: Category) -> Self {
        Self { chat, fallback }
    }

    /// Raw call + validation, without the fallback applied.
    pub async fn request_category(&self, text: &str) -> Result<Category> {
        let prompt = format!(
            "Post:\n\n{text}\n\nAnswer with exactly one word: important, normal or ignore."
        );
        let reply = self.chat.complete(CLASSIFY_SYSTEM, &prompt, 5).await?;
        Category::parse_label(&reply)
            .ok_or_else(|| RelayError::Classification(format!("off-enumeration reply: {reply:?}")))
    }
}

#[async_trait::async_trait]
impl Classifier for OpenAiClassifier {
    async fn classify(&self, text: &str) -> Category {
        match self.request_category(text).await {
            Ok(category) => category,
            Err(e) => {
                counter!("relay_classifier_fallback_total").increment(1);
                tracing::warn!(error = %e, fallback = %self.fallback, "classifier fell back");
                self.fallback
            }
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Optional rewrite step between classification and rendering.
#[async_trait::async_trait]
pub trait Enhancer: Send + Sync {
    /// Total: returns the input unchanged when the rewrite is unavailable.
    async fn enhance(&self, text: &str) -> String;
}

pub struct OpenAiEnhancer {
    chat: OpenAiChat,
}

impl OpenAiEnhancer {
    pub fn new(chat: OpenAiChat) -> Self {
        Self { chat }
    }
}

#[async_trait::async_trait]
impl Enhancer for OpenAiEnhancer {
    async fn enhance(&self, text: &str) -> String {
        let prompt = format!("Original post:\n{text}");
        match self.chat.complete(ENHANCE_SYSTEM, &prompt, 400).await {
            Ok(rewritten) => rewritten,
            Err(e) => {
                tracing::warn!(error = %e, "enhancer unavailable, keeping original text");
                text.to_string()
            }
        }
    }
}
