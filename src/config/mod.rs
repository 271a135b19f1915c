// src/config/mod.rs
//! Process configuration.
//!
//! Lookup order for the settings file:
//! 1) $RELAY_CONFIG_PATH (must exist)
//! 2) config/relay.toml
//! 3) built-in defaults
//!
//! Environment overrides are applied on top. Credentials are read from the
//! environment only and checked by `validate` before the poll loop starts.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::analyze::{ai_adapter, Category, KeywordRules, DEFAULT_FALLBACK};
use crate::error::{RelayError, Result};
use crate::notify::telegram;
use crate::render::{self, templates, Markup, Template, TemplateBook};

pub const ENV_CONFIG_PATH: &str = "RELAY_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/relay.toml";
pub const ENV_POLL_INTERVAL: &str = "RELAY_POLL_INTERVAL_SECS";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub item_path: PathBuf,
    pub ledger_path: PathBuf,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// `/metrics` + `/health` listener; disabled when unset.
    pub metrics_addr: Option<SocketAddr>,
    pub classifier: ClassifierConfig,
    pub openai: OpenAiConfig,
    pub enhance: EnhanceConfig,
    pub render: RenderConfig,
    pub delivery: DeliveryConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            item_path: PathBuf::from("latest_tweet.json"),
            ledger_path: PathBuf::from("state/processed_tweets.json"),
            poll_interval_secs: 60,
            request_timeout_secs: 10,
            metrics_addr: None,
            classifier: ClassifierConfig::default(),
            openai: OpenAiConfig::default(),
            enhance: EnhanceConfig::default(),
            render: RenderConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    #[default]
    Keywords,
    #[serde(alias = "ai")]
    Openai,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub strategy: ClassifierStrategy,
    /// Category used when the external classifier fails or answers off-set.
    pub fallback: Category,
    pub keywords: KeywordRules,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy: ClassifierStrategy::default(),
            fallback: DEFAULT_FALLBACK,
            keywords: KeywordRules::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: ai_adapter::DEFAULT_API_BASE.to_string(),
            model: ai_adapter::DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    pub enabled: bool,
    /// Defaults to `openai.model`.
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub promo_link: String,
    pub promo_label: String,
    pub link_label: String,
    pub max_text_chars: usize,
    pub templates: TemplatesConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            promo_link: render::DEFAULT_PROMO_LINK.to_string(),
            promo_label: render::DEFAULT_PROMO_LABEL.to_string(),
            link_label: render::DEFAULT_LINK_LABEL.to_string(),
            max_text_chars: render::DEFAULT_MAX_TEXT_CHARS,
            templates: TemplatesConfig::default(),
        }
    }
}

/// Omitted sets fall back to the built-in templates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub important: Option<Vec<Template>>,
    pub normal: Option<Vec<Template>>,
}

impl TemplatesConfig {
    pub fn book(&self) -> Result<TemplateBook> {
        TemplateBook::new(
            self.important.clone().unwrap_or_else(templates::default_important),
            self.normal.clone().unwrap_or_else(templates::default_normal),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Telegram,
    Discord,
    #[serde(alias = "dry-run")]
    DryRun,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub channel: Channel,
    /// Telegram/dry-run only; Discord always uses Discord markup.
    pub markup: Markup,
    pub api_base: String,
    /// Destination chat (Telegram). Overridden by $TELEGRAM_CHAT_ID.
    pub chat_id: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            channel: Channel::default(),
            markup: Markup::default(),
            api_base: telegram::DEFAULT_API_BASE.to_string(),
            chat_id: None,
        }
    }
}

impl RelayConfig {
    /// Parse an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::Config(format!("reading config from {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| RelayError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Config(e.to_string()))
    }

    /// File lookup (see module docs) followed by environment overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(RelayError::Config(format!(
                    "{ENV_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                )));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = Path::new(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_non_empty(ENV_POLL_INTERVAL) {
            self.poll_interval_secs = v
                .parse()
                .map_err(|_| RelayError::Config(format!("{ENV_POLL_INTERVAL} is not a number: {v:?}")))?;
        }
        if let Some(v) = env_non_empty(ENV_CHAT_ID) {
            self.delivery.chat_id = Some(v);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Fail-fast startup check. Everything the poll loop needs must be present.
    pub fn validate(&self, creds: &Credentials) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(RelayError::Config("poll interval must be > 0".into()));
        }
        if self.classifier.strategy == ClassifierStrategy::Openai {
            creds.openai_api_key()?;
        }
        if self.enhance.enabled {
            creds.openai_api_key()?;
        }
        match self.delivery.channel {
            Channel::Telegram => {
                creds.telegram_bot_token()?;
                if self.delivery.markup == Markup::Discord {
                    return Err(RelayError::Config(
                        "telegram cannot render delivery.markup = \"discord\"".into(),
                    ));
                }
                if self.delivery.chat_id.as_deref().map_or(true, |c| c.trim().is_empty()) {
                    return Err(RelayError::Config(format!(
                        "telegram delivery needs a chat id ({ENV_CHAT_ID} or delivery.chat_id)"
                    )));
                }
            }
            Channel::Discord => {
                creds.discord_webhook_url()?;
            }
            Channel::DryRun => {}
        }
        self.render.templates.book()?;
        if self.classifier.fallback.is_suppressed() {
            tracing::warn!("classifier fallback is 'ignore': upstream failures will suppress items permanently");
        }
        Ok(())
    }
}

/// Secrets, environment only.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub discord_webhook_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Safe diagnostics: presence only
        f.debug_struct("Credentials")
            .field("openai_api_key", &self.openai_api_key.is_some())
            .field("telegram_bot_token", &self.telegram_bot_token.is_some())
            .field("discord_webhook_url", &self.discord_webhook_url.is_some())
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env_non_empty(ENV_OPENAI_API_KEY),
            telegram_bot_token: env_non_empty(ENV_TELEGRAM_BOT_TOKEN),
            discord_webhook_url: env_non_empty(ENV_DISCORD_WEBHOOK_URL),
        }
    }

    pub fn openai_api_key(&self) -> Result<&str> {
        required(&self.openai_api_key, ENV_OPENAI_API_KEY)
    }

    pub fn telegram_bot_token(&self) -> Result<&str> {
        required(&self.telegram_bot_token, ENV_TELEGRAM_BOT_TOKEN)
    }

    pub fn discord_webhook_url(&self) -> Result<&str> {
        required(&self.discord_webhook_url, ENV_DISCORD_WEBHOOK_URL)
    }
}

fn required<'a>(value: &'a Option<String>, var: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| RelayError::Config(format!("Missing {var} env var")))
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telegram_creds() -> Credentials {
        Credentials {
            telegram_bot_token: Some("123:abc".into()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = RelayConfig::from_toml("").unwrap();
        assert_eq!(cfg.poll_interval_secs, 60);
        assert_eq!(cfg.item_path, PathBuf::from("latest_tweet.json"));
        assert_eq!(cfg.classifier.strategy, ClassifierStrategy::Keywords);
        assert_eq!(cfg.classifier.fallback, Category::Normal);
        assert_eq!(cfg.delivery.channel, Channel::Telegram);
        assert_eq!(cfg.delivery.markup, Markup::MarkdownV2);
        assert_eq!(cfg.render.promo_link, "https://x.com/joinzo");
        assert!(cfg.metrics_addr.is_none());
    }

    #[test]
    fn nested_sections_parse() {
        let cfg = RelayConfig::from_toml(
            r#"
poll_interval_secs = 15
metrics_addr = "127.0.0.1:9108"

[classifier]
strategy = "openai"
fallback = "important"

[classifier.keywords]
promote = ["partnership"]
suppress = ["meme"]

[delivery]
channel = "dry_run"
markup = "html"

[[render.templates.important]]
emoji = "⚡"
headline = "Heads up!"
"#,
        )
        .unwrap();
        assert_eq!(cfg.poll_interval_secs, 15);
        assert_eq!(cfg.classifier.strategy, ClassifierStrategy::Openai);
        assert_eq!(cfg.classifier.fallback, Category::Important);
        assert_eq!(cfg.classifier.keywords.promote, vec!["partnership".to_string()]);
        assert_eq!(cfg.delivery.channel, Channel::DryRun);
        assert_eq!(cfg.delivery.markup, Markup::Html);
        let book = cfg.render.templates.book().unwrap();
        assert_eq!(book.for_category(Category::Important).len(), 1);
        assert_eq!(
            book.for_category(Category::Normal).len(),
            templates::default_normal().len()
        );
    }

    #[test]
    fn unknown_category_is_a_config_error() {
        let err = RelayConfig::from_toml("[classifier]\nfallback = \"urgent\"").unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn telegram_needs_token_and_chat() {
        let mut cfg = RelayConfig::default();
        assert!(cfg.validate(&Credentials::default()).is_err());
        assert!(cfg.validate(&telegram_creds()).is_err(), "chat id missing");
        cfg.delivery.chat_id = Some("-100123".into());
        cfg.validate(&telegram_creds()).unwrap();
    }

    #[test]
    fn openai_pieces_need_a_key() {
        let mut cfg = RelayConfig::default();
        cfg.delivery.channel = Channel::DryRun;
        cfg.validate(&Credentials::default()).unwrap();

        cfg.enhance.enabled = true;
        assert!(cfg.validate(&Credentials::default()).is_err());

        cfg.enhance.enabled = false;
        cfg.classifier.strategy = ClassifierStrategy::Openai;
        assert!(cfg.validate(&Credentials::default()).is_err());
        let creds = Credentials {
            openai_api_key: Some("sk-test".into()),
            ..Default::default()
        };
        cfg.validate(&creds).unwrap();
    }

    #[test]
    fn discord_needs_webhook_and_zero_interval_is_rejected() {
        let mut cfg = RelayConfig::default();
        cfg.delivery.channel = Channel::Discord;
        assert!(cfg.validate(&Credentials::default()).is_err());

        cfg.delivery.channel = Channel::DryRun;
        cfg.poll_interval_secs = 0;
        assert!(cfg.validate(&Credentials::default()).is_err());
    }

    #[test]
    fn empty_template_set_is_rejected() {
        let mut cfg = RelayConfig::default();
        cfg.delivery.channel = Channel::DryRun;
        cfg.render.templates.normal = Some(vec![]);
        assert!(cfg.validate(&Credentials::default()).is_err());
    }

    #[test]
    fn telegram_rejects_discord_markup() {
        let mut cfg = RelayConfig::default();
        cfg.delivery.chat_id = Some("-100123".into());
        cfg.delivery.markup = Markup::Discord;
        assert!(matches!(cfg.validate(&telegram_creds()), Err(RelayError::Config(_))));
    }

    #[test]
    fn credentials_debug_hides_values() {
        let s = format!("{:?}", telegram_creds());
        assert!(!s.contains("abc"));
    }
}
