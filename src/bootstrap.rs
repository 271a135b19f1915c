// src/bootstrap.rs
//! Wires a `Relay` from validated configuration. Shared by both binaries.

use tracing::{info, warn};

use crate::analyze::{Classifier, KeywordClassifier, OpenAiChat, OpenAiClassifier, OpenAiEnhancer};
use crate::config::{Channel, ClassifierStrategy, Credentials, RelayConfig};
use crate::error::{RelayError, Result};
use crate::item::JsonFileReader;
use crate::ledger::DedupLedger;
use crate::notify::{DiscordDispatcher, Dispatcher, DryRunDispatcher, TelegramDispatcher};
use crate::relay::Relay;
use crate::render::{Markup, Renderer};

/// Build every component. Call `RelayConfig::validate` first; missing
/// credentials still surface here as `RelayError::Config`.
pub async fn build_relay(cfg: &RelayConfig, creds: &Credentials) -> Result<Relay> {
    let timeout = cfg.request_timeout();

    let classifier: Box<dyn Classifier> = match cfg.classifier.strategy {
        ClassifierStrategy::Keywords => {
            Box::new(KeywordClassifier::new(cfg.classifier.keywords.clone()))
        }
        ClassifierStrategy::Openai => {
            let chat = OpenAiChat::new(
                creds.openai_api_key()?,
                &cfg.openai.model,
                &cfg.openai.api_base,
                timeout,
            )?;
            Box::new(OpenAiClassifier::new(chat, cfg.classifier.fallback))
        }
    };

    let dispatcher = build_dispatcher(cfg, creds)?;

    let mut renderer = Renderer::new(dispatcher.markup(), &cfg.render.promo_link)
        .with_book(cfg.render.templates.book()?)
        .with_labels(&cfg.render.link_label, &cfg.render.promo_label)
        .with_max_text_chars(cfg.render.max_text_chars);
    if let Some(limit) = dispatcher.max_message_chars() {
        renderer = renderer.with_max_message_chars(limit);
    }

    let ledger = DedupLedger::load(&cfg.ledger_path).await;

    // Safe diagnostics: names and paths only
    info!(
        item = %cfg.item_path.display(),
        ledger = %cfg.ledger_path.display(),
        classifier = classifier.name(),
        channel = dispatcher.name(),
        markup = ?dispatcher.markup(),
        enhance = cfg.enhance.enabled,
        "relay configured"
    );

    let mut relay = Relay::new(
        Box::new(JsonFileReader::new(&cfg.item_path)),
        classifier,
        renderer,
        dispatcher,
        ledger,
    );

    if cfg.enhance.enabled {
        let model = cfg.enhance.model.as_deref().unwrap_or(&cfg.openai.model);
        let chat = OpenAiChat::new(creds.openai_api_key()?, model, &cfg.openai.api_base, timeout)?;
        relay = relay.with_enhancer(Box::new(OpenAiEnhancer::new(chat)));
    }

    Ok(relay)
}

fn build_dispatcher(cfg: &RelayConfig, creds: &Credentials) -> Result<Box<dyn Dispatcher>> {
    let timeout = cfg.request_timeout();
    Ok(match cfg.delivery.channel {
        Channel::Telegram => {
            let chat_id = cfg
                .delivery
                .chat_id
                .as_deref()
                .ok_or_else(|| RelayError::Config("telegram chat id missing".into()))?;
            Box::new(
                TelegramDispatcher::new(
                    creds.telegram_bot_token()?,
                    chat_id,
                    &cfg.delivery.api_base,
                    timeout,
                )?
                .with_markup(cfg.delivery.markup),
            )
        }
        Channel::Discord => {
            if cfg.delivery.markup != Markup::default() && cfg.delivery.markup != Markup::Discord {
                warn!("discord always uses discord markup; delivery.markup ignored");
            }
            Box::new(
                DiscordDispatcher::new(creds.discord_webhook_url()?.to_string()).with_timeout(timeout),
            )
        }
        Channel::DryRun => Box::new(DryRunDispatcher::new(cfg.delivery.markup)),
    })
}
