//! Logs messages instead of sending them. Useful for local runs and demos.

use super::Dispatcher;
use crate::error::Result;
use crate::render::{Markup, RenderedMessage};

#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunDispatcher {
    markup: Markup,
}

impl DryRunDispatcher {
    pub fn new(markup: Markup) -> Self {
        Self { markup }
    }
}

#[async_trait::async_trait]
impl Dispatcher for DryRunDispatcher {
    async fn dispatch(&self, message: &RenderedMessage) -> Result<()> {
        tracing::info!(target: "relay::dry_run", markup = ?message.markup(), "\n{message}");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry_run"
    }

    fn markup(&self) -> Markup {
        self.markup
    }
}
