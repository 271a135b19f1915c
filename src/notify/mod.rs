//! Outbound delivery.
//!
//! A `Dispatcher` makes one all-or-nothing send attempt and reports the
//! result. Retrying is the controller's business: a failed item is simply
//! picked up again on the next poll.

pub mod discord;
pub mod dry_run;
pub mod telegram;

use crate::error::Result;
use crate::render::{Markup, RenderedMessage};

pub use discord::DiscordDispatcher;
pub use dry_run::DryRunDispatcher;
pub use telegram::TelegramDispatcher;

#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync {
    /// `Err(RelayError::Delivery)` on any failure; never retries internally.
    async fn dispatch(&self, message: &RenderedMessage) -> Result<()>;
    /// Channel name for diagnostics.
    fn name(&self) -> &'static str;
    /// Markup the channel expects messages to be rendered in.
    fn markup(&self) -> Markup;
    /// Longest message the channel accepts, if it has a limit.
    fn max_message_chars(&self) -> Option<usize> {
        None
    }
}
