// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod analyze;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod item;
pub mod ledger;
pub mod logging;
pub mod metrics;
pub mod notify;
pub mod relay;
pub mod render;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{Category, Classifier};
pub use crate::error::{RelayError, Result};
pub use crate::fingerprint::Fingerprint;
pub use crate::item::{ItemReader, RawItem};
pub use crate::ledger::DedupLedger;
pub use crate::notify::Dispatcher;
pub use crate::relay::{PassOutcome, Relay};
pub use crate::render::{Markup, RenderedMessage, Renderer};
