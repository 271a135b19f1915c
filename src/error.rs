// src/error.rs

//! Error taxonomy for the relay.
//!
//! Per-cycle errors never stop the poll loop: the controller absorbs them and
//! retries on the next cycle. Only `Config` is fatal, and only at startup.

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Missing or corrupt input/ledger file. Treated as empty.
    #[error("input unavailable: {0}")]
    InputUnavailable(String),

    /// Classifier dependency failed or answered outside the category set.
    #[error("classification failed: {0}")]
    Classification(String),

    /// Outbound send failed; the ledger is left untouched.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Missing credential or invalid setting.
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat completion call failed (transport, status or body).
    #[error("OpenAI request failed: {0}")]
    OpenAi(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
