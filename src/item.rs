// src/item.rs
//! Reader for the "latest item" record written by the external scraper.
//!
//! A missing or malformed record is the normal idle state: readers return
//! `None` and never surface an error to the controller.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fingerprint::Fingerprint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    /// Non-empty, trimmed.
    pub text: String,
    /// Possibly empty.
    pub link: String,
}

impl RawItem {
    /// Returns `None` when `text` is empty after trimming.
    pub fn new(text: impl AsRef<str>, link: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            link: link.as_ref().trim().to_string(),
        })
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.text)
    }
}

#[async_trait::async_trait]
pub trait ItemReader: Send + Sync {
    async fn read(&self) -> Option<RawItem>;
    fn name(&self) -> &'static str;
}

/// On-disk shape. `tweet` / `tweet_link` are the scraper's historical keys.
#[derive(Debug, Deserialize)]
struct ItemRecord {
    #[serde(default, alias = "tweet")]
    text: Option<String>,
    #[serde(default, alias = "tweet_link")]
    link: Option<String>,
}

/// Parse a JSON record into a `RawItem`. Any malformation yields `None`.
pub fn parse_item(raw: &str) -> Option<RawItem> {
    let record: ItemRecord = match serde_json::from_str(raw) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "malformed item record");
            return None;
        }
    };
    RawItem::new(record.text?, record.link.unwrap_or_default())
}

/// Reads a JSON file such as `{"text": "...", "link": "https://..."}`.
#[derive(Debug, Clone)]
pub struct JsonFileReader {
    path: PathBuf,
}

impl JsonFileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ItemReader for JsonFileReader {
    async fn read(&self) -> Option<RawItem> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no item file yet");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "item file unreadable");
                return None;
            }
        };
        parse_item(&raw)
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}
