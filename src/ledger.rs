// src/ledger.rs
//! Durable dedup ledger: last accepted fingerprint + suppressed fingerprints.
//!
//! Loaded once at startup, rewritten in full (temp file + rename) after every
//! terminal decision. A missing or corrupt file loads as an empty ledger.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::fingerprint::Fingerprint;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    #[serde(default, alias = "last_tweet_hash")]
    pub last_accepted_fingerprint: Option<Fingerprint>,
    #[serde(default, alias = "ignored_hashes")]
    pub suppressed_fingerprints: BTreeSet<Fingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct DedupLedger {
    path: PathBuf,
    state: LedgerState,
}

impl DedupLedger {
    /// Load from `path`. Never fails: missing/corrupt state yields an empty ledger.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(s) => match serde_json::from_str::<LedgerState>(&s) {
                Ok(state) => {
                    tracing::info!(
                        path = %path.display(),
                        suppressed = state.suppressed_fingerprints.len(),
                        has_last = state.last_accepted_fingerprint.is_some(),
                        "ledger loaded"
                    );
                    state
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt ledger, starting empty");
                    LedgerState::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no ledger yet, starting empty");
                LedgerState::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ledger unreadable, starting empty");
                LedgerState::default()
            }
        };
        Self { path, state }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn last_accepted(&self) -> Option<&Fingerprint> {
        self.state.last_accepted_fingerprint.as_ref()
    }

    pub fn is_suppressed(&self, fp: &Fingerprint) -> bool {
        self.state.suppressed_fingerprints.contains(fp)
    }

    pub fn is_known(&self, fp: &Fingerprint) -> bool {
        self.last_accepted() == Some(fp) || self.is_suppressed(fp)
    }

    pub fn record_accepted(&mut self, fp: Fingerprint) {
        self.state.last_accepted_fingerprint = Some(fp);
    }

    pub fn record_suppressed(&mut self, fp: Fingerprint) {
        self.state.suppressed_fingerprints.insert(fp);
    }

    /// Write the full state atomically: a crash mid-write leaves the previous file intact.
    pub async fn persist(&mut self) -> Result<()> {
        self.state.updated_at = Some(Utc::now());
        let bytes = serde_json::to_vec_pretty(&self.state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = tmp_path(&self.path);
        let mut f = tokio::fs::File::create(&tmp).await?;
        f.write_all(&bytes).await?;
        f.sync_all().await?;
        drop(f);
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ledger".into());
    name.push(".tmp");
    path.with_file_name(name)
}
