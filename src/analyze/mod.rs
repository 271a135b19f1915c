// src/analyze/mod.rs
//! Classification: maps raw text onto the closed `Category` set.
//!
//! Two strategies share the `Classifier` contract:
//! - `rules::KeywordClassifier`: deterministic phrase matching, no I/O
//! - `ai_adapter::OpenAiClassifier`: chat-completion call with reply validation
//!
//! `classify` is total. Dependency failures resolve to a non-suppressing
//! fallback so a flaky upstream can never permanently bury real content.

pub mod ai_adapter;
pub mod rules;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::analyze::ai_adapter::{Enhancer, OpenAiChat, OpenAiClassifier, OpenAiEnhancer};
pub use crate::analyze::rules::{KeywordClassifier, KeywordRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Important,
    Normal,
    /// Terminal: the fingerprint is suppressed forever.
    Ignore,
}

/// Used when a classifier cannot produce a valid answer.
pub const DEFAULT_FALLBACK: Category = Category::Normal;

static RE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^[\s"'`*]*(important|normal|ignore)[\s"'`*.!]*$"#).expect("valid label regex")
});

impl Category {
    pub const ALL: [Category; 3] = [Category::Important, Category::Normal, Category::Ignore];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Important => "important",
            Category::Normal => "normal",
            Category::Ignore => "ignore",
        }
    }

    pub fn is_suppressed(self) -> bool {
        matches!(self, Category::Ignore)
    }

    /// Validate a free-form label (e.g. a model reply). Tolerates surrounding
    /// quotes, emphasis and trailing punctuation; anything else is `None`.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let caps = RE_LABEL.captures(raw)?;
        match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
            "important" => Some(Category::Important),
            "normal" => Some(Category::Normal),
            "ignore" => Some(Category::Ignore),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Always returns a member of the closed set.
    async fn classify(&self, text: &str) -> Category;
    /// Strategy name for diagnostics.
    fn name(&self) -> &'static str;
}
