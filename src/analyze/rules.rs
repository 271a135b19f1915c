//! Keyword classifier.
//!
//! Phrases match on whole words, case-insensitively, with whitespace and
//! punctuation ignored ("Mainnet!" matches `mainnet`, "programming" does not
//! match `gm`). Promote phrases are checked first; the first hit wins:
//! - any promote phrase  -> `important`
//! - any suppress phrase -> `ignore`
//! - otherwise           -> `normal`

use serde::{Deserialize, Serialize};

use super::{Category, Classifier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRules {
    #[serde(default = "default_promote")]
    pub promote: Vec<String>,
    #[serde(default = "default_suppress")]
    pub suppress: Vec<String>,
}

fn default_promote() -> Vec<String> {
    [
        "partnership",
        "launch",
        "launching",
        "mainnet",
        "airdrop",
        "listing",
        "integration",
        "security",
        "exploit",
        "announcement",
        "big news",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_suppress() -> Vec<String> {
    ["meme", "gm", "gn", "shitpost", "just vibing", "wen"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self {
            promote: default_promote(),
            suppress: default_suppress(),
        }
    }
}

impl KeywordRules {
    /// Pure decision used by the classifier.
    pub fn categorize(&self, text: &str) -> Category {
        let words = tokenize(text);
        if first_match(&words, &self.promote).is_some() {
            return Category::Important;
        }
        if first_match(&words, &self.suppress).is_some() {
            return Category::Ignore;
        }
        Category::Normal
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    rules: KeywordRules,
}

impl KeywordClassifier {
    pub fn new(rules: KeywordRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &KeywordRules {
        &self.rules
    }
}

#[async_trait::async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Category {
        let category = self.rules.categorize(text);
        tracing::debug!(%category, "keyword classification");
        category
    }

    fn name(&self) -> &'static str {
        "keywords"
    }
}

// --- internals ---

fn first_match<'a>(words: &[String], phrases: &'a [String]) -> Option<&'a str> {
    phrases
        .iter()
        .find(|p| contains_phrase(words, &tokenize(p)))
        .map(String::as_str)
}

/// Empty phrases never match.
fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
    if phrase.is_empty() || phrase.len() > words.len() {
        return false;
    }
    words.windows(phrase.len()).any(|w| w == phrase)
}

/// Alphanumeric tokens, lower-case.
fn tokenize(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
