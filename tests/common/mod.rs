// Shared test doubles for the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tweet_relay::analyze::{Category, Classifier, KeywordClassifier, KeywordRules};
use tweet_relay::notify::Dispatcher;
use tweet_relay::render::{Markup, RenderedMessage};
use tweet_relay::{ItemReader, RawItem, RelayError};

pub const PROMO: &str = "https://x.com/joinzo";

/// Reader whose current item can be swapped from the test.
#[derive(Clone, Default)]
pub struct StaticReader {
    item: Arc<Mutex<Option<RawItem>>>,
}

impl StaticReader {
    pub fn with(text: &str, link: &str) -> Self {
        let r = Self::default();
        r.set(text, link);
        r
    }

    pub fn set(&self, text: &str, link: &str) {
        *self.item.lock() = RawItem::new(text, link);
    }

    pub fn clear(&self) {
        *self.item.lock() = None;
    }
}

#[async_trait::async_trait]
impl ItemReader for StaticReader {
    async fn read(&self) -> Option<RawItem> {
        self.item.lock().clone()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Records every message; fails on demand.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    sent: Arc<Mutex<Vec<String>>>,
    attempts: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        let d = Self::default();
        d.set_failing(true);
        d
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(&self, message: &RenderedMessage) -> tweet_relay::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayError::Delivery("channel down".into()));
        }
        self.sent.lock().push(message.as_str().to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }

    fn markup(&self) -> Markup {
        Markup::MarkdownV2
    }
}

/// Keyword classifier that counts how often it is consulted.
#[derive(Clone)]
pub struct CountingClassifier {
    inner: Arc<KeywordClassifier>,
    calls: Arc<AtomicUsize>,
}

impl CountingClassifier {
    pub fn new(promote: &[&str], suppress: &[&str]) -> Self {
        let rules = KeywordRules {
            promote: promote.iter().map(|s| s.to_string()).collect(),
            suppress: suppress.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            inner: Arc::new(KeywordClassifier::new(rules)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Classifier for CountingClassifier {
    async fn classify(&self, text: &str) -> Category {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.classify(text).await
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Serve `app` on an ephemeral local port; returns `http://127.0.0.1:<port>`.
pub async fn spawn_stub(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
