// src/relay.rs
//! Pipeline controller.
//!
//! One pass: read -> fingerprint -> ledger check -> classify -> (suppress |
//! render -> dispatch) -> commit. Passes never overlap, and the ledger is
//! persisted exactly once per processed item, after its terminal action:
//! - `ignore`            -> record suppressed, persist
//! - dispatch succeeded  -> record accepted, persist
//! - dispatch failed     -> no mutation; the item is retried next cycle
//!
//! A crash strictly between a successful dispatch and the persist resends
//! that item once after restart.

use std::future::Future;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::analyze::{Category, Classifier, Enhancer};
use crate::fingerprint::Fingerprint;
use crate::item::ItemReader;
use crate::ledger::DedupLedger;
use crate::notify::Dispatcher;
use crate::render::Renderer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// No (valid) item on disk.
    NoItem,
    /// Already delivered or suppressed.
    Skipped(Fingerprint),
    /// Classified `ignore`; remembered forever.
    Suppressed(Fingerprint),
    Delivered {
        fingerprint: Fingerprint,
        category: Category,
    },
    /// Ledger untouched; the same item is attempted again next pass.
    DeliveryFailed {
        fingerprint: Fingerprint,
        reason: String,
    },
}

impl PassOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PassOutcome::NoItem => "no_item",
            PassOutcome::Skipped(_) => "skipped",
            PassOutcome::Suppressed(_) => "suppressed",
            PassOutcome::Delivered { .. } => "delivered",
            PassOutcome::DeliveryFailed { .. } => "delivery_failed",
        }
    }
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("relay_passes_total", "Pipeline passes by outcome.");
        describe_counter!("relay_classifications_total", "Classified items by category.");
        describe_counter!(
            "relay_classifier_fallback_total",
            "Classifications resolved to the fallback category."
        );
        describe_counter!(
            "relay_ledger_persist_errors_total",
            "Ledger writes that failed after a terminal decision."
        );
        describe_histogram!("relay_dispatch_ms", "Dispatch call time in milliseconds.");
        describe_gauge!("relay_last_pass_ts", "Unix ts when the last pass finished.");
    });
}

pub struct Relay {
    reader: Box<dyn ItemReader>,
    classifier: Box<dyn Classifier>,
    enhancer: Option<Box<dyn Enhancer>>,
    renderer: Renderer,
    dispatcher: Box<dyn Dispatcher>,
    ledger: DedupLedger,
}

impl Relay {
    pub fn new(
        reader: Box<dyn ItemReader>,
        classifier: Box<dyn Classifier>,
        renderer: Renderer,
        dispatcher: Box<dyn Dispatcher>,
        ledger: DedupLedger,
    ) -> Self {
        ensure_metrics_described();
        Self {
            reader,
            classifier,
            enhancer: None,
            renderer,
            dispatcher,
            ledger,
        }
    }

    pub fn with_enhancer(mut self, enhancer: Box<dyn Enhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    /// Run one full pass. Never fails: every per-cycle error becomes an outcome.
    pub async fn run_once(&mut self) -> PassOutcome {
        let outcome = self.pass().await;
        counter!("relay_passes_total", "outcome" => outcome.label()).increment(1);
        gauge!("relay_last_pass_ts").set(chrono::Utc::now().timestamp() as f64);
        outcome
    }

    async fn pass(&mut self) -> PassOutcome {
        let Some(item) = self.reader.read().await else {
            tracing::debug!(reader = self.reader.name(), "no item");
            return PassOutcome::NoItem;
        };

        let fp = item.fingerprint();
        if self.ledger.is_known(&fp) {
            tracing::debug!(
                fingerprint = fp.short(),
                suppressed = self.ledger.is_suppressed(&fp),
                "known item, skipping"
            );
            return PassOutcome::Skipped(fp);
        }

        let category = self.classifier.classify(&item.text).await;
        counter!("relay_classifications_total", "category" => category.as_str()).increment(1);
        tracing::info!(
            fingerprint = fp.short(),
            %category,
            classifier = self.classifier.name(),
            "new item classified"
        );

        if category.is_suppressed() {
            self.ledger.record_suppressed(fp.clone());
            self.commit(&fp).await;
            return PassOutcome::Suppressed(fp);
        }

        let text = match &self.enhancer {
            Some(enhancer) => enhancer.enhance(&item.text).await,
            None => item.text.clone(),
        };
        let message = self.renderer.render(category, &text, &item.link);

        let started = Instant::now();
        let sent = self.dispatcher.dispatch(&message).await;
        histogram!("relay_dispatch_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        match sent {
            Ok(()) => {
                tracing::info!(
                    fingerprint = fp.short(),
                    channel = self.dispatcher.name(),
                    "message delivered"
                );
                self.ledger.record_accepted(fp.clone());
                self.commit(&fp).await;
                PassOutcome::Delivered {
                    fingerprint: fp,
                    category,
                }
            }
            Err(e) => {
                tracing::warn!(
                    fingerprint = fp.short(),
                    channel = self.dispatcher.name(),
                    error = %e,
                    "delivery failed, will retry next cycle"
                );
                PassOutcome::DeliveryFailed {
                    fingerprint: fp,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// In-memory state stays updated even if the write fails.
    async fn commit(&mut self, fp: &Fingerprint) {
        if let Err(e) = self.ledger.persist().await {
            counter!("relay_ledger_persist_errors_total").increment(1);
            tracing::error!(
                fingerprint = fp.short(),
                path = %self.ledger.path().display(),
                error = %e,
                "ledger persist failed"
            );
        }
    }

    /// Poll forever with `idle` between the end of one pass and the start of the next.
    pub async fn run(self, idle: Duration) {
        self.run_until(idle, std::future::pending::<()>()).await;
    }

    /// Like `run`, but returns once `shutdown` resolves. A pass in flight is
    /// always finished first.
    pub async fn run_until<F>(mut self, idle: Duration, shutdown: F) -> Self
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(
            idle_secs = idle.as_secs(),
            classifier = self.classifier.name(),
            channel = self.dispatcher.name(),
            "relay started"
        );
        loop {
            let outcome = self.run_once().await;
            tracing::debug!(outcome = outcome.label(), "pass finished");
            tokio::select! {
                _ = tokio::time::sleep(idle) => {}
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, relay stopped");
                    break;
                }
            }
        }
        self
    }
}
