//! tweet-relay daemon: polls the latest-item file and forwards new items.
//!
//! Startup fails fast on configuration errors; after that nothing stops the
//! loop except Ctrl-C, which is honoured between passes.

use anyhow::Context;
use tweet_relay::config::{Credentials, RelayConfig};
use tweet_relay::metrics::Metrics;
use tweet_relay::{bootstrap, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    logging::init_tracing();

    let cfg = RelayConfig::load_default().context("load config")?;
    let creds = Credentials::from_env();
    cfg.validate(&creds).context("invalid configuration")?;

    if let Some(addr) = cfg.metrics_addr {
        let metrics = Metrics::install()?;
        tokio::spawn(async move {
            if let Err(e) = metrics.serve(addr).await {
                tracing::warn!(error = ?e, "metrics listener stopped");
            }
        });
    }

    let relay = bootstrap::build_relay(&cfg, &creds)
        .await
        .context("build relay")?;

    relay
        .run_until(cfg.poll_interval(), async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler unavailable");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
