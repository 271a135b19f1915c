//! Runs a single pipeline pass and exits. For cron-style scheduling.
//!
//! Exit code 1 on delivery failure so the scheduler can alert; every other
//! outcome (including "nothing new") exits 0.

use std::process::ExitCode;

use tweet_relay::config::{Credentials, RelayConfig};
use tweet_relay::{bootstrap, logging, PassOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    logging::init_tracing();

    let cfg = RelayConfig::load_default()?;
    let creds = Credentials::from_env();
    cfg.validate(&creds)?;

    let mut relay = bootstrap::build_relay(&cfg, &creds).await?;
    let outcome = relay.run_once().await;
    println!("{}", outcome.label());

    Ok(match outcome {
        PassOutcome::DeliveryFailed { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
