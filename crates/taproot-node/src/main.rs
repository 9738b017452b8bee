//! Taproot node binary.
//!
//! Reads the edge list from standard input, runs one agent per
//! participant, and prints each completion record to standard output.
//! SIGINT aborts the whole group and exits with code 1.

use anyhow::Context;
use taproot_node::runner::{self, RunConfig};
use taproot_topology::EdgeList;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taproot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RunConfig::from_env();
    let edges = EdgeList::from_reader(std::io::stdin().lock())
        .context("reading edge list from stdin")?;

    let (controller, driver) = runner::launch(edges, config);
    tokio::select! {
        result = driver => {
            let report = result.context("protocol run failed")?;
            tracing::info!(participants = report.outcomes.len(), "run complete");
        }
        _ = tokio::signal::ctrl_c() => {
            controller.abort();
            std::process::exit(1);
        }
    }

    Ok(())
}
