//! tdg CLI binary.

use anyhow::Result;
use tdg::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the tdg CLI.
///
/// Uses tokio's current_thread runtime: every remote call is awaited on one
/// thread, and the checklist fan-out interleaves on it.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Example: RUST_LOG=tdg=debug,tdg_trello=debug tdg graph
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tdg=info,tdg_trello=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting tdg CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("tdg CLI completed successfully");
    Ok(())
}
