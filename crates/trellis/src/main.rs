//! Trellis CLI binary.

use anyhow::Result;
use trellis::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the trellis CLI.
///
/// Uses tokio's current_thread runtime; CLI invocations are sequential and
/// I/O bound, so a thread pool buys nothing.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=trellis=debug,trellis_jsonl=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trellis=info,trellis_jsonl=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse_args();
    cli.execute().await?;

    Ok(())
}
