//! Trellis REST server binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use trellis_rest::{start_rest_server, AppState};

/// Serve the trellis REST API over an existing workspace.
#[derive(Parser)]
#[command(name = "trellis-rest", version, about)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:4300")]
    addr: SocketAddr,

    /// Directory inside the workspace to serve; defaults to the current
    /// directory.
    #[arg(long)]
    root: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trellis_rest=info,trellis=info".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let state = Arc::new(AppState::from_directory(&root).await?);
    start_rest_server(state, args.addr).await
}
