mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "albumcast", version)]
#[command(
    about = "Publish per-user album directories to Telegraph, announce them on Telegram, then delete them",
    long_about = None
)]
struct Cli {
    /// Root directory laid out as <user>/<album>/<media files>
    root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "albumcast_cli=info,albumcast_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    commands::run::execute(cli.root).await
}
