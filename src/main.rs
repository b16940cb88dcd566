//! Gateway - define data-source schemas and chat with them

mod backend;
mod chat;
mod cli;
mod config;
mod schema;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Starting Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Run CLI
    cli::run()?;

    Ok(())
}
