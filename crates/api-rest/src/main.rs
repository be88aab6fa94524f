//! Standalone viewer binary.
//!
//! ## Purpose
//! Serves one export archive over HTTP.
//!
//! ## Intended use
//! `apiai2text-viewer <input.zip>`. Equivalent to `apiai2text serve <input.zip>`; useful when
//! only the viewer is deployed.

use anyhow::Context;
use api_rest::{port_from_env_value, serve, ViewerConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the viewer
///
/// # Environment Variables
/// - `PORT`: listen port (default: 5000)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - no archive path is given or `PORT` is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let archive_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: apiai2text-viewer <input.zip>")?;
    let port = port_from_env_value(std::env::var("PORT").ok())?;

    serve(ViewerConfig::new(archive_path, port)).await
}
