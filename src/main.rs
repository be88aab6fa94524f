use anyhow::Context;
use api_rest::{port_from_env_value, ViewerConfig};
use apiai2text_core::{convert_archive_path, convert_documents, ConvertOptions};
use apiai2text_remote::{RemoteConfig, RemoteFetcher};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "apiai2text")]
#[command(about = "Convert API.AI export zip in text format")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an export archive as markdown
    Convert {
        /// The input .zip file
        input: PathBuf,
        /// Leave out intent documents that do not match the schema instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Fetch an agent from the live API and print it as markdown
    Fetch {
        /// Developer access token of the agent
        #[arg(long)]
        token: String,
        /// Leave out intent documents that do not match the schema instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Start a live HTTP viewer for an export archive
    Serve {
        /// The input .zip file
        input: PathBuf,
        /// Leave out intent documents that do not match the schema instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },
}

fn options(skip_invalid: bool) -> ConvertOptions {
    if skip_invalid {
        ConvertOptions::skipping_invalid()
    } else {
        ConvertOptions::default()
    }
}

/// Main entry point for the apiai2text CLI
///
/// Logs go to stderr so stdout carries only the rendered document. On failure the error is
/// reported on stderr and the process exits with a non-zero status; nothing is written to
/// stdout.
///
/// # Environment Variables
/// - `PORT`: viewer listen port for `serve` (default: 5000)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("apiai2text=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Some(output) = run(cli.command)? {
        print!("{}", output);
    }

    Ok(())
}

/// Runs one command, returning the document to print (if any).
fn run(command: Commands) -> anyhow::Result<Option<String>> {
    match command {
        Commands::Convert {
            input,
            skip_invalid,
        } => {
            let output = convert_archive_path(&input, options(skip_invalid))
                .with_context(|| format!("cannot convert {}", input.display()))?;
            Ok(Some(output))
        }
        Commands::Fetch {
            token,
            skip_invalid,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            let fetcher = RemoteFetcher::new(RemoteConfig::default())?;
            let documents = runtime.block_on(fetcher.fetch_all(&token))?;
            let output = convert_documents(documents, options(skip_invalid))?;
            Ok(Some(output))
        }
        Commands::Serve {
            input,
            skip_invalid,
        } => {
            let port = port_from_env_value(std::env::var("PORT").ok())?;
            let cfg = ViewerConfig::new(input, port).with_options(options(skip_invalid));
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(api_rest::serve(cfg))?;
            Ok(None)
        }
    }
}
