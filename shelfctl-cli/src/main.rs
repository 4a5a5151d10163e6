//! shelfctl CLI - library record service entry point
//!
//! Provides the `serve` subcommand, which boots the HTTP record API
//! against a PostgreSQL database.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use shelfctl_server::ServerConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "shelfctl",
    author,
    version,
    about = "Library management record API over PostgreSQL"
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG when set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

/// Initialize tracing with console output
fn init_tracing(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: args.bind,
        port: args.port,
        database_url: args.database_url.unwrap_or(defaults.database_url),
    };

    tracing::info!("Serving on {}:{}", config.host, config.port);
    shelfctl_server::serve(config).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
    }
}
