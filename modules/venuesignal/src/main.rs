use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use venuesignal_common::{load_config, Config, DatasetStore, FileConfig};

mod cmd;
mod regions;

#[derive(Parser)]
#[command(name = "venuesignal")]
#[command(about = "Venue priority intelligence: hex maps, recurrence rankings, event verification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate venues into scored hexagonal cells
    Cells(cmd::cells::CellsArgs),

    /// Rank venues by how regularly they host events on a given day
    Recurrence(cmd::recurrence::RecurrenceArgs),

    /// Verify upcoming events for the top venues through web search and an LLM judge
    Verify(cmd::verify::VerifyArgs),
}

/// Everything a subcommand needs: env config, file tunables and the dataset.
pub struct Context {
    pub config: Config,
    pub file: FileConfig,
    pub store: DatasetStore,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("venuesignal=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Verify(_) => Config::verify_from_env()?,
        _ => Config::from_env(),
    };
    config.log_redacted();

    let file = match &config.config_path {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    info!(
        workers = file.verification.workers,
        rpm = file.verification.requests_per_minute,
        allowed_regions = file.identity.allowed_regions.len(),
        "Tunables loaded"
    );

    let store = DatasetStore::from_config(&config);
    let ctx = Context {
        config,
        file,
        store,
    };

    match cli.command {
        Commands::Cells(args) => cmd::cells::run(&ctx, args),
        Commands::Recurrence(args) => cmd::recurrence::run(&ctx, args),
        Commands::Verify(args) => cmd::verify::run(&ctx, args).await,
    }
}
