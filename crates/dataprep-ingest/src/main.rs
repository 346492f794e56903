//! dataprep-ingest - Dataset ingestion tool

use anyhow::Result;
use clap::Parser;
use dataprep_common::logging::{init_logging, LogConfig, LogLevel};
use dataprep_ingest::config::{PipelineConfig, DEFAULT_CONFIG_FILE};
use dataprep_ingest::ingestion::DataIngestion;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dataprep-ingest")]
#[command(author, version, about = "Dataprep dataset ingestion tool")]
struct Cli {
    /// Stage operation to run
    #[command(subcommand)]
    command: Command,

    /// Pipeline config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Download the dataset archive if it is not already present
    Fetch,

    /// Extract the downloaded archive into the unzip directory
    Extract,

    /// Fetch, then extract
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment variables take precedence over the verbose flag
    let mut log_config = LogConfig::from_env()?;
    if cli.verbose && std::env::var("LOG_LEVEL").is_err() {
        log_config.level = LogLevel::Debug;
    }
    log_config.log_file_prefix = "dataprep-ingest".to_string();

    init_logging(&log_config)?;

    let config_path = PipelineConfig::resolve_path(&cli.config);
    let pipeline = PipelineConfig::load(&config_path)?;
    let ingestion = DataIngestion::new(pipeline.data_ingestion);

    match cli.command {
        Command::Fetch => {
            info!("Fetching dataset archive");
            ingestion.fetch().await?;
        },
        Command::Extract => {
            info!("Extracting dataset archive");
            ingestion.extract().await?;
        },
        Command::Run => {
            info!("Running ingestion stage");
            ingestion.fetch().await?;
            ingestion.extract().await?;
        },
    }

    info!("Ingestion complete");
    Ok(())
}
