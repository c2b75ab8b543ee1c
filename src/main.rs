//! Command-line entry point: build the dialogue database from an export.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use discobase_lib::config::{self, PipelineConfig, SchemaSource};

/// Convert a dialogue database JSON export into a browsable SQLite database.
#[derive(Parser, Debug)]
#[command(name = "discobase")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the JSON export
    input: PathBuf,

    /// Output SQLite database
    #[arg(long, value_name = "PATH", default_value = config::DEFAULT_DATABASE_FILE)]
    db: PathBuf,

    /// SQL script to use instead of the bundled schema
    #[arg(long, value_name = "PATH")]
    schema: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    log: Option<String>,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    if !cli.input.is_file() {
        tracing::error!(path = %cli.input.display(), "Input file not found");
        return ExitCode::FAILURE;
    }

    let pipeline_config = PipelineConfig {
        input_path: cli.input,
        database_path: cli.db,
        schema: cli.schema.map_or(SchemaSource::Bundled, SchemaSource::Script),
    };

    let outcome = match discobase_lib::build_database(&pipeline_config) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Could not start database build: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!("Could not render run report: {e}"),
        }
    }

    if outcome.succeeded() {
        ExitCode::SUCCESS
    } else {
        tracing::error!(
            failure = outcome.failure.as_deref().unwrap_or("unknown"),
            "Database build failed"
        );
        ExitCode::FAILURE
    }
}
