//! breathscan command-line entry point.
//!
//! Three modes share one detector configuration:
//! - `batch` screens a list of recordings and writes a CSV report,
//! - `analyze` prints a JSON summary for a single recording,
//! - `serve` exposes the analyze operation over HTTP.

mod batch;
mod output;
mod server;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use breathscan_core::{process_one_file, AnalysisSummary, DetectorConfig};

use batch::ErrorPolicy;

#[derive(Parser)]
#[command(name = "breathscan", about = "Breathing-pause screening over recorded WAV audio")]
#[command(version)]
struct Cli {
    /// Optional JSON detector configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a list of recordings and write a CSV report.
    Batch {
        /// CSV-style path list; the header line is skipped and the first
        /// column of each row is taken as a file path.
        input: PathBuf,
        /// Destination CSV report.
        output: PathBuf,
        /// What a malformed recording does to the rest of the batch.
        #[arg(long, value_enum, default_value_t = ErrorPolicy::Skip)]
        on_error: ErrorPolicy,
    },

    /// Analyze a single recording and print a JSON summary.
    Analyze { file: PathBuf },

    /// Serve the HTTP analyze endpoint.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Batch {
            input,
            output,
            on_error,
        } => batch::run(&input, &output, &config, on_error).await,

        Commands::Analyze { file } => {
            let pauses = process_one_file(&file, &config)?;
            let summary = AnalysisSummary::from_pauses(source_name(&file), &pauses);
            info!(
                file = %file.display(),
                pauses = summary.total_pauses,
                apnea_events = summary.apnea_event_count,
                "analysis complete"
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }

        Commands::Serve { port } => server::serve(port, config).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DetectorConfig> {
    let Some(path) = path else {
        return Ok(DetectorConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read configuration file {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok(config)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
