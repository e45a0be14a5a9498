//! Folio command-line entry point

use clap::{Parser, Subcommand};
use folio::commands::{load_config, replay_file};
use folio::telemetry::{self, LogTarget};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "folio", about = "Animated portfolio showcase for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ./folio.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log file for the terminal UI (default: $TMPDIR/folio.log)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the showcase in the terminal
    Show,
    /// Run a JSON script of timed events on a virtual clock and print
    /// every output event as a JSON line
    Replay {
        script: PathBuf,
        /// Keep the clock running this long after the last step
        #[arg(long, default_value = "15000")]
        tail_ms: u64,
    },
    /// Print the effective config as TOML
    DumpConfig,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Replay { script, tail_ms }) => {
            let _guard = telemetry::init(LogTarget::Stderr);
            let config = load_config(cli.config.as_deref())?;
            let lines = replay_file(config, &script, Duration::from_millis(tail_ms))?;
            tracing::info!("Replay of {} produced {} events", script.display(), lines.len());
            for line in lines {
                println!("{}", line);
            }
        }

        Some(Commands::DumpConfig) => {
            let _guard = telemetry::init(LogTarget::Stderr);
            let config = load_config(cli.config.as_deref())?;
            print!("{}", config.to_toml());
        }

        Some(Commands::Version) => {
            println!("folio v{}", env!("CARGO_PKG_VERSION"));
        }

        // No subcommand = show
        Some(Commands::Show) | None => {
            let log_file = cli.log_file.unwrap_or_else(telemetry::default_log_file);
            let _guard = telemetry::init(LogTarget::File(log_file));
            let config = load_config(cli.config.as_deref())?;
            folio_tui::run_tui(config).await?;
        }
    }

    Ok(())
}
