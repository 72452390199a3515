//! Flategy - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flategy_core::components::GameData;
use flategy_core::map_generation::generate_layout;
use flategy_tools::render::OutputFormat;
use flategy_tools::simulate::{self, SimulateOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flategy-tools")]
#[command(about = "Development tools for Flategy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the starting layout for a seed
    Mapgen {
        /// Map seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Number of players
        #[arg(long, default_value_t = 2)]
        players: u32,
    },
    /// Run idle ticks and print the final state
    Simulate {
        /// Map seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Number of players
        #[arg(long, default_value_t = 2)]
        players: u32,
        /// Ticks to run
        #[arg(long, default_value_t = 100)]
        ticks: u64,
        /// Balance RON file (defaults to the built-in table)
        #[arg(long)]
        balance: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Also write a replay of the run to this file
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Re-run a replay file and check every recorded state hash
    Replay {
        /// Path to the replay file
        path: PathBuf,
        /// Output format for the summary
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Validate a balance file
    Validate {
        /// Path to the balance RON file
        #[arg(default_value = "assets/data/balance.ron")]
        path: PathBuf,
    },
}

fn main() {
    // Logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> flategy_tools::Result<()> {
    match command {
        Commands::Mapgen { seed, players } => {
            let layout = generate_layout(&GameData::new(players, seed))?;
            println!("{}", layout.dump());
        }
        Commands::Simulate {
            seed,
            players,
            ticks,
            balance,
            format,
            record,
        } => {
            let (report, replay) = simulate::record(&SimulateOptions {
                seed,
                players,
                ticks,
                balance,
            })?;
            if let Some(path) = record {
                flategy_tools::replay::save_replay(&path, &replay)?;
            }
            println!("{}", format.encode(&report)?);
        }
        Commands::Replay { path, format } => {
            let summary = flategy_tools::replay::verify_replay_file(&path)?;
            tracing::info!(ticks = summary.ticks, "Replay verified");
            println!("{}", format.encode(&summary)?);
        }
        Commands::Validate { path } => {
            tracing::info!("Validating balance file: {}", path.display());
            flategy_tools::validate::validate_balance_file(&path)?;
            tracing::info!("Validation passed");
        }
    }
    Ok(())
}
