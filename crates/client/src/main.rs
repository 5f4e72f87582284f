//! Monster AI simulation driver.
//!
//! Loads a configuration and a scenario, runs the AI for a number of ticks and
//! reports village state. Saved AI snapshots can be inspected afterwards.
//!
//! ```bash
//! # Run the bundled siege scenario for 500 ticks
//! cargo run -p sim-client -- run --ticks 500
//!
//! # Inspect a snapshot written by a previous run
//! cargo run -p sim-client -- inspect ai.bin --format json
//! ```

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Inspect, Run};

/// Monster AI simulation driver
#[derive(Parser)]
#[command(name = "sim")]
#[command(about = "Runs the monster AI over a scenario", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scenario and report village state
    Run(Run),

    /// Read and inspect an AI snapshot file
    Inspect(Inspect),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Inspect(cmd) => cmd.execute(),
    }
}
