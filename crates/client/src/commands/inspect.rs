//! Read and inspect AI snapshot files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use runtime::AiSnapshot;

use super::OutputFormat;

/// Read and inspect an AI snapshot file
#[derive(Parser)]
pub struct Inspect {
    /// Snapshot written by `sim run --save`
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read snapshot {}", self.path.display()))?;
        let snapshot = AiSnapshot::decode(&bytes)
            .with_context(|| format!("Failed to decode snapshot {}", self.path.display()))?;

        match self.format {
            OutputFormat::Summary => {
                println!("tick {}", snapshot.time);
                for (agent, engine) in &snapshot.engines {
                    let behaviours: Vec<String> = engine
                        .behaviours()
                        .iter()
                        .map(|entry| format!("{}x{}", entry.behaviour.name(), entry.weight))
                        .collect();
                    println!("{agent} {}", behaviours.join(" "));
                }
                for village in snapshot.villages.iter() {
                    println!("{} {} tasks", village.id(), village.tasks().count());
                }
            }
            OutputFormat::Json => println!("{}", snapshot.to_json()?),
        }
        Ok(())
    }
}
