//! Run a scenario for a number of ticks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use game_content::{ConfigLoader, ContentFactory, VillageLoader};
use runtime::{MonsterAiFactory, Simulation, SimulationConfig};

use super::OutputFormat;

/// Run a scenario and report village state
#[derive(Parser)]
pub struct Run {
    /// Data directory holding config.toml and scenarios/
    #[arg(short, long, value_name = "DIR", default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/../game/content/data"))]
    data_dir: PathBuf,

    /// Scenario name (file stem under scenarios/)
    #[arg(short, long, default_value = "siege")]
    scenario: String,

    /// Config file used instead of the data directory's config.toml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Village declarations replacing those of the scenario
    #[arg(long, value_name = "FILE")]
    villages: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Seed of the simulation's random source
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write the final AI snapshot to this file
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let factory = ContentFactory::new(&self.data_dir);
        let game_config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => factory.load_config()?,
        };
        let scenario = factory.load_scenario(&self.scenario)?;
        let villages = match &self.villages {
            Some(path) => VillageLoader::load(path)?,
            None => scenario.villages.clone(),
        };
        let world = scenario.build_world(game_config.world.clone())?;

        let mut builder = Simulation::builder()
            .config(SimulationConfig {
                game_config,
                seed: self.seed,
                ..SimulationConfig::default()
            })
            .world(world)
            .villages(villages);
        for (agent, preset) in scenario.agents() {
            builder = builder.agent(agent, MonsterAiFactory::from(preset));
        }
        let mut simulation = builder.build().context("Failed to assemble simulation")?;

        tracing::info!(
            scenario = %self.scenario,
            agents = simulation.agents().count(),
            villages = simulation.villages().len(),
            ticks = self.ticks,
            seed = self.seed,
            "simulation starting"
        );
        simulation
            .advance(self.ticks)
            .with_context(|| format!("Simulation failed at tick {}", simulation.time()))?;

        let infos = simulation.village_infos();
        match self.format {
            OutputFormat::Summary => {
                println!("tick {}", simulation.time());
                for info in &infos {
                    let state = info.state.map(|s| s.to_string()).unwrap_or_default();
                    println!("{:<16} {:<12} {}", info.name, info.tribe, state);
                }
                println!("{} agents alive", simulation.agents().count());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&infos)?);
            }
        }

        if let Some(path) = &self.save {
            let bytes = simulation.snapshot().encode()?;
            std::fs::write(path, bytes)
                .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
            tracing::info!(path = %path.display(), "snapshot saved");
        }
        Ok(())
    }
}
