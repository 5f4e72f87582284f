//! Content loaders for reading game data from files.
//!
//! Configuration is TOML; village declarations and scenarios are RON.

pub mod config;
pub mod factory;
pub mod scenario;
pub mod village;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use scenario::{
    CreatureSpec, FactionSpec, FloorItemSpec, LevelSpec, LocationSpec, Scenario, ScenarioLoader,
};
pub use village::VillageLoader;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}
