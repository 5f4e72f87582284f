//! Content factory for loading everything a simulation needs from one directory.

use std::path::{Path, PathBuf};

use game_core::GameConfig;

use crate::VillageControlInfo;
use crate::loaders::{ConfigLoader, LoadResult, Scenario, ScenarioLoader, VillageLoader};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── villages.ron
/// └── scenarios/
///     └── siege.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`, or the defaults when absent.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load shared village declarations from `villages.ron`.
    pub fn load_villages(&self) -> LoadResult<Vec<VillageControlInfo>> {
        VillageLoader::load(&self.data_dir.join("villages.ron"))
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{name}.ron"));
        ScenarioLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{CreatureFlags, EntityId, FactionId, WorldView};

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().expect("defaults"), GameConfig::default());
        assert!(factory.load_scenario("nowhere").is_err());
    }

    #[test]
    fn bundled_demo_loads() {
        let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        factory.load_config().expect("bundled config");
        let scenario = factory.load_scenario("siege").expect("bundled scenario");
        let world = scenario
            .build_world(game_core::WorldConfig::default())
            .expect("bundled scenario builds");

        let humans = world.faction(FactionId(2)).expect("humans");
        assert_eq!(humans.leader(), Some(EntityId(12)));
        assert_eq!(humans.fighters().len(), 3);
        let knight = world.creature(EntityId(12)).expect("knight");
        assert!(knight.flags.contains(CreatureFlags::HUMANOID | CreatureFlags::CAN_SLEEP));
    }
}
