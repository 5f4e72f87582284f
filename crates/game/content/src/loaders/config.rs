//! Game configuration loader.

use std::path::Path;

use anyhow::Context;
use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Every section and key is optional; missing ones keep their defaults.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        toml::from_str(content).context("Failed to parse config TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{AiConfig, VillageConfig};

    #[test]
    fn missing_keys_take_defaults() {
        let config = ConfigLoader::parse(
            r#"
            [ai]
            panic_radius = 5

            [village]
            attack_delay = 150
            "#,
        )
        .expect("valid config");

        assert_eq!(config.ai.panic_radius, 5);
        assert_eq!(config.ai.last_seen_timeout, AiConfig::DEFAULT_LAST_SEEN_TIMEOUT);
        assert_eq!(config.village.attack_delay, 150);
        assert_eq!(
            config.village.my_attacks_delay,
            VillageConfig::default().my_attacks_delay
        );
    }

    #[test]
    fn empty_file_is_the_default_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").expect("write");
        assert_eq!(ConfigLoader::load(&path).expect("load"), GameConfig::default());
    }

    #[test]
    fn errors_name_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[village]\nattack_delay = \"soon\"").expect("write");
        let err = ConfigLoader::load(&path).expect_err("type mismatch");
        assert!(format!("{err:#}").contains("broken.toml"));
    }
}
