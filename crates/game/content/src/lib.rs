//! Data-driven content definitions and loaders.
//!
//! This crate houses the declarations the runtime builds AI from and provides
//! loaders for RON/TOML data files:
//! - Engine presets assigned to creatures ([`AiPresetInfo`])
//! - Village controls with their attack triggers ([`VillageControlInfo`])
//! - Game configuration (data-driven via TOML)
//! - Demo scenarios: levels, factions, creatures and villages (via RON)
//!
//! Declarations use plain ids so they can be written by hand; the runtime
//! resolves them against the world when it builds engines and controls.

mod info;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use info::{
    AiPresetInfo, AttackActionInfo, TriggerInfo, VillageControlInfo, VillageKindInfo,
};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, CreatureSpec, FactionSpec, FloorItemSpec, LevelSpec,
    LocationSpec, Scenario, ScenarioLoader, VillageLoader,
};
