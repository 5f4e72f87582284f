//! Save/restore of all AI state.
//!
//! An [`AiSnapshot`] holds every agent's engine (behaviours with their
//! memories) and every village control (triggers, tasks, conquest flags).
//! World state is saved separately by whoever owns the world.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use game_core::{EntityId, Tick};

use crate::api::{AiError, Result};
use crate::providers::ai::MonsterAi;
use crate::village::VillageRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSnapshot {
    pub time: Tick,
    pub engines: BTreeMap<EntityId, MonsterAi>,
    pub villages: VillageRegistry,
}

impl AiSnapshot {
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(AiError::Snapshot)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(AiError::Snapshot)
    }

    /// Human-readable dump for debugging.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
