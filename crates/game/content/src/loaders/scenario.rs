//! Scenario loader.
//!
//! A scenario places everything a simulation starts from: level layouts,
//! factions, named locations, creatures with their engine presets, floor
//! items and village controls.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use game_core::{
    CreatureFlags, CreatureState, EntityId, Faction, FactionId, GameState, ItemState, LevelId,
    LevelMap, Location, LocationId, MinionTraits, Position, Rect, Skills, Tick, TribeId,
    WorldConfig,
};

use crate::loaders::{LoadResult, read_file};
use crate::{AiPresetInfo, VillageControlInfo};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub id: u32,
    /// Glyph rows, see [`LevelMap::parse`].
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionSpec {
    pub id: u32,
    pub name: String,
    pub tribe: u16,
    pub level: u32,
    #[serde(default)]
    pub war_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSpec {
    pub id: u32,
    pub level: u32,
    /// Inclusive top-left corner.
    pub min: Position,
    /// Exclusive bottom-right corner.
    pub max: Position,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureSpec {
    pub id: u32,
    pub name: String,
    pub level: u32,
    pub position: Position,
    pub tribe: u16,
    #[serde(default)]
    pub faction: Option<u32>,
    /// Roles inside the faction; ignored without one.
    #[serde(default)]
    pub roles: MinionTraits,
    #[serde(default)]
    pub flags: CreatureFlags,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub health: Option<f64>,
    #[serde(default)]
    pub damage: Option<i32>,
    #[serde(default)]
    pub courage: Option<f64>,
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(default)]
    pub items: Vec<ItemState>,
    /// Engine preset; creatures without one are not driven by the AI.
    #[serde(default)]
    pub ai: Option<AiPresetInfo>,
}

impl CreatureSpec {
    fn to_state(&self) -> CreatureState {
        let mut creature = CreatureState::new(
            EntityId(self.id),
            self.name.clone(),
            LevelId(self.level),
            self.position,
        )
        .with_tribe(TribeId(self.tribe))
        .with_flags(self.flags)
        .with_skills(self.skills);
        if let Some(faction) = self.faction {
            creature = creature.with_faction(FactionId(faction));
        }
        if let Some(health) = self.health {
            creature = creature.with_health(health);
        }
        if let Some(damage) = self.damage {
            creature = creature.with_damage(damage);
        }
        if let Some(courage) = self.courage {
            creature = creature.with_courage(courage);
        }
        if let Some(points) = self.difficulty {
            creature = creature.with_difficulty(points);
        }
        self.items
            .iter()
            .cloned()
            .fold(creature, CreatureState::with_item)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorItemSpec {
    pub level: u32,
    pub position: Position,
    pub item: ItemState,
}

/// A complete starting setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time: u64,
    pub levels: Vec<LevelSpec>,
    #[serde(default)]
    pub factions: Vec<FactionSpec>,
    #[serde(default)]
    pub locations: Vec<LocationSpec>,
    #[serde(default)]
    pub friendly_tribes: Vec<(u16, u16)>,
    pub creatures: Vec<CreatureSpec>,
    #[serde(default)]
    pub items: Vec<FloorItemSpec>,
    #[serde(default)]
    pub villages: Vec<VillageControlInfo>,
}

impl Scenario {
    /// Builds the in-memory world described by this scenario.
    pub fn build_world(&self, config: WorldConfig) -> LoadResult<GameState> {
        let mut world = GameState::new(config);
        world.set_time(Tick(self.time));

        for level in &self.levels {
            let map = LevelMap::parse(level.rows.as_slice())
                .with_context(|| format!("Invalid layout of level {}", level.id))?;
            world.add_level(LevelId(level.id), map);
        }

        for spec in &self.factions {
            let mut faction = Faction::new(
                FactionId(spec.id),
                spec.name.clone(),
                TribeId(spec.tribe),
                LevelId(spec.level),
            );
            faction.war_level = spec.war_level;
            world.add_faction(faction);
        }

        for spec in &self.locations {
            world.add_location(Location {
                id: LocationId(spec.id),
                level: LevelId(spec.level),
                bounds: Rect::new(spec.min, spec.max),
                name: spec.name.clone(),
            });
        }

        for &(a, b) in &self.friendly_tribes {
            world.set_friendly(TribeId(a), TribeId(b));
        }

        for spec in &self.creatures {
            world
                .add_creature(spec.to_state())
                .with_context(|| format!("Cannot place creature {} ({})", spec.id, spec.name))?;
            if let Some(faction) = spec.faction
                && let Some(faction) = world.faction_mut(FactionId(faction))
            {
                faction.add_member(EntityId(spec.id), spec.roles);
            }
        }

        for spec in &self.items {
            world.drop_item(LevelId(spec.level), spec.position, spec.item.clone());
        }

        tracing::debug!(
            scenario = %self.name,
            creatures = self.creatures.len(),
            villages = self.villages.len(),
            "scenario world built"
        );
        Ok(world)
    }

    /// Creatures driven by an engine preset, in declaration order.
    pub fn agents(&self) -> impl Iterator<Item = (EntityId, &AiPresetInfo)> + '_ {
        self.creatures
            .iter()
            .filter_map(|spec| spec.ai.as_ref().map(|ai| (EntityId(spec.id), ai)))
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        ron::from_str(content).context("Failed to parse scenario RON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::WorldView;

    const SCENARIO: &str = r########"(
        name: "hamlet",
        time: 5,
        levels: [(id: 0, rows: [
            "#######",
            "#..b..#",
            "#.....#",
            "#######",
        ])],
        factions: [
            (id: 1, name: "keeper", tribe: 5, level: 0),
            (id: 2, name: "villagers", tribe: 3, level: 0),
        ],
        locations: [(id: 7, level: 0, min: (x: 1, y: 1), max: (x: 6, y: 3), name: Some("Hamlet"))],
        creatures: [
            (
                id: 1,
                name: "keeper",
                level: 0,
                position: (x: 1, y: 2),
                tribe: 5,
                faction: Some(1),
                roles: "LEADER",
            ),
            (
                id: 2,
                name: "villager",
                level: 0,
                position: (x: 4, y: 2),
                tribe: 3,
                faction: Some(2),
                roles: "FIGHTER",
                flags: "HUMANOID | CAN_SLEEP",
                difficulty: Some(12.0),
                ai: Some(Collective(village: 1)),
            ),
        ],
        villages: [(id: 1, kind: Peaceful, faction: 2, villain: 1, location: 7)],
    )"########;

    #[test]
    fn builds_world_with_memberships() {
        let scenario = ScenarioLoader::parse(SCENARIO).expect("valid scenario");
        let world = scenario
            .build_world(WorldConfig::default())
            .expect("world builds");

        assert_eq!(world.time(), Tick(5));
        let villager = world.creature(EntityId(2)).expect("placed");
        assert!(villager.is_humanoid());
        assert_eq!(villager.difficulty_points, 12.0);
        let villagers = world.faction(FactionId(2)).expect("faction");
        assert_eq!(villagers.fighters(), vec![EntityId(2)]);
        assert_eq!(
            world.faction(FactionId(1)).and_then(|f| f.leader()),
            Some(EntityId(1))
        );
        assert_eq!(
            world
                .location(LocationId(7))
                .and_then(|l| l.name.as_deref()),
            Some("Hamlet")
        );
    }

    #[test]
    fn only_preset_creatures_are_agents() {
        let scenario = ScenarioLoader::parse(SCENARIO).expect("valid scenario");
        let agents: Vec<_> = scenario.agents().collect();
        assert_eq!(
            agents,
            vec![(EntityId(2), &AiPresetInfo::Collective { village: 1 })]
        );
    }

    #[test]
    fn creature_in_a_wall_is_rejected() {
        let mut scenario = ScenarioLoader::parse(SCENARIO).expect("valid scenario");
        scenario.creatures[1].position = Position::new(0, 0);
        let err = scenario
            .build_world(WorldConfig::default())
            .expect_err("blocked");
        assert!(err.to_string().contains("Cannot place creature 2"));
    }
}
