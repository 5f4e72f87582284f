//! World state representation.
//!
//! This module owns the data structures describing creatures, items, factions
//! and levels, plus [`GameState`], an in-memory world that implements the
//! [`WorldView`](crate::env::WorldView) and [`World`](crate::env::World)
//! traits. Mutations requested by creatures flow through
//! [`GameEngine`](crate::engine::GameEngine).
mod common;
mod creature;
mod error;
mod faction;
mod item;

pub use common::{
    EntityId, FactionId, ItemId, LevelId, LocationId, Position, Rect, Tick, TribeId,
};
pub use creature::{AttrType, CreatureFlags, CreatureState, LastingEffect, Skills, Spell};
pub use error::StateError;
pub use faction::{Faction, FactionMember, Location, MinionTraits, Sunlight};
pub use item::{EffectType, ItemClass, ItemState, stack_items};

use std::collections::{BTreeMap, BTreeSet};

use crate::action::{ActionError, CreatureAction};
use crate::config::WorldConfig;
use crate::engine::{self, GameEngine};
use crate::env::{LevelMap, SquareView, World, WorldView};
use crate::event::{GameEvent, VictimInfo};

/// In-memory world used by tests and the simulation driver.
#[derive(Clone, Debug, Default)]
pub struct GameState {
    pub config: WorldConfig,
    time: Tick,
    sunlight: Option<Sunlight>,
    levels: BTreeMap<LevelId, LevelMap>,
    creatures: BTreeMap<EntityId, CreatureState>,
    floor_items: BTreeMap<(LevelId, Position), Vec<ItemState>>,
    factions: BTreeMap<FactionId, Faction>,
    locations: BTreeMap<LocationId, Location>,
    friendly_tribes: BTreeSet<(TribeId, TribeId)>,
}

impl GameState {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn set_time(&mut self, time: Tick) {
        self.time = time;
    }

    /// Pins the time of day instead of deriving it from the clock.
    pub fn set_sunlight(&mut self, sunlight: Option<Sunlight>) {
        self.sunlight = sunlight;
    }

    pub fn add_level(&mut self, id: LevelId, map: LevelMap) {
        self.levels.insert(id, map);
    }

    pub fn level(&self, id: LevelId) -> Option<&LevelMap> {
        self.levels.get(&id)
    }

    pub fn level_mut(&mut self, id: LevelId) -> Option<&mut LevelMap> {
        self.levels.get_mut(&id)
    }

    /// Places a creature; its square must exist, be walkable and be empty.
    pub fn add_creature(&mut self, creature: CreatureState) -> Result<(), StateError> {
        if self.creatures.contains_key(&creature.id) {
            return Err(StateError::DuplicateEntity(creature.id));
        }
        let map = self
            .levels
            .get(&creature.level)
            .ok_or(StateError::UnknownLevel(creature.level))?;
        if !map
            .square(creature.position)
            .is_some_and(|square| square.is_passable())
        {
            return Err(StateError::PositionBlocked {
                level: creature.level,
                position: creature.position,
            });
        }
        if let Some(occupant) = self.creature_at(creature.level, creature.position) {
            return Err(StateError::PositionOccupied {
                position: creature.position,
                occupant: occupant.id,
            });
        }
        if let Some(faction) = creature.faction
            && !self.factions.contains_key(&faction)
        {
            return Err(StateError::UnknownFaction(faction));
        }
        self.creatures.insert(creature.id, creature);
        Ok(())
    }

    /// Registers a faction and points its members back at it.
    pub fn add_faction(&mut self, faction: Faction) {
        for member in &faction.members {
            if let Some(creature) = self.creatures.get_mut(&member.id) {
                creature.faction = Some(faction.id);
            }
        }
        self.factions.insert(faction.id, faction);
    }

    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        self.factions.get_mut(&id)
    }

    pub fn add_location(&mut self, location: Location) {
        self.locations.insert(location.id, location);
    }

    pub fn drop_item(&mut self, level: LevelId, position: Position, item: ItemState) {
        self.floor_items
            .entry((level, position))
            .or_default()
            .push(item);
    }

    pub fn set_friendly(&mut self, a: TribeId, b: TribeId) {
        self.friendly_tribes.insert((a.min(b), a.max(b)));
    }

    pub fn creature_mut(&mut self, id: EntityId) -> Option<&mut CreatureState> {
        self.creatures.get_mut(&id)
    }

    pub fn creatures(&self) -> impl Iterator<Item = &CreatureState> {
        self.creatures.values()
    }

    pub(crate) fn take_floor_items(
        &mut self,
        level: LevelId,
        position: Position,
        ids: &[ItemId],
    ) -> Vec<ItemState> {
        let Some(pile) = self.floor_items.get_mut(&(level, position)) else {
            return Vec::new();
        };
        let (taken, left): (Vec<_>, Vec<_>) =
            pile.drain(..).partition(|item| ids.contains(&item.id));
        *pile = left;
        if pile.is_empty() {
            self.floor_items.remove(&(level, position));
        }
        taken
    }

    /// True if a creature could step onto `position`.
    pub fn is_free(&self, level: LevelId, position: Position) -> bool {
        self.square(level, position)
            .is_some_and(|square| square.is_passable())
            && self.creature_at(level, position).is_none()
    }

    /// Removes a dead creature, spilling its inventory and leaving its faction.
    pub(crate) fn kill(&mut self, victim: EntityId, killer: Option<EntityId>) -> Option<GameEvent> {
        let creature = self.remove_creature(victim)?;
        let info = VictimInfo {
            id: creature.id,
            name: creature.name,
            tribe: creature.tribe,
            faction: creature.faction,
            difficulty_points: creature.difficulty_points,
            level: creature.level,
            position: creature.position,
        };
        for item in creature.inventory {
            self.drop_item(info.level, info.position, item);
        }
        Some(GameEvent::Kill {
            victim: info,
            killer,
            time: self.time,
        })
    }

    /// Removes a creature from the world without a death (e.g. it flew away).
    pub(crate) fn remove_creature(&mut self, id: EntityId) -> Option<CreatureState> {
        let creature = self.creatures.remove(&id)?;
        for faction in self.factions.values_mut() {
            faction.remove_member(id);
        }
        Some(creature)
    }

    fn tribes_friendly(&self, a: TribeId, b: TribeId) -> bool {
        a == b || self.friendly_tribes.contains(&(a.min(b), a.max(b)))
    }
}

impl WorldView for GameState {
    fn time(&self) -> Tick {
        self.time
    }

    fn sunlight(&self) -> Sunlight {
        if let Some(sunlight) = self.sunlight {
            return sunlight;
        }
        let cycle = self.config.day_length + self.config.night_length;
        if cycle == 0 || self.time.0 % cycle < self.config.day_length {
            Sunlight::Day
        } else {
            Sunlight::Night
        }
    }

    fn creature(&self, id: EntityId) -> Option<&CreatureState> {
        self.creatures.get(&id)
    }

    fn creature_ids(&self) -> Vec<EntityId> {
        self.creatures.keys().copied().collect()
    }

    fn creature_at(&self, level: LevelId, position: Position) -> Option<&CreatureState> {
        self.creatures
            .values()
            .find(|c| c.level == level && c.position == position)
    }

    fn square(&self, level: LevelId, position: Position) -> Option<SquareView> {
        self.levels.get(&level)?.square(position)
    }

    fn items_at(&self, level: LevelId, position: Position) -> Vec<&ItemState> {
        self.floor_items
            .get(&(level, position))
            .map(|items| items.iter().collect())
            .unwrap_or_default()
    }

    fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(&id)
    }

    fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    fn can_see(&self, viewer: EntityId, target: EntityId) -> bool {
        let (Some(viewer), Some(target)) = (self.creature(viewer), self.creature(target)) else {
            return false;
        };
        if viewer.id == target.id {
            return true;
        }
        if target.is_affected(LastingEffect::Invisible) {
            return false;
        }
        self.can_see_position(viewer.id, target.level, target.position)
    }

    fn can_see_position(&self, viewer: EntityId, level: LevelId, position: Position) -> bool {
        let Some(viewer) = self.creature(viewer) else {
            return false;
        };
        if viewer.level != level
            || viewer.is_affected(LastingEffect::Blind)
            || viewer.position.dist8(position) > self.config.sight_radius
        {
            return false;
        }
        self.levels
            .get(&level)
            .is_some_and(|map| map.line_of_sight(viewer.position, position))
    }

    fn is_enemy(&self, a: EntityId, b: EntityId) -> bool {
        match (self.creature(a), self.creature(b)) {
            (Some(a), Some(b)) => a.id != b.id && !self.tribes_friendly(a.tribe, b.tribe),
            _ => false,
        }
    }

    fn is_friend(&self, a: EntityId, b: EntityId) -> bool {
        match (self.creature(a), self.creature(b)) {
            (Some(a), Some(b)) => a.id != b.id && self.tribes_friendly(a.tribe, b.tribe),
            _ => false,
        }
    }

    fn can_perform(&self, actor: EntityId, action: &CreatureAction) -> bool {
        engine::validate(self, actor, action).is_ok()
    }
}

impl World for GameState {
    fn perform(
        &mut self,
        actor: EntityId,
        action: &CreatureAction,
    ) -> Result<Vec<GameEvent>, ActionError> {
        GameEngine::new(self).execute(actor, action)
    }

    fn add_morale(&mut self, id: EntityId, delta: f64) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.morale = (creature.morale + delta).clamp(-1.0, 1.0);
        }
    }

    fn add_effect(&mut self, id: EntityId, effect: LastingEffect, duration: u64) {
        let until = self.time + duration;
        if let Some(creature) = self.creatures.get_mut(&id) {
            let entry = creature.effects.entry(effect).or_insert(until);
            *entry = (*entry).max(until);
        }
    }

    fn exercise_attr(&mut self, id: EntityId, attr: AttrType) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            match attr {
                AttrType::Strength => creature.strength += 1,
                AttrType::Dexterity => creature.dexterity += 1,
                AttrType::Speed => creature.speed += 1,
            }
            creature.exp_level += 0.1;
        }
    }

    fn advance_time(&mut self, ticks: u64) {
        self.time = self.time + ticks;
        let now = self.time;
        for creature in self.creatures.values_mut() {
            creature.expire_effects(now);
        }
    }
}
