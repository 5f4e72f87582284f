use std::collections::BTreeMap;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use game_content::{AttackActionInfo, TriggerInfo, VillageControlInfo, VillageKindInfo};
use game_core::{FactionId, GameEvent, LocationId, VillageConfig, World, WorldView};

use super::{
    AttackAction, AttackTrigger, FinalTrigger, PowerTrigger, Task, TriggerScope, VillageControl,
    VillageId, VillageInfo,
};
use crate::api::{AiError, Result};
use crate::providers::ai::{AiContext, Move};

/// Every village control of a simulation, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VillageRegistry {
    villages: BTreeMap<VillageId, VillageControl>,
}

fn build_trigger(
    info: &TriggerInfo,
    scope: &TriggerScope<'_>,
    rng: &mut dyn RngCore,
) -> AttackTrigger {
    match info {
        TriggerInfo::Power {
            killed_coeff,
            power_coeff,
        } => AttackTrigger::Power(PowerTrigger::new(scope, *killed_coeff, *power_coeff, rng)),
        TriggerInfo::FirstContact(inner) => {
            AttackTrigger::first_contact(build_trigger(inner, scope, rng))
        }
        TriggerInfo::Final { watched } => AttackTrigger::Final(FinalTrigger::new(
            watched.iter().copied().map(VillageId).collect(),
        )),
    }
}

impl VillageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds controls from content declarations against the current world.
    pub fn from_infos(
        infos: &[VillageControlInfo],
        world: &dyn WorldView,
        rng: &mut dyn RngCore,
        config: &VillageConfig,
    ) -> Self {
        let mut registry = Self::new();
        for info in infos {
            registry.insert(Self::build(info, world, rng, config));
        }
        registry
    }

    pub fn build(
        info: &VillageControlInfo,
        world: &dyn WorldView,
        rng: &mut dyn RngCore,
        config: &VillageConfig,
    ) -> VillageControl {
        let id = VillageId(info.id);
        let faction = FactionId(info.faction);
        let villain = FactionId(info.villain);
        let location = LocationId(info.location);
        match &info.kind {
            VillageKindInfo::Peaceful => {
                VillageControl::peaceful(id, faction, villain, location, world)
            }
            VillageKindInfo::TopLevel { trigger, action } => {
                let scope = TriggerScope {
                    world,
                    faction,
                    villain,
                    config,
                };
                let trigger = build_trigger(trigger, &scope, rng);
                let action = match action {
                    AttackActionInfo::AttackLeader => AttackAction::AttackLeader,
                    AttackActionInfo::Steal => AttackAction::Steal,
                };
                VillageControl::top_level(id, faction, villain, location, world, trigger, action)
            }
            VillageKindInfo::Dragon => {
                VillageControl::dragon(id, faction, villain, location, world)
            }
        }
    }

    pub fn insert(&mut self, control: VillageControl) -> Option<VillageControl> {
        self.villages.insert(control.id(), control)
    }

    pub fn get(&self, id: VillageId) -> Option<&VillageControl> {
        self.villages.get(&id)
    }

    pub fn get_mut(&mut self, id: VillageId) -> Option<&mut VillageControl> {
        self.villages.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VillageControl> {
        self.villages.values()
    }

    pub fn len(&self) -> usize {
        self.villages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.villages.is_empty()
    }

    /// Move proposed by village `id` for the deciding creature.
    pub fn get_move(&mut self, id: VillageId, ctx: &mut AiContext<'_>) -> Move {
        match self.villages.get_mut(&id) {
            Some(control) => control.get_move(ctx),
            None => {
                tracing::warn!(village = %id, creature = %ctx.actor, "unknown village");
                Move::NONE
            }
        }
    }

    pub fn get_new_task(&mut self, id: VillageId, ctx: &mut AiContext<'_>) -> Result<Option<Task>> {
        let control = self
            .villages
            .get_mut(&id)
            .ok_or(AiError::UnknownVillage(id))?;
        Ok(control.get_new_task(ctx))
    }

    /// Runs one macro tick of every village.
    pub fn advance<W: World>(&mut self, world: &mut W, rng: &mut dyn RngCore, config: &VillageConfig) {
        let settled: BTreeMap<VillageId, bool> = self
            .villages
            .iter()
            .map(|(id, control)| (*id, control.is_anonymous() || control.is_conquered(&*world)))
            .collect();
        for control in self.villages.values_mut() {
            control.tick(world, rng, config, &settled);
        }
    }

    pub fn on_event(
        &mut self,
        event: &GameEvent,
        world: &dyn WorldView,
        config: &VillageConfig,
        events: &mut Vec<GameEvent>,
    ) {
        for control in self.villages.values_mut() {
            control.on_event(event, world, config, events);
        }
    }

    pub fn infos(&self, world: &dyn WorldView) -> Vec<VillageInfo> {
        self.villages.values().map(|control| control.info(world)).collect()
    }
}
