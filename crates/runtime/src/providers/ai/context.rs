//! Per-decision context handed to every behaviour.
//!
//! The [`AiContext`] is the "blackboard" of one agent activation. It provides:
//!
//! - Read access to the world snapshot (stable for the whole decision)
//! - The caller's random source
//! - Tunable constants
//! - An event sink for notifications that happen while deciding
//! - Access to village controls for delegated behaviours
//!
//! Helper methods implement the queries shared by several behaviours (closest
//! enemy, best weapon, using an item or spell with a given effect).

use rand::RngCore;
use rand::seq::SliceRandom;

use game_core::{
    CreatureAction, CreatureState, EffectType, EntityId, GameConfig, GameEvent, ItemClass,
    ItemState, Position, Tick, WorldView,
};

use super::types::Move;
use crate::village::VillageRegistry;

/// Context for one agent's decision.
///
/// # Lifetime
///
/// The `'a` lifetime ties every borrow to a single activation: behaviours may
/// hold creature references obtained from [`AiContext::creature`] while they
/// draw random numbers or publish events.
pub struct AiContext<'a> {
    /// The entity making the decision.
    pub actor: EntityId,

    /// Read-only world snapshot.
    pub world: &'a dyn WorldView,

    pub rng: &'a mut dyn RngCore,

    pub config: &'a GameConfig,

    /// Village controls, when the agent runs inside a simulation.
    pub villages: Option<&'a mut VillageRegistry>,

    /// Events raised while deciding, published even if no move is made.
    events: &'a mut Vec<GameEvent>,
}

impl<'a> AiContext<'a> {
    pub fn new(
        actor: EntityId,
        world: &'a dyn WorldView,
        rng: &'a mut dyn RngCore,
        config: &'a GameConfig,
        events: &'a mut Vec<GameEvent>,
    ) -> Self {
        Self {
            actor,
            world,
            rng,
            config,
            villages: None,
            events,
        }
    }

    pub fn with_villages(mut self, villages: &'a mut VillageRegistry) -> Self {
        self.villages = Some(villages);
        self
    }

    /// The deciding creature, if it is still alive.
    pub fn creature(&self) -> Option<&'a CreatureState> {
        self.world.creature(self.actor)
    }

    pub fn time(&self) -> Tick {
        self.world.time()
    }

    /// Publishes an event immediately, independent of the chosen move.
    pub fn publish(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn combat_event(&self, creature: EntityId) -> GameEvent {
        GameEvent::Combat {
            creature,
            time: self.time(),
        }
    }

    pub fn can(&self, action: &CreatureAction) -> bool {
        self.world.can_perform(self.actor, action)
    }

    /// `Move::new(value, action)` if the action is legal, otherwise no move.
    pub fn propose(&self, value: f64, action: CreatureAction) -> Move {
        if self.can(&action) {
            Move::new(value, action)
        } else {
            Move::NONE
        }
    }

    /// Creature standing next to the actor in `direction`.
    pub fn neighbour(&self, direction: Position) -> Option<&'a CreatureState> {
        let me = self.creature()?;
        self.world.creature_at(me.level, me.position + direction)
    }

    pub fn shuffled_directions(&mut self) -> [Position; 8] {
        let mut directions = Position::DIRECTIONS8;
        directions.shuffle(&mut *self.rng);
        directions
    }

    /// Nearest visible enemy by Chebyshev distance, ignoring pests.
    pub fn closest_enemy(&self) -> Option<&'a CreatureState> {
        let me = self.creature()?;
        let mut best: Option<(&'a CreatureState, i32)> = None;
        for id in self.world.visible_enemies(self.actor) {
            let Some(other) = self.world.creature(id) else {
                continue;
            };
            if other.tribe.is_pest() {
                continue;
            }
            let distance = (other.position - me.position).length8();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((other, distance));
            }
        }
        best.map(|(creature, _)| creature)
    }

    /// Highest-damage carried weapon, regardless of strength requirements.
    pub fn best_weapon(&self) -> Option<&'a ItemState> {
        let me = self.creature()?;
        let mut best: Option<&'a ItemState> = None;
        for item in me
            .inventory
            .iter()
            .filter(|item| matches!(item.class, ItemClass::Weapon))
        {
            if best.is_none_or(|b| item.damage > b.damage) {
                best = Some(item);
            }
        }
        best
    }

    /// Casts a matching spell or applies a matching item taking at most `max_turns`.
    pub fn try_apply_item(&self, effect: EffectType, max_turns: u32) -> Move {
        let Some(me) = self.creature() else {
            return Move::NONE;
        };
        for (index, spell) in me.spells.iter().enumerate() {
            if spell.effect == effect {
                let mv = self.propose(1.0, CreatureAction::CastSpell { spell: index });
                if mv.is_some() {
                    return mv;
                }
            }
        }
        for item in me.inventory.iter().filter(|item| item.effect == Some(effect)) {
            if item.apply_time <= max_turns {
                let mv = self.propose(1.0, CreatureAction::ApplyItem { item: item.id });
                if mv.is_some() {
                    return mv;
                }
            }
        }
        Move::NONE
    }
}
