//! The closed set of behaviour strategies.
//!
//! Each [`Behaviour`] proposes at most one [`Move`] per turn and may value
//! items lying on the agent's square. Unmet preconditions always yield
//! [`Move::NONE`]; behaviours never fail.
//!
//! | behaviour | proposes |
//! |---|---|
//! | `Heal` | healing friends, curing poison, potions, beds |
//! | `Rest` / `Wait` | waiting at 0.1 / 1.0 |
//! | `MoveRandomly` | wandering at 0.0001 |
//! | `AttackPest` | hitting adjacent vermin |
//! | `BirdFlyAway` | leaving the map |
//! | `GoldLust` | nothing; values gold |
//! | `Fighter` | panic or attack |
//! | `GuardTarget` / `GuardArea` / `GuardSquare` | staying near something |
//! | `DoorEater` | eating doors |
//! | `DieTime` / `Summoned` | timed self-destruction |
//! | `Thief` | stealing gold |
//! | `ByCollective` / `SingleTask` | task moves |
//! | `ChooseRandom` | a random sub-behaviour's move |

mod delegate;
mod fighter;
mod guard;
mod heal;
mod idle;
#[cfg(test)]
mod mock;
mod thief;
mod wildlife;

pub use delegate::ChooseRandom;
pub use fighter::{Fighter, panic_weight};
pub use guard::{GuardRange, GuardSquare, GuardTarget, Summoned};
pub use heal::Heal;
pub use idle::MoveRandomly;
pub use thief::Thief;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use game_core::{
    CreatureAction, EntityId, GameEvent, ItemState, LocationId, Tick, World, WorldView,
};

use super::{AiContext, Memo, Move};
use crate::village::{Task, VillageId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Behaviour {
    Heal(Heal),
    Rest,
    Wait,
    MoveRandomly(MoveRandomly),
    AttackPest,
    BirdFlyAway { max_distance: f64 },
    GoldLust,
    Fighter(Fighter),
    GuardTarget(GuardTarget),
    GuardArea { location: LocationId },
    GuardSquare(GuardSquare),
    DoorEater,
    DieTime { at: Tick },
    Summoned(Summoned),
    Thief(Thief),
    ByCollective { village: VillageId },
    ChooseRandom(ChooseRandom),
    SingleTask(Task),
}

impl Behaviour {
    pub fn heal(use_beds: bool) -> Self {
        Behaviour::Heal(Heal::new(use_beds))
    }

    pub fn move_randomly(memory: usize) -> Self {
        Behaviour::MoveRandomly(MoveRandomly::new(memory))
    }

    pub fn fighter(max_power_ratio: f64, chase: bool) -> Self {
        Behaviour::Fighter(Fighter::new(max_power_ratio, chase))
    }

    pub fn thief() -> Self {
        Behaviour::Thief(Thief::new())
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn get_move(&mut self, ctx: &mut AiContext<'_>) -> Move {
        match self {
            Behaviour::Heal(heal) => heal.get_move(ctx),
            Behaviour::Rest => Move::new(0.1, CreatureAction::Wait),
            Behaviour::Wait => Move::new(1.0, CreatureAction::Wait),
            Behaviour::MoveRandomly(wander) => wander.get_move(ctx),
            Behaviour::AttackPest => wildlife::attack_pest(ctx),
            Behaviour::BirdFlyAway { max_distance } => wildlife::bird_fly_away(ctx, *max_distance),
            Behaviour::GoldLust => Move::NONE,
            Behaviour::Fighter(fighter) => fighter.get_move(ctx),
            Behaviour::GuardTarget(guard) => guard.get_move(ctx),
            Behaviour::GuardArea { location } => ctx.propose(
                1.0,
                CreatureAction::StayIn {
                    location: *location,
                },
            ),
            Behaviour::GuardSquare(guard) => guard.get_move(ctx),
            Behaviour::DoorEater => wildlife::door_eater(ctx),
            Behaviour::DieTime { at } => wildlife::die_time(ctx, *at),
            Behaviour::Summoned(summoned) => summoned.get_move(ctx),
            Behaviour::Thief(thief) => thief.get_move(ctx),
            Behaviour::ByCollective { village } => delegate::by_collective(ctx, *village),
            Behaviour::ChooseRandom(choose) => choose.get_move(ctx),
            Behaviour::SingleTask(task) => task.get_move(ctx),
        }
    }

    /// How much this behaviour wants `item` picked up; zero means indifferent.
    pub fn item_value(&self, item: &ItemState, ctx: &AiContext<'_>) -> f64 {
        match self {
            Behaviour::Heal(heal) => heal.item_value(item),
            Behaviour::GoldLust if item.is_gold() => 1.0,
            Behaviour::Fighter(fighter) => fighter.item_value(item, ctx),
            _ => 0.0,
        }
    }

    pub fn on_attacked(&mut self, owner: EntityId, attacker: EntityId, world: &dyn WorldView) {
        if let Behaviour::Fighter(fighter) = self {
            fighter.on_attacked(owner, attacker, world);
        }
    }

    pub fn on_event(
        &mut self,
        owner: EntityId,
        event: &GameEvent,
        world: &mut dyn World,
        rng: &mut dyn RngCore,
    ) {
        match self {
            Behaviour::Fighter(fighter) => fighter.on_event(owner, event, world, rng),
            Behaviour::Summoned(summoned) => summoned.on_event(event),
            Behaviour::ChooseRandom(choose) => choose.on_event(owner, event, world, rng),
            Behaviour::SingleTask(task) => task.on_event(owner, event),
            _ => {}
        }
    }

    /// Writes back the memory carried by this behaviour's performed move.
    pub(crate) fn apply_memo(&mut self, memo: Memo) {
        match self {
            Behaviour::MoveRandomly(wander) => wander.apply_memo(memo),
            Behaviour::Fighter(fighter) => fighter.apply_memo(memo),
            Behaviour::Thief(thief) => thief.apply_memo(memo),
            Behaviour::ChooseRandom(choose) => choose.apply_memo(memo),
            _ => {}
        }
    }
}
