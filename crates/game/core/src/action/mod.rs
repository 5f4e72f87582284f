//! Concrete creature actions.
//!
//! AI behaviours never mutate the world directly: they propose a
//! [`CreatureAction`], ask the world whether it is legal right now, and the
//! arbitration layer performs exactly one of them per turn.
mod error;

pub use error::ActionError;

use crate::state::{ItemId, LocationId, Position};

/// A single action a creature can take on its turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureAction {
    Wait,
    /// Step by one unit direction.
    Move { direction: Position },
    /// Take one step along a path to `target`.
    MoveTowards { target: Position },
    /// Take one step increasing distance from `from`.
    MoveAway { from: Position, path_find: bool },
    /// Melee the creature at the adjacent direction.
    Attack { direction: Position },
    /// Heal the friend at the adjacent direction.
    Heal { direction: Position },
    ApplyItem { item: ItemId },
    CastSpell { spell: usize },
    /// Use the square the creature stands on (bed, stairs).
    ApplySquare,
    Equip { item: ItemId },
    /// Shoot an arrow along a unit direction.
    Fire { direction: Position },
    Throw { item: ItemId, direction: Position },
    StealFrom { direction: Position, items: Vec<ItemId> },
    /// Leave the map.
    FlyAway,
    StayIn { location: LocationId },
    /// Break the square in the adjacent direction.
    Destroy { direction: Position },
    PickUp { items: Vec<ItemId> },
    Die,
}

impl CreatureAction {
    pub fn name(&self) -> &'static str {
        match self {
            CreatureAction::Wait => "wait",
            CreatureAction::Move { .. } => "move",
            CreatureAction::MoveTowards { .. } => "move_towards",
            CreatureAction::MoveAway { .. } => "move_away",
            CreatureAction::Attack { .. } => "attack",
            CreatureAction::Heal { .. } => "heal",
            CreatureAction::ApplyItem { .. } => "apply_item",
            CreatureAction::CastSpell { .. } => "cast_spell",
            CreatureAction::ApplySquare => "apply_square",
            CreatureAction::Equip { .. } => "equip",
            CreatureAction::Fire { .. } => "fire",
            CreatureAction::Throw { .. } => "throw",
            CreatureAction::StealFrom { .. } => "steal_from",
            CreatureAction::FlyAway => "fly_away",
            CreatureAction::StayIn { .. } => "stay_in",
            CreatureAction::Destroy { .. } => "destroy",
            CreatureAction::PickUp { .. } => "pick_up",
            CreatureAction::Die => "die",
        }
    }
}
