//! World events observed by AI behaviours and village controls.

use crate::state::{EntityId, FactionId, LevelId, Position, Tick, TribeId};

/// Snapshot of a creature at the moment it died.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VictimInfo {
    pub id: EntityId,
    pub name: String,
    pub tribe: TribeId,
    pub faction: Option<FactionId>,
    pub difficulty_points: f64,
    pub level: LevelId,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameEvent {
    /// The creature took part in combat (attacked, chased or fled).
    Combat { creature: EntityId, time: Tick },
    /// Damage landed on `victim`, by melee or a projectile.
    Wounded {
        victim: EntityId,
        attacker: Option<EntityId>,
    },
    Kill {
        victim: VictimInfo,
        killer: Option<EntityId>,
        time: Tick,
    },
    Throw {
        thrower: EntityId,
        level: LevelId,
        item_name: String,
        trajectory: Vec<Position>,
    },
    ChangeLevel {
        creature: EntityId,
        from: LevelId,
        from_position: Position,
        to: LevelId,
        to_position: Position,
    },
    /// A humanoid gave up against an overwhelming enemy.
    Surrender { creature: EntityId, to: EntityId },
    /// A named village lost all of its fighters.
    Conquer { faction: FactionId, name: String },
    /// A creature of `faction` started (`active`) or called off an assault on the villain.
    Assault {
        creature: EntityId,
        faction: FactionId,
        active: bool,
    },
    SquareReplaced { level: LevelId, position: Position },
}

impl GameEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::Combat { .. } => "combat",
            GameEvent::Wounded { .. } => "wounded",
            GameEvent::Kill { .. } => "kill",
            GameEvent::Throw { .. } => "throw",
            GameEvent::ChangeLevel { .. } => "change_level",
            GameEvent::Surrender { .. } => "surrender",
            GameEvent::Conquer { .. } => "conquer",
            GameEvent::Assault { .. } => "assault",
            GameEvent::SquareReplaced { .. } => "square_replaced",
        }
    }
}
