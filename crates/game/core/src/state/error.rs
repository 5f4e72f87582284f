//! State management errors.
//!
//! Errors raised while populating the in-memory world.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, FactionId, LevelId, Position};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("Level {0} does not exist")]
    UnknownLevel(LevelId),

    #[error("Faction {0:?} does not exist")]
    UnknownFaction(FactionId),

    #[error("Entity {0} already exists")]
    DuplicateEntity(EntityId),

    /// Position is already occupied by another creature.
    #[error("Position {position} is already occupied by entity {occupant}")]
    PositionOccupied {
        position: Position,
        occupant: EntityId,
    },

    /// Position is outside the level or not walkable.
    #[error("Position {position} on {level} cannot hold a creature")]
    PositionBlocked { level: LevelId, position: Position },
}

impl GameError for StateError {
    fn severity(&self) -> ErrorSeverity {
        use StateError::*;
        match self {
            UnknownLevel(_) | UnknownFaction(_) | DuplicateEntity(_) => ErrorSeverity::Validation,
            PositionOccupied { .. } | PositionBlocked { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use StateError::*;
        match self {
            UnknownLevel(_) => "STATE_UNKNOWN_LEVEL",
            UnknownFaction(_) => "STATE_UNKNOWN_FACTION",
            DuplicateEntity(_) => "STATE_DUPLICATE_ENTITY",
            PositionOccupied { .. } => "STATE_POSITION_OCCUPIED",
            PositionBlocked { .. } => "STATE_POSITION_BLOCKED",
        }
    }
}
