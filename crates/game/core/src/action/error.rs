//! Action execution errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, ItemId, Position};

/// Errors that can occur while validating or performing a creature action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("actor {0} not found")]
    ActorNotFound(EntityId),

    #[error("no target at {0}")]
    TargetNotFound(Position),

    #[error("{actor} does not carry {item}")]
    ItemNotFound { actor: EntityId, item: ItemId },

    #[error("{0} is not a unit direction")]
    InvalidDirection(Position),

    #[error("destination {0} is blocked")]
    Blocked(Position),

    #[error("{0} is out of bounds")]
    OutOfBounds(Position),

    #[error("no step available")]
    NoPath,

    #[error("{action} is not possible for {actor}")]
    NotPossible {
        actor: EntityId,
        action: &'static str,
    },
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActorNotFound(_) => ErrorSeverity::Validation,
            Self::InvalidDirection(_) => ErrorSeverity::Validation,
            Self::TargetNotFound(_)
            | Self::ItemNotFound { .. }
            | Self::Blocked(_)
            | Self::OutOfBounds(_)
            | Self::NoPath
            | Self::NotPossible { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorNotFound(_) => "ACTION_ACTOR_NOT_FOUND",
            Self::TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            Self::ItemNotFound { .. } => "ACTION_ITEM_NOT_FOUND",
            Self::InvalidDirection(_) => "ACTION_INVALID_DIRECTION",
            Self::Blocked(_) => "ACTION_BLOCKED",
            Self::OutOfBounds(_) => "ACTION_OUT_OF_BOUNDS",
            Self::NoPath => "ACTION_NO_PATH",
            Self::NotPossible { .. } => "ACTION_NOT_POSSIBLE",
        }
    }
}
