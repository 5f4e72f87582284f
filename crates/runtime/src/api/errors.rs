//! Unified error types surfaced by the runtime API.
//!
//! Wraps configuration mistakes, arbitration failures, and world rejections so
//! the driver can classify them through [`GameError`].
use thiserror::Error;

use game_core::{ActionError, EntityId, ErrorSeverity, GameError, Tick};

use crate::village::VillageId;

pub type Result<T> = std::result::Result<T, AiError>;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("engine configured with {behaviours} behaviours but {weights} weights")]
    WeightCountMismatch { behaviours: usize, weights: usize },

    #[error("engine for {0} configured without behaviours")]
    NoBehaviours(EntityId),

    /// No candidate scored above zero; the engine lacks an idle fallback.
    #[error("no behaviour of {actor} proposed a move at tick {time}")]
    ArbitrationExhausted { actor: EntityId, time: Tick },

    #[error("no engine registered for {0}")]
    UnknownAgent(EntityId),

    #[error("unknown village {0}")]
    UnknownVillage(VillageId),

    #[error("world rejected the chosen action")]
    Action(#[from] ActionError),

    #[error("failed to encode or decode AI snapshot")]
    Snapshot(#[source] bincode::Error),
}

impl GameError for AiError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::WeightCountMismatch { .. }
            | Self::NoBehaviours(_)
            | Self::ArbitrationExhausted { .. } => ErrorSeverity::Fatal,
            Self::UnknownAgent(_) | Self::UnknownVillage(_) => ErrorSeverity::Validation,
            // Candidates are checked with `can_perform` before they win.
            Self::Action(_) => ErrorSeverity::Internal,
            Self::Snapshot(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::WeightCountMismatch { .. } => "AI_WEIGHT_COUNT_MISMATCH",
            Self::NoBehaviours(_) => "AI_NO_BEHAVIOURS",
            Self::ArbitrationExhausted { .. } => "AI_ARBITRATION_EXHAUSTED",
            Self::UnknownAgent(_) => "AI_UNKNOWN_AGENT",
            Self::UnknownVillage(_) => "AI_UNKNOWN_VILLAGE",
            Self::Action(_) => "AI_ACTION_REJECTED",
            Self::Snapshot(_) => "AI_SNAPSHOT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_fatal() {
        let mismatch = AiError::WeightCountMismatch {
            behaviours: 3,
            weights: 2,
        };
        assert_eq!(mismatch.severity(), ErrorSeverity::Fatal);
        assert_eq!(mismatch.error_code(), "AI_WEIGHT_COUNT_MISMATCH");
        assert_eq!(
            mismatch.to_string(),
            "engine configured with 3 behaviours but 2 weights"
        );

        let exhausted = AiError::ArbitrationExhausted {
            actor: EntityId(4),
            time: Tick(12),
        };
        assert!(exhausted.severity().is_internal());
    }

    #[test]
    fn lookups_are_validation_errors() {
        assert_eq!(
            AiError::UnknownAgent(EntityId(9)).severity(),
            ErrorSeverity::Validation
        );
    }
}
