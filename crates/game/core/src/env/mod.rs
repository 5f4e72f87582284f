//! Traits describing the world the AI layer plays in.
//!
//! [`WorldView`] is the read-only query surface behaviours evaluate against;
//! [`World`] adds the mutating entry points used by the arbitration layer and
//! by event handlers. [`LevelMap`] holds the static terrain of a level.
mod map;
mod world;

pub use map::{LevelMap, MapDimensions, MapParseError, SquareApplyType, SquareView, TerrainKind};
pub use world::{World, WorldView};
