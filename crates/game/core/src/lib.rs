//! World vocabulary shared by the AI runtime and its tools.
//!
//! `game-core` defines creatures, items, factions and levels, the
//! [`CreatureAction`] and [`GameEvent`] vocabularies, and the [`WorldView`] /
//! [`World`] traits the AI layer is written against. [`GameState`] is an
//! in-memory world implementing those traits; all of its mutations flow
//! through [`engine::GameEngine`].
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod state;

pub use action::{ActionError, CreatureAction};
pub use config::{AiConfig, GameConfig, VillageConfig, WorldConfig};
pub use engine::GameEngine;
pub use env::{
    LevelMap, MapDimensions, MapParseError, SquareApplyType, SquareView, TerrainKind, World,
    WorldView,
};
pub use error::{ErrorSeverity, GameError};
pub use event::{GameEvent, VictimInfo};
pub use state::{
    AttrType, CreatureFlags, CreatureState, EffectType, EntityId, Faction, FactionId,
    FactionMember, GameState, ItemClass, ItemId, ItemState, LastingEffect, LevelId, Location,
    LocationId, MinionTraits, Position, Rect, Skills, Spell, StateError, Sunlight, Tick, TribeId,
    stack_items,
};
