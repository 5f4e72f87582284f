//! Monster AI runtime for the dungeon simulation.
//!
//! Every non-player creature is driven by a [`MonsterAi`] engine that polls a
//! weighted list of behaviours each turn and performs the most desirable
//! proposal. Village controls coordinate whole factions: they decide when to
//! raid the villain and hand out tasks to their members.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the single-threaded [`Simulation`] driver and builder
//! - [`providers`] holds the behaviours, the arbitration engine and presets
//! - [`village`] implements village controls, attack triggers and tasks
//! - [`events`] queues world events for synchronous dispatch
//! - [`snapshot`] saves and restores all AI state
//! - [`api`] exposes the error type downstream clients interact with
pub mod api;
pub mod events;
pub mod providers;
pub mod runtime;
pub mod snapshot;
pub mod village;

pub use api::{AiError, Result};
pub use events::{EventBus, Topic};
pub use providers::ai::{
    AiContext, Behaviour, Decision, MonsterAi, MonsterAiFactory, Move, Turn, WeightedBehaviour,
    select,
};
pub use runtime::{Simulation, SimulationBuilder, SimulationConfig};
pub use snapshot::AiSnapshot;
pub use village::{
    AttackAction, AttackTrigger, ControlKind, Task, VillageControl, VillageId, VillageInfo,
    VillageRegistry, VillageState,
};
