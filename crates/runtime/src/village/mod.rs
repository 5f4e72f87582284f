//! Village controls: collective decision making for factions.
//!
//! A [`VillageControl`] owns the tasks handed out to its creatures and, for
//! hostile villages, an [`AttackTrigger`] deciding when fighters march on the
//! villain. Creatures reach their village through the `ByCollective`
//! behaviour, which resolves a [`VillageId`] through the
//! [`VillageRegistry`] once per decision.
//!
//! - [`trigger`]: power, first-contact and final-wave attack triggers
//! - [`task`]: plain-data tasks handed to individual creatures
//! - [`control`]: peaceful, top-level and dragon controls
//! - [`registry`]: the simulation-owned set of controls
mod control;
mod registry;
mod task;
mod trigger;

pub use control::{AttackAction, ControlKind, VillageControl, VillageInfo, VillageState};
pub use registry::VillageRegistry;
pub use task::Task;
pub use trigger::{AttackTrigger, FinalState, FinalTrigger, PowerTrigger, TriggerScope};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle of a village control inside a [`VillageRegistry`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct VillageId(pub u32);

impl fmt::Display for VillageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "village#{}", self.0)
    }
}
