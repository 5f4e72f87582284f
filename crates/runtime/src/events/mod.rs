//! Topic-based event bus for world events.
//!
//! Events produced by performed actions, behaviours and village controls are
//! queued on the [`EventBus`] and dispatched synchronously by the simulation.

mod bus;

pub use bus::{EventBus, Topic};
