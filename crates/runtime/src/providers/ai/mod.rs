//! Weighted behaviour AI for monsters and villagers.
//!
//! Every agent owns a [`MonsterAi`] engine holding an ordered list of
//! `(behaviour, weight)` pairs. One activation works like this:
//!
//! 1. **Polling**: each [`Behaviour`] proposes at most one [`Move`] with a
//!    desirability in `[0, 1]` (some exceed 1), scaled by its weight
//!    - Example: a `Fighter` at weight 3 proposing a melee attack at 1.0 scores 3.0
//!
//! 2. **Pickups**: engines that pick up items add one candidate per item stack
//!    underfoot, valued by the behaviour that wants it most
//!
//! 3. **Selection**: the first strictly largest candidate wins
//!    (see [`select`] for the short-circuit rule)
//!
//! 4. **Execution**: the winning action is performed on the world; events it
//!    produced are published and the winning behaviour receives its [`Memo`]
//!
//! # Core Components
//!
//! - [`MonsterAi`]: per-agent engine and arbitration
//! - [`Behaviour`]: the closed set of strategies
//! - [`MonsterAiFactory`]: preset loadouts for creature archetypes
//! - [`AiContext`]: world snapshot, random source and event sink for one decision

mod behaviour;
mod context;
mod engine;
mod presets;
mod types;

pub use behaviour::{
    Behaviour, ChooseRandom, Fighter, GuardRange, GuardSquare, GuardTarget, Heal, MoveRandomly,
    Summoned, Thief, panic_weight,
};
pub use context::AiContext;
pub use engine::{Candidate, Decision, MonsterAi, Turn, WeightedBehaviour, select};
pub use presets::MonsterAiFactory;
pub use types::{LastSeen, LastSeenKind, Memo, Move, Plan};
