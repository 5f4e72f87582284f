//! Action validation and execution for the in-memory world.
//!
//! [`validate`] is the single legality check behind
//! [`WorldView::can_perform`](crate::env::WorldView::can_perform);
//! [`GameEngine::execute`] validates again and then applies the action through
//! the reducer, returning the events it produced.
mod reducer;
mod validate;

pub use validate::{Resolution, validate};

use crate::action::{ActionError, CreatureAction};
use crate::event::GameEvent;
use crate::state::{EntityId, GameState};

/// Applies creature actions to a [`GameState`].
pub struct GameEngine<'a> {
    state: &'a mut GameState,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self { state }
    }

    /// Validates and performs `action` on behalf of `actor`.
    pub fn execute(
        &mut self,
        actor: EntityId,
        action: &CreatureAction,
    ) -> Result<Vec<GameEvent>, ActionError> {
        let plan = validate(self.state, actor, action)?;
        Ok(reducer::apply(self.state, actor, action, plan))
    }
}
