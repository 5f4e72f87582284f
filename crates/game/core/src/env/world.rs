use crate::action::{ActionError, CreatureAction};
use crate::event::GameEvent;
use crate::state::{
    AttrType, CreatureState, EntityId, Faction, FactionId, ItemState, LastingEffect, LevelId,
    Location, LocationId, Position, Sunlight, Tick,
};

use super::SquareView;

/// Read-only queries over the world.
pub trait WorldView {
    fn time(&self) -> Tick;

    fn sunlight(&self) -> Sunlight {
        Sunlight::Day
    }

    /// Live creature by id. Dead creatures are no longer returned.
    fn creature(&self, id: EntityId) -> Option<&CreatureState>;

    /// All live creature ids, in ascending order.
    fn creature_ids(&self) -> Vec<EntityId>;

    fn creature_at(&self, level: LevelId, position: Position) -> Option<&CreatureState>;

    fn square(&self, level: LevelId, position: Position) -> Option<SquareView>;

    fn items_at(&self, level: LevelId, position: Position) -> Vec<&ItemState>;

    fn faction(&self, id: FactionId) -> Option<&Faction>;

    fn location(&self, id: LocationId) -> Option<&Location>;

    fn can_see(&self, viewer: EntityId, target: EntityId) -> bool;

    /// Whether `viewer` has an unobstructed view of a square.
    fn can_see_position(&self, viewer: EntityId, level: LevelId, position: Position) -> bool;

    fn is_enemy(&self, a: EntityId, b: EntityId) -> bool;

    fn is_friend(&self, a: EntityId, b: EntityId) -> bool;

    /// Whether `action` would succeed for `actor` right now.
    fn can_perform(&self, actor: EntityId, action: &CreatureAction) -> bool;

    fn is_alive(&self, id: EntityId) -> bool {
        self.creature(id).is_some()
    }

    /// Enemies `viewer` can currently see.
    fn visible_enemies(&self, viewer: EntityId) -> Vec<EntityId> {
        self.creature_ids()
            .into_iter()
            .filter(|&other| {
                other != viewer && self.is_enemy(viewer, other) && self.can_see(viewer, other)
            })
            .collect()
    }

    /// Every creature `viewer` can currently see.
    fn visible_creatures(&self, viewer: EntityId) -> Vec<EntityId> {
        self.creature_ids()
            .into_iter()
            .filter(|&other| other != viewer && self.can_see(viewer, other))
            .collect()
    }
}

/// Mutating world operations.
pub trait World: WorldView {
    /// Performs `action`, returning the events it caused.
    fn perform(
        &mut self,
        actor: EntityId,
        action: &CreatureAction,
    ) -> Result<Vec<GameEvent>, ActionError>;

    fn add_morale(&mut self, id: EntityId, delta: f64);

    fn add_effect(&mut self, id: EntityId, effect: LastingEffect, duration: u64);

    fn exercise_attr(&mut self, id: EntityId, attr: AttrType);

    /// Moves the clock forward, expiring timed effects.
    fn advance_time(&mut self, ticks: u64);
}
