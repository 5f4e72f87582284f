use crate::action::{ActionError, CreatureAction};
use crate::env::{SquareApplyType, WorldView};
use crate::state::{
    CreatureFlags, CreatureState, EntityId, GameState, ItemClass, Position, Skills,
};

/// What validation resolved the action to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing beyond the action itself.
    Direct,
    /// Square the actor will end up on.
    Step(Position),
    /// Creature the action affects.
    Target(EntityId),
}

/// Checks whether `actor` can perform `action` right now.
pub fn validate(
    state: &GameState,
    actor: EntityId,
    action: &CreatureAction,
) -> Result<Resolution, ActionError> {
    let creature = state
        .creature(actor)
        .ok_or(ActionError::ActorNotFound(actor))?;
    let not_possible = || ActionError::NotPossible {
        actor,
        action: action.name(),
    };

    match action {
        CreatureAction::Wait | CreatureAction::Die => Ok(Resolution::Direct),

        CreatureAction::Move { direction } => {
            unit(*direction)?;
            if creature.is_stationary() {
                return Err(not_possible());
            }
            let destination = creature.position + *direction;
            if !state.is_free(creature.level, destination) {
                return Err(ActionError::Blocked(destination));
            }
            Ok(Resolution::Step(destination))
        }

        CreatureAction::MoveTowards { target } => {
            if creature.is_stationary() {
                return Err(not_possible());
            }
            step_towards(state, creature, *target)
                .map(Resolution::Step)
                .ok_or(ActionError::NoPath)
        }

        CreatureAction::MoveAway { from, .. } => {
            if creature.is_stationary() {
                return Err(not_possible());
            }
            step_away(state, creature, *from)
                .map(Resolution::Step)
                .ok_or(ActionError::NoPath)
        }

        CreatureAction::Attack { direction } => {
            let target = neighbour(state, creature, *direction)?;
            Ok(Resolution::Target(target.id))
        }

        CreatureAction::Heal { direction } => {
            if !creature.has_skill(Skills::HEALING) {
                return Err(not_possible());
            }
            let target = neighbour(state, creature, *direction)?;
            if !state.is_friend(actor, target.id) || target.health >= 1.0 {
                return Err(not_possible());
            }
            Ok(Resolution::Target(target.id))
        }

        CreatureAction::ApplyItem { item } => {
            let item = creature.item(*item).ok_or(ActionError::ItemNotFound {
                actor,
                item: *item,
            })?;
            if item.effect.is_none() {
                return Err(not_possible());
            }
            Ok(Resolution::Direct)
        }

        CreatureAction::CastSpell { spell } => match creature.spells.get(*spell) {
            Some(spell) if spell.is_ready(state.time()) => Ok(Resolution::Direct),
            _ => Err(not_possible()),
        },

        CreatureAction::ApplySquare => {
            match state
                .square(creature.level, creature.position)
                .and_then(|square| square.apply_type)
            {
                Some(SquareApplyType::Sleep) => Ok(Resolution::Direct),
                Some(SquareApplyType::Stairs { to, destination }) => {
                    if state.is_free(to, destination) {
                        Ok(Resolution::Direct)
                    } else {
                        Err(ActionError::Blocked(destination))
                    }
                }
                None => Err(not_possible()),
            }
        }

        CreatureAction::Equip { item } => {
            let item_state = creature.item(*item).ok_or(ActionError::ItemNotFound {
                actor,
                item: *item,
            })?;
            if !creature.is_humanoid()
                || !item_state.is_weapon()
                || item_state.min_strength > creature.strength
                || creature.is_equipped(*item)
            {
                return Err(not_possible());
            }
            Ok(Resolution::Direct)
        }

        CreatureAction::Fire { direction } => {
            unit(*direction)?;
            let has_ammo = creature
                .inventory
                .iter()
                .any(|item| matches!(item.class, ItemClass::Ammo));
            if !creature.has_skill(Skills::ARCHERY) || !has_ammo {
                return Err(not_possible());
            }
            Ok(Resolution::Direct)
        }

        CreatureAction::Throw { item, direction } => {
            unit(*direction)?;
            creature.item(*item).ok_or(ActionError::ItemNotFound {
                actor,
                item: *item,
            })?;
            Ok(Resolution::Direct)
        }

        CreatureAction::StealFrom { direction, items } => {
            if !creature.has_skill(Skills::STEALING) || items.is_empty() {
                return Err(not_possible());
            }
            let victim = neighbour(state, creature, *direction)?;
            if let Some(missing) = items.iter().find(|id| victim.item(**id).is_none()) {
                return Err(ActionError::ItemNotFound {
                    actor: victim.id,
                    item: *missing,
                });
            }
            Ok(Resolution::Target(victim.id))
        }

        CreatureAction::FlyAway => {
            if creature.flags.contains(CreatureFlags::FLYER) {
                Ok(Resolution::Direct)
            } else {
                Err(not_possible())
            }
        }

        CreatureAction::StayIn { location } => {
            let location = state
                .location(*location)
                .filter(|location| location.level == creature.level)
                .ok_or_else(not_possible)?;
            if location.bounds.contains(creature.position) {
                return Ok(Resolution::Direct);
            }
            if creature.is_stationary() {
                return Err(not_possible());
            }
            step_towards(state, creature, location.bounds.middle())
                .map(Resolution::Step)
                .ok_or(ActionError::NoPath)
        }

        CreatureAction::Destroy { direction } => {
            unit(*direction)?;
            let position = creature.position + *direction;
            let square = state
                .square(creature.level, position)
                .ok_or(ActionError::OutOfBounds(position))?;
            if !square.destructible {
                return Err(not_possible());
            }
            Ok(Resolution::Direct)
        }

        CreatureAction::PickUp { items } => {
            let floor = state.items_at(creature.level, creature.position);
            if items.is_empty() || !items.iter().all(|id| floor.iter().any(|i| i.id == *id)) {
                return Err(not_possible());
            }
            Ok(Resolution::Direct)
        }
    }
}

fn unit(direction: Position) -> Result<(), ActionError> {
    if direction.is_unit() {
        Ok(())
    } else {
        Err(ActionError::InvalidDirection(direction))
    }
}

fn neighbour<'a>(
    state: &'a GameState,
    creature: &CreatureState,
    direction: Position,
) -> Result<&'a CreatureState, ActionError> {
    unit(direction)?;
    let position = creature.position + direction;
    state
        .creature_at(creature.level, position)
        .ok_or(ActionError::TargetNotFound(position))
}

/// Greedy step that gets closer to `target`.
pub(crate) fn step_towards(
    state: &GameState,
    creature: &CreatureState,
    target: Position,
) -> Option<Position> {
    let from = creature.position;
    if from == target {
        return None;
    }
    let key = |p: Position| (p.dist8(target), p.dist_d(target));
    let current = key(from);
    from.neighbors()
        .filter(|p| state.is_free(creature.level, *p))
        .map(|p| (key(p), p))
        .filter(|(k, _)| k.0 < current.0 || (k.0 == current.0 && k.1 < current.1))
        .min_by(|(a, _), (b, _)| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)))
        .map(|(_, p)| p)
}

/// Greedy step that gets further from `threat`.
pub(crate) fn step_away(
    state: &GameState,
    creature: &CreatureState,
    threat: Position,
) -> Option<Position> {
    let from = creature.position;
    let key = |p: Position| (p.dist8(threat), p.dist_d(threat));
    let current = key(from);
    from.neighbors()
        .filter(|p| state.is_free(creature.level, *p))
        .map(|p| (key(p), p))
        .filter(|(k, _)| k.0 > current.0 || (k.0 == current.0 && k.1 > current.1))
        .max_by(|(a, _), (b, _)| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)))
        .map(|(_, p)| p)
}
