use crate::action::CreatureAction;
use crate::env::{SquareApplyType, SquareView, TerrainKind, World, WorldView};
use crate::event::GameEvent;
use crate::state::{
    EffectType, EntityId, GameState, ItemClass, ItemId, ItemState, LastingEffect, LevelId,
    Position,
};

use super::Resolution;

const LASTING_EFFECT_TURNS: u64 = 20;
const SLEEP_TURNS: u64 = 15;
const BED_HEALING: f64 = 0.2;
const HEAL_ITEM_AMOUNT: f64 = 0.5;
const HEAL_SKILL_AMOUNT: f64 = 0.3;

/// Applies an already validated action.
pub(super) fn apply(
    state: &mut GameState,
    actor: EntityId,
    action: &CreatureAction,
    resolution: Resolution,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let Some((level, position)) = state.creature(actor).map(|c| (c.level, c.position)) else {
        return events;
    };

    match action {
        CreatureAction::Wait => {}

        CreatureAction::Move { .. }
        | CreatureAction::MoveTowards { .. }
        | CreatureAction::MoveAway { .. }
        | CreatureAction::StayIn { .. } => {
            if let Resolution::Step(destination) = resolution
                && let Some(creature) = state.creature_mut(actor)
            {
                creature.position = destination;
            }
        }

        CreatureAction::Attack { .. } => {
            if let Resolution::Target(target) = resolution {
                let damage = state.creature(actor).map_or(0, |c| c.attack_damage());
                events.extend(wound(state, target, damage, Some(actor)));
            }
        }

        CreatureAction::Heal { .. } => {
            if let Resolution::Target(target) = resolution
                && let Some(creature) = state.creature_mut(target)
            {
                creature.health = (creature.health + HEAL_SKILL_AMOUNT).min(1.0);
            }
        }

        CreatureAction::ApplyItem { item } => {
            let effect = take_item(state, actor, *item).and_then(|item| item.effect);
            if let Some(effect) = effect {
                apply_effect(state, actor, effect);
            }
        }

        CreatureAction::CastSpell { spell } => {
            let now = state.time();
            let effect = state.creature_mut(actor).and_then(|c| {
                let spell = c.spells.get_mut(*spell)?;
                spell.ready_at = now + spell.cooldown;
                Some(spell.effect)
            });
            if let Some(effect) = effect {
                apply_effect(state, actor, effect);
            }
        }

        CreatureAction::ApplySquare => match state.square(level, position).and_then(|s| s.apply_type) {
            Some(SquareApplyType::Sleep) => {
                state.add_effect(actor, LastingEffect::Sleep, SLEEP_TURNS);
                if let Some(creature) = state.creature_mut(actor) {
                    creature.health = (creature.health + BED_HEALING).min(1.0);
                }
            }
            Some(SquareApplyType::Stairs { to, destination }) => {
                if let Some(creature) = state.creature_mut(actor) {
                    creature.level = to;
                    creature.position = destination;
                }
                events.push(GameEvent::ChangeLevel {
                    creature: actor,
                    from: level,
                    from_position: position,
                    to,
                    to_position: destination,
                });
            }
            None => {}
        },

        CreatureAction::Equip { item } => {
            if let Some(creature) = state.creature_mut(actor) {
                creature.weapon = Some(*item);
            }
        }

        CreatureAction::Fire { direction } => {
            let ammo = state.creature(actor).and_then(|c| {
                c.inventory
                    .iter()
                    .find(|item| matches!(item.class, ItemClass::Ammo))
                    .map(|item| item.id)
            });
            let damage = state.creature(actor).map_or(0, |c| c.attack_damage());
            if let Some(ammo) = ammo.and_then(|id| take_item(state, actor, id)) {
                let (trajectory, hit) = trajectory(state, level, position, *direction);
                if let Some(landing) = trajectory.last() {
                    state.drop_item(level, *landing, ammo);
                }
                if let Some(target) = hit {
                    events.extend(wound(state, target, damage, Some(actor)));
                }
            }
        }

        CreatureAction::Throw { item, direction } => {
            if let Some(thrown) = take_item(state, actor, *item) {
                let (trajectory, hit) = trajectory(state, level, position, *direction);
                events.push(GameEvent::Throw {
                    thrower: actor,
                    level,
                    item_name: thrown.name.clone(),
                    trajectory: trajectory.clone(),
                });
                if let Some(target) = hit {
                    match thrown.effect {
                        Some(EffectType::Lasting(effect)) => {
                            state.add_effect(target, effect, LASTING_EFFECT_TURNS)
                        }
                        _ => events.extend(wound(state, target, thrown.thrown_damage, Some(actor))),
                    }
                }
                let landing = trajectory.last().copied().unwrap_or(position);
                state.drop_item(level, landing, thrown);
            }
        }

        CreatureAction::StealFrom { items, .. } => {
            if let Resolution::Target(victim) = resolution {
                let stolen: Vec<ItemState> = items
                    .iter()
                    .filter_map(|id| take_item(state, victim, *id))
                    .collect();
                if let Some(thief) = state.creature_mut(actor) {
                    thief.inventory.extend(stolen);
                }
            }
        }

        CreatureAction::FlyAway => {
            state.remove_creature(actor);
        }

        CreatureAction::Destroy { direction } => {
            let target = position + *direction;
            if let Some(map) = state.level_mut(level) {
                map.set_square(target, SquareView::new(TerrainKind::Floor));
            }
            events.push(GameEvent::SquareReplaced {
                level,
                position: target,
            });
        }

        CreatureAction::PickUp { items } => {
            let picked = state.take_floor_items(level, position, items);
            if let Some(creature) = state.creature_mut(actor) {
                creature.inventory.extend(picked);
            }
        }

        CreatureAction::Die => {
            events.extend(state.kill(actor, None));
        }
    }

    events
}

/// Deals damage, killing the target when its health runs out.
fn wound(
    state: &mut GameState,
    target: EntityId,
    damage: i32,
    attacker: Option<EntityId>,
) -> Vec<GameEvent> {
    let scale = state.config.damage_scale;
    let Some(creature) = state.creature_mut(target) else {
        return Vec::new();
    };
    if creature.is_invincible() {
        return Vec::new();
    }
    creature.effects.remove(&LastingEffect::Sleep);
    creature.health -= f64::from(damage.max(0)) * scale;
    let dead = creature.health <= 0.0;
    let mut events = vec![GameEvent::Wounded {
        victim: target,
        attacker,
    }];
    if dead {
        events.extend(state.kill(target, attacker));
    }
    events
}

fn take_item(state: &mut GameState, owner: EntityId, item: ItemId) -> Option<ItemState> {
    let creature = state.creature_mut(owner)?;
    let index = creature.inventory.iter().position(|i| i.id == item)?;
    if creature.weapon == Some(item) {
        creature.weapon = None;
    }
    Some(creature.inventory.remove(index))
}

fn apply_effect(state: &mut GameState, actor: EntityId, effect: EffectType) {
    match effect {
        EffectType::Heal => {
            if let Some(creature) = state.creature_mut(actor) {
                creature.health = (creature.health + HEAL_ITEM_AMOUNT).min(1.0);
            }
        }
        EffectType::CurePoison => {
            if let Some(creature) = state.creature_mut(actor) {
                creature.effects.remove(&LastingEffect::Poison);
            }
        }
        EffectType::Teleport => {
            if let Some(destination) = teleport_destination(state, actor)
                && let Some(creature) = state.creature_mut(actor)
            {
                creature.position = destination;
            }
        }
        // Spirits are not modelled by the reference world.
        EffectType::SummonSpirit => {}
        EffectType::Lasting(effect) => state.add_effect(actor, effect, LASTING_EFFECT_TURNS),
    }
}

/// Free square within sight radius that is furthest from the actor.
fn teleport_destination(state: &GameState, actor: EntityId) -> Option<Position> {
    let creature = state.creature(actor)?;
    let map = state.level(creature.level)?;
    let radius = state.config.sight_radius;
    crate::state::Rect::around(creature.position, radius + 1)
        .positions()
        .filter(|p| map.contains(*p) && state.is_free(creature.level, *p))
        .max_by_key(|p| p.dist8(creature.position))
}

/// Walks from `origin` along `direction` until a creature or an obstacle.
fn trajectory(
    state: &GameState,
    level: LevelId,
    origin: Position,
    direction: Position,
) -> (Vec<Position>, Option<EntityId>) {
    let mut path = Vec::new();
    let mut current = origin;
    for _ in 0..state.config.throw_range {
        current += direction;
        if !state
            .square(level, current)
            .is_some_and(|square| square.is_passable())
        {
            break;
        }
        path.push(current);
        if let Some(hit) = state.creature_at(level, current) {
            return (path, Some(hit.id));
        }
    }
    (path, None)
}
