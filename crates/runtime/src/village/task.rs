use serde::{Deserialize, Serialize};

use game_core::{
    CreatureAction, CreatureState, EntityId, FactionId, GameEvent, LocationId, MinionTraits,
    Position, Tick, WorldView,
};

use crate::providers::ai::{AiContext, Move};

/// A unit of work a village (or a preset) hands to one creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Task {
    /// Go for the villain's leader.
    AttackLeader { villain: FactionId },
    /// Rob villain creatures carrying gold.
    StealFrom { villain: FactionId },
    /// Walk to one of the squares and use it.
    ApplySquare { squares: Vec<Position> },
    /// Kill `remaining` more villain fighters.
    KillFighters { villain: FactionId, remaining: u32 },
    StayInLocationUntil { location: LocationId, until: Tick },
}

/// Attacks the target if adjacent, otherwise walks towards it.
fn engage(ctx: &AiContext<'_>, me: &CreatureState, target: &CreatureState) -> Move {
    let offset = target.position - me.position;
    if offset.is_unit() {
        ctx.propose(1.0, CreatureAction::Attack { direction: offset })
    } else {
        ctx.propose(
            1.0,
            CreatureAction::MoveTowards {
                target: target.position,
            },
        )
    }
}

/// Villain creatures on `me`'s level matching `filter`, nearest first.
fn nearest_villain<'a>(
    world: &'a dyn WorldView,
    me: &CreatureState,
    villain: FactionId,
    filter: impl Fn(&CreatureState, bool) -> bool,
) -> Option<&'a CreatureState> {
    let faction = world.faction(villain)?;
    faction
        .members
        .iter()
        .filter_map(|member| {
            let creature = world.creature(member.id)?;
            let fighter = member.traits.contains(MinionTraits::FIGHTER);
            (creature.level == me.level && filter(creature, fighter)).then_some(creature)
        })
        .min_by_key(|creature| (creature.position - me.position).length8())
}

impl Task {
    pub fn get_move(&self, ctx: &mut AiContext<'_>) -> Move {
        let Some(me) = ctx.creature() else {
            return Move::NONE;
        };
        if self.is_done(me.id, ctx.world) {
            return Move::NONE;
        }
        match self {
            Task::AttackLeader { villain } => {
                let Some(leader) = ctx
                    .world
                    .faction(*villain)
                    .and_then(|faction| faction.leader())
                    .and_then(|id| ctx.world.creature(id))
                else {
                    return Move::NONE;
                };
                if leader.level != me.level {
                    return Move::NONE;
                }
                engage(ctx, me, leader)
            }
            Task::StealFrom { villain } => {
                let Some(victim) =
                    nearest_villain(ctx.world, me, *villain, |c, _| !c.gold().is_empty())
                else {
                    return Move::NONE;
                };
                let offset = victim.position - me.position;
                if offset.is_unit() {
                    ctx.propose(
                        1.0,
                        CreatureAction::StealFrom {
                            direction: offset,
                            items: victim.gold(),
                        },
                    )
                } else {
                    ctx.propose(
                        1.0,
                        CreatureAction::MoveTowards {
                            target: victim.position,
                        },
                    )
                }
            }
            Task::ApplySquare { squares } => {
                if squares.contains(&me.position) {
                    return ctx.propose(1.0, CreatureAction::ApplySquare);
                }
                squares
                    .iter()
                    .map(|&target| ctx.propose(1.0, CreatureAction::MoveTowards { target }))
                    .find(Move::is_some)
                    .unwrap_or(Move::NONE)
            }
            Task::KillFighters { villain, .. } => {
                match nearest_villain(ctx.world, me, *villain, |_, fighter| fighter) {
                    Some(target) => engage(ctx, me, target),
                    None => Move::NONE,
                }
            }
            Task::StayInLocationUntil { location, .. } => ctx.propose(
                1.0,
                CreatureAction::StayIn {
                    location: *location,
                },
            ),
        }
    }

    pub fn is_done(&self, actor: EntityId, world: &dyn WorldView) -> bool {
        match self {
            Task::AttackLeader { villain } => world
                .faction(*villain)
                .and_then(|faction| faction.leader())
                .is_none_or(|leader| !world.is_alive(leader)),
            Task::StealFrom { villain } => world.faction(*villain).is_none_or(|faction| {
                faction.creatures().all(|id| {
                    world
                        .creature(id)
                        .is_none_or(|creature| creature.gold().is_empty())
                })
            }),
            Task::ApplySquare { squares } => {
                squares.is_empty() || world.creature(actor).is_none_or(|me| me.is_asleep())
            }
            Task::KillFighters { villain, remaining } => {
                *remaining == 0
                    || world
                        .faction(*villain)
                        .is_none_or(|faction| faction.fighters().is_empty())
            }
            Task::StayInLocationUntil { until, .. } => world.time() >= *until,
        }
    }

    /// Counts kills made by `owner` towards a `KillFighters` quota.
    pub fn on_event(&mut self, owner: EntityId, event: &GameEvent) {
        if let Task::KillFighters { villain, remaining } = self
            && let GameEvent::Kill { victim, killer, .. } = event
            && *killer == Some(owner)
            && victim.faction == Some(*villain)
        {
            *remaining = remaining.saturating_sub(1);
        }
    }
}
