//! Small single-purpose behaviours of animals and monsters.

use rand::Rng;

use game_core::{CreatureAction, Position, Rect, Tick};

use crate::providers::ai::{AiContext, Move};

/// Attacks an adjacent pest.
pub(super) fn attack_pest(ctx: &mut AiContext<'_>) -> Move {
    let Some(me) = ctx.creature() else {
        return Move::NONE;
    };
    if me.tribe.is_pest() {
        return Move::NONE;
    }
    let pest = ctx
        .shuffled_directions()
        .into_iter()
        .find(|direction| ctx.neighbour(*direction).is_some_and(|c| c.tribe.is_pest()));
    match pest {
        Some(direction) => ctx.propose(1.0, CreatureAction::Attack { direction }),
        None => Move::NONE,
    }
}

/// Leaves the map at random or when an enemy comes closer than `max_distance`.
pub(super) fn bird_fly_away(ctx: &mut AiContext<'_>, max_distance: f64) -> Move {
    let Some(me) = ctx.creature() else {
        return Move::NONE;
    };
    let chance = ctx.config.ai.fly_away_chance.max(1);
    let roll = ctx.rng.gen_range(0..chance) == 0;
    let threatened = ctx
        .closest_enemy()
        .is_some_and(|enemy| (enemy.position - me.position).length_d() < max_distance);
    if roll || threatened {
        ctx.propose(1.0, CreatureAction::FlyAway)
    } else {
        Move::NONE
    }
}

/// Eats the nearest door: destroys it when adjacent, walks to it otherwise.
pub(super) fn door_eater(ctx: &mut AiContext<'_>) -> Move {
    let Some(me) = ctx.creature() else {
        return Move::NONE;
    };
    let radius = ctx.config.ai.door_search_radius;
    let mut closest: Option<Position> = None;
    for offset in Rect::around(Position::ORIGIN, radius).positions() {
        let is_door = ctx
            .world
            .square(me.level, me.position + offset)
            .is_some_and(|square| square.lockable && square.destructible);
        if is_door && closest.is_none_or(|c| offset.length8() < c.length8()) {
            closest = Some(offset);
        }
    }
    let Some(offset) = closest else {
        return Move::NONE;
    };
    let destroy = ctx.propose(1.0, CreatureAction::Destroy { direction: offset });
    if destroy.is_some() {
        return destroy;
    }
    ctx.propose(
        1.0,
        CreatureAction::MoveTowards {
            target: me.position + offset,
        },
    )
}

/// Dies once `at` has passed.
pub(super) fn die_time(ctx: &mut AiContext<'_>, at: Tick) -> Move {
    if ctx.time() > at {
        ctx.propose(1.0, CreatureAction::Die)
    } else {
        Move::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ai::behaviour::mock::{
        creature, open_world, place, poll, poll_with, with_map,
    };
    use game_core::{CreatureFlags, EntityId, GameConfig, LevelMap};

    const ME: EntityId = EntityId(1);

    #[test]
    fn vermin_next_to_us_is_attacked() {
        let mut world = open_world(6, 6);
        place(&mut world, creature(1, 1, 2, 2));
        place(&mut world, creature(2, 0, 3, 3));

        let (mv, _) = poll(&world, ME, attack_pest);
        assert_eq!(
            mv.action(),
            Some(&CreatureAction::Attack {
                direction: Position::new(1, 1)
            })
        );
        let (mv, _) = poll(&world, EntityId(2), attack_pest);
        assert_eq!(mv, Move::NONE);
    }

    #[test]
    fn bird_leaves_when_an_enemy_comes_close() {
        let mut config = GameConfig::default();
        config.ai.fly_away_chance = u32::MAX;
        let bird = |world: &mut game_core::GameState| {
            place(world, creature(1, 6, 2, 2).with_flags(CreatureFlags::FLYER));
        };

        let mut world = open_world(12, 6);
        bird(&mut world);
        place(&mut world, creature(2, 1, 4, 2));
        let (mv, _) = poll_with(&world, ME, &config, |ctx| bird_fly_away(ctx, 3.0));
        assert_eq!(mv.action(), Some(&CreatureAction::FlyAway));

        let mut world = open_world(12, 6);
        bird(&mut world);
        place(&mut world, creature(2, 1, 9, 2));
        let (mv, _) = poll_with(&world, ME, &config, |ctx| bird_fly_away(ctx, 3.0));
        assert_eq!(mv, Move::NONE);
    }

    #[test]
    fn door_eater_bites_adjacent_doors_and_walks_to_far_ones() {
        let mut world = with_map(LevelMap::parse(&["......", "..+...", "......"]).expect("map"));
        place(&mut world, creature(1, 1, 1, 1));
        let (mv, _) = poll(&world, ME, door_eater);
        assert_eq!(
            mv.action(),
            Some(&CreatureAction::Destroy {
                direction: Position::new(1, 0)
            })
        );

        let mut world = with_map(LevelMap::parse(&["......", "....+.", "......"]).expect("map"));
        place(&mut world, creature(1, 1, 1, 1));
        let (mv, _) = poll(&world, ME, door_eater);
        assert_eq!(
            mv.action(),
            Some(&CreatureAction::MoveTowards {
                target: Position::new(4, 1)
            })
        );
    }

    #[test]
    fn dies_only_after_its_time() {
        let mut world = open_world(4, 4);
        place(&mut world, creature(1, 1, 1, 1));
        world.set_time(Tick(5));
        let (mv, _) = poll(&world, ME, |ctx| die_time(ctx, Tick(5)));
        assert_eq!(mv, Move::NONE);

        world.set_time(Tick(6));
        let (mv, _) = poll(&world, ME, |ctx| die_time(ctx, Tick(5)));
        assert_eq!(mv.action(), Some(&CreatureAction::Die));
    }
}
