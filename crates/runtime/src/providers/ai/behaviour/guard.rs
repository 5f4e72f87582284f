use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use game_core::{CreatureAction, EntityId, GameEvent, LevelId, Position, Tick};

use crate::providers::ai::{AiContext, Move};

/// Distance band a guard keeps to what it guards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardRange {
    pub min: f64,
    pub max: f64,
}

impl GuardRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `((distance - min) / (max - min))^1.5`, or `None` within `min`.
    pub fn weight(&self, distance: f64) -> Option<f64> {
        if distance <= self.min {
            return None;
        }
        Some(((distance - self.min) / (self.max - self.min)).powf(1.5))
    }

    /// Move towards `target`, more urgent the further away it is.
    pub(super) fn move_towards(&self, ctx: &AiContext<'_>, target: Position) -> Move {
        let Some(me) = ctx.creature() else {
            return Move::NONE;
        };
        match self.weight((me.position - target).length_d()) {
            Some(weight) => ctx.propose(weight, CreatureAction::MoveTowards { target }),
            None => Move::NONE,
        }
    }
}

/// Follows a creature around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardTarget {
    pub target: EntityId,
    pub range: GuardRange,
}

impl GuardTarget {
    pub fn get_move(&self, ctx: &mut AiContext<'_>) -> Move {
        let (Some(me), Some(target)) = (ctx.creature(), ctx.world.creature(self.target)) else {
            return Move::NONE;
        };
        if me.level != target.level {
            return Move::NONE;
        }
        self.range.move_towards(ctx, target.position)
    }
}

/// Stays close to a fixed square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardSquare {
    pub position: Position,
    pub range: GuardRange,
}

impl GuardSquare {
    pub fn get_move(&self, ctx: &mut AiContext<'_>) -> Move {
        self.range.move_towards(ctx, self.position)
    }
}

/// Temporary helper following its summoner, even across levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summoned {
    target: EntityId,
    range: GuardRange,
    die_time: Tick,
    /// Stairs the summoner took, by the level it left.
    level_changes: BTreeMap<LevelId, Position>,
}

impl Summoned {
    pub fn new(target: EntityId, range: GuardRange, ttl: u64, now: Tick) -> Self {
        Self {
            target,
            range,
            die_time: now + ttl,
            level_changes: BTreeMap::new(),
        }
    }

    pub fn die_time(&self) -> Tick {
        self.die_time
    }

    pub fn get_move(&self, ctx: &mut AiContext<'_>) -> Move {
        let Some(me) = ctx.creature() else {
            return Move::NONE;
        };
        let target = ctx.world.creature(self.target);
        let Some(target) = target.filter(|_| ctx.time() <= self.die_time) else {
            return ctx.propose(1.0, CreatureAction::Die);
        };
        if target.level == me.level {
            let mv = self.range.move_towards(ctx, target.position);
            return if mv.is_some() { mv.with_value(0.5) } else { mv };
        }
        let Some(&stairs) = self.level_changes.get(&me.level) else {
            return Move::NONE;
        };
        let on_stairs = stairs == me.position
            && ctx
                .world
                .square(me.level, me.position)
                .is_some_and(|square| square.apply_type.is_some());
        if on_stairs {
            ctx.propose(0.5, CreatureAction::ApplySquare)
        } else {
            self.range.move_towards(ctx, stairs)
        }
    }

    pub fn on_event(&mut self, event: &GameEvent) {
        if let GameEvent::ChangeLevel {
            creature,
            from,
            from_position,
            ..
        } = event
            && *creature == self.target
        {
            self.level_changes.insert(*from, *from_position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ai::behaviour::mock::{
        LEVEL, creature, open_world, place, poll, with_map,
    };
    use game_core::{CreatureState, GameState, LevelMap, MapDimensions};

    const ME: EntityId = EntityId(1);
    const SUMMONER: EntityId = EntityId(9);
    const UPSTAIRS: LevelId = LevelId(1);

    fn summoned(now: u64) -> Summoned {
        Summoned::new(SUMMONER, GuardRange::new(1.0, 3.0), 50, Tick(now))
    }

    /// Stairs at (5, 1) lead to (1, 1) on the level above, where the summoner waits.
    fn two_floors(me_at: Position) -> GameState {
        let mut ground = LevelMap::open(MapDimensions::new(8, 4));
        ground.link_stairs(Position::new(5, 1), UPSTAIRS, Position::new(1, 1));
        let mut world = with_map(ground);
        world.add_level(UPSTAIRS, LevelMap::open(MapDimensions::new(6, 6)));
        place(&mut world, creature(1, 1, me_at.x, me_at.y));
        place(
            &mut world,
            CreatureState::new(SUMMONER, "mage", UPSTAIRS, Position::new(3, 3)),
        );
        world
    }

    #[test]
    fn weight_grows_with_distance() {
        let range = GuardRange::new(1.0, 3.0);
        assert_eq!(range.weight(1.0), None);
        let near = range.weight(2.0).expect("outside min");
        let far = range.weight(3.0).expect("outside min");
        assert!((near - 0.5f64.powf(1.5)).abs() < 1e-9);
        assert!((far - 1.0).abs() < 1e-9);
        assert!(near < far);
    }

    #[test]
    fn summoned_remembers_summoners_stairs() {
        let mut summoned = Summoned::new(EntityId(1), GuardRange::new(1.0, 3.0), 50, Tick(10));
        assert_eq!(summoned.die_time(), Tick(60));
        summoned.on_event(&GameEvent::ChangeLevel {
            creature: EntityId(2),
            from: LevelId(0),
            from_position: Position::new(3, 3),
            to: LevelId(1),
            to_position: Position::new(1, 1),
        });
        assert!(summoned.level_changes.is_empty());
        summoned.on_event(&GameEvent::ChangeLevel {
            creature: EntityId(1),
            from: LevelId(0),
            from_position: Position::new(4, 4),
            to: LevelId(1),
            to_position: Position::new(1, 1),
        });
        assert_eq!(
            summoned.level_changes.get(&LevelId(0)),
            Some(&Position::new(4, 4))
        );
    }

    #[test]
    fn dies_with_its_summoner() {
        let mut world = open_world(6, 6);
        place(&mut world, creature(1, 1, 2, 2));
        let (mv, _) = poll(&world, ME, |ctx| summoned(0).get_move(ctx));
        assert_eq!(mv.action(), Some(&CreatureAction::Die));
        assert_eq!(mv.value, 1.0);
    }

    #[test]
    fn dies_when_its_time_is_up() {
        let mut world = open_world(6, 6);
        place(&mut world, creature(1, 1, 2, 2));
        place(&mut world, creature(9, 1, 5, 2));
        let summoned = summoned(0);

        world.set_time(Tick(50));
        let (mv, _) = poll(&world, ME, |ctx| summoned.get_move(ctx));
        assert_eq!(
            mv.action(),
            Some(&CreatureAction::MoveTowards {
                target: Position::new(5, 2)
            })
        );
        assert_eq!(mv.value, 0.5);

        world.set_time(Tick(51));
        let (mv, _) = poll(&world, ME, |ctx| summoned.get_move(ctx));
        assert_eq!(mv.action(), Some(&CreatureAction::Die));
    }

    #[test]
    fn follows_its_summoner_up_the_stairs() {
        let mut summoned = summoned(0);
        let world = two_floors(Position::new(2, 1));
        let (mv, _) = poll(&world, ME, |ctx| summoned.get_move(ctx));
        assert_eq!(mv, Move::NONE);

        summoned.on_event(&GameEvent::ChangeLevel {
            creature: SUMMONER,
            from: LEVEL,
            from_position: Position::new(5, 1),
            to: UPSTAIRS,
            to_position: Position::new(1, 1),
        });
        let (mv, _) = poll(&world, ME, |ctx| summoned.get_move(ctx));
        assert_eq!(
            mv.action(),
            Some(&CreatureAction::MoveTowards {
                target: Position::new(5, 1)
            })
        );

        let world = two_floors(Position::new(5, 1));
        let (mv, _) = poll(&world, ME, |ctx| summoned.get_move(ctx));
        assert_eq!(mv.action(), Some(&CreatureAction::ApplySquare));
        assert_eq!(mv.value, 0.5);
    }

    #[test]
    fn endless_summons_do_not_overflow() {
        let summoned = Summoned::new(SUMMONER, GuardRange::new(1.0, 3.0), u64::MAX, Tick(10));
        assert_eq!(summoned.die_time(), Tick(u64::MAX));
    }
}
