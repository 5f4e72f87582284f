//! Small worlds and a one-shot decision helper for behaviour tests.

use rand::SeedableRng;
use rand::rngs::StdRng;

use game_core::{
    CreatureState, EntityId, GameConfig, GameEvent, GameState, LevelId, LevelMap, MapDimensions,
    Position, TribeId, WorldConfig,
};

use crate::providers::ai::{AiContext, Move};

pub const LEVEL: LevelId = LevelId(0);

pub fn open_world(width: u32, height: u32) -> GameState {
    with_map(LevelMap::open(MapDimensions::new(width, height)))
}

pub fn with_map(map: LevelMap) -> GameState {
    let mut world = GameState::new(WorldConfig::default());
    world.add_level(LEVEL, map);
    world
}

pub fn creature(id: u32, tribe: u16, x: i32, y: i32) -> CreatureState {
    CreatureState::new(EntityId(id), "creature", LEVEL, Position::new(x, y))
        .with_tribe(TribeId(tribe))
}

pub fn place(world: &mut GameState, creature: CreatureState) {
    world.add_creature(creature).expect("creature placed");
}

/// Asks `decide` for `actor`'s move under the default tunables.
pub fn poll<F>(world: &GameState, actor: EntityId, decide: F) -> (Move, Vec<GameEvent>)
where
    F: FnOnce(&mut AiContext<'_>) -> Move,
{
    poll_with(world, actor, &GameConfig::default(), decide)
}

pub fn poll_with<F>(
    world: &GameState,
    actor: EntityId,
    config: &GameConfig,
    decide: F,
) -> (Move, Vec<GameEvent>)
where
    F: FnOnce(&mut AiContext<'_>) -> Move,
{
    let mut rng = StdRng::seed_from_u64(7);
    let mut events = Vec::new();
    let mv = {
        let mut ctx = AiContext::new(actor, world, &mut rng, config, &mut events);
        decide(&mut ctx)
    };
    (mv, events)
}
