#![allow(dead_code)]

use game_core::{
    CreatureState, EntityId, GameConfig, GameState, LevelId, LevelMap, MapDimensions, Position,
    TribeId, WorldConfig,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use runtime::{AiContext, Decision, MonsterAi, Result};

pub const LEVEL: LevelId = LevelId(0);

/// An open level of the given size at tick zero.
pub fn arena(width: u32, height: u32) -> GameState {
    let mut world = GameState::new(WorldConfig::default());
    world.add_level(LEVEL, LevelMap::open(MapDimensions::new(width, height)));
    world
}

pub fn creature(id: u32, tribe: u16, x: i32, y: i32) -> CreatureState {
    CreatureState::new(EntityId(id), "creature", LEVEL, Position::new(x, y))
        .with_tribe(TribeId(tribe))
}

pub fn place(world: &mut GameState, creature: CreatureState) {
    world.add_creature(creature).expect("creature placed");
}

/// Runs one arbitration for `engine` without touching the world.
pub fn decide(engine: &mut MonsterAi, world: &GameState, seed: u64) -> Result<Decision> {
    let config = GameConfig::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut events = Vec::new();
    let mut ctx = AiContext::new(engine.actor(), world, &mut rng, &config, &mut events);
    engine.decide(&mut ctx)
}
