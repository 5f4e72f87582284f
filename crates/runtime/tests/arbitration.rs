mod common;

use common::{LEVEL, arena, creature, decide, place};
use game_core::{
    CreatureAction, CreatureFlags, EntityId, FactionId, GameState, ItemClass, ItemId, ItemState,
    Location, LocationId, Position, Rect, Tick, WorldView,
};
use proptest::prelude::*;
use runtime::providers::ai::Candidate;
use runtime::{
    AiError, Behaviour, MonsterAi, MonsterAiFactory, Move, Task, VillageId, select,
};

const ME: EntityId = EntityId(1);
const ALLY: EntityId = EntityId(3);

fn duel(my_health: f64, my_damage: i32, enemy_damage: i32) -> GameState {
    let mut world = arena(12, 12);
    place(
        &mut world,
        creature(1, 1, 2, 5)
            .with_health(my_health)
            .with_damage(my_damage),
    );
    place(&mut world, creature(2, 2, 7, 5).with_damage(enemy_damage));
    world
}

fn source_name(engine: &MonsterAi, source: usize) -> &'static str {
    engine.behaviours()[source].behaviour.name()
}

#[test]
fn wounded_outmatched_fighter_flees() {
    let world = duel(0.2, 3, 10);
    let mut engine = MonsterAiFactory::monster().make(ME, &world, &Default::default());

    let decision = decide(&mut engine, &world, 1).expect("a move");
    assert_eq!(
        decision.plan.action,
        CreatureAction::MoveAway {
            from: Position::new(7, 5),
            path_find: true,
        }
    );
    assert_eq!(source_name(&engine, decision.source), "fighter");
    assert_eq!(decision.value, 3.0);
}

#[test]
fn healthy_strong_fighter_chases() {
    let world = duel(1.0, 10, 3);
    let mut engine = MonsterAiFactory::monster().make(ME, &world, &Default::default());

    let decision = decide(&mut engine, &world, 1).expect("a move");
    assert_eq!(
        decision.plan.action,
        CreatureAction::MoveTowards {
            target: Position::new(7, 5),
        }
    );
    assert!((decision.value - 1.5).abs() < 1e-9);
}

fn skirmish(ally_at: Position) -> GameState {
    let dagger = ItemState::new(ItemId(1), "dagger", ItemClass::Weapon)
        .with_damage(2)
        .with_thrown_damage(6);
    let mut world = arena(12, 12);
    place(
        &mut world,
        creature(1, 1, 2, 5)
            .with_damage(10)
            .with_item(dagger),
    );
    place(&mut world, creature(2, 2, 6, 5).with_damage(3));
    place(&mut world, creature(3, 1, ally_at.x, ally_at.y));
    world
}

#[test]
fn ally_on_the_line_blocks_throwing() {
    let world = skirmish(Position::new(4, 5));
    let mut engine = MonsterAiFactory::monster().make(ME, &world, &Default::default());

    let decision = decide(&mut engine, &world, 3).expect("a move");
    assert!(
        !matches!(decision.plan.action, CreatureAction::Throw { .. }),
        "threw through an ally"
    );
    assert_eq!(
        decision.plan.action,
        CreatureAction::MoveTowards {
            target: Position::new(6, 5),
        }
    );
    assert!(!world.is_enemy(ME, ALLY));
}

#[test]
fn clear_line_allows_throwing() {
    let world = skirmish(Position::new(4, 8));
    let mut engine = MonsterAiFactory::monster().make(ME, &world, &Default::default());

    let decision = decide(&mut engine, &world, 3).expect("a move");
    assert_eq!(
        decision.plan.action,
        CreatureAction::Throw {
            item: ItemId(1),
            direction: Position::new(1, 0),
        }
    );
}

#[test]
fn humanoid_draws_a_weapon_before_fighting() {
    let sword = ItemState::new(ItemId(4), "sword", ItemClass::Weapon).with_damage(8);
    let mut world = arena(12, 12);
    place(
        &mut world,
        creature(1, 1, 2, 5)
            .with_flags(CreatureFlags::HUMANOID)
            .with_damage(10)
            .with_item(sword),
    );
    place(&mut world, creature(2, 2, 6, 5).with_damage(3));
    let mut engine = MonsterAiFactory::monster().make(ME, &world, &Default::default());

    let decision = decide(&mut engine, &world, 0).expect("a move");
    assert_eq!(decision.plan.action, CreatureAction::Equip { item: ItemId(4) });
}

#[test]
fn scan_stops_before_a_hidden_larger_candidate() {
    let world = {
        let mut world = arena(5, 5);
        place(&mut world, creature(1, 1, 2, 2));
        world
    };
    // Rest scores 2.0, which beats the next raw weight of 1, so Wait at 5.0 is never reached.
    let mut engine = MonsterAi::new(
        ME,
        vec![Behaviour::Rest, Behaviour::Rest, Behaviour::Wait],
        vec![20, 1, 5],
        false,
    )
    .expect("valid engine");
    let decision = decide(&mut engine, &world, 0).expect("a move");
    assert_eq!(decision.source, 0);
    assert_eq!(decision.value, 2.0);

    let mut engine = MonsterAi::new(
        ME,
        vec![Behaviour::Wait, Behaviour::Rest, Behaviour::Rest],
        vec![5, 20, 1],
        false,
    )
    .expect("valid engine");
    let decision = decide(&mut engine, &world, 0).expect("a move");
    assert_eq!(decision.source, 0);
    assert_eq!(decision.value, 5.0);
}

#[test]
fn engine_without_fallback_reports_exhaustion() {
    let mut world = arena(5, 5);
    place(&mut world, creature(1, 1, 2, 2));
    let mut engine = MonsterAi::new(ME, vec![Behaviour::GoldLust], vec![3], false)
        .expect("valid engine");

    let err = decide(&mut engine, &world, 0).expect_err("nothing to do");
    assert!(matches!(
        err,
        AiError::ArbitrationExhausted { actor, time } if actor == ME && time == Tick(0)
    ));
}

fn presets() -> Vec<MonsterAiFactory> {
    vec![
        MonsterAiFactory::monster(),
        MonsterAiFactory::stay_in_location(Some(LocationId(1)), false),
        MonsterAiFactory::stay_in_location(None, true),
        MonsterAiFactory::collective(VillageId(1)),
        MonsterAiFactory::single_task(Task::AttackLeader {
            villain: FactionId(9),
        }),
        MonsterAiFactory::wildlife_non_predator(),
        MonsterAiFactory::door_eater(),
        MonsterAiFactory::move_randomly(),
        MonsterAiFactory::idle(),
        MonsterAiFactory::scavenger_bird(Position::new(4, 4)),
        MonsterAiFactory::guard_square(Position::new(4, 4)),
        MonsterAiFactory::summoned(EntityId(99), 50),
        MonsterAiFactory::die_time(Tick(500)),
        MonsterAiFactory::guard_target(EntityId(99)),
    ]
}

fn candidate(raw: f64, weight: u32, source: usize) -> Candidate {
    Candidate {
        mv: Move::new(raw * f64::from(weight), CreatureAction::Wait),
        weight,
        source,
    }
}

proptest! {
    #[test]
    fn every_preset_finds_a_legal_move_when_alone(
        seed in any::<u64>(),
        x in 1i32..8,
        y in 1i32..8,
    ) {
        let mut world = arena(9, 9);
        world.add_location(Location {
            id: LocationId(1),
            level: LEVEL,
            bounds: Rect::around(Position::new(4, 4), 2),
            name: None,
        });
        place(&mut world, creature(1, 1, x, y));
        for factory in presets() {
            let mut engine = factory.make(ME, &world, &Default::default());
            let decision = decide(&mut engine, &world, seed);
            prop_assert!(decision.is_ok(), "{} found no move", factory.name());
            let decision = decision.unwrap();
            prop_assert!(decision.value > 0.0);
            prop_assert!(
                world.can_perform(ME, &decision.plan.action),
                "{} chose {:?}",
                factory.name(),
                decision.plan.action
            );
        }
    }

    #[test]
    fn raising_the_winners_weight_keeps_it_winning(
        entries in prop::collection::vec((0.01f64..1.0, 1u32..10), 1..6),
        bump in 1u32..10,
    ) {
        let candidates = |boost: Option<usize>| -> Vec<Candidate> {
            entries
                .iter()
                .enumerate()
                .map(|(source, &(raw, weight))| {
                    let weight = if boost == Some(source) { weight + bump } else { weight };
                    candidate(raw, weight, source)
                })
                .collect()
        };
        let winner = select(candidates(None)).expect("positive candidates");
        let boosted = select(candidates(Some(winner.source))).expect("positive candidates");
        prop_assert_eq!(boosted.source, winner.source);
        prop_assert!(boosted.value >= winner.value);
    }
}
