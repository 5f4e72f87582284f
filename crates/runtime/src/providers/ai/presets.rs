//! Ready-made engine loadouts for creature archetypes.
//!
//! Every factory wraps a closure that builds a fresh [`MonsterAi`] for one
//! agent. Each loadout ends in a behaviour that always proposes something
//! (`Rest`, `Wait` or `MoveRandomly`), so arbitration never comes up empty.
//!
//! # Loadouts
//!
//! | factory | behaviours (weight) | pickups |
//! |---|---|---|
//! | `stay_in_location` | Heal 5, Thief 4, Fighter(0.6, chase) 3, AttackPest 1, GoldLust 1, [GuardArea 1], MoveRandomly or Wait 1 | yes |
//! | `collective` | Heal(no beds) 6, Fighter(0.6, chase) 5, ByCollective 2, ChooseRandom{Rest 3, MoveRandomly 1} 1, AttackPest 1 | no |
//! | `single_task` | Heal(no beds) 6, Fighter(0.6) 5, SingleTask 2, ChooseRandom{Rest 3, MoveRandomly 1} 1 | yes |
//! | `wildlife_non_predator` | Fighter(1.2) 5, MoveRandomly 1 | yes |
//! | `door_eater` | Fighter(1.2) 5, DoorEater 2, MoveRandomly 1 | yes |
//! | `scavenger_bird` | BirdFlyAway(3) 1, MoveRandomly 1, GuardSquare(1, 2) 2 | yes |
//! | `guard_square` | Wait 1, GuardSquare(0, 1) 2 | yes |
//! | `summoned` | Summoned(1, 3) 5, Heal 4, Fighter(0.6, chase) 3, MoveRandomly 1, GoldLust 1 | yes |
//! | `die_time` | DieTime 5, Heal 4, Fighter(0.6, chase) 3, MoveRandomly 1, GoldLust 1 | yes |
//! | `guard_target` | Fighter(0.6, chase) 3, GuardTarget(1, 3) 2, Rest 1 | yes |
//!
//! # Usage
//!
//! ```rust,ignore
//! let factory = MonsterAiFactory::collective(village);
//! let engine = factory.make(orc, &world, &config.ai);
//! ```

use std::fmt;

use game_content::AiPresetInfo;
use game_core::{AiConfig, EntityId, LocationId, Position, Tick, WorldView};

use super::behaviour::{
    Behaviour, ChooseRandom, GuardRange, GuardSquare, GuardTarget, Summoned,
};
use super::engine::MonsterAi;
use crate::village::{Task, VillageId};

type Maker = dyn Fn(EntityId, &dyn WorldView, &AiConfig) -> MonsterAi + Send + Sync;

/// Builds engines of one archetype.
pub struct MonsterAiFactory {
    name: &'static str,
    maker: Box<Maker>,
}

impl fmt::Debug for MonsterAiFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonsterAiFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn wander(config: &AiConfig) -> Behaviour {
    Behaviour::move_randomly(config.random_move_memory)
}

fn rest_or_wander(config: &AiConfig) -> Behaviour {
    Behaviour::ChooseRandom(ChooseRandom::new([
        (Behaviour::Rest, 3.0),
        (wander(config), 1.0),
    ]))
}

impl MonsterAiFactory {
    fn new(
        name: &'static str,
        maker: impl Fn(EntityId, &dyn WorldView, &AiConfig) -> MonsterAi + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            maker: Box::new(maker),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Builds a fresh engine for `actor`.
    pub fn make(&self, actor: EntityId, world: &dyn WorldView, config: &AiConfig) -> MonsterAi {
        (self.maker)(actor, world, config)
    }

    pub fn monster() -> Self {
        Self::stay_in_location(None, true)
    }

    pub fn stay_in_location(location: Option<LocationId>, move_randomly: bool) -> Self {
        Self::new("stay_in_location", move |actor, _, config| {
            let mut pairs = vec![
                (Behaviour::heal(true), 5),
                (Behaviour::thief(), 4),
                (Behaviour::fighter(0.6, true), 3),
                (Behaviour::AttackPest, 1),
                (Behaviour::GoldLust, 1),
            ];
            if let Some(location) = location {
                pairs.push((Behaviour::GuardArea { location }, 1));
            }
            if move_randomly {
                pairs.push((wander(config), 1));
            } else {
                pairs.push((Behaviour::Wait, 1));
            }
            MonsterAi::from_pairs(actor, pairs, true)
        })
    }

    pub fn collective(village: VillageId) -> Self {
        Self::new("collective", move |actor, _, config| {
            MonsterAi::from_pairs(
                actor,
                vec![
                    (Behaviour::heal(false), 6),
                    (Behaviour::fighter(0.6, true), 5),
                    (Behaviour::ByCollective { village }, 2),
                    (rest_or_wander(config), 1),
                    (Behaviour::AttackPest, 1),
                ],
                false,
            )
        })
    }

    pub fn single_task(task: Task) -> Self {
        Self::new("single_task", move |actor, _, config| {
            MonsterAi::from_pairs(
                actor,
                vec![
                    (Behaviour::heal(false), 6),
                    (Behaviour::fighter(0.6, false), 5),
                    (Behaviour::SingleTask(task.clone()), 2),
                    (rest_or_wander(config), 1),
                ],
                true,
            )
        })
    }

    pub fn wildlife_non_predator() -> Self {
        Self::new("wildlife_non_predator", |actor, _, config| {
            MonsterAi::from_pairs(
                actor,
                vec![(Behaviour::fighter(1.2, false), 5), (wander(config), 1)],
                true,
            )
        })
    }

    pub fn door_eater() -> Self {
        Self::new("door_eater", |actor, _, config| {
            MonsterAi::from_pairs(
                actor,
                vec![
                    (Behaviour::fighter(1.2, false), 5),
                    (Behaviour::DoorEater, 2),
                    (wander(config), 1),
                ],
                true,
            )
        })
    }

    pub fn move_randomly() -> Self {
        Self::new("move_randomly", |actor, _, config| {
            MonsterAi::from_pairs(actor, vec![(wander(config), 1)], true)
        })
    }

    pub fn idle() -> Self {
        Self::new("idle", |actor, _, _| {
            MonsterAi::from_pairs(actor, vec![(Behaviour::Rest, 1)], true)
        })
    }

    pub fn scavenger_bird(corpse: Position) -> Self {
        Self::new("scavenger_bird", move |actor, _, config| {
            MonsterAi::from_pairs(
                actor,
                vec![
                    (Behaviour::BirdFlyAway { max_distance: 3.0 }, 1),
                    (wander(config), 1),
                    (
                        Behaviour::GuardSquare(GuardSquare {
                            position: corpse,
                            range: GuardRange::new(1.0, 2.0),
                        }),
                        2,
                    ),
                ],
                true,
            )
        })
    }

    pub fn guard_square(position: Position) -> Self {
        Self::new("guard_square", move |actor, _, _| {
            MonsterAi::from_pairs(
                actor,
                vec![
                    (Behaviour::Wait, 1),
                    (
                        Behaviour::GuardSquare(GuardSquare {
                            position,
                            range: GuardRange::new(0.0, 1.0),
                        }),
                        2,
                    ),
                ],
                true,
            )
        })
    }

    /// Helper of `leader` that dies `ttl` ticks after being built.
    pub fn summoned(leader: EntityId, ttl: u64) -> Self {
        Self::new("summoned", move |actor, world, config| {
            let summoned = Summoned::new(leader, GuardRange::new(1.0, 3.0), ttl, world.time());
            MonsterAi::from_pairs(
                actor,
                vec![
                    (Behaviour::Summoned(summoned), 5),
                    (Behaviour::heal(true), 4),
                    (Behaviour::fighter(0.6, true), 3),
                    (wander(config), 1),
                    (Behaviour::GoldLust, 1),
                ],
                true,
            )
        })
    }

    pub fn die_time(at: Tick) -> Self {
        Self::new("die_time", move |actor, _, config| {
            MonsterAi::from_pairs(
                actor,
                vec![
                    (Behaviour::DieTime { at }, 5),
                    (Behaviour::heal(true), 4),
                    (Behaviour::fighter(0.6, true), 3),
                    (wander(config), 1),
                    (Behaviour::GoldLust, 1),
                ],
                true,
            )
        })
    }

    pub fn guard_target(target: EntityId) -> Self {
        Self::new("guard_target", move |actor, _, _| {
            MonsterAi::from_pairs(
                actor,
                vec![
                    (Behaviour::fighter(0.6, true), 3),
                    (
                        Behaviour::GuardTarget(GuardTarget {
                            target,
                            range: GuardRange::new(1.0, 3.0),
                        }),
                        2,
                    ),
                    (Behaviour::Rest, 1),
                ],
                true,
            )
        })
    }
}

impl From<&AiPresetInfo> for MonsterAiFactory {
    fn from(info: &AiPresetInfo) -> Self {
        match *info {
            AiPresetInfo::Monster => Self::monster(),
            AiPresetInfo::StayInLocation {
                location,
                move_randomly,
            } => Self::stay_in_location(Some(location), move_randomly),
            AiPresetInfo::Collective { village } => Self::collective(VillageId(village)),
            AiPresetInfo::WildlifeNonPredator => Self::wildlife_non_predator(),
            AiPresetInfo::DoorEater => Self::door_eater(),
            AiPresetInfo::MoveRandomly => Self::move_randomly(),
            AiPresetInfo::Idle => Self::idle(),
            AiPresetInfo::ScavengerBird { corpse } => Self::scavenger_bird(corpse),
            AiPresetInfo::GuardSquare { position } => Self::guard_square(position),
            AiPresetInfo::Summoned { leader, ttl } => Self::summoned(leader, ttl),
            AiPresetInfo::DieTime { at } => Self::die_time(at),
            AiPresetInfo::GuardTarget { target } => Self::guard_target(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{GameState, WorldConfig};

    #[test]
    fn collective_loadout_matches_weights() {
        let world = GameState::new(WorldConfig::default());
        let engine = MonsterAiFactory::collective(VillageId(1)).make(
            EntityId(3),
            &world,
            &AiConfig::default(),
        );
        let weights: Vec<u32> = engine.behaviours().iter().map(|b| b.weight).collect();
        let names: Vec<&str> = engine
            .behaviours()
            .iter()
            .map(|b| b.behaviour.name())
            .collect();
        assert_eq!(weights, vec![6, 5, 2, 1, 1]);
        assert_eq!(
            names,
            vec!["heal", "fighter", "by_collective", "choose_random", "attack_pest"]
        );
        assert!(!engine.picks_items());
    }

    #[test]
    fn stay_in_location_appends_guard_and_filler() {
        let world = GameState::new(WorldConfig::default());
        let config = AiConfig::default();
        let roaming = MonsterAiFactory::monster().make(EntityId(1), &world, &config);
        assert_eq!(roaming.behaviours().len(), 6);
        assert_eq!(
            roaming.behaviours().last().map(|b| b.behaviour.name()),
            Some("move_randomly")
        );

        let guarding = MonsterAiFactory::stay_in_location(Some(LocationId(2)), false)
            .make(EntityId(1), &world, &config);
        let names: Vec<&str> = guarding
            .behaviours()
            .iter()
            .map(|b| b.behaviour.name())
            .collect();
        assert_eq!(&names[5..], &["guard_area", "wait"]);
    }

    #[test]
    fn summoned_lifetime_starts_at_build_time() {
        let mut world = GameState::new(WorldConfig::default());
        world.set_time(Tick(40));
        let engine =
            MonsterAiFactory::summoned(EntityId(1), 25).make(EntityId(2), &world, &AiConfig::default());
        let Some(Behaviour::Summoned(summoned)) =
            engine.behaviours().first().map(|b| &b.behaviour)
        else {
            panic!("summoned loadout starts with the summoned behaviour");
        };
        assert_eq!(summoned.die_time(), Tick(65));
    }
}
