use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use game_core::{
    AttrType, CreatureAction, CreatureState, EntityId, FactionId, GameEvent, LocationId, Position,
    Sunlight, Tick, VillageConfig, World, WorldView,
};

use super::{AttackTrigger, Task, TriggerScope, VillageId};
use crate::providers::ai::{AiContext, Move};

/// What an assaulting top-level village does to the villain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackAction {
    AttackLeader,
    Steal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlKind {
    /// Never attacks; sends villagers to bed at night.
    Peaceful { beds: Vec<Position> },
    /// Peaceful until its trigger commits a creature to the assault.
    TopLevel {
        beds: Vec<Position>,
        trigger: AttackTrigger,
        action: AttackAction,
    },
    /// Raids the villain whenever its population grows too large.
    Dragon { next_attack: Option<Tick> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VillageState {
    #[strum(serialize = "attacking!")]
    Attacking,
    #[strum(serialize = "conquered")]
    Conquered,
}

/// Summary shown to the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VillageInfo {
    pub name: String,
    pub tribe: String,
    pub state: Option<VillageState>,
}

/// Collective control of one village faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillageControl {
    id: VillageId,
    faction: FactionId,
    villain: FactionId,
    location: LocationId,
    /// Empty for anonymous villages, which are never reported conquered.
    name: String,
    conquered: bool,
    kind: ControlKind,
    tasks: BTreeMap<EntityId, Task>,
}

/// Sleep squares inside a location.
fn scan_beds(world: &dyn WorldView, location: LocationId) -> Vec<Position> {
    let Some(location) = world.location(location) else {
        return Vec::new();
    };
    location
        .bounds
        .positions()
        .filter(|&position| {
            world
                .square(location.level, position)
                .is_some_and(|square| square.is_bed())
        })
        .collect()
}

/// First free bed for a tired humanoid at night.
fn bed_task(ctx: &AiContext<'_>, me: &CreatureState, beds: &[Position]) -> Option<Task> {
    if ctx.world.sunlight() != Sunlight::Night || me.is_asleep() || !me.is_humanoid() {
        return None;
    }
    beds.iter()
        .copied()
        .find(|&bed| {
            ctx.world
                .square(me.level, bed)
                .is_some_and(|square| square.is_passable())
                && ctx
                    .world
                    .creature_at(me.level, bed)
                    .is_none_or(|occupant| occupant.id == me.id)
        })
        .map(|bed| Task::ApplySquare { squares: vec![bed] })
}

impl VillageControl {
    fn new(
        id: VillageId,
        faction: FactionId,
        villain: FactionId,
        location: LocationId,
        world: &dyn WorldView,
        kind: ControlKind,
    ) -> Self {
        let name = world
            .location(location)
            .and_then(|location| location.name.clone())
            .unwrap_or_default();
        Self {
            id,
            faction,
            villain,
            location,
            name,
            conquered: false,
            kind,
            tasks: BTreeMap::new(),
        }
    }

    pub fn peaceful(
        id: VillageId,
        faction: FactionId,
        villain: FactionId,
        location: LocationId,
        world: &dyn WorldView,
    ) -> Self {
        let beds = scan_beds(world, location);
        Self::new(id, faction, villain, location, world, ControlKind::Peaceful { beds })
    }

    pub fn top_level(
        id: VillageId,
        faction: FactionId,
        villain: FactionId,
        location: LocationId,
        world: &dyn WorldView,
        trigger: AttackTrigger,
        action: AttackAction,
    ) -> Self {
        let beds = scan_beds(world, location);
        Self::new(
            id,
            faction,
            villain,
            location,
            world,
            ControlKind::TopLevel {
                beds,
                trigger,
                action,
            },
        )
    }

    pub fn dragon(
        id: VillageId,
        faction: FactionId,
        villain: FactionId,
        location: LocationId,
        world: &dyn WorldView,
    ) -> Self {
        Self::new(
            id,
            faction,
            villain,
            location,
            world,
            ControlKind::Dragon { next_attack: None },
        )
    }

    pub fn id(&self) -> VillageId {
        self.id
    }

    pub fn faction(&self) -> FactionId {
        self.faction
    }

    pub fn villain(&self) -> FactionId {
        self.villain
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Whether the conquest has been announced.
    pub fn conquest_announced(&self) -> bool {
        self.conquered
    }

    pub fn task(&self, creature: EntityId) -> Option<&Task> {
        self.tasks.get(&creature)
    }

    pub fn tasks(&self) -> impl Iterator<Item = (EntityId, &Task)> {
        self.tasks.iter().map(|(id, task)| (*id, task))
    }

    pub fn scope<'a>(&self, world: &'a dyn WorldView, config: &'a VillageConfig) -> TriggerScope<'a> {
        TriggerScope {
            world,
            faction: self.faction,
            villain: self.villain,
            config,
        }
    }

    /// No fighters left alive.
    pub fn is_conquered(&self, world: &dyn WorldView) -> bool {
        world
            .faction(self.faction)
            .is_none_or(|faction| faction.fighters().iter().all(|&id| !world.is_alive(id)))
    }

    pub fn currently_attacking(&self, world: &dyn WorldView) -> bool {
        let ControlKind::TopLevel { trigger, .. } = &self.kind else {
            return false;
        };
        let now = world.time();
        world.faction(self.faction).is_some_and(|faction| {
            faction
                .creatures()
                .any(|id| world.is_alive(id) && trigger.started(id, now))
        })
    }

    fn tribe_name(&self, world: &dyn WorldView) -> String {
        world
            .faction(self.faction)
            .map(|faction| faction.name.clone())
            .unwrap_or_default()
    }

    pub fn attack_message(&self, world: &dyn WorldView) -> String {
        match &self.kind {
            ControlKind::Peaceful { .. } => String::new(),
            ControlKind::TopLevel { .. } if self.is_anonymous() => {
                format!("You are being attacked by {}!", self.tribe_name(world))
            }
            ControlKind::TopLevel { .. } => format!(
                "You are being attacked by {} of {}!",
                self.tribe_name(world),
                self.name
            ),
            ControlKind::Dragon { .. } => {
                let dragon = world
                    .faction(self.faction)
                    .and_then(|faction| faction.creatures().find_map(|id| world.creature(id)))
                    .map(|dragon| dragon.name.clone())
                    .unwrap_or_else(|| self.tribe_name(world));
                format!("You are under attack by {dragon}!")
            }
        }
    }

    pub fn info(&self, world: &dyn WorldView) -> VillageInfo {
        let state = if self.currently_attacking(world) {
            Some(VillageState::Attacking)
        } else if self.is_conquered(world) {
            Some(VillageState::Conquered)
        } else {
            None
        };
        VillageInfo {
            name: self.name.clone(),
            tribe: self.tribe_name(world),
            state,
        }
    }

    /// Move for a village creature: its current task, a fresh task, or the
    /// village default.
    pub fn get_move(&mut self, ctx: &mut AiContext<'_>) -> Move {
        let actor = ctx.actor;
        if self
            .tasks
            .get(&actor)
            .is_some_and(|task| task.is_done(actor, ctx.world))
        {
            self.tasks.remove(&actor);
        }
        if !self.tasks.contains_key(&actor)
            && let Some(task) = self.get_new_task(ctx)
        {
            debug!(village = %self.id, creature = %actor, task = ?task, "assigned task");
            self.tasks.insert(actor, task);
        }
        if let Some(task) = self.tasks.get(&actor) {
            let mv = task.get_move(ctx);
            if mv.is_some() {
                return mv;
            }
        }
        self.default_move(ctx)
    }

    /// Picks a task for the deciding creature, if the village has one for it.
    pub fn get_new_task(&mut self, ctx: &mut AiContext<'_>) -> Option<Task> {
        let me = ctx.creature()?;
        let now = ctx.time();
        match &mut self.kind {
            ControlKind::Peaceful { beds } => bed_task(ctx, me, beds),
            ControlKind::TopLevel {
                beds,
                trigger,
                action,
            } => {
                if trigger.started(me.id, now) {
                    ctx.publish(GameEvent::Assault {
                        creature: me.id,
                        faction: self.faction,
                        active: true,
                    });
                    debug!(village = %self.id, creature = %me.id, "assaulting");
                    let task = match action {
                        AttackAction::AttackLeader => Task::AttackLeader {
                            villain: self.villain,
                        },
                        AttackAction::Steal => Task::StealFrom {
                            villain: self.villain,
                        },
                    };
                    if task.get_move(ctx).is_some() {
                        return Some(task);
                    }
                }
                bed_task(ctx, me, beds)
            }
            ControlKind::Dragon { next_attack } => {
                let villain = ctx.world.faction(self.villain)?;
                if me.level != villain.level {
                    return None;
                }
                let config = &ctx.config.village;
                let population = villain.fighters().len();
                if population > config.dragon_population_limit
                    && next_attack.is_none_or(|at| now >= at)
                {
                    *next_attack = Some(now + config.dragon_wait_turns);
                    let low = config.dragon_min_victims.min(config.dragon_max_victims);
                    let high = config.dragon_min_victims.max(config.dragon_max_victims);
                    let remaining = ctx.rng.gen_range(low..=high);
                    ctx.publish(GameEvent::Assault {
                        creature: me.id,
                        faction: self.faction,
                        active: true,
                    });
                    info!(village = %self.id, creature = %me.id, remaining, "dragon raid");
                    Some(Task::KillFighters {
                        villain: self.villain,
                        remaining,
                    })
                } else {
                    ctx.publish(GameEvent::Assault {
                        creature: me.id,
                        faction: self.faction,
                        active: false,
                    });
                    Some(Task::StayInLocationUntil {
                        location: self.location,
                        until: next_attack.unwrap_or(now),
                    })
                }
            }
        }
    }

    fn default_move(&self, ctx: &AiContext<'_>) -> Move {
        let stay = || {
            ctx.propose(
                1.0,
                CreatureAction::StayIn {
                    location: self.location,
                },
            )
        };
        match &self.kind {
            ControlKind::Peaceful { .. } => stay(),
            ControlKind::TopLevel { trigger, .. } if !trigger.started(ctx.actor, ctx.time()) => {
                stay()
            }
            ControlKind::TopLevel { .. } | ControlKind::Dragon { .. } => Move::NONE,
        }
    }

    /// Village upkeep: forgets tasks of creatures that left the world, runs
    /// the attack trigger and trains lagging creatures.
    pub fn tick<W: World>(
        &mut self,
        world: &mut W,
        rng: &mut dyn RngCore,
        config: &VillageConfig,
        settled: &BTreeMap<VillageId, bool>,
    ) {
        self.tasks.retain(|&id, _| world.is_alive(id));
        let ControlKind::TopLevel { trigger, .. } = &mut self.kind else {
            return;
        };
        let trainees: Vec<EntityId> = {
            let view: &dyn WorldView = &*world;
            let scope = TriggerScope {
                world: view,
                faction: self.faction,
                villain: self.villain,
                config,
            };
            trigger.tick(&scope, rng, settled);

            let now = view.time().0;
            let period = config.exp_level_period.max(1);
            let target = config.exp_level_base
                + (now.saturating_sub(config.exp_level_offset) / period) as f64;
            view.faction(self.faction)
                .map(|faction| {
                    faction
                        .creatures()
                        .filter(|&id| view.creature(id).is_some_and(|c| c.exp_level < target))
                        .collect()
                })
                .unwrap_or_default()
        };
        let attrs: Vec<AttrType> = AttrType::iter().collect();
        for id in trainees {
            if let Some(&attr) = attrs.choose(rng) {
                world.exercise_attr(id, attr);
            }
        }
    }

    /// Reacts to a world event; announces conquest through `events`.
    pub fn on_event(
        &mut self,
        event: &GameEvent,
        world: &dyn WorldView,
        config: &VillageConfig,
        events: &mut Vec<GameEvent>,
    ) {
        for (owner, task) in &mut self.tasks {
            task.on_event(*owner, event);
        }
        let scope = TriggerScope {
            world,
            faction: self.faction,
            villain: self.villain,
            config,
        };
        if let ControlKind::TopLevel { trigger, .. } = &mut self.kind {
            trigger.on_event(event, &scope);
        }

        let GameEvent::Kill { victim, .. } = event else {
            return;
        };
        self.tasks.remove(&victim.id);
        if victim.faction == Some(self.faction)
            && !self.is_anonymous()
            && !self.conquered
            && scope.is_conquered()
        {
            self.conquered = true;
            info!(village = %self.id, name = %self.name, "village conquered");
            events.push(GameEvent::Conquer {
                faction: self.faction,
                name: self.name.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::village::PowerTrigger;
    use game_core::{
        CreatureFlags, Faction, GameConfig, GameState, LevelId, LevelMap, Location, MinionTraits,
        Rect, TribeId, VictimInfo, WorldConfig,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const VILLAGE: FactionId = FactionId(1);
    const VILLAIN: FactionId = FactionId(2);

    fn world() -> GameState {
        let mut world = GameState::new(WorldConfig::default());
        let map = LevelMap::parse(&[
            "..........",
            ".b........",
            "..........",
            "..........",
            "..........",
        ])
        .expect("valid map");
        world.add_level(LevelId(0), map);
        world.add_location(Location {
            id: LocationId(1),
            level: LevelId(0),
            bounds: Rect::around(Position::new(2, 2), 2),
            name: Some("Greenhollow".into()),
        });
        let mut village = Faction::new(VILLAGE, "elves", TribeId(2), LevelId(0));
        village.add_member(EntityId(1), MinionTraits::FIGHTER);
        world.add_faction(village);
        let mut keeper = Faction::new(VILLAIN, "keeper", TribeId(5), LevelId(0));
        keeper.add_member(EntityId(2), MinionTraits::LEADER);
        world.add_faction(keeper);
        world
            .add_creature(
                CreatureState::new(EntityId(1), "elf", LevelId(0), Position::new(3, 3))
                    .with_tribe(TribeId(2))
                    .with_faction(VILLAGE)
                    .with_flags(CreatureFlags::HUMANOID),
            )
            .expect("placed");
        world
            .add_creature(
                CreatureState::new(EntityId(2), "keeper", LevelId(0), Position::new(8, 3))
                    .with_tribe(TribeId(5))
                    .with_faction(VILLAIN),
            )
            .expect("placed");
        world
    }

    fn get_move(control: &mut VillageControl, world: &GameState) -> (Move, Vec<GameEvent>) {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut events = Vec::new();
        let mv = {
            let mut ctx = AiContext::new(EntityId(1), world, &mut rng, &config, &mut events);
            control.get_move(&mut ctx)
        };
        (mv, events)
    }

    #[test]
    fn peaceful_villagers_go_to_bed_at_night() {
        let mut world = world();
        let mut control =
            VillageControl::peaceful(VillageId(1), VILLAGE, VILLAIN, LocationId(1), &world);
        assert_eq!(
            control.kind(),
            &ControlKind::Peaceful {
                beds: vec![Position::new(1, 1)]
            }
        );

        let (mv, _) = get_move(&mut control, &world);
        assert_eq!(
            mv.action(),
            Some(&CreatureAction::StayIn {
                location: LocationId(1)
            })
        );

        world.set_sunlight(Some(Sunlight::Night));
        let (mv, _) = get_move(&mut control, &world);
        assert_eq!(
            control.task(EntityId(1)),
            Some(&Task::ApplySquare {
                squares: vec![Position::new(1, 1)]
            })
        );
        assert!(matches!(
            mv.action(),
            Some(CreatureAction::MoveTowards { .. })
        ));
    }

    #[test]
    fn committed_fighters_assault_the_leader() {
        let world = world();
        let mut trigger = crate::village::FinalTrigger::new(Vec::new());
        let settled = BTreeMap::new();
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let scope = TriggerScope {
            world: &world,
            faction: VILLAGE,
            villain: VILLAIN,
            config: &config.village,
        };
        // Schedule, then fire once the delay has passed.
        trigger.tick(&scope, &mut rng, &settled);
        let mut later = world.clone();
        later.set_time(Tick(500));
        let scope = TriggerScope {
            world: &later,
            ..scope
        };
        trigger.tick(&scope, &mut rng, &settled);

        let mut control = VillageControl::top_level(
            VillageId(1),
            VILLAGE,
            VILLAIN,
            LocationId(1),
            &later,
            AttackTrigger::Final(trigger),
            AttackAction::AttackLeader,
        );
        let (mv, events) = get_move(&mut control, &later);
        assert_eq!(
            control.task(EntityId(1)),
            Some(&Task::AttackLeader { villain: VILLAIN })
        );
        assert!(matches!(mv.action(), Some(CreatureAction::MoveTowards { .. })));
        assert!(events.contains(&GameEvent::Assault {
            creature: EntityId(1),
            faction: VILLAGE,
            active: true
        }));
        assert!(control.currently_attacking(&later));
        assert_eq!(control.info(&later).state, Some(VillageState::Attacking));
        assert_eq!(
            control.attack_message(&later),
            "You are being attacked by elves of Greenhollow!"
        );
    }

    #[test]
    fn idle_top_level_village_stays_home() {
        let world = world();
        let mut control = VillageControl::top_level(
            VillageId(1),
            VILLAGE,
            VILLAIN,
            LocationId(1),
            &world,
            AttackTrigger::Power(PowerTrigger::with_thresholds(vec![100.0], 1.0, 1.0)),
            AttackAction::Steal,
        );
        let (mv, events) = get_move(&mut control, &world);
        assert!(events.is_empty());
        assert_eq!(
            mv.action(),
            Some(&CreatureAction::StayIn {
                location: LocationId(1)
            })
        );
        assert_eq!(control.info(&world).state, None);
    }

    #[test]
    fn conquest_is_announced_once() {
        let mut world = world();
        let config = VillageConfig::default();
        let mut control =
            VillageControl::peaceful(VillageId(1), VILLAGE, VILLAIN, LocationId(1), &world);
        let kill = GameEvent::Kill {
            victim: VictimInfo {
                id: EntityId(1),
                name: "elf".into(),
                tribe: TribeId(2),
                faction: Some(VILLAGE),
                difficulty_points: 10.0,
                level: LevelId(0),
                position: Position::new(3, 3),
            },
            killer: Some(EntityId(2)),
            time: Tick(3),
        };
        if let Some(faction) = world.faction_mut(VILLAGE) {
            faction.remove_member(EntityId(1));
        }

        let mut events = Vec::new();
        control.on_event(&kill, &world, &config, &mut events);
        control.on_event(&kill, &world, &config, &mut events);
        assert_eq!(
            events,
            vec![GameEvent::Conquer {
                faction: VILLAGE,
                name: "Greenhollow".into()
            }]
        );
        assert!(control.conquest_announced());
        assert_eq!(control.info(&world).state, Some(VillageState::Conquered));
    }

    #[test]
    fn tasks_of_departed_creatures_are_dropped() {
        let mut world = world();
        world.set_sunlight(Some(Sunlight::Night));
        let mut control =
            VillageControl::peaceful(VillageId(1), VILLAGE, VILLAIN, LocationId(1), &world);
        get_move(&mut control, &world);
        assert!(control.task(EntityId(1)).is_some());

        if let Some(elf) = world.creature_mut(EntityId(1)) {
            elf.flags |= CreatureFlags::FLYER;
        }
        let events = world
            .perform(EntityId(1), &CreatureAction::FlyAway)
            .expect("flyer leaves");
        assert!(events.is_empty());

        let mut rng = StdRng::seed_from_u64(0);
        control.tick(&mut world, &mut rng, &VillageConfig::default(), &BTreeMap::new());
        assert_eq!(control.tasks().count(), 0);
    }

    #[test]
    fn dragon_waits_until_villain_grows() {
        let world = world();
        let mut control =
            VillageControl::dragon(VillageId(3), VILLAGE, VILLAIN, LocationId(1), &world);
        let (_, events) = get_move(&mut control, &world);
        assert_eq!(
            events,
            vec![GameEvent::Assault {
                creature: EntityId(1),
                faction: VILLAGE,
                active: false
            }]
        );
    }
}
