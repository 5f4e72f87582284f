//! Attack triggers: when a hostile village commits fighters to an assault.
//!
//! Triggers keep a set of committed ("fighting") creatures. A creature that
//! enters the set stays there until it dies; [`AttackTrigger::started`]
//! answers whether a given creature is part of the assault.
//!
//! - [`PowerTrigger`] compares the villain's estimated strength against
//!   thresholds drawn once from the village's own fighting power, committing
//!   the weakest fighters first.
//! - `FirstContact` holds an inner trigger back until one of the village's
//!   creatures has been in combat, plus a grace period.
//! - [`FinalTrigger`] commits everyone once every watched village is gone.

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use game_core::{
    CreatureState, EntityId, FactionId, GameEvent, Tick, TribeId, VillageConfig, WorldView,
};

use super::VillageId;

/// What a trigger can see of its village during one update.
pub struct TriggerScope<'a> {
    pub world: &'a dyn WorldView,
    pub faction: FactionId,
    pub villain: FactionId,
    pub config: &'a VillageConfig,
}

impl<'a> TriggerScope<'a> {
    /// Live fighters of the village, in roster order.
    pub fn fighters(&self) -> Vec<&'a CreatureState> {
        let Some(faction) = self.world.faction(self.faction) else {
            return Vec::new();
        };
        faction
            .fighters()
            .into_iter()
            .filter_map(|id| self.world.creature(id))
            .collect()
    }

    pub fn tribe(&self) -> Option<TribeId> {
        self.world.faction(self.faction).map(|faction| faction.tribe)
    }

    pub fn is_member(&self, id: EntityId) -> bool {
        self.world
            .faction(self.faction)
            .is_some_and(|faction| faction.contains(id))
    }

    pub fn is_villain(&self, id: EntityId) -> bool {
        self.world
            .faction(self.villain)
            .is_some_and(|faction| faction.contains(id))
    }

    pub fn villain_war_level(&self) -> f64 {
        self.world
            .faction(self.villain)
            .map_or(0.0, |faction| faction.war_level)
    }

    pub fn is_conquered(&self) -> bool {
        self.fighters().is_empty()
    }
}

/// Strength-based trigger with thresholds fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerTrigger {
    fighting: BTreeSet<EntityId>,
    killed_points: f64,
    killed_coeff: f64,
    power_coeff: f64,
    /// Last time the villain killed one of ours.
    last_attack: Tick,
    /// Last time this village committed fighters.
    last_my_attack: Tick,
    last_attack_launched: bool,
    /// Ascending.
    thresholds: Vec<f64>,
}

impl PowerTrigger {
    /// Draws `1..=power_trigger_count_max` thresholds from the village's fighting power.
    pub fn new(
        scope: &TriggerScope<'_>,
        killed_coeff: f64,
        power_coeff: f64,
        rng: &mut dyn RngCore,
    ) -> Self {
        let config = scope.config;
        let power: f64 = scope
            .fighters()
            .iter()
            .map(|fighter| fighter.difficulty_points)
            .sum();
        debug!(faction = scope.faction.0, power, "village power");

        let count = rng.gen_range(1..=config.power_trigger_count_max.max(1));
        let thresholds = (0..count)
            .map(|_| {
                let factor = if config.power_factor_max > config.power_factor_min {
                    rng.gen_range(config.power_factor_min..config.power_factor_max)
                } else {
                    config.power_factor_min
                };
                let threshold = power * factor;
                debug!(faction = scope.faction.0, threshold, "village trigger");
                threshold
            })
            .collect();
        Self::with_thresholds(thresholds, killed_coeff, power_coeff)
    }

    pub fn with_thresholds(mut thresholds: Vec<f64>, killed_coeff: f64, power_coeff: f64) -> Self {
        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        Self {
            fighting: BTreeSet::new(),
            killed_points: 0.0,
            killed_coeff,
            power_coeff,
            last_attack: Tick::ZERO,
            last_my_attack: Tick::ZERO,
            last_attack_launched: false,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn killed_points(&self) -> f64 {
        self.killed_points
    }

    /// Whether a wave reached the highest threshold.
    pub fn last_attack_launched(&self) -> bool {
        self.last_attack_launched
    }

    pub fn fighting(&self) -> &BTreeSet<EntityId> {
        &self.fighting
    }

    /// Estimated villain strength at `time`.
    pub fn enemy_points(&self, war_level: f64, time: Tick, config: &VillageConfig) -> f64 {
        let war_time = ((time.as_f64() - config.war_time_offset as f64) / 2.0).max(0.0);
        self.killed_coeff * self.killed_points + self.power_coeff * (war_level + war_time)
    }

    /// Highest threshold not above `enemy_points`, or zero.
    pub fn current_trigger(&self, enemy_points: f64) -> f64 {
        let mut current = 0.0;
        for &threshold in &self.thresholds {
            if threshold <= enemy_points {
                current = threshold;
            } else {
                break;
            }
        }
        current
    }

    pub fn tick(&mut self, scope: &TriggerScope<'_>) {
        let fighters = scope.fighters();
        if fighters.is_empty() {
            return;
        }
        let config = scope.config;
        let now = scope.world.time();
        if self.last_attack >= now.saturating_sub(config.attack_delay)
            || self.last_my_attack >= now.saturating_sub(config.my_attacks_delay)
        {
            return;
        }

        let mut committed: f64 = fighters
            .iter()
            .filter(|fighter| self.fighting.contains(&fighter.id))
            .map(|fighter| fighter.difficulty_points)
            .sum();
        let enemy_points = self.enemy_points(scope.villain_war_level(), now, config);
        let trigger = self.current_trigger(enemy_points);
        debug!(faction = scope.faction.0, enemy_points, trigger, committed, "power trigger");
        if committed >= trigger {
            return;
        }

        self.last_my_attack = now;
        let mut candidates = fighters;
        candidates.sort_by(|a, b| a.difficulty_points.total_cmp(&b.difficulty_points));
        let mut added = 0;
        for fighter in candidates {
            if !self.fighting.insert(fighter.id) {
                continue;
            }
            added += 1;
            committed += fighter.difficulty_points;
            if committed >= trigger {
                break;
            }
        }
        if added > 0 {
            info!(
                faction = scope.faction.0,
                fighters = added,
                trigger,
                "village commits fighters"
            );
            if let Some(&highest) = self.thresholds.last()
                && trigger >= highest - 0.001
            {
                self.last_attack_launched = true;
            }
        }
    }

    pub fn on_event(&mut self, event: &GameEvent, scope: &TriggerScope<'_>) {
        let GameEvent::Kill {
            victim,
            killer,
            time,
        } = event
        else {
            return;
        };
        if Some(victim.tribe) == scope.tribe() && killer.is_none_or(|killer| scope.is_villain(killer))
        {
            self.killed_points += victim.difficulty_points;
            self.last_attack = *time;
        }
        self.fighting.remove(&victim.id);
    }
}

/// Progress of the final wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalState {
    Dormant,
    Scheduled(Tick),
    Fired,
}

/// All-out attack once every watched village is conquered or anonymous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalTrigger {
    fighting: BTreeSet<EntityId>,
    watched: Vec<VillageId>,
    state: FinalState,
}

impl FinalTrigger {
    pub fn new(watched: Vec<VillageId>) -> Self {
        Self {
            fighting: BTreeSet::new(),
            watched,
            state: FinalState::Dormant,
        }
    }

    pub fn state(&self) -> FinalState {
        self.state
    }

    /// `settled` maps villages to whether they are conquered or anonymous;
    /// unknown villages count as settled.
    pub fn tick(
        &mut self,
        scope: &TriggerScope<'_>,
        rng: &mut dyn RngCore,
        settled: &BTreeMap<VillageId, bool>,
    ) {
        if self.state == FinalState::Fired {
            return;
        }
        let now = scope.world.time();
        let all_settled = self
            .watched
            .iter()
            .all(|id| settled.get(id).copied().unwrap_or(true));
        if all_settled && !scope.is_conquered() && self.state == FinalState::Dormant {
            let config = scope.config;
            let low = config.final_delay_min.min(config.final_delay_max);
            let high = config.final_delay_min.max(config.final_delay_max);
            let at = now + rng.gen_range(low..=high);
            info!(faction = scope.faction.0, at = %at, "final wave scheduled");
            self.state = FinalState::Scheduled(at);
        }
        if let FinalState::Scheduled(at) = self.state
            && at < now
        {
            self.state = FinalState::Fired;
            self.fighting
                .extend(scope.fighters().into_iter().map(|fighter| fighter.id));
            info!(
                faction = scope.faction.0,
                fighters = self.fighting.len(),
                "final wave"
            );
        }
    }

    pub fn on_event(&mut self, event: &GameEvent) {
        if let GameEvent::Kill { victim, .. } = event {
            self.fighting.remove(&victim.id);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackTrigger {
    Power(PowerTrigger),
    FirstContact {
        inner: Box<AttackTrigger>,
        /// Time after which the inner trigger runs; `None` until first combat.
        contact: Option<Tick>,
    },
    Final(FinalTrigger),
}

impl AttackTrigger {
    pub fn first_contact(inner: AttackTrigger) -> Self {
        AttackTrigger::FirstContact {
            inner: Box::new(inner),
            contact: None,
        }
    }

    pub fn tick(
        &mut self,
        scope: &TriggerScope<'_>,
        rng: &mut dyn RngCore,
        settled: &BTreeMap<VillageId, bool>,
    ) {
        match self {
            AttackTrigger::Power(power) => power.tick(scope),
            AttackTrigger::FirstContact { inner, contact } => {
                let now = scope.world.time();
                if contact.is_some_and(|at| at < now) {
                    inner.tick(scope, rng, settled);
                }
            }
            AttackTrigger::Final(last) => last.tick(scope, rng, settled),
        }
    }

    /// Whether `creature` is committed to the assault at `now`.
    pub fn started(&self, creature: EntityId, now: Tick) -> bool {
        match self {
            AttackTrigger::Power(power) => power.fighting.contains(&creature),
            AttackTrigger::FirstContact { inner, contact } => {
                contact.is_some_and(|at| at < now) && inner.started(creature, now)
            }
            AttackTrigger::Final(last) => last.fighting.contains(&creature),
        }
    }

    pub fn on_event(&mut self, event: &GameEvent, scope: &TriggerScope<'_>) {
        match self {
            AttackTrigger::Power(power) => power.on_event(event, scope),
            AttackTrigger::FirstContact { inner, contact } => {
                if let GameEvent::Combat { creature, time } = event
                    && scope.is_member(*creature)
                {
                    let at = *time + scope.config.contact_grace;
                    *contact = Some(contact.map_or(at, |current| current.min(at)));
                }
                inner.on_event(event, scope);
            }
            AttackTrigger::Final(last) => last.on_event(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{
        CreatureState, Faction, GameState, LevelId, LevelMap, MapDimensions, MinionTraits,
        Position, VictimInfo, WorldConfig,
    };
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const VILLAGE: FactionId = FactionId(1);
    const VILLAIN: FactionId = FactionId(2);

    fn village_world(difficulties: &[f64]) -> GameState {
        let mut world = GameState::new(WorldConfig::default());
        world.add_level(LevelId(0), LevelMap::open(MapDimensions::new(20, 20)));
        let mut faction = Faction::new(VILLAGE, "village", TribeId(2), LevelId(0));
        for (i, _) in difficulties.iter().enumerate() {
            faction.add_member(EntityId(i as u32 + 1), MinionTraits::FIGHTER);
        }
        world.add_faction(faction);
        world.add_faction(Faction::new(VILLAIN, "keeper", TribeId(5), LevelId(0)));
        for (i, &points) in difficulties.iter().enumerate() {
            world
                .add_creature(
                    CreatureState::new(
                        EntityId(i as u32 + 1),
                        "villager",
                        LevelId(0),
                        Position::new(i as i32 + 1, 1),
                    )
                    .with_tribe(TribeId(2))
                    .with_faction(VILLAGE)
                    .with_difficulty(points),
                )
                .expect("placed");
        }
        world
    }

    fn scope<'a>(world: &'a GameState, config: &'a VillageConfig) -> TriggerScope<'a> {
        TriggerScope {
            world,
            faction: VILLAGE,
            villain: VILLAIN,
            config,
        }
    }

    fn kill(victim: EntityId, tribe: TribeId, points: f64, time: Tick) -> GameEvent {
        GameEvent::Kill {
            victim: VictimInfo {
                id: victim,
                name: "villager".into(),
                tribe,
                faction: Some(VILLAGE),
                difficulty_points: points,
                level: LevelId(0),
                position: Position::ORIGIN,
            },
            killer: None,
            time,
        }
    }

    #[test]
    fn current_trigger_picks_highest_reached_threshold() {
        let trigger = PowerTrigger::with_thresholds(vec![40.0, 25.0], 1.0, 1.0);
        assert_eq!(trigger.thresholds(), &[25.0, 40.0]);
        assert_eq!(trigger.current_trigger(24.9), 0.0);
        assert_eq!(trigger.current_trigger(25.0), 25.0);
        assert_eq!(trigger.current_trigger(39.0), 25.0);
        assert_eq!(trigger.current_trigger(400.0), 40.0);
    }

    #[test]
    fn thresholds_scale_with_village_power() {
        let world = village_world(&[10.0, 20.0, 30.0]);
        let config = VillageConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let trigger = PowerTrigger::new(&scope(&world, &config), 1.0, 1.0, &mut rng);
        assert!((1..=3).contains(&trigger.thresholds().len()));
        for &threshold in trigger.thresholds() {
            assert!((24.0..72.0).contains(&threshold), "{threshold}");
        }
    }

    #[test]
    fn kills_by_villain_raise_enemy_points() {
        let world = village_world(&[10.0]);
        let config = VillageConfig::default();
        let mut trigger = PowerTrigger::with_thresholds(vec![5.0], 2.0, 0.0);
        trigger.on_event(&kill(EntityId(9), TribeId(2), 7.0, Tick(50)), &scope(&world, &config));
        trigger.on_event(&kill(EntityId(8), TribeId(3), 7.0, Tick(60)), &scope(&world, &config));
        assert_eq!(trigger.killed_points(), 7.0);
        assert_eq!(trigger.last_attack, Tick(50));
        assert_eq!(trigger.enemy_points(0.0, Tick(50), &config), 14.0);
    }

    #[test]
    fn quiet_period_blocks_commitment() {
        let mut world = village_world(&[10.0, 20.0]);
        let config = VillageConfig::default();
        let mut trigger = PowerTrigger::with_thresholds(vec![1.0], 0.0, 1.0);
        trigger.killed_points = 0.0;

        world.set_time(Tick(900));
        trigger.tick(&scope(&world, &config));
        assert!(trigger.fighting().is_empty());

        world.set_time(Tick(2100));
        trigger.tick(&scope(&world, &config));
        assert_eq!(trigger.fighting().len(), 1);
        assert!(trigger.last_attack_launched());
    }

    #[test]
    fn first_contact_waits_for_grace_period() {
        let mut world = village_world(&[10.0]);
        let config = VillageConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let settled = BTreeMap::new();
        let mut final_wave = FinalTrigger::new(Vec::new());
        final_wave.state = FinalState::Fired;
        final_wave.fighting.insert(EntityId(1));
        let mut trigger = AttackTrigger::first_contact(AttackTrigger::Final(final_wave));

        world.set_time(Tick(10));
        assert!(!trigger.started(EntityId(1), Tick(10)));
        trigger.on_event(
            &GameEvent::Combat {
                creature: EntityId(1),
                time: Tick(10),
            },
            &scope(&world, &config),
        );
        trigger.tick(&scope(&world, &config), &mut rng, &settled);
        assert!(!trigger.started(EntityId(1), Tick(60)));
        assert!(trigger.started(EntityId(1), Tick(61)));
    }

    #[test]
    fn final_wave_fires_after_delay() {
        let mut world = village_world(&[10.0, 20.0]);
        let config = VillageConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut settled = BTreeMap::new();
        settled.insert(VillageId(7), false);
        let mut trigger = FinalTrigger::new(vec![VillageId(7)]);

        trigger.tick(&scope(&world, &config), &mut rng, &settled);
        assert_eq!(trigger.state(), FinalState::Dormant);

        settled.insert(VillageId(7), true);
        trigger.tick(&scope(&world, &config), &mut rng, &settled);
        let FinalState::Scheduled(at) = trigger.state() else {
            panic!("final wave should be scheduled");
        };
        assert!((Tick(80)..=Tick(200)).contains(&at));

        world.set_time(at);
        trigger.tick(&scope(&world, &config), &mut rng, &settled);
        assert_eq!(trigger.state(), FinalState::Scheduled(at));

        world.set_time(at + 1);
        trigger.tick(&scope(&world, &config), &mut rng, &settled);
        assert_eq!(trigger.state(), FinalState::Fired);
        assert_eq!(trigger.fighting.len(), 2);
    }

    proptest! {
        #[test]
        fn current_trigger_is_monotonic(
            thresholds in prop::collection::vec(0.0f64..500.0, 1..4),
            killed in 0.0f64..200.0,
            extra_killed in 0.0f64..200.0,
            time in 0u64..5000,
            later in 0u64..5000,
        ) {
            let config = VillageConfig::default();
            let mut trigger = PowerTrigger::with_thresholds(thresholds, 1.5, 0.5);
            trigger.killed_points = killed;
            let base = trigger.current_trigger(trigger.enemy_points(3.0, Tick(time), &config));
            let after_time =
                trigger.current_trigger(trigger.enemy_points(3.0, Tick(time + later), &config));
            trigger.killed_points = killed + extra_killed;
            let after_kills = trigger.current_trigger(trigger.enemy_points(3.0, Tick(time), &config));
            prop_assert!(after_time >= base);
            prop_assert!(after_kills >= base);
        }
    }
}
