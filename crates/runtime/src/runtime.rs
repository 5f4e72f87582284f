//! High-level simulation driver.
//!
//! The [`Simulation`] owns the world, one engine per agent, the village
//! controls, the event bus and the seeded random source. Each tick it runs
//! every agent in id order, advances the villages and dispatches events
//! until the bus is empty.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error};

use game_content::VillageControlInfo;
use game_core::{EntityId, GameConfig, GameState, Tick, World, WorldView};

use crate::api::{AiError, Result};
use crate::events::EventBus;
use crate::providers::ai::{AiContext, MonsterAi, MonsterAiFactory, Turn};
use crate::snapshot::AiSnapshot;
use crate::village::{Task, VillageId, VillageInfo, VillageRegistry};

/// Simulation configuration shared by the driver and the AI.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub game_config: GameConfig,
    /// Seed of the random source handed to behaviours and triggers.
    pub seed: u64,
    /// Number of dispatched events kept for inspection.
    pub event_history: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            seed: 0,
            event_history: 100,
        }
    }
}

/// Single-threaded driver of the monster AI.
pub struct Simulation {
    world: GameState,
    engines: BTreeMap<EntityId, MonsterAi>,
    villages: VillageRegistry,
    bus: EventBus,
    rng: StdRng,
    config: GameConfig,
}

impl Simulation {
    /// Create a new simulation builder
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    pub fn world(&self) -> &GameState {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GameState {
        &mut self.world
    }

    pub fn time(&self) -> Tick {
        self.world.time()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn engine(&self, agent: EntityId) -> Option<&MonsterAi> {
        self.engines.get(&agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.engines.keys().copied()
    }

    pub fn villages(&self) -> &VillageRegistry {
        &self.villages
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Registers (or replaces) the engine driving `agent`.
    pub fn add_agent(&mut self, engine: MonsterAi) -> Option<MonsterAi> {
        self.engines.insert(engine.actor(), engine)
    }

    pub fn village_infos(&self) -> Vec<VillageInfo> {
        self.villages.infos(&self.world)
    }

    /// Runs one activation of `agent`.
    ///
    /// Returns `Ok(None)` when the agent is dead or its engine found nothing
    /// to do; the latter is logged as an error and the turn is skipped.
    pub fn run_one_tick(&mut self, agent: EntityId) -> Result<Option<Turn>> {
        if !self.world.is_alive(agent) {
            self.engines.remove(&agent);
            return Ok(None);
        }
        let engine = self
            .engines
            .get_mut(&agent)
            .ok_or(AiError::UnknownAgent(agent))?;

        let mut raised = Vec::new();
        let result = engine.make_move(
            &mut self.world,
            &mut self.rng,
            &self.config,
            Some(&mut self.villages),
            &mut raised,
        );
        self.bus.extend(raised);

        let turn = match result {
            Ok(turn) => turn,
            Err(err @ AiError::ArbitrationExhausted { .. }) => {
                error!(agent = %agent, error = %err, "agent skipped its turn");
                self.dispatch();
                return Ok(None);
            }
            Err(err) => {
                self.dispatch();
                return Err(err);
            }
        };

        if let Some(victim) = turn.attacked
            && self.world.is_alive(victim)
            && let Some(engine) = self.engines.get_mut(&victim)
        {
            engine.on_attacked(agent, &self.world);
        }
        self.dispatch();
        Ok(Some(turn))
    }

    /// Asks village `village` for a new task for `creature`.
    pub fn get_new_task(&mut self, creature: EntityId, village: VillageId) -> Result<Option<Task>> {
        let mut raised = Vec::new();
        let task = {
            let mut ctx = AiContext::new(
                creature,
                &self.world,
                &mut self.rng,
                &self.config,
                &mut raised,
            );
            self.villages.get_new_task(village, &mut ctx)
        };
        self.bus.extend(raised);
        self.dispatch();
        task
    }

    /// One full tick: every agent in id order, then village upkeep.
    pub fn step(&mut self) -> Result<()> {
        let agents: Vec<EntityId> = self.engines.keys().copied().collect();
        for agent in agents {
            self.run_one_tick(agent)?;
        }
        self.villages
            .advance(&mut self.world, &mut self.rng, &self.config.village);
        self.dispatch();
        self.world.advance_time(1);
        Ok(())
    }

    pub fn advance(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.step()?;
        }
        debug!(time = %self.world.time(), agents = self.engines.len(), "simulation advanced");
        Ok(())
    }

    pub fn snapshot(&self) -> AiSnapshot {
        AiSnapshot {
            time: self.world.time(),
            engines: self.engines.clone(),
            villages: self.villages.clone(),
        }
    }

    /// Replaces all AI state; the world is left untouched.
    pub fn restore(&mut self, snapshot: AiSnapshot) {
        self.engines = snapshot.engines;
        self.villages = snapshot.villages;
    }

    /// Delivers queued events to engines and villages until none are left.
    fn dispatch(&mut self) {
        while self.bus.has_pending() {
            for event in self.bus.drain() {
                for engine in self.engines.values_mut() {
                    engine.on_event(&event, &mut self.world, &mut self.rng);
                }
                let mut follow_up = Vec::new();
                self.villages
                    .on_event(&event, &self.world, &self.config.village, &mut follow_up);
                self.bus.extend(follow_up);
            }
        }
        self.engines.retain(|id, _| self.world.is_alive(*id));
    }
}

/// Builder for [`Simulation`].
pub struct SimulationBuilder {
    config: SimulationConfig,
    world: Option<GameState>,
    agents: Vec<(EntityId, MonsterAiFactory)>,
    engines: Vec<MonsterAi>,
    villages: Vec<VillageControlInfo>,
}

impl SimulationBuilder {
    fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            world: None,
            agents: Vec::new(),
            engines: Vec::new(),
            villages: Vec::new(),
        }
    }

    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn game_config(mut self, game_config: GameConfig) -> Self {
        self.config.game_config = game_config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Provide initial world (defaults to an empty one)
    pub fn world(mut self, world: GameState) -> Self {
        self.world = Some(world);
        self
    }

    /// Drive `agent` with an engine built from `factory`.
    pub fn agent(mut self, agent: EntityId, factory: MonsterAiFactory) -> Self {
        self.agents.push((agent, factory));
        self
    }

    /// Drive an agent with a ready-made engine.
    pub fn engine(mut self, engine: MonsterAi) -> Self {
        self.engines.push(engine);
        self
    }

    pub fn villages(mut self, villages: impl IntoIterator<Item = VillageControlInfo>) -> Self {
        self.villages.extend(villages);
        self
    }

    /// Builds villages first (their triggers draw from the random source),
    /// then every agent's engine.
    pub fn build(self) -> Result<Simulation> {
        let SimulationConfig {
            game_config,
            seed,
            event_history,
        } = self.config;
        let world = self
            .world
            .unwrap_or_else(|| GameState::new(game_config.world.clone()));
        let mut rng = StdRng::seed_from_u64(seed);
        let villages =
            VillageRegistry::from_infos(&self.villages, &world, &mut rng, &game_config.village);

        let mut engines = BTreeMap::new();
        for (agent, factory) in self.agents {
            if !world.is_alive(agent) {
                return Err(AiError::UnknownAgent(agent));
            }
            engines.insert(agent, factory.make(agent, &world, &game_config.ai));
        }
        for engine in self.engines {
            if !world.is_alive(engine.actor()) {
                return Err(AiError::UnknownAgent(engine.actor()));
            }
            engines.insert(engine.actor(), engine);
        }

        Ok(Simulation {
            world,
            engines,
            villages,
            bus: EventBus::with_capacity(event_history),
            rng,
            config: game_config,
        })
    }
}
