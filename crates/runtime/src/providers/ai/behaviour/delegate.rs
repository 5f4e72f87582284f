use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use game_core::{EntityId, GameEvent, World};
use rand::RngCore;

use super::Behaviour;
use crate::providers::ai::{AiContext, Memo, Move};
use crate::village::VillageId;

/// Defers to the village control that owns the creature.
pub(super) fn by_collective(ctx: &mut AiContext<'_>, village: VillageId) -> Move {
    let Some(villages) = ctx.villages.take() else {
        return Move::NONE;
    };
    let mv = villages.get_move(village, ctx);
    ctx.villages = Some(villages);
    mv
}

/// Picks one of several behaviours at random every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChooseRandom {
    options: Vec<Behaviour>,
    weights: Vec<f64>,
    /// Option whose move was proposed last, so its memo can be routed back.
    last_choice: Option<usize>,
}

impl ChooseRandom {
    pub fn new(options: impl IntoIterator<Item = (Behaviour, f64)>) -> Self {
        let (options, weights) = options.into_iter().unzip();
        Self {
            options,
            weights,
            last_choice: None,
        }
    }

    pub fn get_move(&mut self, ctx: &mut AiContext<'_>) -> Move {
        let Ok(distribution) = WeightedIndex::new(&self.weights) else {
            return Move::NONE;
        };
        let choice = distribution.sample(&mut *ctx.rng);
        self.last_choice = Some(choice);
        match self.options.get_mut(choice) {
            Some(option) => option.get_move(ctx),
            None => Move::NONE,
        }
    }

    pub(super) fn on_event(
        &mut self,
        owner: EntityId,
        event: &GameEvent,
        world: &mut dyn World,
        rng: &mut dyn RngCore,
    ) {
        for option in &mut self.options {
            option.on_event(owner, event, world, rng);
        }
    }

    pub(super) fn apply_memo(&mut self, memo: Memo) {
        if let Some(option) = self.last_choice.and_then(|i| self.options.get_mut(i)) {
            option.apply_memo(memo);
        }
    }
}
