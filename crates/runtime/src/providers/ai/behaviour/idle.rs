use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use game_core::{CreatureAction, Position};

use crate::providers::ai::{AiContext, Memo, Move};

const WANDER_VALUE: f64 = 0.0001;

/// Wanders around, preferring squares it has not stood on recently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRandomly {
    memory: VecDeque<Position>,
    capacity: usize,
}

impl MoveRandomly {
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn visited(&self, position: Position) -> bool {
        self.memory.contains(&position)
    }

    /// Records a square, forgetting the oldest once over capacity.
    pub fn remember(&mut self, position: Position) {
        self.memory.push_back(position);
        if self.memory.len() > self.capacity {
            self.memory.pop_front();
        }
    }

    pub fn get_move(&mut self, ctx: &mut AiContext<'_>) -> Move {
        let Some(me) = ctx.creature() else {
            return Move::NONE;
        };
        let position = me.position;
        if !self.visited(position) {
            self.remember(position);
        }
        if ctx.rng.gen_range(0..2) == 0 {
            return Move::new(WANDER_VALUE, CreatureAction::Wait);
        }

        let directions = ctx.shuffled_directions();
        let step = |direction: &&Position| {
            ctx.can(&CreatureAction::Move {
                direction: **direction,
            })
        };
        let chosen = directions
            .iter()
            .filter(|direction| !self.visited(position + **direction))
            .find(step)
            .or_else(|| directions.iter().find(step));

        match chosen {
            Some(&direction) => Move::new(WANDER_VALUE, CreatureAction::Move { direction })
                .with_memo(Memo::Visited(position + direction)),
            None => Move::new(WANDER_VALUE, CreatureAction::Wait),
        }
    }

    pub(crate) fn apply_memo(&mut self, memo: Memo) {
        if let Memo::Visited(position) = memo {
            self.remember(position);
        }
    }
}
