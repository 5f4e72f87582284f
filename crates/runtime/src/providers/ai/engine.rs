//! Weighted poll-and-select arbitration over an agent's behaviours.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use game_core::{
    CreatureAction, EntityId, GameConfig, GameEvent, World, WorldView, stack_items,
};

use super::{AiContext, Behaviour, Move, Plan};
use crate::api::{AiError, Result};
use crate::village::VillageRegistry;

/// One behaviour with its integer weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedBehaviour {
    pub behaviour: Behaviour,
    pub weight: u32,
}

/// A scored candidate, remembering which behaviour produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub mv: Move,
    /// Raw weight of the producing behaviour, used by the short-circuit rule.
    pub weight: u32,
    pub source: usize,
}

/// The arbitration winner.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub value: f64,
    pub plan: Plan,
    pub source: usize,
}

/// What happened on an agent's turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub action: CreatureAction,
    /// Creature this turn's attack, shot or throw wounded, if any.
    pub attacked: Option<EntityId>,
}

/// Per-agent behaviour engine.
///
/// Owns its behaviours exclusively; each activation polls all of them in
/// declaration order, scales their desirability by weight, adds one pickup
/// candidate per item stack underfoot, and performs the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterAi {
    actor: EntityId,
    behaviours: Vec<WeightedBehaviour>,
    pick_items: bool,
}

impl MonsterAi {
    pub fn new(
        actor: EntityId,
        behaviours: Vec<Behaviour>,
        weights: Vec<u32>,
        pick_items: bool,
    ) -> Result<Self> {
        if behaviours.len() != weights.len() {
            return Err(AiError::WeightCountMismatch {
                behaviours: behaviours.len(),
                weights: weights.len(),
            });
        }
        if behaviours.is_empty() {
            return Err(AiError::NoBehaviours(actor));
        }
        let behaviours = behaviours
            .into_iter()
            .zip(weights)
            .map(|(behaviour, weight)| WeightedBehaviour { behaviour, weight })
            .collect();
        Ok(Self {
            actor,
            behaviours,
            pick_items,
        })
    }

    /// Builds an engine from pairs that cannot disagree in length.
    pub(crate) fn from_pairs(
        actor: EntityId,
        pairs: Vec<(Behaviour, u32)>,
        pick_items: bool,
    ) -> Self {
        Self {
            actor,
            behaviours: pairs
                .into_iter()
                .map(|(behaviour, weight)| WeightedBehaviour { behaviour, weight })
                .collect(),
            pick_items,
        }
    }

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn behaviours(&self) -> &[WeightedBehaviour] {
        &self.behaviours
    }

    pub fn picks_items(&self) -> bool {
        self.pick_items
    }

    /// Polls every behaviour, producing candidates in evaluation order.
    pub fn candidates(&mut self, ctx: &mut AiContext<'_>) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for (source, entry) in self.behaviours.iter_mut().enumerate() {
            let weight = entry.weight;
            let mut mv = entry.behaviour.get_move(ctx);
            mv.value *= f64::from(weight);
            candidates.push(Candidate { mv, weight, source });

            if !self.pick_items {
                continue;
            }
            let Some(me) = ctx.creature() else {
                continue;
            };
            let floor = ctx.world.items_at(me.level, me.position);
            for stack in stack_items(floor).into_values() {
                let Some(item) = stack.first() else {
                    continue;
                };
                if item.shopkeeper.is_some() {
                    continue;
                }
                let action = CreatureAction::PickUp {
                    items: stack.iter().map(|item| item.id).collect(),
                };
                if !ctx.can(&action) {
                    continue;
                }
                let value = entry.behaviour.item_value(item, ctx) * f64::from(weight);
                candidates.push(Candidate {
                    mv: Move::new(value, action),
                    weight,
                    source,
                });
            }
        }
        candidates
    }

    /// Runs arbitration without touching the world.
    pub fn decide(&mut self, ctx: &mut AiContext<'_>) -> Result<Decision> {
        let candidates = self.candidates(ctx);
        select(candidates).ok_or(AiError::ArbitrationExhausted {
            actor: self.actor,
            time: ctx.time(),
        })
    }

    /// Decides and performs this agent's turn.
    ///
    /// Events raised while deciding and those produced by the performed action
    /// are published to `events`. On success the winning behaviour receives
    /// the memory attached to its move.
    pub fn make_move<W: World>(
        &mut self,
        world: &mut W,
        rng: &mut dyn RngCore,
        config: &GameConfig,
        villages: Option<&mut VillageRegistry>,
        events: &mut Vec<GameEvent>,
    ) -> Result<Turn> {
        let mut raised = Vec::new();
        let decision = {
            let view: &dyn WorldView = &*world;
            let mut ctx = AiContext::new(self.actor, view, rng, config, &mut raised);
            if let Some(villages) = villages {
                ctx = ctx.with_villages(villages);
            }
            self.decide(&mut ctx)
        };
        events.append(&mut raised);
        let decision = decision?;

        tracing::debug!(
            actor = %self.actor,
            behaviour = self
                .behaviours
                .get(decision.source)
                .map_or("unknown", |entry| entry.behaviour.name()),
            action = decision.plan.action.name(),
            value = decision.value,
            "arbitration winner"
        );

        let Plan {
            action,
            events: plan_events,
            memo,
        } = decision.plan;
        events.extend(plan_events);
        let outcome = world.perform(self.actor, &action)?;
        let attacked = outcome.iter().find_map(|event| match event {
            GameEvent::Wounded {
                victim,
                attacker: Some(attacker),
            } if *attacker == self.actor => Some(*victim),
            _ => None,
        });
        events.extend(outcome);
        if let Some(memo) = memo
            && let Some(entry) = self.behaviours.get_mut(decision.source)
        {
            entry.behaviour.apply_memo(memo);
        }
        Ok(Turn { action, attacked })
    }

    pub fn on_attacked(&mut self, attacker: EntityId, world: &dyn WorldView) {
        for entry in &mut self.behaviours {
            entry.behaviour.on_attacked(self.actor, attacker, world);
        }
    }

    pub fn on_event<W: World>(&mut self, event: &GameEvent, world: &mut W, rng: &mut dyn RngCore) {
        for entry in &mut self.behaviours {
            entry.behaviour.on_event(self.actor, event, world, rng);
        }
    }
}

/// Picks the winning candidate.
///
/// Candidates are scanned in generation order, keeping the first strictly
/// largest value. Scanning stops early once a candidate's scaled value
/// exceeds the next candidate's raw weight, so a later, larger candidate can
/// be missed when weights are not sorted.
pub fn select(candidates: Vec<Candidate>) -> Option<Decision> {
    let mut winner: Option<(f64, usize)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let value = candidate.mv.value;
        if value > winner.map_or(0.0, |(best, _)| best) {
            winner = Some((value, index));
        }
        if let Some(next) = candidates.get(index + 1)
            && value > f64::from(next.weight)
        {
            break;
        }
    }
    let (value, index) = winner?;
    let candidate = candidates.into_iter().nth(index)?;
    let plan = candidate.mv.plan?;
    Some(Decision {
        value,
        plan,
        source: candidate.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(value: f64, weight: u32, source: usize) -> Candidate {
        Candidate {
            mv: Move::new(value, CreatureAction::Wait),
            weight,
            source,
        }
    }

    #[test]
    fn highest_value_wins() {
        let decision = select(vec![
            candidate(0.5, 5, 0),
            candidate(3.0, 4, 1),
            candidate(1.0, 1, 2),
        ])
        .expect("winner");
        assert_eq!(decision.source, 1);
        assert_eq!(decision.value, 3.0);
    }

    #[test]
    fn ties_keep_the_earlier_candidate() {
        let decision = select(vec![candidate(2.0, 5, 0), candidate(2.0, 5, 1)]).expect("winner");
        assert_eq!(decision.source, 0);
    }

    #[test]
    fn scan_stops_once_value_exceeds_next_weight() {
        // 2.0 > raw weight 1 of the next candidate, so 9.0 is never inspected.
        let decision = select(vec![candidate(2.0, 2, 0), candidate(9.0, 1, 1)]).expect("winner");
        assert_eq!(decision.source, 0);
    }

    #[test]
    fn all_zero_is_exhaustion() {
        assert!(select(vec![candidate(0.0, 1, 0), candidate(0.0, 2, 1)]).is_none());
        assert!(select(Vec::new()).is_none());
    }

    #[test]
    fn mismatched_weights_are_rejected() {
        let err = MonsterAi::new(EntityId(1), vec![Behaviour::Rest], vec![1, 2], true)
            .expect_err("mismatch");
        assert!(matches!(
            err,
            AiError::WeightCountMismatch {
                behaviours: 1,
                weights: 2
            }
        ));
        let err = MonsterAi::new(EntityId(1), Vec::new(), Vec::new(), true).expect_err("empty");
        assert!(matches!(err, AiError::NoBehaviours(EntityId(1))));
    }
}
