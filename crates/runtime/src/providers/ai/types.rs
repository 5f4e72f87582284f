//! Candidate moves and the memories behaviours keep between turns.

use serde::{Deserialize, Serialize};

use game_core::{CreatureAction, EntityId, GameEvent, LevelId, Position, Tick};

/// A behaviour's proposal for this turn.
///
/// `value` is the desirability; zero (or no plan) means "no move proposed".
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub value: f64,
    pub plan: Option<Plan>,
}

impl Move {
    pub const NONE: Move = Move {
        value: 0.0,
        plan: None,
    };

    pub fn new(value: f64, action: CreatureAction) -> Self {
        Self {
            value,
            plan: Some(Plan::new(action)),
        }
    }

    /// Whether a positive-value action is proposed.
    pub fn is_some(&self) -> bool {
        self.value > 0.0 && self.plan.is_some()
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Events to publish once the action is actually performed.
    pub fn with_events(mut self, events: impl IntoIterator<Item = GameEvent>) -> Self {
        if let Some(plan) = self.plan.as_mut() {
            plan.events.extend(events);
        }
        self
    }

    /// Memory update applied to the proposing behaviour if this move wins.
    pub fn with_memo(mut self, memo: Memo) -> Self {
        if let Some(plan) = self.plan.as_mut() {
            plan.memo = Some(memo);
        }
        self
    }

    pub fn action(&self) -> Option<&CreatureAction> {
        self.plan.as_ref().map(|plan| &plan.action)
    }
}

/// Deferred action with the side effects that accompany it.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub action: CreatureAction,
    pub events: Vec<GameEvent>,
    pub memo: Option<Memo>,
}

impl Plan {
    pub fn new(action: CreatureAction) -> Self {
        Self {
            action,
            events: Vec::new(),
            memo: None,
        }
    }
}

/// Memory written back into a behaviour after its move was performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Memo {
    /// Square the wanderer is about to step onto.
    Visited(Position),
    LastSeen(LastSeen),
    Robbed(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastSeenKind {
    /// Pursuing the enemy.
    Attack,
    /// Running from the enemy.
    Panic,
}

/// Where and when an enemy was last engaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastSeen {
    pub position: Position,
    pub time: Tick,
    pub level: LevelId,
    pub kind: LastSeenKind,
    pub creature: EntityId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_not_a_proposal() {
        assert!(!Move::NONE.is_some());
        assert!(!Move::new(0.0, CreatureAction::Wait).is_some());
        assert!(Move::new(0.1, CreatureAction::Wait).is_some());
    }

    #[test]
    fn events_and_memos_attach_to_the_plan() {
        let mv = Move::new(1.0, CreatureAction::Wait)
            .with_events([GameEvent::Combat {
                creature: EntityId(1),
                time: Tick(0),
            }])
            .with_memo(Memo::Robbed(EntityId(2)));
        let plan = mv.plan.expect("plan");
        assert_eq!(plan.events.len(), 1);
        assert_eq!(plan.memo, Some(Memo::Robbed(EntityId(2))));

        // Attaching to NONE is a no-op.
        assert_eq!(Move::NONE.with_memo(Memo::Robbed(EntityId(2))), Move::NONE);
    }
}
