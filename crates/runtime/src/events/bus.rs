//! Topic-based event bus implementation.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use game_core::GameEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Topic {
    /// Creatures engaging each other
    Combat,
    /// Deaths
    Kill,
    /// Items flying across the map
    Throw,
    /// Creatures taking stairs
    ChangeLevel,
    /// Terrain destroyed or replaced
    Terrain,
    /// Surrender, assault and conquest notifications
    Village,
}

impl Topic {
    pub fn of(event: &GameEvent) -> Self {
        match event {
            GameEvent::Combat { .. } | GameEvent::Wounded { .. } => Topic::Combat,
            GameEvent::Kill { .. } => Topic::Kill,
            GameEvent::Throw { .. } => Topic::Throw,
            GameEvent::ChangeLevel { .. } => Topic::ChangeLevel,
            GameEvent::SquareReplaced { .. } => Topic::Terrain,
            GameEvent::Surrender { .. } | GameEvent::Conquer { .. } | GameEvent::Assault { .. } => {
                Topic::Village
            }
        }
    }
}

/// Synchronous event queue owned by the simulation.
///
/// Behaviours and village controls never dispatch directly: they publish here
/// and the simulation drains the queue after each agent's turn, delivering
/// every event to all subscribers in publication order. Delivered events are
/// kept in a bounded history for reporting.
#[derive(Debug, Clone)]
pub struct EventBus {
    pending: VecDeque<GameEvent>,
    history: VecDeque<GameEvent>,
    capacity: usize,
    published: BTreeMap<Topic, u64>,
}

impl EventBus {
    /// Creates a new event bus with default history capacity
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus keeping at most `capacity` delivered events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            history: VecDeque::with_capacity(capacity),
            capacity,
            published: BTreeMap::new(),
        }
    }

    /// Queue an event for the next dispatch round
    pub fn publish(&mut self, event: GameEvent) {
        let topic = Topic::of(&event);
        tracing::trace!(?topic, kind = event.kind(), "event published");
        *self.published.entry(topic).or_default() += 1;
        self.pending.push_back(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Takes every queued event, moving it into the delivered history.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        let events: Vec<GameEvent> = self.pending.drain(..).collect();
        for event in &events {
            if self.capacity == 0 {
                break;
            }
            if self.history.len() == self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(event.clone());
        }
        events
    }

    /// Delivered events of one topic, oldest first.
    pub fn recent(&self, topic: Topic) -> impl Iterator<Item = &GameEvent> + '_ {
        self.history
            .iter()
            .filter(move |event| Topic::of(event) == topic)
    }

    /// Number of events ever published on `topic`.
    pub fn published(&self, topic: Topic) -> u64 {
        self.published.get(&topic).copied().unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
