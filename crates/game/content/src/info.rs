use game_core::{EntityId, LocationId, Position, Tick};

/// Engine archetype assigned to a creature.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AiPresetInfo {
    Monster,
    StayInLocation {
        location: LocationId,
        #[cfg_attr(feature = "serde", serde(default))]
        move_randomly: bool,
    },
    /// Member of the village with this id.
    Collective {
        village: u32,
    },
    WildlifeNonPredator,
    DoorEater,
    MoveRandomly,
    Idle,
    ScavengerBird {
        corpse: Position,
    },
    GuardSquare {
        position: Position,
    },
    Summoned {
        leader: EntityId,
        ttl: u64,
    },
    DieTime {
        at: Tick,
    },
    GuardTarget {
        target: EntityId,
    },
}

/// When a top-level village decides to attack.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerInfo {
    Power {
        killed_coeff: f64,
        power_coeff: f64,
    },
    /// Holds off until the villain is first met, then defers to the inner trigger.
    FirstContact(Box<TriggerInfo>),
    /// Final wave once every watched village is conquered.
    Final {
        watched: Vec<u32>,
    },
}

/// What attackers do once committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackActionInfo {
    #[default]
    AttackLeader,
    Steal,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VillageKindInfo {
    Peaceful,
    TopLevel {
        trigger: TriggerInfo,
        #[cfg_attr(feature = "serde", serde(default))]
        action: AttackActionInfo,
    },
    Dragon,
}

/// Declaration of one village control.
///
/// The village is named after its location; an unnamed location makes the
/// village anonymous.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VillageControlInfo {
    pub id: u32,
    pub kind: VillageKindInfo,
    pub faction: u32,
    pub villain: u32,
    pub location: u32,
}
