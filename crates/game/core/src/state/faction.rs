use bitflags::bitflags;

use super::{EntityId, FactionId, LevelId, LocationId, Rect, TribeId};

bitflags! {
    /// Roles a creature plays inside its faction.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct MinionTraits: u8 {
        const LEADER   = 1 << 0;
        const FIGHTER  = 1 << 1;
        const WORKER   = 1 << 2;
        const PRISONER = 1 << 3;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactionMember {
    pub id: EntityId,
    pub traits: MinionTraits,
}

/// A collective of creatures: a village, or the villain's dungeon.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub tribe: TribeId,
    pub level: LevelId,
    /// Accumulated hostility; raises the power a village attributes to it.
    pub war_level: f64,
    pub members: Vec<FactionMember>,
}

impl Faction {
    pub fn new(id: FactionId, name: impl Into<String>, tribe: TribeId, level: LevelId) -> Self {
        Self {
            id,
            name: name.into(),
            tribe,
            level,
            war_level: 0.0,
            members: Vec::new(),
        }
    }

    pub fn add_member(&mut self, id: EntityId, traits: MinionTraits) {
        if let Some(member) = self.members.iter_mut().find(|m| m.id == id) {
            member.traits |= traits;
        } else {
            self.members.push(FactionMember { id, traits });
        }
    }

    pub fn remove_member(&mut self, id: EntityId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id != id);
        before != self.members.len()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    pub fn creatures(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().map(|m| m.id)
    }

    pub fn with_trait(&self, traits: MinionTraits) -> Vec<EntityId> {
        self.members
            .iter()
            .filter(|m| m.traits.contains(traits))
            .map(|m| m.id)
            .collect()
    }

    pub fn fighters(&self) -> Vec<EntityId> {
        self.with_trait(MinionTraits::FIGHTER)
    }

    pub fn leader(&self) -> Option<EntityId> {
        self.with_trait(MinionTraits::LEADER).into_iter().next()
    }
}

/// A named area on a level that creatures can be told to stay in.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub id: LocationId,
    pub level: LevelId,
    pub bounds: Rect,
    pub name: Option<String>,
}

/// Time of day; villagers go to bed at night.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sunlight {
    #[default]
    Day,
    Night,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_and_traits() {
        let mut faction = Faction::new(FactionId(1), "village", TribeId(3), LevelId(0));
        faction.add_member(EntityId(1), MinionTraits::FIGHTER);
        faction.add_member(EntityId(2), MinionTraits::WORKER);
        faction.add_member(EntityId(1), MinionTraits::LEADER);

        assert_eq!(faction.fighters(), vec![EntityId(1)]);
        assert_eq!(faction.leader(), Some(EntityId(1)));
        assert!(faction.remove_member(EntityId(1)));
        assert!(faction.fighters().is_empty());
        assert!(!faction.remove_member(EntityId(1)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn traits_read_as_flag_names() {
        let traits: MinionTraits =
            serde_json::from_str(r#""FIGHTER | LEADER""#).expect("flag names");
        assert_eq!(traits, MinionTraits::FIGHTER | MinionTraits::LEADER);
        assert_eq!(
            serde_json::to_string(&MinionTraits::WORKER).expect("serializes"),
            r#""WORKER""#
        );
    }
}
