use std::collections::BTreeMap;

use bitflags::bitflags;

use super::{EffectType, EntityId, FactionId, ItemId, ItemState, LevelId, Position, Tick, TribeId};

bitflags! {
    /// Static body/behaviour traits of a creature.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct CreatureFlags: u16 {
        /// Can use items, equip weapons and surrender.
        const HUMANOID   = 1 << 0;
        /// Never moves (turrets, plants).
        const STATIONARY = 1 << 1;
        /// Cannot be harmed; fighting it is pointless.
        const INVINCIBLE = 1 << 2;
        /// Fights in place but never pursues.
        const DONT_CHASE = 1 << 3;
        /// Can sleep in beds to regain health.
        const CAN_SLEEP  = 1 << 4;
        /// Can leave the map by flying away.
        const FLYER      = 1 << 5;
    }
}

bitflags! {
    /// Learned skills.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Skills: u8 {
        const ARCHERY  = 1 << 0;
        const STEALING = 1 << 1;
        const HEALING  = 1 << 2;
    }
}

/// Timed conditions a creature can be under.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum LastingEffect {
    Poison,
    PoisonResistant,
    Sleep,
    Panic,
    Rage,
    Invisible,
    Slowed,
    Blind,
    StrBonus,
    DexBonus,
    Speed,
}

/// Trainable attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AttrType {
    Strength,
    Dexterity,
    Speed,
}

/// A castable spell with its cooldown state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spell {
    pub name: String,
    pub effect: EffectType,
    pub cooldown: u64,
    pub ready_at: Tick,
}

impl Spell {
    pub fn new(name: impl Into<String>, effect: EffectType, cooldown: u64) -> Self {
        Self {
            name: name.into(),
            effect,
            cooldown,
            ready_at: Tick::ZERO,
        }
    }

    pub fn is_ready(&self, now: Tick) -> bool {
        self.ready_at <= now
    }
}

/// Complete state of a single creature.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureState {
    pub id: EntityId,
    pub name: String,
    pub level: LevelId,
    pub position: Position,
    pub tribe: TribeId,
    pub faction: Option<FactionId>,
    /// Fraction of full health in `[0, 1]`.
    pub health: f64,
    /// Unarmed melee damage.
    pub damage: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub speed: i32,
    pub courage: f64,
    /// Morale in `[-1, 1]`; scales courage exponentially.
    pub morale: f64,
    pub difficulty_points: f64,
    pub exp_level: f64,
    pub flags: CreatureFlags,
    pub skills: Skills,
    /// Active effects with their expiry time.
    pub effects: BTreeMap<LastingEffect, Tick>,
    pub inventory: Vec<ItemState>,
    pub weapon: Option<ItemId>,
    pub spells: Vec<Spell>,
}

impl CreatureState {
    pub fn new(id: EntityId, name: impl Into<String>, level: LevelId, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            position,
            tribe: TribeId::default(),
            faction: None,
            health: 1.0,
            damage: 5,
            strength: 10,
            dexterity: 10,
            speed: 100,
            courage: 1.0,
            morale: 0.0,
            difficulty_points: 10.0,
            exp_level: 1.0,
            flags: CreatureFlags::empty(),
            skills: Skills::empty(),
            effects: BTreeMap::new(),
            inventory: Vec::new(),
            weapon: None,
            spells: Vec::new(),
        }
    }

    pub fn with_tribe(mut self, tribe: TribeId) -> Self {
        self.tribe = tribe;
        self
    }

    pub fn with_faction(mut self, faction: FactionId) -> Self {
        self.faction = Some(faction);
        self
    }

    pub fn with_flags(mut self, flags: CreatureFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_skills(mut self, skills: Skills) -> Self {
        self.skills |= skills;
        self
    }

    pub fn with_health(mut self, health: f64) -> Self {
        self.health = health.clamp(0.0, 1.0);
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_courage(mut self, courage: f64) -> Self {
        self.courage = courage;
        self
    }

    pub fn with_difficulty(mut self, points: f64) -> Self {
        self.difficulty_points = points;
        self
    }

    pub fn with_item(mut self, item: ItemState) -> Self {
        self.inventory.push(item);
        self
    }

    pub fn with_spell(mut self, spell: Spell) -> Self {
        self.spells.push(spell);
        self
    }

    pub fn with_effect(mut self, effect: LastingEffect, until: Tick) -> Self {
        self.effects.insert(effect, until);
        self
    }

    pub fn is_humanoid(&self) -> bool {
        self.flags.contains(CreatureFlags::HUMANOID)
    }

    pub fn is_stationary(&self) -> bool {
        self.flags.contains(CreatureFlags::STATIONARY)
    }

    pub fn is_invincible(&self) -> bool {
        self.flags.contains(CreatureFlags::INVINCIBLE)
    }

    pub fn dont_chase(&self) -> bool {
        self.flags.contains(CreatureFlags::DONT_CHASE)
    }

    pub fn can_sleep(&self) -> bool {
        self.flags.contains(CreatureFlags::CAN_SLEEP)
    }

    pub fn has_skill(&self, skill: Skills) -> bool {
        self.skills.contains(skill)
    }

    pub fn is_affected(&self, effect: LastingEffect) -> bool {
        self.effects.contains_key(&effect)
    }

    pub fn is_asleep(&self) -> bool {
        self.is_affected(LastingEffect::Sleep)
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemState> {
        self.inventory.iter().find(|item| item.id == id)
    }

    pub fn equipped_weapon(&self) -> Option<&ItemState> {
        self.weapon.and_then(|id| self.item(id))
    }

    pub fn is_equipped(&self, id: ItemId) -> bool {
        self.weapon == Some(id)
    }

    /// Melee damage including the wielded weapon.
    pub fn attack_damage(&self) -> i32 {
        self.damage + self.equipped_weapon().map_or(0, |weapon| weapon.damage)
    }

    /// Strongest weapon this creature is able to wield.
    pub fn best_weapon(&self) -> Option<&ItemState> {
        self.inventory
            .iter()
            .filter(|item| item.is_weapon() && item.min_strength <= self.strength)
            .max_by_key(|item| item.damage)
    }

    pub fn gold(&self) -> Vec<ItemId> {
        self.inventory
            .iter()
            .filter(|item| item.is_gold())
            .map(|item| item.id)
            .collect()
    }

    /// Removes effects whose expiry time has passed.
    pub fn expire_effects(&mut self, now: Tick) {
        self.effects.retain(|_, until| *until > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ItemClass;

    fn knight() -> CreatureState {
        CreatureState::new(EntityId(1), "knight", LevelId(0), Position::ORIGIN)
            .with_flags(CreatureFlags::HUMANOID)
            .with_item(ItemState::new(ItemId(1), "sword", ItemClass::Weapon).with_damage(8))
            .with_item(
                ItemState::new(ItemId(2), "war hammer", ItemClass::Weapon)
                    .with_damage(20)
                    .with_min_strength(30),
            )
    }

    #[test]
    fn best_weapon_respects_strength() {
        let knight = knight();
        assert_eq!(knight.best_weapon().map(|w| w.id), Some(ItemId(1)));
    }

    #[test]
    fn attack_damage_adds_equipped_weapon() {
        let mut knight = knight();
        assert_eq!(knight.attack_damage(), 5);
        knight.weapon = Some(ItemId(1));
        assert_eq!(knight.attack_damage(), 13);
    }

    #[test]
    fn effects_expire() {
        let mut knight = knight()
            .with_effect(LastingEffect::Panic, Tick(10))
            .with_effect(LastingEffect::Rage, Tick(30));
        knight.expire_effects(Tick(10));
        assert!(!knight.is_affected(LastingEffect::Panic));
        assert!(knight.is_affected(LastingEffect::Rage));
    }
}
