use std::collections::BTreeMap;

use super::{EntityId, ItemId, LastingEffect};

/// Broad item category used by valuation and legality checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ItemClass {
    Weapon,
    RangedWeapon,
    Ammo,
    Armor,
    Potion,
    Scroll,
    Gold,
    Food,
    Corpse,
    Other,
}

/// Effect produced by drinking, reading or casting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectType {
    Heal,
    CurePoison,
    Teleport,
    SummonSpirit,
    Lasting(LastingEffect),
}

impl EffectType {
    /// Effects that disable a target when thrown at it.
    pub fn is_crowd_control(self) -> bool {
        matches!(
            self,
            EffectType::Lasting(
                LastingEffect::Poison
                    | LastingEffect::Slowed
                    | LastingEffect::Blind
                    | LastingEffect::Sleep
            )
        )
    }
}

/// A concrete item instance lying on the floor or carried by a creature.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemState {
    pub id: ItemId,
    pub name: String,
    pub class: ItemClass,
    pub effect: Option<EffectType>,
    /// Melee damage bonus when wielded.
    pub damage: i32,
    /// Damage dealt when thrown.
    pub thrown_damage: i32,
    /// Minimum strength needed to wield.
    pub min_strength: i32,
    /// Turns needed to apply (drink, read).
    pub apply_time: u32,
    /// Set when the item is for sale.
    pub shopkeeper: Option<EntityId>,
    /// Extra name suffix (e.g. enchantment) distinguishing otherwise equal items.
    pub modifiers: String,
}

impl ItemState {
    pub fn new(id: ItemId, name: impl Into<String>, class: ItemClass) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            effect: None,
            damage: 0,
            thrown_damage: 0,
            min_strength: 0,
            apply_time: 1,
            shopkeeper: None,
            modifiers: String::new(),
        }
    }

    pub fn with_effect(mut self, effect: EffectType) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_thrown_damage(mut self, thrown_damage: i32) -> Self {
        self.thrown_damage = thrown_damage;
        self
    }

    pub fn with_min_strength(mut self, min_strength: i32) -> Self {
        self.min_strength = min_strength;
        self
    }

    pub fn with_apply_time(mut self, apply_time: u32) -> Self {
        self.apply_time = apply_time;
        self
    }

    pub fn with_shopkeeper(mut self, shopkeeper: EntityId) -> Self {
        self.shopkeeper = Some(shopkeeper);
        self
    }

    pub fn with_modifiers(mut self, modifiers: impl Into<String>) -> Self {
        self.modifiers = modifiers.into();
        self
    }

    pub fn is_weapon(&self) -> bool {
        matches!(self.class, ItemClass::Weapon)
    }

    pub fn is_gold(&self) -> bool {
        matches!(self.class, ItemClass::Gold)
    }

    /// Weapons designed to be thrown rather than wielded.
    pub fn is_throwing_weapon(&self) -> bool {
        self.is_weapon() && self.thrown_damage > self.damage
    }

    /// Items with the same key are interchangeable and considered together.
    pub fn stack_key(&self) -> String {
        format!("{}{}", self.name, self.modifiers)
    }
}

/// Groups items by [`ItemState::stack_key`], in key order.
pub fn stack_items<'a, I>(items: I) -> BTreeMap<String, Vec<&'a ItemState>>
where
    I: IntoIterator<Item = &'a ItemState>,
{
    let mut stacks: BTreeMap<String, Vec<&'a ItemState>> = BTreeMap::new();
    for item in items {
        stacks.entry(item.stack_key()).or_default().push(item);
    }
    stacks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_group_by_name_and_modifiers() {
        let items = vec![
            ItemState::new(ItemId(1), "arrow", ItemClass::Ammo),
            ItemState::new(ItemId(2), "arrow", ItemClass::Ammo),
            ItemState::new(ItemId(3), "arrow", ItemClass::Ammo).with_modifiers(" +1"),
        ];

        let stacks = stack_items(&items);
        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks["arrow"].len(), 2);
        assert_eq!(stacks["arrow +1"].len(), 1);
    }

    #[test]
    fn crowd_control_effects() {
        assert!(EffectType::Lasting(LastingEffect::Sleep).is_crowd_control());
        assert!(!EffectType::Heal.is_crowd_control());
        assert!(!EffectType::Lasting(LastingEffect::Invisible).is_crowd_control());
    }
}
