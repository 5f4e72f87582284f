//! Combat decisions: when to panic, how to attack, and what to pick up.
//!
//! A fighter compares its damage against the closest visible enemy's. The
//! power ratio `courage * 2^morale * my_damage / enemy_damage` together with
//! the fighter's health produces a panic weight in `[0, 1]`:
//!
//! ```text
//! weight = 1 - 0.9 * health
//! if ratio < max_power_ratio { weight += 2 - 2 * ratio }
//! ```
//!
//! At a weight of at least 0.5 and an enemy within the panic radius the
//! fighter tries (in order) a teleport item, a ranged shot when the enemy is
//! more than three squares away, and running. Otherwise it attacks: drawing a
//! weapon, drinking buffs, firing or throwing along clear principal lines,
//! chasing, and finally hitting in melee.
//!
//! When no enemy is visible the fighter follows its last-seen memory, which
//! expires after `last_seen_timeout` ticks or on reaching the spot.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use game_core::{
    CreatureAction, CreatureState, EffectType, EntityId, GameEvent, ItemClass, ItemState,
    LastingEffect, Position, Skills, World, WorldView,
};

use crate::providers::ai::{AiContext, LastSeen, LastSeenKind, Memo, Move};

const RAGE_TURNS: u64 = 30;

/// Effects worth picking up for a fight.
const USEFUL_EFFECTS: [EffectType; 10] = [
    EffectType::Lasting(LastingEffect::Invisible),
    EffectType::Lasting(LastingEffect::Slowed),
    EffectType::Lasting(LastingEffect::Blind),
    EffectType::Lasting(LastingEffect::Sleep),
    EffectType::Lasting(LastingEffect::Poison),
    EffectType::Lasting(LastingEffect::PoisonResistant),
    EffectType::CurePoison,
    EffectType::Teleport,
    EffectType::Lasting(LastingEffect::StrBonus),
    EffectType::Lasting(LastingEffect::DexBonus),
];

/// Effects used on oneself right before a fight.
const BUFF_EFFECTS: [EffectType; 5] = [
    EffectType::Lasting(LastingEffect::Invisible),
    EffectType::Lasting(LastingEffect::StrBonus),
    EffectType::Lasting(LastingEffect::DexBonus),
    EffectType::Lasting(LastingEffect::Speed),
    EffectType::SummonSpirit,
];

/// Panic weight for a fighter at `health` facing an enemy at `power_ratio`.
pub fn panic_weight(health: f64, power_ratio: f64, max_power_ratio: f64) -> f64 {
    let mut weight = 1.0 - health * 0.9;
    if power_ratio < max_power_ratio {
        weight += 2.0 - power_ratio * 2.0;
    }
    weight.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    max_power_ratio: f64,
    chase: bool,
    last_seen: Option<LastSeen>,
}

impl Fighter {
    pub fn new(max_power_ratio: f64, chase: bool) -> Self {
        Self {
            max_power_ratio,
            chase,
            last_seen: None,
        }
    }

    pub fn last_seen(&self) -> Option<&LastSeen> {
        self.last_seen.as_ref()
    }

    fn morale_bonus(creature: &CreatureState) -> f64 {
        creature.courage * 2f64.powf(creature.morale)
    }

    pub fn get_move(&mut self, ctx: &mut AiContext<'_>) -> Move {
        let Some(me) = ctx.creature() else {
            return Move::NONE;
        };
        let Some(other) = ctx.closest_enemy() else {
            return self.last_seen_move(ctx, me);
        };

        let mut my_damage = f64::from(me.attack_damage());
        if me.weapon.is_none()
            && let Some(weapon) = ctx.best_weapon()
        {
            my_damage += f64::from(weapon.damage);
        }
        let enemy_damage = f64::from(other.attack_damage());
        let power_ratio = if enemy_damage > 0.0 {
            Self::morale_bonus(me) * my_damage / enemy_damage
        } else {
            f64::INFINITY
        };
        let significant_enemy = my_damage < 5.0 * enemy_damage;

        let mut weight = panic_weight(me.health, power_ratio, self.max_power_ratio);
        if me.is_affected(LastingEffect::Panic) {
            weight = 1.0;
        }
        if other.is_asleep() || other.is_stationary() {
            weight = 0.0;
        }
        tracing::debug!(actor = %me.id, enemy = %other.id, weight, "panic weight");

        let chase = significant_enemy && self.chase;
        if weight < 0.5 {
            return self.attack_move(ctx, me, other, chase);
        }
        let distance = me.position.dist8(other.position);
        if distance > ctx.config.ai.panic_radius {
            return Move::NONE;
        }
        if distance == 1 && me.is_humanoid() {
            ctx.publish(GameEvent::Surrender {
                creature: me.id,
                to: other.id,
            });
        }
        let panic = self.panic_move(ctx, me, other, weight);
        if panic.is_some() {
            return panic;
        }
        self.attack_move(ctx, me, other, chase)
    }

    fn panic_move(
        &self,
        ctx: &mut AiContext<'_>,
        me: &CreatureState,
        other: &CreatureState,
        weight: f64,
    ) -> Move {
        let teleport = ctx.try_apply_item(EffectType::Teleport, 1);
        if teleport.is_some() {
            return teleport.with_value(weight);
        }
        if other.position.dist8(me.position) > 3 {
            let fire = fire_move(ctx, me, other.position - me.position);
            if fire.is_some() {
                return fire.with_value(weight);
            }
        }
        let events = [ctx.combat_event(me.id), ctx.combat_event(other.id)];
        let memo = Memo::LastSeen(LastSeen {
            position: me.position,
            time: ctx.time(),
            level: me.level,
            kind: LastSeenKind::Panic,
            creature: other.id,
        });
        ctx.propose(
            weight,
            CreatureAction::MoveAway {
                from: other.position,
                path_find: self.chase,
            },
        )
        .with_events(events)
        .with_memo(memo)
    }

    fn last_seen_move(&mut self, ctx: &mut AiContext<'_>, me: &CreatureState) -> Move {
        let Some(seen) = self.last_seen.clone() else {
            return Move::NONE;
        };
        let stale_before = ctx.time().saturating_sub(ctx.config.ai.last_seen_timeout);
        if seen.level != me.level || seen.time < stale_before || seen.position == me.position {
            self.last_seen = None;
            return Move::NONE;
        }
        if self.chase && seen.kind == LastSeenKind::Attack {
            let mv = ctx
                .propose(
                    0.5,
                    CreatureAction::MoveTowards {
                        target: seen.position,
                    },
                )
                .with_events([ctx.combat_event(me.id)]);
            if mv.is_some() {
                return mv;
            }
        }
        if seen.kind == LastSeenKind::Panic && seen.position.dist8(me.position) < 4 {
            let mv = ctx
                .propose(
                    0.5,
                    CreatureAction::MoveAway {
                        from: seen.position,
                        path_find: self.chase,
                    },
                )
                .with_events([ctx.combat_event(me.id)]);
            if mv.is_some() {
                return mv;
            }
        }
        Move::NONE
    }

    fn attack_move(
        &mut self,
        ctx: &mut AiContext<'_>,
        me: &CreatureState,
        other: &CreatureState,
        chase: bool,
    ) -> Move {
        if other.is_invincible() {
            return Move::NONE;
        }
        let enemy_dir = other.position - me.position;
        let distance = enemy_dir.length8();
        let engage = [ctx.combat_event(me.id), ctx.combat_event(other.id)];

        if me.is_humanoid()
            && me.weapon.is_none()
            && let Some(weapon) = ctx.best_weapon()
        {
            let mv = ctx.propose(
                3.0 / (2.0 + f64::from(distance)),
                CreatureAction::Equip { item: weapon.id },
            );
            if mv.is_some() {
                tracing::debug!(actor = %me.id, weapon = %weapon.name, "draws weapon");
                return mv.with_events(engage);
            }
        }

        if distance <= ctx.config.ai.buff_radius {
            for effect in BUFF_EFFECTS {
                let mv = ctx.try_apply_item(effect, 1);
                if mv.is_some() {
                    return mv;
                }
            }
        }

        if distance > 1 {
            if distance < ctx.config.ai.ranged_radius {
                let fire = fire_move(ctx, me, enemy_dir);
                if fire.is_some() {
                    return fire;
                }
                let throw = throw_move(ctx, me, enemy_dir);
                if throw.is_some() {
                    return throw;
                }
            }
            if chase && !other.dont_chase() {
                self.last_seen = None;
                let target = me.position + enemy_dir;
                let value = (1.0 - f64::from(distance) / ctx.config.ai.chase_falloff).max(0.0);
                let memo = Memo::LastSeen(LastSeen {
                    position: target,
                    time: ctx.time(),
                    level: me.level,
                    kind: LastSeenKind::Attack,
                    creature: other.id,
                });
                let mv = ctx
                    .propose(value, CreatureAction::MoveTowards { target })
                    .with_events(engage.clone())
                    .with_memo(memo);
                if mv.is_some() {
                    return mv;
                }
            }
        }

        if distance == 1 {
            return ctx
                .propose(1.0, CreatureAction::Attack { direction: enemy_dir })
                .with_events(engage);
        }
        Move::NONE
    }

    pub fn item_value(&self, item: &ItemState, ctx: &AiContext<'_>) -> f64 {
        let Some(me) = ctx.creature() else {
            return 0.0;
        };
        if item.effect.is_some_and(|effect| USEFUL_EFFECTS.contains(&effect)) {
            return 1.0;
        }
        if matches!(item.class, ItemClass::Ammo) && me.has_skill(Skills::ARCHERY) {
            return 0.1;
        }
        if !matches!(item.class, ItemClass::Weapon) || me.strength < item.min_strength {
            return 0.0;
        }
        if item.thrown_damage > 0 {
            return f64::from(item.thrown_damage) / 50.0;
        }
        if let Some(best) = ctx.best_weapon()
            && best.id != item.id
            && best.damage >= item.damage
        {
            return 0.0;
        }
        f64::from(item.damage) / 50.0
    }

    /// Remembers an attacker the fighter cannot see so that it can strike back.
    pub fn on_attacked(&mut self, owner: EntityId, attacker: EntityId, world: &dyn WorldView) {
        let (Some(me), Some(enemy)) = (world.creature(owner), world.creature(attacker)) else {
            return;
        };
        if enemy.level != me.level || world.can_see(owner, attacker) {
            return;
        }
        self.last_seen = Some(LastSeen {
            position: enemy.position,
            time: world.time(),
            level: enemy.level,
            kind: LastSeenKind::Attack,
            creature: attacker,
        });
    }

    pub fn on_event(
        &mut self,
        owner: EntityId,
        event: &GameEvent,
        world: &mut dyn World,
        rng: &mut dyn RngCore,
    ) {
        match event {
            GameEvent::Kill { victim, .. } => {
                let saw_kin_die = victim.id != owner
                    && world.creature(owner).is_some_and(|me| me.name == victim.name)
                    && world.can_see_position(owner, victim.level, victim.position);
                if saw_kin_die {
                    world.add_morale(owner, -0.1);
                }
                if self
                    .last_seen
                    .as_ref()
                    .is_some_and(|seen| seen.creature == victim.id)
                {
                    self.last_seen = None;
                }
            }
            GameEvent::Throw {
                level,
                item_name,
                trajectory,
                ..
            } => {
                let Some(me) = world.creature(owner) else {
                    return;
                };
                if !me.is_humanoid() || *level != me.level {
                    return;
                }
                let name = me.name.as_str();
                if trajectory.contains(&me.position)
                    && item_name.len() > name.len()
                    && item_name.starts_with(name)
                {
                    tracing::debug!(actor = %owner, item = %item_name, "screams in terror");
                    if rng.gen_bool(0.5) {
                        world.add_effect(owner, LastingEffect::Rage, RAGE_TURNS);
                    } else {
                        world.add_morale(owner, -0.5);
                    }
                }
            }
            _ => {}
        }
    }

    pub(crate) fn apply_memo(&mut self, memo: Memo) {
        if let Memo::LastSeen(seen) = memo {
            self.last_seen = Some(seen);
        }
    }
}

/// Whether a non-enemy stands strictly between the fighter and `enemy_dir`.
fn friendly_fire(ctx: &AiContext<'_>, me: &CreatureState, enemy_dir: Position) -> bool {
    let step = enemy_dir.shorten();
    let mut offset = step;
    for _ in 1..enemy_dir.length8() {
        if let Some(creature) = ctx.world.creature_at(me.level, me.position + offset)
            && !ctx.world.is_enemy(me.id, creature.id)
        {
            return true;
        }
        offset += step;
    }
    false
}

fn fire_move(ctx: &mut AiContext<'_>, me: &CreatureState, enemy_dir: Position) -> Move {
    if !enemy_dir.is_principal() || friendly_fire(ctx, me, enemy_dir) {
        return Move::NONE;
    }
    ctx.propose(
        1.0,
        CreatureAction::Fire {
            direction: enemy_dir.shorten(),
        },
    )
    .with_events([ctx.combat_event(me.id)])
}

fn throw_value(item: &ItemState) -> f64 {
    if item.effect.is_some_and(EffectType::is_crowd_control) {
        100.0
    } else {
        f64::from(item.thrown_damage)
    }
}

fn throw_move(ctx: &mut AiContext<'_>, me: &CreatureState, enemy_dir: Position) -> Move {
    if !enemy_dir.is_principal() || friendly_fire(ctx, me, enemy_dir) {
        return Move::NONE;
    }
    let mut best: Option<(&ItemState, f64)> = None;
    for item in me.inventory.iter().filter(|item| !me.is_equipped(item.id)) {
        let value = throw_value(item);
        if value > best.map_or(0.0, |(_, v)| v) {
            best = Some((item, value));
        }
    }
    let Some((item, _)) = best else {
        return Move::NONE;
    };
    let mv = ctx.propose(
        1.0,
        CreatureAction::Throw {
            item: item.id,
            direction: enemy_dir.shorten(),
        },
    );
    if mv.is_some() {
        let event = ctx.combat_event(me.id);
        ctx.publish(event);
    }
    mv
}
