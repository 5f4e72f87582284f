use serde::{Deserialize, Serialize};

use game_core::{
    CreatureAction, EffectType, ItemState, LastingEffect, LevelId, Position, Rect,
    SquareApplyType,
};

use crate::providers::ai::{AiContext, Move};

/// Heals adjacent friends, cures poison, drinks potions and seeks beds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heal {
    use_beds: bool,
    bed: Option<BedInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct BedInfo {
    position: Position,
    level: LevelId,
}

impl Heal {
    pub fn new(use_beds: bool) -> Self {
        Self {
            use_beds,
            bed: None,
        }
    }

    pub fn get_move(&mut self, ctx: &mut AiContext<'_>) -> Move {
        let Some(me) = ctx.creature() else {
            return Move::NONE;
        };

        for direction in Position::DIRECTIONS8 {
            if let Some(other) = ctx.neighbour(direction)
                && ctx.world.is_friend(me.id, other.id)
            {
                let mv = ctx.propose(0.5, CreatureAction::Heal { direction });
                if mv.is_some() {
                    return mv;
                }
            }
        }

        if !me.is_humanoid() {
            return Move::NONE;
        }
        let poisoned = me.is_affected(LastingEffect::Poison);
        if poisoned {
            for cure in [
                EffectType::Lasting(LastingEffect::PoisonResistant),
                EffectType::CurePoison,
            ] {
                let mv = ctx.try_apply_item(cure, 1);
                if mv.is_some() {
                    return mv;
                }
            }
        }
        if me.health >= 1.0 {
            return Move::NONE;
        }

        let urgency = (1.5 - me.health).min(1.0);
        let mv = ctx.try_apply_item(EffectType::Heal, 1);
        if mv.is_some() {
            return mv.with_value(urgency);
        }
        let mv = ctx.try_apply_item(EffectType::Heal, 3);
        if mv.is_some() {
            return mv.with_value(0.5 * urgency);
        }

        let on_bed = ctx
            .world
            .square(me.level, me.position)
            .is_some_and(|square| square.apply_type == Some(SquareApplyType::Sleep));
        if on_bed {
            return ctx.propose(0.4 * urgency, CreatureAction::ApplySquare);
        }

        if self.use_beds && me.can_sleep() && !poisoned {
            match self.bed.filter(|bed| bed.level == me.level) {
                None => {
                    let radius = ctx.config.ai.bed_search_radius;
                    for position in Rect::around(me.position, radius).positions() {
                        let is_bed = ctx
                            .world
                            .square(me.level, position)
                            .is_some_and(|square| square.is_bed());
                        if !is_bed {
                            continue;
                        }
                        let mv = ctx.propose(
                            0.4 * urgency,
                            CreatureAction::MoveTowards { target: position },
                        );
                        if mv.is_some() {
                            self.bed = Some(BedInfo {
                                position,
                                level: me.level,
                            });
                            return mv;
                        }
                    }
                }
                Some(bed) => {
                    return ctx.propose(
                        0.4 * urgency,
                        CreatureAction::MoveTowards {
                            target: bed.position,
                        },
                    );
                }
            }
        }

        Move::NONE
    }

    pub fn item_value(&self, item: &ItemState) -> f64 {
        if item.effect == Some(EffectType::Heal) {
            0.5
        } else {
            0.0
        }
    }
}
