use serde::{Deserialize, Serialize};

use game_core::{CreatureAction, EffectType, EntityId, Skills};

use crate::providers::ai::{AiContext, Memo, Move};

/// Steals all gold from an adjacent creature, then avoids its victims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thief {
    robbed: Vec<EntityId>,
}

impl Thief {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn robbed(&self) -> &[EntityId] {
        &self.robbed
    }

    pub fn get_move(&mut self, ctx: &mut AiContext<'_>) -> Move {
        let Some(me) = ctx.creature() else {
            return Move::NONE;
        };
        if !me.has_skill(Skills::STEALING) {
            return Move::NONE;
        }
        self.robbed.retain(|victim| ctx.world.is_alive(*victim));

        for victim in &self.robbed {
            if !ctx.world.can_see(me.id, *victim) {
                continue;
            }
            let teleport = ctx.try_apply_item(EffectType::Teleport, 1);
            if teleport.is_some() {
                return teleport;
            }
            if let Some(victim) = ctx.world.creature(*victim) {
                let mv = ctx.propose(
                    1.0,
                    CreatureAction::MoveAway {
                        from: victim.position,
                        path_find: false,
                    },
                );
                if mv.is_some() {
                    return mv;
                }
            }
        }

        for direction in ctx.shuffled_directions() {
            let Some(other) = ctx.neighbour(direction) else {
                continue;
            };
            if self.robbed.contains(&other.id) {
                continue;
            }
            let gold = other.gold();
            if gold.is_empty() {
                continue;
            }
            let mv = ctx.propose(
                1.0,
                CreatureAction::StealFrom {
                    direction,
                    items: gold,
                },
            );
            if mv.is_some() {
                return mv.with_memo(Memo::Robbed(other.id));
            }
        }
        Move::NONE
    }

    pub(crate) fn apply_memo(&mut self, memo: Memo) {
        if let Memo::Robbed(victim) = memo
            && !self.robbed.contains(&victim)
        {
            tracing::debug!(victim = %victim, "robbed");
            self.robbed.push(victim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ai::behaviour::mock::{creature, open_world, place, poll};
    use game_core::{GameState, ItemClass, ItemId, ItemState, Position};

    const ME: EntityId = EntityId(1);
    const MARK: EntityId = EntityId(2);

    fn market() -> GameState {
        let mut world = open_world(8, 8);
        place(&mut world, creature(1, 1, 2, 2).with_skills(Skills::STEALING));
        place(
            &mut world,
            creature(2, 2, 3, 2)
                .with_item(ItemState::new(ItemId(5), "gold piece", ItemClass::Gold))
                .with_item(ItemState::new(ItemId(6), "club", ItemClass::Weapon)),
        );
        world
    }

    #[test]
    fn steals_only_the_gold() {
        let world = market();
        let (mv, _) = poll(&world, ME, |ctx| Thief::new().get_move(ctx));
        assert_eq!(
            mv.action(),
            Some(&CreatureAction::StealFrom {
                direction: Position::new(1, 0),
                items: vec![ItemId(5)],
            })
        );
        assert_eq!(mv.plan.and_then(|plan| plan.memo), Some(Memo::Robbed(MARK)));
    }

    #[test]
    fn runs_from_a_robbed_victim() {
        let world = market();
        let mut thief = Thief::new();
        thief.apply_memo(Memo::Robbed(MARK));
        thief.apply_memo(Memo::Robbed(MARK));
        assert_eq!(thief.robbed(), &[MARK]);

        let (mv, _) = poll(&world, ME, |ctx| thief.get_move(ctx));
        assert_eq!(
            mv.action(),
            Some(&CreatureAction::MoveAway {
                from: Position::new(3, 2),
                path_find: false,
            })
        );
    }

    #[test]
    fn dead_victims_are_forgotten() {
        let world = market();
        let mut thief = Thief::new();
        thief.apply_memo(Memo::Robbed(EntityId(40)));
        poll(&world, ME, |ctx| thief.get_move(ctx));
        assert!(thief.robbed().is_empty());
    }

    #[test]
    fn unskilled_creatures_do_not_steal() {
        let mut world = market();
        if let Some(me) = world.creature_mut(ME) {
            me.skills = Skills::empty();
        }
        let (mv, _) = poll(&world, ME, |ctx| Thief::new().get_move(ctx));
        assert_eq!(mv, Move::NONE);
    }
}
