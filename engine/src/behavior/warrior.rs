use util::VecExt;

use super::{Mind, Mob, MobState};
use crate::{
    Block, BlockType, Body, EntityType, Influence, Instant, Kind, OwnerFilter,
    Path, Sort, StepInfo, Timer,
};

/// Fights anything that doesn't belong to its colony, heals up at home.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Warrior {
    mob: Mob,
    attack: Timer,
}

impl Warrior {
    fn home<'a>(
        &self,
        me: &Body<EntityType>,
        info: &StepInfo<'a>,
    ) -> Option<&'a Block> {
        info.locator
            .visible(
                info.locator.bounds(),
                Some(Kind::Block(Some(BlockType::Home))),
                Some(OwnerFilter::only(me.owner)),
                Sort::Distance(me.pos()),
            )
            .into_iter()
            .find_map(|e| e.as_block())
    }

    /// Back off to the closest home block and heal there.
    ///
    /// Returns whether to move this frame, `None` if there's nowhere to
    /// retreat to.
    fn retreat(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> Option<bool> {
        let home = self.home(me, info)?;

        if (home.body.cell() - me.cell()).chess_len() <= 1 {
            path.clear(me.pos());
            info.push(Influence::Heal {
                target: me.id,
                amount: info.config.home_heal_rate * info.dt,
            });
            self.mob.target = Some(home.body.id);
            self.mob.transition(MobState::Flee, me, info);
            return Some(false);
        }

        if self.mob.state == MobState::Flee
            && self.mob.target == Some(home.body.id)
            && path.en_route(info.config.arrival_threshold)
        {
            return Some(true);
        }

        if !self.mob.head_to(me, path, home.body.pos(), true, info) {
            return None;
        }
        log::debug!("warrior {} retreats", me.id);
        self.mob.target = Some(home.body.id);
        self.mob.transition(MobState::Flee, me, info);
        Some(true)
    }
}

impl Mind for Warrior {
    fn decide(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        let health = me.health.ratio();
        let retreating = self.mob.state == MobState::Flee;
        // Once retreating, stay home until fully healed.
        if health < info.config.retreat_ratio || (retreating && health < 1.0) {
            if let Some(moving) = self.retreat(me, path, info) {
                return moving;
            }
        }

        self.mob.hunt(
            me,
            path,
            OwnerFilter::except(me.owner),
            &mut self.attack,
            info,
        )
    }

    fn post_step(&mut self, me: &Body<EntityType>, info: &mut StepInfo) {
        self.mob.post_step(me, info);
    }

    fn pause(&mut self, now: Instant) {
        self.mob.pause(now);
        self.attack.pause(now);
    }

    fn resume(&mut self, now: Instant) {
        self.mob.resume(now);
        self.attack.resume(now);
    }

    fn state(&self) -> Option<MobState> {
        Some(self.mob.state)
    }
}
