use super::{Mind, Mob, MobState};
use crate::{Body, EntityType, Instant, OwnerFilter, Path, StepInfo, Timer};

/// Unowned predator that preys on every colony.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Hostile {
    mob: Mob,
    attack: Timer,
}

impl Mind for Hostile {
    fn decide(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        // Anything owned by a colony is prey, fellow hostiles aren't.
        self.mob
            .hunt(me, path, OwnerFilter::except(None), &mut self.attack, info)
    }

    fn pause(&mut self, now: Instant) {
        self.attack.pause(now);
    }

    fn resume(&mut self, now: Instant) {
        self.attack.resume(now);
    }

    fn state(&self) -> Option<MobState> {
        Some(self.mob.state)
    }
}
