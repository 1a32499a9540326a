//! What entities do on their own, or on the player's command.
use glam::Vec2;
use rand::Rng;

use crate::{Body, Config, EntityType, Instant, Path, StepInfo};

mod hostile;
pub use hostile::Hostile;

mod mob;
pub use mob::MobState;
pub(crate) use mob::Mob;

mod player;
pub use player::Player;

mod warrior;
pub use warrior::Warrior;

mod worker;
pub use worker::Worker;

/// Input from the front end for the player entity.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct Controls {
    /// Desired movement direction, zero to stand still.
    pub direction: Vec2,
    pub sprint: bool,
}

impl Controls {
    pub fn towards(direction: Vec2) -> Self {
        Controls {
            direction,
            sprint: false,
        }
    }
}

/// Per-frame decision making of an entity.
///
/// Every frame the entity calls `decide` with its current body and path,
/// moves along the path if `decide` returned true and then calls
/// `post_step`.
pub trait Mind {
    /// Pick the entity's base speed, called once on the first step.
    fn prepare(&mut self, me: &Body<EntityType>, info: &mut StepInfo) -> f32 {
        let jitter = info.config.speed_jitter.abs();
        let factor = if jitter > 0.0 {
            1.0 + info.rng.gen_range(-jitter..=jitter)
        } else {
            1.0
        };
        (info.config.speed(me.kind()) * factor).max(0.0)
    }

    /// Update the path, return whether the entity should move along it.
    fn decide(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool;

    /// Multiplier on the base speed.
    fn speed_factor(&self, _now: Instant) -> f32 {
        1.0
    }

    fn post_step(&mut self, _me: &Body<EntityType>, _info: &mut StepInfo) {}

    fn pause(&mut self, _now: Instant) {}

    fn resume(&mut self, _now: Instant) {}

    /// Current state machine state for autonomous minds.
    fn state(&self) -> Option<MobState> {
        None
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Behavior {
    Worker(Worker),
    Warrior(Warrior),
    Player(Player),
    Hostile(Hostile),
}

impl Behavior {
    pub fn new(kind: EntityType, c: &Config) -> Self {
        match kind {
            EntityType::Worker => Behavior::Worker(Worker::new(c)),
            EntityType::Warrior => Behavior::Warrior(Warrior::default()),
            EntityType::Player => Behavior::Player(Player::new(c)),
            EntityType::Hostile => Behavior::Hostile(Hostile::default()),
        }
    }

    /// Fill level of a worker's cargo, zero for everyone else.
    pub fn cargo_ratio(&self) -> f32 {
        match self {
            Behavior::Worker(w) => w.cargo_ratio(),
            _ => 0.0,
        }
    }

    fn mind(&self) -> &dyn Mind {
        match self {
            Behavior::Worker(a) => a,
            Behavior::Warrior(a) => a,
            Behavior::Player(a) => a,
            Behavior::Hostile(a) => a,
        }
    }

    fn mind_mut(&mut self) -> &mut dyn Mind {
        match self {
            Behavior::Worker(a) => a,
            Behavior::Warrior(a) => a,
            Behavior::Player(a) => a,
            Behavior::Hostile(a) => a,
        }
    }
}

impl Mind for Behavior {
    fn prepare(&mut self, me: &Body<EntityType>, info: &mut StepInfo) -> f32 {
        self.mind_mut().prepare(me, info)
    }

    fn decide(
        &mut self,
        me: &Body<EntityType>,
        path: &mut Path,
        info: &mut StepInfo,
    ) -> bool {
        self.mind_mut().decide(me, path, info)
    }

    fn speed_factor(&self, now: Instant) -> f32 {
        self.mind().speed_factor(now)
    }

    fn post_step(&mut self, me: &Body<EntityType>, info: &mut StepInfo) {
        self.mind_mut().post_step(me, info)
    }

    fn pause(&mut self, now: Instant) {
        self.mind_mut().pause(now)
    }

    fn resume(&mut self, now: Instant) {
        self.mind_mut().resume(now)
    }

    fn state(&self) -> Option<MobState> {
        self.mind().state()
    }
}
