//! Deferred world mutations.
use crate::{
    Block, ColonyId, Config, Controls, Effect, Entity, Id, Instant, Locator,
};
use util::GameRng;

/// A change an element wants to make to the world.
///
/// Stepping elements never touch the world collections directly, they emit
/// influences that the world applies once everyone has stepped.
#[derive(Clone, Debug)]
pub enum Influence {
    SpawnBlock(Block),
    SpawnEntity(Entity),
    SpawnEffect(Effect),
    RemoveBlock(Id),
    RemoveEntity(Id),
    RemoveEffect(Id),
    /// Reduce the health of any element, removing it at zero.
    Damage { target: Id, amount: f32 },
    Heal { target: Id, amount: f32 },
    /// Take resources out of a deposit block.
    Harvest { deposit: Id, amount: f32 },
    /// Add resources to a colony's budget.
    Deliver { colony: ColonyId, amount: f32 },
    /// Fill a threshold spawner's meter.
    Fund { spawner: Id, amount: f32 },
}

/// Everything an element gets to see and use while stepping.
pub struct StepInfo<'a> {
    /// Snapshot of the world as it was when the frame started.
    pub locator: Locator<'a>,
    pub influences: &'a mut Vec<Influence>,
    pub rng: &'a mut GameRng,
    pub config: &'a Config,
    pub controls: &'a Controls,
    pub now: Instant,
    /// Seconds elapsed since the previous frame.
    pub dt: f32,
}

impl StepInfo<'_> {
    pub fn push(&mut self, influence: Influence) {
        self.influences.push(influence);
    }
}
