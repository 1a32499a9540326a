//! Read-only display descriptors for front ends.
use crate::{
    BlockType, ColonyId, EffectState, EffectType, EntityType, Id, Instant,
    MobState, Tile,
};

#[derive(Clone, PartialEq, Debug)]
pub struct Block {
    pub id: Id,
    pub tile: Tile<BlockType>,
    pub owner: Option<ColonyId>,
    pub health: f32,
    /// Deposit fill level or progress towards the next spawn.
    pub completion: f32,
}

impl Block {
    pub fn new(block: &crate::Block, now: Instant) -> Self {
        Block {
            id: block.body.id,
            tile: block.body.tile,
            owner: block.body.owner,
            health: block.body.health.ratio(),
            completion: block.completion(now),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Entity {
    pub id: Id,
    pub tile: Tile<EntityType>,
    pub owner: Option<ColonyId>,
    pub health: f32,
    pub cargo: f32,
    pub state: Option<MobState>,
}

impl From<&crate::Entity> for Entity {
    fn from(e: &crate::Entity) -> Self {
        Entity {
            id: e.body.id,
            tile: e.body.tile,
            owner: e.body.owner,
            health: e.body.health.ratio(),
            cargo: e.cargo_ratio(),
            state: e.state(),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Vfx {
    pub id: Id,
    pub tile: Tile<EffectType>,
    pub owner: Option<ColonyId>,
    pub state: EffectState,
    /// Fades from 1 to 0 over the effect's lifetime.
    pub intensity: f32,
}

impl Vfx {
    pub fn new(effect: &crate::Effect, now: Instant) -> Self {
        Vfx {
            id: effect.body.id,
            tile: effect.body.tile,
            owner: effect.body.owner,
            state: effect.state,
            intensity: effect.fraction_left(now),
        }
    }
}

/// Everything a front end needs to draw a frame.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Views {
    pub blocks: Vec<Block>,
    pub entities: Vec<Entity>,
    pub vfx: Vec<Vfx>,
}
