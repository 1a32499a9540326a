//! Mobile agents.
use anyhow::bail;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    Behavior, Body, ColonyId, Config, Element, Instant, Mind, MobState, Path,
    Result, StepInfo, Tile,
};

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EntityType {
    Worker,
    Warrior,
    Player,
    Hostile,
}

impl EntityType {
    /// Whether other colonies' workers run away from this kind.
    pub fn is_armed(self) -> bool {
        matches!(self, EntityType::Warrior | EntityType::Hostile)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Entity {
    pub body: Body<EntityType>,
    pub path: Path,
    pub behavior: Behavior,
    /// Base speed, picked on the first step.
    speed: Option<f32>,
}

/// Parameters for constructing entities from outside the engine.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct EntityProps {
    pub kind: EntityType,
    pub owner: Option<ColonyId>,
}

impl EntityProps {
    pub fn new(kind: EntityType) -> Self {
        EntityProps { kind, owner: None }
    }

    pub fn owned_by(mut self, owner: ColonyId) -> Self {
        self.owner = Some(owner);
        self
    }
}

impl Entity {
    pub fn new(
        kind: EntityType,
        pos: Vec2,
        owner: Option<ColonyId>,
        c: &Config,
    ) -> Self {
        Entity {
            body: Body::new(Tile::new(pos, kind), c.entity_radius, c.health(kind))
                .owned_by(owner),
            path: Path::new(pos),
            behavior: Behavior::new(kind, c),
            speed: None,
        }
    }

    pub fn worker(pos: Vec2, owner: ColonyId, c: &Config) -> Self {
        Entity::new(EntityType::Worker, pos, Some(owner), c)
    }

    pub fn warrior(pos: Vec2, owner: ColonyId, c: &Config) -> Self {
        Entity::new(EntityType::Warrior, pos, Some(owner), c)
    }

    pub fn player(pos: Vec2, owner: Option<ColonyId>, c: &Config) -> Self {
        Entity::new(EntityType::Player, pos, owner, c)
    }

    pub fn hostile(pos: Vec2, c: &Config) -> Self {
        Entity::new(EntityType::Hostile, pos, None, c)
    }

    pub fn from_props(props: &EntityProps, pos: Vec2, c: &Config) -> Result<Self> {
        match (props.kind, props.owner) {
            (EntityType::Worker | EntityType::Warrior, None) => {
                bail!("{} at {pos} needs an owner colony", props.kind)
            }
            (EntityType::Hostile, Some(owner)) => {
                bail!("hostile at {pos} can't belong to {owner}")
            }
            (kind, owner) => Ok(Entity::new(kind, pos, owner, c)),
        }
    }

    pub fn kind(&self) -> EntityType {
        self.body.kind()
    }

    pub fn is_armed(&self) -> bool {
        self.kind().is_armed()
    }

    /// Current state of an autonomous entity.
    pub fn state(&self) -> Option<MobState> {
        self.behavior.state()
    }

    pub fn cargo_ratio(&self) -> f32 {
        self.behavior.cargo_ratio()
    }

    pub fn base_speed(&self) -> Option<f32> {
        self.speed
    }

    pub fn step(&mut self, info: &mut StepInfo) {
        let speed = match self.speed {
            Some(speed) => speed,
            None => {
                let speed = self.behavior.prepare(&self.body, info);
                self.speed = Some(speed);
                speed
            }
        };

        if self.behavior.decide(&self.body, &mut self.path, info) {
            let speed = speed * self.behavior.speed_factor(info.now);
            self.body.tile.pos = self.path.advance(
                speed,
                info.dt,
                info.config.arrival_threshold,
            );
        }

        self.behavior.post_step(&self.body, info);
    }
}

impl Element for Entity {
    type Kind = EntityType;

    fn body(&self) -> &Body<EntityType> {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body<EntityType> {
        &mut self.body
    }

    fn pause(&mut self, now: Instant) {
        self.behavior.pause(now);
    }

    fn resume(&mut self, now: Instant) {
        self.behavior.resume(now);
    }
}
