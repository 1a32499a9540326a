//! Static world objects that occupy a whole cell.
use anyhow::bail;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    Body, Cadence, ColonyId, Config, Element, EntityType, Instant, Result,
    Spawner, StepInfo, Tile,
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
pub enum BlockType {
    Wall,
    Deposit,
    Home,
    Spawner,
}

#[derive(Clone, PartialEq, Debug)]
pub enum BlockState {
    Inert,
    Deposit { amount: f32, capacity: f32 },
    Spawner(Spawner),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Block {
    pub body: Body<BlockType>,
    pub state: BlockState,
}

/// Parameters for constructing blocks from outside the engine.
#[derive(Clone, PartialEq, Debug)]
pub struct BlockProps {
    pub kind: BlockType,
    pub owner: Option<ColonyId>,
    /// Starting amount for deposits.
    pub amount: Option<f32>,
    pub cadence: Option<Cadence>,
    pub spawns: Option<EntityType>,
    pub limit: Option<u32>,
}

impl BlockProps {
    pub fn new(kind: BlockType) -> Self {
        BlockProps {
            kind,
            owner: None,
            amount: None,
            cadence: None,
            spawns: None,
            limit: None,
        }
    }

    pub fn owned_by(mut self, owner: ColonyId) -> Self {
        self.owner = Some(owner);
        self
    }
}

impl Block {
    fn new(kind: BlockType, pos: Vec2, state: BlockState, c: &Config) -> Self {
        Block {
            body: Body::new(Tile::new(pos, kind), c.block_radius, c.block_health),
            state,
        }
    }

    pub fn wall(pos: Vec2, c: &Config) -> Self {
        Block::new(BlockType::Wall, pos, BlockState::Inert, c)
    }

    pub fn deposit(pos: Vec2, amount: f32, c: &Config) -> Self {
        let amount = amount.max(0.0);
        Block::new(
            BlockType::Deposit,
            pos,
            BlockState::Deposit {
                amount,
                capacity: amount,
            },
            c,
        )
    }

    pub fn home(pos: Vec2, owner: ColonyId, c: &Config) -> Self {
        let mut ret = Block::new(BlockType::Home, pos, BlockState::Inert, c);
        ret.body.owner = Some(owner);
        ret
    }

    pub fn spawner(
        pos: Vec2,
        owner: ColonyId,
        spawner: Spawner,
        c: &Config,
    ) -> Self {
        let mut ret = Block::new(
            BlockType::Spawner,
            pos,
            BlockState::Spawner(spawner),
            c,
        );
        ret.body.owner = Some(owner);
        ret
    }

    pub fn from_props(
        props: &BlockProps,
        pos: Vec2,
        now: Instant,
        c: &Config,
    ) -> Result<Self> {
        Ok(match props.kind {
            BlockType::Wall => Block::wall(pos, c),
            BlockType::Deposit => {
                Block::deposit(pos, props.amount.unwrap_or(c.deposit_amount), c)
            }
            BlockType::Home => {
                let Some(owner) = props.owner else {
                    bail!("home block at {pos} needs an owner colony");
                };
                Block::home(pos, owner, c)
            }
            BlockType::Spawner => {
                let Some(owner) = props.owner else {
                    bail!("spawner block at {pos} needs an owner colony");
                };
                let cadence = props.cadence.unwrap_or(Cadence::Interval {
                    period: c.spawner_period,
                });
                let spawns = props.spawns.unwrap_or(EntityType::Worker);
                Block::spawner(
                    pos,
                    owner,
                    Spawner::new(cadence, spawns, now).with_limit(props.limit),
                    c,
                )
            }
        })
    }

    pub fn kind(&self) -> BlockType {
        self.body.kind()
    }

    /// Resources left in a deposit, `None` for other blocks.
    pub fn deposit_amount(&self) -> Option<f32> {
        match self.state {
            BlockState::Deposit { amount, .. } => Some(amount),
            _ => None,
        }
    }

    pub fn is_nonempty_deposit(&self) -> bool {
        self.deposit_amount().is_some_and(|a| a > 0.0)
    }

    /// Take up to `amount` from a deposit, return how much was taken.
    pub fn take(&mut self, amount: f32) -> f32 {
        match &mut self.state {
            BlockState::Deposit { amount: left, .. } => {
                let ret = amount.max(0.0).min(*left);
                *left -= ret;
                ret
            }
            _ => 0.0,
        }
    }

    pub fn spawner_ref(&self) -> Option<&Spawner> {
        match &self.state {
            BlockState::Spawner(s) => Some(s),
            _ => None,
        }
    }

    pub fn spawner_mut(&mut self) -> Option<&mut Spawner> {
        match &mut self.state {
            BlockState::Spawner(s) => Some(s),
            _ => None,
        }
    }

    /// Display progress value, deposit fill level or spawner progress.
    pub fn completion(&self, now: Instant) -> f32 {
        match &self.state {
            BlockState::Inert => 1.0,
            BlockState::Deposit { amount, capacity } => {
                if *capacity > 0.0 {
                    (amount / capacity).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
            BlockState::Spawner(s) => s.completion(now),
        }
    }

    pub fn step(&mut self, info: &mut StepInfo) {
        match &mut self.state {
            BlockState::Inert => {}
            BlockState::Deposit { amount, capacity } => {
                let regen = info.config.deposit_regen * info.dt;
                *amount = (*amount + regen).min(*capacity);
            }
            BlockState::Spawner(s) => s.step(&self.body, info),
        }
    }
}

impl Element for Block {
    type Kind = BlockType;

    fn body(&self) -> &Body<BlockType> {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body<BlockType> {
        &mut self.body
    }

    fn pause(&mut self, now: Instant) {
        if let Some(s) = self.spawner_mut() {
            s.pause(now);
        }
    }

    fn resume(&mut self, now: Instant) {
        if let Some(s) = self.spawner_mut() {
            s.resume(now);
        }
    }
}
