//! Factions that own blocks and entities and spend a shared budget.
use derive_more::Display;
use glam::{ivec2, IVec2, Vec2};
use serde::{Deserialize, Serialize};
use strum::EnumString;
use util::VecExt;

use crate::{
    Block, BlockType, Cadence, EntityType, Influence, Spawner, StepInfo,
};

/// Stable identity of a colony within a world.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Display,
    Serialize,
    Deserialize,
)]
#[display("colony {_0}")]
pub struct ColonyId(pub(crate) u32);

impl ColonyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a colony spends its budget on.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Hash,
    Debug,
    strum::Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Focus {
    /// Fund the colony's resource-metered spawners.
    #[default]
    Breed,
    /// Build new spawners around home.
    Expand,
    /// Keep everything.
    Hoard,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Colony {
    pub id: ColonyId,
    pub name: String,
    /// Point workers bring resources back to when there's no home block.
    pub home: Vec2,
    pub focus: Focus,
    pub budget: f32,
}

/// How far from home an expanding colony looks for building room.
const BUILD_RINGS: i32 = 4;

impl Colony {
    pub fn new(id: ColonyId, name: impl Into<String>, home: Vec2) -> Self {
        Colony {
            id,
            name: name.into(),
            home,
            focus: Focus::default(),
            budget: 0.0,
        }
    }

    pub fn with_focus(mut self, focus: Focus) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_budget(mut self, budget: f32) -> Self {
        self.budget = budget.max(0.0);
        self
    }

    pub fn step(&mut self, info: &mut StepInfo) {
        match self.focus {
            Focus::Breed => self.breed(info),
            Focus::Expand => self.expand(info),
            Focus::Hoard => {}
        }
    }

    fn breed(&mut self, info: &mut StepInfo) {
        let spawners = info.locator.blocks().iter().filter(|b| {
            b.body.owner == Some(self.id) && b.kind() == BlockType::Spawner
        });

        for block in spawners {
            if self.budget <= 0.0 {
                break;
            }
            let Some(spawner) = block.spawner_ref() else {
                continue;
            };
            let amount = spawner.needs().min(self.budget);
            if amount > 0.0 {
                self.budget -= amount;
                info.push(Influence::Fund {
                    spawner: block.body.id,
                    amount,
                });
            }
        }
    }

    fn expand(&mut self, info: &mut StepInfo) {
        let cost = info.config.build_cost;
        if self.budget < cost {
            return;
        }

        let Some(cell) = self.building_site(info) else {
            log::debug!("{} has no room to build around home", self.name);
            return;
        };

        let spawner = Spawner::new(
            Cadence::Interval {
                period: info.config.spawner_period,
            },
            EntityType::Worker,
            info.now,
        );
        let block =
            Block::spawner(cell.center(), self.id, spawner, info.config);
        log::debug!("{} builds a spawner at {cell}", self.name);
        info.push(Influence::SpawnBlock(block));
        self.budget -= cost;
    }

    /// First free cell in growing square rings around home.
    fn building_site(&self, info: &StepInfo) -> Option<IVec2> {
        let home = self.home.as_ivec2();
        for r in 1..=BUILD_RINGS {
            for y in -r..=r {
                for x in -r..=r {
                    if x.abs() != r && y.abs() != r {
                        continue;
                    }
                    let cell = home + ivec2(x, y);
                    if info.locator.cell_in_bounds(cell)
                        && !info.locator.cell_obstructed(cell)
                    {
                        return Some(cell);
                    }
                }
            }
        }
        None
    }
}
