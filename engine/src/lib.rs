//! Colony simulation logic layer.

/// Distance between consecutive obstruction samples along a segment.
pub const SAMPLE_STEP: f32 = 0.5;

/// Fixed-point scale for pathfinding costs, one tile is this many units.
pub const PATH_COST_SCALE: f32 = 1000.0;

/// Smallest allowed world width and height in tiles.
pub const MIN_WORLD_SIZE: i32 = 4;

pub type Result<T> = anyhow::Result<T>;

mod behavior;
pub use behavior::{
    Behavior, Controls, Hostile, Mind, MobState, Player, Warrior, Worker,
};

mod block;
pub use block::{Block, BlockProps, BlockState, BlockType};

mod colony;
pub use colony::{Colony, ColonyId, Focus};

mod config;
pub use config::{Config, Goal, Weight, WeightTable};

mod effect;
pub use effect::{Effect, EffectProps, EffectState, EffectType, Signal, VfxKind};

mod element;
pub use element::{Body, Element, Health, Id};

mod entity;
pub use entity::{Entity, EntityProps, EntityType};

mod influence;
pub use influence::{Influence, StepInfo};

mod level;
pub use level::{ColonySpec, Placement, WorldSpec};

mod locator;
pub use locator::{ItemEntry, Kind, Locator, Occupancy, OwnerFilter, Sort};

mod path;
pub use path::{Path, Segment};

mod pathing;
pub use pathing::bounded_astar;

mod pheromone;
pub use pheromone::PheromoneAnalyzer;

pub mod prelude;

mod spawner;
pub use spawner::{Cadence, Spawner};

mod tile;
pub use tile::Tile;

mod time;
pub use time::{Clock, Instant, ManualClock, Timer, WallClock};

pub mod view;

mod world;
pub use world::{Props, World};
