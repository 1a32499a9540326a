pub use crate::{
    Block, BlockProps, BlockType, Body, Cadence, Colony, ColonyId, Config,
    Controls, Effect, EffectProps, EffectType, Element, Entity, EntityProps,
    EntityType, Focus, Id, Influence, Instant, ItemEntry, Kind, Locator,
    ManualClock, MobState, OwnerFilter, Path, Placement, Result, Signal, Sort,
    StepInfo, Tile, VfxKind, World, WorldSpec,
};
pub use glam::{ivec2, vec2, IVec2, Vec2};
pub use util::{
    Area, GameRng, HashMap, HashSet, IndexMap, PointExt, RngExt, VecExt,
    DIR_4, DIR_8,
};
