//! Common identity, health and ownership for blocks, entities and effects.
use derive_more::Display;
use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::{ColonyId, Instant, Tile};

/// Stable identity of a simulated element.
///
/// Assigned by the world when the element is committed, never reused within
/// a world. The zero value means "not yet committed".
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
#[display("#{_0}")]
pub struct Id(pub(crate) u64);

impl Id {
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

/// Health pool that never leaves the range `0..=total`.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Health {
    current: f32,
    total: f32,
}

impl Health {
    pub fn new(total: f32) -> Self {
        let total = total.max(0.0);
        Health {
            current: total,
            total,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn total(&self) -> f32 {
        self.total
    }

    pub fn ratio(&self) -> f32 {
        if self.total > 0.0 {
            self.current / self.total
        } else {
            0.0
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.total);
    }
}

/// State every simulated element carries.
#[derive(Clone, PartialEq, Debug)]
pub struct Body<T> {
    pub id: Id,
    pub tile: Tile<T>,
    pub radius: f32,
    pub health: Health,
    pub owner: Option<ColonyId>,
    pub(crate) doomed: bool,
}

impl<T: Copy> Body<T> {
    pub fn new(tile: Tile<T>, radius: f32, health: f32) -> Self {
        Body {
            id: Id::default(),
            tile,
            radius,
            health: Health::new(health),
            owner: None,
            doomed: false,
        }
    }

    pub fn owned_by(mut self, owner: Option<ColonyId>) -> Self {
        self.owner = owner;
        self
    }

    pub fn pos(&self) -> Vec2 {
        self.tile.pos
    }

    pub fn cell(&self) -> IVec2 {
        self.tile.cell()
    }

    pub fn kind(&self) -> T {
        self.tile.kind
    }

    /// Whether the element has been marked for deletion in the current
    /// commit.
    pub fn is_doomed(&self) -> bool {
        self.doomed
    }
}

/// Shared per-frame contract of blocks, entities and effects.
pub trait Element: Clone {
    type Kind: Copy;

    fn body(&self) -> &Body<Self::Kind>;

    fn body_mut(&mut self) -> &mut Body<Self::Kind>;

    /// Stop all timers, remembering how long they had left.
    fn pause(&mut self, _now: Instant) {}

    /// Re-anchor timers paused with `pause` to the current time.
    fn resume(&mut self, _now: Instant) {}

    fn id(&self) -> Id {
        self.body().id
    }

    fn pos(&self) -> Vec2 {
        self.body().pos()
    }
}
