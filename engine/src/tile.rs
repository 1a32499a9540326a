use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use util::PointExt;

/// Placement of a simulated object in the world plane.
///
/// `kind` is the display and logic category of the object, `variant` picks
/// between alternative looks of the same kind.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Tile<T> {
    pub pos: Vec2,
    pub kind: T,
    #[serde(default)]
    pub variant: u16,
}

impl<T> Tile<T> {
    pub fn new(pos: Vec2, kind: T) -> Self {
        Tile {
            pos,
            kind,
            variant: 0,
        }
    }

    pub fn with_variant(mut self, variant: u16) -> Self {
        self.variant = variant;
        self
    }

    /// Integer cell the tile is in.
    pub fn cell(&self) -> IVec2 {
        self.pos.cell()
    }
}
