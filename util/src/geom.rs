use std::{
    f32::consts::{PI, TAU},
    fmt,
    str::FromStr,
};

use glam::{vec2, IVec2, Vec2};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// 8 directions, clock face order.
pub const DIR_8: [IVec2; 8] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([1, 1]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([-1, 0]),
    IVec2::from_array([-1, -1]),
];

/// 4 directions, clock face order.
pub const DIR_4: [IVec2; 4] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 0]),
];

/// Integer cell vector helpers.
pub trait VecExt: Sized + Default {
    /// Absolute size of vector in chessboard metric.
    fn chess_len(&self) -> i32;

    /// Point at the middle of the unit cell.
    fn center(&self) -> Vec2;
}

impl VecExt for IVec2 {
    fn chess_len(&self) -> i32 {
        self[0].abs().max(self[1].abs())
    }

    fn center(&self) -> Vec2 {
        self.as_vec2() + vec2(0.5, 0.5)
    }
}

/// Continuous point helpers.
pub trait PointExt: Sized {
    /// Integer cell containing the point, components truncated towards
    /// zero.
    fn cell(&self) -> IVec2;

    /// Decompose a vector into a unit direction and a length.
    ///
    /// Zero-length vectors get a zero direction instead of NaNs.
    fn split_direction(&self) -> (Self, f32);
}

impl PointExt for Vec2 {
    fn cell(&self) -> IVec2 {
        self.as_ivec2()
    }

    fn split_direction(&self) -> (Self, f32) {
        let len = self.length();
        if len > f32::EPSILON {
            (*self / len, len)
        } else {
            (Vec2::ZERO, 0.0)
        }
    }
}

/// Angle type, uses radians internally.
///
/// Angles use clock face convention, zero points at twelve o'clock, value
/// increases clockwise, rather than mathematical convention.
#[derive(
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Default,
    Debug,
    DeserializeFromStr,
    SerializeDisplay,
)]
pub struct Angle(f32);

impl Angle {
    /// Initialize a new angle from a degree value.
    pub fn new(deg: f32) -> Self {
        Angle(deg * TAU / 360.0)
    }

    /// Snap the angle to its standard domain.
    pub fn normalize(self) -> Self {
        Angle((self.0 + PI).rem_euclid(TAU) - PI)
    }

    /// Absolute value of angle in degrees.
    pub fn abs(self) -> f32 {
        self.normalize().deg().abs()
    }

    /// Return the degree value of the angle.
    pub fn deg(self) -> f32 {
        self.0 * 360.0 / TAU
    }
}

impl From<Vec2> for Angle {
    fn from(value: Vec2) -> Self {
        Angle(value.x.atan2(-value.y))
    }
}

impl From<Angle> for Vec2 {
    fn from(value: Angle) -> Self {
        vec2(value.0.sin(), -value.0.cos())
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.deg())
    }
}

impl FromStr for Angle {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Angle::new(s.parse()?))
    }
}

impl std::ops::Add<Angle> for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Self::Output {
        Angle(self.0 + rhs.0)
    }
}

impl std::ops::Sub<Angle> for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Self::Output {
        Angle(self.0 - rhs.0)
    }
}
