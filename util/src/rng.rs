use std::{
    f32::consts::TAU,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use anyhow::bail;
use derive_more::Deref;
use glam::Vec2;
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::Angle;

/// Construct a throwaway random number generator seeded by a noise value.
///
/// Good for short-term use in immutable contexts given a varying source of
/// noise like map position coordinates.
pub fn srng(seed: &(impl Hash + ?Sized)) -> XorShiftRng {
    let mut h = crate::FastHasher::default();
    seed.hash(&mut h);
    XorShiftRng::seed_from_u64(h.finish())
}

/// Strings that are normalized to be case, whitespace and punctuation
/// insensitive. Use as RNG seeds so that trivial transcription errors like an
/// added space can't mess up the seed.
///
/// ```
/// # use util::{Logos, srng};
/// use rand::prelude::*;
///
/// assert_ne!(
///   srng("pAss Word").gen_range(0..1000),
///   srng("password").gen_range(0..1000));
///
/// assert_eq!(
///   srng(&Logos::new("pAss Word")).gen_range(0..1000),
///   srng(&Logos::new("password")).gen_range(0..1000));
/// ```
#[derive(
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    Deref,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Logos(String);

impl fmt::Display for Logos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromIterator<char> for Logos {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        const MAX_LEN: usize = 64;

        Logos(
            iter.into_iter()
                .map(|c| c.to_ascii_uppercase())
                .filter(char::is_ascii_alphanumeric)
                .take(MAX_LEN)
                .collect(),
        )
    }
}

impl Logos {
    /// Construct a new logos, stripping out punctuation, whitespace,
    /// character case and non-ASCII characters from the input.
    pub fn new(s: impl AsRef<str>) -> Self {
        s.as_ref().chars().collect()
    }

    /// Generate a random logos of `len` characters.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Logos {
        const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Fold the logos into a seed value for a generator.
    pub fn seed(&self) -> u64 {
        let mut h = crate::FastHasher::default();
        self.hash(&mut h);
        h.finish()
    }
}

impl FromStr for Logos {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            bail!("not a valid logos")
        } else {
            Ok(Logos(s.into()))
        }
    }
}

pub trait RngExt {
    /// Uniformly distributed point inside a disc.
    fn point_in_disc(&mut self, center: Vec2, radius: f32) -> Vec2;

    /// Unit vector deviating from `dir` by at most half of `spread_deg`
    /// either way.
    fn dir_in_cone(&mut self, dir: Vec2, spread_deg: f32) -> Vec2;
}

impl<T: Rng + ?Sized> RngExt for T {
    fn point_in_disc(&mut self, center: Vec2, radius: f32) -> Vec2 {
        let a = self.gen_range(0.0..TAU);
        // Square root keeps the density uniform over the disc area.
        let r = radius * self.gen_range(0.0f32..1.0).sqrt();
        center + Vec2::new(a.cos(), a.sin()) * r
    }

    fn dir_in_cone(&mut self, dir: Vec2, spread_deg: f32) -> Vec2 {
        let half = spread_deg.abs() / 2.0;
        let offset = if half > 0.0 {
            self.gen_range(-half..=half)
        } else {
            0.0
        };
        Vec2::from(Angle::from(dir) + Angle::new(offset))
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    #[quickcheck]
    fn disc_points_stay_inside(seed: u64, r: u8) -> bool {
        let r = r as f32 + 0.5;
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let p = rng.point_in_disc(Vec2::ZERO, r);
        p.length() <= r + 1e-3
    }

    #[quickcheck]
    fn cone_stays_within_spread(seed: u64) -> bool {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let dir = Vec2::new(1.0, 0.0);
        let v = rng.dir_in_cone(dir, 60.0);
        (Angle::from(v) - Angle::from(dir)).abs() <= 30.0 + 1e-3
    }

    #[test]
    fn logos_seed_is_normalized() {
        assert_eq!(Logos::new("pAss Word").seed(), Logos::new("password").seed());
    }
}
