//! Unopinionated standalone utilities.

mod area;
pub use area::Area;

mod geom;
pub use geom::{Angle, PointExt, VecExt, DIR_4, DIR_8};

mod rng;
pub use rng::{srng, Logos, RngExt};

pub type FastHasher = rustc_hash::FxHasher;

/// Map with an efficient hash function.
pub use rustc_hash::FxHashMap as HashMap;

/// Set with an efficient hash function.
pub use rustc_hash::FxHashSet as HashSet;

type DefaultHashBuilder = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Insertion order preserving map with an efficient hash function.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, DefaultHashBuilder>;

/// Good default concrete rng.
pub type GameRng = rand_xorshift::XorShiftRng;
