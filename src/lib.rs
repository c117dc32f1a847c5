pub mod config;
pub mod driver;
pub mod gif;
pub mod grid;
pub mod parse_lif;
pub mod patterns;
pub mod placement;
pub mod render;

mod parse_util;

/// Age of a cell, in generations. `0` is dead.
pub type Age = u32;

/// Signed pattern coordinate. Pattern files place cells relative to an origin, so these can be
/// negative until they are mapped onto a grid.
pub type Coord = i64;
