//! Safe 3D bounding box types and functions.

mod common;

pub use bbox3::*;
pub mod bbox3;

mod into_bbox3;

pub use tile::*;
pub mod tile;

#[cfg(feature = "serde")]
mod with_serde;
