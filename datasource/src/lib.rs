//! Data source records describing volume regions and their targets, plus the
//! JSON formats they are exchanged in.

mod common;

pub mod json;
pub mod ops;
pub mod source;

pub use json::*;
pub use ops::*;
pub use source::*;
