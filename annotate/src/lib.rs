//! Batched manual annotation of EM patches.
//!
//! Samples are the input boxes of a data-source file. They are enlarged by a
//! margin for display, split into fixed-size index ranges so a long session
//! can be checkpointed, and the per-range results are merged and compared
//! afterwards.

mod common;

pub mod batch;
pub mod config;
pub mod partition;
pub mod report;
pub mod session;
pub mod store;

pub use batch::*;
pub use config::*;
pub use partition::*;
pub use report::*;
pub use session::*;
pub use store::*;
