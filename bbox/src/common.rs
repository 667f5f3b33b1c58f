pub use anyhow::{ensure, Result};
pub use num_traits::{Num, NumCast, PrimInt, Signed, ToPrimitive};
pub use std::ops::Range;
