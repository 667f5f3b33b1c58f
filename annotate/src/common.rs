//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use bbox::BBox3;
pub use datasource::DataSource;
pub use indexmap::IndexMap;
pub use itertools::Itertools as _;
pub use label::Label;
pub use log::{debug, info, warn};
pub use serde::{Deserialize, Serialize};
pub use std::{
    collections::{BTreeMap, HashSet},
    env, fs,
    num::NonZeroUsize,
    ops::Range,
    path::{Path, PathBuf},
};
