//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use indexmap::IndexMap;
pub use itertools::{izip, Itertools as _};
pub use log::{debug, info, warn};
pub use noisy_float::prelude::*;
pub use serde::{
    de::Error as _, Deserialize, Deserializer, Serialize, Serializer,
};
pub use serde_json::{Map, Value};
pub use std::{
    fs,
    path::{Path, PathBuf},
};
