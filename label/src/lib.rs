//! Annotation labels for EM patches.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

pub use strum::IntoEnumIterator;

/// Category an annotator assigns to one patch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Label {
    Clean,
    Debris,
    Myelin,
}

impl Label {
    /// Class index used as a numeric training target.
    pub fn target_index(&self) -> usize {
        match self {
            Self::Clean => 0,
            Self::Debris => 1,
            Self::Myelin => 2,
        }
    }

    pub fn from_target_index(index: usize) -> Result<Self> {
        Self::iter()
            .find(|label| label.target_index() == index)
            .ok_or_else(|| anyhow::anyhow!("invalid target index {}", index))
    }

    /// The `[debris, myelin]` pair of binary targets.
    pub fn binary_targets(&self) -> [u8; 2] {
        match self {
            Self::Clean => [0, 0],
            Self::Debris => [1, 0],
            Self::Myelin => [0, 1],
        }
    }

    pub fn from_binary_targets(targets: [u8; 2]) -> Result<Self> {
        let label = match targets {
            [0, 0] => Self::Clean,
            [1, 0] => Self::Debris,
            [0, 1] => Self::Myelin,
            _ => bail!("invalid binary targets {:?}", targets),
        };
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn label_string_conversion() {
        assert_eq!(Label::from_str("debris").unwrap(), Label::Debris);
        assert_eq!(Label::from_str("Myelin").unwrap(), Label::Myelin);
        assert_eq!(Label::from_str("CLEAN").unwrap(), Label::Clean);
        assert!(Label::from_str("dirt").is_err());
        assert_eq!(Label::Debris.to_string(), "debris");
        assert_eq!(Label::Clean.as_ref(), "clean");
    }

    #[test]
    fn label_targets() {
        for label in Label::iter() {
            assert_eq!(Label::from_target_index(label.target_index()).unwrap(), label);
            assert_eq!(
                Label::from_binary_targets(label.binary_targets()).unwrap(),
                label
            );
        }
        assert_eq!(Label::COUNT, 3);
        assert!(Label::from_target_index(3).is_err());
        assert!(Label::from_binary_targets([1, 1]).is_err());
    }

    #[test]
    fn label_serde() {
        let text = serde_json::to_string(&Label::Myelin).unwrap();
        assert_eq!(text, "\"myelin\"");
        let label: Label = serde_json::from_str("\"clean\"").unwrap();
        assert_eq!(label, Label::Clean);
    }
}
