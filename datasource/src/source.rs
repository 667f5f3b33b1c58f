use crate::common::*;
use bbox::BBox3;
use label::Label;

/// Placeholder the data-source files use for unset fields.
pub const UNSET: &str = "NaN";

/// Prefix of the per-source keys in data-source files.
pub const KEY_PREFIX: &str = "datasource_";

/// One volume region used to build a sample, with optional target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, with = "unset_or")]
    pub input_path: Option<PathBuf>,
    #[serde(default, with = "unset_or")]
    pub input_bbox: Option<BBox3<i64>>,
    #[serde(default, with = "unset_or")]
    pub input_mean: Option<R64>,
    #[serde(default, with = "unset_or")]
    pub input_std: Option<R64>,
    #[serde(default, with = "unset_or")]
    pub target_path: Option<PathBuf>,
    #[serde(default, with = "unset_or")]
    pub target_bbox: Option<BBox3<i64>>,
    #[serde(default, with = "unset_or")]
    pub target_class: Option<Target>,
    #[serde(default, with = "unset_or")]
    pub target_binary: Option<Target>,
}

impl DataSource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            input_path: None,
            input_bbox: None,
            input_mean: None,
            input_std: None,
            target_path: None,
            target_bbox: None,
            target_class: None,
            target_binary: None,
        }
    }

    /// The key this source is stored under in a data-source file.
    pub fn key(&self) -> String {
        format!("{}{}", KEY_PREFIX, self.id)
    }

    pub fn try_input_bbox(&self) -> Result<&BBox3<i64>> {
        self.input_bbox
            .as_ref()
            .ok_or_else(|| format_err!("data source '{}' has no input_bbox", self.id))
    }

    pub fn label(&self) -> Option<Label> {
        self.target_class.as_ref()?.to_label()
    }
}

/// Target value of a data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    /// Single class index or binary flag.
    Scalar(R64),
    /// One binary flag per target column.
    Vector(Vec<R64>),
}

/// How annotation labels are written into [Target] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// The label's class index.
    Index,
    /// The `[debris, myelin]` pair.
    Binary,
}

impl Default for TargetKind {
    fn default() -> Self {
        Self::Binary
    }
}

impl Target {
    pub fn from_label(label: Label, kind: TargetKind) -> Self {
        match kind {
            TargetKind::Index => Self::Scalar(r64(label.target_index() as f64)),
            TargetKind::Binary => Self::Vector(
                label
                    .binary_targets()
                    .iter()
                    .map(|&flag| r64(flag as f64))
                    .collect(),
            ),
        }
    }

    /// Recover the label, if the value is a valid encoding of one.
    pub fn to_label(&self) -> Option<Label> {
        match self {
            Self::Scalar(value) => {
                let value = value.raw();
                (value >= 0.0 && value.fract() == 0.0)
                    .then(|| Label::from_target_index(value as usize).ok())
                    .flatten()
            }
            Self::Vector(values) => {
                let [debris, myelin]: [R64; 2] = values.as_slice().try_into().ok()?;
                let flag = |value: R64| -> Option<u8> {
                    if value == 0.0 {
                        Some(0)
                    } else if value == 1.0 {
                        Some(1)
                    } else {
                        None
                    }
                };
                Label::from_binary_targets([flag(debris)?, flag(myelin)?]).ok()
            }
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!(
            "id must be a string or an integer, but get {}",
            other
        ))),
    }
}

/// Serde adapter mapping `None` to the `"NaN"` placeholder.
pub mod unset_or {
    use super::UNSET;
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_str(UNSET),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: for<'a> Deserialize<'a>,
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(text) if text == UNSET => Ok(None),
            value => T::deserialize(value).map(Some).map_err(D::Error::custom),
        }
    }
}
