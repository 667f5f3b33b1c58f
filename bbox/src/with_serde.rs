use crate::{common::*, BBox3};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

// Boxes are stored as flat `[x, y, z, dx, dy, dz]` arrays.

impl<T> Serialize for BBox3<T>
where
    T: Serialize + Copy,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        <[T; 6]>::from(*self).serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for BBox3<T>
where
    T: Deserialize<'de> + Copy + Num + PartialOrd,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let xyzd = <[T; 6]>::deserialize(deserializer)?;
        Self::try_from(xyzd).map_err(|err| D::Error::custom(format!("{:#}", err)))
    }
}
