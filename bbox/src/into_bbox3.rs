use crate::{common::*, BBox3};

impl<T> TryFrom<[T; 6]> for BBox3<T>
where
    T: Copy + Num + PartialOrd,
{
    type Error = anyhow::Error;

    fn try_from(from: [T; 6]) -> Result<Self, Self::Error> {
        Self::try_from_xyzd(from)
    }
}

impl<T> From<BBox3<T>> for [T; 6] {
    fn from(from: BBox3<T>) -> Self {
        let BBox3 {
            x,
            y,
            z,
            dx,
            dy,
            dz,
        } = from;
        [x, y, z, dx, dy, dz]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_array_conversion() {
        let bbox = BBox3::try_from([25000i64, 13000, 3000, 140, 140, 1]).unwrap();
        assert_eq!(bbox.corner_min(), [25000, 13000, 3000]);

        let xyzd: [i64; 6] = bbox.into();
        assert_eq!(xyzd, [25000, 13000, 3000, 140, 140, 1]);

        assert!(BBox3::try_from([0, 0, 0, 140, -140, 1]).is_err());
    }
}
