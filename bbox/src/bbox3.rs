use crate::common::*;

/// Axis-aligned box in a 3D volume, stored as corner plus extents.
///
/// The extents are guaranteed to be non-negative. The corner may be
/// anywhere, including negative coordinates produced by margin expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BBox3<T> {
    pub(crate) x: T,
    pub(crate) y: T,
    pub(crate) z: T,
    pub(crate) dx: T,
    pub(crate) dy: T,
    pub(crate) dz: T,
}

impl<T> BBox3<T> {
    pub fn try_cast<V>(self) -> Option<BBox3<V>>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        Some(BBox3 {
            x: V::from(self.x)?,
            y: V::from(self.y)?,
            z: V::from(self.z)?,
            dx: V::from(self.dx)?,
            dy: V::from(self.dy)?,
            dz: V::from(self.dz)?,
        })
    }

    pub fn cast<V>(self) -> BBox3<V>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        self.try_cast().unwrap()
    }
}

impl<T> BBox3<T>
where
    T: Copy + Num + PartialOrd,
{
    pub fn try_from_xyzd(xyzd: [T; 6]) -> Result<Self> {
        let [x, y, z, dx, dy, dz] = xyzd;
        let zero = T::zero();
        ensure!(
            dx >= zero && dy >= zero && dz >= zero,
            "dx, dy and dz must be non-negative"
        );
        Ok(Self {
            x,
            y,
            z,
            dx,
            dy,
            dz,
        })
    }

    /// Build a box from corner and extents.
    ///
    /// # Panics
    /// If any extent is negative.
    pub fn from_xyzd(xyzd: [T; 6]) -> Self {
        Self::try_from_xyzd(xyzd).unwrap()
    }

    pub fn try_from_corners(min: [T; 3], max: [T; 3]) -> Result<Self> {
        let [x, y, z] = min;
        let [xe, ye, ze] = max;
        Self::try_from_xyzd([x, y, z, xe - x, ye - y, ze - z])
    }

    pub fn x(&self) -> T {
        self.x
    }

    pub fn y(&self) -> T {
        self.y
    }

    pub fn z(&self) -> T {
        self.z
    }

    pub fn dx(&self) -> T {
        self.dx
    }

    pub fn dy(&self) -> T {
        self.dy
    }

    pub fn dz(&self) -> T {
        self.dz
    }

    pub fn xyzd(&self) -> [T; 6] {
        [self.x, self.y, self.z, self.dx, self.dy, self.dz]
    }

    pub fn corner_min(&self) -> [T; 3] {
        [self.x, self.y, self.z]
    }

    /// The exclusive upper corner.
    pub fn corner_max(&self) -> [T; 3] {
        [self.x + self.dx, self.y + self.dy, self.z + self.dz]
    }

    pub fn extent(&self) -> [T; 3] {
        [self.dx, self.dy, self.dz]
    }

    pub fn volume(&self) -> T {
        self.dx * self.dy * self.dz
    }

    /// Grow the box by `margin` on both sides of the x and y axes.
    ///
    /// The z axis is left untouched. The result is not clipped to any
    /// volume, so the corner may become negative.
    pub fn expand_margin(&self, margin: T) -> Self {
        let two = T::one() + T::one();
        Self {
            x: self.x - margin,
            y: self.y - margin,
            z: self.z,
            dx: self.dx + margin * two,
            dy: self.dy + margin * two,
            dz: self.dz,
        }
    }

    /// Undo [expand_margin](Self::expand_margin) with the same margin.
    pub fn try_shrink_margin(&self, margin: T) -> Result<Self> {
        let two = T::one() + T::one();
        let dx = self.dx - margin * two;
        let dy = self.dy - margin * two;
        let zero = T::zero();
        ensure!(
            dx >= zero && dy >= zero,
            "margin is larger than half of the box extent"
        );

        Ok(Self {
            x: self.x + margin,
            y: self.y + margin,
            z: self.z,
            dx,
            dy,
            dz: self.dz,
        })
    }

    pub fn shrink_margin(&self, margin: T) -> Self {
        self.try_shrink_margin(margin).unwrap()
    }

    pub fn contains(&self, other: &Self) -> bool {
        let min_l = self.corner_min();
        let max_l = self.corner_max();
        let min_r = other.corner_min();
        let max_r = other.corner_max();

        (0..3).all(|dim| min_l[dim] <= min_r[dim] && max_r[dim] <= max_l[dim])
    }

    pub fn intersect_with(&self, other: &Self) -> Option<Self> {
        let min_l = self.corner_min();
        let max_l = self.corner_max();
        let min_r = other.corner_min();
        let max_r = other.corner_max();

        let max_of = |a: T, b: T| if a >= b { a } else { b };
        let min_of = |a: T, b: T| if a <= b { a } else { b };

        let lower = [
            max_of(min_l[0], min_r[0]),
            max_of(min_l[1], min_r[1]),
            max_of(min_l[2], min_r[2]),
        ];
        let upper = [
            min_of(max_l[0], max_r[0]),
            min_of(max_l[1], max_r[1]),
            min_of(max_l[2], max_r[2]),
        ];

        if (0..3).any(|dim| upper[dim] <= lower[dim]) {
            return None;
        }
        Self::try_from_corners(lower, upper).ok()
    }
}
