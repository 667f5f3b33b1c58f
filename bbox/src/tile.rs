use crate::{common::*, BBox3};

/// Grid of equally sized tiles aligned to multiples of the tile extent and
/// fully contained in a template box.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileGrid<T> {
    origin: [T; 3],
    extent: [T; 3],
    shape: [usize; 3],
}

impl<T> TileGrid<T>
where
    T: PrimInt + Signed,
{
    pub fn new(template: &BBox3<T>, extent: [T; 3]) -> Result<Self> {
        ensure!(
            extent.iter().all(|&ext| ext > T::zero()),
            "tile extent must be positive"
        );

        let lower = template.corner_min();
        let upper = template.corner_max();
        let mut origin = [T::zero(); 3];
        let mut shape = [0usize; 3];

        for dim in 0..3 {
            let ext = extent[dim];
            let begin = ceil_div(lower[dim], ext) * ext;
            let end = floor_div(upper[dim], ext) * ext;
            origin[dim] = begin;
            shape[dim] = if end > begin {
                ((end - begin) / ext).to_usize().unwrap_or(0)
            } else {
                0
            };
        }

        Ok(Self {
            origin,
            extent,
            shape,
        })
    }

    /// Number of tiles along x, y and z.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tile at linear index `index`, enumerated x-major then y then z.
    pub fn get(&self, index: usize) -> Option<BBox3<T>> {
        if index >= self.len() {
            return None;
        }

        let [_, ny, nz] = self.shape;
        let ix = index / (ny * nz);
        let iy = (index / nz) % ny;
        let iz = index % nz;

        let corner = |dim: usize, offset: usize| -> Option<T> {
            let offset = <T as NumCast>::from(offset)?;
            Some(self.origin[dim] + offset * self.extent[dim])
        };

        let [ex, ey, ez] = self.extent;
        Some(BBox3 {
            x: corner(0, ix)?,
            y: corner(1, iy)?,
            z: corner(2, iz)?,
            dx: ex,
            dy: ey,
            dz: ez,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = BBox3<T>> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }
}

impl<T> BBox3<T>
where
    T: PrimInt + Signed,
{
    /// All aligned tiles of size `extent` inside this box.
    pub fn tiles(&self, extent: [T; 3]) -> Result<Vec<Self>> {
        let grid = TileGrid::new(self, extent)?;
        Ok(grid.iter().collect())
    }

    /// The `index`-th aligned tile of size `extent` inside this box.
    pub fn tile_at(&self, extent: [T; 3], index: usize) -> Result<Self> {
        let grid = TileGrid::new(self, extent)?;
        let len = grid.len();
        grid.get(index)
            .ok_or_else(|| anyhow::anyhow!("tile index {} is out of range 0..{}", index, len))
    }
}

fn floor_div<T>(lhs: T, rhs: T) -> T
where
    T: PrimInt + Signed,
{
    let quot = lhs / rhs;
    let rem = lhs % rhs;
    if rem != T::zero() && (rem < T::zero()) != (rhs < T::zero()) {
        quot - T::one()
    } else {
        quot
    }
}

fn ceil_div<T>(lhs: T, rhs: T) -> T
where
    T: PrimInt + Signed,
{
    -floor_div(-lhs, rhs)
}
