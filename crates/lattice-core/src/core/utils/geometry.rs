use crate::core::models::volume::Mask;
use ndarray::s;

/// An axis-aligned ellipsoid in voxel coordinates.
///
/// Both `center` and `radii` are in canonical `(slice, row, column)` order. Radii must be
/// strictly positive; configuration validation rejects anything else before an ellipsoid
/// is ever built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub center: [f64; 3],
    pub radii: [f64; 3],
}

impl Ellipsoid {
    pub fn new(center: [f64; 3], radii: [f64; 3]) -> Self {
        debug_assert!(radii.iter().all(|r| *r > 0.0), "ellipsoid radii must be positive");
        Self { center, radii }
    }

    #[inline]
    pub fn contains(&self, z: f64, y: f64, x: f64) -> bool {
        let [cz, cy, cx] = self.center;
        let [rz, ry, rx] = self.radii;
        ((z - cz) / rz).powi(2) + ((y - cy) / ry).powi(2) + ((x - cx) / rx).powi(2) <= 1.0
    }

    /// Half-open index range covering the ellipsoid along `axis`, clipped to `0..len`.
    fn index_range(&self, axis: usize, len: usize) -> (usize, usize) {
        let lo = (self.center[axis] - self.radii[axis]).trunc().max(0.0);
        let hi = (self.center[axis] + self.radii[axis] + 1.0)
            .trunc()
            .clamp(0.0, len as f64);
        (lo as usize, hi as usize)
    }
}

/// Marks every voxel inside `ellipsoid` as true.
///
/// Voxels that are already set are never cleared, so rasterizing the same ellipsoid twice
/// is a no-op the second time. Returns the number of voxels that changed from false to true.
pub fn rasterize_ellipsoid(mask: &mut Mask, ellipsoid: &Ellipsoid) -> usize {
    let (nz, ny, nx) = mask.dim();
    let (z0, z1) = ellipsoid.index_range(0, nz);
    let (y0, y1) = ellipsoid.index_range(1, ny);
    let (x0, x1) = ellipsoid.index_range(2, nx);
    if z0 >= z1 || y0 >= y1 || x0 >= x1 {
        return 0;
    }

    let mut newly_set = 0;
    let mut window = mask.slice_mut(s![z0..z1, y0..y1, x0..x1]);
    for ((dz, dy, dx), voxel) in window.indexed_iter_mut() {
        if *voxel {
            continue;
        }
        if ellipsoid.contains((z0 + dz) as f64, (y0 + dy) as f64, (x0 + dx) as f64) {
            *voxel = true;
            newly_set += 1;
        }
    }
    newly_set
}
