use ndarray::{Array3, Axis};

/// A boolean voxel volume.
///
/// Inside the library every mask is stored in the canonical `(slice, row, column)` axis
/// order. Imaging collaborators exchange masks in `(row, column, slice)` order; use
/// [`to_canonical`] and [`to_collaborator`] at that boundary and nowhere else.
pub type Mask = Array3<bool>;

/// Per-voxel physical distances in millimetres, same layout as [`Mask`].
pub type DistanceMap = Array3<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VolumeShape {
    pub slices: usize,
    pub rows: usize,
    pub columns: usize,
}

impl VolumeShape {
    pub fn new(slices: usize, rows: usize, columns: usize) -> Self {
        Self {
            slices,
            rows,
            columns,
        }
    }

    pub fn of(mask: &Mask) -> Self {
        let (slices, rows, columns) = mask.dim();
        Self::new(slices, rows, columns)
    }

    /// Canonical `(slice, row, column)` dimensions.
    pub fn dim(&self) -> (usize, usize, usize) {
        (self.slices, self.rows, self.columns)
    }

    /// Collaborator `(row, column, slice)` dimensions.
    pub fn collaborator_dim(&self) -> (usize, usize, usize) {
        (self.rows, self.columns, self.slices)
    }

    pub fn voxel_count(&self) -> usize {
        self.slices * self.rows * self.columns
    }

    pub fn empty_mask(&self) -> Mask {
        Mask::from_elem(self.dim(), false)
    }
}

/// Inclusive index bounds of the true voxels of a mask, in `(slice, row, column)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: [usize; 3],
    pub max: [usize; 3],
}

/// Converts a collaborator-ordered `(row, column, slice)` mask to canonical order.
pub fn to_canonical(mask: Mask) -> Mask {
    mask.permuted_axes([2, 0, 1])
        .as_standard_layout()
        .into_owned()
}

/// Converts a canonical `(slice, row, column)` mask back to collaborator order.
pub fn to_collaborator(mask: &Mask) -> Mask {
    mask.view()
        .permuted_axes([1, 2, 0])
        .as_standard_layout()
        .into_owned()
}

pub fn count_true(mask: &Mask) -> usize {
    mask.iter().filter(|&&v| v).count()
}

pub fn bounding_box(mask: &Mask) -> Option<BoundingBox> {
    let mut bounds: Option<BoundingBox> = None;
    for ((z, y, x), &value) in mask.indexed_iter() {
        if !value {
            continue;
        }
        let index = [z, y, x];
        match bounds.as_mut() {
            None => {
                bounds = Some(BoundingBox {
                    min: index,
                    max: index,
                })
            }
            Some(b) => {
                for axis in 0..3 {
                    b.min[axis] = b.min[axis].min(index[axis]);
                    b.max[axis] = b.max[axis].max(index[axis]);
                }
            }
        }
    }
    bounds
}

/// Returns `true` when every true voxel of `inner` is also true in `outer`.
pub fn is_subset(inner: &Mask, outer: &Mask) -> bool {
    inner.dim() == outer.dim() && inner.iter().zip(outer.iter()).all(|(&i, &o)| !i || o)
}

/// Number of slices that contain at least one true voxel.
pub fn occupied_slices(mask: &Mask) -> usize {
    mask.axis_iter(Axis(0))
        .filter(|plane| plane.iter().any(|&v| v))
        .count()
}
