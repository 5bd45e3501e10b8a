use super::volume::VolumeShape;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Slice thickness used when the series geometry gives no usable value.
pub const DEFAULT_SLICE_THICKNESS_MM: f64 = 1.0;

/// Physical size of a voxel in millimetres.
///
/// Components are stored in `(column, row, slice)` order, i.e. `x`, `y`, `z` of the
/// underlying vector. Every component is finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelSpacing {
    mm: Vector3<f64>,
}

impl VoxelSpacing {
    pub fn new(column_mm: f64, row_mm: f64, slice_mm: f64) -> Option<Self> {
        let mm = Vector3::new(column_mm, row_mm, slice_mm);
        if mm.iter().all(|v| v.is_finite() && *v > 0.0) {
            Some(Self { mm })
        } else {
            None
        }
    }

    pub fn column(&self) -> f64 {
        self.mm.x
    }

    pub fn row(&self) -> f64 {
        self.mm.y
    }

    pub fn slice(&self) -> f64 {
        self.mm.z
    }

    /// Spacing in canonical `(slice, row, column)` order, as used for distance sampling.
    pub fn sampling(&self) -> [f64; 3] {
        [self.mm.z, self.mm.y, self.mm.x]
    }

    /// Converts a physical length into per-axis voxel counts, `(column, row, slice)`.
    pub fn mm_to_voxels(&self, length_mm: f64) -> Vector3<f64> {
        Vector3::from_iterator(self.mm.iter().map(|axis| length_mm / axis))
    }

    /// In-plane display aspect ratio (row spacing over column spacing).
    pub fn aspect_ratio(&self) -> f64 {
        self.mm.y / self.mm.x
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SliceGeometry {
    /// Patient-space position of the first transmitted pixel, in millimetres.
    pub image_position_patient: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice_thickness: Option<f64>,
}

/// Geometry of an ordered imaging series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeriesGeometry {
    pub rows: usize,
    pub columns: usize,
    /// `[row spacing, column spacing]` in millimetres.
    pub pixel_spacing: [f64; 2],
    pub slices: Vec<SliceGeometry>,
}

impl SeriesGeometry {
    pub fn shape(&self) -> VolumeShape {
        VolumeShape::new(self.slices.len(), self.rows, self.columns)
    }

    pub fn row_spacing(&self) -> f64 {
        self.pixel_spacing[0]
    }

    pub fn column_spacing(&self) -> f64 {
        self.pixel_spacing[1]
    }

    /// Distance between slices in millimetres.
    ///
    /// With two or more slices this is the separation of the first two positions. Only a
    /// single-slice series falls back to its declared thickness. Anything degenerate
    /// becomes [`DEFAULT_SLICE_THICKNESS_MM`], so the result is always positive.
    pub fn slice_thickness_mm(&self) -> f64 {
        let candidate = match self.slices.as_slice() {
            [first, second, ..] => {
                Some((first.image_position_patient[2] - second.image_position_patient[2]).abs())
            }
            [only] => only.slice_thickness,
            [] => None,
        };
        candidate
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_SLICE_THICKNESS_MM)
    }

    /// Index of the slice whose position is closest to `z`, if within half a slice gap.
    pub fn slice_index_for(&self, z: f64, tolerance_mm: f64) -> Option<usize> {
        self.slices
            .iter()
            .enumerate()
            .map(|(i, s)| (i, (s.image_position_patient[2] - z).abs()))
            .filter(|(_, d)| *d <= tolerance_mm)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Patient-space position of the centre of pixel `(row, column)` on `slice`.
    ///
    /// The series is assumed to be axis aligned (identity direction cosines).
    pub fn pixel_to_patient(&self, slice: usize, row: usize, column: usize) -> Option<Point3<f64>> {
        let origin = self.slices.get(slice)?.image_position_patient;
        Some(Point3::new(
            origin[0] + column as f64 * self.column_spacing(),
            origin[1] + row as f64 * self.row_spacing(),
            origin[2],
        ))
    }

    /// Fractional `(row, column)` pixel coordinates of an in-plane patient position.
    pub fn patient_to_pixel(&self, slice: usize, x: f64, y: f64) -> Option<(f64, f64)> {
        let origin = self.slices.get(slice)?.image_position_patient;
        Some((
            (y - origin[1]) / self.row_spacing(),
            (x - origin[0]) / self.column_spacing(),
        ))
    }
}
