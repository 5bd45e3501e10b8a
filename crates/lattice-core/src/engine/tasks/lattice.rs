use crate::core::models::series::VoxelSpacing;
use crate::core::models::volume::{BoundingBox, Mask, bounding_box};
use crate::core::utils::geometry::{Ellipsoid, rasterize_ellipsoid};
use crate::engine::config::PackingMode;
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use tracing::{debug, info, instrument, warn};

/// Distance between neighbouring grid points, in voxels, along `(slice, row, column)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStep {
    pub slice: f64,
    pub row: f64,
    pub column: f64,
}

impl GridStep {
    pub fn new(slice: f64, row: f64, column: f64) -> Result<Self, EngineError> {
        for (axis, value) in [("slice", slice), ("row", row), ("column", column)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::InvalidParameter {
                    parameter: "grid_step",
                    reason: format!(
                        "grid step along the {} axis must be a positive voxel count, got {}",
                        axis, value
                    ),
                });
            }
        }
        Ok(Self { slice, row, column })
    }

    /// Converts a centre-to-centre distance in millimetres into per-axis voxel steps.
    pub fn from_spacing(spacing_mm: f64, voxel: &VoxelSpacing) -> Result<Self, EngineError> {
        let steps = voxel.mm_to_voxels(spacing_mm);
        Self::new(steps.z, steps.y, steps.x)
    }
}

/// Decides how each slice plane of the grid is shifted within the plane.
pub trait PackingStrategy {
    /// `(row, column)` offset in voxels for the plane at enumeration index `plane`.
    fn plane_offset(&self, plane: usize, step: &GridStep) -> (f64, f64);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cubic;

impl PackingStrategy for Cubic {
    fn plane_offset(&self, _plane: usize, _step: &GridStep) -> (f64, f64) {
        (0.0, 0.0)
    }
}

/// Shifts every odd-indexed plane by half a step along rows and columns.
///
/// Parity is taken from the plane's position in the enumeration, not from its coordinate.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexagonalOffset;

impl PackingStrategy for HexagonalOffset {
    fn plane_offset(&self, plane: usize, step: &GridStep) -> (f64, f64) {
        if plane % 2 == 1 {
            (step.row / 2.0, step.column / 2.0)
        } else {
            (0.0, 0.0)
        }
    }
}

pub fn strategy_for(mode: PackingMode) -> &'static dyn PackingStrategy {
    match mode {
        PackingMode::Cubic => &Cubic,
        PackingMode::HexagonalOffset => &HexagonalOffset,
    }
}

/// Evenly spaced values in the half-open interval `[start, stop)`.
fn arange(start: f64, stop: f64, step: f64) -> impl Iterator<Item = f64> + Clone {
    let count = if stop > start {
        ((stop - start) / step).ceil() as usize
    } else {
        0
    };
    (0..count).map(move |k| start + k as f64 * step)
}

/// Candidate sphere centres covering a bounding box, in voxel coordinates.
pub struct CandidateGrid<'s> {
    bounds: BoundingBox,
    step: GridStep,
    strategy: &'s dyn PackingStrategy,
}

impl<'s> CandidateGrid<'s> {
    pub fn new(bounds: BoundingBox, step: GridStep, strategy: &'s dyn PackingStrategy) -> Self {
        Self {
            bounds,
            step,
            strategy,
        }
    }

    /// Slice coordinates of the grid planes, paired with their enumeration index.
    pub fn planes(&self) -> impl Iterator<Item = (usize, f64)> {
        arange(
            self.bounds.min[0] as f64,
            self.bounds.max[0] as f64,
            self.step.slice,
        )
        .enumerate()
    }

    pub fn plane_count(&self) -> usize {
        self.planes().count()
    }

    /// In-plane candidates of the plane at enumeration index `plane`, row by row.
    pub fn plane_centers(&self, plane: usize, z: f64) -> impl Iterator<Item = [f64; 3]> {
        let (row_offset, column_offset) = self.strategy.plane_offset(plane, &self.step);
        let rows = arange(
            self.bounds.min[1] as f64 + row_offset,
            self.bounds.max[1] as f64,
            self.step.row,
        );
        let columns = arange(
            self.bounds.min[2] as f64 + column_offset,
            self.bounds.max[2] as f64,
            self.step.column,
        );
        rows.flat_map(move |y| columns.clone().map(move |x| [z, y, x]))
    }

    /// Every candidate centre, plane by plane.
    pub fn centers(&self) -> impl Iterator<Item = [f64; 3]> {
        self.planes().flat_map(move |(plane, z)| self.plane_centers(plane, z))
    }
}

/// Truncates a real-valued centre to the voxel that contains it, if it lies in the volume.
fn voxel_index(center: [f64; 3], dim: (usize, usize, usize)) -> Option<[usize; 3]> {
    let extents = [dim.0, dim.1, dim.2];
    let mut index = [0usize; 3];
    for axis in 0..3 {
        let value = center[axis].trunc();
        if !(value >= 0.0 && value < extents[axis] as f64) {
            return None;
        }
        index[axis] = value as usize;
    }
    Some(index)
}

#[derive(Debug, Clone)]
pub struct LatticeResult {
    /// Union of every placed sphere, in canonical order.
    pub mask: Mask,
    /// Voxel index of each placed sphere centre, in placement order.
    pub centers: Vec<[usize; 3]>,
    pub step: GridStep,
    pub radii_voxels: [f64; 3],
}

impl LatticeResult {
    pub fn sphere_count(&self) -> usize {
        self.centers.len()
    }
}

/// Places spheres on the packing grid wherever the grid point falls on an eligible voxel.
///
/// Placing no sphere at all is not an error; callers decide how to surface it.
///
/// # Errors
///
/// Returns [`EngineError::InvalidParameter`] when the centre spacing resolves to a
/// non-positive voxel step, and [`EngineError::InsufficientSpace`] when `eligible` is empty.
#[instrument(skip_all, name = "lattice_generator")]
pub fn run(eligible: &Mask, context: &PipelineContext) -> Result<LatticeResult, EngineError> {
    let sphere = &context.config.sphere;
    let step = GridStep::from_spacing(sphere.spacing_mm, &context.spacing)?;
    let bounds = bounding_box(eligible).ok_or(EngineError::InsufficientSpace {
        required_mm: sphere.clearance_mm(),
    })?;

    let radii = context.spacing.mm_to_voxels(sphere.radius_mm());
    let radii_voxels = [radii.z, radii.y, radii.x];
    if radii_voxels.iter().any(|r| !(r.is_finite() && *r > 0.0)) {
        return Err(EngineError::InvalidParameter {
            parameter: "diameter_mm",
            reason: format!("sphere radius resolves to {:?} voxels", radii_voxels),
        });
    }

    let grid = CandidateGrid::new(bounds, step, strategy_for(sphere.packing));
    debug!(
        ?step,
        ?bounds,
        ?radii_voxels,
        packing = %sphere.packing,
        "Enumerating candidate centres."
    );

    let mut mask = Mask::from_elem(eligible.raw_dim(), false);
    let mut centers = Vec::new();
    let mut candidates = 0usize;

    context.reporter.report(Progress::TaskStart {
        total_steps: grid.plane_count() as u64,
    });
    for (plane, z) in grid.planes() {
        for center in grid.plane_centers(plane, z) {
            candidates += 1;
            let Some(voxel) = voxel_index(center, eligible.dim()) else {
                continue;
            };
            if !eligible[voxel] {
                continue;
            }
            let ellipsoid = Ellipsoid::new(voxel.map(|v| v as f64), radii_voxels);
            rasterize_ellipsoid(&mut mask, &ellipsoid);
            centers.push(voxel);
        }
        context.reporter.report(Progress::TaskIncrement);
    }
    context.reporter.report(Progress::TaskFinish);
    context.reporter.message(format!(
        "{} spheres placed from {} candidate centres",
        centers.len(),
        candidates
    ));

    if centers.is_empty() {
        warn!(candidates, "No grid point landed on an eligible voxel; the lattice is empty.");
    } else {
        info!(spheres = centers.len(), candidates, "Lattice spheres placed.");
    }

    Ok(LatticeResult {
        mask,
        centers,
        step,
        radii_voxels,
    })
}
