use crate::core::models::series::{SeriesGeometry, VoxelSpacing};
use crate::engine::error::EngineError;
use tracing::{debug, info};

/// Derives the physical voxel spacing of a series.
///
/// In-plane spacing comes from the declared pixel spacing; slice spacing from
/// [`SeriesGeometry::slice_thickness_mm`], which never yields zero.
pub fn run(series: &SeriesGeometry) -> Result<VoxelSpacing, EngineError> {
    if series.slices.is_empty() || series.rows == 0 || series.columns == 0 {
        return Err(EngineError::InvalidParameter {
            parameter: "series",
            reason: format!(
                "imaging series is empty ({} slices of {}x{} pixels)",
                series.slices.len(),
                series.rows,
                series.columns
            ),
        });
    }

    let slice_mm = series.slice_thickness_mm();
    debug!(
        row_mm = series.row_spacing(),
        column_mm = series.column_spacing(),
        slice_mm,
        "Derived raw voxel spacing."
    );

    let spacing = VoxelSpacing::new(series.column_spacing(), series.row_spacing(), slice_mm)
        .ok_or_else(|| EngineError::InvalidParameter {
            parameter: "pixel_spacing",
            reason: format!(
                "pixel spacing must be positive, got {:?}",
                series.pixel_spacing
            ),
        })?;

    info!(
        column_mm = spacing.column(),
        row_mm = spacing.row(),
        slice_mm = spacing.slice(),
        "Voxel spacing resolved."
    );
    Ok(spacing)
}
