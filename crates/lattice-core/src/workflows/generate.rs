use crate::core::io::traits::StructureSet;
use crate::core::models::series::{SeriesGeometry, VoxelSpacing};
use crate::core::models::volume::{Mask, occupied_slices, to_collaborator};
use crate::engine::config::{LatticeConfig, OUTPUT_REGION_COLOR};
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter, Stage};
use crate::engine::tasks::{
    self, compositor::ObstacleFailure, lattice::GridStep, repair::RecordRepair,
};
use tracing::{info, instrument, warn};

pub const TARGET_OVERLAY_COLOR: &str = "blue";
pub const LATTICE_OVERLAY_COLOR: &str = "red";
/// Obstacle overlay colors, assigned by position in the configured obstacle list.
pub const OBSTACLE_OVERLAY_PALETTE: [&str; 6] =
    ["cyan", "lime", "magenta", "orange", "yellow", "pink"];

/// A mask prepared for display, in canonical `(slice, row, column)` order.
#[derive(Debug, Clone)]
pub struct RegionOverlay {
    pub name: String,
    pub color: &'static str,
    pub mask: Mask,
}

#[derive(Debug, Clone)]
pub struct LatticeOutcome {
    pub sphere_count: usize,
    /// Union of all placed spheres, in canonical order.
    pub lattice_mask: Mask,
    /// Voxel index `(slice, row, column)` of every placed sphere centre.
    pub centers: Vec<[usize; 3]>,
    /// Number of slices the lattice region has contours on.
    pub lattice_slices: usize,
    pub spacing: VoxelSpacing,
    /// In-plane display aspect ratio, row spacing over column spacing.
    pub aspect_ratio: f64,
    /// Target first, then resolved obstacles, then the lattice.
    pub overlays: Vec<RegionOverlay>,
    pub skipped_obstacles: Vec<ObstacleFailure>,
    pub eligible_voxels: usize,
    pub repair: RecordRepair,
}

/// Generates a sphere lattice inside the configured target and adds it to `structures`
/// as a new region, then repairs the structure set record for persistence.
///
/// `structures` is only modified once every fatal check has passed.
#[instrument(skip_all, name = "generate_workflow", fields(target_region = %config.target, output_region = %config.output_name))]
pub fn run<S: StructureSet + ?Sized>(
    series: &SeriesGeometry,
    structures: &mut S,
    config: &LatticeConfig,
    reporter: &ProgressReporter,
) -> Result<LatticeOutcome, EngineError> {
    config.validate()?;

    // === Stage 1: Series geometry ===
    reporter.report(Progress::PhaseStart {
        stage: Stage::LoadGeometry,
    });
    let spacing = tasks::spacing::run(series)?;
    GridStep::from_spacing(config.sphere.spacing_mm, &spacing)?;
    if structures
        .region_names()
        .iter()
        .any(|name| *name == config.output_name)
    {
        return Err(EngineError::InvalidParameter {
            parameter: "output_name",
            reason: format!("a region named '{}' already exists", config.output_name),
        });
    }
    let context = PipelineContext::new(config, spacing, series.shape(), reporter);
    reporter.report(Progress::PhaseFinish);

    // === Stage 2: Region composition ===
    reporter.report(Progress::PhaseStart {
        stage: Stage::ComposeRegions,
    });
    let composite = tasks::compositor::run(&*structures, &context)?;
    reporter.report(Progress::PhaseFinish);

    // === Stage 3: Margin ===
    reporter.report(Progress::PhaseStart {
        stage: Stage::ComputeMargin,
    });
    let eligibility = tasks::margin::run(&composite.base, &context)?;
    reporter.report(Progress::PhaseFinish);

    // === Stage 4: Sphere placement ===
    reporter.report(Progress::PhaseStart {
        stage: Stage::GenerateLattice,
    });
    let lattice = tasks::lattice::run(&eligibility.eligible, &context)?;
    if lattice.sphere_count() == 0 {
        warn!("No sphere could be placed on the packing grid.");
        reporter.message("No sphere could be placed; the lattice region will be empty");
    }
    reporter.report(Progress::PhaseFinish);

    // === Stage 5: Contour conversion ===
    reporter.report(Progress::PhaseStart {
        stage: Stage::ConvertContours,
    });
    structures
        .add_region(
            &config.output_name,
            OUTPUT_REGION_COLOR,
            &to_collaborator(&lattice.mask),
        )
        .map_err(|e| EngineError::Serialization {
            name: config.output_name.clone(),
            source: Box::new(e),
        })?;
    reporter.report(Progress::PhaseFinish);

    // === Stage 6: Record repair ===
    reporter.report(Progress::PhaseStart {
        stage: Stage::RepairRecord,
    });
    let repair = tasks::repair::run(structures.record_mut(), reporter);
    reporter.report(Progress::PhaseFinish);

    let sphere_count = lattice.sphere_count();
    let lattice_slices = occupied_slices(&lattice.mask);
    info!(sphere_count, lattice_slices, "Lattice generation complete.");
    reporter.message(format!("Done: {} spheres placed", sphere_count));

    let mut overlays = Vec::with_capacity(composite.obstacles.len() + 2);
    overlays.push(RegionOverlay {
        name: config.target.clone(),
        color: TARGET_OVERLAY_COLOR,
        mask: composite.target,
    });
    for obstacle in composite.obstacles {
        let slot = config
            .obstacles
            .iter()
            .position(|name| *name == obstacle.name)
            .unwrap_or(0);
        overlays.push(RegionOverlay {
            name: obstacle.name,
            color: OBSTACLE_OVERLAY_PALETTE[slot % OBSTACLE_OVERLAY_PALETTE.len()],
            mask: obstacle.mask,
        });
    }
    overlays.push(RegionOverlay {
        name: config.output_name.clone(),
        color: LATTICE_OVERLAY_COLOR,
        mask: lattice.mask.clone(),
    });

    Ok(LatticeOutcome {
        sphere_count,
        lattice_mask: lattice.mask,
        centers: lattice.centers,
        lattice_slices,
        spacing,
        aspect_ratio: spacing.aspect_ratio(),
        overlays,
        skipped_obstacles: composite.skipped,
        eligible_voxels: eligibility.eligible_voxels,
        repair,
    })
}
