use crate::core::io::traits::{RegionError, RegionSource};
use crate::core::models::volume::{Mask, VolumeShape, count_true, to_canonical};
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use ndarray::Zip;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ResolvedRegion {
    pub name: String,
    pub mask: Mask,
}

/// An obstacle that could not be resolved and was left out of the composition.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleFailure {
    pub name: String,
    pub error: RegionError,
}

/// Outcome of region composition. All masks are in canonical order.
#[derive(Debug, Clone)]
pub struct CompositeRegion {
    /// The target mask exactly as resolved, kept apart from `base`.
    pub target: Mask,
    pub obstacles: Vec<ResolvedRegion>,
    pub skipped: Vec<ObstacleFailure>,
    /// `target AND NOT (union of resolved obstacles)`.
    pub base: Mask,
}

/// Resolves `name` and converts it to canonical order, checking it against `shape`.
pub fn resolve_canonical<S: RegionSource + ?Sized>(
    source: &S,
    name: &str,
    shape: VolumeShape,
) -> Result<Mask, RegionError> {
    let mask = to_canonical(source.region_mask(name)?);
    if mask.dim() != shape.dim() {
        return Err(RegionError::Malformed {
            name: name.to_string(),
            reason: format!(
                "mask dimensions {:?} do not match the series {:?}",
                mask.dim(),
                shape.dim()
            ),
        });
    }
    Ok(mask)
}

#[instrument(skip_all, name = "region_compositor")]
pub fn run<S: RegionSource + ?Sized>(
    source: &S,
    context: &PipelineContext,
) -> Result<CompositeRegion, EngineError> {
    let config = context.config;
    let target = resolve_canonical(source, &config.target, context.shape).map_err(|e| {
        EngineError::TargetNotFound {
            name: config.target.clone(),
            reason: e.to_string(),
        }
    })?;
    info!(
        target = %config.target,
        voxels = count_true(&target),
        "Target region resolved."
    );

    let mut base = target.clone();
    let mut obstacles = Vec::new();
    let mut skipped = Vec::new();

    for name in &config.obstacles {
        if *name == config.target {
            warn!(obstacle = %name, "Target listed as an obstacle; ignoring it.");
            continue;
        }
        match resolve_canonical(source, name, context.shape) {
            Ok(mask) => {
                Zip::from(&mut base)
                    .and(&mask)
                    .for_each(|b, &obstacle| *b = *b && !obstacle);
                debug!(obstacle = %name, voxels = count_true(&mask), "Obstacle excluded.");
                obstacles.push(ResolvedRegion {
                    name: name.clone(),
                    mask,
                });
            }
            Err(error) => {
                warn!(obstacle = %name, %error, "Skipping obstacle that failed to resolve.");
                context
                    .reporter
                    .message(format!("Skipped obstacle '{}': {}", name, error));
                skipped.push(ObstacleFailure {
                    name: name.clone(),
                    error,
                });
            }
        }
    }

    info!(
        base_voxels = count_true(&base),
        obstacles = obstacles.len(),
        skipped = skipped.len(),
        "Eligible base region composed."
    );

    Ok(CompositeRegion {
        target,
        obstacles,
        skipped,
        base,
    })
}
