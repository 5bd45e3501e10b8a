use crate::core::models::volume::{DistanceMap, Mask, count_true};
use crate::engine::context::PipelineContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use ndarray::{Axis, Zip};
use tracing::{debug, info, instrument};

/// Where sphere centres may be placed, together with the distance map it came from.
#[derive(Debug, Clone)]
pub struct EligibilityMask {
    /// Physical distance (mm) from each voxel to the nearest voxel outside the base region.
    pub distance: DistanceMap,
    pub eligible: Mask,
    pub eligible_voxels: usize,
    pub threshold_mm: f64,
}

/// Exact Euclidean distance transform with anisotropic sampling.
///
/// For every true voxel of `region`, computes the physical distance to the nearest false
/// voxel; false voxels get zero. `sampling` is the voxel size along `(slice, row, column)`.
/// Only voxels inside the volume count as outside the region, so if `region` has no
/// false voxel at all every distance is infinite.
///
/// Separable lower-envelope algorithm (Felzenszwalb & Huttenlocher), one pass per axis.
pub fn distance_transform(region: &Mask, sampling: [f64; 3]) -> DistanceMap {
    let mut squared = region.mapv(|inside| if inside { f64::INFINITY } else { 0.0 });

    let longest = squared.shape().iter().copied().max().unwrap_or(0);
    let mut envelope = LowerEnvelope::with_capacity(longest);
    let mut input = Vec::with_capacity(longest);

    for axis in (0..3).rev() {
        let weight = sampling[axis] * sampling[axis];
        for mut lane in squared.lanes_mut(Axis(axis)) {
            input.clear();
            input.extend(lane.iter().copied());
            envelope.transform(&input, weight);
            for (dst, &src) in lane.iter_mut().zip(&envelope.output) {
                *dst = src;
            }
        }
    }

    squared.mapv_into(f64::sqrt)
}

/// Scratch buffers for the one-dimensional squared distance transform.
struct LowerEnvelope {
    vertices: Vec<usize>,
    boundaries: Vec<f64>,
    output: Vec<f64>,
}

impl LowerEnvelope {
    fn with_capacity(n: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(n),
            boundaries: Vec::with_capacity(n),
            output: Vec::with_capacity(n),
        }
    }

    /// `output[p] = min_q weight * (p - q)^2 + f[q]`, skipping infinite `f[q]`.
    fn transform(&mut self, f: &[f64], weight: f64) {
        let n = f.len();
        self.vertices.clear();
        self.boundaries.clear();
        self.output.clear();

        let intersection = |p: usize, q: usize| {
            let (pf, qf) = (p as f64, q as f64);
            ((f[q] + weight * qf * qf) - (f[p] + weight * pf * pf)) / (2.0 * weight * (qf - pf))
        };

        for q in 0..n {
            if !f[q].is_finite() {
                continue;
            }
            // The first parabola's boundary is -inf, so it is never popped.
            let mut s = f64::NEG_INFINITY;
            while let Some(&p) = self.vertices.last() {
                s = intersection(p, q);
                if self.boundaries.last().is_some_and(|&z| s <= z) {
                    self.vertices.pop();
                    self.boundaries.pop();
                } else {
                    break;
                }
            }
            self.vertices.push(q);
            self.boundaries.push(s);
        }

        if self.vertices.is_empty() {
            self.output.resize(n, f64::INFINITY);
            return;
        }

        let mut k = 0;
        for p in 0..n {
            let pf = p as f64;
            while k + 1 < self.vertices.len() && self.boundaries[k + 1] < pf {
                k += 1;
            }
            let d = pf - self.vertices[k] as f64;
            self.output.push(weight * d * d + f[self.vertices[k]]);
        }
    }
}

/// Restricts `base` to voxels at least `sphere radius + margin` millimetres from its boundary.
///
/// # Errors
///
/// Returns [`EngineError::InsufficientSpace`] when no voxel meets the threshold.
#[instrument(skip_all, name = "margin_engine")]
pub fn run(base: &Mask, context: &PipelineContext) -> Result<EligibilityMask, EngineError> {
    let threshold_mm = context.config.sphere.clearance_mm();
    let sampling = context.spacing.sampling();
    debug!(?sampling, threshold_mm, "Running anisotropic distance transform.");
    context.reporter.message(format!(
        "Required clearance: {:.2} mm (radius {:.2} mm + margin {:.2} mm)",
        threshold_mm,
        context.config.sphere.radius_mm(),
        context.config.sphere.margin_mm
    ));

    let distance = distance_transform(base, sampling);
    let eligible = eligibility(base, &distance, threshold_mm);
    let eligible_voxels = count_true(&eligible);

    if eligible_voxels == 0 {
        return Err(EngineError::InsufficientSpace {
            required_mm: threshold_mm,
        });
    }

    let eligible_fraction = eligible_voxels as f64 / context.shape.voxel_count() as f64;
    info!(eligible_voxels, eligible_fraction, threshold_mm, "Eligibility mask computed.");
    context.reporter.report(Progress::Message(format!(
        "{} voxels eligible for sphere centres",
        eligible_voxels
    )));

    Ok(EligibilityMask {
        distance,
        eligible,
        eligible_voxels,
        threshold_mm,
    })
}

fn eligibility(base: &Mask, distance: &DistanceMap, threshold_mm: f64) -> Mask {
    Zip::from(base)
        .and(distance)
        .map_collect(|&inside, &d| inside && d >= threshold_mm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::series::VoxelSpacing;
    use crate::core::models::volume::{VolumeShape, is_subset};
    use crate::engine::config::{LatticeConfig, LatticeConfigBuilder};
    use crate::engine::progress::ProgressReporter;

    fn brute_force(region: &Mask, sampling: [f64; 3]) -> DistanceMap {
        let outside: Vec<_> = region
            .indexed_iter()
            .filter(|(_, v)| !**v)
            .map(|(i, _)| i)
            .collect();
        DistanceMap::from_shape_fn(region.dim(), |(z, y, x)| {
            if !region[[z, y, x]] {
                return 0.0;
            }
            outside
                .iter()
                .map(|&(oz, oy, ox)| {
                    let dz = (z as f64 - oz as f64) * sampling[0];
                    let dy = (y as f64 - oy as f64) * sampling[1];
                    let dx = (x as f64 - ox as f64) * sampling[2];
                    (dz * dz + dy * dy + dx * dx).sqrt()
                })
                .fold(f64::INFINITY, f64::min)
        })
    }

    fn patterned_region() -> Mask {
        Mask::from_shape_fn((6, 7, 8), |(z, y, x)| (z * 7 + y * 3 + x * 5) % 11 != 0)
    }

    fn config(diameter_mm: f64, margin_mm: f64) -> LatticeConfig {
        LatticeConfigBuilder::new()
            .target("PTV")
            .output_name("Lattice")
            .diameter_mm(diameter_mm)
            .spacing_mm(10.0)
            .margin_mm(margin_mm)
            .build()
            .unwrap()
    }

    fn run_with(
        base: &Mask,
        spacing: VoxelSpacing,
        config: &LatticeConfig,
    ) -> Result<EligibilityMask, EngineError> {
        let reporter = ProgressReporter::new();
        let context = PipelineContext::new(config, spacing, VolumeShape::of(base), &reporter);
        run(base, &context)
    }

    #[test]
    fn distance_transform_matches_brute_force_isotropic() {
        let region = patterned_region();
        let fast = distance_transform(&region, [1.0, 1.0, 1.0]);
        let slow = brute_force(&region, [1.0, 1.0, 1.0]);
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn distance_transform_matches_brute_force_anisotropic() {
        let region = patterned_region();
        let sampling = [2.5, 0.7, 1.3];
        let fast = distance_transform(&region, sampling);
        let slow = brute_force(&region, sampling);
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn distance_along_a_line_uses_physical_spacing() {
        let mut region = Mask::from_elem((1, 1, 7), true);
        region[[0, 0, 0]] = false;
        let distance = distance_transform(&region, [1.0, 1.0, 2.0]);
        let row: Vec<f64> = distance.iter().copied().collect();
        assert_eq!(row, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
    }

    #[test]
    fn region_without_outside_voxels_is_infinitely_deep() {
        let distance = distance_transform(&Mask::from_elem((2, 2, 2), true), [1.0, 1.0, 1.0]);
        assert!(distance.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn eligibility_is_a_subset_of_base() {
        let mut base = Mask::from_elem((9, 9, 9), false);
        base.slice_mut(ndarray::s![1..8, 1..8, 1..8]).fill(true);
        let spacing = VoxelSpacing::new(1.0, 1.0, 1.0).unwrap();
        let result = run_with(&base, spacing, &config(2.0, 1.0)).unwrap();
        assert!(is_subset(&result.eligible, &base));
        assert_eq!(result.threshold_mm, 2.0);
        // Two voxels in from every face of the 7x7x7 block.
        assert_eq!(result.eligible_voxels, 125);
    }

    #[test]
    fn growing_margin_never_grows_eligibility() {
        let mut base = Mask::from_elem((12, 12, 12), false);
        base.slice_mut(ndarray::s![1..11, 2..10, 1..11]).fill(true);
        let spacing = VoxelSpacing::new(0.8, 1.0, 2.0).unwrap();

        let mut previous: Option<Mask> = None;
        for margin in [0.0, 0.5, 1.0, 2.0, 3.0] {
            let Ok(result) = run_with(&base, spacing, &config(2.0, margin)) else {
                break;
            };
            if let Some(prev) = &previous {
                assert!(is_subset(&result.eligible, prev));
            }
            previous = Some(result.eligible);
        }
        assert!(previous.is_some());
    }

    #[test]
    fn unreachable_threshold_is_insufficient_space() {
        let base = Mask::from_elem((3, 3, 3), false);
        let spacing = VoxelSpacing::new(1.0, 1.0, 1.0).unwrap();
        assert!(matches!(
            run_with(&base, spacing, &config(2.0, 1000.0)),
            Err(EngineError::InsufficientSpace { required_mm }) if required_mm == 1001.0
        ));
    }
}
