use super::config::LatticeConfig;
use super::progress::ProgressReporter;
use crate::core::models::series::VoxelSpacing;
use crate::core::models::volume::VolumeShape;

/// Read-only state shared by the pipeline stages of a single run.
pub struct PipelineContext<'a> {
    pub config: &'a LatticeConfig,
    pub spacing: VoxelSpacing,
    pub shape: VolumeShape,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        config: &'a LatticeConfig,
        spacing: VoxelSpacing,
        shape: VolumeShape,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            config,
            spacing,
            shape,
            reporter,
        }
    }
}
