pub mod generate;
pub mod rois;
