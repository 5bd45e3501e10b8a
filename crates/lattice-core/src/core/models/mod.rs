//! Data structures shared by every stage of the lattice pipeline.

pub mod record;
pub mod series;
pub mod volume;
