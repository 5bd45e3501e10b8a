//! # Core Module
//!
//! Fundamental building blocks for lattice structure generation.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Volumes, masks, voxel spacing, series geometry, and the
//!   persisted structured record
//! - **File I/O** ([`io`]) - Collaborator traits for region lookup and structure-set
//!   persistence, plus a JSON case-file implementation
//! - **Utilities** ([`utils`]) - Voxel geometry (ellipsoids, polygons, boundary tracing)
//!   and unique identifier generation

pub mod io;
pub mod models;
pub mod utils;
