//! # Workflows Module
//!
//! High-level entry points that run the complete lattice generation procedure.
//!
//! ## Overview
//!
//! A workflow takes an imaging series, a structure set and a validated
//! [`LatticeConfig`](crate::engine::config::LatticeConfig), drives every engine stage in
//! order, and reports progress through an injected
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter). A run either completes
//! or fails as a whole: fatal errors are returned before the structure set is touched,
//! and persisting the repaired structure set is left to the caller.
//!
//! ## Architecture
//!
//! - **Generation Workflow** ([`generate`]) - Region composition, margin restriction,
//!   sphere placement, contour conversion and record repair.

pub mod generate;
