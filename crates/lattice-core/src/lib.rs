//! # LatticeRT Core Library
//!
//! A library for generating spatially fractionated ("lattice") radiotherapy structures:
//! a lattice of spherical dose-delivery volumes placed inside a planning target volume
//! while keeping clear of organs at risk.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Mask`, `VoxelSpacing`,
//!   `SeriesGeometry`, `StructuredRecord`), pure voxel geometry, identifier generation,
//!   and the collaborator traits through which imaging data enters and leaves the library.
//!
//! - **[`engine`]: The Logic Core.** Configuration, error taxonomy, progress reporting,
//!   and the individual pipeline stages: spacing derivation, region composition, the
//!   margin engine, the lattice generator, and record repair.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into the
//!   complete, strictly sequential lattice generation procedure.

pub mod core;
pub mod engine;
pub mod workflows;
