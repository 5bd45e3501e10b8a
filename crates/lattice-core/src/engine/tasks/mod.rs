//! Pipeline stages of a lattice generation run.
//!
//! Each submodule implements one stage and exposes a `run` entry point. Stages are
//! composed by [`crate::workflows::generate`] in a fixed order: spacing derivation,
//! region composition, margin computation, lattice generation, and record repair.

pub mod compositor;
pub mod lattice;
pub mod margin;
pub mod repair;
pub mod spacing;
