//! # Engine Module
//!
//! The stateful logic core of lattice generation.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Sphere size, spacing, margin, packing mode, and
//!   region selection, with a validating builder
//! - **Error Handling** ([`error`]) - The fatal error taxonomy of a run
//! - **Progress Monitoring** ([`progress`]) - Discrete stage notifications delivered to an
//!   injected callback
//! - **Pipeline Stages** ([`tasks`]) - Spacing derivation, region composition, the margin
//!   engine, the lattice generator, and record repair
//!
//! Stages run strictly in sequence and never loop back; any fatal error aborts the run
//! before anything is persisted.

pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod tasks;
