//! Boundary between the library and its imaging collaborators.
//!
//! The library never reads pixel data or structure files itself. Region masks arrive
//! through [`traits::RegionSource`], and the generated lattice leaves through
//! [`traits::StructureSet`]. [`case::CaseFile`] is a self-contained JSON implementation
//! of both, used by the command-line tool and by the integration tests.

pub mod case;
pub mod contours;
pub mod traits;
