use crate::core::models::record::StructuredRecord;
use crate::core::models::volume::Mask;
use std::error::Error;
use std::path::Path;
use thiserror::Error;

/// Failure to resolve a named region into a mask.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("Region '{0}' not found")]
    NotFound(String),
    #[error("Region '{name}' is malformed: {reason}")]
    Malformed { name: String, reason: String },
}

/// Named-region lookup provided by an imaging collaborator.
pub trait RegionSource {
    /// Names of every region, in the collaborator's own order.
    fn region_names(&self) -> Vec<String>;

    /// Resolves a region into a boolean mask.
    ///
    /// The returned mask is in collaborator `(row, column, slice)` order.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::NotFound`] if no region has this name, or
    /// [`RegionError::Malformed`] if its data cannot be turned into a mask.
    fn region_mask(&self, name: &str) -> Result<Mask, RegionError>;
}

/// A structure set that can receive new regions and be persisted.
pub trait StructureSet: RegionSource {
    type Error: Error + Send + Sync + 'static;

    /// Converts `mask` (collaborator order) into contours and appends it as a new region.
    fn add_region(&mut self, name: &str, color: [u8; 3], mask: &Mask) -> Result<(), Self::Error>;

    fn record_mut(&mut self) -> &mut StructuredRecord;

    /// Writes the structure set to `path`.
    fn save(&self, path: &Path) -> Result<(), Self::Error>;
}

/// Sorted names of every region in `source`.
pub fn list_region_names<S: RegionSource + ?Sized>(source: &S) -> Vec<String> {
    let mut names = source.region_names();
    names.sort();
    names
}
