use super::contours::{ContourConversionError, contours_to_mask, mask_to_contours};
use super::traits::{RegionError, RegionSource, StructureSet};
use crate::core::models::record::{RegionContours, StructuredRecord};
use crate::core::models::series::SeriesGeometry;
use crate::core::models::volume::Mask;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CaseFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid case file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Contour conversion failed: {0}")]
    Conversion(#[from] ContourConversionError),
    #[error("A region named '{0}' already exists")]
    DuplicateRegion(String),
}

/// A JSON case: the geometry of an imaging series plus its structure-set record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CaseFile {
    pub series: SeriesGeometry,
    pub record: StructuredRecord,
}

impl CaseFile {
    pub fn new(series: SeriesGeometry, record: StructuredRecord) -> Self {
        Self { series, record }
    }

    pub fn read_from(reader: impl Read) -> Result<Self, CaseFileError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, CaseFileError> {
        debug!("Reading case file {:?}", path.as_ref());
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), CaseFileError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl RegionSource for CaseFile {
    fn region_names(&self) -> Vec<String> {
        self.record.regions.iter().map(|r| r.name.clone()).collect()
    }

    fn region_mask(&self, name: &str) -> Result<Mask, RegionError> {
        let region = self
            .record
            .region(name)
            .ok_or_else(|| RegionError::NotFound(name.to_string()))?;
        contours_to_mask(&region.contours, &self.series).map_err(|e| RegionError::Malformed {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

impl StructureSet for CaseFile {
    type Error = CaseFileError;

    fn add_region(&mut self, name: &str, color: [u8; 3], mask: &Mask) -> Result<(), Self::Error> {
        if self.record.region(name).is_some() {
            return Err(CaseFileError::DuplicateRegion(name.to_string()));
        }
        let contours = mask_to_contours(mask, &self.series)?;
        debug!(region = name, contours = contours.len(), "Adding region to case record.");
        let number = self.record.next_region_number();
        self.record.regions.push(RegionContours {
            number,
            name: name.to_string(),
            display_color: color,
            contours,
        });
        Ok(())
    }

    fn record_mut(&mut self) -> &mut StructuredRecord {
        &mut self.record
    }

    fn save(&self, path: &Path) -> Result<(), Self::Error> {
        debug!("Writing case file {:?}", path);
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }
}
