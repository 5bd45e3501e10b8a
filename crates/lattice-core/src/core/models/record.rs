use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CLOSED_PLANAR: &str = "CLOSED_PLANAR";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContourFormatError {
    #[error("Non-numeric coordinate value '{value}' at index {index}")]
    NonNumeric { index: usize, value: String },
    #[error("Non-finite coordinate value '{value}' at index {index}")]
    NonFinite { index: usize, value: String },
}

/// File meta information mirrored from the record body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileMeta {
    pub media_storage_sop_instance_uid: String,
}

/// A single planar polygon on one image slice.
///
/// Coordinates are kept as decimal strings, flattened as `x1, y1, z1, x2, y2, z2, ...`
/// in patient millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Contour {
    #[serde(default = "closed_planar")]
    pub geometric_type: String,
    pub number_of_contour_points: usize,
    pub contour_data: Vec<String>,
}

fn closed_planar() -> String {
    CLOSED_PLANAR.to_string()
}

impl Contour {
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        let contour_data = points
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .map(|v| v.to_string())
            .collect();
        Self {
            geometric_type: closed_planar(),
            number_of_contour_points: points.len(),
            contour_data,
        }
    }

    /// Number of complete `(x, y, z)` triplets in the coordinate list.
    pub fn point_count(&self) -> usize {
        self.contour_data.len() / 3
    }

    pub fn coordinates(&self) -> Result<Vec<f64>, ContourFormatError> {
        self.contour_data
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let value: f64 =
                    raw.trim()
                        .parse()
                        .map_err(|_| ContourFormatError::NonNumeric {
                            index,
                            value: raw.clone(),
                        })?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ContourFormatError::NonFinite {
                        index,
                        value: raw.clone(),
                    })
                }
            })
            .collect()
    }

    pub fn points(&self) -> Result<Vec<Point3<f64>>, ContourFormatError> {
        Ok(self
            .coordinates()?
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect())
    }
}

/// All contours of one named region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegionContours {
    pub number: u32,
    pub name: String,
    pub display_color: [u8; 3],
    #[serde(default)]
    pub contours: Vec<Contour>,
}

/// The persisted contour-set record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StructuredRecord {
    pub sop_instance_uid: String,
    pub file_meta: FileMeta,
    pub series_instance_uid: String,
    #[serde(default)]
    pub regions: Vec<RegionContours>,
}

impl StructuredRecord {
    pub fn region(&self, name: &str) -> Option<&RegionContours> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn region_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.regions.iter().map(|r| r.name.clone()).collect();
        names.sort();
        names
    }

    pub fn next_region_number(&self) -> u32 {
        self.regions.iter().map(|r| r.number).max().unwrap_or(0) + 1
    }

    pub fn contour_count(&self) -> usize {
        self.regions.iter().map(|r| r.contours.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StructuredRecord {
        StructuredRecord {
            sop_instance_uid: "1.2.3".to_string(),
            file_meta: FileMeta {
                media_storage_sop_instance_uid: "1.2.3".to_string(),
            },
            series_instance_uid: "1.2.4".to_string(),
            regions: vec![
                RegionContours {
                    number: 3,
                    name: "PTV".to_string(),
                    display_color: [0, 0, 255],
                    contours: vec![],
                },
                RegionContours {
                    number: 7,
                    name: "Cord".to_string(),
                    display_color: [0, 255, 255],
                    contours: vec![],
                },
            ],
        }
    }

    #[test]
    fn contour_from_points_flattens_coordinates() {
        let contour =
            Contour::from_points(&[Point3::new(1.0, 2.5, -3.0), Point3::new(0.0, 0.0, 0.0)]);
        assert_eq!(contour.number_of_contour_points, 2);
        assert_eq!(contour.contour_data, vec!["1", "2.5", "-3", "0", "0", "0"]);
        assert_eq!(contour.geometric_type, CLOSED_PLANAR);
    }

    #[test]
    fn point_count_ignores_incomplete_triplets() {
        let contour = Contour {
            geometric_type: closed_planar(),
            number_of_contour_points: 0,
            contour_data: ["1", "2", "3", "4", "5"].map(String::from).to_vec(),
        };
        assert_eq!(contour.point_count(), 1);
    }

    #[test]
    fn coordinates_report_non_numeric_values() {
        let contour = Contour {
            geometric_type: closed_planar(),
            number_of_contour_points: 1,
            contour_data: ["1.0", "abc", "3"].map(String::from).to_vec(),
        };
        assert_eq!(
            contour.coordinates(),
            Err(ContourFormatError::NonNumeric {
                index: 1,
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn coordinates_reject_non_finite_values() {
        let contour = Contour {
            geometric_type: closed_planar(),
            number_of_contour_points: 1,
            contour_data: ["1.0", "2.0", "inf"].map(String::from).to_vec(),
        };
        assert!(matches!(
            contour.coordinates(),
            Err(ContourFormatError::NonFinite { index: 2, .. })
        ));
    }

    #[test]
    fn region_names_are_sorted() {
        assert_eq!(record().region_names(), vec!["Cord", "PTV"]);
    }

    #[test]
    fn next_region_number_follows_highest_number() {
        assert_eq!(record().next_region_number(), 8);
        let mut empty = record();
        empty.regions.clear();
        assert_eq!(empty.next_region_number(), 1);
    }

    #[test]
    fn record_serializes_with_kebab_case_keys() {
        let json = serde_json::to_string(&record()).unwrap();
        assert!(json.contains("\"sop-instance-uid\""));
        assert!(json.contains("\"media-storage-sop-instance-uid\""));
        let parsed: StructuredRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record());
    }
}
