use crate::core::models::record::Contour;
use crate::core::models::series::SeriesGeometry;
use crate::core::models::volume::Mask;
use crate::core::utils::polygon::{PixelVertex, fill_polygon, trace_boundaries};
use ndarray::s;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContourConversionError {
    #[error("Contour {index} has invalid coordinates: {reason}")]
    InvalidCoordinates { index: usize, reason: String },
    #[error("Contour {index} at z = {z:.3} mm does not lie on any image slice")]
    NoMatchingSlice { index: usize, z: f64 },
    #[error("Mask dimensions {actual:?} do not match the series {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },
}

/// Rasterizes planar contours into a mask in collaborator `(row, column, slice)` order.
pub fn contours_to_mask(
    contours: &[Contour],
    geometry: &SeriesGeometry,
) -> Result<Mask, ContourConversionError> {
    let mut mask = Mask::from_elem(geometry.shape().collaborator_dim(), false);
    let tolerance = geometry.slice_thickness_mm() / 2.0;

    for (index, contour) in contours.iter().enumerate() {
        let points = contour
            .points()
            .map_err(|e| ContourConversionError::InvalidCoordinates {
                index,
                reason: e.to_string(),
            })?;
        let Some(first) = points.first() else {
            continue;
        };
        let slice = geometry
            .slice_index_for(first.z, tolerance)
            .ok_or(ContourConversionError::NoMatchingSlice { index, z: first.z })?;

        let vertices: Vec<PixelVertex> = points
            .iter()
            .filter_map(|p| geometry.patient_to_pixel(slice, p.x, p.y))
            .collect();
        fill_polygon(&mut mask.slice_mut(s![.., .., slice]), &vertices);
    }
    Ok(mask)
}

/// Traces every slice of a collaborator-ordered mask into closed planar contours.
///
/// Contours are emitted slice by slice, one per 8-connected component, with vertices at
/// the patient-space centres of the component's boundary pixels.
pub fn mask_to_contours(
    mask: &Mask,
    geometry: &SeriesGeometry,
) -> Result<Vec<Contour>, ContourConversionError> {
    let expected = geometry.shape().collaborator_dim();
    if mask.dim() != expected {
        return Err(ContourConversionError::ShapeMismatch {
            expected,
            actual: mask.dim(),
        });
    }

    let mut contours = Vec::new();
    for slice in 0..geometry.slices.len() {
        for boundary in trace_boundaries(mask.slice(s![.., .., slice])) {
            let points: Vec<_> = boundary
                .into_iter()
                .filter_map(|(row, column)| geometry.pixel_to_patient(slice, row, column))
                .collect();
            contours.push(Contour::from_points(&points));
        }
    }
    Ok(contours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::series::SliceGeometry;
    use crate::core::models::volume::count_true;

    fn geometry() -> SeriesGeometry {
        SeriesGeometry {
            rows: 8,
            columns: 8,
            pixel_spacing: [1.0, 1.0],
            slices: (0..3)
                .map(|i| SliceGeometry {
                    image_position_patient: [-4.0, -4.0, 2.0 * i as f64],
                    slice_thickness: Some(2.0),
                })
                .collect(),
        }
    }

    #[test]
    fn mask_round_trips_through_contours() {
        let geometry = geometry();
        let mut mask = Mask::from_elem((8, 8, 3), false);
        for r in 2..6 {
            for c in 1..4 {
                mask[[r, c, 1]] = true;
            }
        }
        mask[[6, 6, 2]] = true;

        let contours = mask_to_contours(&mask, &geometry).unwrap();
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].number_of_contour_points, 10);
        assert_eq!(contours[1].number_of_contour_points, 1);

        let restored = contours_to_mask(&contours, &geometry).unwrap();
        assert_eq!(restored, mask);
        assert_eq!(count_true(&restored), 13);
    }

    #[test]
    fn contour_points_are_in_patient_coordinates() {
        let geometry = geometry();
        let mut mask = Mask::from_elem((8, 8, 3), false);
        mask[[0, 0, 2]] = true;
        let contours = mask_to_contours(&mask, &geometry).unwrap();
        assert_eq!(contours[0].contour_data, vec!["-4", "-4", "4"]);
    }

    #[test]
    fn mask_to_contours_rejects_wrong_shape() {
        let result = mask_to_contours(&Mask::from_elem((3, 8, 8), false), &geometry());
        assert!(matches!(
            result,
            Err(ContourConversionError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn contours_off_the_slice_grid_are_rejected() {
        let contour = Contour::from_points(&[nalgebra::Point3::new(0.0, 0.0, 17.0)]);
        assert!(matches!(
            contours_to_mask(&[contour], &geometry()),
            Err(ContourConversionError::NoMatchingSlice { index: 0, .. })
        ));
    }

    #[test]
    fn non_numeric_contours_are_rejected() {
        let mut contour = Contour::from_points(&[nalgebra::Point3::new(0.0, 0.0, 0.0)]);
        contour.contour_data[1] = "oops".to_string();
        assert!(matches!(
            contours_to_mask(&[contour], &geometry()),
            Err(ContourConversionError::InvalidCoordinates { index: 0, .. })
        ));
    }
}
