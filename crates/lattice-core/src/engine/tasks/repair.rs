use crate::core::models::record::{Contour, ContourFormatError, StructuredRecord};
use crate::core::utils::identifiers::generate_uid_replacing;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument, warn};

/// Contours with fewer vertices than this cannot form a polygon and are dropped.
pub const MIN_CONTOUR_POINTS: usize = 3;

/// Decimal places written for every repaired coordinate.
pub const COORDINATE_DECIMALS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierChange {
    pub previous_instance_uid: String,
    pub previous_series_uid: String,
    pub instance_uid: String,
    pub series_uid: String,
}

/// A retained contour whose coordinates could not be reformatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContourFormatFailure {
    pub region: String,
    /// Position of the contour within its region after degenerate contours were dropped.
    pub index: usize,
    pub error: ContourFormatError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub removed: usize,
    pub reformatted: usize,
    pub unformatted: Vec<ContourFormatFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRepair {
    pub identifiers: IdentifierChange,
    pub contours: RepairReport,
}

/// Assigns fresh instance and series identifiers, mirroring the instance identifier into
/// the file meta information.
pub fn regenerate_identifiers(record: &mut StructuredRecord) -> IdentifierChange {
    let instance_uid = generate_uid_replacing(&record.sop_instance_uid);
    let series_uid = generate_uid_replacing(&record.series_instance_uid);

    let previous_instance_uid =
        std::mem::replace(&mut record.sop_instance_uid, instance_uid.clone());
    let previous_series_uid =
        std::mem::replace(&mut record.series_instance_uid, series_uid.clone());
    record.file_meta.media_storage_sop_instance_uid = instance_uid.clone();

    IdentifierChange {
        previous_instance_uid,
        previous_series_uid,
        instance_uid,
        series_uid,
    }
}

/// Rewrites every coordinate with fixed precision and refreshes the point count.
///
/// The contour is left untouched when any value fails to parse.
pub fn reformat_contour(contour: &mut Contour) -> Result<(), ContourFormatError> {
    let values = contour.coordinates()?;
    contour.contour_data = values
        .iter()
        .map(|v| format!("{:.*}", COORDINATE_DECIMALS, v))
        .collect();
    contour.number_of_contour_points = contour.point_count();
    Ok(())
}

/// Drops degenerate contours and reformats the rest, region by region.
pub fn repair_contours(record: &mut StructuredRecord) -> RepairReport {
    let mut report = RepairReport::default();

    for region in &mut record.regions {
        let before = region.contours.len();
        region
            .contours
            .retain(|contour| contour.point_count() >= MIN_CONTOUR_POINTS);
        report.removed += before - region.contours.len();

        for (index, contour) in region.contours.iter_mut().enumerate() {
            match reformat_contour(contour) {
                Ok(()) => report.reformatted += 1,
                Err(error) => report.unformatted.push(ContourFormatFailure {
                    region: region.name.clone(),
                    index,
                    error,
                }),
            }
        }
    }
    report
}

/// Prepares a record for persistence: new identifiers, then contour clean-up.
#[instrument(skip_all, name = "record_repair")]
pub fn run(record: &mut StructuredRecord, reporter: &ProgressReporter) -> RecordRepair {
    let identifiers = regenerate_identifiers(record);
    info!(
        instance_uid = %identifiers.instance_uid,
        series_uid = %identifiers.series_uid,
        "Record identifiers regenerated."
    );
    reporter.message("Generated new instance and series identifiers");

    let contours = repair_contours(record);
    for failure in &contours.unformatted {
        warn!(
            region = %failure.region,
            contour = failure.index,
            error = %failure.error,
            "Contour kept without reformatting."
        );
    }
    info!(
        removed = contours.removed,
        reformatted = contours.reformatted,
        unformatted = contours.unformatted.len(),
        "Contours repaired."
    );
    reporter.message(format!(
        "Removed {} contours with fewer than {} points",
        contours.removed, MIN_CONTOUR_POINTS
    ));
    reporter.message(format!("Reformatted {} contours", contours.reformatted));

    RecordRepair {
        identifiers,
        contours,
    }
}
