use latticert::core::io::case::CaseFile;
use latticert::core::io::traits::{RegionSource, StructureSet};
use latticert::core::models::record::{FileMeta, StructuredRecord};
use latticert::core::models::series::{SeriesGeometry, SliceGeometry};
use latticert::core::models::volume::{Mask, count_true, is_subset};
use latticert::engine::config::{LatticeConfig, LatticeConfigBuilder, PackingMode};
use latticert::engine::error::EngineError;
use latticert::engine::progress::{Progress, ProgressReporter, Stage};
use latticert::workflows::generate::{self, LatticeOutcome};
use std::sync::Mutex;

const ROWS: usize = 64;
const COLUMNS: usize = 64;
const SLICES: usize = 52;
const PIXEL_MM: f64 = 2.0;
const SLICE_MM: f64 = 2.5;
const TARGET_RADIUS_MM: f64 = 50.0;

const INSTANCE_UID: &str = "1.2.826.0.1.3680043.2.1125.1";
const SERIES_UID: &str = "1.2.826.0.1.3680043.2.1125.2";

fn patient_position(row: usize, column: usize, slice: usize) -> [f64; 3] {
    [
        -64.0 + column as f64 * PIXEL_MM,
        -64.0 + row as f64 * PIXEL_MM,
        -65.0 + slice as f64 * SLICE_MM,
    ]
}

/// A 50 mm sphere centred at the patient origin, in collaborator `(row, column, slice)` order.
fn sphere_mask() -> Mask {
    Mask::from_shape_fn((ROWS, COLUMNS, SLICES), |(r, c, s)| {
        let [x, y, z] = patient_position(r, c, s);
        x * x + y * y + z * z <= TARGET_RADIUS_MM * TARGET_RADIUS_MM
    })
}

fn empty_case() -> CaseFile {
    let series = SeriesGeometry {
        rows: ROWS,
        columns: COLUMNS,
        pixel_spacing: [PIXEL_MM, PIXEL_MM],
        slices: (0..SLICES)
            .map(|s| SliceGeometry {
                image_position_patient: patient_position(0, 0, s),
                slice_thickness: Some(SLICE_MM),
            })
            .collect(),
    };
    let record = StructuredRecord {
        sop_instance_uid: INSTANCE_UID.to_string(),
        file_meta: FileMeta {
            media_storage_sop_instance_uid: INSTANCE_UID.to_string(),
        },
        series_instance_uid: SERIES_UID.to_string(),
        regions: vec![],
    };
    CaseFile::new(series, record)
}

fn phantom(target_name: &str) -> CaseFile {
    let mut case = empty_case();
    case.add_region(target_name, [0, 0, 255], &sphere_mask())
        .unwrap();
    case
}

fn config(margin_mm: f64, packing: PackingMode, obstacles: &[&str]) -> LatticeConfig {
    LatticeConfigBuilder::new()
        .target("PTV")
        .obstacles(obstacles.iter().copied())
        .output_name("Lattice")
        .diameter_mm(10.0)
        .spacing_mm(20.0)
        .margin_mm(margin_mm)
        .packing(packing)
        .build()
        .unwrap()
}

fn generate(case: &mut CaseFile, config: &LatticeConfig) -> Result<LatticeOutcome, EngineError> {
    let series = case.series.clone();
    generate::run(&series, case, config, &ProgressReporter::new())
}

/// Physical distance from a canonical voxel to the nearest voxel outside `region`.
fn distance_to_outside(region: &Mask, voxel: [usize; 3]) -> f64 {
    let sampling = [SLICE_MM, PIXEL_MM, PIXEL_MM];
    region
        .indexed_iter()
        .filter(|(_, inside)| !**inside)
        .map(|((s, r, c), _)| {
            let ds = (s as f64 - voxel[0] as f64) * sampling[0];
            let dr = (r as f64 - voxel[1] as f64) * sampling[1];
            let dc = (c as f64 - voxel[2] as f64) * sampling[2];
            (ds * ds + dr * dr + dc * dc).sqrt()
        })
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn spherical_phantom_places_spheres_clear_of_the_boundary() {
    let mut case = phantom("PTV");
    let outcome = generate(&mut case, &config(5.0, PackingMode::Cubic, &[])).unwrap();

    assert!(outcome.sphere_count > 0);
    assert_eq!(outcome.sphere_count, outcome.centers.len());
    assert_eq!(outcome.aspect_ratio, 1.0);

    let target = &outcome.overlays[0].mask;
    let voxel_diagonal = (SLICE_MM * SLICE_MM + 2.0 * PIXEL_MM * PIXEL_MM).sqrt();
    for &center in &outcome.centers {
        assert!(target[center]);
        assert!(distance_to_outside(target, center) >= 10.0);

        let [x, y, z] = patient_position(center[1], center[2], center[0]);
        let depth = TARGET_RADIUS_MM - (x * x + y * y + z * z).sqrt();
        assert!(depth >= 10.0 - voxel_diagonal, "centre {center:?} only {depth} mm deep");
    }
    assert!(is_subset(&outcome.lattice_mask, target));

    // A 5 mm radius spans two 2.5 mm slices either side of its centre, and grid planes
    // are 20 mm apart, so every centre plane contributes five distinct slices.
    let mut center_slices: Vec<usize> = outcome.centers.iter().map(|c| c[0]).collect();
    center_slices.sort_unstable();
    center_slices.dedup();
    assert_eq!(outcome.lattice_slices, 5 * center_slices.len());
}

#[test]
fn lattice_region_is_added_and_record_repaired() {
    let mut case = phantom("PTV");
    let outcome = generate(&mut case, &config(5.0, PackingMode::Cubic, &[])).unwrap();

    let region = case.record.region("Lattice").unwrap();
    assert_eq!(region.display_color, [255, 0, 0]);
    assert_eq!(region.number, 2);
    assert!(!region.contours.is_empty());

    assert_ne!(case.record.sop_instance_uid, INSTANCE_UID);
    assert_ne!(case.record.series_instance_uid, SERIES_UID);
    assert_eq!(
        case.record.sop_instance_uid,
        case.record.file_meta.media_storage_sop_instance_uid
    );
    assert_eq!(outcome.repair.identifiers.previous_instance_uid, INSTANCE_UID);

    for region in &case.record.regions {
        for contour in &region.contours {
            assert!(contour.point_count() >= 3);
            assert_eq!(contour.number_of_contour_points, contour.point_count());
            assert!(
                contour
                    .contour_data
                    .iter()
                    .all(|v| v.split_once('.').map(|(_, d)| d.len()) == Some(4))
            );
        }
    }
    assert_eq!(
        outcome.repair.contours.reformatted,
        case.record.contour_count()
    );
    assert!(outcome.repair.contours.unformatted.is_empty());

    // The repaired lattice contours still describe every placed sphere centre.
    let restored = case.region_mask("Lattice").unwrap();
    for &[s, r, c] in &outcome.centers {
        assert!(restored[[r, c, s]]);
    }
}

#[test]
fn huge_margin_is_insufficient_space_and_leaves_the_record_alone() {
    let mut case = phantom("PTV");
    let before = case.record.clone();
    let result = generate(&mut case, &config(1000.0, PackingMode::Cubic, &[]));

    assert!(matches!(
        result,
        Err(EngineError::InsufficientSpace { required_mm }) if required_mm == 1005.0
    ));
    assert_eq!(case.record, before);
}

#[test]
fn unknown_target_is_not_found() {
    let mut case = phantom("Bar");
    let before = case.record.clone();
    let result = generate(&mut case, &config(5.0, PackingMode::Cubic, &[]));

    assert!(matches!(
        result,
        Err(EngineError::TargetNotFound { ref name, .. }) if name == "PTV"
    ));
    assert_eq!(case.record, before);
}

#[test]
fn existing_output_region_is_rejected_up_front() {
    let mut case = phantom("PTV");
    case.add_region("Lattice", [255, 0, 0], &sphere_mask())
        .unwrap();
    assert!(matches!(
        generate(&mut case, &config(5.0, PackingMode::Cubic, &[])),
        Err(EngineError::InvalidParameter { parameter: "output_name", .. })
    ));
}

#[test]
fn hexagonal_packing_changes_the_centres() {
    let cubic = generate(&mut phantom("PTV"), &config(5.0, PackingMode::Cubic, &[])).unwrap();
    let hex = generate(
        &mut phantom("PTV"),
        &config(5.0, PackingMode::HexagonalOffset, &[]),
    )
    .unwrap();

    assert!(hex.sphere_count > 0);
    assert_ne!(cubic.centers, hex.centers);
}

#[test]
fn obstacles_are_avoided_and_unresolved_ones_skipped() {
    let mut case = phantom("PTV");
    // Everything from the patient origin towards positive y.
    let cord = Mask::from_shape_fn((ROWS, COLUMNS, SLICES), |(r, _, _)| r >= 32);
    case.add_region("Cord", [0, 255, 255], &cord).unwrap();

    let outcome = generate(
        &mut case,
        &config(5.0, PackingMode::Cubic, &["Missing", "Cord", "PTV"]),
    )
    .unwrap();

    assert!(outcome.sphere_count > 0);
    // 10 mm clearance from row 32 at 2 mm per row.
    assert!(outcome.centers.iter().all(|&[_, r, _]| r <= 27));

    assert_eq!(outcome.skipped_obstacles.len(), 1);
    assert_eq!(outcome.skipped_obstacles[0].name, "Missing");

    let overlays: Vec<_> = outcome
        .overlays
        .iter()
        .map(|o| (o.name.as_str(), o.color))
        .collect();
    assert_eq!(
        overlays,
        vec![("PTV", "blue"), ("Cord", "lime"), ("Lattice", "red")]
    );
    assert!(count_true(&outcome.overlays[1].mask) > 0);
}

#[test]
fn progress_walks_through_every_stage_in_order() {
    let stages = Mutex::new(Vec::new());
    let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
        if let Progress::PhaseStart { stage } = event {
            stages.lock().unwrap().push(stage);
        }
    }));

    let mut case = phantom("PTV");
    let series = case.series.clone();
    generate::run(
        &series,
        &mut case,
        &config(5.0, PackingMode::Cubic, &[]),
        &reporter,
    )
    .unwrap();

    assert_eq!(*stages.lock().unwrap(), Stage::ALL.to_vec());
}

#[test]
fn repaired_case_survives_a_save_and_reload() {
    let mut case = phantom("PTV");
    generate(&mut case, &config(5.0, PackingMode::Cubic, &[])).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Lattice_Lattice.json");
    case.save(&path).unwrap();

    let reloaded = CaseFile::read_from_path(&path).unwrap();
    assert_eq!(reloaded, case);
    assert_eq!(reloaded.region_names(), vec!["PTV", "Lattice"]);
}
