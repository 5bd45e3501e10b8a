use crate::cli::GenerateArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use latticert::{
    core::io::{case::CaseFile, traits::StructureSet},
    engine::progress::ProgressReporter,
    workflows,
};
use tracing::{info, warn};

pub fn run(args: GenerateArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_config(&args)?;

    info!("Loading case file from {:?}", &app.input_path);
    let mut case = CaseFile::read_from_path(&app.input_path).map_err(|e| CliError::CaseFile {
        path: app.input_path.clone(),
        source: e,
    })?;
    let series = case.series.clone();

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Generating lattice '{}' in '{}'...",
        app.core_config.output_name, app.core_config.target
    );
    info!("Invoking the core generation workflow...");
    let outcome = workflows::generate::run(&series, &mut case, &app.core_config, &reporter)?;

    for skipped in &outcome.skipped_obstacles {
        warn!(obstacle = %skipped.name, error = %skipped.error, "Obstacle was not applied.");
        println!("Warning: obstacle '{}' skipped ({})", skipped.name, skipped.error);
    }

    info!("Writing case file to {:?}", &app.output_path);
    case.save(&app.output_path).map_err(|e| CliError::CaseFile {
        path: app.output_path.clone(),
        source: e,
    })?;

    let report = &outcome.repair.contours;
    if outcome.sphere_count == 0 {
        println!("Warning: no sphere could be placed; the lattice region is empty.");
    }
    println!(
        "✓ {} spheres placed on {} slices ({} eligible voxels, view aspect ratio {:.3})",
        outcome.sphere_count, outcome.lattice_slices, outcome.eligible_voxels, outcome.aspect_ratio
    );
    println!(
        "  Contours: {} reformatted, {} removed, {} left unformatted",
        report.reformatted,
        report.removed,
        report.unformatted.len()
    );
    println!("  Written to: {}", app.output_path.display());
    Ok(())
}
