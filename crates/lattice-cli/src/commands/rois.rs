use crate::cli::RoisArgs;
use crate::error::{CliError, Result};
use latticert::core::io::{case::CaseFile, traits::list_region_names};
use tracing::info;

pub fn run(args: RoisArgs) -> Result<()> {
    info!("Loading case file from {:?}", &args.input);
    let case = CaseFile::read_from_path(&args.input).map_err(|e| CliError::CaseFile {
        path: args.input.clone(),
        source: e,
    })?;

    let names = list_region_names(&case);
    info!(regions = names.len(), "Region names listed.");
    if names.is_empty() {
        println!("No regions found in {}", args.input.display());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
