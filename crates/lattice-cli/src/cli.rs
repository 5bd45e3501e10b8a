use clap::{Args, Parser, Subcommand};
use latticert::engine::config::PackingMode;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "LatticeRT Developers",
    version,
    about = "LatticeRT CLI - Generate spherical lattice structures inside radiotherapy target volumes.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a sphere lattice inside a target region and add it to the case.
    Generate(GenerateArgs),
    /// List the region names available in a case file.
    Rois(RoisArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    // --- Core Arguments ---
    /// Path to the input case file (series geometry and structure set, JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output case file.
    /// Defaults to `Lattice_<output-name>.json` next to the input.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Region Overrides ---
    /// Name of the target region the lattice is placed in.
    #[arg(short, long, value_name = "NAME")]
    pub target: Option<String>,

    /// Name of a region to keep spheres away from. Can be used multiple times.
    #[arg(short = 'x', long = "obstacle", value_name = "NAME")]
    pub obstacles: Vec<String>,

    /// Name of the generated lattice region.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub output_name: Option<String>,

    // --- Sphere Overrides ---
    /// Sphere diameter in millimetres.
    #[arg(short, long = "diameter", value_name = "MM")]
    pub diameter_mm: Option<f64>,

    /// Centre-to-centre spacing in millimetres.
    #[arg(short, long = "spacing", value_name = "MM")]
    pub spacing_mm: Option<f64>,

    /// Extra clearance between sphere surfaces and the region boundary, in millimetres.
    #[arg(short, long = "margin", value_name = "MM")]
    pub margin_mm: Option<f64>,

    /// Packing mode: 'cubic' or 'hexagonal'.
    #[arg(short, long, value_name = "MODE")]
    pub packing: Option<PackingMode>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S sphere.margin-mm=5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `rois` subcommand.
#[derive(Args, Debug)]
pub struct RoisArgs {
    /// Path to the case file to inspect.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,
}
