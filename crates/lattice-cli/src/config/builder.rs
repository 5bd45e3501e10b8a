use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use latticert::engine::config::{self as core_config, PackingMode};
use std::path::{Path, PathBuf};

pub fn build_config(args: &GenerateArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;
    let sphere_file = file_config.sphere.take().unwrap_or_default();

    let target = args
        .target
        .clone()
        .or(file_config.target.take())
        .ok_or_else(|| {
            CliError::Config(
                "a target region is required (use --target or `target` in the config file)"
                    .to_string(),
            )
        })?;

    let obstacles = if args.obstacles.is_empty() {
        file_config.obstacles.take().unwrap_or_default()
    } else {
        args.obstacles.clone()
    };

    let output_name = args
        .output_name
        .clone()
        .or(file_config.output_name.take())
        .unwrap_or(defaults.output_name);

    let packing = match (args.packing, sphere_file.packing.as_deref()) {
        (Some(packing), _) => packing,
        (None, Some(name)) => name
            .parse::<PackingMode>()
            .map_err(|e| CliError::Config(e.to_string()))?,
        (None, None) => defaults.packing,
    };

    let core_config = core_config::LatticeConfigBuilder::new()
        .target(target)
        .obstacles(obstacles)
        .output_name(output_name.clone())
        .diameter_mm(
            args.diameter_mm
                .or(sphere_file.diameter_mm)
                .unwrap_or(defaults.diameter_mm),
        )
        .spacing_mm(
            args.spacing_mm
                .or(sphere_file.spacing_mm)
                .unwrap_or(defaults.spacing_mm),
        )
        .margin_mm(
            args.margin_mm
                .or(sphere_file.margin_mm)
                .unwrap_or(defaults.margin_mm),
        )
        .packing(packing)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, &output_name));

    Ok(AppConfig {
        input_path: args.input.clone(),
        output_path,
        core_config,
    })
}

/// `Lattice_<output-name>.json` in the directory of the input case.
pub fn default_output_path(input: &Path, output_name: &str) -> PathBuf {
    let file_name = format!("Lattice_{}.json", output_name);
    match input.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let parse_mm = |value: &str| -> Result<f64> {
            value.trim().parse().map_err(|_| {
                CliError::Config(format!("Invalid float value for {}: {}", key, value))
            })
        };

        match key.trim() {
            "target" => config.target = Some(value_str.to_string()),
            "output-name" => config.output_name = Some(value_str.to_string()),
            "obstacles" => {
                config.obstacles = Some(
                    value_str
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            "sphere.diameter-mm" => {
                config
                    .sphere
                    .get_or_insert_with(Default::default)
                    .diameter_mm = Some(parse_mm(value_str)?);
            }
            "sphere.spacing-mm" => {
                config
                    .sphere
                    .get_or_insert_with(Default::default)
                    .spacing_mm = Some(parse_mm(value_str)?);
            }
            "sphere.margin-mm" => {
                config
                    .sphere
                    .get_or_insert_with(Default::default)
                    .margin_mm = Some(parse_mm(value_str)?);
            }
            "sphere.packing" => {
                config.sphere.get_or_insert_with(Default::default).packing =
                    Some(value_str.to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
