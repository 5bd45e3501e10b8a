use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Display color of the generated lattice region.
pub const OUTPUT_REGION_COLOR: [u8; 3] = [255, 0, 0];

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

/// Layout of sphere centres across consecutive slice planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackingMode {
    /// Every plane uses the same in-plane grid.
    #[default]
    Cubic,
    /// Every other plane is shifted by half a grid step along rows and columns.
    HexagonalOffset,
}

impl PackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackingMode::Cubic => "cubic",
            PackingMode::HexagonalOffset => "hexagonal",
        }
    }
}

impl fmt::Display for PackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cubic" | "standard" => Ok(PackingMode::Cubic),
            "hexagonal" | "hexagonal-offset" | "hex" | "staggered" => {
                Ok(PackingMode::HexagonalOffset)
            }
            other => Err(ConfigError::InvalidParameter {
                parameter: "packing",
                reason: format!(
                    "unknown packing mode '{}' (expected 'cubic' or 'hexagonal')",
                    other
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereConfig {
    pub diameter_mm: f64,
    pub spacing_mm: f64,
    pub margin_mm: f64,
    pub packing: PackingMode,
}

impl SphereConfig {
    pub fn radius_mm(&self) -> f64 {
        self.diameter_mm / 2.0
    }

    /// Minimum distance from the region boundary at which a sphere centre may sit.
    pub fn clearance_mm(&self) -> f64 {
        self.radius_mm() + self.margin_mm
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("diameter_mm", self.diameter_mm)?;
        positive("spacing_mm", self.spacing_mm)?;
        if !self.margin_mm.is_finite() || self.margin_mm < 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "margin_mm",
                reason: format!("must be zero or greater, got {}", self.margin_mm),
            });
        }
        Ok(())
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            parameter,
            reason: format!("must be greater than zero, got {}", value),
        })
    }
}

fn non_empty(parameter: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::InvalidParameter {
            parameter,
            reason: "must not be empty".to_string(),
        })
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatticeConfig {
    pub target: String,
    pub obstacles: Vec<String>,
    pub output_name: String,
    pub sphere: SphereConfig,
}

impl LatticeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("target", &self.target)?;
        non_empty("output_name", &self.output_name)?;
        self.sphere.validate()
    }
}

#[derive(Default)]
pub struct LatticeConfigBuilder {
    target: Option<String>,
    obstacles: Vec<String>,
    output_name: Option<String>,
    diameter_mm: Option<f64>,
    spacing_mm: Option<f64>,
    margin_mm: Option<f64>,
    packing: Option<PackingMode>,
}

impl LatticeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.target = Some(name.into());
        self
    }
    pub fn obstacles<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.obstacles.extend(names.into_iter().map(Into::into));
        self
    }
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }
    pub fn diameter_mm(mut self, diameter: f64) -> Self {
        self.diameter_mm = Some(diameter);
        self
    }
    pub fn spacing_mm(mut self, spacing: f64) -> Self {
        self.spacing_mm = Some(spacing);
        self
    }
    pub fn margin_mm(mut self, margin: f64) -> Self {
        self.margin_mm = Some(margin);
        self
    }
    pub fn packing(mut self, packing: PackingMode) -> Self {
        self.packing = Some(packing);
        self
    }

    pub fn build(self) -> Result<LatticeConfig, ConfigError> {
        let sphere = SphereConfig {
            diameter_mm: self
                .diameter_mm
                .ok_or(ConfigError::MissingParameter("diameter_mm"))?,
            spacing_mm: self
                .spacing_mm
                .ok_or(ConfigError::MissingParameter("spacing_mm"))?,
            margin_mm: self
                .margin_mm
                .ok_or(ConfigError::MissingParameter("margin_mm"))?,
            packing: self.packing.unwrap_or_default(),
        };
        let config = LatticeConfig {
            target: self.target.ok_or(ConfigError::MissingParameter("target"))?,
            obstacles: self.obstacles,
            output_name: self
                .output_name
                .ok_or(ConfigError::MissingParameter("output_name"))?,
            sphere,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> LatticeConfigBuilder {
        LatticeConfigBuilder::new()
            .target("PTV")
            .obstacles(["Cord", "Lung"])
            .output_name("Lattice_GTV")
            .diameter_mm(15.0)
            .spacing_mm(60.0)
            .margin_mm(7.5)
    }

    #[test]
    fn builder_produces_complete_config() {
        let config = complete_builder()
            .packing(PackingMode::HexagonalOffset)
            .build()
            .unwrap();
        assert_eq!(config.target, "PTV");
        assert_eq!(config.obstacles, vec!["Cord", "Lung"]);
        assert_eq!(config.sphere.packing, PackingMode::HexagonalOffset);
        assert_eq!(config.sphere.radius_mm(), 7.5);
        assert_eq!(config.sphere.clearance_mm(), 15.0);
    }

    #[test]
    fn packing_defaults_to_cubic() {
        assert_eq!(complete_builder().build().unwrap().sphere.packing, PackingMode::Cubic);
    }

    #[test]
    fn builder_reports_missing_parameters() {
        let result = LatticeConfigBuilder::new()
            .output_name("L")
            .diameter_mm(1.0)
            .spacing_mm(1.0)
            .margin_mm(0.0)
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("target")));
    }

    #[test]
    fn non_positive_sizes_are_rejected() {
        assert!(matches!(
            complete_builder().diameter_mm(0.0).build(),
            Err(ConfigError::InvalidParameter { parameter: "diameter_mm", .. })
        ));
        assert!(matches!(
            complete_builder().spacing_mm(-5.0).build(),
            Err(ConfigError::InvalidParameter { parameter: "spacing_mm", .. })
        ));
        assert!(matches!(
            complete_builder().spacing_mm(f64::NAN).build(),
            Err(ConfigError::InvalidParameter { parameter: "spacing_mm", .. })
        ));
    }

    #[test]
    fn zero_margin_is_allowed_but_negative_is_not() {
        assert!(complete_builder().margin_mm(0.0).build().is_ok());
        assert!(matches!(
            complete_builder().margin_mm(-0.1).build(),
            Err(ConfigError::InvalidParameter { parameter: "margin_mm", .. })
        ));
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(matches!(
            complete_builder().output_name("  ").build(),
            Err(ConfigError::InvalidParameter { parameter: "output_name", .. })
        ));
        assert!(matches!(
            complete_builder().target("").build(),
            Err(ConfigError::InvalidParameter { parameter: "target", .. })
        ));
    }

    #[test]
    fn packing_mode_parses_common_spellings() {
        assert_eq!("cubic".parse(), Ok(PackingMode::Cubic));
        assert_eq!(" Hexagonal ".parse(), Ok(PackingMode::HexagonalOffset));
        assert_eq!("hexagonal-offset".parse(), Ok(PackingMode::HexagonalOffset));
        assert!("triangular".parse::<PackingMode>().is_err());
        assert_eq!(PackingMode::HexagonalOffset.to_string(), "hexagonal");
    }
}
