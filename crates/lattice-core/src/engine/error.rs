use super::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Target region '{name}' not found: {reason}")]
    TargetNotFound { name: String, reason: String },

    #[error(
        "Insufficient space: no voxel lies at least {required_mm:.2} mm (sphere radius plus margin) inside the eligible region"
    )]
    InsufficientSpace { required_mm: f64 },

    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    #[error("Failed to convert region '{name}' into contours: {source}")]
    Serialization {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for EngineError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::MissingParameter(parameter) => EngineError::InvalidParameter {
                parameter,
                reason: "value is required".to_string(),
            },
            ConfigError::InvalidParameter { parameter, reason } => {
                EngineError::InvalidParameter { parameter, reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_become_invalid_parameters() {
        let missing: EngineError = ConfigError::MissingParameter("target").into();
        assert!(matches!(
            missing,
            EngineError::InvalidParameter { parameter: "target", .. }
        ));

        let invalid: EngineError = ConfigError::InvalidParameter {
            parameter: "diameter_mm",
            reason: "must be greater than zero".to_string(),
        }
        .into();
        assert_eq!(
            invalid.to_string(),
            "Invalid parameter 'diameter_mm': must be greater than zero"
        );
    }

    #[test]
    fn insufficient_space_message_names_the_threshold() {
        let error = EngineError::InsufficientSpace { required_mm: 12.5 };
        assert!(error.to_string().contains("12.50 mm"));
    }
}
