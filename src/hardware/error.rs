use thiserror::Error;

/// Result alias for configuration loading and validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

///
/// All errors emitted from the hardware configuration boundary.
/// The kinematics never return these; unreachable positions and degenerate frames are
/// computed states. These only fire when a configuration is built or loaded.
///
/// - `InvalidParameter`: When a dimension is non-finite, or outside its allowed sign
///     Parameters:
///     - `name`: The name of the offending field
///     - `value`: The rejected value
///     - `reason`: What was expected
/// - `UnknownConstraintType`: When a constraint policy name is not recognised
/// - `UnknownPreset`: When a preset name is not recognised
/// - `UnknownField`: When a `[robot]` table names a dimension that doesn't exist
/// - `Parse`: When a TOML document could not be deserialized, e.g. a non-numeric length
/// - `Serialize`: When a configuration could not be written as TOML
/// - `Io`: When a configuration file could not be read
///
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value} for `{name}`: {reason}")]
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },

    #[error("Unknown constraint type `{0}`, expected effector-edge, effector-tip or horizontal-extrusions")]
    UnknownConstraintType(String),

    #[error("Unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("Unknown robot dimension `{0}`")]
    UnknownField(String),

    #[error("Could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not write configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not read configuration file {path}: {source}")]
    Io { path: String, source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_field() {
        let err = ConfigError::InvalidParameter { name: "arm_length", value: -3., reason: "must be positive" };
        let msg = format!("{err}");
        assert!(msg.contains("arm_length"));
        assert!(msg.contains("-3"));

        let err = ConfigError::UnknownConstraintType("nozzle".to_owned());
        assert!(format!("{err}").contains("nozzle"));
    }
}
