use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ConfigError, ConfigResult};
use super::{BuildVolumeConfig, Preset, RobotConfig};

///
/// A complete, validated configuration as loaded from a TOML document.
///
/// The document has an optional top level `preset` key, a `[robot]` table whose keys
/// override the preset (or the Kossel-standard layout when no preset is given), and a
/// `[build_volume]` table.
///
/// ```toml
/// preset = "kossel-mini"
///
/// [robot]
/// arm_length = 230.0
///
/// [build_volume]
/// physical_bed_radius = 100.0
/// constraint_type = "effector-tip"
/// ```
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaConfig {
    pub robot: RobotConfig,
    pub build_volume: BuildVolumeConfig,
}

#[derive(Deserialize)]
struct DeltaConfigFile {
    preset: Option<Preset>,
    #[serde(default)]
    robot: toml::Table,
    #[serde(default)]
    build_volume: BuildVolumeConfig,
}

impl DeltaConfig {
    ///
    /// Parses and validates a configuration document.
    ///
    /// # Parameters:
    /// - `source`: The TOML document
    ///
    /// # Returns:
    /// - A validated `DeltaConfig`
    /// - A `ConfigError` if the document is malformed, or any value is unusable
    ///
    pub fn from_toml_str(source: &str) -> ConfigResult<DeltaConfig> {
        let file: DeltaConfigFile = toml::from_str(source)?;
        let preset = file.preset.unwrap_or(Preset::KosselStandard);

        let mut merged = toml::Table::try_from(preset.robot_config())?;
        for (key, value) in file.robot {
            if !merged.contains_key(&key) {
                return Err(ConfigError::UnknownField(key));
            }
            merged.insert(key, value);
        }
        let robot = merged.try_into::<RobotConfig>()?;

        robot.validate()?;
        file.build_volume.validate()?;

        debug!(preset = preset.name(), constraint = %file.build_volume.constraint_type(), "Loaded delta configuration");

        Ok(DeltaConfig { robot, build_volume: file.build_volume })
    }

    ///
    /// Reads, parses and validates a configuration file.
    ///
    /// # Parameters:
    /// - `path`: The path of the TOML file
    ///
    /// # Returns:
    /// - A validated `DeltaConfig`
    /// - A `ConfigError` if the file can't be read, or its content is invalid
    ///
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<DeltaConfig> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;

        DeltaConfig::from_toml_str(&source)
    }

    ///
    /// # Returns:
    /// - The configuration as a TOML document, with every robot dimension spelled out
    ///
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string(self)?)
    }
}

impl Default for DeltaConfig {
    fn default() -> Self {
        DeltaConfig { robot: RobotConfig::default(), build_volume: BuildVolumeConfig::default() }
    }
}
