//!
//! Kinematics and build volume calculations for linear delta printers
//!

pub mod constraint;
pub mod hardware;
pub mod kinematics;

pub use constraint::BuildPlateConstraintCalculator;
pub use hardware::config::DeltaConfig;
pub use hardware::error::{ConfigError, ConfigResult};
pub use hardware::{BuildVolumeConfig, ConstraintType, Preset, RobotConfig};
pub use kinematics::DeltaCalculations;
