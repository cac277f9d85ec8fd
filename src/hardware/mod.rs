//!
//! Physical frame representations, presets and boundary validation
//!

pub mod config;
pub mod error;
pub mod frame;
pub mod math;

use std::fmt;
use std::str::FromStr;

use getset::{CopyGetters, Setters};
use serde::{Deserialize, Serialize};

use error::{ConfigError, ConfigResult};

///
/// The physical dimensions of a linear delta frame.
/// All fields are measured in millimetres, and all have an associated getter and setter.
/// The frame uses Z up, with z = 0 at mid-height of the towers.
///
/// # Fields:
/// - `bot_radius`: The distance from the central axis to each tower
/// - `bot_height`: The height of the towers, and so the rail travel
/// - `rod_radius`: The radius of a vertical rail
/// - `rod_spacing`: The distance between the two rails of a tower
/// - `eff_spacing`: The distance between the two nubs of an effector arm pair
/// - `arm_length`: The diagonal rod length used by the kinematics
/// - `arm_radius`: The radius of a diagonal rod
/// - `effector_radius`: The distance from the effector centre to each nub pair
/// - `effector_height`: The thickness of the effector plate
/// - `carriage_inset`: How far the carriage joints sit inside the tower radius
/// - `carriage_height`: The height of a carriage body
/// - `carriage_ball_joint_offset`: The drop from the carriage body centre to its ball joints
/// - `tower_offset`: The offset of the tower mounting from the carriage joints
/// - `diagonal_rod_length`: The nominal rod length for the frame size
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, CopyGetters, Setters)]
#[getset(get_copy = "pub", set = "pub")]
pub struct RobotConfig {
    bot_radius: f64,
    bot_height: f64,
    rod_radius: f64,
    rod_spacing: f64,
    eff_spacing: f64,
    arm_length: f64,
    arm_radius: f64,
    effector_radius: f64,
    effector_height: f64,
    carriage_inset: f64,
    carriage_height: f64,
    carriage_ball_joint_offset: f64,
    tower_offset: f64,
    diagonal_rod_length: f64,
}

impl RobotConfig {
    ///
    /// The stock Kossel layout. Note the arm length is deliberately short; callers
    /// usually replace it with `DeltaCalculations::calculate_optimal_arm_length`.
    ///
    /// # Returns:
    /// - A new `RobotConfig` instance
    ///
    pub const fn kossel_standard() -> RobotConfig {
        RobotConfig {
            bot_radius: 195.,
            bot_height: 520.,
            rod_radius: 4.,
            rod_spacing: 60.,
            eff_spacing: 30.,
            arm_length: 100.,
            arm_radius: 3.,
            effector_radius: 40.,
            effector_height: 8.,
            carriage_inset: 25.,
            carriage_height: 30.,
            carriage_ball_joint_offset: 10.,
            tower_offset: 25.,
            diagonal_rod_length: 240.,
        }
    }

    /// A small desktop frame.
    pub const fn kossel_mini() -> RobotConfig {
        RobotConfig {
            bot_radius: 125.,
            bot_height: 400.,
            rod_radius: 4.,
            rod_spacing: 40.,
            eff_spacing: 26.,
            arm_length: 215.,
            arm_radius: 3.,
            effector_radius: 30.,
            effector_height: 8.,
            carriage_inset: 20.,
            carriage_height: 25.,
            carriage_ball_joint_offset: 8.,
            tower_offset: 20.,
            diagonal_rod_length: 156.,
        }
    }

    /// A tall frame with long arms.
    pub const fn large_format() -> RobotConfig {
        RobotConfig {
            bot_radius: 300.,
            bot_height: 900.,
            rod_radius: 5.,
            rod_spacing: 80.,
            eff_spacing: 40.,
            arm_length: 420.,
            arm_radius: 4.,
            effector_radius: 50.,
            effector_height: 10.,
            carriage_inset: 30.,
            carriage_height: 40.,
            carriage_ball_joint_offset: 12.,
            tower_offset: 30.,
            diagonal_rod_length: 375.,
        }
    }

    ///
    /// # Returns:
    /// - Every dimension paired with its field name, in declaration order
    ///
    pub fn named_fields(&self) -> [(&'static str, f64); 14] {
        [
            ("bot_radius", self.bot_radius),
            ("bot_height", self.bot_height),
            ("rod_radius", self.rod_radius),
            ("rod_spacing", self.rod_spacing),
            ("eff_spacing", self.eff_spacing),
            ("arm_length", self.arm_length),
            ("arm_radius", self.arm_radius),
            ("effector_radius", self.effector_radius),
            ("effector_height", self.effector_height),
            ("carriage_inset", self.carriage_inset),
            ("carriage_height", self.carriage_height),
            ("carriage_ball_joint_offset", self.carriage_ball_joint_offset),
            ("tower_offset", self.tower_offset),
            ("diagonal_rod_length", self.diagonal_rod_length),
        ]
    }

    ///
    /// Boundary check for user supplied dimensions. Geometrically absurd but numeric
    /// combinations pass; only non-finite values and impossible signs are rejected.
    ///
    /// # Returns:
    /// - Void if every dimension is usable
    /// - A `ConfigError::InvalidParameter` naming the first offending field
    ///
    pub fn validate(&self) -> ConfigResult<()> {
        const POSITIVE: [&str; 5] = ["bot_radius", "bot_height", "arm_length", "effector_radius", "carriage_height"];

        for (name, value) in self.named_fields() {
            if !value.is_finite() {
                return Err(ConfigError::InvalidParameter { name, value, reason: "must be a finite number" });
            }
            if POSITIVE.contains(&name) {
                if value <= 0. {
                    return Err(ConfigError::InvalidParameter { name, value, reason: "must be positive" });
                }
            } else if value < 0. {
                return Err(ConfigError::InvalidParameter { name, value, reason: "must not be negative" });
            }
        }

        Ok(())
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig::kossel_standard()
    }
}

///
/// Named frame layouts.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    KosselStandard,
    KosselMini,
    LargeFormat,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::KosselStandard, Preset::KosselMini, Preset::LargeFormat];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::KosselStandard => "kossel-standard",
            Preset::KosselMini => "kossel-mini",
            Preset::LargeFormat => "large-format",
        }
    }

    pub fn robot_config(&self) -> RobotConfig {
        match self {
            Preset::KosselStandard => RobotConfig::kossel_standard(),
            Preset::KosselMini => RobotConfig::kossel_mini(),
            Preset::LargeFormat => RobotConfig::large_format(),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL.into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_owned()))
    }
}

///
/// The real-world collision policy bounding the printable radius.
///
/// - `EffectorEdge`: The effector body must clear the rails
/// - `EffectorTip`: Only the nozzle tip must clear the rails
/// - `HorizontalExtrusions`: The effector must clear the frame's horizontal extrusions
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintType {
    #[default]
    EffectorEdge,
    EffectorTip,
    HorizontalExtrusions,
}

impl ConstraintType {
    pub const ALL: [ConstraintType; 3] = [ConstraintType::EffectorEdge, ConstraintType::EffectorTip, ConstraintType::HorizontalExtrusions];

    pub fn name(&self) -> &'static str {
        match self {
            ConstraintType::EffectorEdge => "effector-edge",
            ConstraintType::EffectorTip => "effector-tip",
            ConstraintType::HorizontalExtrusions => "horizontal-extrusions",
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConstraintType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConstraintType::ALL.into_iter()
            .find(|constraint| constraint.name() == s)
            .ok_or_else(|| ConfigError::UnknownConstraintType(s.to_owned()))
    }
}

///
/// Build plate settings, and the last computed build volume.
///
/// # Fields:
/// - `physical_bed_radius`: The radius of the bed as drawn. Never used in feasibility math
/// - `show_physical_bed`: Whether the frontend should draw the physical bed
/// - `constraint_type`: The active collision policy
/// - `max_print_radius`, `recommended_print_radius`, `build_volume_height`: Outputs,
/// written only by `DeltaCalculations::refresh_build_volume`
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CopyGetters)]
#[serde(default)]
pub struct BuildVolumeConfig {
    #[getset(get_copy = "pub")]
    physical_bed_radius: f64,
    #[getset(get_copy = "pub")]
    show_physical_bed: bool,
    #[getset(get_copy = "pub")]
    constraint_type: ConstraintType,

    #[serde(skip_deserializing)]
    #[getset(get_copy = "pub")]
    max_print_radius: f64,
    #[serde(skip_deserializing)]
    #[getset(get_copy = "pub")]
    recommended_print_radius: f64,
    #[serde(skip_deserializing)]
    #[getset(get_copy = "pub")]
    build_volume_height: f64,
}

impl BuildVolumeConfig {
    ///
    /// # Parameters:
    /// - `physical_bed_radius`: The drawn bed radius
    /// - `constraint_type`: The active collision policy
    ///
    /// # Returns:
    /// - A new `BuildVolumeConfig` with zeroed outputs
    ///
    pub fn new(physical_bed_radius: f64, constraint_type: ConstraintType) -> BuildVolumeConfig {
        BuildVolumeConfig {
            physical_bed_radius,
            show_physical_bed: true,
            constraint_type,
            max_print_radius: 0.,
            recommended_print_radius: 0.,
            build_volume_height: 0.,
        }
    }

    pub fn set_physical_bed_radius(&mut self, radius: f64) -> &mut Self {
        self.physical_bed_radius = radius;
        self
    }

    pub fn set_show_physical_bed(&mut self, show: bool) -> &mut Self {
        self.show_physical_bed = show;
        self
    }

    pub fn set_constraint_type(&mut self, constraint_type: ConstraintType) -> &mut Self {
        self.constraint_type = constraint_type;
        self
    }

    pub(crate) fn store_outputs(&mut self, max_print_radius: f64, recommended_print_radius: f64, build_volume_height: f64) {
        self.max_print_radius = max_print_radius;
        self.recommended_print_radius = recommended_print_radius;
        self.build_volume_height = build_volume_height;
    }

    ///
    /// # Returns:
    /// - Void if the bed radius is usable
    /// - A `ConfigError::InvalidParameter` otherwise
    ///
    pub fn validate(&self) -> ConfigResult<()> {
        let value = self.physical_bed_radius;
        if !value.is_finite() || value < 0. {
            return Err(ConfigError::InvalidParameter { name: "physical_bed_radius", value, reason: "must be a finite, non-negative number" });
        }
        Ok(())
    }
}

impl Default for BuildVolumeConfig {
    fn default() -> Self {
        BuildVolumeConfig::new(150., ConstraintType::default())
    }
}
