use nalgebra::Vector3;
use serde::Serialize;

use crate::constraint::ConstraintRadii;
use crate::hardware::frame::CarriagePositions;
use crate::hardware::math::{ARM_COUNT, TOWER_COUNT};
use crate::hardware::{ConstraintType, RobotConfig};

///
/// The reachability of a single effector position.
///
/// # Fields:
/// - `position`: The position checked
/// - `carriage_positions`: The solved carriage heights, NaN where out of reach
/// - `is_reachable`: Whether every carriage is finite and within its rail travel
/// - `arm_angles`: The elevation of each carriage from the effector, measured against its
/// tower, in radians, for display
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub position: Vector3<f64>,
    pub carriage_positions: CarriagePositions,
    pub is_reachable: bool,
    pub arm_angles: [f64; TOWER_COUNT],
}

///
/// The inputs to the final radius, for display.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintBreakdown {
    pub constraint_type: ConstraintType,
    pub constraint_radius: f64,
    pub kinematic_limit: f64,
    pub carriage_constrained_radius: f64,
    pub radii: ConstraintRadii,
    pub effector_zero_z: f64,
    pub effector_endstop_z: f64,
}

///
/// The usable build volume: a cylinder of `max_print_radius` and `build_volume_height`.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildVolumeResult {
    pub max_print_radius: f64,
    pub recommended_print_radius: f64,
    pub build_volume_height: f64,
    pub constraints: ConstraintBreakdown,
}

///
/// Proposed values for parameters that usually follow the frame size. A field is `None`
/// when the current value is already close enough.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DependentParameters {
    pub diagonal_rod_length: Option<f64>,
    pub tower_offset: Option<f64>,
    pub effector_radius: Option<f64>,
    pub arm_length: Option<f64>,
}

impl DependentParameters {
    /// True when nothing needs to change.
    pub fn is_empty(&self) -> bool {
        *self == DependentParameters::default()
    }

    ///
    /// # Parameters:
    /// - `robot`: The configuration the proposals were derived from
    ///
    /// # Returns:
    /// - A copy of `robot` with every proposal applied
    ///
    pub fn apply(&self, robot: &RobotConfig) -> RobotConfig {
        let mut updated = *robot;

        if let Some(value) = self.diagonal_rod_length {
            updated.set_diagonal_rod_length(value);
        }
        if let Some(value) = self.tower_offset {
            updated.set_tower_offset(value);
        }
        if let Some(value) = self.effector_radius {
            updated.set_effector_radius(value);
        }
        if let Some(value) = self.arm_length {
            updated.set_arm_length(value);
        }

        updated
    }
}

///
/// Static positions of the frame parts, for the renderer.
///
/// # Fields:
/// - `tower_positions`: The tower centres on the centre plane
/// - `rail_positions`: The six vertical rail centres
/// - `carriage_anchors`: The carriage joint positions on the centre plane
/// - `effector_nubs`: The six nub offsets relative to the effector centre
/// - `home_carriage_positions`: The carriage heights with the effector at the origin
/// - `carriage_travel`: The (min, max) carriage height
/// - `frame_height`: The tower height
/// - `total_arm_length`: The combined length of all six arms
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameStatistics {
    pub tower_positions: [Vector3<f64>; TOWER_COUNT],
    pub rail_positions: [Vector3<f64>; ARM_COUNT],
    pub carriage_anchors: [Vector3<f64>; TOWER_COUNT],
    pub effector_nubs: [Vector3<f64>; ARM_COUNT],
    pub home_carriage_positions: CarriagePositions,
    pub carriage_travel: (f64, f64),
    pub frame_height: f64,
    pub total_arm_length: f64,
}

///
/// Non-fatal problems with a configuration. The frame stays usable for exploration.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    /// The arms can't reach the build plate centre.
    CentreUnreachable { arm_length: f64, required: f64 },
    /// Nothing is printable under the active constraint.
    NoPrintableRadius,
    /// The effector can't rise above the build plate.
    NoBuildHeight,
    /// The effector is wider than the space between the rails.
    EffectorTooWide { effector_radius: f64, tower_edge_radius: f64 },
    /// The arm length is far from the calculated optimum.
    ArmLengthOffOptimal { arm_length: f64, optimal: f64 },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::CentreUnreachable { arm_length, required } => write!(f, "Arms of {arm_length:.1}mm can't reach the centre, at least {required:.1}mm is needed"),
            ConfigWarning::NoPrintableRadius => write!(f, "No printable radius under the active constraint"),
            ConfigWarning::NoBuildHeight => write!(f, "The effector can't rise above the build plate"),
            ConfigWarning::EffectorTooWide { effector_radius, tower_edge_radius } => write!(f, "Effector radius {effector_radius:.1}mm exceeds the rail edge at {tower_edge_radius:.1}mm"),
            ConfigWarning::ArmLengthOffOptimal { arm_length, optimal } => write!(f, "Arm length {arm_length:.1}mm is far from the optimal {optimal:.1}mm"),
        }
    }
}
