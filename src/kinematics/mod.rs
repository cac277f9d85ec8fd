//!
//! Inverse kinematics, position validation and the combined build volume
//!

pub mod result;

use nalgebra::Vector3;
use tracing::{debug, warn};

use crate::constraint::BuildPlateConstraintCalculator;
use crate::hardware::config::DeltaConfig;
use crate::hardware::frame::CarriagePositions;
use crate::hardware::math::{self, ARM_COUNT};
use crate::hardware::{BuildVolumeConfig, RobotConfig};
use result::{BuildVolumeResult, ConfigWarning, ConstraintBreakdown, DependentParameters, FrameStatistics, ValidationResult};

/// Clearance subtracted from the horizontal-arm reach.
const KINEMATIC_MARGIN: f64 = 10.;

/// The recommended radius as a share of the maximum.
const RECOMMENDED_RADIUS_RATIO: f64 = 0.9;

/// The lowest carriage must stay this far above the build plate.
const CARRIAGE_PLATE_CLEARANCE: f64 = 10.;

/// The lowest carriage must stay this far above the bottom of the frame.
const CARRIAGE_FRAME_CLEARANCE: f64 = 25.;

/// Slack on clamps, so a clamped position clamps to itself.
const CLAMP_EPSILON: f64 = 1e-9;

/// How far a dependent parameter may drift before a new value is proposed.
const ROD_LENGTH_TOLERANCE: f64 = 10.;
const TOWER_OFFSET_TOLERANCE: f64 = 5.;
const EFFECTOR_RADIUS_TOLERANCE: f64 = 5.;
const ARM_LENGTH_TOLERANCE: f64 = 10.;

///
/// The kinematics of a linear delta frame. Holds the last configuration it was given and
/// a constraint calculator kept in sync with it; every calculation is otherwise a pure
/// function of its arguments.
///
/// # Fields:
/// - `robot`: The frame dimensions
/// - `build_volume`: The build plate settings and the last refreshed build volume
/// - `constraints`: The collision and carriage travel calculator
///
#[derive(Debug, Clone)]
pub struct DeltaCalculations {
    robot: RobotConfig,
    build_volume: BuildVolumeConfig,
    constraints: BuildPlateConstraintCalculator,
}

impl DeltaCalculations {
    ///
    /// # Parameters:
    /// - `robot`: The frame dimensions
    /// - `build_volume`: The build plate settings
    ///
    /// # Returns:
    /// - A new `DeltaCalculations` instance
    ///
    pub fn new(robot: RobotConfig, build_volume: BuildVolumeConfig) -> DeltaCalculations {
        let constraints = BuildPlateConstraintCalculator::new(&robot, &build_volume);
        DeltaCalculations { robot, build_volume, constraints }
    }

    pub fn from_config(config: &DeltaConfig) -> DeltaCalculations {
        DeltaCalculations::new(config.robot, config.build_volume.clone())
    }

    /// Replaces both configurations, keeping the calculator's safety margin.
    pub fn update_config(&mut self, robot: RobotConfig, build_volume: BuildVolumeConfig) {
        self.constraints.update_config(&robot, &build_volume);
        self.robot = robot;
        self.build_volume = build_volume;
    }

    pub fn robot_config(&self) -> &RobotConfig {
        &self.robot
    }

    pub fn build_volume_config(&self) -> &BuildVolumeConfig {
        &self.build_volume
    }

    pub fn constraint_calculator(&self) -> &BuildPlateConstraintCalculator {
        &self.constraints
    }

    /// Mutable access, for adjusting the safety margin.
    pub fn constraint_calculator_mut(&mut self) -> &mut BuildPlateConstraintCalculator {
        &mut self.constraints
    }

    ///
    /// Solves the carriage heights for an effector position. Each carriage sits one arm
    /// length from its nubs, above them.
    ///
    /// # Parameters:
    /// - `effector`: The effector centre
    ///
    /// # Returns:
    /// - The carriage heights, NaN for any tower the effector is out of reach of
    ///
    pub fn calculate_carriage_positions(&self, effector: &Vector3<f64>) -> CarriagePositions {
        self.robot.solve_carriages(effector)
    }

    ///
    /// # Parameters:
    /// - `effector`: The effector centre
    ///
    /// # Returns:
    /// - The solved carriages, whether they are all on their rails, and the elevation of
    /// each carriage seen from the effector, measured against its tower
    ///
    pub fn validate_position(&self, effector: &Vector3<f64>) -> ValidationResult {
        let carriage_positions = self.calculate_carriage_positions(effector);

        let arm_angles = std::array::from_fn(|i| {
            let tower = math::tower_position(i, self.robot.bot_radius());
            let horizontal = math::horizontal_distance_squared(&tower, effector).sqrt();
            (carriage_positions[i] - effector.z).atan2(horizontal)
        });

        ValidationResult {
            position: *effector,
            carriage_positions,
            is_reachable: self.robot.carriages_within_travel(&carriage_positions),
            arm_angles,
        }
    }

    ///
    /// # Returns:
    /// - The horizontal reach with an arm lying flat, less a 10mm margin, never negative
    ///
    pub fn calculate_kinematic_limit(&self) -> f64 {
        (self.robot.carriage_anchor_radius() + self.robot.arm_length() - self.robot.effector_radius() - KINEMATIC_MARGIN).max(0.)
    }

    ///
    /// Combines the constraint radius with the kinematic limit. The physical bed radius
    /// is never part of this.
    ///
    /// # Returns:
    /// - The build volume, with the constraints that produced it
    ///
    pub fn calculate_build_volume(&self) -> BuildVolumeResult {
        let radii = self.constraints.calculate_constraint_breakdown();
        let constraint_type = self.constraints.constraint_type();
        let constraint_radius = radii.get(constraint_type);
        let kinematic_limit = self.calculate_kinematic_limit();

        let max_print_radius = constraint_radius.min(kinematic_limit);
        let effector_zero_z = self.robot.effector_zero_z();
        let effector_endstop_z = self.robot.effector_endstop_z();
        let build_volume_height = (effector_endstop_z - effector_zero_z).max(0.);

        debug!(%constraint_type, max_print_radius, build_volume_height, "Calculated build volume");

        BuildVolumeResult {
            max_print_radius,
            recommended_print_radius: RECOMMENDED_RADIUS_RATIO * max_print_radius,
            build_volume_height,
            constraints: ConstraintBreakdown {
                constraint_type,
                constraint_radius,
                kinematic_limit,
                carriage_constrained_radius: radii.carriage_constrained_radius,
                radii,
                effector_zero_z,
                effector_endstop_z,
            },
        }
    }

    ///
    /// Calculates the build volume and stores it on the held `BuildVolumeConfig`.
    ///
    /// # Returns:
    /// - The calculated build volume
    ///
    pub fn refresh_build_volume(&mut self) -> BuildVolumeResult {
        let result = self.calculate_build_volume();
        self.build_volume.store_outputs(result.max_print_radius, result.recommended_print_radius, result.build_volume_height);
        result
    }

    ///
    /// Clamps a requested position into the build volume: onto the printable circle, then
    /// into the vertical range, then above the carriage floor. Clamping a clamped position
    /// returns it unchanged.
    ///
    /// # Parameters:
    /// - `effector`: The requested effector centre
    ///
    /// # Returns:
    /// - The nearest position the effector may take
    ///
    pub fn constrain_position(&self, effector: &Vector3<f64>) -> Vector3<f64> {
        let max_radius = self.calculate_build_volume().max_print_radius;
        let mut clamped = *effector;

        let radius = clamped.x.hypot(clamped.y);
        if radius > max_radius + CLAMP_EPSILON {
            let angle = clamped.y.atan2(clamped.x);
            clamped.x = max_radius * angle.cos();
            clamped.y = max_radius * angle.sin();
        }

        clamped.z = self.clamp_vertical(clamped.z);

        let constrained = self.apply_carriage_constraints(&clamped);
        if constrained != *effector {
            debug!(requested = ?effector, constrained = ?constrained, "Clamped effector position");
        }
        constrained
    }

    ///
    /// Raises the effector until its lowest carriage clears the build plate and the frame
    /// bottom. Raising the effector raises every carriage by the same amount, so a single
    /// correction suffices. Positions with any unreachable carriage pass through.
    ///
    /// # Parameters:
    /// - `effector`: An effector centre already inside the vertical range
    ///
    /// # Returns:
    /// - The corrected position, still capped by the top of the vertical range
    ///
    pub fn apply_carriage_constraints(&self, effector: &Vector3<f64>) -> Vector3<f64> {
        let carriages = self.calculate_carriage_positions(effector);
        if !carriages.iter().all(|z| z.is_finite()) {
            debug!(?effector, ?carriages, "Out of reach, skipping the carriage correction");
            return *effector;
        }

        let half_height = self.robot.bot_height() / 2.;
        let build_plate_level = -half_height;
        let floor = (build_plate_level + CARRIAGE_PLATE_CLEARANCE).max(-half_height + CARRIAGE_FRAME_CLEARANCE);

        let lowest = carriages.iter().copied().fold(f64::INFINITY, f64::min);
        let deficit = floor - lowest;

        let mut corrected = *effector;
        if deficit > CLAMP_EPSILON {
            corrected.z = self.clamp_vertical(corrected.z + deficit);
        }
        corrected
    }

    /// Lower bound wins if the range is inverted.
    fn clamp_vertical(&self, z: f64) -> f64 {
        z.min(self.robot.effector_endstop_z()).max(self.robot.effector_zero_z())
    }

    ///
    /// # Returns:
    /// - An arm length suiting the frame, between `0.8 * bot_radius` and the tower height
    /// less half a carriage
    ///
    pub fn calculate_optimal_arm_length(&self) -> f64 {
        let robot = &self.robot;
        let candidate = robot.bot_radius() * 2. - robot.effector_radius() * 2. - robot.carriage_inset() + robot.carriage_height();

        candidate
            .min(robot.bot_height() - robot.carriage_height() / 2.)
            .max(robot.bot_radius() * 0.8)
    }

    ///
    /// Proposes values for the parameters that follow the frame size. Values within their
    /// tolerance of the proposal are left alone, so repeated calls settle.
    ///
    /// # Returns:
    /// - The proposals, `None` where no change is needed
    ///
    pub fn calculate_dependent_parameters(&self) -> DependentParameters {
        let robot = &self.robot;
        let mut proposals = DependentParameters::default();

        let rod_length = robot.bot_radius() * 1.25;
        if (robot.diagonal_rod_length() - rod_length).abs() > ROD_LENGTH_TOLERANCE {
            proposals.diagonal_rod_length = Some(rod_length);
        }

        if (robot.tower_offset() - robot.carriage_inset()).abs() > TOWER_OFFSET_TOLERANCE {
            proposals.tower_offset = Some(robot.carriage_inset());
        }

        let effector_cap = robot.bot_radius() / 4.;
        if robot.effector_radius() - effector_cap > EFFECTOR_RADIUS_TOLERANCE {
            proposals.effector_radius = Some(effector_cap);
        }

        let arm_length = self.calculate_optimal_arm_length();
        if (robot.arm_length() - arm_length).abs() > ARM_LENGTH_TOLERANCE {
            proposals.arm_length = Some(arm_length);
        }

        proposals
    }

    ///
    /// # Returns:
    /// - The static positions of the frame parts
    ///
    pub fn calculate_frame_statistics(&self) -> FrameStatistics {
        let robot = &self.robot;

        FrameStatistics {
            tower_positions: std::array::from_fn(|i| math::tower_position(i, robot.bot_radius())),
            rail_positions: math::rail_positions(robot.bot_radius(), robot.rod_spacing()),
            carriage_anchors: robot.carriage_anchors(),
            effector_nubs: math::effector_nub_positions(robot.effector_radius(), robot.eff_spacing()),
            home_carriage_positions: self.calculate_carriage_positions(&Vector3::zeros()),
            carriage_travel: (robot.min_carriage_z(), robot.max_carriage_z()),
            frame_height: robot.bot_height(),
            total_arm_length: ARM_COUNT as f64 * robot.arm_length(),
        }
    }

    ///
    /// The forward kinematics.
    ///
    /// # Parameters:
    /// - `carriages`: The carriage heights
    ///
    /// # Returns:
    /// - The effector centre, or `None` if the arms can't meet
    ///
    pub fn calculate_effector_position(&self, carriages: &CarriagePositions) -> Option<Vector3<f64>> {
        math::effector_from_carriages(&self.robot.carriage_anchors(), &self.robot.nub_offsets(), carriages, self.robot.arm_length())
    }

    ///
    /// Checks for configurations that are numerically fine but mechanically useless. These
    /// are warnings only; every calculation still works on such a frame.
    ///
    /// # Returns:
    /// - Every warning that applies, empty for a sound frame
    ///
    pub fn check_configuration(&self) -> Vec<ConfigWarning> {
        let robot = &self.robot;
        let mut warnings = Vec::new();

        let required = (robot.carriage_anchor_radius() - robot.effector_radius()).abs();
        if !(robot.arm_length() > required) {
            warnings.push(ConfigWarning::CentreUnreachable { arm_length: robot.arm_length(), required });
        }

        let build_volume = self.calculate_build_volume();
        if build_volume.max_print_radius <= 0. {
            warnings.push(ConfigWarning::NoPrintableRadius);
        }
        if build_volume.build_volume_height <= 0. {
            warnings.push(ConfigWarning::NoBuildHeight);
        }

        let tower_edge_radius = self.constraints.tower_edge_radius();
        if robot.effector_radius() >= tower_edge_radius {
            warnings.push(ConfigWarning::EffectorTooWide { effector_radius: robot.effector_radius(), tower_edge_radius });
        }

        let optimal = self.calculate_optimal_arm_length();
        if (robot.arm_length() - optimal).abs() > ARM_LENGTH_TOLERANCE {
            warnings.push(ConfigWarning::ArmLengthOffOptimal { arm_length: robot.arm_length(), optimal });
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        warnings
    }
}

impl Default for DeltaCalculations {
    fn default() -> Self {
        DeltaCalculations::new(RobotConfig::default(), BuildVolumeConfig::default())
    }
}
