//!
//! Collision and carriage travel bounds on the printable radius
//!

pub mod analysis;

use getset::{CopyGetters, Setters};
use nalgebra::Vector3;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::hardware::math::{self, SEARCH_DIRECTION_COUNT};
use crate::hardware::{BuildVolumeConfig, ConstraintType, RobotConfig};
use analysis::ConstraintAnalysis;

/// The default clearance kept between the effector and the frame, in millimetres.
pub const DEFAULT_SAFETY_MARGIN: f64 = 10.;

/// The thickness of the frame's horizontal extrusions, in millimetres.
pub const EXTRUSION_THICKNESS: f64 = 20.;

/// The radial step of the carriage search. Results are only this precise.
pub const SEARCH_STEP: f64 = 5.;

/// How far past the tower radius the carriage search looks.
const SEARCH_OVERSHOOT: f64 = 50.;

/// The most rings the carriage search tests, a 500m radius.
pub const MAX_SEARCH_RINGS: usize = 100_000;

///
/// The radius each collision policy would allow, all bounded by the same carriage search.
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConstraintRadii {
    pub carriage_constrained_radius: f64,
    pub effector_edge: f64,
    pub effector_tip: f64,
    pub horizontal_extrusions: f64,
}

impl ConstraintRadii {
    pub fn get(&self, constraint_type: ConstraintType) -> f64 {
        match constraint_type {
            ConstraintType::EffectorEdge => self.effector_edge,
            ConstraintType::EffectorTip => self.effector_tip,
            ConstraintType::HorizontalExtrusions => self.horizontal_extrusions,
        }
    }
}

///
/// Computes the "real" printable radius under a collision policy, and how carriage travel
/// bounds it.
///
/// # Fields:
/// - `robot`: The frame dimensions
/// - `physical_bed_radius`: The drawn bed radius, kept for reporting only
/// - `constraint_type`: The active collision policy
/// - `safety_margin`: The clearance kept from the frame
///
#[derive(Debug, Clone, CopyGetters, Setters)]
#[getset(get_copy = "pub", set = "pub")]
pub struct BuildPlateConstraintCalculator {
    robot: RobotConfig,
    physical_bed_radius: f64,
    constraint_type: ConstraintType,
    safety_margin: f64,
}

impl BuildPlateConstraintCalculator {
    ///
    /// # Parameters:
    /// - `robot`: The frame dimensions
    /// - `build_volume`: The build plate settings, supplying the policy and bed radius
    ///
    /// # Returns:
    /// - A new calculator with the default safety margin
    ///
    pub fn new(robot: &RobotConfig, build_volume: &BuildVolumeConfig) -> BuildPlateConstraintCalculator {
        BuildPlateConstraintCalculator {
            robot: *robot,
            physical_bed_radius: build_volume.physical_bed_radius(),
            constraint_type: build_volume.constraint_type(),
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }

    /// Replaces the frame and build plate settings, keeping the safety margin.
    pub fn update_config(&mut self, robot: &RobotConfig, build_volume: &BuildVolumeConfig) {
        self.robot = *robot;
        self.physical_bed_radius = build_volume.physical_bed_radius();
        self.constraint_type = build_volume.constraint_type();
    }

    /// The distance from the central axis to the inner edge of the rails.
    pub fn tower_edge_radius(&self) -> f64 {
        self.robot.bot_radius() - self.robot.rod_radius()
    }

    ///
    /// The collision bound of a policy alone, before the carriage search is applied.
    ///
    /// # Parameters:
    /// - `constraint_type`: The policy to evaluate
    ///
    pub fn collision_radius(&self, constraint_type: ConstraintType) -> f64 {
        match constraint_type {
            ConstraintType::EffectorEdge => self.tower_edge_radius() - self.robot.effector_radius() - self.safety_margin,
            // the nozzle may get closer than the effector body
            ConstraintType::EffectorTip => self.tower_edge_radius() - self.safety_margin,
            ConstraintType::HorizontalExtrusions => self.robot.bot_radius() - EXTRUSION_THICKNESS - self.safety_margin,
        }
    }

    ///
    /// # Returns:
    /// - The printable radius under the active policy, never negative
    ///
    pub fn calculate_real_build_plate_radius(&self) -> f64 {
        self.calculate_constraint_radius(self.constraint_type)
    }

    ///
    /// # Parameters:
    /// - `constraint_type`: The policy to evaluate, active or not
    ///
    /// # Returns:
    /// - The printable radius under `constraint_type`, never negative
    ///
    pub fn calculate_constraint_radius(&self, constraint_type: ConstraintType) -> f64 {
        let carriage_radius = self.calculate_carriage_constrained_radius();
        combine(self.collision_radius(constraint_type), carriage_radius)
    }

    ///
    /// Evaluates every policy against a single carriage search.
    ///
    /// # Returns:
    /// - The printable radius of each policy
    ///
    pub fn calculate_constraint_breakdown(&self) -> ConstraintRadii {
        let carriage_radius = self.calculate_carriage_constrained_radius();

        ConstraintRadii {
            carriage_constrained_radius: carriage_radius,
            effector_edge: combine(self.collision_radius(ConstraintType::EffectorEdge), carriage_radius),
            effector_tip: combine(self.collision_radius(ConstraintType::EffectorTip), carriage_radius),
            horizontal_extrusions: combine(self.collision_radius(ConstraintType::HorizontalExtrusions), carriage_radius),
        }
    }

    ///
    /// Steps outwards from the centre in 5mm rings, placing the effector on the build
    /// plate in every search direction, until a carriage would leave its rail or an arm
    /// can't reach. The feasible region is assumed to be a disc, so the first failing ring
    /// ends the search. At most `MAX_SEARCH_RINGS` rings are tested.
    ///
    /// # Returns:
    /// - The largest ring radius where every placement was feasible
    /// - 0 if even the centre is infeasible
    ///
    pub fn calculate_carriage_constrained_radius(&self) -> f64 {
        let limit = self.robot.bot_radius() + SEARCH_OVERSHOOT;
        let test_z = self.robot.effector_zero_z();

        let feasible = if limit >= 0. {
            // saturates for huge or infinite frames
            let rings = (limit / SEARCH_STEP).floor() as usize;
            if rings > MAX_SEARCH_RINGS {
                warn!(rings, max_rings = MAX_SEARCH_RINGS, "Frame too large, truncating the carriage search");
            }

            (0..=rings.min(MAX_SEARCH_RINGS))
                .map(|ring| ring as f64 * SEARCH_STEP)
                .take_while(|&radius| self.is_ring_feasible(radius, test_z))
                .last()
        } else {
            None
        };

        match feasible {
            Some(radius) => {
                debug!(radius, "Carriage constrained radius found");
                radius
            }
            None => {
                warn!(arm_length = self.robot.arm_length(), bot_radius = self.robot.bot_radius(), "No carriage feasible radius, the build plate centre is unreachable");
                0.
            }
        }
    }

    fn is_ring_feasible(&self, radius: f64, test_z: f64) -> bool {
        (0..SEARCH_DIRECTION_COUNT).all(|direction| {
            let offset = math::search_position(direction, radius);
            let effector = Vector3::new(offset.x, offset.y, test_z);
            let carriages = self.robot.solve_carriages(&effector);

            let feasible = self.robot.carriages_within_travel(&carriages);
            if !feasible {
                trace!(radius, direction, ?carriages, "Carriage out of travel");
            }
            feasible
        })
    }

    ///
    /// # Returns:
    /// - The distance left between the printable edge and the towers, less the margin.
    /// Diagnostic only
    ///
    pub fn get_constraint_clearance(&self) -> f64 {
        self.robot.bot_radius() - self.calculate_real_build_plate_radius() - self.safety_margin
    }

    ///
    /// # Returns:
    /// - A breakdown of what limits the carriage search
    ///
    pub fn get_carriage_constraint_analysis(&self) -> ConstraintAnalysis {
        let carriage_constrained_radius = self.calculate_carriage_constrained_radius();
        let theoretical_max_radius = self.robot.arm_length() - self.robot.effector_radius();
        let geometric_radius = self.tower_edge_radius() - self.robot.effector_radius();

        ConstraintAnalysis {
            carriage_constrained_radius,
            theoretical_max_radius,
            geometric_radius,
            min_carriage_z: self.robot.min_carriage_z(),
            max_carriage_z: self.robot.max_carriage_z(),
            limiting_factor: analysis::classify(carriage_constrained_radius, theoretical_max_radius, geometric_radius),
        }
    }
}

fn combine(collision_radius: f64, carriage_radius: f64) -> f64 {
    collision_radius.min(carriage_radius).max(0.)
}


#[cfg(test)]
mod tests {
    use super::*;
    use analysis::LimitingFactor;

    fn kossel(arm_length: f64) -> BuildPlateConstraintCalculator {
        let mut robot = RobotConfig::kossel_standard();
        robot.set_arm_length(arm_length);
        BuildPlateConstraintCalculator::new(&robot, &BuildVolumeConfig::default())
    }

    #[test]
    fn carriage_search_stops_at_the_last_feasible_ring() {
        // facing away from a tower, its carriage leaves the rail just under 185mm out
        assert_eq!(kossel(315.).calculate_carriage_constrained_radius(), 180.);
    }

    #[test]
    fn carriage_search_is_bound_by_the_carriage_facing_away() {
        let search = |robot: RobotConfig| BuildPlateConstraintCalculator::new(&robot, &BuildVolumeConfig::default()).calculate_carriage_constrained_radius();

        // each carriage runs out of rail about one arm length from its anchor
        assert_eq!(search(RobotConfig::kossel_mini()), 135.);
        assert_eq!(search(RobotConfig::large_format()), 195.);
    }

    #[test]
    fn carriage_search_rings_are_feasible_all_the_way_round() {
        let calculator = kossel(315.);
        let radius = calculator.calculate_carriage_constrained_radius();
        let mut robot = RobotConfig::kossel_standard();
        robot.set_arm_length(315.);

        for degree in 0..360 {
            let angle = (degree as f64).to_radians();
            let effector = Vector3::new(radius * angle.cos(), radius * angle.sin(), robot.effector_zero_z());
            assert!(robot.carriages_within_travel(&robot.solve_carriages(&effector)), "{} degrees", degree);
        }
    }

    #[test]
    fn huge_frames_truncate_the_search() {
        let scale = 1e7;
        let mut robot = RobotConfig::kossel_standard();
        robot
            .set_bot_radius(195. * scale)
            .set_bot_height(520. * scale)
            .set_arm_length(315. * scale)
            .set_effector_radius(40. * scale)
            .set_carriage_inset(25. * scale)
            .set_carriage_height(30. * scale)
            .set_effector_height(8. * scale);
        let calculator = BuildPlateConstraintCalculator::new(&robot, &BuildVolumeConfig::default());

        assert_eq!(calculator.calculate_carriage_constrained_radius(), MAX_SEARCH_RINGS as f64 * SEARCH_STEP);
    }

    #[test]
    fn carriage_search_is_zero_when_the_centre_is_unreachable() {
        assert_eq!(kossel(100.).calculate_carriage_constrained_radius(), 0.);
    }

    #[test]
    fn shorter_arms_never_widen_the_search() {
        let mut previous = f64::INFINITY;
        let mut arm_length = 400.;

        while arm_length >= 100. {
            let radius = kossel(arm_length).calculate_carriage_constrained_radius();
            assert!(radius <= previous, "arm {} gave {} after {}", arm_length, radius, previous);
            previous = radius;
            arm_length -= 7.5;
        }
    }

    #[test]
    fn policies_apply_their_collision_bounds() {
        let mut calculator = kossel(315.);

        // tower edge is 195 - 4 = 191
        assert_eq!(calculator.calculate_real_build_plate_radius(), 141.);

        // 181 for the tip alone, capped by the carriage search
        calculator.set_constraint_type(ConstraintType::EffectorTip);
        assert_eq!(calculator.calculate_real_build_plate_radius(), 180.);

        calculator.set_constraint_type(ConstraintType::HorizontalExtrusions);
        assert_eq!(calculator.calculate_real_build_plate_radius(), 165.);
    }

    #[test]
    fn carriage_search_caps_the_collision_bound() {
        let mut calculator = kossel(260.);
        calculator.set_constraint_type(ConstraintType::EffectorTip);

        let carriage_radius = calculator.calculate_carriage_constrained_radius();
        assert!(carriage_radius < 181.);
        assert_eq!(calculator.calculate_real_build_plate_radius(), carriage_radius);
    }

    #[test]
    fn radius_is_floored_at_zero() {
        let mut robot = RobotConfig::kossel_standard();
        robot.set_arm_length(315.).set_effector_radius(250.);
        let calculator = BuildPlateConstraintCalculator::new(&robot, &BuildVolumeConfig::default());

        assert_eq!(calculator.calculate_real_build_plate_radius(), 0.);
    }

    #[test]
    fn breakdown_matches_each_policy() {
        let mut calculator = kossel(315.);
        let breakdown = calculator.calculate_constraint_breakdown();

        for constraint_type in ConstraintType::ALL {
            calculator.set_constraint_type(constraint_type);
            assert_eq!(breakdown.get(constraint_type), calculator.calculate_real_build_plate_radius());
        }
    }

    #[test]
    fn clearance_subtracts_the_margin() {
        let calculator = kossel(315.);
        assert_eq!(calculator.get_constraint_clearance(), 195. - 141. - 10.);
    }

    #[test]
    fn analysis_of_the_kossel_blames_the_carriages() {
        let analysis = kossel(315.).get_carriage_constraint_analysis();

        assert_eq!(analysis.theoretical_max_radius, 275.);
        assert_eq!(analysis.carriage_constrained_radius, 180.);
        assert_eq!(analysis.limiting_factor, LimitingFactor::CarriagePosition);
    }

    #[test]
    fn pathological_frames_degrade_to_zero() {
        let mut robot = RobotConfig::kossel_standard();
        robot.set_arm_length(f64::NAN);
        let calculator = BuildPlateConstraintCalculator::new(&robot, &BuildVolumeConfig::default());
        assert_eq!(calculator.calculate_real_build_plate_radius(), 0.);

        robot.set_arm_length(315.).set_bot_radius(f64::NAN);
        let calculator = BuildPlateConstraintCalculator::new(&robot, &BuildVolumeConfig::default());
        assert_eq!(calculator.calculate_carriage_constrained_radius(), 0.);
    }
}
