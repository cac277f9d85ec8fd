use nalgebra::Vector3;

use super::RobotConfig;
use super::math::{self, TOWER_COUNT};

/// Carriage heights, one per tower, in millimetres.
pub type CarriagePositions = [f64; TOWER_COUNT];

// Quantities derived from the frame dimensions, shared by the constraint search and the kinematics.
impl RobotConfig {
    /// The distance of the carriage ball joints from the central axis.
    pub fn carriage_anchor_radius(&self) -> f64 {
        self.bot_radius - self.carriage_inset
    }

    /// The carriage joint positions on the centre plane, one per tower.
    pub fn carriage_anchors(&self) -> [Vector3<f64>; TOWER_COUNT] {
        let radius = self.carriage_anchor_radius();
        std::array::from_fn(|i| math::tower_position(i, radius))
    }

    /// The centre of each tower's nub pair, relative to the effector centre.
    pub fn nub_offsets(&self) -> [Vector3<f64>; TOWER_COUNT] {
        std::array::from_fn(|i| math::tower_position(i, self.effector_radius))
    }

    /// The lowest carriage height the rails allow.
    pub fn min_carriage_z(&self) -> f64 {
        -self.max_carriage_z()
    }

    /// The highest carriage height the rails allow.
    pub fn max_carriage_z(&self) -> f64 {
        self.bot_height / 2. - self.carriage_height / 2.
    }

    /// The effector height resting on the build plate.
    pub fn effector_zero_z(&self) -> f64 {
        -self.bot_height / 2. + self.effector_height / 2.
    }

    /// The effector height with every carriage at its endstop.
    pub fn effector_endstop_z(&self) -> f64 {
        self.bot_height / 2. - self.arm_length - self.carriage_height / 2.
    }

    ///
    /// The inverse kinematics of the frame.
    ///
    /// # Parameters:
    /// - `effector`: The effector centre position
    ///
    /// # Returns:
    /// - The carriage heights, NaN for any tower the effector is out of reach of
    ///
    pub fn solve_carriages(&self, effector: &Vector3<f64>) -> CarriagePositions {
        let anchors = self.carriage_anchors();
        let offsets = self.nub_offsets();

        std::array::from_fn(|i| math::carriage_height(&anchors[i], &(effector + offsets[i]), self.arm_length))
    }

    ///
    /// # Returns:
    /// - True if every carriage is finite and within the rail travel
    ///
    pub fn carriages_within_travel(&self, carriages: &CarriagePositions) -> bool {
        let (min, max) = (self.min_carriage_z(), self.max_carriage_z());
        carriages.iter().all(|z| z.is_finite() && *z >= min && *z <= max)
    }
}
