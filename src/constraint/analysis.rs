use serde::Serialize;

///
/// What bounds the carriage-constrained radius.
///
/// - `CarriagePosition`: The carriages run out of rail before the arms run out of reach
/// - `ArmReach`: The arms run out of reach inside the frame
/// - `Geometry`: The frame itself is smaller than the arms could reach
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitingFactor {
    CarriagePosition,
    ArmReach,
    Geometry,
}

///
/// A diagnostic breakdown of the radial carriage search. Never used in feasibility
/// decisions.
///
/// # Fields:
/// - `carriage_constrained_radius`: The searched radius, in 5mm steps
/// - `theoretical_max_radius`: `arm_length - effector_radius`
/// - `geometric_radius`: The radius the effector body can reach before touching a rail
/// - `min_carriage_z`, `max_carriage_z`: The carriage travel bounds used by the search
/// - `limiting_factor`: The classification of the bound
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintAnalysis {
    pub carriage_constrained_radius: f64,
    pub theoretical_max_radius: f64,
    pub geometric_radius: f64,
    pub min_carriage_z: f64,
    pub max_carriage_z: f64,
    pub limiting_factor: LimitingFactor,
}

/// Below this share of the theoretical radius, the carriages are the limit.
const CARRIAGE_LIMIT_RATIO: f64 = 0.9;

///
/// # Parameters:
/// - `carriage_constrained_radius`: The searched radius
/// - `theoretical_max_radius`: The arm reach radius
/// - `geometric_radius`: The frame's usable radius
///
/// # Returns:
/// - The factor bounding the search
///
pub fn classify(carriage_constrained_radius: f64, theoretical_max_radius: f64, geometric_radius: f64) -> LimitingFactor {
    if carriage_constrained_radius < CARRIAGE_LIMIT_RATIO * theoretical_max_radius {
        LimitingFactor::CarriagePosition
    } else if theoretical_max_radius <= geometric_radius {
        LimitingFactor::ArmReach
    } else {
        LimitingFactor::Geometry
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_search_blames_the_carriages() {
        assert_eq!(classify(100., 275., 141.), LimitingFactor::CarriagePosition);
    }

    #[test]
    fn full_reach_inside_the_frame_blames_the_arms() {
        assert_eq!(classify(250., 260., 300.), LimitingFactor::ArmReach);
    }

    #[test]
    fn full_reach_past_the_frame_blames_the_geometry() {
        assert_eq!(classify(250., 260., 150.), LimitingFactor::Geometry);
    }

    #[test]
    fn factors_serialize_in_snake_case() {
        assert_eq!(serde_json::to_string(&LimitingFactor::CarriagePosition).unwrap(), "\"carriage_position\"");
    }
}
