use nalgebra::Vector3;
use std::f64::consts::FRAC_PI_2;

/// The number of towers on a linear delta frame.
pub const TOWER_COUNT: usize = 3;

/// The number of diagonal arms, two per tower.
pub const ARM_COUNT: usize = 2 * TOWER_COUNT;

/// The angle of tower 0, measured anticlockwise from +X, in radians.
const TOWER_ZERO_ANGLE: f64 = std::f64::consts::PI / 6.;

/// The angle between neighbouring towers, in radians.
const TOWER_PITCH: f64 = 2. * std::f64::consts::PI / TOWER_COUNT as f64;

///
/// Every other placement function derives its angle from here, so towers, rails and
/// effector nubs can never disagree on the layout.
///
/// # Parameters:
/// - `index`: The tower index, 0 to 2
///
/// # Returns:
/// - The tower angle in radians, `index * 120° + 30°`
///
pub fn tower_angle(index: usize) -> f64 {
    index as f64 * TOWER_PITCH + TOWER_ZERO_ANGLE
}

/// The number of directions tested on each ring of the carriage search.
pub const SEARCH_DIRECTION_COUNT: usize = 4 * TOWER_COUNT;

///
/// The carriage search directions, every 30° from +X. These hold the 0°, 120° and 240°
/// axes, every tower, and the direction facing away from every tower. Away from a tower
/// its carriage drops lowest, and towards it the carriage rises highest, so a ring whose
/// test points all pass is feasible all the way round.
///
/// # Parameters:
/// - `index`: The direction index, 0 to 11
///
/// # Returns:
/// - The direction angle in radians
///
pub fn search_angle(index: usize) -> f64 {
    index as f64 * TOWER_ZERO_ANGLE
}

/// The search test point in direction `index`, `radius` from the Z axis on the centre plane.
pub fn search_position(index: usize, radius: f64) -> Vector3<f64> {
    let angle = search_angle(index);
    Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.)
}

///
/// Places a point on a tower's radial line, on the centre plane (z = 0).
///
/// # Parameters:
/// - `index`: The tower index, 0 to 2
/// - `radius`: The distance from the frame's central axis, in millimetres
///
/// # Returns:
/// - The point `radius` away from the Z axis at the tower's angle
///
pub fn tower_position(index: usize, radius: f64) -> Vector3<f64> {
    let angle = tower_angle(index);
    Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.)
}

///
/// Places one end of an arm pair. Arms `2i` and `2i + 1` belong to tower `i`, and sit
/// either side of the tower's radial line, half of `spacing` away from it.
///
/// # Parameters:
/// - `arm_index`: The arm index, 0 to 5
/// - `radius`: The distance of the pair's centre from the Z axis
/// - `spacing`: The distance between the two arms of the pair
/// - `center_only`: Return the centre of the pair instead of the arm end
///
/// # Returns:
/// - The arm end position, on the centre plane
///
pub fn arm_position(arm_index: usize, radius: f64, spacing: f64, center_only: bool) -> Vector3<f64> {
    let tower_index = arm_index / 2;
    let center = tower_position(tower_index, radius);

    if center_only || spacing == 0. {
        return center;
    }

    let side = if arm_index % 2 == 0 { 1. } else { -1. };
    let perpendicular = tower_angle(tower_index) + FRAC_PI_2;
    let half = side * spacing / 2.;

    center + Vector3::new(half * perpendicular.cos(), half * perpendicular.sin(), 0.)
}

///
/// # Parameters:
/// - `effector_radius`: The distance of each nub pair's centre from the effector centre
/// - `spacing`: The distance between the two nubs of a pair
///
/// # Returns:
/// - The six nub offsets, relative to the effector centre
///
pub fn effector_nub_positions(effector_radius: f64, spacing: f64) -> [Vector3<f64>; ARM_COUNT] {
    std::array::from_fn(|i| arm_position(i, effector_radius, spacing, false))
}

///
/// # Parameters:
/// - `radius`: The tower radius of the frame
/// - `spacing`: The distance between the two rails of a tower
///
/// # Returns:
/// - The six vertical rail centres, on the centre plane
///
pub fn rail_positions(radius: f64, spacing: f64) -> [Vector3<f64>; ARM_COUNT] {
    std::array::from_fn(|i| arm_position(i, radius, spacing, false))
}

///
/// # Returns:
/// - The squared distance between `a` and `b`, ignoring Z
///
pub fn horizontal_distance_squared(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

///
/// Solves a single tower: the carriage joint sits on the anchor's vertical line,
/// one arm length away from the nub, and always above it.
///
/// # Parameters:
/// - `anchor`: The carriage joint's horizontal position
/// - `nub`: The nub's world position
/// - `arm_length`: The diagonal rod length
///
/// # Returns:
/// - The carriage Z, or NaN when the nub is horizontally further than one arm length
///
pub fn carriage_height(anchor: &Vector3<f64>, nub: &Vector3<f64>, arm_length: f64) -> f64 {
    let horizontal_sq = horizontal_distance_squared(anchor, nub);
    let arm_sq = arm_length * arm_length;

    // NaN inputs fall through to NaN as well
    if horizontal_sq > arm_sq {
        return f64::NAN;
    }

    nub.z + (arm_sq - horizontal_sq).sqrt()
}

///
/// Converts carriage heights back into an effector position by intersecting the three
/// spheres of radius `arm_length` around the carriage joints, each shifted by its
/// tower's nub offset. Of the two intersections the lower is returned, as the effector
/// hangs below the carriages.
///
/// # Parameters:
/// - `anchors`: The horizontal carriage joint positions, one per tower
/// - `nub_offsets`: The nub pair centres relative to the effector centre, one per tower
/// - `carriages`: The carriage heights, one per tower
/// - `arm_length`: The diagonal rod length
///
/// # Returns:
/// - The effector centre
/// - `None` if the spheres don't meet, or the carriages are non-finite or degenerate
///
pub fn effector_from_carriages(anchors: &[Vector3<f64>; TOWER_COUNT], nub_offsets: &[Vector3<f64>; TOWER_COUNT], carriages: &[f64; TOWER_COUNT], arm_length: f64) -> Option<Vector3<f64>> {
    const EPSILON: f64 = 1e-9;

    let centers: [Vector3<f64>; TOWER_COUNT] = std::array::from_fn(|i| {
        Vector3::new(anchors[i].x - nub_offsets[i].x, anchors[i].y - nub_offsets[i].y, carriages[i] - nub_offsets[i].z)
    });
    if centers.iter().any(|c| !c.iter().all(|v| v.is_finite())) {
        return None;
    }

    let [p1, p2, p3] = centers;
    let d = (p2 - p1).norm();
    if d < EPSILON {
        return None;
    }
    let ex = (p2 - p1) / d;

    let i = ex.dot(&(p3 - p1));
    let ey_raw = p3 - p1 - ex * i;
    let ey_norm = ey_raw.norm();
    if ey_norm < EPSILON {
        return None;
    }
    let ey = ey_raw / ey_norm;
    let ez = ex.cross(&ey);
    let j = ey.dot(&(p3 - p1));

    // equal radii, so the radical plane of the first two spheres sits halfway between them
    let x = d / 2.;
    let y = (i * i + j * j - 2. * i * x) / (2. * j);
    let z_sq = arm_length * arm_length - x * x - y * y;
    if z_sq < -EPSILON {
        return None;
    }
    let z = z_sq.max(0.).sqrt();

    let base = p1 + ex * x + ey * y;
    let above = base + ez * z;
    let below = base - ez * z;

    Some(if above.z < below.z { above } else { below })
}
