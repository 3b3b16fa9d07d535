//! Angle normalization helpers.
//!
//! Every rotation delta used by the smoother must be mapped into the range
//! (−180°, +180°] before velocity or interpolation math, otherwise a target
//! rotating across the 0°/360° seam would appear to spin the long way round.

use lockon_types::Vec3;

/// Normalize `angle` (degrees) into the range (−180°, +180°].
pub fn normalize_deg(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Shortest signed angular delta from `from` to `to`, in (−180°, +180°].
pub fn delta_deg(from: f32, to: f32) -> f32 {
    normalize_deg(to - from)
}

/// Apply [`normalize_deg`] to every axis of a rotation vector.
pub fn normalize_rotation(rotation_deg: Vec3) -> Vec3 {
    Vec3::new(
        normalize_deg(rotation_deg.x),
        normalize_deg(rotation_deg.y),
        normalize_deg(rotation_deg.z),
    )
}

/// Per-axis shortest rotation delta from `from` to `to`.
pub fn rotation_delta(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(
        delta_deg(from.x, to.x),
        delta_deg(from.y, to.y),
        delta_deg(from.z, to.z),
    )
}
