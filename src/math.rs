//! Angle helpers in the engine's coordinate convention.
//!
//! Angles are `(pitch, yaw, roll)` in degrees. Yaw turns about the vertical
//! (Z) axis, pitch about the lateral axis, and positive pitch looks down.

use std::f64::consts::PI;

use glam::Vec3;

/// Index of pitch in an angle vector.
pub const PITCH: usize = 0;
/// Index of yaw in an angle vector.
pub const YAW: usize = 1;

/// Degrees to radians, spelled out so the factor is evaluated in `f64`.
const DEG_TO_RAD: f64 = 2.0 * PI / 360.0;

/// Convert a pitch/yaw pair in degrees into a unit forward vector.
///
/// Any finite input is accepted as-is; angles wrap through sine and cosine.
/// Trigonometry runs in `f64` and the result is narrowed to `f32` at the end.
#[allow(clippy::cast_possible_truncation)]
pub fn forward_from_angles(pitch: f32, yaw: f32) -> Vec3 {
    let pitch = f64::from(pitch) * DEG_TO_RAD;
    let yaw = f64::from(yaw) * DEG_TO_RAD;

    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();

    Vec3::new((cp * cy) as f32, (cp * sy) as f32, (-sp) as f32)
}

/// Forward vector for a full angle triple. Roll does not affect it.
pub fn angles_to_forward(angles: Vec3) -> Vec3 {
    forward_from_angles(angles[PITCH], angles[YAW])
}
