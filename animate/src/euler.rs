//! Conversions between Euler angles and unit quaternions.
//!
//! Angles are packed into a `Vector3` as `(x, y, z)` rotations in radians.
//! The composed rotation is `Rz * Ry * Rx`, so `x` is applied first.

use nalgebra as na;

/// Builds rotation from per-axis angles, composed as `Rz * Ry * Rx`.
pub fn euler_to_quaternion(
    angles: &na::Vector3<f32>,
) -> na::UnitQuaternion<f32> {
    let qx = axis_rotation(na::Vector3::x_axis(), angles.x);
    let qy = axis_rotation(na::Vector3::y_axis(), angles.y);
    let qz = axis_rotation(na::Vector3::z_axis(), angles.z);

    qz * qy * qx
}

fn axis_rotation(
    axis: na::Unit<na::Vector3<f32>>,
    angle: f32,
) -> na::UnitQuaternion<f32> {
    na::UnitQuaternion::from_axis_angle(&axis, angle)
}

/// Extracts per-axis angles from rotation.
/// Inverse of [`euler_to_quaternion`] while `y` stays within `(-π/2, π/2)`.
pub fn quaternion_to_euler(q: &na::UnitQuaternion<f32>) -> na::Vector3<f32> {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);

    let pitch =
        f32::atan2(2.0 * (w * x + y * z), 1.0 - 2.0 * (x * x + y * y));

    // Rounding can push the argument slightly past 1 near gimbal lock.
    let sin_yaw = clamp_angle(2.0 * (w * y - z * x), -1.0, 1.0);
    let yaw = sin_yaw.asin();

    let roll =
        f32::atan2(2.0 * (w * z + x * y), 1.0 - 2.0 * (y * y + z * z));

    na::Vector3::new(pitch, yaw, roll)
}

/// Saturates `value` to `[min, max]`.
pub fn clamp_angle(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// Clamps each axis independently to `[-max, max]`.
///
/// This is a box clamp, not a clamp on the total rotation angle:
/// a rotation around a diagonal axis may exceed `max` in aggregate.
pub fn clamp_euler(angles: &na::Vector3<f32>, max: f32) -> na::Vector3<f32> {
    angles.map(|angle| clamp_angle(angle, -max, max))
}

/// Limits rotation to `max` radians around each axis.
pub fn limit_rotation(
    q: &na::UnitQuaternion<f32>,
    max: f32,
) -> na::UnitQuaternion<f32> {
    let angles = quaternion_to_euler(q);
    euler_to_quaternion(&clamp_euler(&angles, max))
}
