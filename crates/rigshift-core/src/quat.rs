//! Quaternion helpers shared by the builder and the runtime.
//!
//! All compositions use the `parent * child` convention: `a * b` applies `b`
//! first, then `a`.

use glam::Quat;

/// Default tolerance for [`same_rotation`].
pub const ROTATION_EPSILON: f32 = 1e-5;

/// Re-expresses `q` in the frame `frame` by conjugation: `frame⁻¹ · q · frame`.
pub fn change_frame(q: Quat, frame: Quat) -> Quat {
    frame.inverse() * q * frame
}

/// Rotation taking `from` to `to` in `from`'s frame: `from⁻¹ · to`.
pub fn from_to(from: Quat, to: Quat) -> Quat {
    from.inverse() * to
}

/// Compares two rotations up to quaternion sign.
///
/// `q` and `-q` describe the same rotation, so the comparison is on the
/// absolute dot product of the normalized inputs.
pub fn same_rotation(a: Quat, b: Quat, epsilon: f32) -> bool {
    a.normalize().dot(b.normalize()).abs() >= 1.0 - epsilon
}
