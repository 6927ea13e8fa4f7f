//! # SE(3) exponential and logarithm
//!
//! An se(3) vector `(w, u)` couples a rotation vector `w` with a translational part `u`.
//! The exponential map rotates with `exp_so3(w)` and translates by `V(w) u`, where `V` is
//! the left Jacobian of SO(3). The logarithm inverts `V` in closed form:
//!
//! ```text
//! V⁻¹ = I - ½ [w]× + (1 - A / 2B) / θ² [w]×²
//! ```

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::pose::{Pose, PoseError};
use crate::series::{taylor_a, taylor_b, SeriesConfig};
use crate::so3;

/// A tangent vector of SE(3), rotation part first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Se3Vector {
    /// Rotation vector.
    pub w: DVec3,
    /// Translational part.
    pub u: DVec3,
}

impl Se3Vector {
    /// Create a tangent vector from its rotation and translation parts.
    pub fn new(w: DVec3, u: DVec3) -> Self {
        Self { w, u }
    }

    /// Create a tangent vector from `[w0, w1, w2, u0, u1, u2]`.
    pub fn from_slice(values: &[f64]) -> Result<Self, PoseError> {
        if values.len() != 6 {
            return Err(PoseError::Shape {
                name: "se(3) vector",
                expected: "6",
                actual: values.len(),
            });
        }
        Ok(Self::new(
            DVec3::new(values[0], values[1], values[2]),
            DVec3::new(values[3], values[4], values[5]),
        ))
    }

    /// Return `[w0, w1, w2, u0, u1, u2]`.
    pub fn to_array(&self) -> [f64; 6] {
        [self.w.x, self.w.y, self.w.z, self.u.x, self.u.y, self.u.z]
    }
}

/// Exponential map se(3) -> SE(3) with the default series order.
pub fn exp(v: Se3Vector) -> Pose {
    exp_with(v, &SeriesConfig::default())
}

/// Exponential map se(3) -> SE(3).
pub fn exp_with(v: Se3Vector, config: &SeriesConfig) -> Pose {
    let rotation = so3::exp_with(v.w, config);
    let jacobian = so3::left_jacobian_with(v.w, config);
    Pose::new(rotation, jacobian * v.u)
}

/// Logarithm map SE(3) -> se(3) with the default settings.
pub fn log(pose: &Pose) -> Se3Vector {
    log_with(pose, &SeriesConfig::default())
}

/// Logarithm map SE(3) -> se(3).
///
/// PRECONDITION: the rotation angle is below π, see [`so3::log_with`].
pub fn log_with(pose: &Pose, config: &SeriesConfig) -> Se3Vector {
    let w = so3::log_with(&pose.rotation, config);
    let wx = so3::skew_symmetric(w);
    let theta = w.length();
    let a = taylor_a(theta, config.order);
    let b = taylor_b(theta, config.order);
    let coeff = (1.0 - a / (2.0 * b)) / (theta * theta + config.inv_v_eps);
    let inv_v = DMat3::IDENTITY - wx * 0.5 + (wx * wx) * coeff;
    Se3Vector::new(w, inv_v * pose.translation)
}

impl Pose {
    /// Exponential map se(3) -> SE(3), see [`exp`].
    pub fn exp(v: Se3Vector) -> Self {
        exp(v)
    }

    /// Logarithm map SE(3) -> se(3), see [`log`].
    pub fn log(&self) -> Se3Vector {
        log(self)
    }
}
