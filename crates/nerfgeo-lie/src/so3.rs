//! # SO(3) exponential and logarithm
//!
//! A rotation vector `w ∈ so(3)` encodes an axis-angle rotation: the direction is the axis
//! and the norm `θ` is the angle in radians. The exponential map is the Rodrigues formula
//!
//! ```text
//! R = I + A(θ) [w]× + B(θ) [w]×²
//! ```
//!
//! with the coefficients `A` and `B` from [`crate::series`]. Because they are evaluated
//! as power series, `exp` is exact at `θ = 0` and smooth around it.

use glam::{DMat3, DVec3};

use crate::series::{taylor_a, taylor_b, taylor_c, SeriesConfig};

/// Vector space -> Lie algebra: the cross-product matrix `[w]×` with `[w]× v = w × v`.
pub fn skew_symmetric(w: DVec3) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0.0, w.z, -w.y),
        DVec3::new(-w.z, 0.0, w.x),
        DVec3::new(w.y, -w.x, 0.0),
    )
}

/// Lie algebra -> vector space, the inverse of [`skew_symmetric`].
pub fn vee(omega: &DMat3) -> DVec3 {
    DVec3::new(omega.y_axis.z, omega.z_axis.x, omega.x_axis.y)
}

/// Exponential map so(3) -> SO(3) with the default series order.
pub fn exp(w: DVec3) -> DMat3 {
    exp_with(w, &SeriesConfig::default())
}

/// Exponential map so(3) -> SO(3).
///
/// # Arguments
///
/// * `w` - Rotation vector.
/// * `config` - Series order and numerical offsets.
///
/// # Returns
///
/// The 3x3 rotation matrix.
pub fn exp_with(w: DVec3, config: &SeriesConfig) -> DMat3 {
    let wx = skew_symmetric(w);
    let theta = w.length();
    let a = taylor_a(theta, config.order);
    let b = taylor_b(theta, config.order);
    DMat3::IDENTITY + wx * a + (wx * wx) * b
}

/// Logarithm map SO(3) -> so(3) with the default settings.
pub fn log(rotation: &DMat3) -> DVec3 {
    log_with(rotation, &SeriesConfig::default())
}

/// Logarithm map SO(3) -> so(3).
///
/// The angle is recovered from the trace, clamped away from ±1 so `acos` never leaves its
/// domain, and the axis from the antisymmetric part `R - R^T = 2 A(θ) [w]×`.
///
/// PRECONDITION: the rotation angle is below π. At π the antisymmetric part vanishes and
/// the axis cannot be recovered this way.
pub fn log_with(rotation: &DMat3, config: &SeriesConfig) -> DVec3 {
    let trace = rotation.x_axis.x + rotation.y_axis.y + rotation.z_axis.z;
    let eps = config.log_clamp_eps;
    let theta = ((trace - 1.0) / 2.0).clamp(-1.0 + eps, 1.0 - eps).acos() % std::f64::consts::PI;
    let scale = 1.0 / (2.0 * taylor_a(theta, config.order) + config.log_denominator_eps);
    let ln_r = (*rotation - rotation.transpose()) * scale;
    vee(&ln_r)
}

/// Left Jacobian of SO(3), `V = I + B(θ) [w]× + C(θ) [w]×²`.
///
/// It maps the translational part of an se(3) vector to the SE(3) translation.
pub fn left_jacobian(w: DVec3) -> DMat3 {
    left_jacobian_with(w, &SeriesConfig::default())
}

/// Left Jacobian of SO(3) with explicit series settings.
pub fn left_jacobian_with(w: DVec3, config: &SeriesConfig) -> DMat3 {
    let wx = skew_symmetric(w);
    let theta = w.length();
    let b = taylor_b(theta, config.order);
    let c = taylor_c(theta, config.order);
    DMat3::IDENTITY + wx * b + (wx * wx) * c
}
