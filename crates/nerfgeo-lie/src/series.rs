//! Alternating power series for the coefficients of the SO(3)/SE(3) maps.
//!
//! | coefficient | closed form | series |
//! |-------------|-------------|--------|
//! | `A(x)` | `sin(x) / x` | `Σ (-1)^i x^(2i) / (2i+1)!` |
//! | `B(x)` | `(1 - cos(x)) / x²` | `Σ (-1)^i x^(2i) / (2i+2)!` |
//! | `C(x)` | `(x - sin(x)) / x³` | `Σ (-1)^i x^(2i) / (2i+3)!` |
//!
//! The closed forms are 0/0 at `x = 0`, the series are not.

use serde::{Deserialize, Serialize};

/// Default number of series terms after the constant one.
pub const DEFAULT_TAYLOR_ORDER: usize = 10;

/// Numerical settings shared by the exponential and logarithm maps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Highest series index `i` evaluated by [`taylor_a`], [`taylor_b`] and [`taylor_c`].
    pub order: usize,
    /// Clamp margin applied to `(trace(R) - 1) / 2` before `acos`.
    pub log_clamp_eps: f64,
    /// Offset added to `2 A(θ)` when extracting the rotation axis.
    pub log_denominator_eps: f64,
    /// Offset added to `θ²` in the inverse of the SE(3) left Jacobian.
    pub inv_v_eps: f64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_TAYLOR_ORDER,
            log_clamp_eps: 1e-7,
            log_denominator_eps: 1e-8,
            inv_v_eps: 1e-8,
        }
    }
}

/// Sum `Σ_{i=0..=order} (-1)^i x^(2i) / denom_i` where `denom_i = denom_{i-1} * step(i)`.
fn alternating_series(x: f64, order: usize, denom_0: f64, step: impl Fn(usize) -> f64) -> f64 {
    let x_sq = x * x;
    let mut ans = 0.0;
    let mut denom = denom_0;
    let mut power = 1.0;
    for i in 0..=order {
        if i > 0 {
            denom *= step(i);
            power *= x_sq;
        }
        let term = power / denom;
        ans += if i % 2 == 0 { term } else { -term };
    }
    ans
}

/// Taylor expansion of `sin(x) / x`.
pub fn taylor_a(x: f64, order: usize) -> f64 {
    alternating_series(x, order, 1.0, |i| ((2 * i) * (2 * i + 1)) as f64)
}

/// Taylor expansion of `(1 - cos(x)) / x²`.
pub fn taylor_b(x: f64, order: usize) -> f64 {
    alternating_series(x, order, 2.0, |i| ((2 * i + 1) * (2 * i + 2)) as f64)
}

/// Taylor expansion of `(x - sin(x)) / x³`.
pub fn taylor_c(x: f64, order: usize) -> f64 {
    alternating_series(x, order, 6.0, |i| ((2 * i + 2) * (2 * i + 3)) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_values_at_zero() {
        assert_eq!(taylor_a(0.0, DEFAULT_TAYLOR_ORDER), 1.0);
        assert_eq!(taylor_b(0.0, DEFAULT_TAYLOR_ORDER), 0.5);
        assert_relative_eq!(taylor_c(0.0, DEFAULT_TAYLOR_ORDER), 1.0 / 6.0);
    }

    #[test]
    fn test_match_closed_form() {
        for &x in &[1e-3f64, 0.1, 0.5, 1.0, 2.0, 3.0] {
            let a = x.sin() / x;
            let b = (1.0 - x.cos()) / (x * x);
            let c = (x - x.sin()) / (x * x * x);
            assert_relative_eq!(taylor_a(x, DEFAULT_TAYLOR_ORDER), a, epsilon = 1e-10);
            assert_relative_eq!(taylor_b(x, DEFAULT_TAYLOR_ORDER), b, epsilon = 1e-10);
            // the closed form of C cancels catastrophically for small x
            let tol = if x < 0.01 { 1e-4 } else { 1e-10 };
            assert_relative_eq!(taylor_c(x, DEFAULT_TAYLOR_ORDER), c, epsilon = tol);
        }
    }

    #[test]
    fn test_order_controls_truncation() {
        let x = 2.5f64;
        let exact = x.sin() / x;
        let coarse = (taylor_a(x, 2) - exact).abs();
        let fine = (taylor_a(x, 10) - exact).abs();
        assert!(fine < coarse);
        // order 0 keeps only the constant term
        assert_eq!(taylor_b(x, 0), 0.5);
    }

    #[test]
    fn test_config_default() {
        let config = SeriesConfig::default();
        assert_eq!(config.order, 10);
        assert_eq!(config.log_clamp_eps, 1e-7);
    }
}
