#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # nerfgeo Lie
//!
//! Camera poses are stored as a `[R | t]` block in `f64`, camera-to-world. This crate
//! provides the rigid-transform algebra on top of that representation together with the
//! exponential and logarithm maps between the Lie algebras so(3)/se(3) and the groups
//! SO(3)/SE(3).
//!
//! The maps are evaluated with truncated Taylor series instead of trigonometric ratios, so
//! they stay finite and accurate when the rotation angle goes to zero.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use nerfgeo_lie::{pose, so3, Pose};
//!
//! let w = DVec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2);
//! let rotation = so3::exp(w);
//! let pose = Pose::new(rotation, DVec3::new(1.0, 2.0, 3.0));
//!
//! let identity = pose::compose(&[pose, pose.inverse()]);
//! assert!(identity.abs_diff_eq(&Pose::IDENTITY, 1e-12));
//! assert!((so3::log(&rotation) - w).length() < 1e-6);
//! ```

/// Conversions between glam and nalgebra matrix types.
pub mod convert;

/// Rigid camera poses and their composition and inversion.
pub mod pose;

/// Exponential and logarithm maps for SE(3).
pub mod se3;

/// Truncated Taylor series used by the Lie group maps.
pub mod series;

/// Exponential and logarithm maps for SO(3).
pub mod so3;

pub use pose::{Pose, PoseError};
pub use se3::Se3Vector;
pub use series::SeriesConfig;
