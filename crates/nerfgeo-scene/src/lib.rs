#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! All transforms are non-destructive: they borrow a pose set and return a new one.
//!
//! ```rust
//! use glam::DVec3;
//! use nerfgeo_scene::{average::view_matrix, normalize::rerotate, spherify::spherify};
//!
//! let target = DVec3::new(0.0, 0.0, -2.0);
//! let poses = (0..8)
//!     .map(|i| {
//!         let t = i as f64 / 8.0 * std::f64::consts::TAU;
//!         let position = target + DVec3::new(3.0 * t.cos(), 1.0, 3.0 * t.sin());
//!         view_matrix(position - target, DVec3::Y, position)
//!     })
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! let leveled = rerotate(&poses)?;
//! assert_eq!(leveled.len(), poses.len());
//!
//! let normalized = spherify(&poses, &[[0.1, 8.0]], &[])?;
//! assert!((normalized.radius - 1.0).abs() < 1e-9);
//! # Ok::<(), nerfgeo_scene::SceneError>(())
//! ```

/// Representative pose of a camera set.
pub mod average;

pub mod center;

mod error;
pub use error::SceneError;

pub mod lattice;

pub mod normalize;

/// Black-box density fields.
pub mod oracle;

pub mod render_path;

pub mod spherify;

pub use average::{
    average_pose, average_pose_with, check_pose_set, view_matrix, DEFAULT_ROTATION_TOLERANCE,
};
pub use center::{estimate_center_radius, CenterEstimate, CenterRadiusParams, IterationReport};
pub use lattice::{extract_density_grid, DensityGrid, Lattice};
pub use normalize::{recenter, recenter_with, rerotate, RerotateParams, Rerotation};
pub use oracle::{DensityOracle, RenderOptions};
pub use render_path::{orbit_path, spherical_pose, spiral_path, RenderFrame, RenderPath, SpiralParams};
pub use spherify::{spherify, Spherified, SpherifyParams};
