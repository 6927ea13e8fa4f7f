use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Rendering flags forwarded untouched to the density oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Background intensity used by the model.
    pub background: f64,
    /// Randomize the background while sampling.
    pub random_background: bool,
    /// Ray marching step size, in voxels.
    pub step_size: f64,
    /// The dataset uses an inverted image y axis.
    pub inverse_y: bool,
    /// The dataset flips the image x axis.
    pub flip_x: bool,
    /// The dataset flips the image y axis.
    pub flip_y: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: 0.0,
            random_background: false,
            step_size: 0.5,
            inverse_y: false,
            flip_x: false,
            flip_y: false,
        }
    }
}

/// A black-box density field, usually backed by a trained radiance model.
///
/// Implementations must return exactly one non-negative density per query point.
pub trait DensityOracle {
    /// Sample the density at every point.
    fn sample_density(&self, points: &[DVec3], options: &RenderOptions) -> Vec<f64>;
}

impl<F> DensityOracle for F
where
    F: Fn(&[DVec3]) -> Vec<f64>,
{
    fn sample_density(&self, points: &[DVec3], _options: &RenderOptions) -> Vec<f64> {
        self(points)
    }
}

/// Query the oracle and validate its answer.
pub(crate) fn sample_checked<O: DensityOracle + ?Sized>(
    oracle: &O,
    points: &[DVec3],
    options: &RenderOptions,
) -> Result<Vec<f64>, SceneError> {
    let densities = oracle.sample_density(points, options);
    if densities.len() != points.len() {
        return Err(SceneError::Shape {
            name: "density batch",
            expected: points.len(),
            actual: densities.len(),
        });
    }
    if let Some((index, &value)) = densities
        .iter()
        .enumerate()
        .find(|(_, d)| !(d.is_finite() && **d >= 0.0))
    {
        return Err(SceneError::InvalidDensity { index, value });
    }
    Ok(densities)
}
