//! Coarse-to-fine estimation of the object center and bounding radius from a density field.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::lattice::Lattice;
use crate::oracle::{sample_checked, DensityOracle, RenderOptions};

/// Parameters of [`estimate_center_radius`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterRadiusParams {
    /// Number of lattice samples per axis.
    pub resolution: usize,
    /// Number of refinement iterations.
    pub iterations: usize,
    /// Half size of the first sampling box.
    pub initial_radius: f64,
    /// Samples with a density above this value bound the object.
    pub density_threshold: f64,
    /// Maximum number of points per oracle query.
    pub chunk_size: usize,
}

impl Default for CenterRadiusParams {
    fn default() -> Self {
        Self {
            resolution: 256,
            iterations: 4,
            initial_radius: 1.0,
            density_threshold: 1e-2,
            chunk_size: 65536,
        }
    }
}

impl CenterRadiusParams {
    /// Per-iteration decay of the sampling radius, `(r0 / 2)^(1 / (N - 1))`.
    pub fn scaling(&self) -> f64 {
        if self.iterations <= 1 {
            1.0
        } else {
            (self.initial_radius / 2.0).powf(1.0 / (self.iterations - 1) as f64)
        }
    }

    /// Check the parameters before any oracle query is made.
    pub fn validate(&self) -> Result<(), SceneError> {
        let invalid = |name: &'static str, reason: String| -> Result<(), SceneError> {
            Err(SceneError::InvalidParameter { name, reason })
        };
        if self.resolution < 2 {
            return invalid("resolution", format!("must be at least 2, got {}", self.resolution));
        }
        if self.iterations == 0 {
            return invalid("iterations", "must be positive".to_string());
        }
        if !(self.initial_radius.is_finite() && self.initial_radius > 0.0) {
            return invalid(
                "initial_radius",
                format!("must be finite and positive, got {}", self.initial_radius),
            );
        }
        if !self.density_threshold.is_finite() {
            return invalid("density_threshold", "must be finite".to_string());
        }
        if self.chunk_size == 0 {
            return invalid("chunk_size", "must be positive".to_string());
        }
        let scaling = self.scaling();
        if scaling > 1.0 {
            return invalid(
                "initial_radius",
                format!("sampling radius would grow by {scaling} per iteration"),
            );
        }
        Ok(())
    }
}

/// State after one refinement iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationReport {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Half size of the sampled box.
    pub sampling_radius: f64,
    /// Center after the iteration.
    pub center: DVec3,
    /// Density accumulated over all iterations so far.
    pub total_weight: f64,
}

/// Result of [`estimate_center_radius`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterEstimate {
    /// Density-weighted centroid.
    pub center: DVec3,
    /// Largest per-axis offset of a retained sample from the center.
    pub radius: f64,
    /// Number of samples above the density threshold.
    pub num_retained: usize,
    /// Trace of the refinement.
    pub iterations: Vec<IterationReport>,
}

/// Estimate the center and bounding radius of the object in a density field.
///
/// Every iteration samples a `resolution³` lattice spanning `center ± radius`, moves the
/// center to the density-weighted centroid of all samples gathered so far and shrinks the
/// radius by [`CenterRadiusParams::scaling`]. The final radius is the largest absolute
/// per-axis offset from the final center among the samples whose density exceeds the
/// threshold.
///
/// # Arguments
///
/// * `oracle` - Density field to probe.
/// * `params` - Sampling and refinement parameters.
/// * `options` - Flags forwarded to the oracle.
///
/// # Errors
///
/// * [`SceneError::InvalidParameter`] if `params` fails [`CenterRadiusParams::validate`].
/// * [`SceneError::InsufficientSupport`] if no sample exceeds the density threshold.
/// * [`SceneError::Shape`] or [`SceneError::InvalidDensity`] for malformed oracle answers.
pub fn estimate_center_radius<O: DensityOracle + ?Sized>(
    oracle: &O,
    params: &CenterRadiusParams,
    options: &RenderOptions,
) -> Result<CenterEstimate, SceneError> {
    params.validate()?;

    let scaling = params.scaling();
    let mut center = DVec3::ZERO;
    let mut radius = params.initial_radius;

    let mut weighted_sum = DVec3::ZERO;
    let mut total_weight = 0.0;
    let mut num_samples = 0usize;
    let mut retained: Vec<DVec3> = Vec::new();
    let mut reports = Vec::with_capacity(params.iterations);

    for iteration in 0..params.iterations {
        let lattice = Lattice::uniform(center, radius, params.resolution);
        for chunk in lattice.chunks(params.chunk_size) {
            let densities = sample_checked(oracle, &chunk, options)?;
            for (point, density) in chunk.iter().zip(densities) {
                weighted_sum += *point * density;
                total_weight += density;
                if density > params.density_threshold {
                    retained.push(*point);
                }
            }
            num_samples += chunk.len();
        }

        if total_weight > 0.0 {
            center = weighted_sum / total_weight;
        } else {
            log::warn!("iteration {iteration}: all sampled densities are zero, keeping center {center:?}");
        }

        log::debug!(
            "iteration {iteration}: radius {radius}, center {center:?}, total weight {total_weight}"
        );

        reports.push(IterationReport {
            iteration,
            sampling_radius: radius,
            center,
            total_weight,
        });

        radius *= scaling;
    }

    if retained.is_empty() {
        return Err(SceneError::InsufficientSupport {
            threshold: params.density_threshold,
            num_samples,
        });
    }

    let bound = retained
        .iter()
        .map(|p| (*p - center).abs().max_element())
        .fold(0.0, f64::max);

    log::debug!(
        "center {center:?}, radius {bound} from {} of {num_samples} samples",
        retained.len()
    );

    Ok(CenterEstimate {
        center,
        radius: bound,
        num_retained: retained.len(),
        iterations: reports,
    })
}
