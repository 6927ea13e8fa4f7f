//! Regular sampling lattices and dense density extraction.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::oracle::{sample_checked, DensityOracle, RenderOptions};

/// `num` evenly spaced values over the closed interval `[start, end]`.
///
/// A single value is `start`, zero values give an empty vector.
///
/// Example:
///
/// ```
/// use nerfgeo_scene::lattice::linspace;
///
/// assert_eq!(linspace(-1.0, 1.0, 5), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
/// ```
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            values[num - 1] = end;
            values
        }
    }
}

/// An axis-aligned grid of sample points.
///
/// Points are enumerated in `ij` order: the x index varies slowest, the z index fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    axes: [Vec<f64>; 3],
}

/// Lattice spanning `center ± half_extent` with `dims[a]` samples along axis `a`.
pub fn cube_lattice(center: DVec3, half_extent: DVec3, dims: [usize; 3]) -> Lattice {
    let lo = center - half_extent;
    let hi = center + half_extent;
    Lattice {
        axes: [
            linspace(lo.x, hi.x, dims[0]),
            linspace(lo.y, hi.y, dims[1]),
            linspace(lo.z, hi.z, dims[2]),
        ],
    }
}

impl Lattice {
    /// Cubic lattice with `resolution` samples per axis spanning `center ± radius`.
    pub fn uniform(center: DVec3, radius: f64, resolution: usize) -> Self {
        cube_lattice(center, DVec3::splat(radius), [resolution; 3])
    }

    /// Number of samples along each axis.
    pub fn dims(&self) -> [usize; 3] {
        [self.axes[0].len(), self.axes[1].len(), self.axes[2].len()]
    }

    /// Total number of points.
    pub fn len(&self) -> usize {
        self.dims().iter().product()
    }

    /// Whether the lattice has no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The point with linear index `index`, or `None` past the end.
    pub fn point(&self, index: usize) -> Option<DVec3> {
        if index >= self.len() {
            return None;
        }
        let [_, ny, nz] = self.dims();
        let i = index / (ny * nz);
        let j = (index / nz) % ny;
        let k = index % nz;
        Some(DVec3::new(self.axes[0][i], self.axes[1][j], self.axes[2][k]))
    }

    /// Iterate over all points in order.
    pub fn points(&self) -> impl Iterator<Item = DVec3> + '_ {
        let [_, ny, nz] = self.dims();
        (0..self.len()).map(move |index| {
            DVec3::new(
                self.axes[0][index / (ny * nz)],
                self.axes[1][(index / nz) % ny],
                self.axes[2][index % nz],
            )
        })
    }

    /// Iterate over the points in batches of at most `chunk_size`.
    ///
    /// Only one batch is materialized at a time. A zero chunk size is treated as one.
    pub fn chunks(&self, chunk_size: usize) -> impl Iterator<Item = Vec<DVec3>> + '_ {
        let chunk_size = chunk_size.max(1);
        let len = self.len();
        let mut points = self.points();
        (0..len.div_ceil(chunk_size)).map(move |_| points.by_ref().take(chunk_size).collect())
    }
}

/// Densities sampled on a dense lattice, laid out like [`Lattice::points`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityGrid {
    /// Number of samples along x, y and z.
    pub dims: [usize; 3],
    /// Lower corner of the sampled box.
    pub min: DVec3,
    /// Upper corner of the sampled box.
    pub max: DVec3,
    /// One density per lattice point, z fastest.
    pub values: Vec<f64>,
}

impl DensityGrid {
    /// Density at lattice index `(i, j, k)`.
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        let [nx, ny, nz] = self.dims;
        if i >= nx || j >= ny || k >= nz {
            return None;
        }
        self.values.get((i * ny + j) * nz + k).copied()
    }

    /// Distance between neighbouring samples along each axis.
    pub fn spacing(&self) -> DVec3 {
        let steps = |n: usize| if n > 1 { (n - 1) as f64 } else { 1.0 };
        (self.max - self.min)
            / DVec3::new(steps(self.dims[0]), steps(self.dims[1]), steps(self.dims[2]))
    }

    /// Mean density over the grid, used as the adaptive iso level of a surface extractor.
    ///
    /// An empty grid has a mean of zero.
    pub fn mean_density(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

/// Sample the oracle on a dense lattice around `center`.
///
/// The resulting grid is the input of an iso-surface extractor.
///
/// # Arguments
///
/// * `oracle` - Density field.
/// * `center` - Center of the sampled box.
/// * `half_extent` - Half size of the box along each axis.
/// * `dims` - Number of samples along each axis.
/// * `options` - Flags forwarded to the oracle.
/// * `chunk_size` - Maximum number of points per oracle query.
///
/// # Errors
///
/// [`SceneError::InvalidParameter`] for empty dimensions, a zero chunk size or a negative
/// extent, and the oracle validation errors.
pub fn extract_density_grid<O: DensityOracle + ?Sized>(
    oracle: &O,
    center: DVec3,
    half_extent: DVec3,
    dims: [usize; 3],
    options: &RenderOptions,
    chunk_size: usize,
) -> Result<DensityGrid, SceneError> {
    if dims.contains(&0) {
        return Err(SceneError::InvalidParameter {
            name: "dims",
            reason: format!("every axis needs at least one sample, got {dims:?}"),
        });
    }
    if chunk_size == 0 {
        return Err(SceneError::InvalidParameter {
            name: "chunk_size",
            reason: "must be positive".to_string(),
        });
    }
    if !(half_extent.is_finite() && half_extent.min_element() >= 0.0) {
        return Err(SceneError::InvalidParameter {
            name: "half_extent",
            reason: format!("must be finite and non-negative, got {half_extent:?}"),
        });
    }

    let lattice = cube_lattice(center, half_extent, dims);
    let mut values = Vec::with_capacity(lattice.len());
    for chunk in lattice.chunks(chunk_size) {
        values.extend(sample_checked(oracle, &chunk, options)?);
    }

    log::debug!("extracted {dims:?} density grid around {center:?}");

    Ok(DensityGrid {
        dims,
        min: center - half_extent,
        max: center + half_extent,
        values,
    })
}
