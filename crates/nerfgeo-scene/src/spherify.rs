//! Spherical scene normalization.
//!
//! Cameras of an inward-facing capture roughly look at a common region. The point closest
//! to all viewing rays becomes the new origin, the mean offset from it to the cameras the
//! new up axis, and the scene is rescaled so the cameras sit on the unit sphere on average.

use glam::{DMat3, DVec3};
use nerfgeo_lie::{pose, Pose};
use serde::{Deserialize, Serialize};

use crate::average::{check_pose_set, DEFAULT_ROTATION_TOLERANCE};
use crate::error::SceneError;

// relative to the mean camera distance from the ray intersection
const BALANCED_EPS: f64 = 1e-9;

/// Parameters for [`spherify_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpherifyParams {
    /// Smallest accepted `|det|` of the averaged ray projector.
    pub singular_eps: f64,
    /// Auxiliary direction crossed with the up axis to complete the new frame.
    pub frame_hint: DVec3,
    /// Largest accepted deviation of an input rotation from SO(3).
    pub rotation_tolerance: f64,
}

impl Default for SpherifyParams {
    fn default() -> Self {
        Self {
            singular_eps: 1e-10,
            frame_hint: DVec3::new(0.1, 0.2, 0.3),
            rotation_tolerance: DEFAULT_ROTATION_TOLERANCE,
        }
    }
}

/// Output of [`spherify`].
#[derive(Debug, Clone)]
pub struct Spherified {
    /// Poses expressed in the new frame and rescaled.
    pub poses: Vec<Pose>,
    /// Root-mean-square camera distance to the origin after rescaling.
    pub radius: f64,
    /// Uniform scale factor applied to the scene, the inverse of the raw camera radius.
    pub scale: f64,
    /// Rescaled near/far bounds.
    pub bounds: Vec<[f64; 2]>,
    /// Rescaled depth samples.
    pub depths: Vec<f64>,
    /// Point closest to all viewing rays, in input coordinates.
    pub center: DVec3,
    /// The new frame in input coordinates, before rescaling.
    pub frame: Pose,
}

impl Spherified {
    /// Map a point from input coordinates into the normalized scene.
    pub fn normalize_point(&self, point: DVec3) -> DVec3 {
        self.frame.inverse().transform_point(point) * self.scale
    }
}

/// Find the point minimizing the summed squared distance to a set of lines.
///
/// Each line `i` goes through `origins[i]` along `directions[i]`. With the projector
/// `A_i = I - d_i d_iᵀ` onto the plane orthogonal to the unit direction, the solution is
/// `(mean A_i)⁻¹ mean(A_i o_i)`.
///
/// # Errors
///
/// * [`SceneError::Shape`] if the slices differ in length.
/// * [`SceneError::DegenerateGeometry`] for an empty set or a zero direction.
/// * [`SceneError::SingularSystem`] if the lines are all parallel.
pub fn closest_point_to_rays(
    origins: &[DVec3],
    directions: &[DVec3],
    singular_eps: f64,
) -> Result<DVec3, SceneError> {
    if origins.len() != directions.len() {
        return Err(SceneError::Shape {
            name: "ray directions",
            expected: origins.len(),
            actual: directions.len(),
        });
    }
    if origins.is_empty() {
        return Err(SceneError::DegenerateGeometry(
            "cannot intersect an empty set of rays".to_string(),
        ));
    }

    let mut a_sum = DMat3::ZERO;
    let mut b_sum = DVec3::ZERO;
    for (o, d) in origins.iter().zip(directions) {
        let d = d.try_normalize().ok_or_else(|| {
            SceneError::DegenerateGeometry("ray direction has zero length".to_string())
        })?;
        let a = DMat3::IDENTITY - DMat3::from_cols(d * d.x, d * d.y, d * d.z);
        a_sum += a;
        b_sum += a * *o;
    }

    let inv_n = 1.0 / origins.len() as f64;
    let a_mean = a_sum * inv_n;
    let b_mean = b_sum * inv_n;

    let determinant = a_mean.determinant();
    if determinant.abs() < singular_eps {
        return Err(SceneError::SingularSystem { determinant });
    }

    Ok(a_mean.inverse() * b_mean)
}

/// Spherify a pose set with the default parameters.
///
/// See [`spherify_with`].
pub fn spherify(
    poses: &[Pose],
    bounds: &[[f64; 2]],
    depths: &[f64],
) -> Result<Spherified, SceneError> {
    spherify_with(poses, bounds, depths, &SpherifyParams::default())
}

/// Re-base the poses around the point closest to all viewing rays and rescale the scene.
///
/// # Arguments
///
/// * `poses` - Camera-to-world poses; the viewing ray of each camera is its local +Z axis.
/// * `bounds` - Prior near/far depth bounds, rescaled with the scene.
/// * `depths` - Depth samples in input units, e.g. sparse point depths, rescaled with the scene.
/// * `params` - Numerical parameters.
///
/// # Returns
///
/// The normalized poses together with the applied frame and scale. Scaling all input
/// positions, bounds and depths by `k` returns the same poses, bounds and depths and a
/// scale divided by `k`.
///
/// # Errors
///
/// * [`SceneError::Pose`] if an input rotation drifted further than
///   `params.rotation_tolerance`.
/// * The errors of [`closest_point_to_rays`].
/// * [`SceneError::DegenerateGeometry`] if the cameras are balanced around the ray
///   intersection or coincide with it.
pub fn spherify_with(
    poses: &[Pose],
    bounds: &[[f64; 2]],
    depths: &[f64],
    params: &SpherifyParams,
) -> Result<Spherified, SceneError> {
    check_pose_set(poses, params.rotation_tolerance)?;

    let origins: Vec<DVec3> = poses.iter().map(|p| p.position()).collect();
    let directions: Vec<DVec3> = poses.iter().map(|p| p.forward()).collect();
    let center = closest_point_to_rays(&origins, &directions, params.singular_eps)?;

    let n = poses.len() as f64;
    let up = origins.iter().map(|o| *o - center).sum::<DVec3>() / n;

    let spread = origins.iter().map(|o| (*o - center).length()).sum::<f64>() / n;
    if up.length() <= BALANCED_EPS * spread {
        return Err(SceneError::DegenerateGeometry(
            "cameras are balanced around the ray intersection".to_string(),
        ));
    }
    let z = up.normalize();
    let x = params.frame_hint.cross(z).try_normalize().ok_or_else(|| {
        SceneError::DegenerateGeometry("frame hint is parallel to the up axis".to_string())
    })?;
    let y = z.cross(x).normalize();
    let frame = Pose::new(DMat3::from_cols(x, y, z), center);

    let mut reset = pose::transform_all(poses, &frame.inverse());

    let raw_radius = (reset.iter().map(|p| p.translation.length_squared()).sum::<f64>() / n).sqrt();
    if !(raw_radius.is_finite() && raw_radius > 0.0) {
        return Err(SceneError::DegenerateGeometry(format!(
            "cameras coincide with the ray intersection (radius {raw_radius})"
        )));
    }

    let scale = 1.0 / raw_radius;
    for p in reset.iter_mut() {
        p.translation *= scale;
    }
    let bounds = bounds.iter().map(|[near, far]| [near * scale, far * scale]).collect();
    let depths = depths.iter().map(|d| d * scale).collect();

    log::debug!("spherify: center {center:?}, raw radius {raw_radius}, scale {scale}");

    Ok(Spherified {
        poses: reset,
        radius: raw_radius * scale,
        scale,
        bounds,
        depths,
        center,
        frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::average::view_matrix;
    use approx::assert_relative_eq;
    use nerfgeo_lie::PoseError;

    fn ring(target: DVec3, radius: f64, height: f64, n: usize) -> Result<Vec<Pose>, SceneError> {
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                let position = target + DVec3::new(radius * t.cos(), height, radius * t.sin());
                // the camera looks along -Z towards the target
                view_matrix(position - target, DVec3::Y, position)
            })
            .collect()
    }

    #[test]
    fn test_closest_point_to_rays() -> Result<(), SceneError> {
        let target = DVec3::new(1.0, -2.0, 0.5);
        let origins = vec![DVec3::ZERO, DVec3::new(3.0, 1.0, 0.0), DVec3::new(0.0, 4.0, 4.0)];
        let directions: Vec<DVec3> = origins.iter().map(|o| target - *o).collect();
        let p = closest_point_to_rays(&origins, &directions, 1e-10)?;
        assert!(p.abs_diff_eq(target, 1e-10));
        Ok(())
    }

    #[test]
    fn test_parallel_rays_are_singular() {
        let origins = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
        let directions = vec![DVec3::Z; 3];
        assert!(matches!(
            closest_point_to_rays(&origins, &directions, 1e-10),
            Err(SceneError::SingularSystem { .. })
        ));
        assert!(matches!(
            closest_point_to_rays(&origins, &directions[..2], 1e-10),
            Err(SceneError::Shape { .. })
        ));
    }

    #[test]
    fn test_spherify_ring() -> Result<(), SceneError> {
        let target = DVec3::new(2.0, 1.0, -3.0);
        let poses = ring(target, 4.0, 1.5, 16)?;
        let result = spherify(&poses, &[[0.5, 10.0]], &[2.0, 3.0])?;

        assert!(result.center.abs_diff_eq(target, 1e-9));
        assert_relative_eq!(result.radius, 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.scale, 1.0 / (4.0f64.powi(2) + 1.5f64.powi(2)).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(result.bounds[0][1], 10.0 * result.scale, epsilon = 1e-12);

        for p in result.poses.iter() {
            assert_relative_eq!(p.translation.length(), 1.0, epsilon = 1e-9);
            assert!(p.check_orthonormal(1e-12).is_ok());
        }

        // the ring is symmetric so the new up axis is the world y axis
        assert!(result.frame.forward().abs_diff_eq(DVec3::Y, 1e-9));
        assert!(result.normalize_point(target).abs_diff_eq(DVec3::ZERO, 1e-9));
        assert_eq!(result.depths, vec![2.0 * result.scale, 3.0 * result.scale]);
        Ok(())
    }

    #[test]
    fn test_spherify_rejects_drifted_rotation() -> Result<(), SceneError> {
        let mut poses = ring(DVec3::ZERO, 3.0, 1.0, 6)?;
        poses[2].rotation *= 3.0;
        assert!(matches!(
            spherify(&poses, &[], &[]),
            Err(SceneError::Pose(PoseError::NotOrthonormal { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_spherify_balanced_cameras() -> Result<(), SceneError> {
        // cameras symmetric around the intersection point cancel the up axis
        let poses = ring(DVec3::ZERO, 2.0, 0.0, 8)?;
        assert!(matches!(
            spherify(&poses, &[], &[]),
            Err(SceneError::DegenerateGeometry(_))
        ));
        Ok(())
    }
}
