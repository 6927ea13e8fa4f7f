//! Scene recentering and re-orientation.

use glam::{DMat3, DQuat, DVec3};
use nalgebra::Matrix3;
use nerfgeo_lie::{convert, pose, Pose};
use serde::{Deserialize, Serialize};

use crate::average::{average_pose_with, check_pose_set, DEFAULT_ROTATION_TOLERANCE};
use crate::error::SceneError;

/// Express every pose in the frame of the average pose: `avg⁻¹ ∘ pose`.
///
/// The input is left untouched. Recentering an already recentered set is a no-op up to
/// floating point error, because the average of the output is the identity pose.
///
/// # Errors
///
/// Propagates the errors of [`average_pose`](crate::average::average_pose), including
/// rotations drifted further than [`DEFAULT_ROTATION_TOLERANCE`].
pub fn recenter(poses: &[Pose]) -> Result<Vec<Pose>, SceneError> {
    recenter_with(poses, DEFAULT_ROTATION_TOLERANCE)
}

/// [`recenter`] with an explicit rotation drift tolerance.
pub fn recenter_with(poses: &[Pose], rotation_tolerance: f64) -> Result<Vec<Pose>, SceneError> {
    let avg = average_pose_with(poses, rotation_tolerance)?;
    Ok(pose::transform_all(poses, &avg.inverse()))
}

/// Parameters for [`rerotate_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerotateParams {
    /// The camera positions are considered collinear when the second smallest covariance
    /// eigenvalue is below this fraction of the largest one.
    pub degeneracy_tolerance: f64,
    /// Canonical up direction the estimated axis is aligned to.
    pub target_up: DVec3,
    /// Largest accepted deviation of an input rotation from SO(3).
    pub rotation_tolerance: f64,
}

impl Default for RerotateParams {
    fn default() -> Self {
        Self {
            degeneracy_tolerance: 1e-9,
            target_up: DVec3::Y,
            rotation_tolerance: DEFAULT_ROTATION_TOLERANCE,
        }
    }
}

/// Output of [`rerotate_detailed`].
#[derive(Debug, Clone)]
pub struct Rerotation {
    /// The re-oriented poses.
    pub poses: Vec<Pose>,
    /// Rotation applied around the centroid.
    pub rotation: DMat3,
    /// Estimated up axis of the input, in input coordinates.
    pub up_axis: DVec3,
    /// Centroid of the camera positions, left in place by the rotation.
    pub centroid: DVec3,
}

impl Rerotation {
    /// The applied transform as a pose: `x -> R (x - c) + c`.
    pub fn transform(&self) -> Pose {
        Pose::new(self.rotation, self.centroid - self.rotation * self.centroid)
    }
}

/// Estimate the scene up axis from camera positions.
///
/// Camera trajectories usually sweep a roughly planar or shell-like path, so the least
/// varying direction of the positions approximates the vertical. The returned axis is
/// the unit eigenvector of the smallest covariance eigenvalue, signed so that its y
/// component is non-negative.
///
/// # Errors
///
/// Returns [`SceneError::DegenerateGeometry`] with fewer than 3 positions or when the
/// positions are collinear, as the smallest eigenvalue is then not unique.
pub fn estimate_up_axis(positions: &[DVec3], params: &RerotateParams) -> Result<DVec3, SceneError> {
    if positions.len() < 3 {
        return Err(SceneError::DegenerateGeometry(format!(
            "up axis estimation requires at least 3 camera positions, got {}",
            positions.len()
        )));
    }

    let n = positions.len() as f64;
    let mean = positions.iter().sum::<DVec3>() / n;

    let mut cov = Matrix3::<f64>::zeros();
    for p in positions {
        let d = convert::dvec3_to_vector3(&(*p - mean));
        cov += d * d.transpose();
    }
    cov /= n - 1.0;

    let eig = cov.symmetric_eigen();
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
    let (smallest, middle, largest) = (
        eig.eigenvalues[order[0]],
        eig.eigenvalues[order[1]],
        eig.eigenvalues[order[2]],
    );

    log::debug!("camera position covariance eigenvalues: {smallest:e} {middle:e} {largest:e}");

    if largest <= 0.0 || middle <= params.degeneracy_tolerance * largest {
        return Err(SceneError::DegenerateGeometry(format!(
            "camera positions are collinear or coincident (eigenvalues {smallest:e}, {middle:e}, {largest:e})"
        )));
    }

    let column = eig.eigenvectors.column(order[0]).into_owned();
    let mut up = convert::vector3_to_dvec3(&column).normalize();
    if up.y < 0.0 {
        up = -up;
    }
    Ok(up)
}

/// Re-orient the scene so that its estimated up axis becomes `(0, 1, 0)`.
///
/// See [`rerotate_detailed`].
pub fn rerotate(poses: &[Pose]) -> Result<Vec<Pose>, SceneError> {
    rerotate_with(poses, &RerotateParams::default())
}

/// Re-orient the scene with explicit parameters, see [`rerotate_detailed`].
pub fn rerotate_with(poses: &[Pose], params: &RerotateParams) -> Result<Vec<Pose>, SceneError> {
    Ok(rerotate_detailed(poses, params)?.poses)
}

/// Re-orient the scene around the centroid of the camera positions.
///
/// The minimal rotation that maps the estimated up axis onto `params.target_up` is
/// applied to every camera orientation and to every position relative to the centroid.
///
/// # Errors
///
/// Propagates the errors of [`estimate_up_axis`], and returns [`SceneError::Pose`] when an
/// input rotation drifted further than `params.rotation_tolerance`.
pub fn rerotate_detailed(poses: &[Pose], params: &RerotateParams) -> Result<Rerotation, SceneError> {
    check_pose_set(poses, params.rotation_tolerance)?;
    let positions: Vec<DVec3> = poses.iter().map(|p| p.position()).collect();
    let up_axis = estimate_up_axis(&positions, params)?;
    let target = params.target_up.try_normalize().ok_or_else(|| SceneError::InvalidParameter {
        name: "target_up",
        reason: "must be a non-zero vector".to_string(),
    })?;

    let centroid = positions.iter().sum::<DVec3>() / positions.len() as f64;
    let rotation = DMat3::from_quat(DQuat::from_rotation_arc(up_axis, target));

    log::debug!("aligning up axis {up_axis:?} to {target:?} around {centroid:?}");

    let poses = poses
        .iter()
        .map(|p| {
            Pose::new(
                rotation * p.rotation,
                rotation * (p.position() - centroid) + centroid,
            )
        })
        .collect();

    Ok(Rerotation {
        poses,
        rotation,
        up_axis,
        centroid,
    })
}
