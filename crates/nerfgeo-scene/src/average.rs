use glam::{DMat3, DVec3};
use nerfgeo_lie::Pose;

use crate::error::SceneError;

/// Largest accepted deviation of an input rotation from SO(3), see
/// [`Pose::orthonormality_error`].
pub const DEFAULT_ROTATION_TOLERANCE: f64 = 1e-6;

/// Check that every pose of a set has an orthonormal rotation up to `tolerance`.
///
/// # Errors
///
/// Returns [`SceneError::Pose`] wrapping the `NotOrthonormal` error of the first drifted pose.
pub fn check_pose_set(poses: &[Pose], tolerance: f64) -> Result<(), SceneError> {
    for (index, pose) in poses.iter().enumerate() {
        if let Err(err) = pose.check_orthonormal(tolerance) {
            log::debug!("pose {index} rejected: {err}");
            return Err(err.into());
        }
    }
    Ok(())
}

/// Build a camera-to-world pose from a viewing axis, an up hint and a position.
///
/// The frame is orthonormalized right-handed: `x = normalize(up × z)`,
/// `y = normalize(z × x)` with `z = normalize(forward)`.
///
/// # Errors
///
/// Returns [`SceneError::DegenerateGeometry`] when `forward` is zero or parallel to `up`.
///
/// Example:
///
/// ```
/// use glam::DVec3;
/// use nerfgeo_scene::average::view_matrix;
///
/// let pose = view_matrix(DVec3::Z, DVec3::Y, DVec3::new(1.0, 2.0, 3.0)).unwrap();
/// assert_eq!(pose.right(), DVec3::X);
/// ```
pub fn view_matrix(forward: DVec3, up: DVec3, position: DVec3) -> Result<Pose, SceneError> {
    let z = forward.try_normalize().ok_or_else(|| {
        SceneError::DegenerateGeometry("viewing direction has zero length".to_string())
    })?;
    let x = up.cross(z).try_normalize().ok_or_else(|| {
        SceneError::DegenerateGeometry("up vector is parallel to the viewing direction".to_string())
    })?;
    let y = z.cross(x).normalize();
    Ok(Pose::new(DMat3::from_cols(x, y, z), position))
}

/// Compute a representative pose of a camera set.
///
/// The position is the mean camera position, the viewing axis the normalized mean of the
/// local +Z axes and the up hint the raw mean of the local +Y axes. This is not a true
/// rotation average; it assumes roughly coherent viewing directions, as in front-facing
/// captures.
///
/// # Errors
///
/// Returns [`SceneError::DegenerateGeometry`] for an empty set or when the viewing axes
/// cancel out, and [`SceneError::Pose`] when a rotation drifted further than
/// [`DEFAULT_ROTATION_TOLERANCE`].
pub fn average_pose(poses: &[Pose]) -> Result<Pose, SceneError> {
    average_pose_with(poses, DEFAULT_ROTATION_TOLERANCE)
}

/// [`average_pose`] with an explicit rotation drift tolerance.
pub fn average_pose_with(poses: &[Pose], rotation_tolerance: f64) -> Result<Pose, SceneError> {
    check_pose_set(poses, rotation_tolerance)?;
    if poses.is_empty() {
        return Err(SceneError::DegenerateGeometry(
            "cannot average an empty pose set".to_string(),
        ));
    }

    let n = poses.len() as f64;
    let center = poses.iter().map(|p| p.position()).sum::<DVec3>() / n;
    let forward = poses.iter().map(|p| p.forward()).sum::<DVec3>();
    let up = poses.iter().map(|p| p.up()).sum::<DVec3>() / n;

    view_matrix(forward, up, center)
}
