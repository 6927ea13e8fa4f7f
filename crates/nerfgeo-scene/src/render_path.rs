//! Synthetic camera trajectories for visualization.

use glam::{DMat3, DVec3};
use nerfgeo_lie::Pose;
use serde::{Deserialize, Serialize};

use crate::average::view_matrix;
use crate::error::SceneError;

/// One synthesized camera of a [`RenderPath`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// Path parameter the frame was generated from, in radians.
    pub angle: f64,
    /// Camera-to-world pose.
    pub pose: Pose,
}

/// An ordered sequence of synthesized poses.
///
/// Render paths are not derived from captured images and cannot be mapped back to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderPath {
    /// The frames in rendering order.
    pub frames: Vec<RenderFrame>,
}

impl RenderPath {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the path has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate over the poses in order.
    pub fn poses(&self) -> impl Iterator<Item = &Pose> + '_ {
        self.frames.iter().map(|f| &f.pose)
    }

    /// Iterate over the path parameters in order.
    pub fn angles(&self) -> impl Iterator<Item = f64> + '_ {
        self.frames.iter().map(|f| f.angle)
    }
}

/// Parameters of [`spiral_path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralParams {
    /// Semi-axes of the ellipse in the reference frame, the z entry scales the z offset.
    pub radii: DVec3,
    /// Distance of the look-at point along the reference viewing axis.
    pub focal: f64,
    /// Amplitude of the sinusoidal z offset.
    pub z_delta: f64,
    /// Frequency of the z offset relative to the orbit angle.
    pub z_rate: f64,
    /// Number of full revolutions.
    pub num_turns: f64,
    /// Number of frames, the closing duplicate angle is not included.
    pub num_frames: usize,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            radii: DVec3::ONE,
            focal: 1.0,
            z_delta: 0.0,
            z_rate: 0.5,
            num_turns: 2.0,
            num_frames: 120,
        }
    }
}

/// Evenly spaced angles over `num_turns` revolutions without the closing angle.
pub fn orbit_angles(num_turns: f64, num_frames: usize) -> Vec<f64> {
    let span = std::f64::consts::TAU * num_turns;
    (0..num_frames)
        .map(|k| span * k as f64 / num_frames as f64)
        .collect()
}

/// Synthesize a spiral trajectory around a reference pose.
///
/// For each angle `θ` the camera center is
/// `ref · ([cos θ, -sin θ, -sin(θ z_rate) z_delta] ⊙ radii)` and the camera looks at
/// `ref · (0, 0, -focal)`; its local +Z axis points away from that point.
///
/// # Arguments
///
/// * `reference` - Pose the spiral is expressed in, usually the average pose.
/// * `up` - Up hint for the synthesized frames.
/// * `params` - Shape and sampling of the spiral.
///
/// # Errors
///
/// Returns [`SceneError::DegenerateGeometry`] if a frame cannot be oriented, e.g. when the
/// viewing direction is parallel to `up`.
pub fn spiral_path(reference: &Pose, up: DVec3, params: &SpiralParams) -> Result<RenderPath, SceneError> {
    let look_at = reference.transform_point(DVec3::new(0.0, 0.0, -params.focal));

    let frames = orbit_angles(params.num_turns, params.num_frames)
        .into_iter()
        .map(|theta| {
            let local = DVec3::new(
                theta.cos(),
                -theta.sin(),
                -(theta * params.z_rate).sin() * params.z_delta,
            ) * params.radii;
            let position = reference.transform_point(local);
            let pose = view_matrix(position - look_at, up, position)?;
            Ok(RenderFrame { angle: theta, pose })
        })
        .collect::<Result<Vec<_>, SceneError>>()?;

    Ok(RenderPath { frames })
}

/// Camera pose on a sphere given by two angles in degrees.
///
/// The rotation is `Rz(gamma) · Rx(phi)`, where `Rx` turns `+y` towards `+z` and `Rz`
/// turns `+x` towards `+y`.
pub fn spherical_pose(gamma_deg: f64, phi_deg: f64, translation: DVec3) -> Pose {
    let rotation = DMat3::from_rotation_z(gamma_deg.to_radians())
        * DMat3::from_rotation_x(phi_deg.to_radians());
    Pose::new(rotation, translation)
}

/// A full orbit of [`spherical_pose`] frames sweeping `gamma` over `[-180°, 180°)`.
pub fn orbit_path(phi_deg: f64, translation: DVec3, num_frames: usize) -> RenderPath {
    let frames = (0..num_frames)
        .map(|k| {
            let gamma = -180.0 + 360.0 * k as f64 / num_frames as f64;
            RenderFrame {
                angle: gamma.to_radians(),
                pose: spherical_pose(gamma, phi_deg, translation),
            }
        })
        .collect();
    RenderPath { frames }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spiral_eight_frames() -> Result<(), SceneError> {
        let params = SpiralParams {
            radii: DVec3::new(1.0, 0.5, 1.0),
            focal: 2.0,
            z_delta: 0.2,
            z_rate: 0.5,
            num_turns: 1.0,
            num_frames: 8,
        };
        let path = spiral_path(&Pose::IDENTITY, DVec3::Y, &params)?;
        assert_eq!(path.len(), 8);

        let angles: Vec<f64> = path.angles().collect();
        assert_eq!(angles[0], 0.0);
        assert!(angles.windows(2).all(|w| w[1] > w[0]));
        assert!(*angles.last().unwrap_or(&f64::MAX) < std::f64::consts::TAU);
        assert_relative_eq!(angles[7], 7.0 / 8.0 * std::f64::consts::TAU);

        // the closing pose would duplicate the first one, it must not be there
        let first = path.frames[0].pose;
        assert!(path.poses().skip(1).all(|p| !p.abs_diff_eq(&first, 1e-6)));
        Ok(())
    }

    #[test]
    fn test_spiral_frames_look_at_focus() -> Result<(), SceneError> {
        let reference = Pose::new(
            DMat3::from_rotation_y(0.3),
            DVec3::new(0.5, -1.0, 2.0),
        );
        let params = SpiralParams {
            num_frames: 16,
            ..Default::default()
        };
        let path = spiral_path(&reference, DVec3::Y, &params)?;
        let focus = reference.transform_point(DVec3::new(0.0, 0.0, -params.focal));
        for pose in path.poses() {
            assert!(pose.check_orthonormal(1e-12).is_ok());
            // local +Z points away from the focus point
            let to_camera = (pose.position() - focus).normalize();
            assert_relative_eq!(pose.forward().dot(to_camera), 1.0, epsilon = 1e-12);
        }

        // with no z offset every center lies on the reference ellipse
        let first = path.frames[0].pose.position();
        assert!(first.abs_diff_eq(reference.transform_point(DVec3::X), 1e-12));
        Ok(())
    }

    #[test]
    fn test_spiral_empty() -> Result<(), SceneError> {
        let params = SpiralParams {
            num_frames: 0,
            ..Default::default()
        };
        assert!(spiral_path(&Pose::IDENTITY, DVec3::Y, &params)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_spherical_pose() {
        let pose = spherical_pose(0.0, 90.0, DVec3::ZERO);
        // +y turns towards +z
        assert!((pose.rotation * DVec3::Y).abs_diff_eq(DVec3::Z, 1e-12));

        let pose = spherical_pose(90.0, 0.0, DVec3::new(0.0, 0.0, 4.0));
        assert!((pose.rotation * DVec3::X).abs_diff_eq(DVec3::Y, 1e-12));
        assert_eq!(pose.translation, DVec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_orbit_path() {
        let path = orbit_path(-120.0, DVec3::ZERO, 160);
        assert_eq!(path.len(), 160);
        assert_relative_eq!(path.frames[0].angle, -std::f64::consts::PI);
        assert!(path.angles().all(|a| a < std::f64::consts::PI));
        assert!(path.poses().all(|p| p.check_orthonormal(1e-12).is_ok()));
    }

    #[test]
    fn test_render_path_serde() -> Result<(), Box<dyn std::error::Error>> {
        let path = orbit_path(-30.0, DVec3::new(0.0, 0.0, 1.0), 4);
        let json = serde_json::to_string(&path)?;
        let back: RenderPath = serde_json::from_str(&json)?;
        assert_eq!(back.len(), 4);
        assert!(back.frames[2].pose.abs_diff_eq(&path.frames[2].pose, 1e-15));
        Ok(())
    }
}
