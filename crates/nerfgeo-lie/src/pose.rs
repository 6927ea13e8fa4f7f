use glam::{DMat3, DMat4, DVec3};
use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convert::{dmat3_to_matrix3, matrix3_to_dmat3, rows_to_dmat3};

const NEAREST_ROTATION_EPS: f64 = 1e-12;
const NEAREST_ROTATION_MAX_ITERS: usize = 256;

/// Error types for pose construction and validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    /// The input does not have the number of elements required for the requested shape.
    #[error("expected {name} with {expected} elements, got {actual}")]
    Shape {
        /// Name of the offending input.
        name: &'static str,
        /// Human readable description of the accepted sizes.
        expected: &'static str,
        /// Number of elements actually provided.
        actual: usize,
    },

    /// The rotation block drifted away from SO(3) further than allowed.
    #[error("rotation is not orthonormal: deviation {deviation:e} exceeds tolerance {tolerance:e}")]
    NotOrthonormal {
        /// Largest deviation measured on `R^T R - I` and `det(R) - 1`.
        deviation: f64,
        /// Tolerance requested by the caller.
        tolerance: f64,
    },
}

/// A rigid camera-to-world transform stored as a `[R | t]` block.
///
/// The rotation is expected to be orthonormal with determinant +1. Numerical drift is
/// never corrected implicitly, use [`Pose::check_orthonormal`] to detect it and
/// [`Pose::orthonormalized`] to repair it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 4]; 3]", into = "[[f64; 4]; 3]")]
pub struct Pose {
    /// Rotation block `R`. Its columns are the camera right, up and forward axes.
    pub rotation: DMat3,
    /// Translation `t`, the camera position in world coordinates.
    pub translation: DVec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        rotation: DMat3::IDENTITY,
        translation: DVec3::ZERO,
    };

    /// Create a pose from a rotation and a translation.
    #[inline]
    pub fn new(rotation: DMat3, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Create a pure rotation.
    #[inline]
    pub fn from_rotation(rotation: DMat3) -> Self {
        Self::new(rotation, DVec3::ZERO)
    }

    /// Create a pure translation.
    #[inline]
    pub fn from_translation(translation: DVec3) -> Self {
        Self::new(DMat3::IDENTITY, translation)
    }

    /// Construct a pose from a row-major rotation and/or a translation.
    ///
    /// A missing rotation defaults to the identity and a missing translation to zero.
    ///
    /// # Arguments
    ///
    /// * `rotation` - Optional row-major 3x3 rotation with 9 elements.
    /// * `translation` - Optional translation with 3 elements.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::Shape`] when a buffer has the wrong length or when both
    /// inputs are missing.
    ///
    /// Example:
    ///
    /// ```
    /// use nerfgeo_lie::Pose;
    ///
    /// let pose = Pose::construct(None, Some(&[1.0, 2.0, 3.0])).unwrap();
    /// assert_eq!(pose.translation.to_array(), [1.0, 2.0, 3.0]);
    /// assert!(Pose::construct(Some(&[1.0, 0.0]), None).is_err());
    /// ```
    pub fn construct(
        rotation: Option<&[f64]>,
        translation: Option<&[f64]>,
    ) -> Result<Self, PoseError> {
        if rotation.is_none() && translation.is_none() {
            return Err(PoseError::Shape {
                name: "rotation or translation",
                expected: "9 or 3",
                actual: 0,
            });
        }

        let rotation = match rotation {
            Some(r) => rotation_from_row_major(r)?,
            None => DMat3::IDENTITY,
        };
        let translation = match translation {
            Some(t) => translation_from_slice(t)?,
            None => DVec3::ZERO,
        };

        Ok(Self::new(rotation, translation))
    }

    /// Parse a row-major 3x4 or 4x4 rigid transform.
    ///
    /// The bottom row of a 4x4 matrix is ignored.
    pub fn from_row_major(values: &[f64]) -> Result<Self, PoseError> {
        if values.len() != 12 && values.len() != 16 {
            return Err(PoseError::Shape {
                name: "pose matrix",
                expected: "12 (3x4) or 16 (4x4)",
                actual: values.len(),
            });
        }

        let row = |i: usize| [values[4 * i], values[4 * i + 1], values[4 * i + 2], values[4 * i + 3]];
        Ok(Self::from_rows([row(0), row(1), row(2)]))
    }

    /// Create a pose from the three rows of a `[R | t]` block.
    pub fn from_rows(rows: [[f64; 4]; 3]) -> Self {
        let rotation = rows_to_dmat3(&[
            [rows[0][0], rows[0][1], rows[0][2]],
            [rows[1][0], rows[1][1], rows[1][2]],
            [rows[2][0], rows[2][1], rows[2][2]],
        ]);
        let translation = DVec3::new(rows[0][3], rows[1][3], rows[2][3]);
        Self::new(rotation, translation)
    }

    /// Return the three rows of the `[R | t]` block.
    pub fn to_rows(&self) -> [[f64; 4]; 3] {
        let mut rows = [[0.0; 4]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            let r = self.rotation.row(i);
            *row = [r.x, r.y, r.z, self.translation[i]];
        }
        rows
    }

    /// Create a pose from a homogeneous 4x4 matrix.
    pub fn from_matrix4(m: &DMat4) -> Self {
        Self::new(DMat3::from_mat4(*m), m.w_axis.truncate())
    }

    /// Homogeneous 4x4 representation of the pose.
    pub fn to_matrix4(&self) -> DMat4 {
        DMat4::from_cols(
            self.rotation.x_axis.extend(0.0),
            self.rotation.y_axis.extend(0.0),
            self.rotation.z_axis.extend(0.0),
            self.translation.extend(1.0),
        )
    }

    /// Camera position in world coordinates.
    #[inline]
    pub fn position(&self) -> DVec3 {
        self.translation
    }

    /// Camera local +X axis expressed in world coordinates.
    #[inline]
    pub fn right(&self) -> DVec3 {
        self.rotation.x_axis
    }

    /// Camera local +Y axis expressed in world coordinates.
    #[inline]
    pub fn up(&self) -> DVec3 {
        self.rotation.y_axis
    }

    /// Camera local +Z axis expressed in world coordinates.
    #[inline]
    pub fn forward(&self) -> DVec3 {
        self.rotation.z_axis
    }

    /// Inverse transform using the transpose of the rotation.
    ///
    /// Only valid while the rotation is orthonormal.
    pub fn inverse(&self) -> Self {
        let rotation_inv = self.rotation.transpose();
        Self::new(rotation_inv, -(rotation_inv * self.translation))
    }

    /// Inverse transform using a general 3x3 matrix inverse.
    ///
    /// Slower than [`Pose::inverse`], useful for drifted rotations or as a consistency check.
    pub fn inverse_exact(&self) -> Self {
        let rotation_inv = self.rotation.inverse();
        Self::new(rotation_inv, -(rotation_inv * self.translation))
    }

    /// Apply the transform to a point.
    #[inline]
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// Apply the transform to a set of points.
    pub fn transform_points(&self, points: &[DVec3]) -> Vec<DVec3> {
        points.iter().map(|p| self.transform_point(*p)).collect()
    }

    /// Largest deviation of the rotation from SO(3).
    ///
    /// Measured as the maximum of `|R^T R - I|` over all entries and `|det(R) - 1|`.
    pub fn orthonormality_error(&self) -> f64 {
        let gram = self.rotation.transpose() * self.rotation - DMat3::IDENTITY;
        let max_entry = gram
            .to_cols_array()
            .iter()
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        max_entry.max((self.rotation.determinant() - 1.0).abs())
    }

    /// Check that the rotation is orthonormal up to `tolerance`.
    pub fn check_orthonormal(&self, tolerance: f64) -> Result<(), PoseError> {
        let deviation = self.orthonormality_error();
        if deviation > tolerance {
            return Err(PoseError::NotOrthonormal {
                deviation,
                tolerance,
            });
        }
        Ok(())
    }

    /// Replace the rotation by the nearest proper rotation matrix.
    pub fn orthonormalized(&self) -> Self {
        let nearest = Rotation3::from_matrix_eps(
            &dmat3_to_matrix3(&self.rotation),
            NEAREST_ROTATION_EPS,
            NEAREST_ROTATION_MAX_ITERS,
            Rotation3::identity(),
        );
        Self::new(matrix3_to_dmat3(nearest.matrix()), self.translation)
    }

    /// Compare two poses entry-wise with an absolute tolerance.
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f64) -> bool {
        self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
            && self.translation.abs_diff_eq(other.translation, max_abs_diff)
    }
}

impl std::ops::Mul<Pose> for Pose {
    type Output = Pose;

    /// `self * rhs` applies `rhs` first and then `self`.
    fn mul(self, rhs: Pose) -> Self::Output {
        Pose::new(
            self.rotation * rhs.rotation,
            self.rotation * rhs.translation + self.translation,
        )
    }
}

impl From<[[f64; 4]; 3]> for Pose {
    fn from(rows: [[f64; 4]; 3]) -> Self {
        Self::from_rows(rows)
    }
}

impl From<Pose> for [[f64; 4]; 3] {
    fn from(pose: Pose) -> Self {
        pose.to_rows()
    }
}

fn rotation_from_row_major(values: &[f64]) -> Result<DMat3, PoseError> {
    if values.len() != 9 {
        return Err(PoseError::Shape {
            name: "rotation",
            expected: "9 (3x3)",
            actual: values.len(),
        });
    }
    Ok(rows_to_dmat3(&[
        [values[0], values[1], values[2]],
        [values[3], values[4], values[5]],
        [values[6], values[7], values[8]],
    ]))
}

fn translation_from_slice(values: &[f64]) -> Result<DVec3, PoseError> {
    if values.len() != 3 {
        return Err(PoseError::Shape {
            name: "translation",
            expected: "3",
            actual: values.len(),
        });
    }
    Ok(DVec3::new(values[0], values[1], values[2]))
}

/// Construct a batch of poses from paired rotations and translations.
///
/// # Errors
///
/// Returns [`PoseError::Shape`] if the two batches differ in length.
pub fn construct_batch(rotations: &[DMat3], translations: &[DVec3]) -> Result<Vec<Pose>, PoseError> {
    if rotations.len() != translations.len() {
        return Err(PoseError::Shape {
            name: "translation batch",
            expected: "one translation per rotation",
            actual: translations.len(),
        });
    }
    Ok(rotations
        .iter()
        .zip(translations)
        .map(|(r, t)| Pose::new(*r, *t))
        .collect())
}

/// Invert a pose.
///
/// # Arguments
///
/// * `pose` - The pose to invert.
/// * `use_exact_inverse` - Use a general matrix inverse instead of the transpose.
pub fn invert(pose: &Pose, use_exact_inverse: bool) -> Pose {
    if use_exact_inverse {
        pose.inverse_exact()
    } else {
        pose.inverse()
    }
}

/// Invert every pose of a set.
pub fn invert_all(poses: &[Pose], use_exact_inverse: bool) -> Vec<Pose> {
    poses.iter().map(|p| invert(p, use_exact_inverse)).collect()
}

/// Compose two poses as `pose_b ∘ pose_a`, i.e. `pose_a` is applied first.
#[inline]
pub fn compose_pair(pose_a: &Pose, pose_b: &Pose) -> Pose {
    *pose_b * *pose_a
}

/// Compose a sequence of poses left to right: `poseN ∘ ... ∘ pose2 ∘ pose1`.
///
/// A singleton is returned unchanged and an empty sequence yields the identity.
pub fn compose(poses: &[Pose]) -> Pose {
    match poses.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, p| compose_pair(&acc, p)),
        None => Pose::IDENTITY,
    }
}

/// Left-apply one transform to every pose of a set: `transform ∘ pose`.
pub fn transform_all(poses: &[Pose], transform: &Pose) -> Vec<Pose> {
    poses.iter().map(|p| *transform * *p).collect()
}

/// Express world points in the camera frame of `pose`: `R^T (p - t)`.
pub fn points_to_camera(points: &[DVec3], pose: &Pose) -> Vec<DVec3> {
    let rotation_t = pose.rotation.transpose();
    points
        .iter()
        .map(|p| rotation_t * (*p - pose.translation))
        .collect()
}
