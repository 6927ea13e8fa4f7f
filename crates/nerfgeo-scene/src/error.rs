use nerfgeo_lie::PoseError;
use thiserror::Error;

/// Error types for the scene normalization and localization routines.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Invalid pose input.
    #[error(transparent)]
    Pose(#[from] PoseError),

    /// Mismatched buffer lengths, e.g. a density oracle answering with the wrong count.
    #[error("expected {name} with {expected} elements, got {actual}")]
    Shape {
        /// Name of the offending buffer.
        name: &'static str,
        /// Expected number of elements.
        expected: usize,
        /// Actual number of elements.
        actual: usize,
    },

    /// The camera configuration does not determine the requested quantity.
    #[error("degenerate camera geometry: {0}")]
    DegenerateGeometry(String),

    /// The least-squares ray intersection system cannot be inverted.
    #[error("ray intersection system is singular (determinant {determinant:e})")]
    SingularSystem {
        /// Determinant of the averaged projector matrix.
        determinant: f64,
    },

    /// No density sample passed the threshold, so the object cannot be bounded.
    #[error("no density sample above threshold {threshold} among {num_samples} samples")]
    InsufficientSupport {
        /// Density threshold used to retain samples.
        threshold: f64,
        /// Number of samples queried.
        num_samples: usize,
    },

    /// A numeric parameter is out of its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The density oracle returned a negative or non-finite value.
    #[error("density oracle returned invalid value {value} at index {index}")]
    InvalidDensity {
        /// Index of the offending sample in the queried batch.
        index: usize,
        /// Returned value.
        value: f64,
    },
}
