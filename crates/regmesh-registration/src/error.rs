//! Registration errors.

use regmesh_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrationError {
    /// No fixed sample maps inside the moving image, or the value is not finite.
    #[error("Metric error: {0}")]
    MetricError(String),

    /// The cost function returned NaN or the simplex could not be built.
    #[error("Optimizer error: {0}")]
    OptimizerError(String),

    /// Parameters rejected by the transform.
    #[error("Transform error: {0}")]
    TransformError(String),

    /// Empty image, bad geometry or a region outside the buffer.
    #[error("Image validation error: {0}")]
    ImageValidationError(String),

    /// Raised by `RegistrationResult::require_convergence` after the
    /// iteration budget ran out.
    #[error("Convergence failure: {0}")]
    ConvergenceFailure(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Parameter vector length differs from the transform's.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

pub type Result<T> = std::result::Result<T, RegistrationError>;

impl RegistrationError {
    pub fn metric(msg: impl Into<String>) -> Self {
        Self::MetricError(msg.into())
    }

    pub fn optimizer(msg: impl Into<String>) -> Self {
        Self::OptimizerError(msg.into())
    }

    pub fn transform(msg: impl Into<String>) -> Self {
        Self::TransformError(msg.into())
    }

    pub fn image_validation(msg: impl Into<String>) -> Self {
        Self::ImageValidationError(msg.into())
    }

    pub fn convergence_failure(msg: impl Into<String>) -> Self {
        Self::ConvergenceFailure(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }
}

impl From<CoreError> for RegistrationError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ParameterCount { .. } => Self::transform(err.to_string()),
            CoreError::InvalidGeometry(_) | CoreError::BufferSize { .. } => Self::image_validation(err.to_string()),
        }
    }
}
