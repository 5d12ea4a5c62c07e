//! Error type shared by the core image and transform types.

use thiserror::Error;

/// Errors raised while building images or configuring transforms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A parameter vector had the wrong length for the transform.
    #[error("Parameter count mismatch: expected {expected}, got {actual}")]
    ParameterCount { expected: usize, actual: usize },

    /// Spacing or direction cannot map indices to physical space.
    #[error("Invalid image geometry: {0}")]
    InvalidGeometry(String),

    /// Pixel buffer length disagrees with the requested size.
    #[error("Pixel buffer holds {actual} values but the image size needs {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
