//! Interpolator trait for sampling values at continuous coordinates.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Samples a pixel tensor at continuous indices.
///
/// # Type Parameters
/// * `B` - The Burn backend
pub trait Interpolator<B: Backend> {
    /// Interpolate `data` (layout `[.., Y, X]`) at `indices` (`[Batch, D]`,
    /// columns in index order, x first).
    ///
    /// Indices outside the buffer are clamped to the border; callers that
    /// must exclude such samples test the indices first.
    fn interpolate<const D: usize>(&self, data: &Tensor<B, D>, indices: Tensor<B, 2>) -> Tensor<B, 1>;
}
