//! Transform traits for spatial coordinate mappings.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::Result;
use crate::spatial::Point;

/// Maps points from one physical space to another.
///
/// Registration maps fixed-image points into the moving image, so the
/// transform is applied to fixed physical points.
///
/// # Type Parameters
/// * `B` - The Burn backend used for batched evaluation
/// * `D` - The spatial dimensionality
pub trait Transform<B: Backend, const D: usize> {
    /// Apply the transform to a batch of points `[Batch, D]`.
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Apply the transform to a single point on the host.
    fn transform_point(&self, point: &Point<D>) -> Point<D>;
}

/// A transform driven by a flat parameter vector.
///
/// Optimizers only see the parameter vector; fixed parameters (centers and
/// similar) are set once and never optimized.
pub trait ParametricTransform {
    /// Length of the parameter vector.
    fn number_of_parameters(&self) -> usize;

    fn parameters(&self) -> Vec<f64>;

    /// Replace the parameter vector; fails on a length mismatch.
    fn set_parameters(&mut self, parameters: &[f64]) -> Result<()>;

    fn fixed_parameters(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Reset to the identity mapping.
    fn set_identity(&mut self);
}
