//! Metric trait for image similarity measurement.

use burn::tensor::backend::Backend;
use regmesh_core::transform::Transform;
use regmesh_core::{Image, ImageRegion};

use crate::error::Result;

/// Similarity between a fixed image and a transformed moving image.
///
/// # Type Parameters
/// * `B` - The tensor backend
/// * `D` - The spatial dimensionality
pub trait Metric<B: Backend, const D: usize> {
    /// Precompute state that stays fixed for a whole registration run,
    /// such as intensity bounds.
    fn initialize(&mut self, _fixed: &Image<B, D>, _moving: &Image<B, D>, _region: &ImageRegion<D>) -> Result<()> {
        Ok(())
    }

    /// Evaluate the metric over `region` of the fixed image.
    ///
    /// `transform` maps fixed physical points into the moving image.
    fn value(
        &self,
        fixed: &Image<B, D>,
        moving: &Image<B, D>,
        transform: &impl Transform<B, D>,
        region: &ImageRegion<D>,
    ) -> Result<f64>;

    /// Get the name of this metric.
    fn name(&self) -> &'static str;
}
