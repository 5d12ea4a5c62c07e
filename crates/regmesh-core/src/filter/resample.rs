//! Resample image filter.
//!
//! Resamples an image onto a reference grid through a transform and an
//! interpolator. The transform maps output physical points into the input
//! image, which is the direction a registration transform maps fixed points
//! into the moving image.

use std::marker::PhantomData;

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor};

use crate::error::Result;
use crate::image::{generate_grid, inside_mask, Image, ImageGeometry, ImageRegion};
use crate::interpolation::Interpolator;
use crate::transform::Transform;

/// Resample image filter.
///
/// # Type Parameters
/// * `B` - The Burn backend
/// * `T` - The transform type
/// * `I` - The interpolator type
/// * `D` - The dimensionality
pub struct ResampleImageFilter<B, T, I, const D: usize>
where
    B: Backend,
    T: Transform<B, D>,
    I: Interpolator<B>,
{
    geometry: ImageGeometry<D>,
    transform: T,
    interpolator: I,
    default_pixel_value: f64,
    _phantom: PhantomData<B>,
}

impl<B, T, I, const D: usize> ResampleImageFilter<B, T, I, D>
where
    B: Backend,
    T: Transform<B, D>,
    I: Interpolator<B>,
{
    /// Create a filter writing onto `geometry`.
    pub fn new(geometry: ImageGeometry<D>, transform: T, interpolator: I) -> Self {
        Self {
            geometry,
            transform,
            interpolator,
            default_pixel_value: 0.0,
            _phantom: PhantomData,
        }
    }

    /// Create a filter writing onto the grid of `reference`.
    pub fn new_from_reference(reference: &Image<B, D>, transform: T, interpolator: I) -> Self {
        Self::new(reference.geometry(), transform, interpolator)
    }

    /// Value for output pixels that map outside the input buffer.
    pub fn with_default_pixel_value(mut self, value: f64) -> Self {
        self.default_pixel_value = value;
        self
    }

    pub fn geometry(&self) -> &ImageGeometry<D> {
        &self.geometry
    }

    /// Apply the filter to `input`.
    pub fn apply(&self, input: &Image<B, D>) -> Result<Image<B, D>> {
        let device = input.data().device();
        let region = ImageRegion::from_size(self.geometry.size);

        // The output image supplies the index-to-physical mapping of its grid.
        let output_grid = Image::<B, D>::new(
            Tensor::zeros(Shape::new(self.geometry.tensor_shape()), &device),
            self.geometry.origin,
            self.geometry.spacing,
            self.geometry.direction,
        )?;

        let output_indices = generate_grid::<B, D>(&region, &device);
        let output_points = output_grid.index_to_world_tensor(output_indices);
        let input_points = self.transform.transform_points(output_points);
        let input_indices = input.world_to_index_tensor(input_points);

        let inside = inside_mask(input_indices.clone(), input.size());
        let values = self.interpolator.interpolate(input.data(), input_indices);
        let outside = inside.lower_elem(0.5);
        let values = values.mask_fill(outside, self.default_pixel_value);

        let output_data = values.reshape(Shape::new(self.geometry.tensor_shape()));
        Image::new(
            output_data,
            self.geometry.origin,
            self.geometry.spacing,
            self.geometry.direction,
        )
    }
}
