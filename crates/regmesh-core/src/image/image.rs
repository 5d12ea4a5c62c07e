//! Image type with physical metadata and coordinate transformations.
//!
//! The pixel buffer is a burn tensor in `[.., Y, X]` layout; origin,
//! spacing and direction describe how index space maps to physical space.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};

use super::metadata::ImageGeometry;
use super::region::ImageRegion;
use crate::error::{CoreError, Result};
use crate::spatial::{Direction, Point, Spacing, Vector};

/// Image with physical metadata.
///
/// # Type Parameters
/// * `B` - The backend holding the pixel tensor
/// * `D` - The dimensionality of the image
///
/// # Coordinate Systems
/// * **Index Space**: continuous pixel indices, axis 0 is x
/// * **Physical Space**: `point = origin + Direction * (index * spacing)`
///
/// # Examples
/// ```rust
/// use regmesh_core::Image;
/// use regmesh_core::spatial::{Point2, Spacing2, Direction2};
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let data = Tensor::<Backend, 2>::zeros([4, 6], &device);
/// let image = Image::new(data, Point2::new([0.0, 0.0]), Spacing2::uniform(1.0), Direction2::identity())
///     .unwrap();
/// assert_eq!(image.size(), [6, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct Image<B: Backend, const D: usize> {
    data: Tensor<B, D>,
    origin: Point<D>,
    spacing: Spacing<D>,
    direction: Direction<D>,
    inverse_direction: Direction<D>,
}

impl<B: Backend, const D: usize> Image<B, D> {
    /// Create a new image from a tensor and its metadata.
    ///
    /// Fails when a spacing component is not strictly positive or the
    /// direction matrix is singular.
    pub fn new(
        data: Tensor<B, D>,
        origin: Point<D>,
        spacing: Spacing<D>,
        direction: Direction<D>,
    ) -> Result<Self> {
        if !spacing.is_valid() {
            return Err(CoreError::InvalidGeometry(format!(
                "spacing must be finite and positive, got {:?}",
                spacing.to_vec()
            )));
        }
        let inverse_direction = direction
            .try_inverse()
            .ok_or_else(|| CoreError::InvalidGeometry("direction matrix is singular".to_string()))?;
        Ok(Self {
            data,
            origin,
            spacing,
            direction,
            inverse_direction,
        })
    }

    /// Build an image from a host pixel buffer laid out x fastest.
    pub fn from_pixels(pixels: Vec<f32>, geometry: ImageGeometry<D>, device: &B::Device) -> Result<Self> {
        let expected = geometry.number_of_pixels();
        if pixels.len() != expected {
            return Err(CoreError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        let data = Tensor::<B, D>::from_data(TensorData::new(pixels, Shape::new(geometry.tensor_shape())), device);
        Self::new(data, geometry.origin, geometry.spacing, geometry.direction)
    }

    /// Get the image data tensor.
    pub fn data(&self) -> &Tensor<B, D> {
        &self.data
    }

    /// Physical coordinate of the first pixel.
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Tensor shape (`[.., Y, X]`).
    pub fn shape(&self) -> [usize; D] {
        let dims = self.data.dims();
        let mut shape = [0; D];
        shape.copy_from_slice(&dims[..D]);
        shape
    }

    /// Extent in index order (`[X, Y, ..]`).
    pub fn size(&self) -> [usize; D] {
        let mut size = self.shape();
        size.reverse();
        size
    }

    pub fn number_of_pixels(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_pixels() == 0
    }

    /// The whole buffer as a region.
    pub fn largest_region(&self) -> ImageRegion<D> {
        ImageRegion::from_size(self.size())
    }

    /// Geometry without the pixel buffer.
    pub fn geometry(&self) -> ImageGeometry<D> {
        ImageGeometry::new(self.size(), self.origin, self.spacing, self.direction)
    }

    /// Copy the pixel buffer to the host, x fastest.
    pub fn pixel_values(&self) -> Vec<f32> {
        self.data.to_data().iter::<f32>().collect()
    }

    /// Pixel values of `region`, in region row-major order.
    ///
    /// The region must lie inside the buffer.
    pub fn region_values(&self, region: &ImageRegion<D>) -> Vec<f32> {
        let size = self.size();
        let values = self.pixel_values();
        (0..region.number_of_pixels())
            .map(|k| {
                let index = region.index_at(k);
                let mut offset = 0;
                let mut stride = 1;
                for axis in 0..D {
                    offset += index[axis] * stride;
                    stride *= size[axis];
                }
                values[offset]
            })
            .collect()
    }

    /// Smallest and largest pixel values, `None` for empty images.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let values = self.pixel_values();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        }))
    }

    /// True when a continuous index lies inside the buffer, `[0, size - 1]` per axis.
    pub fn is_inside_continuous_index(&self, index: &Point<D>) -> bool {
        let size = self.size();
        (0..D).all(|i| index[i] >= 0.0 && index[i] <= (size[i] as f64 - 1.0))
    }

    /// Convert a physical point to a continuous index.
    ///
    /// `index = (Direction^-1 * (point - origin)) / spacing`
    pub fn transform_physical_point_to_continuous_index(&self, point: &Point<D>) -> Point<D> {
        let rotated = self.inverse_direction * (*point - self.origin);
        let mut index = Point::<D>::origin();
        for i in 0..D {
            index[i] = rotated[i] / self.spacing[i];
        }
        index
    }

    /// Convert a continuous index to a physical point.
    ///
    /// `point = origin + Direction * (index * spacing)`
    pub fn transform_continuous_index_to_physical_point(&self, index: &Point<D>) -> Point<D> {
        let mut scaled_index = Vector::<D>::zeros();
        for i in 0..D {
            scaled_index[i] = index[i] * self.spacing[i];
        }
        self.origin + self.direction * scaled_index
    }

    /// Batch transform physical points `[Batch, D]` to continuous indices `[Batch, D]`.
    pub fn world_to_index_tensor(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = points.device();
        let origin_tensor = self.origin_tensor(&device);

        // I = (P - O) @ T with T[r, c] = (D^-1)[c, r] / S[c]
        let mut t_data = Vec::with_capacity(D * D);
        for r in 0..D {
            for c in 0..D {
                t_data.push((self.inverse_direction[(c, r)] / self.spacing[c]) as f32);
            }
        }
        let t_tensor = Tensor::<B, 2>::from_data(TensorData::new(t_data, Shape::new([D, D])), &device);

        (points - origin_tensor).matmul(t_tensor)
    }

    /// Batch transform continuous indices `[Batch, D]` to physical points `[Batch, D]`.
    pub fn index_to_world_tensor(&self, indices: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = indices.device();
        let origin_tensor = self.origin_tensor(&device);

        // P = O + I @ M with M[r, c] = S[r] * D[c, r]
        let mut m_data = Vec::with_capacity(D * D);
        for r in 0..D {
            for c in 0..D {
                m_data.push((self.spacing[r] * self.direction[(c, r)]) as f32);
            }
        }
        let m_tensor = Tensor::<B, 2>::from_data(TensorData::new(m_data, Shape::new([D, D])), &device);

        indices.matmul(m_tensor) + origin_tensor
    }

    fn origin_tensor(&self, device: &B::Device) -> Tensor<B, 2> {
        let origin_vec: Vec<f32> = (0..D).map(|i| self.origin[i] as f32).collect();
        Tensor::<B, 1>::from_data(TensorData::new(origin_vec, Shape::new([D])), device).reshape([1, D])
    }
}
