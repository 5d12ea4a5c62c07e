//! Linear interpolation (bilinear in 2D, trilinear in 3D).

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use serde::{Deserialize, Serialize};

use super::trait_::Interpolator;

/// N-linear interpolator.
///
/// Each sample is the weighted sum of the `2^D` neighbouring pixels, with
/// weights given by the fractional part of the continuous index.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinearInterpolator;

impl LinearInterpolator {
    pub fn new() -> Self {
        Self
    }
}

/// Clamped lower/upper flat offsets and the upper weight along one axis.
struct AxisSupport<B: Backend> {
    lower: Tensor<B, 1, Int>,
    upper: Tensor<B, 1, Int>,
    weight: Tensor<B, 1>,
}

impl<B: Backend> Interpolator<B> for LinearInterpolator {
    fn interpolate<const D: usize>(&self, data: &Tensor<B, D>, indices: Tensor<B, 2>) -> Tensor<B, 1> {
        let shape = data.dims();
        let [batch_size, _] = indices.dims();
        let device = indices.device();
        let flat_data = data.clone().reshape([shape.iter().product::<usize>()]);

        // Index axis 0 is the last tensor dimension, so strides grow from x outward.
        let mut stride = 1usize;
        let mut axes: Vec<AxisSupport<B>> = Vec::with_capacity(D);
        for axis in 0..D {
            let extent = shape[D - 1 - axis];
            let max_index = extent.saturating_sub(1) as f64;
            let coord = indices.clone().narrow(1, axis, 1).squeeze::<1>(1);
            let floor = coord.clone().floor();
            let weight = coord - floor.clone();
            let lower = floor.clone().clamp(0.0, max_index).int() * (stride as i32);
            let upper = (floor + 1.0).clamp(0.0, max_index).int() * (stride as i32);
            axes.push(AxisSupport { lower, upper, weight });
            stride *= extent;
        }

        let mut result = Tensor::<B, 1>::zeros([batch_size], &device);
        for corner in 0..(1usize << D) {
            let mut flat_index = Tensor::<B, 1, Int>::zeros([batch_size], &device);
            let mut corner_weight = Tensor::<B, 1>::ones([batch_size], &device);
            for (axis, support) in axes.iter().enumerate() {
                if (corner >> axis) & 1 == 1 {
                    flat_index = flat_index + support.upper.clone();
                    corner_weight = corner_weight * support.weight.clone();
                } else {
                    flat_index = flat_index + support.lower.clone();
                    corner_weight = corner_weight * (support.weight.clone().neg() + 1.0);
                }
            }
            result = result + flat_data.clone().gather(0, flat_index) * corner_weight;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::{Shape, TensorData};
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn image_2x2() -> Tensor<TestBackend, 2> {
        let device = Default::default();
        // Shape [Y=2, X=2]
        Tensor::from_data(TensorData::new(vec![0.0f32, 1.0, 10.0, 11.0], Shape::new([2, 2])), &device)
    }

    fn sample(data: &Tensor<TestBackend, 2>, points: Vec<[f32; 2]>) -> Vec<f32> {
        let device = Default::default();
        let n = points.len();
        let flat: Vec<f32> = points.into_iter().flatten().collect();
        let indices = Tensor::<TestBackend, 1>::from_data(TensorData::new(flat, Shape::new([n * 2])), &device)
            .reshape([n, 2]);
        LinearInterpolator::new()
            .interpolate(data, indices)
            .into_data()
            .iter::<f32>()
            .collect()
    }

    #[test]
    fn test_grid_points_are_exact() {
        let values = sample(&image_2x2(), vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
        assert_eq!(values, vec![0.0, 1.0, 10.0, 11.0]);
    }

    #[test]
    fn test_center_is_average() {
        let values = sample(&image_2x2(), vec![[0.5, 0.5]]);
        assert!((values[0] - 5.5).abs() < 1e-5);
    }

    #[test]
    fn test_x_is_fastest_axis() {
        let values = sample(&image_2x2(), vec![[0.25, 0.0], [0.0, 0.25]]);
        assert!((values[0] - 0.25).abs() < 1e-5);
        assert!((values[1] - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_bounds_clamps() {
        let values = sample(&image_2x2(), vec![[-1.0, -1.0], [5.0, 5.0]]);
        assert_eq!(values, vec![0.0, 11.0]);
    }

    #[test]
    fn test_trilinear_center() {
        let device = Default::default();
        let data = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![0.0f32, 1.0, 10.0, 11.0, 100.0, 101.0, 110.0, 111.0], Shape::new([2, 2, 2])),
            &device,
        );
        let indices = Tensor::<TestBackend, 2>::from_floats([[0.5, 0.5, 0.5], [0.0, 0.0, 1.0]], &device);
        let values: Vec<f32> = LinearInterpolator::new()
            .interpolate(&data, indices)
            .into_data()
            .iter::<f32>()
            .collect();
        assert!((values[0] - 55.5).abs() < 1e-4);
        assert_eq!(values[1], 100.0);
    }
}
