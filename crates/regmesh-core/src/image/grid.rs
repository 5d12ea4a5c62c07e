use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};

use super::region::ImageRegion;

/// Generate the continuous indices of every pixel in `region`.
///
/// Returns a tensor of shape `[N, D]`, N being the number of pixels in the
/// region. Columns are in index order (x first) and rows run with axis 0
/// varying fastest, matching the flattened pixel buffer.
pub fn generate_grid<B, const D: usize>(region: &ImageRegion<D>, device: &B::Device) -> Tensor<B, 2>
where
    B: Backend,
{
    let total = region.number_of_pixels();
    let mut grid = Vec::with_capacity(total * D);
    for k in 0..total {
        let index = region.index_at(k);
        grid.extend(index.iter().map(|&i| i as f32));
    }

    Tensor::<B, 1>::from_data(TensorData::new(grid, Shape::new([total * D])), device)
        .reshape([total, D])
}

/// Tolerance absorbing f32 rounding at the buffer border.
const BORDER_TOLERANCE: f64 = 1e-4;

/// Flag which continuous indices `[N, D]` fall inside a buffer of `size`.
///
/// Returns `[N]` with 1.0 where every component lies in `[0, size - 1]`
/// and 0.0 elsewhere.
pub fn inside_mask<B, const D: usize>(indices: Tensor<B, 2>, size: [usize; D]) -> Tensor<B, 1>
where
    B: Backend,
{
    let [n, _] = indices.dims();
    let mut mask = Tensor::<B, 1>::ones([n], &indices.device());
    for (axis, &extent) in size.iter().enumerate() {
        let coord = indices.clone().narrow(1, axis, 1).squeeze::<1>(1);
        let upper = extent as f64 - 1.0 + BORDER_TOLERANCE;
        mask = mask
            * coord.clone().greater_equal_elem(-BORDER_TOLERANCE).float()
            * coord.lower_equal_elem(upper).float();
    }
    mask
}
