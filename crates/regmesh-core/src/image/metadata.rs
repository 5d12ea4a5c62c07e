//! Physical geometry of an image grid.

use crate::spatial::{Direction, Point, Spacing};

/// Size, origin, spacing and direction of an image, without pixel data.
///
/// Used when a consumer needs the grid only: resampling onto a reference
/// grid, or readers that parse the header before the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageGeometry<const D: usize> {
    /// Extent in index order (x first).
    pub size: [usize; D],
    pub origin: Point<D>,
    pub spacing: Spacing<D>,
    pub direction: Direction<D>,
}

impl<const D: usize> ImageGeometry<D> {
    pub fn new(size: [usize; D], origin: Point<D>, spacing: Spacing<D>, direction: Direction<D>) -> Self {
        Self {
            size,
            origin,
            spacing,
            direction,
        }
    }

    /// Zero origin, unit spacing, identity direction.
    pub fn with_size(size: [usize; D]) -> Self {
        Self {
            size,
            origin: Point::origin(),
            spacing: Spacing::uniform(1.0),
            direction: Direction::identity(),
        }
    }

    /// Tensor shape for this size (`[.., Y, X]`).
    pub fn tensor_shape(&self) -> [usize; D] {
        let mut shape = self.size;
        shape.reverse();
        shape
    }

    pub fn number_of_pixels(&self) -> usize {
        self.size.iter().product()
    }
}
