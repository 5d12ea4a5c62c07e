//! Rectangular index regions.

/// An axis-aligned block of pixels: start index plus extent, both in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRegion<const D: usize> {
    index: [usize; D],
    size: [usize; D],
}

impl<const D: usize> ImageRegion<D> {
    pub fn new(index: [usize; D], size: [usize; D]) -> Self {
        Self { index, size }
    }

    /// Region starting at the zero index.
    pub fn from_size(size: [usize; D]) -> Self {
        Self { index: [0; D], size }
    }

    pub fn index(&self) -> [usize; D] {
        self.index
    }

    pub fn size(&self) -> [usize; D] {
        self.size
    }

    pub fn number_of_pixels(&self) -> usize {
        self.size.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_pixels() == 0
    }

    /// True when every pixel of `self` lies inside `other`.
    pub fn is_inside(&self, other: &ImageRegion<D>) -> bool {
        (0..D).all(|i| {
            self.index[i] >= other.index[i]
                && self.index[i] + self.size[i] <= other.index[i] + other.size[i]
        })
    }

    /// Index of the `k`-th pixel in row-major order, axis 0 varying fastest.
    pub fn index_at(&self, mut k: usize) -> [usize; D] {
        let mut out = self.index;
        for (axis, slot) in out.iter_mut().enumerate() {
            let extent = self.size[axis].max(1);
            *slot += k % extent;
            k /= extent;
        }
        out
    }
}
