//! Point type for physical coordinates.

use nalgebra::Point as NaPoint;
use serde::{Deserialize, Serialize};

use super::Vector;

/// A position in D-dimensional physical space.
///
/// Thin wrapper around nalgebra's `Point` so image geometry, transforms and
/// mesh nodes share one coordinate type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point<const D: usize>(pub NaPoint<f64, D>);

impl<const D: usize> Point<D> {
    /// Create a new point from coordinates.
    pub fn new(coords: [f64; D]) -> Self {
        Self(NaPoint::from(coords))
    }

    /// The point with all coordinates zero.
    pub fn origin() -> Self {
        Self(NaPoint::origin())
    }

    /// Build a point from a slice, `None` when the length is not `D`.
    pub fn from_slice(coords: &[f64]) -> Option<Self> {
        if coords.len() != D {
            return None;
        }
        let mut point = Self::origin();
        for (i, c) in coords.iter().enumerate() {
            point[i] = *c;
        }
        Some(point)
    }

    /// Coordinates as an owned vector.
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.coords.iter().copied().collect()
    }

    /// Coordinates as a fixed-size array.
    pub fn to_array(&self) -> [f64; D] {
        let mut out = [0.0; D];
        for (i, c) in out.iter_mut().enumerate() {
            *c = self[i];
        }
        out
    }

    /// Largest absolute coordinate difference to `other` (L-infinity distance).
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        (0..D).map(|i| (self[i] - other[i]).abs()).fold(0.0, f64::max)
    }

    /// Get the inner nalgebra point.
    pub fn inner(&self) -> &NaPoint<f64, D> {
        &self.0
    }
}

impl<const D: usize> std::ops::Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0.coords[index]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Point<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0.coords[index]
    }
}

impl<const D: usize> std::ops::Sub for Point<D> {
    type Output = Vector<D>;

    fn sub(self, other: Self) -> Self::Output {
        Vector(self.0.coords - other.0.coords)
    }
}

impl<const D: usize> std::ops::Add<Vector<D>> for Point<D> {
    type Output = Self;

    fn add(self, vector: Vector<D>) -> Self::Output {
        Self(self.0 + vector.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Point2 = Point<2>;

    #[test]
    fn test_point_from_slice_checks_length() {
        assert_eq!(Point2::from_slice(&[1.0, 2.0]), Some(Point2::new([1.0, 2.0])));
        assert!(Point2::from_slice(&[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_point_vector_arithmetic() {
        let p = Point2::new([1.0, 2.0]);
        let q = p + Vector::new([0.5, -1.0]);
        assert_eq!(q, Point2::new([1.5, 1.0]));
        assert_eq!(q - p, Vector::new([0.5, -1.0]));
    }

    #[test]
    fn test_max_abs_diff() {
        let p = Point2::new([0.0, 0.0]);
        let q = Point2::new([-3.0, 1.5]);
        assert_eq!(p.max_abs_diff(&q), 3.0);
        assert_eq!(q.to_array(), [-3.0, 1.5]);
    }
}
