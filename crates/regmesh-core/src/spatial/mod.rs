//! Spatial types: points, vectors, spacing and direction matrices.
//!
//! All types wrap nalgebra statically sized storage.

pub mod direction;
pub mod point;
pub mod spacing;
pub mod vector;

pub use direction::Direction;
pub use point::Point;
pub use spacing::Spacing;
pub use vector::Vector;

pub type Point2 = Point<2>;
pub type Vector2 = Vector<2>;
pub type Spacing2 = Spacing<2>;
pub type Direction2 = Direction<2>;
