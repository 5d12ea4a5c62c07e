//! Image types and operations.
//!
//! An image couples a burn tensor with the physical metadata that maps
//! pixel indices to physical coordinates.

pub mod grid;
pub mod image;
pub mod metadata;
pub mod region;

pub use grid::{generate_grid, inside_mask};
pub use image::Image;
pub use metadata::ImageGeometry;
pub use region::ImageRegion;
