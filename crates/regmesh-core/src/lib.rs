//! Core types for regmesh: images with physical geometry, spatial types,
//! transforms, interpolators and resampling.

pub mod error;
pub mod filter;
pub mod image;
pub mod interpolation;
pub mod spatial;
pub mod transform;

pub use error::{CoreError, Result};
pub use image::{Image, ImageGeometry, ImageRegion};
pub use spatial::{Direction, Point, Spacing, Vector};
