//! Spatial transforms.
//!
//! Transforms map fixed-image physical points into moving-image physical
//! space. Only the translation family is provided.

pub mod trait_;
pub mod translation;

pub use trait_::{ParametricTransform, Transform};
pub use translation::TranslationTransform;
