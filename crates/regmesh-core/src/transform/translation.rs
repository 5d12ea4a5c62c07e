//! Translation transform.

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use serde::{Deserialize, Serialize};

use super::trait_::{ParametricTransform, Transform};
use crate::error::{CoreError, Result};
use crate::spatial::{Point, Vector};

/// Translates points by an offset vector.
///
/// The parameter vector is the offset itself, one component per axis.
/// There are no fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TranslationTransform<const D: usize> {
    offset: Vector<D>,
}

impl<const D: usize> TranslationTransform<D> {
    pub fn new(offset: Vector<D>) -> Self {
        Self { offset }
    }

    pub fn identity() -> Self {
        Self {
            offset: Vector::zeros(),
        }
    }

    pub fn offset(&self) -> Vector<D> {
        self.offset
    }

    /// The translation undoing this one.
    pub fn inverse(&self) -> Self {
        Self { offset: -self.offset }
    }
}

impl<const D: usize> Default for TranslationTransform<D> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<B: Backend, const D: usize> Transform<B, D> for TranslationTransform<D> {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = points.device();
        let offset: Vec<f32> = self.offset.to_vec().into_iter().map(|v| v as f32).collect();
        let t = Tensor::<B, 1>::from_data(TensorData::new(offset, Shape::new([D])), &device).reshape([1, D]);
        points + t
    }

    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        *point + self.offset
    }
}

impl<const D: usize> ParametricTransform for TranslationTransform<D> {
    fn number_of_parameters(&self) -> usize {
        D
    }

    fn parameters(&self) -> Vec<f64> {
        self.offset.to_vec()
    }

    fn set_parameters(&mut self, parameters: &[f64]) -> Result<()> {
        self.offset = Vector::from_slice(parameters).ok_or(CoreError::ParameterCount {
            expected: D,
            actual: parameters.len(),
        })?;
        Ok(())
    }

    fn set_identity(&mut self) {
        self.offset = Vector::zeros();
    }
}
