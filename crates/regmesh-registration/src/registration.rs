//! Image registration engine.
//!
//! Couples a parametric transform, a metric and an optimizer: the optimizer
//! proposes parameter vectors, the transform takes them, and the metric
//! scores the fixed region against the transformed moving image.

use std::marker::PhantomData;
use std::sync::Arc;

use burn::tensor::backend::Backend;
use regmesh_core::transform::{ParametricTransform, Transform};
use regmesh_core::{Image, ImageRegion};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RegistrationError, Result};
use crate::metric::Metric;
use crate::optimizer::{CostFunction, Optimizer, OptimizerOutcome, OptimizerState, StopCondition};
use crate::progress::{ProgressCallback, ProgressTracker};
use crate::validation::{validate_image_not_empty, validate_parameter_count, validate_region};

/// Outcome of a registration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationResult {
    /// Parameters of the best simplex vertex.
    pub parameters: Vec<f64>,
    /// Metric value at `parameters`.
    pub value: f64,
    pub stop_condition: StopCondition,
    pub iterations: usize,
    /// Number of metric evaluations.
    pub evaluations: usize,
    pub description: String,
}

impl RegistrationResult {
    pub fn converged(&self) -> bool {
        self.stop_condition.is_converged()
    }

    /// Treat an exhausted iteration budget as an error.
    pub fn require_convergence(self) -> Result<Self> {
        if self.converged() {
            Ok(self)
        } else {
            Err(RegistrationError::convergence_failure(self.description))
        }
    }
}

impl From<OptimizerOutcome> for RegistrationResult {
    fn from(outcome: OptimizerOutcome) -> Self {
        Self {
            parameters: outcome.parameters,
            value: outcome.value,
            stop_condition: outcome.stop_condition,
            iterations: outcome.iterations,
            evaluations: outcome.evaluations,
            description: outcome.description,
        }
    }
}

/// Metric evaluation at a proposed parameter vector.
struct RegistrationCost<'a, B, T, M, const D: usize>
where
    B: Backend,
{
    fixed: &'a Image<B, D>,
    moving: &'a Image<B, D>,
    region: &'a ImageRegion<D>,
    transform: &'a mut T,
    metric: &'a M,
}

impl<B, T, M, const D: usize> CostFunction for RegistrationCost<'_, B, T, M, D>
where
    B: Backend,
    T: Transform<B, D> + ParametricTransform,
    M: Metric<B, D>,
{
    fn number_of_parameters(&self) -> usize {
        self.transform.number_of_parameters()
    }

    fn value(&mut self, parameters: &[f64]) -> Result<f64> {
        self.transform.set_parameters(parameters)?;
        self.metric.value(self.fixed, self.moving, &*self.transform, self.region)
    }
}

/// Registration engine.
///
/// # Type Parameters
/// * `B` - The Burn backend
/// * `T` - The parametric transform being optimized
/// * `M` - The similarity metric
/// * `O` - The optimizer
/// * `D` - The spatial dimensionality
pub struct ImageRegistrationMethod<B, T, M, O, const D: usize>
where
    B: Backend,
    T: Transform<B, D> + ParametricTransform,
    M: Metric<B, D>,
    O: Optimizer,
{
    fixed: Image<B, D>,
    moving: Image<B, D>,
    transform: T,
    metric: M,
    optimizer: O,
    fixed_region: Option<ImageRegion<D>>,
    initial_parameters: Option<Vec<f64>>,
    last_parameters: Option<Vec<f64>>,
    tracker: ProgressTracker,
    _phantom: PhantomData<B>,
}

impl<B, T, M, O, const D: usize> ImageRegistrationMethod<B, T, M, O, D>
where
    B: Backend,
    T: Transform<B, D> + ParametricTransform,
    M: Metric<B, D>,
    O: Optimizer,
{
    pub fn new(fixed: Image<B, D>, moving: Image<B, D>, transform: T, metric: M, optimizer: O) -> Self {
        Self {
            fixed,
            moving,
            transform,
            metric,
            optimizer,
            fixed_region: None,
            initial_parameters: None,
            last_parameters: None,
            tracker: ProgressTracker::new(),
            _phantom: PhantomData,
        }
    }

    /// Restrict the metric to part of the fixed image; defaults to the whole buffer.
    pub fn with_fixed_region(mut self, region: ImageRegion<D>) -> Self {
        self.fixed_region = Some(region);
        self
    }

    /// Starting parameters; defaults to the transform's current parameters.
    pub fn with_initial_parameters(mut self, parameters: Vec<f64>) -> Self {
        self.initial_parameters = Some(parameters);
        self
    }

    /// Register an observer, notified once per optimizer iteration.
    pub fn add_observer(&mut self, callback: Arc<dyn ProgressCallback>) {
        self.tracker.add_callback(callback);
    }

    pub fn fixed(&self) -> &Image<B, D> {
        &self.fixed
    }

    pub fn moving(&self) -> &Image<B, D> {
        &self.moving
    }

    /// Transform carrying the parameters of the last completed run.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    pub fn optimizer_state(&self) -> OptimizerState {
        self.optimizer.state()
    }

    /// Final parameters of the last completed run.
    pub fn last_transform_parameters(&self) -> Option<&[f64]> {
        self.last_parameters.as_deref()
    }

    fn fixed_region(&self) -> ImageRegion<D> {
        self.fixed_region.unwrap_or_else(|| self.fixed.largest_region())
    }

    fn validate(&self, initial: &[f64]) -> Result<ImageRegion<D>> {
        validate_image_not_empty(&self.fixed, "fixed")?;
        validate_image_not_empty(&self.moving, "moving")?;
        validate_parameter_count(self.transform.number_of_parameters(), initial)?;
        let region = self.fixed_region();
        validate_region(&region, &self.fixed)?;
        Ok(region)
    }

    /// Run the registration.
    ///
    /// Errors from the metric abort the run; an exhausted iteration budget
    /// is reported through the result's stop condition.
    pub fn update(&mut self) -> Result<RegistrationResult> {
        let initial = self
            .initial_parameters
            .clone()
            .unwrap_or_else(|| self.transform.parameters());
        let region = self.validate(&initial)?;

        info!(
            metric = self.metric.name(),
            optimizer = self.optimizer.name(),
            region_pixels = region.number_of_pixels(),
            "Starting registration from {:?}",
            initial
        );

        self.metric.initialize(&self.fixed, &self.moving, &region)?;
        self.tracker.start();

        let mut cost = RegistrationCost {
            fixed: &self.fixed,
            moving: &self.moving,
            region: &region,
            transform: &mut self.transform,
            metric: &self.metric,
        };
        let outcome = self.optimizer.optimize(&mut cost, &initial, &self.tracker)?;

        self.transform.set_parameters(&outcome.parameters)?;
        self.last_parameters = Some(outcome.parameters.clone());

        let result = RegistrationResult::from(outcome);
        info!(
            iterations = result.iterations,
            evaluations = result.evaluations,
            "Registration finished: {} | value {:.6} at {:?}",
            result.description,
            result.value,
            result.parameters
        );
        Ok(result)
    }
}
