//! Optimizer and cost-function traits for derivative-free parameter search.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::progress::ProgressTracker;

/// Scalar objective evaluated at a parameter vector.
///
/// Registration wraps the metric, transform and images into a cost
/// function; tests plug in analytic functions.
pub trait CostFunction {
    /// Length of the parameter vector.
    fn number_of_parameters(&self) -> usize;

    /// Evaluate the objective. Errors abort the optimization.
    fn value(&mut self, parameters: &[f64]) -> Result<f64>;
}

/// Cost function backed by a closure.
pub struct FnCostFunction<F> {
    number_of_parameters: usize,
    function: F,
}

impl<F> FnCostFunction<F>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    pub fn new(number_of_parameters: usize, function: F) -> Self {
        Self {
            number_of_parameters,
            function,
        }
    }
}

impl<F> CostFunction for FnCostFunction<F>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    fn number_of_parameters(&self) -> usize {
        self.number_of_parameters
    }

    fn value(&mut self, parameters: &[f64]) -> Result<f64> {
        (self.function)(parameters)
    }
}

/// Optimizer life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerState {
    Initialized,
    Iterating,
    Converged,
    MaxIterationsReached,
    Failed,
}

impl OptimizerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::MaxIterationsReached | Self::Failed)
    }
}

/// Reason the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopCondition {
    /// Every vertex lies within the parameter tolerance of the best one.
    ConvergedByParameters,
    /// Vertex values span no more than the function tolerance.
    ConvergedByValue,
    /// The iteration budget ran out first.
    MaximumIterations,
}

impl StopCondition {
    pub fn is_converged(&self) -> bool {
        !matches!(self, Self::MaximumIterations)
    }

    /// Terminal state reached with this stop condition.
    pub fn state(&self) -> OptimizerState {
        if self.is_converged() {
            OptimizerState::Converged
        } else {
            OptimizerState::MaxIterationsReached
        }
    }
}

impl std::fmt::Display for StopCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ConvergedByParameters => "converged (parameter tolerance)",
            Self::ConvergedByValue => "converged (value tolerance)",
            Self::MaximumIterations => "maximum iterations reached",
        };
        f.write_str(name)
    }
}

/// Simplex operation accepted by an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimplexStep {
    Reflection,
    Expansion,
    Contraction,
    Shrink,
}

/// One accepted simplex update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationEvent {
    /// 1-based iteration number.
    pub iteration: usize,
    /// Best metric value, in the caller's orientation.
    pub value: f64,
    pub parameters: Vec<f64>,
    /// Largest component distance of any vertex to the best vertex.
    pub parameter_range: f64,
    /// Spread of vertex values.
    pub value_range: f64,
    pub step: SimplexStep,
    /// Number of cost evaluations so far.
    pub evaluations: usize,
    /// Set when this update ended a run and a restart was started.
    pub restarted: bool,
}

/// Final result of an optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerOutcome {
    pub parameters: Vec<f64>,
    pub value: f64,
    pub stop_condition: StopCondition,
    pub iterations: usize,
    pub evaluations: usize,
    pub restarts: usize,
    /// Human-readable stop reason naming the trigger.
    pub description: String,
}

/// Derivative-free optimizer.
pub trait Optimizer {
    /// Minimize (or maximize, per configuration) `cost` starting at `initial`.
    ///
    /// `tracker` is notified once per iteration.
    fn optimize<C: CostFunction>(
        &mut self,
        cost: &mut C,
        initial: &[f64],
        tracker: &ProgressTracker,
    ) -> Result<OptimizerOutcome>;

    fn state(&self) -> OptimizerState;

    fn name(&self) -> &'static str;
}
