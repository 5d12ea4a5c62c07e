//! Downhill simplex (Nelder-Mead) optimizer.
//!
//! The optimizer keeps N+1 vertices in an N-dimensional parameter space and
//! moves the worst vertex by reflection, expansion or contraction through the
//! centroid of the others, shrinking the whole simplex toward the best vertex
//! when none of those improve it. No gradients are needed, which suits
//! histogram metrics whose value is piecewise constant in the parameters.
//!
//! Iterations are exposed as a lazy stream ([`AmoebaIterations`]) so callers
//! can observe or stop a run between simplex updates.

use burn::config::Config;
use tracing::{debug, info, warn};

use super::trait_::{
    CostFunction, IterationEvent, Optimizer, OptimizerOutcome, OptimizerState, SimplexStep, StopCondition,
};
use crate::error::{self, RegistrationError};
use crate::progress::ProgressTracker;

/// Relative perturbation of non-zero components for the automatic simplex.
const AUTOMATIC_RELATIVE_DELTA: f64 = 0.05;
/// Perturbation of zero components for the automatic simplex.
const AUTOMATIC_ZERO_DELTA: f64 = 0.00025;

/// Amoeba optimizer configuration.
#[derive(Config, Debug, PartialEq)]
pub struct AmoebaConfig {
    /// Maximize the cost instead of minimizing it.
    #[config(default = false)]
    pub maximize: bool,
    /// Converged when every vertex is this close to the best one, per component.
    #[config(default = 1e-8)]
    pub parameters_convergence_tolerance: f64,
    /// Converged when vertex values span no more than this.
    #[config(default = 1e-4)]
    pub function_convergence_tolerance: f64,
    #[config(default = 500)]
    pub maximum_number_of_iterations: usize,
    /// Derive the initial simplex from the starting point; `initial_simplex_delta` is ignored.
    #[config(default = true)]
    pub automatic_initial_simplex: bool,
    /// Per-parameter offsets of the initial simplex vertices.
    pub initial_simplex_delta: Option<Vec<f64>>,
    #[config(default = 1.0)]
    pub reflection: f64,
    #[config(default = 2.0)]
    pub expansion: f64,
    #[config(default = 0.5)]
    pub contraction: f64,
    #[config(default = 0.5)]
    pub shrink: f64,
    /// Restart from the best vertex after convergence until two runs agree.
    #[config(default = false)]
    pub optimize_with_restarts: bool,
}

impl AmoebaConfig {
    /// Build an optimizer from this configuration.
    pub fn init(&self) -> AmoebaOptimizer {
        AmoebaOptimizer::new(self.clone())
    }

    /// Check tolerances and simplex coefficients.
    pub fn validate(&self) -> error::Result<()> {
        let tolerances = [
            ("parameters_convergence_tolerance", self.parameters_convergence_tolerance),
            ("function_convergence_tolerance", self.function_convergence_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(RegistrationError::invalid_configuration(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !(self.reflection > 0.0) {
            return Err(RegistrationError::invalid_configuration(format!(
                "reflection coefficient must be positive, got {}",
                self.reflection
            )));
        }
        if !(self.expansion > 1.0) || self.expansion <= self.reflection {
            return Err(RegistrationError::invalid_configuration(format!(
                "expansion coefficient must exceed 1 and the reflection coefficient, got {}",
                self.expansion
            )));
        }
        for (name, value) in [("contraction", self.contraction), ("shrink", self.shrink)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(RegistrationError::invalid_configuration(format!(
                    "{name} coefficient must lie in (0, 1), got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Offsets of the initial simplex around `initial`.
    pub fn simplex_delta(&self, initial: &[f64]) -> error::Result<Vec<f64>> {
        if self.automatic_initial_simplex {
            if self.initial_simplex_delta.is_some() {
                warn!("Automatic initial simplex is enabled; ignoring the explicit simplex delta");
            }
            return Ok(initial
                .iter()
                .map(|&x| {
                    if x == 0.0 {
                        AUTOMATIC_ZERO_DELTA
                    } else {
                        AUTOMATIC_RELATIVE_DELTA * x
                    }
                })
                .collect());
        }

        let delta = self.initial_simplex_delta.as_ref().ok_or_else(|| {
            RegistrationError::invalid_configuration(
                "automatic_initial_simplex is off but no initial_simplex_delta was given",
            )
        })?;
        if delta.len() != initial.len() {
            return Err(RegistrationError::ShapeMismatch {
                expected: vec![initial.len()],
                actual: vec![delta.len()],
            });
        }
        if delta.iter().any(|d| !d.is_finite() || *d == 0.0) {
            return Err(RegistrationError::invalid_configuration(
                "initial_simplex_delta entries must be finite and non-zero",
            ));
        }
        Ok(delta.clone())
    }
}

/// Downhill simplex optimizer.
#[derive(Debug, Clone)]
pub struct AmoebaOptimizer {
    config: AmoebaConfig,
    state: OptimizerState,
}

impl AmoebaOptimizer {
    pub fn new(config: AmoebaConfig) -> Self {
        Self {
            config,
            state: OptimizerState::Initialized,
        }
    }

    pub fn config(&self) -> &AmoebaConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AmoebaConfig {
        &mut self.config
    }

    /// Start a lazy run of the optimizer.
    ///
    /// Builds and evaluates the initial simplex, then yields one event per
    /// simplex update. The stream ends after a stop condition or an error.
    pub fn iterate<'a, C: CostFunction>(&'a self, cost: &'a mut C, initial: &[f64]) -> error::Result<AmoebaIterations<'a, C>> {
        AmoebaIterations::new(&self.config, cost, initial)
    }

    fn run<C: CostFunction>(&self, cost: &mut C, initial: &[f64], tracker: &ProgressTracker) -> error::Result<OptimizerOutcome> {
        let total = Some(self.config.maximum_number_of_iterations);
        let mut iterations = self.iterate(cost, initial)?;
        for event in iterations.by_ref() {
            let event = event?;
            tracker.update(event.iteration, total, event.value, &event.parameters);
        }
        let outcome = iterations.finish()?;
        tracker.complete(outcome.iterations, outcome.value, &outcome.parameters, &outcome.description);
        Ok(outcome)
    }
}

impl Default for AmoebaOptimizer {
    fn default() -> Self {
        Self::new(AmoebaConfig::new())
    }
}

impl Optimizer for AmoebaOptimizer {
    fn optimize<C: CostFunction>(
        &mut self,
        cost: &mut C,
        initial: &[f64],
        tracker: &ProgressTracker,
    ) -> error::Result<OptimizerOutcome> {
        self.state = OptimizerState::Iterating;
        let result = self.run(cost, initial, tracker);
        match &result {
            Ok(outcome) => self.state = outcome.stop_condition.state(),
            Err(err) => {
                self.state = OptimizerState::Failed;
                tracker.error(&err.to_string());
            }
        }
        result
    }

    fn state(&self) -> OptimizerState {
        self.state
    }

    fn name(&self) -> &'static str {
        "AmoebaOptimizer"
    }
}

/// Lazy stream of simplex updates.
///
/// Finite and not restartable: once a stop condition is reached or an error
/// is yielded, `next` returns `None`.
pub struct AmoebaIterations<'a, C: CostFunction> {
    config: &'a AmoebaConfig,
    cost: &'a mut C,
    /// Internal cost is `sign * f`; -1 when maximizing.
    sign: f64,
    delta: Vec<f64>,
    /// Vertices sorted by ascending internal cost.
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
    iteration: usize,
    evaluations: usize,
    restarts: usize,
    previous_run_best: Option<f64>,
    state: OptimizerState,
    stop_condition: Option<StopCondition>,
    failure: Option<String>,
}

impl<'a, C: CostFunction> AmoebaIterations<'a, C> {
    fn new(config: &'a AmoebaConfig, cost: &'a mut C, initial: &[f64]) -> error::Result<Self> {
        config.validate()?;
        let n = cost.number_of_parameters();
        if n == 0 {
            return Err(RegistrationError::invalid_configuration(
                "cost function has no parameters to optimize",
            ));
        }
        if initial.len() != n {
            return Err(RegistrationError::dimension_mismatch(format!(
                "initial position has {} parameters, cost function expects {}",
                initial.len(),
                n
            )));
        }
        let delta = config.simplex_delta(initial)?;

        let mut iterations = Self {
            config,
            cost,
            sign: if config.maximize { -1.0 } else { 1.0 },
            delta,
            vertices: Vec::with_capacity(n + 1),
            values: Vec::with_capacity(n + 1),
            iteration: 0,
            evaluations: 0,
            restarts: 0,
            previous_run_best: None,
            state: OptimizerState::Initialized,
            stop_condition: None,
            failure: None,
        };
        iterations.build_simplex(initial.to_vec())?;
        info!(
            parameters = n,
            maximize = config.maximize,
            "Amoeba optimizer initialized, best initial value {:.6}",
            iterations.best_value()
        );
        Ok(iterations)
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn best_parameters(&self) -> &[f64] {
        &self.vertices[0]
    }

    /// Best value in the caller's orientation.
    pub fn best_value(&self) -> f64 {
        self.sign * self.values[0]
    }

    pub fn stop_condition(&self) -> Option<StopCondition> {
        self.stop_condition
    }

    /// Drive the stream to completion and return the outcome.
    pub fn finish(mut self) -> error::Result<OptimizerOutcome> {
        while let Some(event) = self.next() {
            event?;
        }
        if let Some(message) = self.failure.take() {
            return Err(RegistrationError::optimizer(format!("optimization failed: {message}")));
        }
        let stop_condition = self
            .stop_condition
            .ok_or_else(|| RegistrationError::optimizer("optimizer stopped without a stop condition"))?;
        let description = self.describe(stop_condition);
        Ok(OptimizerOutcome {
            parameters: self.vertices[0].clone(),
            value: self.best_value(),
            stop_condition,
            iterations: self.iteration,
            evaluations: self.evaluations,
            restarts: self.restarts,
            description,
        })
    }

    fn evaluate(&mut self, parameters: &[f64]) -> error::Result<f64> {
        let value = self.cost.value(parameters)?;
        self.evaluations += 1;
        if value.is_nan() {
            return Err(RegistrationError::optimizer(format!(
                "cost function returned NaN at {parameters:?}"
            )));
        }
        Ok(self.sign * value)
    }

    fn build_simplex(&mut self, start: Vec<f64>) -> error::Result<()> {
        let start_value = self.evaluate(&start)?;
        let mut vertices = vec![start.clone()];
        let mut values = vec![start_value];
        for i in 0..start.len() {
            let mut vertex = start.clone();
            vertex[i] += self.delta[i];
            values.push(self.evaluate(&vertex)?);
            vertices.push(vertex);
        }
        self.vertices = vertices;
        self.values = values;
        self.sort();
        Ok(())
    }

    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        self.vertices = order.iter().map(|&i| self.vertices[i].clone()).collect();
        self.values = order.iter().map(|&i| self.values[i]).collect();
    }

    /// `c + coefficient * (x - c)`
    fn towards(centroid: &[f64], x: &[f64], coefficient: f64) -> Vec<f64> {
        centroid
            .iter()
            .zip(x)
            .map(|(c, xi)| c + coefficient * (xi - c))
            .collect()
    }

    /// One full simplex update.
    fn step(&mut self) -> error::Result<SimplexStep> {
        let n = self.vertices.len() - 1;
        let worst = n;

        let mut centroid = vec![0.0; n];
        for vertex in &self.vertices[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / n as f64;
            }
        }

        let reflected = Self::towards(&centroid, &self.vertices[worst], -self.config.reflection);
        let reflected_value = self.evaluate(&reflected)?;

        let step = if reflected_value < self.values[0] {
            let expanded = Self::towards(&centroid, &reflected, self.config.expansion);
            let expanded_value = self.evaluate(&expanded)?;
            if expanded_value < reflected_value {
                self.vertices[worst] = expanded;
                self.values[worst] = expanded_value;
                SimplexStep::Expansion
            } else {
                self.vertices[worst] = reflected;
                self.values[worst] = reflected_value;
                SimplexStep::Reflection
            }
        } else if reflected_value < self.values[n - 1] {
            self.vertices[worst] = reflected;
            self.values[worst] = reflected_value;
            SimplexStep::Reflection
        } else {
            if reflected_value < self.values[worst] {
                self.vertices[worst] = reflected;
                self.values[worst] = reflected_value;
            }
            let contracted = Self::towards(&centroid, &self.vertices[worst], self.config.contraction);
            let contracted_value = self.evaluate(&contracted)?;
            if contracted_value < self.values[worst] {
                self.vertices[worst] = contracted;
                self.values[worst] = contracted_value;
                SimplexStep::Contraction
            } else {
                let best = self.vertices[0].clone();
                for i in 1..=n {
                    let shrunk = Self::towards(&best, &self.vertices[i], self.config.shrink);
                    self.values[i] = self.evaluate(&shrunk)?;
                    self.vertices[i] = shrunk;
                }
                SimplexStep::Shrink
            }
        };

        self.sort();
        Ok(step)
    }

    /// (parameter range, value range) of the current simplex.
    fn ranges(&self) -> (f64, f64) {
        let best = &self.vertices[0];
        let parameter_range = self.vertices[1..]
            .iter()
            .flat_map(|vertex| vertex.iter().zip(best).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);
        let value_range = self.values[1..]
            .iter()
            .map(|v| (v - self.values[0]).abs())
            .fold(0.0, f64::max);
        (parameter_range, value_range)
    }

    fn convergence(&self, parameter_range: f64, value_range: f64) -> Option<StopCondition> {
        if parameter_range <= self.config.parameters_convergence_tolerance {
            Some(StopCondition::ConvergedByParameters)
        } else if value_range <= self.config.function_convergence_tolerance {
            Some(StopCondition::ConvergedByValue)
        } else {
            None
        }
    }

    /// True once two consecutive runs agree within the function tolerance.
    fn restarts_settled(&self) -> bool {
        self.previous_run_best
            .map(|previous| (previous - self.values[0]).abs() <= self.config.function_convergence_tolerance)
            .unwrap_or(false)
    }

    fn restart(&mut self) -> error::Result<()> {
        self.previous_run_best = Some(self.values[0]);
        self.restarts += 1;
        let best = self.vertices[0].clone();
        debug!(restart = self.restarts, "Restarting simplex from {:?}", best);
        self.build_simplex(best)
    }

    fn stop(&mut self, condition: StopCondition) {
        self.stop_condition = Some(condition);
        self.state = condition.state();
        info!(
            iterations = self.iteration,
            evaluations = self.evaluations,
            "Amoeba optimizer stopped: {}",
            self.describe(condition)
        );
    }

    fn fail(&mut self, err: RegistrationError) -> RegistrationError {
        self.state = OptimizerState::Failed;
        self.failure = Some(err.to_string());
        err
    }

    fn describe(&self, condition: StopCondition) -> String {
        let (parameter_range, value_range) = self.ranges();
        match condition {
            StopCondition::ConvergedByParameters => format!(
                "Converged by parameter tolerance: simplex parameter range {:.3e} <= {:.3e} after {} iterations",
                parameter_range, self.config.parameters_convergence_tolerance, self.iteration
            ),
            StopCondition::ConvergedByValue => format!(
                "Converged by value tolerance: simplex value range {:.3e} <= {:.3e} after {} iterations",
                value_range, self.config.function_convergence_tolerance, self.iteration
            ),
            StopCondition::MaximumIterations => format!(
                "Maximum iterations ({}) reached before parameter tolerance {:.3e} or value tolerance {:.3e} was met",
                self.config.maximum_number_of_iterations,
                self.config.parameters_convergence_tolerance,
                self.config.function_convergence_tolerance
            ),
        }
    }
}

impl<C: CostFunction> Iterator for AmoebaIterations<'_, C> {
    type Item = error::Result<IterationEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }
        if self.iteration >= self.config.maximum_number_of_iterations {
            self.stop(StopCondition::MaximumIterations);
            return None;
        }
        self.state = OptimizerState::Iterating;

        let step = match self.step() {
            Ok(step) => step,
            Err(err) => return Some(Err(self.fail(err))),
        };
        self.iteration += 1;

        let (parameter_range, value_range) = self.ranges();
        let mut event = IterationEvent {
            iteration: self.iteration,
            value: self.best_value(),
            parameters: self.vertices[0].clone(),
            parameter_range,
            value_range,
            step,
            evaluations: self.evaluations,
            restarted: false,
        };
        debug!(
            iteration = event.iteration,
            step = ?event.step,
            "value {:.6} at {:?} (parameter range {:.3e}, value range {:.3e})",
            event.value,
            event.parameters,
            parameter_range,
            value_range
        );

        match self.convergence(parameter_range, value_range) {
            Some(_) if self.config.optimize_with_restarts && !self.restarts_settled() => {
                if let Err(err) = self.restart() {
                    return Some(Err(self.fail(err)));
                }
                event.restarted = true;
                event.evaluations = self.evaluations;
            }
            Some(condition) => self.stop(condition),
            None if self.iteration >= self.config.maximum_number_of_iterations => {
                self.stop(StopCondition::MaximumIterations)
            }
            None => {}
        }

        Some(Ok(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::FnCostFunction;

    fn bowl(center: [f64; 2]) -> impl FnMut(&[f64]) -> error::Result<f64> {
        move |p: &[f64]| {
            let dx = p[0] - center[0];
            let dy = p[1] - center[1];
            Ok(dx * dx + 4.0 * dy * dy + 0.5 * dx * dy)
        }
    }

    fn tight_config() -> AmoebaConfig {
        AmoebaConfig::new()
            .with_parameters_convergence_tolerance(1e-6)
            .with_function_convergence_tolerance(0.0)
            .with_automatic_initial_simplex(false)
            .with_initial_simplex_delta(Some(vec![0.7, 0.3]))
    }

    #[test]
    fn test_default_config_values() {
        let config = AmoebaConfig::new();
        assert!(!config.maximize);
        assert_eq!(config.parameters_convergence_tolerance, 1e-8);
        assert_eq!(config.function_convergence_tolerance, 1e-4);
        assert_eq!(config.maximum_number_of_iterations, 500);
        assert!(config.automatic_initial_simplex);
        assert_eq!(config.initial_simplex_delta, None);
        assert_eq!(
            (config.reflection, config.expansion, config.contraction, config.shrink),
            (1.0, 2.0, 0.5, 0.5)
        );
    }

    #[test]
    fn test_automatic_delta() {
        let delta = AmoebaConfig::new().simplex_delta(&[0.0, 10.0, -4.0]).unwrap();
        assert_eq!(delta, vec![0.00025, 0.5, -0.2]);
    }

    #[test]
    fn test_explicit_delta_length_checked() {
        let config = AmoebaConfig::new()
            .with_automatic_initial_simplex(false)
            .with_initial_simplex_delta(Some(vec![1.0]));
        let err = config.simplex_delta(&[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, RegistrationError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_invalid_coefficients_rejected() {
        assert!(AmoebaConfig::new().with_contraction(1.5).validate().is_err());
        assert!(AmoebaConfig::new().with_expansion(0.5).validate().is_err());
        assert!(AmoebaConfig::new().with_function_convergence_tolerance(-1.0).validate().is_err());
        assert!(AmoebaConfig::new().validate().is_ok());
    }

    #[test]
    fn test_minimizes_quadratic() {
        let mut optimizer = tight_config().init();
        let mut cost = FnCostFunction::new(2, bowl([1.0, -2.0]));
        let outcome = optimizer.optimize(&mut cost, &[0.2, 0.1], &ProgressTracker::new()).unwrap();

        assert_eq!(outcome.stop_condition, StopCondition::ConvergedByParameters, "{}", outcome.description);
        assert!((outcome.parameters[0] - 1.0).abs() < 1e-3);
        assert!((outcome.parameters[1] + 2.0).abs() < 1e-3);
        assert_eq!(optimizer.state(), OptimizerState::Converged);
        assert!(outcome.evaluations > outcome.iterations);
    }

    #[test]
    fn test_flat_simplex_converges_by_value() {
        // All three vertices land on the 0.25 level set after five steps.
        let mut optimizer = AmoebaConfig::new()
            .with_parameters_convergence_tolerance(1e-6)
            .with_function_convergence_tolerance(1e-12)
            .with_automatic_initial_simplex(false)
            .with_initial_simplex_delta(Some(vec![1.0, 1.0]))
            .init();
        let mut cost = FnCostFunction::new(2, bowl([1.0, -2.0]));
        let outcome = optimizer.optimize(&mut cost, &[0.0, 0.0], &ProgressTracker::new()).unwrap();

        assert_eq!(outcome.stop_condition, StopCondition::ConvergedByValue);
        assert_eq!(outcome.iterations, 5);
        assert!((outcome.parameters[0] - 1.5).abs() < 1e-12 && (outcome.parameters[1] + 2.0).abs() < 1e-12);
        assert!((outcome.value - 0.25).abs() < 1e-12);
        assert!(outcome.description.starts_with("Converged by value tolerance"), "{}", outcome.description);
        assert_eq!(optimizer.state(), OptimizerState::Converged);
    }

    #[test]
    fn test_maximize_reports_caller_orientation() {
        let mut optimizer = tight_config().with_maximize(true).init();
        let mut cost = FnCostFunction::new(2, |p: &[f64]| Ok(5.0 - (p[0] - 3.0).powi(2) - p[1].powi(2)));
        let outcome = optimizer.optimize(&mut cost, &[0.0, 1.0], &ProgressTracker::new()).unwrap();

        assert!((outcome.value - 5.0).abs() < 1e-6);
        assert!((outcome.parameters[0] - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_maximum_iterations_stop() {
        let mut optimizer = tight_config().with_maximum_number_of_iterations(3).init();
        let mut cost = FnCostFunction::new(2, bowl([10.0, 10.0]));
        let outcome = optimizer.optimize(&mut cost, &[0.0, 0.0], &ProgressTracker::new()).unwrap();

        assert_eq!(outcome.stop_condition, StopCondition::MaximumIterations);
        assert_eq!(outcome.iterations, 3);
        assert!(outcome.description.contains("Maximum iterations"));
        assert_eq!(optimizer.state(), OptimizerState::MaxIterationsReached);
    }

    #[test]
    fn test_stream_is_lazy_and_monotone() {
        let config = tight_config();
        let optimizer = config.init();
        let mut cost = FnCostFunction::new(2, bowl([1.0, 1.0]));
        let mut iterations = optimizer.iterate(&mut cost, &[0.0, 0.0]).unwrap();
        assert_eq!(iterations.state(), OptimizerState::Initialized);
        assert_eq!(iterations.evaluations(), 3);

        let events: Vec<IterationEvent> = iterations.by_ref().take(5).map(|e| e.unwrap()).collect();
        assert_eq!(events.len(), 5);
        assert_eq!(iterations.state(), OptimizerState::Iterating);
        for (k, pair) in events.windows(2).enumerate() {
            assert_eq!(pair[1].iteration, k + 2);
            assert!(pair[1].value <= pair[0].value);
        }

        let outcome = iterations.finish().unwrap();
        assert!(outcome.iterations >= 5);
    }

    #[test]
    fn test_cost_failure_fails_stream() {
        let mut calls = 0;
        let mut cost = FnCostFunction::new(2, move |p: &[f64]| {
            calls += 1;
            if calls > 6 {
                Err(RegistrationError::metric("no valid samples"))
            } else {
                Ok(p[0] * p[0] + p[1] * p[1])
            }
        });
        let mut optimizer = tight_config().init();
        let err = optimizer
            .optimize(&mut cost, &[3.0, 3.0], &ProgressTracker::new())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MetricError(_)));
        assert_eq!(optimizer.state(), OptimizerState::Failed);
    }

    #[test]
    fn test_restarts_until_runs_agree() {
        let mut optimizer = tight_config()
            .with_function_convergence_tolerance(1e-8)
            .with_optimize_with_restarts(true)
            .init();
        let mut cost = FnCostFunction::new(2, bowl([2.0, 0.5]));
        let outcome = optimizer.optimize(&mut cost, &[0.0, 0.0], &ProgressTracker::new()).unwrap();

        assert!(outcome.restarts >= 1);
        assert!(outcome.stop_condition.is_converged());
        assert!((outcome.parameters[0] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_dimension_mismatch() {
        let optimizer = AmoebaOptimizer::default();
        let mut cost = FnCostFunction::new(2, bowl([0.0, 0.0]));
        assert!(matches!(
            optimizer.iterate(&mut cost, &[1.0]),
            Err(RegistrationError::DimensionMismatch(_))
        ));
    }
}
