//! Derivative-free optimizers.
//!
//! # Examples
//!
//! ```rust
//! use regmesh_registration::optimizer::{AmoebaConfig, FnCostFunction, Optimizer};
//! use regmesh_registration::ProgressTracker;
//!
//! let mut optimizer = AmoebaConfig::new()
//!     .with_function_convergence_tolerance(1e-10)
//!     .with_maximum_number_of_iterations(200)
//!     .init();
//! let mut cost = FnCostFunction::new(1, |p: &[f64]| Ok((p[0] - 2.0).powi(2)));
//! let outcome = optimizer.optimize(&mut cost, &[0.0], &ProgressTracker::new()).unwrap();
//! assert!((outcome.parameters[0] - 2.0).abs() < 1e-2);
//! ```

pub mod amoeba;
pub mod trait_;

pub use amoeba::{AmoebaConfig, AmoebaIterations, AmoebaOptimizer};
pub use trait_::{
    CostFunction, FnCostFunction, IterationEvent, Optimizer, OptimizerOutcome, OptimizerState, SimplexStep,
    StopCondition,
};
