//! Intensity-based image registration: a histogram mutual-information
//! metric driven by a downhill simplex optimizer over a parametric transform.

pub mod error;
pub mod metric;
pub mod optimizer;
pub mod progress;
pub mod registration;
pub mod validation;

pub use error::{RegistrationError, Result};
pub use metric::{Metric, MutualInformationConfig, MutualInformationHistogramMetric};
pub use optimizer::{AmoebaConfig, AmoebaOptimizer, Optimizer, OptimizerState, StopCondition};
pub use progress::{ConsoleProgressCallback, HistoryCallback, ProgressCallback, ProgressInfo, ProgressTracker};
pub use registration::{ImageRegistrationMethod, RegistrationResult};
