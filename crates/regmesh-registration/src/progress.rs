//! Progress tracking and callbacks for registration workflows.
//!
//! Callbacks are notified synchronously and in registration order, once per
//! accepted optimizer iteration.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Progress information for one optimizer iteration.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Current iteration number (1-based).
    pub iteration: usize,
    /// Iteration budget, if known.
    pub total_iterations: Option<usize>,
    /// Metric value at the best vertex, in the caller's orientation.
    pub value: f64,
    /// Parameters of the best vertex.
    pub parameters: Vec<f64>,
    /// Time elapsed since start.
    pub elapsed: Duration,
    /// Estimated remaining time.
    pub estimated_remaining: Option<Duration>,
}

impl ProgressInfo {
    pub fn new(
        iteration: usize,
        total_iterations: Option<usize>,
        value: f64,
        parameters: Vec<f64>,
        elapsed: Duration,
    ) -> Self {
        Self {
            iteration,
            total_iterations,
            value,
            parameters,
            elapsed,
            estimated_remaining: None,
        }
    }

    /// Calculate progress percentage.
    pub fn progress_percent(&self) -> Option<f64> {
        self.total_iterations
            .filter(|&total| total > 0)
            .map(|total| (self.iteration as f64 / total as f64) * 100.0)
    }

    /// Estimate the remaining time from the average iteration time.
    pub fn calculate_remaining(&mut self) {
        if let Some(total) = self.total_iterations {
            if self.iteration > 0 {
                let avg_time_per_iter = self.elapsed.as_secs_f64() / self.iteration as f64;
                let remaining_iters = total.saturating_sub(self.iteration);
                self.estimated_remaining = Some(Duration::from_secs_f64(avg_time_per_iter * remaining_iters as f64));
            }
        }
    }
}

/// Progress callback trait for monitoring registration progress.
pub trait ProgressCallback: Send + Sync {
    /// Called once per iteration.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called when registration starts.
    fn on_start(&self) {}

    /// Called when the optimizer stops; `description` names the stop reason.
    fn on_complete(&self, _info: &ProgressInfo, _description: &str) {}

    /// Called when registration fails.
    fn on_error(&self, _error: &str) {}
}

/// Logs iterations through `tracing` at info level.
///
/// Every `log_interval`-th iteration is logged, plus the last one of the budget.
#[derive(Debug, Clone)]
pub struct ConsoleProgressCallback {
    pub log_interval: usize,
}

impl Default for ConsoleProgressCallback {
    fn default() -> Self {
        Self { log_interval: 1 }
    }
}

impl ConsoleProgressCallback {
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
        }
    }

    fn should_log(&self, info: &ProgressInfo) -> bool {
        info.iteration % self.log_interval == 0 || info.total_iterations == Some(info.iteration)
    }
}

fn format_parameters(parameters: &[f64]) -> String {
    let parts: Vec<String> = parameters.iter().map(|p| format!("{p:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        if !self.should_log(info) {
            return;
        }
        let budget = info.total_iterations.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string());
        let eta = info
            .estimated_remaining
            .map(|d| format!("{:.2}s", d.as_secs_f64()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::info!(
            percent = info.progress_percent().unwrap_or(0.0),
            "iteration {}/{budget}: value {:.6} at {} (eta {eta})",
            info.iteration,
            info.value,
            format_parameters(&info.parameters)
        );
    }

    fn on_start(&self) {
        tracing::info!("Optimizer started");
    }

    fn on_complete(&self, info: &ProgressInfo, description: &str) {
        tracing::info!(
            elapsed_secs = info.elapsed.as_secs_f64(),
            "Optimizer stopped after {} iterations: {description}; value {:.6} at {}",
            info.iteration,
            info.value,
            format_parameters(&info.parameters)
        );
    }

    fn on_error(&self, error: &str) {
        tracing::error!("Optimizer failed: {error}");
    }
}

/// History callback that records all progress information.
#[derive(Debug, Clone, Default)]
pub struct HistoryCallback {
    history: Arc<Mutex<Vec<ProgressInfo>>>,
}

impl HistoryCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded history.
    pub fn get_history(&self) -> Vec<ProgressInfo> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl ProgressCallback for HistoryCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).push(info.clone());
    }
}

/// Progress tracker that manages multiple callbacks.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    callbacks: Vec<Arc<dyn ProgressCallback>>,
    start_time: Option<Instant>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback. Callbacks are notified in insertion order.
    pub fn add_callback(&mut self, callback: Arc<dyn ProgressCallback>) {
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Start tracking.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        for callback in &self.callbacks {
            callback.on_start();
        }
    }

    fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or(Duration::ZERO)
    }

    /// Report one iteration.
    pub fn update(&self, iteration: usize, total_iterations: Option<usize>, value: f64, parameters: &[f64]) {
        let mut info = ProgressInfo::new(iteration, total_iterations, value, parameters.to_vec(), self.elapsed());
        info.calculate_remaining();

        for callback in &self.callbacks {
            callback.on_progress(&info);
        }
    }

    /// Report the final state.
    pub fn complete(&self, iteration: usize, value: f64, parameters: &[f64], description: &str) {
        let info = ProgressInfo::new(iteration, None, value, parameters.to_vec(), self.elapsed());
        for callback in &self.callbacks {
            callback.on_complete(&info, description);
        }
    }

    /// Report error.
    pub fn error(&self, error: &str) {
        for callback in &self.callbacks {
            callback.on_error(error);
        }
    }
}
