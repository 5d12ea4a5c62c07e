//! `regmesh register`: mutual-information translation registration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use burn::config::Config;
use burn_ndarray::{NdArray, NdArrayDevice};
use clap::Args;
use regmesh_core::filter::ResampleImageFilter;
use regmesh_core::interpolation::LinearInterpolator;
use regmesh_core::transform::TranslationTransform;
use regmesh_core::Image;
use regmesh_io::{read_image, write_image};
use regmesh_registration::{
    AmoebaConfig, ConsoleProgressCallback, ImageRegistrationMethod, MutualInformationHistogramMetric, ProgressCallback,
    ProgressInfo,
};
use tracing::info;

type Backend = NdArray<f32>;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Fixed image
    fixed: PathBuf,

    /// Moving image
    moving: PathBuf,

    /// Output path for the moving image resampled onto the fixed grid
    output: PathBuf,

    /// Initial translation along x
    #[arg(allow_negative_numbers = true, requires = "ty")]
    tx: Option<f64>,

    /// Initial translation along y
    #[arg(allow_negative_numbers = true)]
    ty: Option<f64>,

    /// Histogram bins per image
    #[arg(long, default_value_t = 256)]
    histogram_bins: usize,

    /// Initial simplex step along each parameter
    #[arg(long, default_value_t = 5.0)]
    simplex_delta: f64,

    /// Maximum simplex updates
    #[arg(long, default_value_t = 200)]
    max_iterations: usize,

    /// Optimizer settings as JSON; replaces the simplex and iteration flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Value for output pixels that map outside the moving image
    #[arg(long, default_value_t = 100.0)]
    default_pixel_value: f64,

    /// Log every N-th iteration with timing through the tracing subscriber
    #[arg(long, default_value_t = 10)]
    log_interval: usize,
}

impl RegisterArgs {
    fn optimizer_config(&self) -> Result<AmoebaConfig> {
        if let Some(path) = &self.config {
            return AmoebaConfig::load(path)
                .with_context(|| format!("Failed to load optimizer config {}", path.display()));
        }
        Ok(AmoebaConfig::new()
            .with_maximize(true)
            .with_automatic_initial_simplex(false)
            .with_initial_simplex_delta(Some(vec![self.simplex_delta; 2]))
            .with_parameters_convergence_tolerance(0.1)
            .with_function_convergence_tolerance(0.001)
            .with_maximum_number_of_iterations(self.max_iterations))
    }

    fn initial_parameters(&self) -> Vec<f64> {
        vec![self.tx.unwrap_or(0.0), self.ty.unwrap_or(0.0)]
    }
}

fn format_parameters(parameters: &[f64]) -> String {
    let values: Vec<String> = parameters.iter().map(|p| format!("{p}")).collect();
    format!("[{}]", values.join(", "))
}

/// Prints one line per optimizer iteration: number, value, position.
struct IterationPrinter;

impl ProgressCallback for IterationPrinter {
    fn on_progress(&self, info: &ProgressInfo) {
        println!("{}   {}   {}", info.iteration, info.value, format_parameters(&info.parameters));
    }
}

pub fn run(args: RegisterArgs) -> Result<()> {
    let device = NdArrayDevice::default();
    let fixed: Image<Backend, 2> = read_image(&args.fixed, &device)?;
    let moving: Image<Backend, 2> = read_image(&args.moving, &device)?;
    let initial = args.initial_parameters();
    let config = args.optimizer_config()?;
    info!(
        fixed = %args.fixed.display(),
        moving = %args.moving.display(),
        bins = args.histogram_bins,
        "Registering"
    );

    let metric = MutualInformationHistogramMetric::new().with_histogram_size(args.histogram_bins, args.histogram_bins);
    let mut registration =
        ImageRegistrationMethod::new(fixed, moving, TranslationTransform::<2>::identity(), metric, config.init())
            .with_initial_parameters(initial.clone());
    registration.add_observer(Arc::new(IterationPrinter));
    registration.add_observer(Arc::new(ConsoleProgressCallback::new(args.log_interval)));

    println!("Initial transform parameters = {}", format_parameters(&initial));
    let result = registration.update().context("Registration failed")?;

    println!("Optimizer stop condition: {}", result.description);
    println!("Result = ");
    println!(" Translation X = {}", result.parameters[0]);
    println!(" Translation Y = {}", result.parameters[1]);
    println!(" Metric value  = {}", result.value);

    let resampled = ResampleImageFilter::new_from_reference(
        registration.fixed(),
        *registration.transform(),
        LinearInterpolator::default(),
    )
    .with_default_pixel_value(args.default_pixel_value)
    .apply(registration.moving())
    .context("Failed to resample the moving image")?;
    write_image(&args.output, &resampled)
}
