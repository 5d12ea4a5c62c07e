//! Histogram mutual information metric.

use burn::config::Config;
use burn::tensor::backend::Backend;
use regmesh_core::image::{generate_grid, inside_mask};
use regmesh_core::interpolation::{Interpolator, LinearInterpolator};
use regmesh_core::transform::{ParametricTransform, Transform};
use regmesh_core::{Image, ImageRegion};
use tracing::debug;

use super::histogram::{HistogramBounds, IntensityBounds, JointHistogram};
use super::trait_::Metric;
use crate::error::{self, RegistrationError};
use crate::validation::{validate_histogram_size, validate_region};

/// Configuration of [`MutualInformationHistogramMetric`].
#[derive(Config, Debug, PartialEq)]
pub struct MutualInformationConfig {
    /// Bins along the fixed intensity axis.
    #[config(default = 256)]
    pub fixed_histogram_size: usize,
    /// Bins along the moving intensity axis.
    #[config(default = 256)]
    pub moving_histogram_size: usize,
    /// Fraction of the intensity range added above the maximum.
    #[config(default = 0.001)]
    pub upper_bound_increase_factor: f64,
    /// Base step of the finite-difference derivative.
    #[config(default = 0.1)]
    pub derivative_step_length: f64,
    /// Allow `derivative`; derivative-free optimizers leave this off.
    #[config(default = false)]
    pub compute_gradient: bool,
}

impl MutualInformationConfig {
    pub fn init(&self) -> MutualInformationHistogramMetric {
        MutualInformationHistogramMetric {
            config: self.clone(),
            interpolator: LinearInterpolator::new(),
            derivative_step_length_scales: Vec::new(),
            bounds: None,
        }
    }
}

/// Mutual information between fixed and moving intensities, estimated from
/// a hard-binned joint histogram.
///
/// Every pixel of the fixed region is mapped through the transform into the
/// moving image. Samples landing outside the moving buffer are dropped from
/// all histograms; the rest are linearly interpolated. Larger values mean
/// better alignment, so registration maximizes this metric.
#[derive(Debug, Clone)]
pub struct MutualInformationHistogramMetric {
    config: MutualInformationConfig,
    interpolator: LinearInterpolator,
    derivative_step_length_scales: Vec<f64>,
    bounds: Option<HistogramBounds>,
}

impl Default for MutualInformationHistogramMetric {
    fn default() -> Self {
        MutualInformationConfig::new().init()
    }
}

impl MutualInformationHistogramMetric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of bins per axis.
    pub fn with_histogram_size(mut self, fixed_bins: usize, moving_bins: usize) -> Self {
        self.set_histogram_size(fixed_bins, moving_bins);
        self
    }

    pub fn set_histogram_size(&mut self, fixed_bins: usize, moving_bins: usize) {
        self.config.fixed_histogram_size = fixed_bins;
        self.config.moving_histogram_size = moving_bins;
    }

    /// Per-parameter multipliers of the derivative step; missing entries count as 1.
    pub fn with_derivative_step_length_scales(mut self, scales: Vec<f64>) -> Self {
        self.derivative_step_length_scales = scales;
        self
    }

    pub fn set_compute_gradient(&mut self, compute_gradient: bool) {
        self.config.compute_gradient = compute_gradient;
    }

    pub fn config(&self) -> &MutualInformationConfig {
        &self.config
    }

    pub fn histogram_size(&self) -> [usize; 2] {
        [self.config.fixed_histogram_size, self.config.moving_histogram_size]
    }

    /// Bounds computed by the last `initialize`, if any.
    pub fn bounds(&self) -> Option<HistogramBounds> {
        self.bounds
    }

    /// Use fixed intensity bounds instead of deriving them from the images.
    pub fn set_bounds(&mut self, bounds: HistogramBounds) {
        self.bounds = Some(bounds);
    }

    /// Intensity bounds from the fixed region and the whole moving image.
    pub fn compute_bounds<B: Backend, const D: usize>(
        &self,
        fixed: &Image<B, D>,
        moving: &Image<B, D>,
        region: &ImageRegion<D>,
    ) -> error::Result<HistogramBounds> {
        validate_region(region, fixed)?;
        let (fixed_min, fixed_max) = min_max(&fixed.region_values(region))
            .ok_or_else(|| RegistrationError::image_validation("fixed region holds no pixels"))?;
        let (moving_min, moving_max) = moving
            .min_max()
            .ok_or_else(|| RegistrationError::image_validation("moving image holds no pixels"))?;

        let factor = self.config.upper_bound_increase_factor;
        Ok(HistogramBounds {
            fixed: IntensityBounds::from_range(fixed_min as f64, fixed_max as f64, factor),
            moving: IntensityBounds::from_range(moving_min as f64, moving_max as f64, factor),
        })
    }

    /// Joint histogram of the fixed region against the transformed moving image.
    pub fn joint_histogram<B: Backend, const D: usize>(
        &self,
        fixed: &Image<B, D>,
        moving: &Image<B, D>,
        transform: &impl Transform<B, D>,
        region: &ImageRegion<D>,
    ) -> error::Result<JointHistogram> {
        let [fixed_bins, moving_bins] = self.histogram_size();
        validate_histogram_size(fixed_bins, moving_bins)?;
        validate_region(region, fixed)?;
        let bounds = match self.bounds {
            Some(bounds) => bounds,
            None => self.compute_bounds(fixed, moving, region)?,
        };

        let device = fixed.data().device();
        let fixed_indices = generate_grid::<B, D>(region, &device);
        let fixed_points = fixed.index_to_world_tensor(fixed_indices);
        let moving_points = transform.transform_points(fixed_points);
        let moving_indices = moving.world_to_index_tensor(moving_points);

        let inside: Vec<f32> = inside_mask(moving_indices.clone(), moving.size())
            .into_data()
            .iter::<f32>()
            .collect();
        let moving_values: Vec<f32> = self
            .interpolator
            .interpolate(moving.data(), moving_indices)
            .into_data()
            .iter::<f32>()
            .collect();
        let fixed_values = fixed.region_values(region);

        let (fixed_samples, moving_samples): (Vec<f32>, Vec<f32>) = fixed_values
            .into_iter()
            .zip(moving_values)
            .zip(inside)
            .filter(|(_, flag)| *flag > 0.5)
            .map(|(pair, _)| pair)
            .unzip();

        if fixed_samples.is_empty() {
            return Err(RegistrationError::metric(
                "no fixed-region sample maps inside the moving image",
            ));
        }
        debug!(
            samples = fixed_samples.len(),
            region_pixels = region.number_of_pixels(),
            "Accumulating joint histogram"
        );

        Ok(JointHistogram::from_samples(
            &fixed_samples,
            &moving_samples,
            &bounds,
            fixed_bins,
            moving_bins,
        ))
    }

    /// Forward-difference derivative of the metric with respect to the
    /// transform parameters.
    ///
    /// Fails with `InvalidConfiguration` unless gradient computation is on.
    pub fn derivative<B, T, const D: usize>(
        &self,
        fixed: &Image<B, D>,
        moving: &Image<B, D>,
        transform: &T,
        region: &ImageRegion<D>,
    ) -> error::Result<Vec<f64>>
    where
        B: Backend,
        T: Transform<B, D> + ParametricTransform + Clone,
    {
        Ok(self.value_and_derivative(fixed, moving, transform, region)?.1)
    }

    /// Metric value together with its forward-difference derivative.
    pub fn value_and_derivative<B, T, const D: usize>(
        &self,
        fixed: &Image<B, D>,
        moving: &Image<B, D>,
        transform: &T,
        region: &ImageRegion<D>,
    ) -> error::Result<(f64, Vec<f64>)>
    where
        B: Backend,
        T: Transform<B, D> + ParametricTransform + Clone,
    {
        if !self.config.compute_gradient {
            return Err(RegistrationError::invalid_configuration(
                "derivative requested but compute_gradient is off",
            ));
        }
        let value = self.value(fixed, moving, transform, region)?;
        let parameters = transform.parameters();
        let mut derivative = Vec::with_capacity(parameters.len());
        for i in 0..parameters.len() {
            let scale = self.derivative_step_length_scales.get(i).copied().unwrap_or(1.0);
            let step = self.config.derivative_step_length * scale;
            if step == 0.0 || !step.is_finite() {
                return Err(RegistrationError::invalid_configuration(format!(
                    "derivative step for parameter {i} must be finite and non-zero, got {step}"
                )));
            }
            let mut shifted = parameters.clone();
            shifted[i] += step;
            let mut perturbed = transform.clone();
            perturbed.set_parameters(&shifted)?;
            let shifted_value = self.value(fixed, moving, &perturbed, region)?;
            derivative.push((shifted_value - value) / step);
        }
        Ok((value, derivative))
    }
}

fn min_max(values: &[f32]) -> Option<(f32, f32)> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    }))
}

impl<B: Backend, const D: usize> Metric<B, D> for MutualInformationHistogramMetric {
    fn initialize(&mut self, fixed: &Image<B, D>, moving: &Image<B, D>, region: &ImageRegion<D>) -> error::Result<()> {
        let [fixed_bins, moving_bins] = self.histogram_size();
        validate_histogram_size(fixed_bins, moving_bins)?;
        let bounds = self.compute_bounds(fixed, moving, region)?;
        debug!(?bounds, fixed_bins, moving_bins, "Mutual information bounds");
        self.bounds = Some(bounds);
        Ok(())
    }

    fn value(
        &self,
        fixed: &Image<B, D>,
        moving: &Image<B, D>,
        transform: &impl Transform<B, D>,
        region: &ImageRegion<D>,
    ) -> error::Result<f64> {
        let histogram = self.joint_histogram(fixed, moving, transform, region)?;
        let value = histogram.mutual_information();
        if !value.is_finite() {
            return Err(RegistrationError::metric(format!(
                "mutual information is not finite: {value}"
            )));
        }
        Ok(value)
    }

    fn name(&self) -> &'static str {
        "MutualInformationHistogram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use regmesh_core::spatial::Vector;
    use regmesh_core::transform::TranslationTransform;
    use regmesh_core::ImageGeometry;

    type TestBackend = NdArray<f32>;

    fn stripes(size: [usize; 2]) -> Image<TestBackend, 2> {
        let device = Default::default();
        let pixels = (0..size[0] * size[1])
            .map(|k| ((k % size[0]) / 4 % 3) as f32 * 50.0)
            .collect();
        Image::from_pixels(pixels, ImageGeometry::with_size(size), &device).unwrap()
    }

    #[test]
    fn test_default_configuration() {
        let metric = MutualInformationHistogramMetric::new();
        assert_eq!(metric.histogram_size(), [256, 256]);
        assert_eq!(metric.config().upper_bound_increase_factor, 0.001);
        assert_eq!(metric.config().derivative_step_length, 0.1);
        assert!(!metric.config().compute_gradient);
    }

    #[test]
    fn test_bounds_follow_intensity_range() {
        let image = stripes([24, 8]);
        let mut metric = MutualInformationHistogramMetric::new();
        metric.initialize(&image, &image, &image.largest_region()).unwrap();
        let bounds = metric.bounds().unwrap();
        assert_eq!(bounds.fixed.lower, 0.0);
        assert!((bounds.fixed.upper - 100.1).abs() < 1e-9);
    }

    #[test]
    fn test_aligned_is_better_than_shifted() {
        let image = stripes([24, 8]);
        let region = image.largest_region();
        let metric = MutualInformationHistogramMetric::new().with_histogram_size(16, 16);

        let aligned = metric.value(&image, &image, &TranslationTransform::<2>::identity(), &region).unwrap();
        let shifted = TranslationTransform::new(Vector::new([2.0, 0.0]));
        let misaligned = metric.value(&image, &image, &shifted, &region).unwrap();

        // Three equally likely stripes.
        assert!((aligned - 3.0f64.ln()).abs() < 1e-2, "aligned MI {aligned}");
        assert!(misaligned < aligned);
    }

    #[test]
    fn test_no_overlap_is_an_error() {
        let image = stripes([16, 8]);
        let region = image.largest_region();
        let metric = MutualInformationHistogramMetric::new();
        let far = TranslationTransform::new(Vector::new([1000.0, 0.0]));
        let err = metric.value(&image, &image, &far, &region).unwrap_err();
        assert!(matches!(err, RegistrationError::MetricError(_)));
    }

    #[test]
    fn test_derivative_requires_gradient_switch() {
        let image = stripes([16, 8]);
        let region = image.largest_region();
        let transform = TranslationTransform::<2>::identity();

        let metric = MutualInformationHistogramMetric::new().with_histogram_size(8, 8);
        assert!(matches!(
            metric.derivative(&image, &image, &transform, &region),
            Err(RegistrationError::InvalidConfiguration(_))
        ));

        let mut metric = metric.with_derivative_step_length_scales(vec![1.0, 2.0]);
        metric.set_compute_gradient(true);
        let derivative = metric.derivative(&image, &image, &transform, &region).unwrap();
        assert_eq!(derivative.len(), 2);
        assert!(derivative.iter().all(|d| d.is_finite()));
    }
}
