//! Validation utilities for registration inputs and settings.

use burn::tensor::backend::Backend;
use regmesh_core::{Image, ImageRegion};

use crate::error::{RegistrationError, Result};

/// Validate that an image holds pixels.
pub fn validate_image_not_empty<B: Backend, const D: usize>(image: &Image<B, D>, role: &str) -> Result<()> {
    if image.is_empty() {
        return Err(RegistrationError::image_validation(format!(
            "{role} image is empty (size {:?})",
            image.size()
        )));
    }
    Ok(())
}

/// Validate that `region` is non-empty and lies inside `image`.
pub fn validate_region<B: Backend, const D: usize>(region: &ImageRegion<D>, image: &Image<B, D>) -> Result<()> {
    if region.is_empty() {
        return Err(RegistrationError::image_validation(format!(
            "region {:?} + {:?} is empty",
            region.index(),
            region.size()
        )));
    }
    if !region.is_inside(&image.largest_region()) {
        return Err(RegistrationError::image_validation(format!(
            "region {:?} + {:?} exceeds image size {:?}",
            region.index(),
            region.size(),
            image.size()
        )));
    }
    Ok(())
}

/// Validate a parameter vector length against what a transform expects.
pub fn validate_parameter_count(expected: usize, parameters: &[f64]) -> Result<()> {
    if parameters.len() != expected {
        return Err(RegistrationError::dimension_mismatch(format!(
            "expected {} parameters, got {}",
            expected,
            parameters.len()
        )));
    }
    if let Some(bad) = parameters.iter().find(|p| !p.is_finite()) {
        return Err(RegistrationError::invalid_configuration(format!(
            "parameters must be finite, got {bad}"
        )));
    }
    Ok(())
}

/// Validate histogram bin counts for mutual information.
pub fn validate_histogram_size(fixed_bins: usize, moving_bins: usize) -> Result<()> {
    for (role, bins) in [("fixed", fixed_bins), ("moving", moving_bins)] {
        if bins == 0 {
            return Err(RegistrationError::invalid_configuration(format!(
                "{role} histogram needs at least one bin"
            )));
        }
        if bins > 4096 {
            return Err(RegistrationError::invalid_configuration(format!(
                "{role} histogram size too large: {bins}"
            )));
        }
    }
    Ok(())
}

/// Validate iteration count.
pub fn validate_iterations(iterations: usize) -> Result<()> {
    if iterations == 0 {
        return Err(RegistrationError::invalid_configuration("Iterations must be positive"));
    }

    if iterations > 1_000_000 {
        return Err(RegistrationError::invalid_configuration(format!(
            "Iterations too large: {}",
            iterations
        )));
    }

    Ok(())
}
