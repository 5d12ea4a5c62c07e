//! 8-bit grayscale rasters (PNG, PNM, BMP, TIFF) through the `image` crate.
//!
//! Rasters carry no geometry: images read here have zero origin, unit
//! spacing and identity direction, and geometry is dropped on write.

use std::path::Path;

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use image::GrayImage;
use regmesh_core::{Image, ImageGeometry};
use tracing::{debug, warn};

pub fn read_raster<B: Backend, P: AsRef<Path>>(path: P, device: &B::Device) -> Result<Image<B, 2>> {
    let path = path.as_ref();
    let decoded = image::open(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?
        .to_luma8();
    let (width, height) = decoded.dimensions();
    debug!(width, height, "Read raster {}", path.display());

    let pixels = decoded.into_raw().into_iter().map(f32::from).collect();
    let geometry = ImageGeometry::with_size([width as usize, height as usize]);
    Image::from_pixels(pixels, geometry, device).context("Raster does not form a valid image")
}

/// Write as 8-bit luma; values are rounded and clamped to `[0, 255]`.
pub fn write_raster<B: Backend, P: AsRef<Path>>(path: P, image: &Image<B, 2>) -> Result<()> {
    let path = path.as_ref();
    let [width, height] = image.size();
    let values = image.pixel_values();
    let clamped = values.iter().filter(|v| !(0.0..=255.0).contains(*v)).count();
    if clamped > 0 {
        warn!(clamped, "Clamping pixels outside [0, 255] for {}", path.display());
    }

    let buffer = values.iter().map(|v| v.round().clamp(0.0, 255.0) as u8).collect();
    let raster = GrayImage::from_raw(width as u32, height as u32, buffer)
        .context("Pixel buffer does not match the image size")?;
    raster
        .save(path)
        .with_context(|| format!("Failed to write image {}", path.display()))
}
