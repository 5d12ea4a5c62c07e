//! Image readers and writers.
//!
//! The format is chosen from the file extension: `.mha`/`.mhd` go through
//! the MetaImage codec and keep the image geometry, anything else is read
//! and written as an 8-bit grayscale raster.

pub mod metaimage;
pub mod raster;

use std::path::Path;

use anyhow::Result;
use burn::tensor::backend::Backend;
use regmesh_core::Image;

pub use metaimage::{read_metaimage, write_metaimage, write_metaimage_as, MetElementType};
pub use raster::{read_raster, write_raster};

fn is_metaimage(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mha") || ext.eq_ignore_ascii_case("mhd"))
        .unwrap_or(false)
}

/// Read a 2D image, picking the codec from the extension.
pub fn read_image<B: Backend, P: AsRef<Path>>(path: P, device: &B::Device) -> Result<Image<B, 2>> {
    let path = path.as_ref();
    if is_metaimage(path) {
        read_metaimage(path, device)
    } else {
        read_raster(path, device)
    }
}

/// Write a 2D image, picking the codec from the extension.
pub fn write_image<B: Backend, P: AsRef<Path>>(path: P, image: &Image<B, 2>) -> Result<()> {
    let path = path.as_ref();
    if is_metaimage(path) {
        write_metaimage(path, image)
    } else {
        write_raster(path, image)
    }
}
