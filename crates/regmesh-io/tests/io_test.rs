use anyhow::Result;
use burn_ndarray::NdArray;
use regmesh_core::spatial::{Point, Vector};
use regmesh_core::{Image, ImageGeometry};
use regmesh_io::{read_image, write_image};
use tempfile::tempdir;

type B = NdArray<f32>;

fn sample() -> Image<B, 2> {
    let device = Default::default();
    let mut geometry = ImageGeometry::with_size([4, 3]);
    geometry.origin = Point::new([2.0, -1.0]);
    geometry.spacing = Vector::new([0.25, 0.75]);
    let pixels = (0..12).map(|k| (k * 20) as f32).collect();
    Image::from_pixels(pixels, geometry, &device).unwrap()
}

#[test]
fn test_extension_selects_codec() -> Result<()> {
    let dir = tempdir()?;
    let device = Default::default();
    let image = sample();

    let mha = dir.path().join("sample.mha");
    write_image(&mha, &image)?;
    let from_mha: Image<B, 2> = read_image(&mha, &device)?;
    assert_eq!(from_mha.geometry(), image.geometry());
    assert_eq!(from_mha.pixel_values(), image.pixel_values());

    let png = dir.path().join("sample.png");
    write_image(&png, &image)?;
    let from_png: Image<B, 2> = read_image(&png, &device)?;
    assert_eq!(from_png.pixel_values(), image.pixel_values());
    assert_eq!(from_png.geometry(), ImageGeometry::with_size([4, 3]));
    Ok(())
}

#[test]
fn test_read_errors_name_the_file() {
    let device = Default::default();
    let err = read_image::<B, _>("/nonexistent/input.mha", &device).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/input.mha"));
}
