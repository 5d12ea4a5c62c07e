use std::path::Path;

use assert_cmd::Command;
use burn::config::Config;
use burn_ndarray::NdArray;
use image::{GrayImage, Luma};
use predicates::prelude::*;
use regmesh_core::{Image, ImageGeometry};
use regmesh_registration::AmoebaConfig;
use tempfile::tempdir;

type B = NdArray<f32>;

fn write_png(path: &Path, width: u32, height: u32) {
    let image = GrayImage::from_fn(width, height, |x, y| Luma([((x * 13 + y * 29) % 256) as u8]));
    image.save(path).unwrap();
}

fn write_blob(path: &Path, shift: [f64; 2]) {
    let device = Default::default();
    let size = 48;
    let pixels = (0..size * size)
        .map(|k| {
            let x = (k % size) as f64 - 20.0 - shift[0];
            let y = (k / size) as f64 - 24.0 - shift[1];
            let blob = 200.0 * (-(x * x + y * y) / 60.0).exp();
            let ridge = 80.0 * (-((x - 8.0) * (x - 8.0)) / 20.0).exp();
            (blob + ridge) as f32
        })
        .collect();
    let image = Image::<B, 2>::from_pixels(pixels, ImageGeometry::with_size([size, size]), &device).unwrap();
    regmesh_io::write_image(path, &image).unwrap();
}

fn regmesh() -> Command {
    Command::cargo_bin("regmesh").unwrap()
}

#[test]
fn test_mesh_four_by_four_passes_checks() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("square.png");
    let output = dir.path().join("mesh.json");
    write_png(&input, 4, 4);

    regmesh()
        .arg("mesh")
        .arg(&input)
        .args(["2", "2", "--expect-elements", "2", "2", "--expect-nodes", "9"])
        .args(["--expect-element-count", "4", "--expect-node", "0:0,0"])
        .args(["--expect-connectivity", "0:0,1,4,3", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of Materials Test: [PASSED]"))
        .stdout(predicate::str::contains("[FAILED]").not());

    let json = std::fs::read_to_string(&output).unwrap();
    assert!(json.contains("\"youngs_modulus\": 3000.0"));
}

#[test]
fn test_mesh_failed_expectation_exits_nonzero() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("square.png");
    write_png(&input, 4, 4);

    regmesh()
        .arg("mesh")
        .arg(&input)
        .args(["2", "2", "--expect-nodes", "10"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Number of Nodes Test: [FAILED]"))
        .stderr(predicate::str::contains("1 mesh checks failed"));
}

#[test]
fn test_mesh_rejects_remainder_when_asked() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("odd.png");
    write_png(&input, 5, 4);

    regmesh()
        .arg("mesh")
        .arg(&input)
        .args(["2", "2", "--remainder", "reject"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid lattice configuration"));

    regmesh()
        .arg("mesh")
        .arg(&input)
        .args(["2", "2", "--expect-elements", "2", "2"])
        .assert()
        .success();
}

#[test]
fn test_register_reports_result_and_writes_output() {
    let dir = tempdir().unwrap();
    let fixed = dir.path().join("fixed.mha");
    let moving = dir.path().join("moving.mha");
    let output = dir.path().join("registered.mha");
    write_blob(&fixed, [0.0, 0.0]);
    write_blob(&moving, [2.0, -1.0]);

    regmesh()
        .arg("register")
        .arg(&fixed)
        .arg(&moving)
        .arg(&output)
        .args(["0", "0", "--histogram-bins", "32", "--max-iterations", "50"])
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(predicate::str::contains("Optimizer stopped after"))
        .stdout(predicate::str::contains("Initial transform parameters = [0, 0]"))
        .stdout(predicate::str::contains("Optimizer stop condition:"))
        .stdout(predicate::str::contains(" Translation X = "))
        .stdout(predicate::str::contains(" Metric value  = "));

    let registered: Image<B, 2> = regmesh_io::read_image(&output, &Default::default()).unwrap();
    assert_eq!(registered.size(), [48, 48]);
}

#[test]
fn test_register_with_config_file_and_negative_start() {
    let dir = tempdir().unwrap();
    let fixed = dir.path().join("fixed.mha");
    let moving = dir.path().join("moving.mha");
    let output = dir.path().join("registered.png");
    let config = dir.path().join("amoeba.json");
    write_blob(&fixed, [0.0, 0.0]);
    write_blob(&moving, [0.0, 0.0]);
    AmoebaConfig::new()
        .with_maximize(true)
        .with_maximum_number_of_iterations(3)
        .save(&config)
        .unwrap();

    regmesh()
        .arg("register")
        .arg(&fixed)
        .arg(&moving)
        .arg(&output)
        .args(["-1.5", "0.5", "--histogram-bins", "16", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initial transform parameters = [-1.5, 0.5]"));
    assert!(output.exists());
}

#[test]
fn test_register_missing_input_fails() {
    let dir = tempdir().unwrap();
    regmesh()
        .arg("register")
        .arg(dir.path().join("missing.mha"))
        .arg(dir.path().join("missing.mha"))
        .arg(dir.path().join("out.mha"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read MetaImage"));
}
