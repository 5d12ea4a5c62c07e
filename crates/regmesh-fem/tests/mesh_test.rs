use burn_ndarray::NdArray;
use proptest::prelude::*;
use regmesh_core::spatial::{Direction, Point, Vector};
use regmesh_core::{Image, ImageGeometry};
use regmesh_fem::{
    Element, ElementId, FemObject, ImageToRectilinearFemObjectFilter, MaterialLinearElasticity, NodeId,
    QuadrilateralMembrane,
};

type B = NdArray<f32>;

fn image(size: [usize; 2]) -> Image<B, 2> {
    let device = Default::default();
    let pixels = (0..size[0] * size[1]).map(|k| (k % 251) as f32).collect();
    Image::from_pixels(pixels, ImageGeometry::with_size(size), &device).unwrap()
}

fn test_material() -> MaterialLinearElasticity {
    MaterialLinearElasticity::new()
        .with_youngs_modulus(3000.0)
        .with_cross_sectional_area(0.02)
        .with_moment_of_inertia(0.004)
}

fn filter(pixels_per_element: [usize; 2]) -> ImageToRectilinearFemObjectFilter {
    ImageToRectilinearFemObjectFilter::new()
        .with_pixels_per_element(pixels_per_element)
        .with_element(QuadrilateralMembrane::default())
        .with_material(test_material())
}

fn corner_ids(mesh: &FemObject, element: usize) -> Vec<usize> {
    mesh.element(ElementId(element))
        .unwrap()
        .nodes()
        .iter()
        .map(|n| n.index())
        .collect()
}

#[test]
fn test_four_by_four_image_two_pixel_elements() {
    let mut filter = filter([2, 2]);
    let mesh = filter.build(&image([4, 4])).unwrap();

    assert_eq!(filter.pixels_per_element(), [2, 2]);
    assert_eq!(filter.number_of_elements(), [2, 2]);
    assert_eq!(mesh.number_of_elements(), 4);
    assert_eq!(mesh.number_of_nodes(), 9);
    assert_eq!(mesh.number_of_materials(), 1);

    let material = mesh.materials()[0].as_linear_elasticity().unwrap();
    assert_eq!(material.youngs_modulus, 3000.0);
    assert_eq!(material.cross_sectional_area, 0.02);
    assert_eq!(material.moment_of_inertia, 0.004);

    let node0 = mesh.node(NodeId(0)).unwrap();
    assert_eq!(node0.global_number, 0);
    assert!(node0.coordinates.max_abs_diff(&Point::new([0.0, 0.0])) < 1e-4);
    let node8 = mesh.node(NodeId(8)).unwrap();
    assert!(node8.coordinates.max_abs_diff(&Point::new([4.0, 4.0])) < 1e-4);

    assert_eq!(corner_ids(&mesh, 0), vec![0, 1, 4, 3]);
    assert_eq!(corner_ids(&mesh, 3), vec![4, 5, 8, 7]);
    assert!(mesh.validate().is_ok());

    for element in mesh.elements() {
        let Element::QuadrilateralMembrane(membrane) = element;
        let corners = mesh.element_coordinates(membrane).unwrap();
        assert!((QuadrilateralMembrane::area(&corners) - 4.0).abs() < 1e-12);
    }
}

#[test]
fn test_nodes_follow_image_geometry() {
    let device = Default::default();
    let geometry = ImageGeometry {
        size: [4, 2],
        origin: Point::new([10.0, -5.0]),
        spacing: Vector::new([0.5, 2.0]),
        direction: Direction::from_angle(std::f64::consts::FRAC_PI_2),
    };
    let rotated = Image::<B, 2>::from_pixels(vec![1.0; 8], geometry, &device).unwrap();
    let mesh = filter([2, 1]).build(&rotated).unwrap();

    // Lattice corner (1, 0) is index (2, 0): 1.0 along the rotated x axis, i.e. +y.
    let node1 = mesh.node(NodeId(1)).unwrap();
    assert!(node1.coordinates.max_abs_diff(&Point::new([10.0, -4.0])) < 1e-9);
    // Rotation keeps the elements counter-clockwise.
    assert!(mesh.validate().is_ok());
}

#[test]
fn test_reflected_direction_builds_usable_mesh() {
    let device = Default::default();
    let geometry = ImageGeometry {
        size: [4, 4],
        origin: Point::new([0.0, 4.0]),
        spacing: Vector::new([1.0, 1.0]),
        direction: Direction(nalgebra::Matrix2::new(1.0, 0.0, 0.0, -1.0)),
    };
    let flipped = Image::<B, 2>::from_pixels(vec![1.0; 16], geometry, &device).unwrap();
    let mesh = filter([2, 2]).build(&flipped).unwrap();

    assert_eq!(corner_ids(&mesh, 0), vec![0, 1, 4, 3]);
    let node3 = mesh.node(NodeId(3)).unwrap();
    assert!(node3.coordinates.max_abs_diff(&Point::new([0.0, 2.0])) < 1e-9);
    mesh.validate().unwrap();

    let reference = filter([2, 2]).build(&image([4, 4])).unwrap();
    for (element, upright) in mesh.elements().iter().zip(reference.elements()) {
        let (Element::QuadrilateralMembrane(membrane), Element::QuadrilateralMembrane(upright)) = (element, upright);
        let corners = mesh.element_coordinates(membrane).unwrap();
        assert_eq!(membrane.check_geometry(&corners).unwrap(), -1.0);
        assert!((QuadrilateralMembrane::area(&corners) - 4.0).abs() < 1e-12);

        // A mirror image has the stiffness of its upright twin under y -> -y.
        let k = mesh.element_stiffness(membrane).unwrap();
        let k_upright = reference.element_stiffness(upright).unwrap();
        for r in 0..8 {
            for c in 0..8 {
                let sign = if (r % 2 == 1) != (c % 2 == 1) { -1.0 } else { 1.0 };
                assert!((k[(r, c)] - sign * k_upright[(r, c)]).abs() < 1e-9 * k_upright.abs().max());
            }
        }
    }
}

#[test]
fn test_mesh_exports_to_json() {
    let mesh = filter([2, 2]).build(&image([6, 4])).unwrap();
    let json = serde_json::to_string_pretty(&mesh).unwrap();
    assert!(json.contains("\"QuadrilateralMembrane\""));
    assert!(json.contains("\"youngs_modulus\": 3000.0"));

    let restored: FemObject = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, mesh);
    assert!(restored.validate().is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_lattice_counts_and_sharing(
        width in 1usize..24,
        height in 1usize..24,
        px in 1usize..5,
        py in 1usize..5,
    ) {
        prop_assume!(width >= px && height >= py);
        let mut filter = filter([px, py]);
        let mesh = filter.build(&image([width, height])).unwrap();

        let (nx, ny) = (width / px, height / py);
        prop_assert_eq!(filter.number_of_elements(), [nx, ny]);
        prop_assert_eq!(mesh.number_of_elements(), nx * ny);
        prop_assert_eq!(mesh.number_of_nodes(), (nx + 1) * (ny + 1));
        prop_assert_eq!(mesh.number_of_materials(), 1);
        prop_assert_eq!(mesh.materials()[0].as_linear_elasticity(), Some(&test_material()));

        for j in 0..ny {
            for i in 0..nx {
                let id = i + nx * j;
                let corners = corner_ids(&mesh, id);
                prop_assert_eq!(corners[0], i + (nx + 1) * j);
                if i + 1 < nx {
                    let right = corner_ids(&mesh, id + 1);
                    prop_assert_eq!(corners[1], right[0]);
                    prop_assert_eq!(corners[2], right[3]);
                }
                if j + 1 < ny {
                    let above = corner_ids(&mesh, id + nx);
                    prop_assert_eq!(corners[3], above[0]);
                    prop_assert_eq!(corners[2], above[1]);
                }
            }
        }
    }
}
