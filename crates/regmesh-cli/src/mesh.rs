//! `regmesh mesh`: rectilinear FEM mesh generation with expectation checks.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use burn_ndarray::{NdArray, NdArrayDevice};
use clap::{Args, ValueEnum};
use regmesh_core::spatial::Point;
use regmesh_core::Image;
use regmesh_fem::{
    ElementId, FemObject, ImageToRectilinearFemObjectFilter, MaterialLinearElasticity, NodeId, QuadrilateralMembrane,
    RemainderPolicy,
};
use regmesh_io::read_image;

type Backend = NdArray<f32>;

const COORDINATE_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Remainder {
    Truncate,
    Reject,
}

impl From<Remainder> for RemainderPolicy {
    fn from(remainder: Remainder) -> Self {
        match remainder {
            Remainder::Truncate => RemainderPolicy::Truncate,
            Remainder::Reject => RemainderPolicy::Reject,
        }
    }
}

/// `id:x,y`
#[derive(Debug, Clone, PartialEq)]
struct NodeExpectation {
    id: usize,
    coordinates: [f64; 2],
}

impl FromStr for NodeExpectation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (id, rest) = s.split_once(':').ok_or_else(|| anyhow!("expected id:x,y, got {s}"))?;
        let (x, y) = rest.split_once(',').ok_or_else(|| anyhow!("expected id:x,y, got {s}"))?;
        Ok(Self {
            id: id.trim().parse()?,
            coordinates: [x.trim().parse()?, y.trim().parse()?],
        })
    }
}

/// `id:a,b,c,d`
#[derive(Debug, Clone, PartialEq)]
struct ConnectivityExpectation {
    id: usize,
    nodes: Vec<usize>,
}

impl FromStr for ConnectivityExpectation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (id, rest) = s.split_once(':').ok_or_else(|| anyhow!("expected id:a,b,c,d, got {s}"))?;
        let nodes = rest
            .split(',')
            .map(|n| n.trim().parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if nodes.len() != 4 {
            bail!("expected four corner nodes, got {}", nodes.len());
        }
        Ok(Self {
            id: id.trim().parse()?,
            nodes,
        })
    }
}

#[derive(Args, Debug)]
pub struct MeshArgs {
    /// Input image
    image: PathBuf,

    /// Pixels per element along x
    ppx: usize,

    /// Pixels per element along y
    ppy: usize,

    /// Expected elements along x and y
    #[arg(long, num_args = 2, value_names = ["NX", "NY"])]
    expect_elements: Option<Vec<usize>>,

    /// Expected number of nodes
    #[arg(long)]
    expect_nodes: Option<usize>,

    /// Expected total number of elements
    #[arg(long)]
    expect_element_count: Option<usize>,

    /// Expected node position, `id:x,y`
    #[arg(long = "expect-node")]
    expect_node: Vec<NodeExpectation>,

    /// Expected element corners, `id:a,b,c,d`
    #[arg(long = "expect-connectivity")]
    expect_connectivity: Vec<ConnectivityExpectation>,

    /// Handling of pixels that do not fill a whole element
    #[arg(long, value_enum, default_value_t = Remainder::Truncate)]
    remainder: Remainder,

    /// Write the mesh as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Material used for every generated mesh.
fn membrane_material() -> MaterialLinearElasticity {
    MaterialLinearElasticity::new()
        .with_youngs_modulus(3000.0)
        .with_cross_sectional_area(0.02)
        .with_moment_of_inertia(0.004)
}

/// Pass/fail report in the `Name: [PASSED]` style.
#[derive(Default)]
struct Checks {
    failures: usize,
}

impl Checks {
    fn check(&mut self, name: &str, passed: bool, detail: impl FnOnce() -> String) {
        if passed {
            println!("{name}: [PASSED]");
        } else {
            println!("{name}: [FAILED]");
            println!("\t{}", detail());
            self.failures += 1;
        }
    }
}

fn check_mesh(args: &MeshArgs, filter: &ImageToRectilinearFemObjectFilter, mesh: &FemObject) -> usize {
    let mut checks = Checks::default();
    let requested = [args.ppx, args.ppy];

    for axis in 0..2 {
        let obtained = filter.pixels_per_element()[axis];
        checks.check(&format!("Pixels per Element Test {axis}"), obtained == requested[axis], || {
            format!("Expected {} Obtained {obtained}", requested[axis])
        });
        if let Some(expected) = &args.expect_elements {
            let obtained = filter.number_of_elements()[axis];
            checks.check(&format!("Number Of Elements Test {axis}"), obtained == expected[axis], || {
                format!("Expected {} Obtained {obtained}", expected[axis])
            });
        }
    }

    if let Some(expected) = args.expect_element_count {
        let obtained = mesh.number_of_elements();
        checks.check("Number of Elements Test", obtained == expected, || {
            format!("Expected {expected} Obtained {obtained}")
        });
    }
    if let Some(expected) = args.expect_nodes {
        let obtained = mesh.number_of_nodes();
        checks.check("Number of Nodes Test", obtained == expected, || {
            format!("Expected {expected} Obtained {obtained}")
        });
    }

    let materials = mesh.number_of_materials();
    checks.check("Number of Materials Test", materials == 1, || {
        format!("Expected 1 Obtained {materials}")
    });
    let expected_material = membrane_material();
    let material = mesh.materials().first().and_then(|m| m.as_linear_elasticity());
    checks.check(
        "Material Property Test",
        material.is_some_and(|m| {
            m.youngs_modulus == expected_material.youngs_modulus
                && m.cross_sectional_area == expected_material.cross_sectional_area
                && m.moment_of_inertia == expected_material.moment_of_inertia
        }),
        || format!("Expected {expected_material:?} Obtained {material:?}"),
    );

    for expectation in &args.expect_node {
        let node = mesh.node(NodeId(expectation.id));
        let expected = Point::new(expectation.coordinates);
        checks.check(
            &format!("Node {} Test", expectation.id),
            node.is_some_and(|n| n.coordinates.max_abs_diff(&expected) <= COORDINATE_TOLERANCE),
            || format!("Expected {:?} Obtained {:?}", expectation.coordinates, node.map(|n| n.coordinates.to_array())),
        );
    }

    for expectation in &args.expect_connectivity {
        let obtained: Option<Vec<usize>> = mesh
            .element(ElementId(expectation.id))
            .map(|e| e.nodes().iter().map(|n| n.index()).collect());
        checks.check(
            &format!("Element {} Connectivity Test", expectation.id),
            obtained.as_ref() == Some(&expectation.nodes),
            || format!("Expected {:?} Obtained {:?}", expectation.nodes, obtained),
        );
    }

    checks.failures
}

pub fn run(args: MeshArgs) -> Result<()> {
    let device = NdArrayDevice::default();
    let image: Image<Backend, 2> = read_image(&args.image, &device)?;

    let mut filter = ImageToRectilinearFemObjectFilter::new()
        .with_pixels_per_element([args.ppx, args.ppy])
        .with_remainder_policy(args.remainder.into())
        .with_element(QuadrilateralMembrane::default())
        .with_material(membrane_material());
    let mesh = filter.build(&image).context("Mesh generation failed")?;
    println!("FEM Object Generation Test: [PASSED]");

    let failures = check_mesh(&args, &filter, &mesh);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&mesh).context("Failed to serialize mesh")?;
        fs::write(path, json).with_context(|| format!("Failed to write mesh {}", path.display()))?;
    }

    if failures > 0 {
        bail!("{failures} mesh checks failed");
    }
    Ok(())
}
