//! Elements.
//!
//! The quadrilateral membrane is the bilinear four-node plane-stress element.
//! Local coordinates `(xi, eta)` span `[-1, 1]^2`; corner `a` sits at
//! `(-1, -1), (1, -1), (1, 1), (-1, 1)` for `a = 0..4`, so nodes run
//! counter-clockwise in index space. A reflected image direction turns that
//! into clockwise in physical space; both orientations are valid as long as
//! the whole element keeps one.

use nalgebra::{Matrix2, SMatrix};
use regmesh_core::spatial::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{FemError, Result};
use crate::material::{MaterialId, MaterialLinearElasticity};
use crate::node::NodeId;

/// Arena index of an element; equal to its global number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element stiffness in displacement order `[u0, v0, u1, v1, u2, v2, u3, v3]`.
pub type MembraneStiffness = SMatrix<f64, 8, 8>;

const CORNERS: [[f64; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

/// 2x2 Gauss points; all weights are 1.
fn gauss_points() -> [[f64; 2]; 4] {
    let g = 1.0 / 3.0f64.sqrt();
    [[-g, -g], [g, -g], [g, g], [-g, g]]
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuadrilateralMembrane {
    pub global_number: usize,
    /// Corner nodes, counter-clockwise in local coordinates.
    pub nodes: [NodeId; 4],
    pub material: MaterialId,
}

impl QuadrilateralMembrane {
    pub fn new(nodes: [NodeId; 4], material: MaterialId) -> Self {
        Self {
            global_number: 0,
            nodes,
            material,
        }
    }

    /// Bilinear shape functions at a local point.
    pub fn shape_functions(local: [f64; 2]) -> [f64; 4] {
        let [xi, eta] = local;
        CORNERS.map(|[a, b]| 0.25 * (1.0 + a * xi) * (1.0 + b * eta))
    }

    /// Shape function derivatives; row 0 is d/dxi, row 1 is d/deta.
    pub fn shape_function_derivatives(local: [f64; 2]) -> SMatrix<f64, 2, 4> {
        let [xi, eta] = local;
        let mut dn = SMatrix::<f64, 2, 4>::zeros();
        for (col, [a, b]) in CORNERS.iter().enumerate() {
            dn[(0, col)] = 0.25 * a * (1.0 + b * eta);
            dn[(1, col)] = 0.25 * b * (1.0 + a * xi);
        }
        dn
    }

    /// Map a local point to physical coordinates.
    pub fn interpolate_position(coordinates: &[Point2; 4], local: [f64; 2]) -> Point2 {
        let n = Self::shape_functions(local);
        let mut out = [0.0; 2];
        for (weight, point) in n.iter().zip(coordinates) {
            out[0] += weight * point[0];
            out[1] += weight * point[1];
        }
        Point2::new(out)
    }

    /// `J[i][j] = d x_j / d local_i`.
    pub fn jacobian(coordinates: &[Point2; 4], local: [f64; 2]) -> Matrix2<f64> {
        let dn = Self::shape_function_derivatives(local);
        let mut jacobian = Matrix2::zeros();
        for (a, point) in coordinates.iter().enumerate() {
            for i in 0..2 {
                jacobian[(i, 0)] += dn[(i, a)] * point[0];
                jacobian[(i, 1)] += dn[(i, a)] * point[1];
            }
        }
        jacobian
    }

    /// Sign of the Jacobian determinant shared by every integration point:
    /// `1.0` for counter-clockwise corners, `-1.0` for clockwise ones.
    ///
    /// Fails when the determinant vanishes or changes sign, i.e. the corners
    /// are collapsed or the element folds over itself.
    pub fn check_geometry(&self, coordinates: &[Point2; 4]) -> Result<f64> {
        let mut orientation = 0.0;
        for local in gauss_points() {
            let det = Self::jacobian(coordinates, local).determinant();
            if det == 0.0 || !det.is_finite() {
                return Err(FemError::degenerate(
                    self.global_number,
                    format!("Jacobian determinant {det} at local point {local:?}"),
                ));
            }
            if orientation == 0.0 {
                orientation = det.signum();
            } else if det.signum() != orientation {
                return Err(FemError::degenerate(
                    self.global_number,
                    format!("Jacobian determinant changes sign ({det} at local point {local:?})"),
                ));
            }
        }
        Ok(orientation)
    }

    /// Area by 2x2 Gauss integration of the absolute Jacobian determinant.
    pub fn area(coordinates: &[Point2; 4]) -> f64 {
        gauss_points()
            .iter()
            .map(|&local| Self::jacobian(coordinates, local).determinant().abs())
            .sum()
    }

    /// Plane-stress stiffness matrix scaled by the material thickness.
    pub fn stiffness_matrix(
        &self,
        coordinates: &[Point2; 4],
        material: &MaterialLinearElasticity,
    ) -> Result<MembraneStiffness> {
        self.check_geometry(coordinates)?;
        let d = material.plane_stress_matrix();
        let mut stiffness = MembraneStiffness::zeros();

        for local in gauss_points() {
            let jacobian = Self::jacobian(coordinates, local);
            let det = jacobian.determinant();
            let inverse = jacobian
                .try_inverse()
                .ok_or_else(|| FemError::degenerate(self.global_number, "singular Jacobian"))?;
            // Rows: d/dx, d/dy.
            let dn = inverse * Self::shape_function_derivatives(local);

            let mut b = SMatrix::<f64, 3, 8>::zeros();
            for a in 0..4 {
                b[(0, 2 * a)] = dn[(0, a)];
                b[(1, 2 * a + 1)] = dn[(1, a)];
                b[(2, 2 * a)] = dn[(1, a)];
                b[(2, 2 * a + 1)] = dn[(0, a)];
            }
            stiffness += b.transpose() * d * b * (det.abs() * material.thickness);
        }
        Ok(stiffness)
    }
}

/// Element family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Element {
    QuadrilateralMembrane(QuadrilateralMembrane),
}

impl Element {
    pub fn global_number(&self) -> usize {
        match self {
            Element::QuadrilateralMembrane(e) => e.global_number,
        }
    }

    pub fn set_global_number(&mut self, global_number: usize) {
        match self {
            Element::QuadrilateralMembrane(e) => e.global_number = global_number,
        }
    }

    pub fn nodes(&self) -> &[NodeId] {
        match self {
            Element::QuadrilateralMembrane(e) => &e.nodes,
        }
    }

    pub fn material(&self) -> MaterialId {
        match self {
            Element::QuadrilateralMembrane(e) => e.material,
        }
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nodes().len()
    }

    /// Copy of this element attached to other nodes and material.
    pub fn instantiate(&self, nodes: [NodeId; 4], material: MaterialId) -> Self {
        match self {
            Element::QuadrilateralMembrane(template) => Element::QuadrilateralMembrane(QuadrilateralMembrane {
                nodes,
                material,
                ..template.clone()
            }),
        }
    }
}

impl Default for Element {
    fn default() -> Self {
        Element::QuadrilateralMembrane(QuadrilateralMembrane::default())
    }
}

impl From<QuadrilateralMembrane> for Element {
    fn from(element: QuadrilateralMembrane) -> Self {
        Element::QuadrilateralMembrane(element)
    }
}
