//! Mesh container.

use std::collections::HashSet;

use regmesh_core::spatial::Point2;
use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId, MembraneStiffness, QuadrilateralMembrane};
use crate::error::{FemError, Result};
use crate::material::{Material, MaterialId};
use crate::node::{Node, NodeId};

/// Arena of nodes, elements and materials.
///
/// Elements refer to nodes and materials by index. Items receive their
/// arena position as global number when added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FemObject {
    nodes: Vec<Node>,
    elements: Vec<Element>,
    materials: Vec<Material>,
}

impl FemObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, coordinates: Point2) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id.0, coordinates));
        id
    }

    pub fn add_material(&mut self, material: impl Into<Material>) -> MaterialId {
        let id = MaterialId(self.materials.len());
        let mut material = material.into();
        material.set_global_number(id.0);
        self.materials.push(material);
        id
    }

    /// Add an element whose node and material references already resolve.
    pub fn add_element(&mut self, mut element: Element) -> Result<ElementId> {
        let id = ElementId(self.elements.len());
        element.set_global_number(id.0);
        self.check_references(&element)?;
        self.elements.push(element);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn number_of_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn number_of_materials(&self) -> usize {
        self.materials.len()
    }

    fn check_references(&self, element: &Element) -> Result<()> {
        let number = element.global_number();
        for node in element.nodes() {
            if self.node(*node).is_none() {
                return Err(FemError::UnknownNode {
                    element: number,
                    node: node.0,
                });
            }
        }
        let material = element.material();
        if self.material(material).is_none() {
            return Err(FemError::UnknownMaterial {
                element: number,
                material: material.0,
            });
        }
        let distinct: HashSet<_> = element.nodes().iter().collect();
        if distinct.len() != element.number_of_nodes() {
            return Err(FemError::degenerate(number, "repeated corner node"));
        }
        Ok(())
    }

    /// Physical corner positions of a membrane element.
    pub fn element_coordinates(&self, element: &QuadrilateralMembrane) -> Result<[Point2; 4]> {
        let mut corners = [Point2::origin(); 4];
        for (corner, id) in corners.iter_mut().zip(element.nodes) {
            *corner = self
                .node(id)
                .ok_or(FemError::UnknownNode {
                    element: element.global_number,
                    node: id.0,
                })?
                .coordinates;
        }
        Ok(corners)
    }

    /// Stiffness matrix of a membrane element with its own material.
    pub fn element_stiffness(&self, element: &QuadrilateralMembrane) -> Result<MembraneStiffness> {
        let coordinates = self.element_coordinates(element)?;
        let material = self
            .material(element.material)
            .and_then(Material::as_linear_elasticity)
            .ok_or(FemError::UnknownMaterial {
                element: element.global_number,
                material: element.material.0,
            })?;
        element.stiffness_matrix(&coordinates, material)
    }

    /// Check arena invariants: global numbers equal positions, references
    /// resolve, and every element has a consistent, non-degenerate orientation.
    pub fn validate(&self) -> Result<()> {
        let positions = self
            .nodes
            .iter()
            .map(|n| ("node", n.global_number))
            .enumerate()
            .chain(self.materials.iter().map(|m| ("material", m.global_number())).enumerate())
            .chain(self.elements.iter().map(|e| ("element", e.global_number())).enumerate());
        for (position, (kind, number)) in positions {
            if number != position {
                return Err(FemError::DuplicateGlobalNumber {
                    kind,
                    number,
                    position,
                });
            }
        }

        for element in &self.elements {
            self.check_references(element)?;
            let Element::QuadrilateralMembrane(membrane) = element;
            membrane.check_geometry(&self.element_coordinates(membrane)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialLinearElasticity;

    fn unit_mesh() -> FemObject {
        let mut mesh = FemObject::new();
        let nodes = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]].map(|c| mesh.add_node(Point2::new(c)));
        let material = mesh.add_material(MaterialLinearElasticity::default());
        mesh.add_element(QuadrilateralMembrane::new(nodes, material).into())
            .unwrap();
        mesh
    }

    #[test]
    fn test_arena_assigns_global_numbers() {
        let mesh = unit_mesh();
        assert_eq!(mesh.number_of_nodes(), 4);
        assert_eq!(mesh.node(NodeId(2)).unwrap().global_number, 2);
        assert_eq!(mesh.material(MaterialId(0)).unwrap().global_number(), 0);
        assert!(mesh.validate().is_ok());
        let Element::QuadrilateralMembrane(element) = mesh.element(ElementId(0)).unwrap();
        assert!(mesh.element_stiffness(element).is_ok());
    }

    #[test]
    fn test_unknown_references_rejected() {
        let mut mesh = unit_mesh();
        let bad_node = QuadrilateralMembrane::new([NodeId(0), NodeId(1), NodeId(2), NodeId(9)], MaterialId(0));
        assert_eq!(
            mesh.add_element(bad_node.into()),
            Err(FemError::UnknownNode { element: 1, node: 9 })
        );
        let bad_material = QuadrilateralMembrane::new([NodeId(0), NodeId(1), NodeId(2), NodeId(3)], MaterialId(4));
        assert_eq!(
            mesh.add_element(bad_material.into()),
            Err(FemError::UnknownMaterial { element: 1, material: 4 })
        );
        let repeated = QuadrilateralMembrane::new([NodeId(0), NodeId(1), NodeId(1), NodeId(3)], MaterialId(0));
        assert!(matches!(
            mesh.add_element(repeated.into()),
            Err(FemError::DegenerateElement { element: 1, .. })
        ));
        assert_eq!(mesh.number_of_elements(), 1);
    }

    #[test]
    fn test_validate_detects_renumbered_node() {
        let json = serde_json::to_string(&unit_mesh()).unwrap();
        let mut mesh: FemObject = serde_json::from_str(&json).unwrap();
        assert_eq!(mesh, unit_mesh());

        mesh.nodes[3].global_number = 1;
        assert_eq!(
            mesh.validate(),
            Err(FemError::DuplicateGlobalNumber {
                kind: "node",
                number: 1,
                position: 3
            })
        );
    }
}
