//! Rectilinear meshing of 2D images.
//!
//! Every `ppe[0] x ppe[1]` block of pixels becomes one quadrilateral
//! element. Corners are numbered row-major over the node lattice, so the
//! node at lattice corner `(i, j)` has global number `i + (nx + 1) * j`.

use std::collections::HashMap;

use burn::tensor::backend::Backend;
use regmesh_core::spatial::Point;
use regmesh_core::Image;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::element::Element;
use crate::error::{FemError, Result};
use crate::material::{Material, MaterialLinearElasticity};
use crate::node::NodeId;
use crate::object::FemObject;

/// What to do with pixels left over when the image size is not a multiple
/// of the pixels per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemainderPolicy {
    /// Drop the trailing pixels.
    #[default]
    Truncate,
    /// Fail with `InvalidLatticeConfiguration`.
    Reject,
}

/// Lattice corner to node lookup; each corner gets exactly one node.
#[derive(Debug, Clone, Default)]
pub struct NodeLattice {
    ids: HashMap<[usize; 2], NodeId>,
}

impl NodeLattice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, corner: [usize; 2]) -> Option<NodeId> {
        self.ids.get(&corner).copied()
    }

    /// Node at `corner`, creating it with `create` on first use.
    pub fn get_or_insert_with(&mut self, corner: [usize; 2], create: impl FnOnce() -> NodeId) -> NodeId {
        *self.ids.entry(corner).or_insert_with(create)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Builds a [`FemObject`] covering a 2D image with membrane elements.
#[derive(Debug, Clone)]
pub struct ImageToRectilinearFemObjectFilter {
    pixels_per_element: [usize; 2],
    remainder_policy: RemainderPolicy,
    element: Element,
    material: Material,
    number_of_elements: [usize; 2],
}

impl Default for ImageToRectilinearFemObjectFilter {
    fn default() -> Self {
        Self {
            pixels_per_element: [1, 1],
            remainder_policy: RemainderPolicy::default(),
            element: Element::default(),
            material: MaterialLinearElasticity::default().into(),
            number_of_elements: [0, 0],
        }
    }
}

impl ImageToRectilinearFemObjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pixels_per_element(mut self, pixels_per_element: [usize; 2]) -> Self {
        self.pixels_per_element = pixels_per_element;
        self
    }

    pub fn with_remainder_policy(mut self, policy: RemainderPolicy) -> Self {
        self.remainder_policy = policy;
        self
    }

    /// Element cloned into every cell.
    pub fn with_element(mut self, element: impl Into<Element>) -> Self {
        self.element = element.into();
        self
    }

    /// Material shared by every element.
    pub fn with_material(mut self, material: impl Into<Material>) -> Self {
        self.material = material.into();
        self
    }

    pub fn set_pixels_per_element(&mut self, pixels_per_element: [usize; 2]) {
        self.pixels_per_element = pixels_per_element;
    }

    pub fn pixels_per_element(&self) -> [usize; 2] {
        self.pixels_per_element
    }

    pub fn remainder_policy(&self) -> RemainderPolicy {
        self.remainder_policy
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Elements per axis produced by the last successful `build`.
    pub fn number_of_elements(&self) -> [usize; 2] {
        self.number_of_elements
    }

    /// Elements per axis for an image of `size` pixels.
    pub fn lattice_size(&self, size: [usize; 2]) -> Result<[usize; 2]> {
        let mut elements = [0; 2];
        for axis in 0..2 {
            let ppe = self.pixels_per_element[axis];
            if ppe == 0 {
                return Err(FemError::invalid_lattice(format!(
                    "pixels per element along axis {axis} must be positive"
                )));
            }
            let remainder = size[axis] % ppe;
            if remainder != 0 {
                match self.remainder_policy {
                    RemainderPolicy::Reject => {
                        return Err(FemError::invalid_lattice(format!(
                            "image size {} along axis {axis} is not a multiple of {ppe} pixels per element",
                            size[axis]
                        )))
                    }
                    RemainderPolicy::Truncate => {
                        warn!(axis, remainder, "Dropping trailing pixels that do not fill an element")
                    }
                }
            }
            elements[axis] = size[axis] / ppe;
            if elements[axis] == 0 {
                return Err(FemError::invalid_lattice(format!(
                    "image size {} along axis {axis} holds no element of {ppe} pixels",
                    size[axis]
                )));
            }
        }
        Ok(elements)
    }

    /// Mesh the image.
    ///
    /// Node positions are the image's physical coordinates of the lattice
    /// corners, so origin, spacing and direction carry over to the mesh.
    pub fn build<B: Backend>(&mut self, image: &Image<B, 2>) -> Result<FemObject> {
        let [nx, ny] = self.lattice_size(image.size())?;
        let [px, py] = self.pixels_per_element;
        info!(
            size = ?image.size(),
            pixels_per_element = ?self.pixels_per_element,
            "Generating {}x{} rectilinear mesh",
            nx,
            ny
        );

        let mut mesh = FemObject::new();
        let material = mesh.add_material(self.material.clone());

        let mut lattice = NodeLattice::new();
        for j in 0..=ny {
            for i in 0..=nx {
                let index = Point::new([(i * px) as f64, (j * py) as f64]);
                let position = image.transform_continuous_index_to_physical_point(&index);
                lattice.get_or_insert_with([i, j], || mesh.add_node(position));
            }
        }

        for j in 0..ny {
            for i in 0..nx {
                let mut corners = [NodeId::default(); 4];
                for (slot, corner) in corners.iter_mut().zip([[i, j], [i + 1, j], [i + 1, j + 1], [i, j + 1]]) {
                    *slot = lattice.get(corner).ok_or_else(|| {
                        FemError::invalid_lattice(format!("lattice corner {corner:?} has no node"))
                    })?;
                }
                mesh.add_element(self.element.instantiate(corners, material))?;
            }
        }
        debug!(nodes = lattice.len(), "Node lattice complete");

        self.number_of_elements = [nx, ny];
        info!(
            nodes = mesh.number_of_nodes(),
            elements = mesh.number_of_elements(),
            "Rectilinear mesh ready"
        );
        Ok(mesh)
    }
}
