//! Rectilinear finite element meshes built from 2D images.
//!
//! - [`FemObject`]: arena owning nodes, elements and materials
//! - [`QuadrilateralMembrane`]: four-node plane-stress element
//! - [`MaterialLinearElasticity`]: linear elastic material properties
//! - [`ImageToRectilinearFemObjectFilter`]: rasterizes an image into a lattice of elements

pub mod element;
pub mod error;
pub mod material;
pub mod node;
pub mod object;
pub mod rectilinear;

pub use element::{Element, ElementId, MembraneStiffness, QuadrilateralMembrane};
pub use error::{FemError, Result};
pub use material::{Material, MaterialId, MaterialLinearElasticity};
pub use node::{Node, NodeId};
pub use object::FemObject;
pub use rectilinear::{ImageToRectilinearFemObjectFilter, NodeLattice, RemainderPolicy};
