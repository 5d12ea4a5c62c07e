//! Error types for mesh construction.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FemError {
    /// Pixel-per-element or lattice size cannot produce a mesh.
    #[error("Invalid lattice configuration: {0}")]
    InvalidLatticeConfiguration(String),

    #[error("Element {element} references unknown node {node}")]
    UnknownNode { element: usize, node: usize },

    #[error("Element {element} references unknown material {material}")]
    UnknownMaterial { element: usize, material: usize },

    /// A global number is reused or disagrees with its arena position.
    #[error("{kind} global number {number} at position {position} is not unique")]
    DuplicateGlobalNumber {
        kind: &'static str,
        number: usize,
        position: usize,
    },

    #[error("Degenerate element {element}: {reason}")]
    DegenerateElement { element: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, FemError>;

impl FemError {
    pub fn invalid_lattice(msg: impl Into<String>) -> Self {
        Self::InvalidLatticeConfiguration(msg.into())
    }

    pub fn degenerate(element: usize, reason: impl Into<String>) -> Self {
        Self::DegenerateElement {
            element,
            reason: reason.into(),
        }
    }
}
