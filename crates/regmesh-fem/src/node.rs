//! Mesh nodes.

use regmesh_core::spatial::Point2;
use serde::{Deserialize, Serialize};

/// Arena index of a node; equal to its global number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub global_number: usize,
    /// Physical position.
    pub coordinates: Point2,
}

impl Node {
    pub fn new(global_number: usize, coordinates: Point2) -> Self {
        Self {
            global_number,
            coordinates,
        }
    }
}
