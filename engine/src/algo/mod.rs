//! Building blocks for fast routing algorithms.

use crate::datastr::graph::*;

pub mod contraction_hierarchy;
pub mod down_dfs_labelling;
pub mod search;

/// Simply a source-target pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub from: NodeId,
    pub to: NodeId,
}

/// Which edges of a node a search follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// outgoing edges
    Forward,
    /// incoming edges
    Backward,
}
