//! Errors reported while building graphs and labels.
//!
//! Queries never fail with an error, an invalid or unreachable target is reported as "no path".
//! Everything here concerns the offline construction phase.

use crate::datastr::graph::{EdgeId, NodeId, Weight};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge {edge} points from {tail} to {head} but the graph only has {num_nodes} nodes")]
    EndpointOutOfRange { edge: usize, tail: NodeId, head: NodeId, num_nodes: usize },
    #[error("edge {edge} has weight {weight}, weights have to be below {}", crate::datastr::graph::INFINITY)]
    WeightTooLarge { edge: usize, weight: Weight },
    #[error("expected coordinates for {expected} nodes, got {actual}")]
    CoordinateCount { expected: usize, actual: usize },
    #[error("expected external ids for {expected} nodes, got {actual}")]
    ExternalIdCount { expected: usize, actual: usize },
    #[error("external id {0} is assigned to more than one node")]
    DuplicateExternalId(NodeId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabellingError {
    #[error("cannot label an empty graph")]
    EmptyGraph,
    #[error("rank array has {actual} entries but the graph has {expected} nodes")]
    RankCount { expected: usize, actual: usize },
    #[error("partition array has {actual} entries but the graph has {expected} nodes")]
    PartitionCount { expected: usize, actual: usize },
    #[error("dfs ids are not a permutation of the node ids, node {0} has no or a duplicate id")]
    DfsOrderNotPermutation(NodeId),
    #[error("label of down edge {edge} ({tail} -> {head}) does not contain the dfs id of its head")]
    UnsoundEdgeLabel { edge: EdgeId, tail: NodeId, head: NodeId },
}
