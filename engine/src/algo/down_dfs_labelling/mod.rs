//! Down-DFS labels for contraction hierarchies.
//!
//! Every edge of the augmented graph gets a label summarizing the nodes which can be reached through it:
//! an interval of DFS postorder ids, a rank range, a bounding box and one bit per partition.
//!
//! Construction has three stages:
//!
//! 1. A postorder DFS from the apex over down edges. Each node gets a DFS id and a label covering its down closure.
//!    Each down edge gets the label of its head.
//! 2. Each node gets its up apex, the highest node reachable through up edges only.
//!    Each up edge gets the down closure label of the up apex of its head.
//! 3. Optionally nodes with many outgoing edges are refined: their labels are rebuilt from
//!    single source searches so that each edge only covers the nodes for which it is an optimal first move.
//!
//! The labels are sound over-approximations for paths of a forward CH search, provided the hierarchy is valid
//! (for example built by `contraction_hierarchy::contract`).

use crate::algo::contraction_hierarchy::is_up_travel;
use crate::datastr::{graph::*, node_order::*, node_pool::SearchNode};
use crate::error::LabellingError;
use crate::report::*;

mod construction;
pub mod filter;
pub mod first_move;
pub mod label;
mod refinement;

pub use self::filter::ArcFlagsFilter;
pub use self::label::*;

/// Nodes with at least this many outgoing edges get refined labels.
#[cfg(not(override_refine_min_degree))]
pub const REFINE_MIN_DEGREE: usize = 100;
#[cfg(override_refine_min_degree)]
pub const REFINE_MIN_DEGREE: usize = include!(concat!(env!("OUT_DIR"), "/DOWN_DFS_REFINE_MIN_DEGREE"));

const UNASSIGNED: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabellingConfig {
    /// Run the refinement stage at all
    pub refine: bool,
    /// Out degree from which on a node gets refined labels
    pub refine_min_degree: usize,
}

impl Default for LabellingConfig {
    fn default() -> Self {
        LabellingConfig {
            refine: true,
            refine_min_degree: REFINE_MIN_DEGREE,
        }
    }
}

/// Labels for all nodes and edges of one graph.
/// Edge labels are keyed by `(node, index of the edge among the outgoing edges of node)`.
#[derive(Debug, Clone)]
pub struct DownDfsLabelling {
    first_out: Vec<EdgeId>,
    edge_labels: Vec<DownDfsLabel>,
    node_labels: Vec<DownDfsLabel>,
    dfs_order: Vec<u32>,
    ranks: Vec<Rank>,
    partition: Vec<u32>,
    xy: Vec<(i32, i32)>,
    refined: Vec<bool>,
    bytes_per_label: usize,
}

impl DownDfsLabelling {
    /// Empty labels for `graph`. `partition[node]` is the region of each node.
    pub fn new(graph: &PlanarGraph, partition: Vec<u32>) -> Result<Self, LabellingError> {
        let n = graph.num_nodes();
        if n == 0 {
            return Err(LabellingError::EmptyGraph);
        }
        if partition.len() != n {
            return Err(LabellingError::PartitionCount {
                expected: n,
                actual: partition.len(),
            });
        }

        // enough bytes so that the largest partition id has a bit
        let max_id = partition.iter().copied().max().unwrap_or(0) as usize;
        let bytes_per_label = max_id / 8 + 1;

        Ok(DownDfsLabelling {
            first_out: graph.first_out().to_vec(),
            edge_labels: vec![DownDfsLabel::new(bytes_per_label); graph.num_arcs()],
            node_labels: vec![DownDfsLabel::new(bytes_per_label); n],
            dfs_order: vec![UNASSIGNED; n],
            ranks: vec![0; n],
            partition,
            xy: (0..n as NodeId).map(|node| graph.coordinates(node)).collect(),
            refined: vec![false; n],
            bytes_per_label,
        })
    }

    /// Run all construction stages and validate the result.
    pub fn build(graph: &PlanarGraph, order: &NodeOrder, partition: Vec<u32>, config: &LabellingConfig) -> Result<Self, LabellingError> {
        let mut labelling = Self::new(graph, partition)?;
        labelling.compute_labels(graph, order)?;
        if config.refine {
            labelling.improve_labels(graph, order, config.refine_min_degree);
        }
        labelling.validate(graph)?;
        Ok(labelling)
    }

    /// Down closure and up closure passes. Discards all previous labels.
    pub fn compute_labels(&mut self, graph: &PlanarGraph, order: &NodeOrder) -> Result<(), LabellingError> {
        let n = graph.num_nodes();
        if order.len() != n {
            return Err(LabellingError::RankCount { expected: n, actual: order.len() });
        }
        debug_assert_eq!(self.first_out, graph.first_out());

        for label in self.edge_labels.iter_mut().chain(self.node_labels.iter_mut()) {
            *label = DownDfsLabel::new(self.bytes_per_label);
        }
        self.dfs_order.fill(UNASSIGNED);
        self.refined.fill(false);
        self.ranks.clear();
        self.ranks.extend_from_slice(order.ranks());

        report_time_with_key("down closure dfs", "dfs_pass_ms", || self.label_down_closure(graph, order));
        report_time_with_key("up closure", "up_pass_ms", || self.label_up_edges(graph, order));

        Ok(())
    }

    /// Rebuild the labels of all nodes with at least `min_degree` outgoing edges.
    /// Returns the number of refined nodes.
    pub fn improve_labels(&mut self, graph: &PlanarGraph, order: &NodeOrder, min_degree: usize) -> usize {
        self.refine(graph, order, min_degree)
    }

    /// Check that the DFS ids are a permutation and that every label of an unrefined down edge contains its head.
    pub fn validate(&self, graph: &PlanarGraph) -> Result<(), LabellingError> {
        let n = graph.num_nodes();
        let mut seen = vec![false; n];
        for (node, &dfs_id) in self.dfs_order.iter().enumerate() {
            match seen.get_mut(dfs_id as usize) {
                Some(seen) if !*seen => *seen = true,
                _ => return Err(LabellingError::DfsOrderNotPermutation(node as NodeId)),
            }
        }

        for tail in (0..n as NodeId).filter(|&node| !self.refined[node as usize]) {
            for (edge_idx, Link { node: head, .. }) in graph.outgoing(tail).enumerate() {
                if head == tail || self.rank(head) > self.rank(tail) {
                    continue;
                }
                if !self.edge_label(tail, edge_idx).ids.contains(self.dfs_id(head)) {
                    return Err(LabellingError::UnsoundEdgeLabel {
                        edge: self.first_out[tail as usize] + edge_idx as EdgeId,
                        tail,
                        head,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn num_nodes(&self) -> usize {
        self.dfs_order.len()
    }

    /// Postorder id of `node` in the down closure DFS
    pub fn dfs_id(&self, node: NodeId) -> u32 {
        self.dfs_order[node as usize]
    }

    pub fn rank(&self, node: NodeId) -> Rank {
        self.ranks[node as usize]
    }

    pub fn partition(&self, node: NodeId) -> u32 {
        self.partition[node as usize]
    }

    pub fn bytes_per_label(&self) -> usize {
        self.bytes_per_label
    }

    /// Was `node` refined by the last `improve_labels` run?
    pub fn is_refined(&self, node: NodeId) -> bool {
        self.refined[node as usize]
    }

    /// Label of the down closure of `node`, including `node` itself.
    pub fn node_label(&self, node: NodeId) -> &DownDfsLabel {
        &self.node_labels[node as usize]
    }

    /// Label of the `edge_idx`-th outgoing edge of `node`
    pub fn edge_label(&self, node: NodeId, edge_idx: usize) -> &DownDfsLabel {
        &self.edge_labels[self.edge_id(node, edge_idx)]
    }

    /// Labels of all outgoing edges of `node`
    pub fn edge_labels(&self, node: NodeId) -> &[DownDfsLabel] {
        &self.edge_labels[self.first_out[node as usize] as usize..self.first_out[node as usize + 1] as usize]
    }

    /// What a label would record for `node`
    pub fn target(&self, node: NodeId) -> LabelTarget {
        LabelTarget {
            dfs_id: self.dfs_order[node as usize],
            rank: self.ranks[node as usize],
            xy: self.xy[node as usize],
            partition: self.partition[node as usize],
        }
    }

    fn edge_id(&self, node: NodeId, edge_idx: usize) -> usize {
        debug_assert!(self.first_out[node as usize] as usize + edge_idx < self.first_out[node as usize + 1] as usize);
        self.first_out[node as usize] as usize + edge_idx
    }

    /// Would a forward CH search, which reached `from` the way `from` records, prune edge `edge_idx` towards `target`?
    /// Only down edges of nodes reached by descending are ever pruned.
    pub fn prunes(&self, order: &NodeOrder, from: &SearchNode, head: NodeId, edge_idx: usize, target: &LabelTarget, tests: LabelTests) -> bool {
        head != from.id()
            && order.is_down(from.id(), head)
            && !is_up_travel(order, from)
            && self.edge_label(from.id(), edge_idx).excludes(target, tests)
    }
}
