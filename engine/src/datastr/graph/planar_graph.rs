//! Static graph with planar node coordinates.
//!
//! Outgoing edges are stored as an adjacency array using `first_out`, `head` and `weight`.
//! `first_out` has `n+1` elements, `head[first_out[x]..first_out[x+1]]` contains all neighbors of `x`.
//! Incoming edges are mirrored in a second adjacency array.
//! The incoming edges of a node are ordered by the id of their outgoing counterpart,
//! so `reversed()` yields a graph whose outgoing edge indices are exactly the incoming edge indices of this one.
//!
//! Internally nodes are identified by `0..n`. Callers may use arbitrary external ids,
//! which are translated at the query boundary.

use super::*;
use crate::error::GraphError;
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct PlanarGraph {
    first_out: Vec<EdgeId>,
    head: Vec<NodeId>,
    weight: Vec<Weight>,

    first_in: Vec<EdgeId>,
    tail: Vec<NodeId>,
    // for each incoming edge the id of the same edge in the outgoing arrays
    in_edge_out_id: Vec<EdgeId>,

    xy: Vec<(i32, i32)>,
    external_ids: Option<(Vec<NodeId>, HashMap<NodeId, NodeId>)>,
}

impl PlanarGraph {
    /// Build a graph with `num_nodes` nodes from `(tail, head, weight)` triples.
    /// The outgoing edges of each node keep the relative order in which they appear in `edges`.
    pub fn new(num_nodes: usize, edges: &[(NodeId, NodeId, Weight)], xy: Vec<(i32, i32)>) -> Result<Self, GraphError> {
        if xy.len() != num_nodes {
            return Err(GraphError::CoordinateCount {
                expected: num_nodes,
                actual: xy.len(),
            });
        }
        if let Some((edge, &(tail, head, _))) = edges
            .iter()
            .enumerate()
            .find(|(_, edge)| edge.0 as usize >= num_nodes || edge.1 as usize >= num_nodes)
        {
            return Err(GraphError::EndpointOutOfRange { edge, tail, head, num_nodes });
        }
        if let Some((edge, &(_, _, weight))) = edges.iter().enumerate().find(|(_, edge)| edge.2 >= INFINITY) {
            return Err(GraphError::WeightTooLarge { edge, weight });
        }

        let mut adjacency: Vec<Vec<Link>> = vec![Vec::new(); num_nodes];
        for &(tail, head, weight) in edges {
            adjacency[tail as usize].push(Link { node: head, weight });
        }

        Ok(Self::from_adjacency_lists(adjacency, xy))
    }

    /// Build a graph directly from per node outgoing links. Coordinates have to be valid.
    pub(crate) fn from_adjacency_lists(adjacency: Vec<Vec<Link>>, xy: Vec<(i32, i32)>) -> Self {
        let n = adjacency.len();
        debug_assert_eq!(xy.len(), n);
        let first_out: Vec<EdgeId> = degrees_to_first_out(adjacency.iter().map(|links| links.len() as EdgeId)).collect();
        let (head, weight): (Vec<NodeId>, Vec<Weight>) = adjacency.into_iter().flatten().map(|Link { node, weight }| (node, weight)).unzip();

        // counting sort of the edges by head, stable with respect to the outgoing edge id
        let mut in_degrees = vec![0; n];
        for &h in &head {
            in_degrees[h as usize] += 1;
        }
        let first_in: Vec<EdgeId> = degrees_to_first_out(in_degrees.into_iter()).collect();
        let mut next_slot: Vec<EdgeId> = first_in[..n].to_vec();
        let mut tail = vec![0; head.len()];
        let mut in_edge_out_id = vec![0; head.len()];
        for node in 0..n {
            for edge in first_out[node]..first_out[node + 1] {
                let h = head[edge as usize] as usize;
                let slot = next_slot[h] as usize;
                tail[slot] = node as NodeId;
                in_edge_out_id[slot] = edge;
                next_slot[h] += 1;
            }
        }

        PlanarGraph {
            first_out,
            head,
            weight,
            first_in,
            tail,
            in_edge_out_id,
            xy,
            external_ids: None,
        }
    }

    /// Assign external ids. `ids[internal]` is the external id of node `internal`.
    pub fn with_external_ids(mut self, ids: Vec<NodeId>) -> Result<Self, GraphError> {
        if ids.len() != self.num_nodes() {
            return Err(GraphError::ExternalIdCount {
                expected: self.num_nodes(),
                actual: ids.len(),
            });
        }
        let mut lookup = HashMap::with_capacity(ids.len());
        for (internal, &external) in ids.iter().enumerate() {
            if lookup.insert(external, internal as NodeId).is_some() {
                return Err(GraphError::DuplicateExternalId(external));
            }
        }
        self.external_ids = Some((ids, lookup));
        Ok(self)
    }

    /// Translate an external id into the internal id space. `None` if no such node exists.
    pub fn to_internal_id(&self, external: NodeId) -> Option<NodeId> {
        match &self.external_ids {
            Some((_, lookup)) => lookup.get(&external).copied(),
            None if (external as usize) < self.num_nodes() => Some(external),
            None => None,
        }
    }

    pub fn to_external_id(&self, internal: NodeId) -> NodeId {
        match &self.external_ids {
            Some((ids, _)) => ids[internal as usize],
            None => internal,
        }
    }

    pub fn coordinates(&self, node: NodeId) -> (i32, i32) {
        self.xy[node as usize]
    }

    /// Global ids of the outgoing edges of `node`
    pub fn edge_range(&self, node: NodeId) -> Range<usize> {
        self.first_out[node as usize] as usize..self.first_out[node as usize + 1] as usize
    }

    /// Global ids (in the incoming arrays) of the incoming edges of `node`
    pub fn in_edge_range(&self, node: NodeId) -> Range<usize> {
        self.first_in[node as usize] as usize..self.first_in[node as usize + 1] as usize
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.edge_range(node).len()
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.in_edge_range(node).len()
    }

    pub fn first_out(&self) -> &[EdgeId] {
        &self.first_out
    }

    pub fn first_in(&self) -> &[EdgeId] {
        &self.first_in
    }

    /// Outgoing links of `node` in their stored order, the position in the iterator is the edge index.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = Link> + '_ {
        let range = self.edge_range(node);
        self.head[range.clone()]
            .iter()
            .zip(&self.weight[range])
            .map(|(&node, &weight)| Link { node, weight })
    }

    /// Incoming links of `node`, the link points to the tail of each edge.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = Link> + '_ {
        let range = self.in_edge_range(node);
        self.tail[range.clone()]
            .iter()
            .zip(&self.in_edge_out_id[range])
            .map(move |(&tail, &out_id)| Link {
                node: tail,
                weight: self.weight[out_id as usize],
            })
    }

    /// The `idx`-th outgoing link of `node`
    pub fn out_link(&self, node: NodeId, idx: usize) -> Link {
        let edge = self.first_out[node as usize] as usize + idx;
        debug_assert!(edge < self.first_out[node as usize + 1] as usize);
        Link {
            node: self.head[edge],
            weight: self.weight[edge],
        }
    }

    /// All edges as `(tail, head, weight)` triples ordered by edge id.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, Weight)> + '_ {
        (0..self.num_nodes() as NodeId).flat_map(move |node| self.outgoing(node).map(move |Link { node: head, weight }| (node, head, weight)))
    }

    /// The same graph with every edge reversed.
    /// Outgoing edge `i` of node `x` in the result is incoming edge `i` of `x` in `self`.
    pub fn reversed(&self) -> PlanarGraph {
        let adjacency = (0..self.num_nodes() as NodeId).map(|node| self.incoming(node).collect()).collect();
        Self::from_adjacency_lists(adjacency, self.xy.clone()).with_external_ids_of(self)
    }

    /// Take over the external id mapping of `other`, which has to have the same node set.
    pub(crate) fn with_external_ids_of(mut self, other: &PlanarGraph) -> PlanarGraph {
        debug_assert_eq!(self.num_nodes(), other.num_nodes());
        self.external_ids = other.external_ids.clone();
        self
    }
}

impl Graph for PlanarGraph {
    fn num_nodes(&self) -> usize {
        self.first_out.len() - 1
    }

    fn num_arcs(&self) -> usize {
        self.head.len()
    }

    fn degree(&self, node: NodeId) -> usize {
        self.out_degree(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //   0 --2--> 1 --3--> 2
    //   ^                 |
    //   +-------1---------+
    fn triangle() -> PlanarGraph {
        PlanarGraph::new(3, &[(0, 1, 2), (1, 2, 3), (2, 0, 1)], vec![(0, 0), (1, 0), (1, 1)]).unwrap()
    }

    #[test]
    fn incoming_edges_mirror_outgoing() {
        let graph = triangle();
        assert_eq!(graph.incoming(0).collect::<Vec<_>>(), vec![Link { node: 2, weight: 1 }]);
        assert_eq!(graph.incoming(2).collect::<Vec<_>>(), vec![Link { node: 1, weight: 3 }]);
        assert_eq!(graph.num_arcs(), 3);
    }

    #[test]
    fn reversing_maps_incoming_to_outgoing_indices() {
        let graph = PlanarGraph::new(3, &[(0, 2, 5), (1, 2, 7), (0, 1, 1)], vec![(0, 0); 3]).unwrap();
        let reversed = graph.reversed();
        assert_eq!(reversed.outgoing(2).collect::<Vec<_>>(), graph.incoming(2).collect::<Vec<_>>());
        assert_eq!(reversed.out_link(2, 1), Link { node: 1, weight: 7 });
        assert_eq!(reversed.out_degree(0), 0);
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(
            PlanarGraph::new(2, &[(0, 2, 1)], vec![(0, 0); 2]).unwrap_err(),
            GraphError::EndpointOutOfRange {
                edge: 0,
                tail: 0,
                head: 2,
                num_nodes: 2
            }
        );
        assert!(matches!(PlanarGraph::new(2, &[], vec![(0, 0)]), Err(GraphError::CoordinateCount { .. })));
        assert_eq!(
            PlanarGraph::new(2, &[(0, 1, 1), (1, 0, INFINITY)], vec![(0, 0); 2]).unwrap_err(),
            GraphError::WeightTooLarge { edge: 1, weight: INFINITY }
        );
        assert!(PlanarGraph::new(2, &[(0, 1, INFINITY - 1)], vec![(0, 0); 2]).is_ok());
        assert_eq!(triangle().with_external_ids(vec![5, 5, 6]).unwrap_err(), GraphError::DuplicateExternalId(5));
    }

    #[test]
    fn translates_external_ids() {
        let graph = triangle().with_external_ids(vec![100, 200, 300]).unwrap();
        assert_eq!(graph.to_internal_id(200), Some(1));
        assert_eq!(graph.to_internal_id(1), None);
        assert_eq!(graph.to_external_id(2), 300);
        assert_eq!(triangle().to_internal_id(3), None);
    }
}
