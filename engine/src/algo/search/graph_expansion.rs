//! Plain expansion over all edges of a graph.

use super::*;
use crate::datastr::graph::{Graph, PlanarGraph};

/// Generates every outgoing (or incoming) edge. Turns the kernel into plain Dijkstra or A*.
#[derive(Debug, Clone)]
pub struct GraphExpansion<'a> {
    graph: &'a PlanarGraph,
    direction: Direction,
}

impl<'a> GraphExpansion<'a> {
    pub fn new(graph: &'a PlanarGraph) -> Self {
        Self::with_direction(graph, Direction::Forward)
    }

    pub fn with_direction(graph: &'a PlanarGraph, direction: Direction) -> Self {
        GraphExpansion { graph, direction }
    }

    pub fn graph(&self) -> &'a PlanarGraph {
        self.graph
    }
}

impl<'a> ExpansionPolicy for GraphExpansion<'a> {
    fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    fn generate_start_node(&mut self, instance: &ProblemInstance) -> Option<NodeId> {
        self.graph.to_internal_id(instance.start)
    }

    fn generate_target_node(&mut self, instance: &ProblemInstance) -> Option<NodeId> {
        instance.target.and_then(|target| self.graph.to_internal_id(target))
    }

    fn coordinates(&self, node: NodeId) -> (i32, i32) {
        self.graph.coordinates(node)
    }

    fn expand(&mut self, current: &SearchNode, successors: &mut Vec<Successor>) {
        let node = current.id();
        match self.direction {
            Direction::Forward => successors.extend(self.graph.outgoing(node).enumerate().map(|(idx, Link { node, weight })| Successor {
                node,
                cost: weight,
                edge_idx: idx as u32,
            })),
            Direction::Backward => successors.extend(self.graph.incoming(node).enumerate().map(|(idx, Link { node, weight })| Successor {
                node,
                cost: weight,
                edge_idx: idx as u32,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backward_expansion_follows_incoming_edges() {
        let graph = PlanarGraph::new(3, &[(0, 1, 2), (1, 2, 3), (0, 2, 7)], vec![(0, 0); 3]).unwrap();
        let mut forward = BestFirstSearch::new(ZeroHeuristic, GraphExpansion::new(&graph));
        let mut backward = BestFirstSearch::new(ZeroHeuristic, GraphExpansion::with_direction(&graph, Direction::Backward));
        assert_eq!(forward.find_cost(ProblemInstance::new(0, 2)), 5);
        assert_eq!(backward.find_cost(ProblemInstance::new(2, 0)), 5);
        assert_eq!(backward.find_cost(ProblemInstance::new(0, 2)), INFINITY);
    }
}
