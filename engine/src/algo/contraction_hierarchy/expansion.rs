//! Expansion policies for searches on an augmented graph.

use super::*;
use crate::algo::search::*;
use crate::datastr::node_pool::SearchNode;

/// A node was reached by ascending if it is the start or its predecessor has a lower rank.
#[inline]
pub fn is_up_travel(order: &NodeOrder, node: &SearchNode) -> bool {
    match node.parent() {
        None => true,
        Some(parent) => order.rank(node.id()) > order.rank(parent),
    }
}

fn push_links(successors: &mut Vec<Successor>, links: impl Iterator<Item = Link>, mut keep: impl FnMut(NodeId) -> bool) {
    successors.extend(
        links
            .enumerate()
            .filter(|&(_, Link { node, .. })| keep(node))
            .map(|(idx, Link { node, weight })| Successor {
                node,
                cost: weight,
                edge_idx: idx as u32,
            }),
    );
}

/// Forward CH search with a single queue.
/// While ascending every edge is generated, once the search descended only down edges are.
#[derive(Debug, Clone)]
pub struct FchExpansion<'a> {
    graph: &'a PlanarGraph,
    order: &'a NodeOrder,
}

impl<'a> FchExpansion<'a> {
    pub fn new(graph: &'a PlanarGraph, order: &'a NodeOrder) -> Self {
        FchExpansion { graph, order }
    }
}

impl<'a> ExpansionPolicy for FchExpansion<'a> {
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
        if is_up_travel(self.order, current) {
            push_links(successors, self.graph.outgoing(node), |_| true);
        } else {
            let order = self.order;
            push_links(successors, self.graph.outgoing(node), |head| head != node && order.is_down(node, head));
        }
    }
}

/// One direction of a bidirectional CH query: only edges towards higher or equal rank.
/// The backward direction follows incoming edges, its edge indices are incoming edge indices.
#[derive(Debug, Clone)]
pub struct BchExpansion<'a> {
    graph: &'a PlanarGraph,
    order: &'a NodeOrder,
    direction: Direction,
}

impl<'a> BchExpansion<'a> {
    pub fn new(graph: &'a PlanarGraph, order: &'a NodeOrder, direction: Direction) -> Self {
        BchExpansion { graph, order, direction }
    }
}

impl<'a> ExpansionPolicy for BchExpansion<'a> {
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
        let order = self.order;
        let upward = |head: NodeId| head != node && order.is_up(node, head);
        match self.direction {
            Direction::Forward => push_links(successors, self.graph.outgoing(node), upward),
            Direction::Backward => push_links(successors, self.graph.incoming(node), upward),
        }
    }
}

/// Follows down edges only. A single source search with this policy explores the down closure of the start.
#[derive(Debug, Clone)]
pub struct DownExpansion<'a> {
    graph: &'a PlanarGraph,
    order: &'a NodeOrder,
}

impl<'a> DownExpansion<'a> {
    pub fn new(graph: &'a PlanarGraph, order: &'a NodeOrder) -> Self {
        DownExpansion { graph, order }
    }
}

impl<'a> ExpansionPolicy for DownExpansion<'a> {
    fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    // works on internal ids, it is only used for searches started from within the crate
    fn generate_start_node(&mut self, instance: &ProblemInstance) -> Option<NodeId> {
        Some(instance.start).filter(|&start| (start as usize) < self.graph.num_nodes())
    }

    fn generate_target_node(&mut self, instance: &ProblemInstance) -> Option<NodeId> {
        instance.target.filter(|&target| (target as usize) < self.graph.num_nodes())
    }

    fn coordinates(&self, node: NodeId) -> (i32, i32) {
        self.graph.coordinates(node)
    }

    fn expand(&mut self, current: &SearchNode, successors: &mut Vec<Successor>) {
        let node = current.id();
        let order = self.order;
        push_links(successors, self.graph.outgoing(node), |head| head != node && order.is_down(node, head));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastr::graph::test_graphs::*;

    #[test]
    fn fch_search_finds_shortest_distances() {
        let graph = random_grid(5, 5, 3);
        let order = order_by_degree(&graph);
        let augmented = contract(&graph, &order);
        let mut dijkstra = BestFirstSearch::new(ZeroHeuristic, GraphExpansion::new(&graph));
        let mut fch = BestFirstSearch::new(ZeroHeuristic, FchExpansion::new(&augmented, &order));
        for from in 0..25 {
            for to in 0..25 {
                assert_eq!(
                    dijkstra.find_cost(ProblemInstance::new(from, to)),
                    fch.find_cost(ProblemInstance::new(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn bch_only_climbs() {
        let graph = diamond();
        let order = NodeOrder::identity(5);
        let mut forward = BestFirstSearch::new(ZeroHeuristic, BchExpansion::new(&graph, &order, Direction::Forward));
        forward.find_path(ProblemInstance::single_source(1));
        let mut reached: Vec<NodeId> = forward.closed_list().map(|node| node.id()).collect();
        reached.sort_unstable();
        assert_eq!(reached, vec![1, 2, 3]);

        let mut backward = BestFirstSearch::new(ZeroHeuristic, BchExpansion::new(&graph, &order, Direction::Backward));
        backward.find_path(ProblemInstance::single_source(1));
        assert_eq!(backward.closed_list().count(), 1);
    }

    #[test]
    fn down_search_stays_below_start() {
        let graph = diamond();
        let order = NodeOrder::from_ranks(vec![4, 2, 3, 1, 0]);
        let mut search = BestFirstSearch::new(ZeroHeuristic, DownExpansion::new(&graph, &order));
        search.find_path(ProblemInstance::single_source(2));
        let mut reached: Vec<NodeId> = search.closed_list().map(|node| node.id()).collect();
        reached.sort_unstable();
        assert_eq!(reached, vec![2, 3]);
        assert_eq!(search.find_cost(ProblemInstance::new(0, 3)), 2);
    }
}
