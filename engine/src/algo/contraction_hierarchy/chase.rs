//! CHASE: bidirectional CH search with arc flags.
//!
//! Both directions only climb the hierarchy. Each direction starts out unpruned.
//! Once it switched to its second phase, every up edge is tested against the label of the opposite end of the query
//! and skipped if the label rules it out.
//! The forward direction uses labels of the augmented graph, the backward direction labels of the reversed augmented graph,
//! so that label edge indices of the backward direction are incoming edge indices.

use super::*;
use crate::algo::down_dfs_labelling::{DownDfsLabelling, LabelTarget, LabelTests, LabellingConfig};
use crate::algo::search::*;
use crate::datastr::node_order::Rank;
use crate::datastr::node_pool::SearchNode;
use crate::error::LabellingError;
use crate::report::report_time_with_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unpruned,
    ArcFlagsPruned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaseConfig {
    /// A direction switches to the second phase before expanding the first node other than its start with at least this rank.
    pub phase2_min_rank: Rank,
    /// Label components used in the second phase
    pub tests: LabelTests,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        ChaseConfig {
            phase2_min_rank: 0,
            tests: LabelTests::FLAGS_ONLY,
        }
    }
}

/// Labels for both query directions.
#[derive(Debug, Clone)]
pub struct ChaseLabelling {
    pub forward: DownDfsLabelling,
    pub backward: DownDfsLabelling,
}

impl ChaseLabelling {
    pub fn build(graph: &PlanarGraph, order: &NodeOrder, partition: Vec<u32>, config: &LabellingConfig) -> Result<Self, LabellingError> {
        let reversed = graph.reversed();
        let backward = report_time_with_key("backward labels", "backward_labelling_ms", || {
            DownDfsLabelling::build(&reversed, order, partition.clone(), config)
        })?;
        let forward = report_time_with_key("forward labels", "forward_labelling_ms", || DownDfsLabelling::build(graph, order, partition, config))?;
        Ok(ChaseLabelling { forward, backward })
    }
}

/// One direction of a CHASE query.
pub struct ChaseExpansion<'a> {
    graph: &'a PlanarGraph,
    order: &'a NodeOrder,
    labelling: &'a DownDfsLabelling,
    direction: Direction,
    tests: LabelTests,
    phase: Phase,
    towards: Option<LabelTarget>,
}

impl<'a> ChaseExpansion<'a> {
    /// `labelling` has to be built on `graph` for the forward and on `graph.reversed()` for the backward direction.
    pub fn new(graph: &'a PlanarGraph, order: &'a NodeOrder, labelling: &'a DownDfsLabelling, direction: Direction, tests: LabelTests) -> Self {
        debug_assert_eq!(labelling.num_nodes(), graph.num_nodes());
        ChaseExpansion {
            graph,
            order,
            labelling,
            direction,
            tests,
            phase: Phase::Unpruned,
            towards: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Start pruning. Without a target there is nothing to prune towards and the phase does not change.
    pub fn begin_phase2(&mut self) {
        if self.towards.is_some() {
            self.phase = Phase::ArcFlagsPruned;
        }
    }

    fn push_up_links(&self, node: NodeId, links: impl Iterator<Item = Link>, successors: &mut Vec<Successor>) {
        let towards = match (self.phase, &self.towards) {
            (Phase::ArcFlagsPruned, Some(towards)) => Some(towards),
            _ => None,
        };

        for (edge_idx, Link { node: head, weight }) in links.enumerate() {
            if head == node || !self.order.is_up(node, head) {
                continue;
            }
            if let Some(towards) = towards {
                if self.labelling.edge_label(node, edge_idx).excludes(towards, self.tests) {
                    continue;
                }
            }
            successors.push(Successor {
                node: head,
                cost: weight,
                edge_idx: edge_idx as u32,
            });
        }
    }
}

impl<'a> ExpansionPolicy for ChaseExpansion<'a> {
    fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    fn generate_start_node(&mut self, instance: &ProblemInstance) -> Option<NodeId> {
        self.phase = Phase::Unpruned;
        self.towards = None;
        self.graph.to_internal_id(instance.start)
    }

    fn generate_target_node(&mut self, instance: &ProblemInstance) -> Option<NodeId> {
        self.phase = Phase::Unpruned;
        let target = self.graph.to_internal_id(instance.target?)?;
        self.towards = Some(self.labelling.target(target));
        Some(target)
    }

    fn coordinates(&self, node: NodeId) -> (i32, i32) {
        self.graph.coordinates(node)
    }

    fn expand(&mut self, current: &SearchNode, successors: &mut Vec<Successor>) {
        let node = current.id();
        let graph = self.graph;
        match self.direction {
            Direction::Forward => self.push_up_links(node, graph.outgoing(node), successors),
            Direction::Backward => self.push_up_links(node, graph.incoming(node), successors),
        }
    }
}

type ChaseSearch<'a> = BestFirstSearch<ZeroHeuristic, ChaseExpansion<'a>>;

pub struct ChaseServer<'a> {
    graph: &'a PlanarGraph,
    order: &'a NodeOrder,
    config: ChaseConfig,
    forward: ChaseSearch<'a>,
    backward: ChaseSearch<'a>,
    meeting_node: Option<NodeId>,
}

impl<'a> ChaseServer<'a> {
    pub fn new(graph: &'a PlanarGraph, order: &'a NodeOrder, labelling: &'a ChaseLabelling, config: ChaseConfig) -> Self {
        ChaseServer {
            graph,
            order,
            config,
            forward: BestFirstSearch::new(
                ZeroHeuristic,
                ChaseExpansion::new(graph, order, &labelling.forward, Direction::Forward, config.tests),
            ),
            backward: BestFirstSearch::new(
                ZeroHeuristic,
                ChaseExpansion::new(graph, order, &labelling.backward, Direction::Backward, config.tests),
            ),
            meeting_node: None,
        }
    }

    pub fn distance(&mut self, from: NodeId, to: NodeId) -> Option<Weight> {
        self.meeting_node = None;
        let forward_start = self.forward.start(ProblemInstance::new(from, to))?;
        let backward_start = self.backward.start(ProblemInstance::new(to, from))?;

        let mut tentative_distance = INFINITY;
        let mut forward_done = false;
        let mut backward_done = false;

        loop {
            let forward_progress = if forward_done { INFINITY } else { self.forward.peek_key().unwrap_or(INFINITY) };
            let backward_progress = if backward_done { INFINITY } else { self.backward.peek_key().unwrap_or(INFINITY) };

            // compare tentative distance to both directions progress individually rather than the sum!
            if tentative_distance <= forward_progress && tentative_distance <= backward_progress {
                break;
            }

            if forward_progress <= backward_progress {
                forward_done = advance(
                    &mut self.forward,
                    &self.backward,
                    forward_start,
                    self.order,
                    &self.config,
                    &mut tentative_distance,
                    &mut self.meeting_node,
                );
            } else {
                backward_done = advance(
                    &mut self.backward,
                    &self.forward,
                    backward_start,
                    self.order,
                    &self.config,
                    &mut tentative_distance,
                    &mut self.meeting_node,
                );
            }
        }

        match tentative_distance {
            INFINITY => None,
            dist => Some(dist),
        }
    }

    /// Node path of the last successful `distance` call in external ids, empty if there was none.
    /// Shortcuts are not unpacked, the path runs over the augmented graph.
    pub fn path(&self) -> Vec<NodeId> {
        let Some(meeting_node) = self.meeting_node else {
            return Vec::new();
        };
        let mut path = self.forward.path_to(meeting_node).nodes;
        let mut backward_path = self.backward.path_to(meeting_node).nodes;
        backward_path.pop();
        path.extend(backward_path.into_iter().rev());

        for node in &mut path {
            *node = self.graph.to_external_id(*node);
        }
        path
    }

    pub fn query(&mut self, query: Query) -> Option<Path> {
        let cost = self.distance(query.from, query.to)?;
        Some(Path { nodes: self.path(), cost })
    }

    /// Expanded nodes of the last query summed over both directions
    pub fn nodes_expanded(&self) -> usize {
        self.forward.stats().nodes_expanded + self.backward.stats().nodes_expanded
    }

    pub fn config(&self) -> &ChaseConfig {
        &self.config
    }
}

// Settle one node in `search` and update the meeting node. Returns whether `search` is done.
fn advance(
    search: &mut ChaseSearch,
    other: &ChaseSearch,
    start: NodeId,
    order: &NodeOrder,
    config: &ChaseConfig,
    tentative_distance: &mut Weight,
    meeting_node: &mut Option<NodeId>,
) -> bool {
    if let Some(State { node, .. }) = search.peek() {
        if search.policy().phase() == Phase::Unpruned && node != start && order.rank(node) >= config.phase2_min_rank {
            search.policy_mut().begin_phase2();
        }
    }

    let (node, done) = match search.step(&mut ()) {
        SearchStep::Expanded(node) => (node, false),
        SearchStep::TargetReached(node) => (node, true),
        SearchStep::Exhausted | SearchStep::CutoffReached => return true,
    };

    let distance = search.node(node).map_or(INFINITY, SearchNode::g);
    let other_distance = other.node(node).map_or(INFINITY, SearchNode::g);
    if distance + other_distance < *tentative_distance {
        *tentative_distance = distance + other_distance;
        *meeting_node = Some(node);
    }

    done
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastr::graph::test_graphs::*;
    use crate::datastr::node_pool::NodePool;

    fn refine_everything() -> LabellingConfig {
        LabellingConfig {
            refine: true,
            refine_min_degree: 3,
        }
    }

    #[test]
    fn phase1_generates_the_same_successors_as_bch() {
        let graph = random_grid(5, 4, 4);
        let order = order_by_degree(&graph);
        let augmented = contract(&graph, &order);
        let labelling = ChaseLabelling::build(&augmented, &order, vec![0; 20], &LabellingConfig::default()).unwrap();
        let mut pool = NodePool::new(20);

        for direction in [Direction::Forward, Direction::Backward] {
            let directed_labelling = match direction {
                Direction::Forward => &labelling.forward,
                Direction::Backward => &labelling.backward,
            };
            let mut chase = ChaseExpansion::new(&augmented, &order, directed_labelling, direction, LabelTests::ALL);
            let mut bch = BchExpansion::new(&augmented, &order, direction);
            for node in 0..20 {
                chase.generate_start_node(&ProblemInstance::new(node, (node + 7) % 20));
                chase.generate_target_node(&ProblemInstance::new(node, (node + 7) % 20));
                assert_eq!(chase.phase(), Phase::Unpruned);

                let search_node = *pool.generate(node, 1);
                let mut chase_successors = Vec::new();
                let mut bch_successors = Vec::new();
                chase.expand(&search_node, &mut chase_successors);
                bch.expand(&search_node, &mut bch_successors);
                assert_eq!(chase_successors, bch_successors);
            }
        }
    }

    #[test]
    fn new_query_returns_to_phase1() {
        let graph = diamond();
        let order = NodeOrder::identity(5);
        let labelling = DownDfsLabelling::build(&graph, &order, vec![0; 5], &LabellingConfig::default()).unwrap();
        let mut chase = ChaseExpansion::new(&graph, &order, &labelling, Direction::Forward, LabelTests::ALL);

        // nothing to prune towards
        chase.generate_start_node(&ProblemInstance::single_source(0));
        chase.begin_phase2();
        assert_eq!(chase.phase(), Phase::Unpruned);

        chase.generate_start_node(&ProblemInstance::new(0, 3));
        chase.generate_target_node(&ProblemInstance::new(0, 3));
        chase.begin_phase2();
        assert_eq!(chase.phase(), Phase::ArcFlagsPruned);
        chase.generate_start_node(&ProblemInstance::new(1, 3));
        assert_eq!(chase.phase(), Phase::Unpruned);
    }

    #[test]
    fn diamond_query() {
        let graph = diamond();
        let order = order_by_degree(&graph);
        let augmented = contract(&graph, &order);
        let labelling = ChaseLabelling::build(&augmented, &order, vec![0, 0, 1, 1, 2], &refine_everything()).unwrap();
        let mut server = ChaseServer::new(&augmented, &order, &labelling, ChaseConfig::default());

        let path = server.query(Query { from: 0, to: 3 }).unwrap();
        assert_eq!(path.cost, 2);
        assert_eq!(path.nodes.first(), Some(&0));
        assert_eq!(path.nodes.last(), Some(&3));
        assert_eq!(server.distance(0, 4), None);
        assert!(server.path().is_empty());
        assert_eq!(server.distance(3, 3), Some(0));
        assert_eq!(server.path(), vec![3]);
    }

    #[test]
    fn pruned_queries_find_shortest_distances() {
        let graph = random_grid(6, 6, 17);
        let order = order_by_degree(&graph);
        let augmented = contract(&graph, &order);
        let partition = (0..36).map(|node| node % 6 / 2 + 3 * (node / 18)).collect();
        let labelling = ChaseLabelling::build(&augmented, &order, partition, &refine_everything()).unwrap();

        let mut dijkstra = BestFirstSearch::new(ZeroHeuristic, GraphExpansion::new(&graph));
        let mut bch = ChaseServer::new(
            &augmented,
            &order,
            &labelling,
            ChaseConfig {
                phase2_min_rank: Rank::MAX,
                ..ChaseConfig::default()
            },
        );
        let mut chase = ChaseServer::new(&augmented, &order, &labelling, ChaseConfig::default());

        let mut expanded_bch = 0;
        let mut expanded_chase = 0;
        for from in 0..36 {
            for to in 0..36 {
                let expected = Some(dijkstra.find_cost(ProblemInstance::new(from, to)));
                assert_eq!(bch.distance(from, to), expected, "{} -> {}", from, to);
                assert_eq!(chase.distance(from, to), expected, "{} -> {}", from, to);
                expanded_bch += bch.nodes_expanded();
                expanded_chase += chase.nodes_expanded();

                let path = chase.path();
                assert_eq!(path.first(), Some(&from));
                assert_eq!(path.last(), Some(&to));
            }
        }
        assert!(expanded_chase < expanded_bch);
    }
}
