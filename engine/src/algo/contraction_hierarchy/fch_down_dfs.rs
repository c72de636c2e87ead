//! Forward CH search pruned by down-DFS labels.
//!
//! While ascending every edge is generated. Once the search descends, only down edges are generated
//! and each of them is tested against the target:
//!
//! - the precomputed label of the edge (`DownDfsLabelling`),
//! - for nodes which were reached from the source by descending only, a source specific interval label.
//!
//! The source specific labels are built lazily whenever the source changes.
//! A single source search over down edges computes first move sets, then a postorder DFS
//! which only follows edges consistent with those first moves assigns ids and intervals.

use super::*;
use crate::algo::down_dfs_labelling::{first_move::*, label::*, DownDfsLabelling};
use crate::algo::search::*;
use crate::datastr::node_pool::SearchNode;

const UNASSIGNED: u32 = u32::MAX;
const EVERYTHING: IdInterval = IdInterval { left: 0, right: UNASSIGNED };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnStack,
    Done,
}

/// Interval labels scoped to the down closure of one source.
struct SourceScopedLabels<'a> {
    graph: &'a PlanarGraph,
    order: &'a NodeOrder,
    source: Option<NodeId>,
    search: BestFirstSearch<ZeroHeuristic, DownExpansion<'a>>,
    first_moves: FirstMoveTable,
    node_ids: TimestampedVector<u32>,
    node_ranges: TimestampedVector<IdInterval>,
    visit: TimestampedVector<Visit>,
    edge_ranges: TimestampedVector<IdInterval>,
}

impl<'a> SourceScopedLabels<'a> {
    fn new(graph: &'a PlanarGraph, order: &'a NodeOrder) -> Self {
        let n = graph.num_nodes();
        SourceScopedLabels {
            graph,
            order,
            source: None,
            search: BestFirstSearch::new(ZeroHeuristic, DownExpansion::new(graph, order)),
            first_moves: FirstMoveTable::new(),
            node_ids: TimestampedVector::new(n, UNASSIGNED),
            node_ranges: TimestampedVector::new(n, IdInterval::EMPTY),
            visit: TimestampedVector::new(n, Visit::New),
            edge_ranges: TimestampedVector::new(graph.num_arcs(), IdInterval::EMPTY),
        }
    }

    fn compute(&mut self, source: NodeId) {
        if self.source == Some(source) {
            return;
        }
        self.source = Some(source);

        let graph = self.graph;
        let order = self.order;
        let n = graph.num_nodes();

        let mut hooks = FirstMoveHooks::new(source, graph.out_degree(source), n, &mut self.first_moves);
        self.search.find_path_with_hooks(ProblemInstance::single_source(source), &mut hooks);

        self.node_ids.reset();
        self.node_ranges.reset();
        self.visit.reset();
        self.edge_ranges.reset();

        let mut next_id = 0;
        let mut stack: Vec<(NodeId, usize)> = vec![(source, 0)];
        self.visit[source as usize] = Visit::OnStack;

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if frame.1 < graph.out_degree(node) {
                let edge_idx = frame.1;
                frame.1 += 1;
                let head = graph.out_link(node, edge_idx).node;
                let consistent = head != node
                    && order.is_down(node, head)
                    && self.search.node(head).map_or(false, SearchNode::expanded)
                    && if node == source {
                        self.first_moves.contains(head, edge_idx as u32)
                    } else {
                        self.first_moves.intersects(node, head)
                    };
                if !consistent {
                    continue;
                }
                let edge = graph.first_out()[node as usize] as usize + edge_idx;
                match self.visit[head as usize] {
                    Visit::New => {
                        self.visit[head as usize] = Visit::OnStack;
                        stack.push((head, 0));
                    }
                    // equal ranks, no interval is known for this edge
                    Visit::OnStack => {
                        self.edge_ranges[edge] = EVERYTHING;
                        self.node_ranges[node as usize].merge(&EVERYTHING);
                    }
                    Visit::Done => {
                        let range = self.node_ranges[head as usize];
                        self.edge_ranges[edge] = range;
                        self.node_ranges[node as usize].merge(&range);
                    }
                }
            } else {
                stack.pop();
                self.visit[node as usize] = Visit::Done;
                self.node_ids[node as usize] = next_id;
                self.node_ranges[node as usize].grow(next_id);
                next_id += 1;

                if let Some(&(parent, next_edge)) = stack.last() {
                    let range = self.node_ranges[node as usize];
                    let edge = graph.first_out()[parent as usize] as usize + next_edge - 1;
                    self.edge_ranges[edge] = range;
                    self.node_ranges[parent as usize].merge(&range);
                }
            }
        }
    }

    /// `target` can not be reached from `node` over edge `edge_idx` by descending from the source.
    fn excludes(&self, node: NodeId, edge_idx: usize, target: NodeId) -> bool {
        match self.node_ids[target as usize] {
            UNASSIGNED => true,
            id => !self.edge_ranges[self.graph.first_out()[node as usize] as usize + edge_idx].contains(id),
        }
    }
}

pub struct FchDownDfsExpansion<'a> {
    graph: &'a PlanarGraph,
    order: &'a NodeOrder,
    labelling: &'a DownDfsLabelling,
    tests: LabelTests,
    start: NodeId,
    target: Option<(NodeId, LabelTarget)>,
    // reached from the source over down edges only
    pure_down: TimestampedVector<bool>,
    scoped: SourceScopedLabels<'a>,
    pruned: usize,
}

impl<'a> FchDownDfsExpansion<'a> {
    pub fn new(graph: &'a PlanarGraph, order: &'a NodeOrder, labelling: &'a DownDfsLabelling) -> Self {
        Self::with_tests(graph, order, labelling, LabelTests::ALL)
    }

    pub fn with_tests(graph: &'a PlanarGraph, order: &'a NodeOrder, labelling: &'a DownDfsLabelling, tests: LabelTests) -> Self {
        debug_assert_eq!(labelling.num_nodes(), graph.num_nodes());
        FchDownDfsExpansion {
            graph,
            order,
            labelling,
            tests,
            start: 0,
            target: None,
            pure_down: TimestampedVector::new(graph.num_nodes(), false),
            scoped: SourceScopedLabels::new(graph, order),
            pruned: 0,
        }
    }

    /// Number of down edges pruned since the last search started
    pub fn num_pruned(&self) -> usize {
        self.pruned
    }
}

impl<'a> ExpansionPolicy for FchDownDfsExpansion<'a> {
    fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    fn generate_start_node(&mut self, instance: &ProblemInstance) -> Option<NodeId> {
        let start = self.graph.to_internal_id(instance.start)?;
        self.start = start;
        self.target = None;
        self.pruned = 0;
        self.pure_down.reset();
        Some(start)
    }

    fn generate_target_node(&mut self, instance: &ProblemInstance) -> Option<NodeId> {
        let target = self.graph.to_internal_id(instance.target?)?;
        self.target = Some((target, self.labelling.target(target)));
        Some(target)
    }

    fn coordinates(&self, node: NodeId) -> (i32, i32) {
        self.graph.coordinates(node)
    }

    fn expand(&mut self, current: &SearchNode, successors: &mut Vec<Successor>) {
        let node = current.id();
        let up_travel = is_up_travel(self.order, current);
        let pure_down = match current.parent() {
            None => true,
            Some(parent) => !up_travel && self.pure_down[parent as usize],
        };
        self.pure_down[node as usize] = pure_down;

        if up_travel {
            successors.extend(self.graph.outgoing(node).enumerate().map(|(idx, Link { node, weight })| Successor {
                node,
                cost: weight,
                edge_idx: idx as u32,
            }));
            return;
        }

        if pure_down && self.target.is_some() {
            self.scoped.compute(self.start);
        }

        for (edge_idx, Link { node: head, weight }) in self.graph.outgoing(node).enumerate() {
            if head == node || !self.order.is_down(node, head) {
                continue;
            }
            if let Some((target, label_target)) = &self.target {
                let pruned = self.labelling.edge_label(node, edge_idx).excludes(label_target, self.tests)
                    || (pure_down && self.scoped.excludes(node, edge_idx, *target));
                if pruned {
                    self.pruned += 1;
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
