//! Tightening the labels of high degree nodes with exact first moves.
//!
//! For a selected node `s` all edge labels are discarded.
//! A forward CH single source search from `s` records for every node the set of edges of `s`
//! starting an optimal path to it. When a node is settled, the labels of exactly these edges grow by the node.

use super::first_move::*;
use super::*;
use crate::algo::contraction_hierarchy::FchExpansion;
use crate::algo::search::*;
use crate::datastr::node_pool::SearchNode;

struct RefinementHooks<'a> {
    first_moves: FirstMoveHooks<'a>,
    labelling: &'a DownDfsLabelling,
    labels: Vec<DownDfsLabel>,
}

impl<'a> SearchHooks for RefinementHooks<'a> {
    fn on_generate(&mut self, succ: NodeId, prior: Option<&SearchNode>, from: &SearchNode, edge_cost: Weight, edge_idx: u32) {
        self.first_moves.on_generate(succ, prior, from, edge_cost, edge_idx);
    }

    fn on_no_relax(&mut self, node: &SearchNode, from: &SearchNode, edge_cost: Weight, edge_idx: u32) {
        self.first_moves.on_no_relax(node, from, edge_cost, edge_idx);
    }

    fn on_expand(&mut self, node: &SearchNode) {
        if node.id() == self.first_moves.source {
            return;
        }
        let target = self.labelling.target(node.id());
        for first_move in self.first_moves.table.iter(node.id()) {
            self.labels[first_move as usize].grow(&target);
        }
    }
}

impl DownDfsLabelling {
    pub(super) fn refine(&mut self, graph: &PlanarGraph, order: &NodeOrder, min_degree: usize) -> usize {
        let sources: Vec<NodeId> = (0..graph.num_nodes() as NodeId).filter(|&node| graph.out_degree(node) >= min_degree).collect();
        report!("num_refined_nodes", sources.len());
        if sources.is_empty() {
            return 0;
        }

        report_time_with_key("label refinement", "refinement_ms", || {
            let mut table = FirstMoveTable::new();
            let mut search = BestFirstSearch::new(ZeroHeuristic, FchExpansion::new(graph, order));
            let mut progress = Progress::new("improving labels", sources.len());

            for &source in &sources {
                let degree = graph.out_degree(source);
                let mut hooks = RefinementHooks {
                    first_moves: FirstMoveHooks::new(source, degree, graph.num_nodes(), &mut table),
                    labelling: self,
                    labels: vec![DownDfsLabel::new(self.bytes_per_label); degree],
                };
                search.find_path_with_hooks(ProblemInstance::single_source(graph.to_external_id(source)), &mut hooks);

                let labels = hooks.labels;
                let first = self.first_out[source as usize] as usize;
                for (slot, label) in self.edge_labels[first..first + degree].iter_mut().zip(labels) {
                    *slot = label;
                }
                self.refined[source as usize] = true;
                progress.tick();
            }
        });

        sources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastr::graph::test_graphs::*;

    #[test]
    fn refined_edges_cover_exactly_their_first_move_nodes() {
        let graph = diamond();
        // with B on top every shortest path ascends and then descends
        let order = NodeOrder::from_ranks(vec![1, 4, 3, 2, 0]);
        let mut labelling = DownDfsLabelling::new(&graph, vec![0, 1, 2, 3, 4]).unwrap();
        labelling.compute_labels(&graph, &order).unwrap();
        assert_eq!(labelling.improve_labels(&graph, &order, 2), 2);
        assert!(labelling.is_refined(0) && labelling.is_refined(1) && !labelling.is_refined(2));

        // from A everything is reached through B, A -> C is never an optimal first move
        assert!(labelling.edge_label(0, 1).is_empty());
        let a_to_b = labelling.edge_label(0, 0);
        for node in 1..4 {
            assert!(a_to_b.contains(&labelling.target(node)));
        }
        assert!(!a_to_b.flags.get(0) && !a_to_b.flags.get(4));

        // B -> D only serves D, B -> C only serves C
        assert!(labelling.edge_label(1, 0).contains(&labelling.target(3)));
        assert!(!labelling.edge_label(1, 0).flags.get(2));
        assert!(labelling.edge_label(1, 1).contains(&labelling.target(2)));
        assert!(!labelling.edge_label(1, 1).flags.get(3));
    }
}
