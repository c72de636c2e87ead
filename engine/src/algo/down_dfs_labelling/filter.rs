//! Label based successor pruning as a kernel filter.

use super::*;
use crate::algo::search::SearchFilter;

/// Prunes down edges of nodes a forward CH search reached by descending,
/// if the edge label rules out the target.
/// Meant for searches with `FchExpansion` on the graph the labels were built for.
#[derive(Debug, Clone)]
pub struct ArcFlagsFilter<'a> {
    labelling: &'a DownDfsLabelling,
    order: &'a NodeOrder,
    tests: LabelTests,
    target: Option<LabelTarget>,
    pruned: usize,
}

impl<'a> ArcFlagsFilter<'a> {
    pub fn new(labelling: &'a DownDfsLabelling, order: &'a NodeOrder, tests: LabelTests) -> Self {
        ArcFlagsFilter {
            labelling,
            order,
            tests,
            target: None,
            pruned: 0,
        }
    }

    /// Number of successors pruned since the last search started
    pub fn num_pruned(&self) -> usize {
        self.pruned
    }
}

impl<'a> SearchFilter for ArcFlagsFilter<'a> {
    fn init(&mut self, _start: NodeId, target: Option<NodeId>) {
        self.target = target.map(|target| self.labelling.target(target));
        self.pruned = 0;
    }

    fn filter(&mut self, node: NodeId, from: &SearchNode, edge_idx: u32) -> bool {
        let prune = match &self.target {
            Some(target) => self.labelling.prunes(self.order, from, node, edge_idx as usize, target, self.tests),
            None => false,
        };
        self.pruned += prune as usize;
        prune
    }
}
