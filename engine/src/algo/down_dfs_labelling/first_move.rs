//! First move sets of a single source search.
//!
//! For every node a bitset over the outgoing edges of the source.
//! All sets live in one flat vector with a fixed number of words per node.

use crate::algo::search::SearchHooks;
use crate::datastr::{graph::*, node_pool::SearchNode};

#[derive(Debug, Clone, Default)]
pub struct FirstMoveTable {
    words_per_node: usize,
    bits: Vec<u64>,
}

impl FirstMoveTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for a source with `num_moves` outgoing edges. Old content becomes garbage.
    pub fn reset(&mut self, num_nodes: usize, num_moves: usize) {
        self.words_per_node = (num_moves + 63) / 64;
        self.bits.clear();
        self.bits.resize(num_nodes * self.words_per_node, 0);
    }

    fn words(&self, node: NodeId) -> &[u64] {
        let start = node as usize * self.words_per_node;
        &self.bits[start..start + self.words_per_node]
    }

    fn words_mut(&mut self, node: NodeId) -> &mut [u64] {
        let start = node as usize * self.words_per_node;
        &mut self.bits[start..start + self.words_per_node]
    }

    /// Replace the set of `node` with `{ first_move }`.
    pub fn set_single(&mut self, node: NodeId, first_move: u32) {
        let words = self.words_mut(node);
        words.fill(0);
        words[first_move as usize / 64] |= 1 << (first_move % 64);
    }

    /// Add `first_move` to the set of `node`.
    pub fn add(&mut self, node: NodeId, first_move: u32) {
        self.words_mut(node)[first_move as usize / 64] |= 1 << (first_move % 64);
    }

    /// Replace the set of `to` with the set of `from`.
    pub fn copy(&mut self, from: NodeId, to: NodeId) {
        if from != to {
            let start = from as usize * self.words_per_node;
            self.bits.copy_within(start..start + self.words_per_node, to as usize * self.words_per_node);
        }
    }

    /// Add the set of `from` to the set of `to`.
    pub fn union(&mut self, from: NodeId, to: NodeId) {
        for i in 0..self.words_per_node {
            let word = self.bits[from as usize * self.words_per_node + i];
            self.bits[to as usize * self.words_per_node + i] |= word;
        }
    }

    pub fn intersects(&self, a: NodeId, b: NodeId) -> bool {
        self.words(a).iter().zip(self.words(b)).any(|(a, b)| a & b != 0)
    }

    pub fn contains(&self, node: NodeId, first_move: u32) -> bool {
        self.words(node)
            .get(first_move as usize / 64)
            .map_or(false, |word| word & (1 << (first_move % 64)) != 0)
    }

    /// All first moves of `node` in ascending order.
    pub fn iter(&self, node: NodeId) -> impl Iterator<Item = u32> + '_ {
        self.words(node).iter().enumerate().flat_map(|(word_idx, &word)| {
            (0..64u32).filter(move |bit| word & (1 << bit) != 0).map(move |bit| word_idx as u32 * 64 + bit)
        })
    }
}

/// Search hooks which maintain the first move sets of a single source search from `source`.
/// Edge weights have to be positive, otherwise equally short alternatives may be missed.
#[derive(Debug)]
pub struct FirstMoveHooks<'a> {
    pub source: NodeId,
    pub table: &'a mut FirstMoveTable,
}

impl<'a> FirstMoveHooks<'a> {
    pub fn new(source: NodeId, num_moves: usize, num_nodes: usize, table: &'a mut FirstMoveTable) -> Self {
        table.reset(num_nodes, num_moves);
        FirstMoveHooks { source, table }
    }
}

impl<'a> SearchHooks for FirstMoveHooks<'a> {
    fn on_generate(&mut self, succ: NodeId, prior: Option<&SearchNode>, from: &SearchNode, edge_cost: Weight, edge_idx: u32) {
        if prior.map_or(false, |prior| from.g() + edge_cost >= prior.g()) {
            return;
        }
        if from.id() == self.source {
            self.table.set_single(succ, edge_idx);
        } else {
            self.table.copy(from.id(), succ);
        }
    }

    fn on_no_relax(&mut self, node: &SearchNode, from: &SearchNode, edge_cost: Weight, edge_idx: u32) {
        debug_assert_eq!(from.g() + edge_cost, node.g());
        if from.id() == self.source {
            self.table.add(node.id(), edge_idx);
        } else {
            self.table.union(from.id(), node.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_propagate_and_merge() {
        let mut table = FirstMoveTable::new();
        table.reset(4, 100);
        table.set_single(1, 3);
        table.set_single(2, 70);
        table.copy(1, 3);
        table.union(2, 3);
        assert_eq!(table.iter(3).collect::<Vec<_>>(), vec![3, 70]);
        assert!(table.intersects(1, 3));
        assert!(!table.intersects(1, 2));

        table.set_single(3, 5);
        assert_eq!(table.iter(3).collect::<Vec<_>>(), vec![5]);
        table.add(3, 99);
        assert!(table.contains(3, 99) && !table.contains(3, 3));
    }

    #[test]
    fn ties_keep_all_first_moves() {
        use crate::algo::search::*;

        // 0 -> 1 -> 3 and 0 -> 2 -> 3 are equally long, 0 -> 4 -> 3 is longer
        let graph = PlanarGraph::new(
            5,
            &[(0, 1, 1), (0, 2, 2), (0, 4, 1), (1, 3, 2), (2, 3, 1), (4, 3, 5)],
            vec![(0, 0); 5],
        )
        .unwrap();
        let mut table = FirstMoveTable::new();
        let mut hooks = FirstMoveHooks::new(0, graph.out_degree(0), graph.num_nodes(), &mut table);
        let mut search = BestFirstSearch::new(ZeroHeuristic, GraphExpansion::new(&graph));
        search.find_path_with_hooks(ProblemInstance::single_source(0), &mut hooks);
        assert_eq!(table.iter(3).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(table.iter(4).collect::<Vec<_>>(), vec![2]);
    }
}
