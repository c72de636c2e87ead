use crate::datastr::graph::*;

pub type Rank = u32;

/// Ranks of all nodes in a contraction hierarchy.
/// `0` is the lowest importance, higher values are contracted later.
/// An edge `(u, v)` is a down edge if `rank(v) <= rank(u)` and an up edge if `rank(v) >= rank(u)`,
/// edges between nodes of equal rank are both.
/// Ranks are expected to be a permutation but ties are tolerated.
#[derive(Debug, Clone)]
pub struct NodeOrder {
    // The rank of each node
    ranks: Vec<Rank>,
}

impl NodeOrder {
    /// Create a `NodeOrder` where the id is equal to the rank
    pub fn identity(n: usize) -> NodeOrder {
        NodeOrder {
            ranks: (0..n as Rank).collect(),
        }
    }

    /// Create a `NodeOrder` from a rank vector, that is a vector where `rank[id]` contains the rank for node `id`
    pub fn from_ranks(ranks: Vec<Rank>) -> NodeOrder {
        assert!(ranks.len() < <NodeId>::MAX as usize);
        NodeOrder { ranks }
    }

    /// Create a `NodeOrder` from a vector containing the node ids ordered by ascending rank.
    pub fn from_node_order(node_order: &[NodeId]) -> NodeOrder {
        let n = node_order.len();
        let mut ranks = vec![n as Rank; n];
        for (rank, &node) in node_order.iter().enumerate() {
            ranks[node as usize] = rank as Rank;
        }
        debug_assert_eq!(ranks.iter().position(|&rank| rank == n as Rank), None);
        NodeOrder { ranks }
    }

    /// Node ids sorted by ascending rank. Ties are ordered by id.
    pub fn order(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = (0..self.len() as NodeId).collect();
        order.sort_by_key(|&node| (self.rank(node), node));
        order
    }

    /// Get node ranks (node -> rank) as a slice
    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    /// Get rank for a given node
    #[inline(always)]
    pub fn rank(&self, node: NodeId) -> Rank {
        self.ranks[node as usize]
    }

    #[inline(always)]
    pub fn is_down(&self, from: NodeId, to: NodeId) -> bool {
        self.rank(to) <= self.rank(from)
    }

    #[inline(always)]
    pub fn is_up(&self, from: NodeId, to: NodeId) -> bool {
        self.rank(to) >= self.rank(from)
    }

    /// The node of maximum rank, root of the hierarchy.
    /// On ties the node with the smallest id wins: a later node only replaces the current
    /// candidate if its rank is strictly greater.
    pub fn apex(&self) -> Option<NodeId> {
        let mut apex = None;
        for (node, &rank) in self.ranks.iter().enumerate() {
            match apex {
                Some(best) if self.rank(best) >= rank => (),
                _ => apex = Some(node as NodeId),
            }
        }
        apex
    }

    /// Number of nodes in the order
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Are there no nodes in the order?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apex_is_first_node_of_maximum_rank() {
        assert_eq!(NodeOrder::from_ranks(vec![1, 4, 2, 4, 0]).apex(), Some(1));
        assert_eq!(NodeOrder::from_ranks(vec![3, 1, 2]).apex(), Some(0));
        assert_eq!(NodeOrder::identity(0).apex(), None);
    }

    #[test]
    fn node_order_and_ranks_agree() {
        let order = NodeOrder::from_node_order(&[2, 0, 1]);
        assert_eq!(order.ranks(), &[1, 2, 0]);
        assert_eq!(order.order(), vec![2, 0, 1]);
        assert!(order.is_down(0, 2));
        assert!(order.is_up(2, 1));
        assert!(order.is_down(1, 1) && order.is_up(1, 1));
    }
}
