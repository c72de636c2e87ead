//! Arena of search node records, reused across queries without clearing.
//!
//! Every record carries the id of the search which last touched it.
//! A record whose stamp differs from the current search id is treated as unseen,
//! so starting a new search is O(1) no matter how many nodes the previous one touched.
//! Predecessors are stored as node ids into the same arena.

use crate::datastr::graph::*;

/// Identifies one run of a search kernel. `0` is never handed out.
pub type SearchId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchNode {
    id: NodeId,
    g: Weight,
    f: Weight,
    search_id: SearchId,
    expanded: bool,
    parent: Option<NodeId>,
}

impl SearchNode {
    fn unseen(id: NodeId) -> Self {
        SearchNode {
            id,
            g: INFINITY,
            f: INFINITY,
            search_id: 0,
            expanded: false,
            parent: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Cost of the best known path from the start
    pub fn g(&self) -> Weight {
        self.g
    }

    /// Priority: `g` plus the heuristic estimate to the target
    pub fn f(&self) -> Weight {
        self.f
    }

    pub fn search_id(&self) -> SearchId {
        self.search_id
    }

    pub fn expanded(&self) -> bool {
        self.expanded
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn init(&mut self, parent: Option<NodeId>, g: Weight, f: Weight) {
        self.parent = parent;
        self.g = g;
        self.f = f;
        self.expanded = false;
    }

    /// Found a better path. The heuristic part of `f` stays the same.
    pub(crate) fn relax(&mut self, g: Weight, parent: NodeId) {
        debug_assert!(g < self.g);
        self.f = self.f - self.g + g;
        self.g = g;
        self.parent = Some(parent);
    }

    pub(crate) fn set_expanded(&mut self) {
        self.expanded = true;
    }
}

#[derive(Debug, Clone)]
pub struct NodePool {
    nodes: Vec<SearchNode>,
}

impl NodePool {
    pub fn new(num_nodes: usize) -> Self {
        NodePool {
            nodes: (0..num_nodes as NodeId).map(SearchNode::unseen).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The record of `id` if it was touched by search `search_id`.
    #[inline]
    pub fn get(&self, id: NodeId, search_id: SearchId) -> Option<&SearchNode> {
        let node = &self.nodes[id as usize];
        if node.search_id == search_id {
            Some(node)
        } else {
            None
        }
    }

    /// Mutable access to the record of `id` for search `search_id`.
    /// Stale records are wiped before they are handed out.
    #[inline]
    pub fn generate(&mut self, id: NodeId, search_id: SearchId) -> &mut SearchNode {
        debug_assert_ne!(search_id, 0);
        let node = &mut self.nodes[id as usize];
        if node.search_id != search_id {
            *node = SearchNode::unseen(id);
            node.search_id = search_id;
        }
        node
    }

    /// Mark every record as unseen. Only needed when search ids wrap around.
    pub fn invalidate_all(&mut self) {
        for node in &mut self.nodes {
            node.search_id = 0;
        }
    }

    /// All records touched by search `search_id`
    pub fn touched(&self, search_id: SearchId) -> impl Iterator<Item = &SearchNode> + '_ {
        self.nodes.iter().filter(move |node| node.search_id == search_id)
    }
}
