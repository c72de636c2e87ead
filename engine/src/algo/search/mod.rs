//! Best first search kernel.
//!
//! A single implementation of the classic A* loop which is generic over
//!
//! - a `Heuristic` providing lower bounds from node coordinates,
//! - an `ExpansionPolicy` deciding which successors a node has,
//! - an optional `SearchFilter` discarding successors which provably lie on no optimal path.
//!
//! The loop also exposes callbacks through `SearchHooks`.
//! They are no-ops for ordinary queries but allow the label construction to run
//! instrumented single source searches on the very same kernel.
//!
//! Search node records live in a `NodePool` which is never cleared.
//! Each search gets a fresh id and records carrying a different id count as unseen.

use super::*;
use crate::datastr::{
    index_heap::{Indexing, IndexdMinHeap},
    node_pool::*,
};
use std::time::{Duration, Instant};

pub mod graph_expansion;
pub mod heuristic;

pub use self::graph_expansion::GraphExpansion;
pub use self::heuristic::*;

/// A point to point or single source problem.
/// Ids are external ids, the expansion policy translates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemInstance {
    pub start: NodeId,
    /// `None` runs a full single source search
    pub target: Option<NodeId>,
    /// Overrides the kernel wide cost cutoff for this problem
    pub cost_cutoff: Option<Weight>,
    /// Overrides the kernel wide expansion cutoff for this problem
    pub expansion_cutoff: Option<usize>,
    search_id: SearchId,
}

impl ProblemInstance {
    pub fn new(start: NodeId, target: NodeId) -> Self {
        ProblemInstance {
            start,
            target: Some(target),
            cost_cutoff: None,
            expansion_cutoff: None,
            search_id: 0,
        }
    }

    pub fn single_source(start: NodeId) -> Self {
        ProblemInstance {
            target: None,
            ..Self::new(start, start)
        }
    }

    pub fn with_cost_cutoff(self, cost_cutoff: Weight) -> Self {
        ProblemInstance {
            cost_cutoff: Some(cost_cutoff),
            ..self
        }
    }

    pub fn with_expansion_cutoff(self, expansion_cutoff: usize) -> Self {
        ProblemInstance {
            expansion_cutoff: Some(expansion_cutoff),
            ..self
        }
    }

    /// Id of the search this instance belongs to.
    /// The kernel stamps its own copy before handing it to the expansion policy, `0` otherwise.
    pub fn search_id(&self) -> SearchId {
        self.search_id
    }
}

/// A successor produced by an expansion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Successor {
    pub node: NodeId,
    pub cost: Weight,
    /// Index of the edge in the edge collection of the expanded node the policy iterates
    pub edge_idx: u32,
}

/// Decides which successors a node has and maps external ids to nodes.
pub trait ExpansionPolicy {
    /// Size of the node id space
    fn num_nodes(&self) -> usize;

    /// Called once at the beginning of every search.
    /// Returns the internal id of the start or `None` if no such node exists.
    fn generate_start_node(&mut self, instance: &ProblemInstance) -> Option<NodeId>;

    /// Called after `generate_start_node` if the instance has a target.
    fn generate_target_node(&mut self, instance: &ProblemInstance) -> Option<NodeId>;

    fn coordinates(&self, node: NodeId) -> (i32, i32);

    /// Append the successors of `current` to `successors`.
    fn expand(&mut self, current: &SearchNode, successors: &mut Vec<Successor>);
}

/// Successor pruning applied before a node is generated for the first time in a search.
pub trait SearchFilter {
    /// Called at the beginning of every search with internal ids.
    fn init(&mut self, _start: NodeId, _target: Option<NodeId>) {}

    /// `true` if reaching `node` from `from` over edge `edge_idx` provably lies on no optimal path to the target.
    fn filter(&mut self, node: NodeId, from: &SearchNode, edge_idx: u32) -> bool;
}

/// Filter which never prunes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl SearchFilter for NoFilter {
    #[inline(always)]
    fn filter(&mut self, _node: NodeId, _from: &SearchNode, _edge_idx: u32) -> bool {
        false
    }
}

/// Instrumentation callbacks. All of them default to doing nothing.
pub trait SearchHooks {
    /// `succ` was reached from `from`. `prior` is the record of `succ` if it is already in the open set of this search.
    /// Called before the kernel updates `succ`.
    fn on_generate(&mut self, _succ: NodeId, _prior: Option<&SearchNode>, _from: &SearchNode, _edge_cost: Weight, _edge_idx: u32) {}

    /// `node` was inserted into the open set or got a strictly better path.
    fn on_relax(&mut self, _node: &SearchNode) {}

    /// `node` was reached from `from` by a path exactly as long as the one it already has.
    fn on_no_relax(&mut self, _node: &SearchNode, _from: &SearchNode, _edge_cost: Weight, _edge_idx: u32) {}

    /// `node` was removed from the open set, its distance is final.
    fn on_expand(&mut self, _node: &SearchNode) {}
}

impl SearchHooks for () {}

/// Priority Queue entries
#[derive(Copy, Clone, Eq, PartialEq, Debug, PartialOrd, Ord)]
pub struct State {
    pub key: Weight,
    pub node: NodeId,
}

impl Indexing for State {
    #[inline]
    fn as_index(&self) -> usize {
        self.node as usize
    }
}

/// Result of a single iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// A node was expanded
    Expanded(NodeId),
    /// The target has the minimum key in the open set, its distance is final
    TargetReached(NodeId),
    /// The open set is empty
    Exhausted,
    /// The cost or expansion cutoff stopped the search
    CutoffReached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_expanded: usize,
    pub nodes_generated: usize,
    pub nodes_touched: usize,
    pub heap_ops: usize,
    pub time: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// Nodes from start to target
    pub nodes: Vec<NodeId>,
    pub cost: Weight,
}

pub struct BestFirstSearch<H, E, F = NoFilter> {
    heuristic: H,
    expander: E,
    filter: F,

    pool: NodePool,
    open: IndexdMinHeap<State>,
    successors: Vec<Successor>,

    search_id: SearchId,
    start: NodeId,
    target: Option<NodeId>,
    target_xy: (i32, i32),

    cost_cutoff: Weight,
    expansion_cutoff: usize,
    active_cost_cutoff: Weight,
    active_expansion_cutoff: usize,

    stats: SearchStats,
}

impl<H: Heuristic, E: ExpansionPolicy> BestFirstSearch<H, E, NoFilter> {
    pub fn new(heuristic: H, expander: E) -> Self {
        Self::with_filter(heuristic, expander, NoFilter)
    }
}

impl<H: Heuristic, E: ExpansionPolicy, F: SearchFilter> BestFirstSearch<H, E, F> {
    pub fn with_filter(heuristic: H, expander: E, filter: F) -> Self {
        let n = expander.num_nodes();
        BestFirstSearch {
            heuristic,
            expander,
            filter,
            pool: NodePool::new(n),
            open: IndexdMinHeap::new(n),
            successors: Vec::new(),
            search_id: 0,
            start: 0,
            target: None,
            target_xy: (0, 0),
            cost_cutoff: INFINITY,
            expansion_cutoff: usize::MAX,
            active_cost_cutoff: INFINITY,
            active_expansion_cutoff: usize::MAX,
            stats: SearchStats::default(),
        }
    }

    /// Bounded cost search: stop once the smallest key in the open set exceeds `cutoff`.
    pub fn set_cost_cutoff(&mut self, cutoff: Weight) {
        self.cost_cutoff = cutoff;
    }

    pub fn cost_cutoff(&self) -> Weight {
        self.cost_cutoff
    }

    /// Stop once `cutoff` nodes were expanded.
    pub fn set_max_expansions_cutoff(&mut self, cutoff: usize) {
        self.expansion_cutoff = cutoff;
    }

    pub fn max_expansions_cutoff(&self) -> usize {
        self.expansion_cutoff
    }

    /// Shortest path in internal ids, `None` if there is none or a cutoff was hit.
    pub fn find_path(&mut self, instance: ProblemInstance) -> Option<Path> {
        self.find_path_with_hooks(instance, &mut ())
    }

    pub fn find_path_with_hooks(&mut self, instance: ProblemInstance, hooks: &mut impl SearchHooks) -> Option<Path> {
        let started = Instant::now();
        let target = self.search(instance, hooks);
        self.stats.time = started.elapsed();
        target.map(|target| self.path_to(target))
    }

    /// Cost of the shortest path or `INFINITY` if there is none.
    pub fn find_cost(&mut self, instance: ProblemInstance) -> Weight {
        self.find_cost_with_hooks(instance, &mut ())
    }

    pub fn find_cost_with_hooks(&mut self, instance: ProblemInstance, hooks: &mut impl SearchHooks) -> Weight {
        let started = Instant::now();
        let target = self.search(instance, hooks);
        self.stats.time = started.elapsed();
        target.and_then(|target| self.node(target)).map_or(INFINITY, SearchNode::g)
    }

    fn search(&mut self, instance: ProblemInstance, hooks: &mut impl SearchHooks) -> Option<NodeId> {
        self.start(instance)?;
        loop {
            match self.step(hooks) {
                SearchStep::Expanded(_) => (),
                SearchStep::TargetReached(target) => return Some(target),
                SearchStep::Exhausted | SearchStep::CutoffReached => return None,
            }
        }
    }

    /// Begin a new search. Returns the internal id of the start node
    /// or `None` if start or target do not exist, in which case there is nothing to step.
    pub fn start(&mut self, mut instance: ProblemInstance) -> Option<NodeId> {
        self.open.clear();
        self.stats = SearchStats::default();
        self.search_id = self.search_id.wrapping_add(1);
        if self.search_id == 0 {
            self.pool.invalidate_all();
            self.search_id = 1;
        }
        instance.search_id = self.search_id;

        self.active_cost_cutoff = instance.cost_cutoff.unwrap_or(self.cost_cutoff);
        self.active_expansion_cutoff = instance.expansion_cutoff.unwrap_or(self.expansion_cutoff);

        let start = self.expander.generate_start_node(&instance)?;
        // the target is only generated to resolve its internal id
        self.target = match instance.target {
            Some(_) => Some(self.expander.generate_target_node(&instance)?),
            None => None,
        };
        self.start = start;
        self.filter.init(start, self.target);

        self.target_xy = self.target.map_or((0, 0), |target| self.expander.coordinates(target));
        let h = self.estimate(start);
        self.pool.generate(start, self.search_id).init(None, 0, h);
        self.open.push(State { key: h, node: start });
        self.stats.heap_ops += 1;
        self.stats.nodes_generated += 1;

        Some(start)
    }

    /// Run one iteration of the search loop.
    pub fn step(&mut self, hooks: &mut impl SearchHooks) -> SearchStep {
        let Some(&State { key, node }) = self.open.peek() else {
            return SearchStep::Exhausted;
        };
        self.stats.nodes_touched += 1;

        // bounded cost search, a target beyond the cutoff counts as not found
        if key > self.active_cost_cutoff {
            return SearchStep::CutoffReached;
        }

        if Some(node) == self.target {
            return SearchStep::TargetReached(node);
        }

        if self.stats.nodes_expanded >= self.active_expansion_cutoff {
            return SearchStep::CutoffReached;
        }

        self.open.pop();
        self.stats.heap_ops += 1;
        self.stats.nodes_expanded += 1;

        let current = self.pool.generate(node, self.search_id);
        current.set_expanded();
        let current = *current;
        hooks.on_expand(&current);

        let mut successors = std::mem::take(&mut self.successors);
        successors.clear();
        self.expander.expand(&current, &mut successors);

        for &Successor { node: succ, cost, edge_idx } in &successors {
            self.stats.nodes_touched += 1;
            let candidate = current.g().saturating_add(cost).min(INFINITY);
            if candidate == INFINITY {
                continue;
            }

            match self.pool.get(succ, self.search_id).copied() {
                // skip neighbours already expanded
                Some(prior) if prior.expanded() => (),
                Some(prior) => {
                    hooks.on_generate(succ, Some(&prior), &current, cost, edge_idx);
                    if candidate < prior.g() {
                        let n = self.pool.generate(succ, self.search_id);
                        n.relax(candidate, current.id());
                        self.open.decrease_key(State { key: n.f(), node: succ });
                        self.stats.heap_ops += 1;
                        hooks.on_relax(n);
                    } else if candidate == prior.g() {
                        hooks.on_no_relax(&prior, &current, cost, edge_idx);
                    }
                }
                None => {
                    // only generate nodes which are not provably redundant
                    if self.filter.filter(succ, &current, edge_idx) {
                        continue;
                    }
                    hooks.on_generate(succ, None, &current, cost, edge_idx);
                    let f = candidate.saturating_add(self.estimate(succ));
                    let n = self.pool.generate(succ, self.search_id);
                    n.init(Some(current.id()), candidate, f);
                    self.open.push(State { key: f, node: succ });
                    self.stats.heap_ops += 1;
                    self.stats.nodes_generated += 1;
                    hooks.on_relax(n);
                }
            }
        }
        self.successors = successors;

        SearchStep::Expanded(node)
    }

    fn estimate(&self, node: NodeId) -> Weight {
        match self.target {
            Some(_) => {
                let (x, y) = self.expander.coordinates(node);
                let (tx, ty) = self.target_xy;
                self.heuristic.estimate(x, y, tx, ty)
            }
            None => 0,
        }
    }

    /// Follow predecessors from `target` back to the start of the current search.
    pub fn path_to(&self, target: NodeId) -> Path {
        let mut nodes = vec![target];
        let mut cur = self.node(target).copied();
        while let Some(parent) = cur.and_then(|node| node.parent()) {
            nodes.push(parent);
            cur = self.node(parent).copied();
        }
        nodes.reverse();
        debug_assert_eq!(nodes.first(), Some(&self.start));

        Path {
            nodes,
            cost: self.node(target).map_or(INFINITY, SearchNode::g),
        }
    }

    /// Record of `node` in the most recent search, `None` if that search did not touch it.
    pub fn node(&self, node: NodeId) -> Option<&SearchNode> {
        self.pool.get(node, self.search_id)
    }

    /// All nodes expanded by the most recent search
    pub fn closed_list(&self) -> impl Iterator<Item = &SearchNode> + '_ {
        self.pool.touched(self.search_id).filter(|node| node.expanded())
    }

    /// All nodes touched by the most recent search, expanded or still in the open set
    pub fn nodes_of_last_search(&self) -> impl Iterator<Item = &SearchNode> + '_ {
        self.pool.touched(self.search_id)
    }

    /// Open set entry with the smallest key, the node the next `step` will look at
    pub fn peek(&self) -> Option<State> {
        self.open.peek().copied()
    }

    /// Smallest key in the open set
    pub fn peek_key(&self) -> Option<Weight> {
        self.peek().map(|state| state.key)
    }

    pub fn search_id(&self) -> SearchId {
        self.search_id
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn policy(&self) -> &E {
        &self.expander
    }

    pub fn policy_mut(&mut self) -> &mut E {
        &mut self.expander
    }

    pub fn filter_mut(&mut self) -> &mut F {
        &mut self.filter
    }
}
