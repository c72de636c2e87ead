//! Contraction Hierarchies
//!
//! Nodes are contracted one by one in ascending rank.
//! Contracting `v` inserts a shortcut `u -> w` for every pair of remaining neighbors
//! unless a witness path which avoids `v` and is not longer exists.
//! The result is the augmented graph: all original edges plus all shortcuts.
//! In it every distance is realized by a path which first only ascends and then only descends in rank.

use super::*;
use crate::algo::search::State;
use crate::datastr::{graph::*, index_heap::IndexdMinHeap, node_order::NodeOrder, timestamped_vector::TimestampedVector};

pub mod chase;
pub mod expansion;
pub mod fch_down_dfs;

pub use self::expansion::*;

#[derive(Debug, PartialEq)]
enum ShortcutResult {
    NewShortcut,
    ShortenedExisting,
    ShorterExisting,
}

#[derive(Debug, Default)]
struct Node {
    outgoing: Vec<Link>,
    incoming: Vec<Link>,
}

impl Node {
    fn insert_or_decrease_outgoing(&mut self, to: NodeId, weight: Weight) -> ShortcutResult {
        Node::insert_or_decrease(&mut self.outgoing, to, weight)
    }

    fn insert_or_decrease_incoming(&mut self, from: NodeId, weight: Weight) -> ShortcutResult {
        Node::insert_or_decrease(&mut self.incoming, from, weight)
    }

    fn insert_or_decrease(links: &mut Vec<Link>, node: NodeId, weight: Weight) -> ShortcutResult {
        for link in links.iter_mut() {
            if link.node == node {
                if weight < link.weight {
                    link.weight = weight;
                    return ShortcutResult::ShortenedExisting;
                } else {
                    return ShortcutResult::ShorterExisting;
                }
            }
        }

        links.push(Link { node, weight });
        ShortcutResult::NewShortcut
    }
}

/// Dijkstra restricted to the nodes which are not yet contracted.
#[derive(Debug)]
struct WitnessSearch {
    distances: TimestampedVector<Weight>,
    queue: IndexdMinHeap<State>,
}

impl WitnessSearch {
    fn new(n: usize) -> Self {
        WitnessSearch {
            distances: TimestampedVector::new(n, INFINITY),
            queue: IndexdMinHeap::new(n),
        }
    }

    // afterwards `distance` is exact for all nodes closer than `cap` and an upper bound for all others
    fn run(&mut self, nodes: &[Node], contracted: &[bool], from: NodeId, cap: Weight) {
        self.distances.reset();
        self.queue.clear();
        self.distances[from as usize] = 0;
        self.queue.push(State { key: 0, node: from });

        while let Some(State { key, node }) = self.queue.pop() {
            if key > cap {
                break;
            }
            for &Link { node: head, weight } in &nodes[node as usize].outgoing {
                if contracted[head as usize] {
                    continue;
                }
                let distance = key.saturating_add(weight).min(INFINITY);
                if distance < self.distances[head as usize] {
                    self.distances[head as usize] = distance;
                    if self.queue.contains_index(head as usize) {
                        self.queue.decrease_key(State { key: distance, node: head });
                    } else {
                        self.queue.push(State { key: distance, node: head });
                    }
                }
            }
        }
    }

    fn distance(&self, node: NodeId) -> Weight {
        self.distances[node as usize]
    }
}

/// Contract `graph` in the order given by `order` and return the augmented graph.
/// Self loops are dropped, parallel edges collapse to the lightest one.
/// Coordinates and external ids carry over.
pub fn contract(graph: &PlanarGraph, order: &NodeOrder) -> PlanarGraph {
    let n = graph.num_nodes();
    debug_assert_eq!(order.len(), n);

    let mut nodes: Vec<Node> = (0..n).map(|_| Node::default()).collect();
    for (tail, head, weight) in graph.edges() {
        if tail != head {
            nodes[tail as usize].insert_or_decrease_outgoing(head, weight);
            nodes[head as usize].insert_or_decrease_incoming(tail, weight);
        }
    }

    let mut contracted = vec![false; n];
    let mut witness_search = WitnessSearch::new(n);
    let mut num_shortcuts = 0;

    for node in order.order() {
        // marking first also keeps the witness search from passing through `node`
        contracted[node as usize] = true;
        let remaining = |links: &[Link]| links.iter().filter(|link| !contracted[link.node as usize]).copied().collect::<Vec<_>>();
        let incoming = remaining(&nodes[node as usize].incoming);
        let outgoing = remaining(&nodes[node as usize].outgoing);

        for &Link { node: from, weight: from_weight } in &incoming {
            let cap = match outgoing.iter().filter(|link| link.node != from).map(|link| from_weight.saturating_add(link.weight).min(INFINITY)).max() {
                Some(cap) => cap,
                None => continue,
            };
            witness_search.run(&nodes, &contracted, from, cap);

            for &Link { node: to, weight: to_weight } in &outgoing {
                let shortcut_weight = from_weight.saturating_add(to_weight).min(INFINITY);
                if to == from || witness_search.distance(to) <= shortcut_weight {
                    continue;
                }
                let out_result = nodes[from as usize].insert_or_decrease_outgoing(to, shortcut_weight);
                let in_result = nodes[to as usize].insert_or_decrease_incoming(from, shortcut_weight);
                debug_assert_eq!(out_result, in_result);
                if out_result == ShortcutResult::NewShortcut {
                    num_shortcuts += 1;
                }
            }
        }
    }

    report!("num_shortcuts", num_shortcuts);

    let xy = (0..n as NodeId).map(|node| graph.coordinates(node)).collect();
    PlanarGraph::from_adjacency_lists(nodes.into_iter().map(|node| node.outgoing).collect(), xy).with_external_ids_of(graph)
}

/// Simple ordering heuristic: contract nodes with few neighbors first, ties by id.
pub fn order_by_degree(graph: &PlanarGraph) -> NodeOrder {
    let mut nodes: Vec<NodeId> = (0..graph.num_nodes() as NodeId).collect();
    nodes.sort_by_key(|&node| (graph.out_degree(node) + graph.in_degree(node), node));
    NodeOrder::from_node_order(&nodes)
}
