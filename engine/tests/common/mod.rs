#![allow(dead_code)]

use ch_labelling::datastr::graph::*;
use rand::prelude::*;
use std::{cmp::Reverse, collections::BinaryHeap};

/// `width` x `height` grid, edges in both directions between neighbors, nodes 10 apart.
pub fn grid(width: usize, height: usize, seed: u64) -> PlanarGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let id = |x: usize, y: usize| (y * width + x) as NodeId;
    let mut edges = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                edges.push((id(x, y), id(x + 1, y), rng.gen_range(10..100_000)));
                edges.push((id(x + 1, y), id(x, y), rng.gen_range(10..100_000)));
            }
            if y + 1 < height {
                edges.push((id(x, y), id(x, y + 1), rng.gen_range(10..100_000)));
                edges.push((id(x, y + 1), id(x, y), rng.gen_range(10..100_000)));
            }
        }
    }
    let xy = (0..height).flat_map(|y| (0..width).map(move |x| (x as i32 * 10, y as i32 * 10))).collect();
    PlanarGraph::new(width * height, &edges, xy).unwrap()
}

/// Sparse random digraph, not necessarily connected. May contain parallel edges and loops.
pub fn random_digraph(num_nodes: usize, num_edges: usize, seed: u64) -> PlanarGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let edges: Vec<(NodeId, NodeId, Weight)> = (0..num_edges)
        .map(|_| {
            (
                rng.gen_range(0..num_nodes) as NodeId,
                rng.gen_range(0..num_nodes) as NodeId,
                rng.gen_range(1..1000),
            )
        })
        .collect();
    let xy = (0..num_nodes).map(|_| (rng.gen_range(-1000..1000), rng.gen_range(-1000..1000))).collect();
    PlanarGraph::new(num_nodes, &edges, xy).unwrap()
}

/// Textbook Dijkstra over the outgoing edges of `graph`, internal ids.
pub fn reference_distances(graph: &PlanarGraph, from: NodeId) -> Vec<Weight> {
    let mut distances = vec![INFINITY; graph.num_nodes()];
    let mut queue = BinaryHeap::new();
    distances[from as usize] = 0;
    queue.push(Reverse((0, from)));

    while let Some(Reverse((distance, node))) = queue.pop() {
        if distance > distances[node as usize] {
            continue;
        }
        for Link { node: head, weight } in graph.outgoing(node) {
            if distance + weight < distances[head as usize] {
                distances[head as usize] = distance + weight;
                queue.push(Reverse((distance + weight, head)));
            }
        }
    }

    distances
}

/// Four regions, split along the middle of both axes of the coordinate bounding box.
pub fn quadrants(graph: &PlanarGraph) -> Vec<u32> {
    let (max_x, max_y) = (0..graph.num_nodes() as NodeId)
        .map(|node| graph.coordinates(node))
        .fold((0, 0), |(mx, my), (x, y)| (mx.max(x), my.max(y)));
    (0..graph.num_nodes() as NodeId)
        .map(|node| {
            let (x, y) = graph.coordinates(node);
            (2 * x > max_x) as u32 + 2 * (2 * y > max_y) as u32
        })
        .collect()
}

/// All permutations of `0..n`.
pub fn permutations(n: u32) -> Vec<Vec<u32>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut result = Vec::new();
    for smaller in permutations(n - 1) {
        for pos in 0..=smaller.len() {
            let mut permutation = smaller.clone();
            permutation.insert(pos, n - 1);
            result.push(permutation);
        }
    }
    result
}
