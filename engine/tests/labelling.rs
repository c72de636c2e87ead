use ch_labelling::{
    algo::{contraction_hierarchy::*, down_dfs_labelling::*},
    datastr::{graph::*, node_order::NodeOrder},
    error::LabellingError,
};

mod common;
use common::*;

const A: NodeId = 0;
const B: NodeId = 1;
const C: NodeId = 2;
const D: NodeId = 3;
const E: NodeId = 4;

//        1         1
//   A -------> B -----> D
//   |          |        ^
//   | 4        | 1      | 1
//   v          v        |
//   C <--------+        |
//   +-------------------+
//
// E is isolated.
fn diamond() -> PlanarGraph {
    PlanarGraph::new(
        5,
        &[(A, B, 1), (A, C, 4), (B, D, 1), (C, D, 1), (B, C, 1)],
        vec![(0, 0), (1, 1), (1, -1), (2, 0), (5, 5)],
    )
    .unwrap()
}

fn unrefined() -> LabellingConfig {
    LabellingConfig {
        refine: false,
        ..LabellingConfig::default()
    }
}

fn refine_all() -> LabellingConfig {
    LabellingConfig {
        refine: true,
        refine_min_degree: 1,
    }
}

// nodes reachable from `node` over down edges, including `node`
fn down_closure(graph: &PlanarGraph, order: &NodeOrder, node: NodeId) -> Vec<NodeId> {
    let mut seen = vec![false; graph.num_nodes()];
    let mut stack = vec![node];
    seen[node as usize] = true;
    let mut closure = Vec::new();
    while let Some(node) = stack.pop() {
        closure.push(node);
        for Link { node: head, .. } in graph.outgoing(node) {
            if order.is_down(node, head) && !seen[head as usize] {
                seen[head as usize] = true;
                stack.push(head);
            }
        }
    }
    closure
}

#[test]
fn a_to_c_covers_d_for_every_rank_assignment_which_makes_it_a_down_path() {
    let graph = diamond();
    for ranks in permutations(5) {
        let order = NodeOrder::from_ranks(ranks.clone());
        if !(order.is_down(A, C) && order.is_down(C, D)) {
            continue;
        }
        let labelling = DownDfsLabelling::build(&graph, &order, vec![0, 0, 1, 1, 2], &unrefined()).unwrap();
        let a_to_c = labelling.edge_label(A, 1);
        assert!(a_to_c.contains(&labelling.target(C)), "{:?}", ranks);
        assert!(a_to_c.contains(&labelling.target(D)), "{:?}", ranks);
        assert!(!a_to_c.contains(&labelling.target(E)), "{:?}", ranks);
    }
}

#[test]
fn dfs_ids_are_a_permutation() {
    for seed in 0..5 {
        let graph = random_digraph(60, 180, seed);
        let order = order_by_degree(&graph);
        let augmented = contract(&graph, &order);
        let labelling = DownDfsLabelling::build(&augmented, &order, vec![0; 60], &unrefined()).unwrap();
        let mut ids: Vec<u32> = (0..60).map(|node| labelling.dfs_id(node)).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..60).collect::<Vec<u32>>());
    }
}

#[test]
fn apex_tie_keeps_the_first_maximal_node() {
    let order = NodeOrder::from_ranks(vec![1, 3, 0, 3, 2]);
    assert_eq!(order.apex(), Some(1));
    assert_eq!(NodeOrder::from_ranks(Vec::new()).apex(), None);

    // the apex gets the largest DFS id of its tree
    let graph = diamond();
    let labelling = DownDfsLabelling::build(&graph, &order, vec![0; 5], &unrefined()).unwrap();
    assert!(labelling.dfs_id(B) > labelling.dfs_id(C));
    assert!(labelling.dfs_id(B) > labelling.dfs_id(D));
}

#[test]
fn down_edge_labels_contain_down_closure_of_head() {
    let graph = random_digraph(50, 150, 7);
    let order = order_by_degree(&graph);
    let augmented = contract(&graph, &order);
    let labelling = DownDfsLabelling::build(&augmented, &order, (0..50).map(|node| node % 7).collect(), &unrefined()).unwrap();

    for node in 0..50 {
        for (edge_idx, Link { node: head, .. }) in augmented.outgoing(node).enumerate() {
            if head == node || !order.is_down(node, head) {
                continue;
            }
            for reachable in down_closure(&augmented, &order, head) {
                assert!(labelling.edge_label(node, edge_idx).contains(&labelling.target(reachable)));
            }
        }
    }
}

#[test]
fn refined_labels_are_subsets_of_unrefined_ones() {
    let graph = grid(6, 5, 3);
    let order = order_by_degree(&graph);
    let augmented = contract(&graph, &order);
    let partition = quadrants(&graph);
    let coarse = DownDfsLabelling::build(&augmented, &order, partition.clone(), &unrefined()).unwrap();
    let refined = DownDfsLabelling::build(&augmented, &order, partition, &refine_all()).unwrap();

    let mut num_shrunk = 0;
    for node in 0..30 {
        assert!(refined.is_refined(node));
        assert_eq!(refined.dfs_id(node), coarse.dfs_id(node));
        for (coarse_label, refined_label) in coarse.edge_labels(node).iter().zip(refined.edge_labels(node)) {
            assert!(coarse_label.covers(refined_label));
            num_shrunk += (coarse_label != refined_label) as usize;
        }
    }
    assert!(num_shrunk > 0);
}

#[test]
fn invalid_input_is_rejected() {
    let graph = diamond();
    assert_eq!(
        DownDfsLabelling::build(&graph, &NodeOrder::identity(4), vec![0; 5], &unrefined()).unwrap_err(),
        LabellingError::RankCount { expected: 5, actual: 4 }
    );
    assert_eq!(
        DownDfsLabelling::build(&graph, &NodeOrder::identity(5), vec![0; 6], &unrefined()).unwrap_err(),
        LabellingError::PartitionCount { expected: 5, actual: 6 }
    );
}

#[test]
fn labels_can_be_built_on_external_ids() {
    let graph = grid(4, 4, 9).with_external_ids((0..16).map(|node| 1000 - node * 3).collect()).unwrap();
    let order = order_by_degree(&graph);
    let augmented = contract(&graph, &order);
    assert_eq!(augmented.to_internal_id(1000 - 5 * 3), Some(5));
    let labelling = DownDfsLabelling::build(&augmented, &order, quadrants(&graph), &LabellingConfig::default()).unwrap();
    labelling.validate(&augmented).unwrap();
}
