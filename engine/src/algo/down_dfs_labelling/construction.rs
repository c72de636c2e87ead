//! The two DFS passes over the hierarchy.
//!
//! Both traversals use an explicit stack of `(node, next edge index)` frames,
//! so deep hierarchies cannot overflow the call stack.

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnStack,
    Done,
}

impl DownDfsLabelling {
    /// Pass 1: postorder DFS over down edges rooted at the apex.
    /// Nodes not below the apex are picked up by further roots in id order.
    pub(super) fn label_down_closure(&mut self, graph: &PlanarGraph, order: &NodeOrder) {
        let n = graph.num_nodes();
        let mut visit = vec![Visit::New; n];
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        let mut next_dfs_id = 0;
        let mut closed_cycle = false;

        for root in order.apex().into_iter().chain(0..n as NodeId) {
            if visit[root as usize] != Visit::New {
                continue;
            }
            visit[root as usize] = Visit::OnStack;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                if frame.1 < graph.out_degree(node) {
                    let edge_idx = frame.1;
                    frame.1 += 1;
                    let head = graph.out_link(node, edge_idx).node;
                    if head == node || !order.is_down(node, head) {
                        continue;
                    }
                    match visit[head as usize] {
                        Visit::New => {
                            visit[head as usize] = Visit::OnStack;
                            stack.push((head, 0));
                        }
                        Visit::OnStack => closed_cycle = true,
                        Visit::Done => self.label_down_edge(node, edge_idx, head),
                    }
                } else {
                    stack.pop();
                    visit[node as usize] = Visit::Done;
                    self.dfs_order[node as usize] = next_dfs_id;
                    next_dfs_id += 1;
                    let own = self.target(node);
                    self.node_labels[node as usize].grow(&own);

                    if let Some(&(parent, next_edge)) = stack.last() {
                        self.label_down_edge(parent, next_edge - 1, node);
                    }
                }
            }
        }

        debug_assert_eq!(next_dfs_id as usize, n);

        // only possible between nodes of equal rank
        if closed_cycle {
            self.close_down_cycles(graph, order);
        }
    }

    fn label_down_edge(&mut self, tail: NodeId, edge_idx: usize, head: NodeId) {
        let child = self.node_labels[head as usize].clone();
        self.node_labels[tail as usize].merge(&child);
        debug_assert!(self.node_labels[tail as usize].ids.contains(self.dfs_order[head as usize]));
        let edge = self.edge_id(tail, edge_idx);
        self.edge_labels[edge] = child;
    }

    // Edges into a node which was still on the stack got no label.
    // Propagate node labels over all down edges until nothing changes.
    fn close_down_cycles(&mut self, graph: &PlanarGraph, order: &NodeOrder) {
        let mut postorder: Vec<NodeId> = (0..graph.num_nodes() as NodeId).collect();
        postorder.sort_unstable_by_key(|&node| self.dfs_order[node as usize]);

        let mut changed = true;
        while changed {
            changed = false;
            for &node in &postorder {
                for (edge_idx, Link { node: head, .. }) in graph.outgoing(node).enumerate() {
                    if head == node || !order.is_down(node, head) {
                        continue;
                    }
                    let edge = self.edge_id(node, edge_idx);
                    if !self.node_labels[node as usize].covers(&self.node_labels[head as usize]) {
                        let child = self.node_labels[head as usize].clone();
                        self.node_labels[node as usize].merge(&child);
                        changed = true;
                    }
                    if !self.edge_labels[edge].covers(&self.node_labels[head as usize]) {
                        self.edge_labels[edge].merge(&self.node_labels[head as usize]);
                        changed = true;
                    }
                }
            }
        }
    }

    /// Pass 2: find the up apex of every node and label all up edges with its down closure.
    pub(super) fn label_up_edges(&mut self, graph: &PlanarGraph, order: &NodeOrder) {
        let n = graph.num_nodes();
        let mut visit = vec![Visit::New; n];
        let mut up_apex: Vec<NodeId> = (0..n as NodeId).collect();
        let mut stack: Vec<(NodeId, usize)> = Vec::new();

        let higher = |a: NodeId, b: NodeId| if order.rank(b) > order.rank(a) { b } else { a };

        for root in 0..n as NodeId {
            if visit[root as usize] != Visit::New {
                continue;
            }
            visit[root as usize] = Visit::OnStack;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                if frame.1 < graph.out_degree(node) {
                    let edge_idx = frame.1;
                    frame.1 += 1;
                    let head = graph.out_link(node, edge_idx).node;
                    if head == node || !order.is_up(node, head) {
                        continue;
                    }
                    match visit[head as usize] {
                        Visit::New => {
                            visit[head as usize] = Visit::OnStack;
                            stack.push((head, 0));
                        }
                        // a node of equal rank further up the stack, its apex is not known yet
                        Visit::OnStack => (),
                        Visit::Done => up_apex[node as usize] = higher(up_apex[node as usize], up_apex[head as usize]),
                    }
                } else {
                    stack.pop();
                    visit[node as usize] = Visit::Done;
                    if let Some(&(parent, _)) = stack.last() {
                        up_apex[parent as usize] = higher(up_apex[parent as usize], up_apex[node as usize]);
                    }
                }
            }
        }

        for node in 0..n as NodeId {
            for (edge_idx, Link { node: head, .. }) in graph.outgoing(node).enumerate() {
                if head == node || !order.is_up(node, head) {
                    continue;
                }
                let edge = self.edge_id(node, edge_idx);
                self.edge_labels[edge].merge(&self.node_labels[up_apex[head as usize] as usize]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ranks_do_not_break_the_dfs() {
        // 0 and 1 share the top rank and point at each other, both reach 2
        let graph = PlanarGraph::new(3, &[(0, 1, 1), (1, 0, 1), (1, 2, 1), (2, 0, 3)], vec![(0, 0), (1, 0), (2, 0)]).unwrap();
        let order = NodeOrder::from_ranks(vec![1, 1, 0]);
        let mut labelling = DownDfsLabelling::new(&graph, vec![0, 1, 2]).unwrap();
        labelling.compute_labels(&graph, &order).unwrap();
        labelling.validate(&graph).unwrap();

        // 1 -> 0 was seen while 0 was still open
        let one_to_zero = labelling.edge_label(1, 0);
        for node in 0..3 {
            assert!(one_to_zero.contains(&labelling.target(node)));
            assert!(labelling.node_label(1).contains(&labelling.target(node)));
        }
        assert_eq!(labelling.dfs_id(0), 2);
    }

    #[test]
    fn up_apex_is_the_highest_node_reachable_upwards() {
        //  3 (top)     2
        //    ^        ^
        //     \      /
        //       0 ->1
        let graph = PlanarGraph::new(4, &[(0, 1, 1), (0, 3, 1), (1, 2, 1)], vec![(0, 0); 4]).unwrap();
        let order = NodeOrder::identity(4);
        let mut labelling = DownDfsLabelling::new(&graph, vec![0; 4]).unwrap();
        labelling.compute_labels(&graph, &order).unwrap();
        // 0 -> 1 leads up to 2 only, 0 -> 3 to 3 only
        assert_eq!(labelling.edge_label(0, 0), labelling.node_label(2));
        assert_eq!(labelling.edge_label(0, 1), labelling.node_label(3));
    }
}
