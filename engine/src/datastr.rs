//! Data structures used by algorithms.

pub mod graph;
pub mod index_heap;
pub mod node_order;
pub mod node_pool;
pub mod timestamped_vector;
