//! Point-to-point shortest path queries on static road graphs with
//! contraction hierarchies and precomputed down-DFS labels.
//!
//! `datastr` contains graphs, queues and other containers, `algo` contains the
//! search kernel, the expansion policies and the label construction pipeline.
//! `report` provides structured JSON reporting of experimental results.

#[macro_use]
pub mod report;

pub mod algo;
pub mod datastr;
pub mod error;

#[allow(dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
