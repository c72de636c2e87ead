//! Lower bounds on the remaining cost based on node coordinates.

use crate::datastr::graph::*;

pub trait Heuristic {
    /// Lower bound on the cost of any path from `(x1, y1)` to `(x2, y2)`.
    fn estimate(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Weight;
}

/// Turns the search into Dijkstra's algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    #[inline(always)]
    fn estimate(&self, _x1: i32, _y1: i32, _x2: i32, _y2: i32) -> Weight {
        0
    }
}

/// Straight line distance times `scale`.
/// Admissible as long as no edge weight is smaller than `scale` times the distance between its endpoints.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanHeuristic {
    pub scale: f64,
}

impl Heuristic for EuclideanHeuristic {
    fn estimate(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Weight {
        let dx = f64::from(x1) - f64::from(x2);
        let dy = f64::from(y1) - f64::from(y2);
        ((dx * dx + dy * dy).sqrt() * self.scale).floor().min(f64::from(INFINITY)) as Weight
    }
}

/// Manhattan distance times `scale`, for graphs where edges are axis aligned.
#[derive(Debug, Clone, Copy)]
pub struct ManhattanHeuristic {
    pub scale: f64,
}

impl Heuristic for ManhattanHeuristic {
    fn estimate(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Weight {
        let dist = (i64::from(x1) - i64::from(x2)).abs() + (i64::from(y1) - i64::from(y2)).abs();
        (dist as f64 * self.scale).floor().min(f64::from(INFINITY)) as Weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_are_floored_distances() {
        assert_eq!(ZeroHeuristic.estimate(0, 0, 100, 100), 0);
        assert_eq!(EuclideanHeuristic { scale: 1.0 }.estimate(0, 0, 3, 4), 5);
        assert_eq!(EuclideanHeuristic { scale: 0.5 }.estimate(0, 0, 3, 4), 2);
        assert_eq!(ManhattanHeuristic { scale: 2.0 }.estimate(-1, 0, 2, -4), 14);
    }
}
