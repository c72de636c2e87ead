//! Small graphs shared by the unit tests.

use super::*;
use rand::prelude::*;

//        1         1
//   A -------> B -----> D
//   |          |        ^
//   | 4        | 1      | 1
//   v          v        |
//   C <--------+        |
//   +-------------------+
//
// E is isolated.
pub fn diamond() -> PlanarGraph {
    PlanarGraph::new(
        5,
        &[(0, 1, 1), (0, 2, 4), (1, 3, 1), (2, 3, 1), (1, 2, 1)],
        vec![(0, 0), (1, 1), (1, -1), (2, 0), (5, 5)],
    )
    .unwrap()
}

/// `width` x `height` grid with edges in both directions between horizontal and vertical neighbors.
/// Nodes are `10` apart, weights are drawn from `10..100_000`, so the euclidean distance is admissible.
pub fn random_grid(width: usize, height: usize, seed: u64) -> PlanarGraph {
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
