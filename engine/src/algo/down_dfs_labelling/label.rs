//! Per edge reachability summaries.
//!
//! Every component is an over-approximation of a node set: the set of nodes a search may reach
//! through the labelled edge. Components only ever grow, they start out empty.

use crate::datastr::node_order::Rank;

/// Inclusive range of DFS ids. Empty if `left > right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdInterval {
    pub left: u32,
    pub right: u32,
}

impl IdInterval {
    pub const EMPTY: IdInterval = IdInterval { left: u32::MAX, right: 0 };

    pub fn is_empty(&self) -> bool {
        self.left > self.right
    }

    pub fn grow(&mut self, id: u32) {
        self.left = self.left.min(id);
        self.right = self.right.max(id);
    }

    pub fn merge(&mut self, other: &IdInterval) {
        self.left = self.left.min(other.left);
        self.right = self.right.max(other.right);
    }

    pub fn contains(&self, id: u32) -> bool {
        self.left <= id && id <= self.right
    }

    /// `other` lies within `self`. Empty intervals are contained in everything.
    pub fn covers(&self, other: &IdInterval) -> bool {
        other.is_empty() || (self.left <= other.left && other.right <= self.right)
    }
}

impl Default for IdInterval {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Inclusive range of ranks. Shares its representation with `IdInterval`.
pub type RankRange = IdInterval;

/// Axis aligned bounding box of coordinates. Empty if `min_x > max_x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    pub const EMPTY: BoundingBox = BoundingBox {
        min_x: i32::MAX,
        min_y: i32::MAX,
        max_x: i32::MIN,
        max_y: i32::MIN,
    };

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    pub fn grow(&mut self, (x, y): (i32, i32)) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn contains(&self, (x, y): (i32, i32)) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    pub fn covers(&self, other: &BoundingBox) -> bool {
        other.is_empty() || (self.min_x <= other.min_x && self.min_y <= other.min_y && other.max_x <= self.max_x && other.max_y <= self.max_y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// One bit per partition, byte `p / 8`, bit `p % 8`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionFlags(Box<[u8]>);

impl PartitionFlags {
    pub fn new(num_bytes: usize) -> Self {
        PartitionFlags(vec![0; num_bytes].into_boxed_slice())
    }

    pub fn set(&mut self, partition: u32) {
        self.0[partition as usize >> 3] |= 1 << (partition & 7);
    }

    pub fn get(&self, partition: u32) -> bool {
        self.0.get(partition as usize >> 3).map_or(false, |byte| byte & (1 << (partition & 7)) != 0)
    }

    pub fn merge(&mut self, other: &PartitionFlags) {
        for (byte, other) in self.0.iter_mut().zip(other.0.iter()) {
            *byte |= other;
        }
    }

    pub fn covers(&self, other: &PartitionFlags) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(byte, other)| byte & other == *other)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&byte| byte == 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Everything a label test needs to know about the target of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTarget {
    pub dfs_id: u32,
    pub rank: Rank,
    pub xy: (i32, i32),
    pub partition: u32,
}

/// Which label components take part in pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTests {
    pub ids: bool,
    pub bbox: bool,
    pub flags: bool,
    pub ranks: bool,
}

impl LabelTests {
    pub const ALL: LabelTests = LabelTests {
        ids: true,
        bbox: true,
        flags: true,
        ranks: true,
    };

    pub const FLAGS_ONLY: LabelTests = LabelTests {
        ids: false,
        bbox: false,
        flags: true,
        ranks: false,
    };

    fn any(&self) -> bool {
        self.ids || self.bbox || self.flags || self.ranks
    }
}

impl Default for LabelTests {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownDfsLabel {
    pub ids: IdInterval,
    pub ranks: RankRange,
    pub bbox: BoundingBox,
    pub flags: PartitionFlags,
}

impl DownDfsLabel {
    pub fn new(bytes_per_label: usize) -> Self {
        DownDfsLabel {
            ids: IdInterval::EMPTY,
            ranks: RankRange::EMPTY,
            bbox: BoundingBox::EMPTY,
            flags: PartitionFlags::new(bytes_per_label),
        }
    }

    /// Add a single node.
    pub fn grow(&mut self, node: &LabelTarget) {
        self.ids.grow(node.dfs_id);
        self.ranks.grow(node.rank);
        self.bbox.grow(node.xy);
        self.flags.set(node.partition);
    }

    /// Union with everything `other` contains.
    pub fn merge(&mut self, other: &DownDfsLabel) {
        self.ids.merge(&other.ids);
        self.ranks.merge(&other.ranks);
        self.bbox.merge(&other.bbox);
        self.flags.merge(&other.flags);
    }

    /// Every component of `other` lies within the same component of `self`.
    pub fn covers(&self, other: &DownDfsLabel) -> bool {
        self.ids.covers(&other.ids) && self.ranks.covers(&other.ranks) && self.bbox.covers(&other.bbox) && self.flags.covers(&other.flags)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Would `node` be added by `grow`?
    pub fn contains(&self, node: &LabelTarget) -> bool {
        self.ids.contains(node.dfs_id) && self.ranks.contains(node.rank) && self.bbox.contains(node.xy) && self.flags.get(node.partition)
    }

    /// `true` if every enabled component rules out `target`.
    /// With no component enabled nothing is ever excluded.
    pub fn excludes(&self, target: &LabelTarget, tests: LabelTests) -> bool {
        tests.any()
            && (!tests.ids || !self.ids.contains(target.dfs_id))
            && (!tests.ranks || !self.ranks.contains(target.rank))
            && (!tests.bbox || !self.bbox.contains(target.xy))
            && (!tests.flags || !self.flags.get(target.partition))
    }
}
