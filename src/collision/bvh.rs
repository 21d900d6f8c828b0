//! Implicit array-encoded bounding-volume hierarchy over Morton-sorted volumes.
//!
//! The tree is a complete binary tree stored flat: node `i`'s children live at
//! `2*i + 1` and `2*i + 2`, no pointers anywhere. Leaves occupy the second
//! half of the array in spatially sorted order; when the leaf count is not a
//! power of two the unused slots (and the internal nodes above nothing but
//! unused slots) stay invalid and every reader skips them.

use crate::core::types::{Aabb, ShapeKind, Volume};
use crate::utils::allocator::EntityId;

/// Index of node `i`'s first child.
#[inline]
pub fn first_child_index(index: usize) -> usize {
    index * 2 + 1
}

/// Index of node `i`'s parent. Only meaningful for `index > 0`.
#[inline]
pub fn parent_index(index: usize) -> usize {
    if index % 2 == 0 {
        index / 2 - 1
    } else {
        index / 2
    }
}

/// Largest power of two `<= v`, with `0` mapped to `0`.
#[inline]
pub fn next_lowest_power_of_two(v: usize) -> usize {
    if v == 0 {
        0
    } else {
        1 << v.ilog2()
    }
}

/// One node of the flat hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct BvhNode {
    pub bounds: Aabb,
    /// Leaf payload: the volume stored at this leaf. Null for internal nodes.
    pub volume: EntityId,
    pub shape: ShapeKind,
    /// Largest leaf array-index reachable under this node; the pruning key of
    /// the pair query.
    pub rightmost_leaf: usize,
    /// `Some` for internal nodes, `None` for leaves.
    pub first_child: Option<usize>,
    pub valid: bool,
}

impl Default for BvhNode {
    fn default() -> Self {
        Self {
            bounds: Aabb::EMPTY,
            volume: EntityId::default(),
            shape: ShapeKind::Sphere,
            rightmost_leaf: 0,
            first_child: None,
            valid: false,
        }
    }
}

/// Flat-array BVH built fresh each step from the sorted volume order.
#[derive(Debug, Default)]
pub struct LinearBvh {
    nodes: Vec<BvhNode>,
    leaf_count: usize,
    leaf_offset: usize,
}

impl LinearBvh {
    /// Builds the hierarchy over `volumes`, laid out in the spatially
    /// coherent order given by `order` (sorted rank -> original index).
    ///
    /// `order` must be a permutation of `[0, volumes.len())`; an empty input
    /// yields an empty hierarchy.
    pub fn build(volumes: &[Volume], order: &[usize]) -> Self {
        debug_assert_eq!(volumes.len(), order.len());

        let leaf_count = order.len();
        if leaf_count == 0 {
            return Self::default();
        }

        let leaf_capacity = leaf_count.next_power_of_two();
        let node_count = leaf_capacity * 2 - 1;
        let leaf_offset = leaf_capacity - 1;
        let mut nodes = vec![BvhNode::default(); node_count];

        // Leaves, left to right in sorted order.
        for (rank, &original) in order.iter().enumerate() {
            let volume = &volumes[original];
            let index = leaf_offset + rank;
            nodes[index] = BvhNode {
                bounds: volume.aabb,
                volume: volume.id,
                shape: volume.shape,
                rightmost_leaf: index,
                first_child: None,
                valid: true,
            };
        }

        // Walk up from the last filled leaf, marking the minimal legal node
        // coverage on each level crossed.
        let mut last_on_level = leaf_offset + leaf_count - 1;
        while last_on_level > 0 {
            last_on_level = parent_index(last_on_level);
            if last_on_level == 0 {
                nodes[0].valid = true;
            } else {
                for index in next_lowest_power_of_two(last_on_level) - 1..=last_on_level {
                    nodes[index].valid = true;
                }
            }
        }

        // Internal nodes bottom-up. Invalid children carry empty bounds, so
        // the union only ever covers real leaves.
        for index in (0..leaf_offset).rev() {
            let first_child = first_child_index(index);
            let bounds = nodes[first_child]
                .bounds
                .union(&nodes[first_child + 1].bounds);

            let nodes_on_level = next_lowest_power_of_two(index + 1);
            // 1-based position within the level; written to stay in range at
            // the root, where `index < nodes_on_level`.
            let order_on_level = index + 2 - nodes_on_level;
            let rightmost_leaf = (node_count - 1)
                - (leaf_capacity / nodes_on_level) * (nodes_on_level - order_on_level);

            let node = &mut nodes[index];
            node.bounds = bounds;
            node.first_child = Some(first_child);
            node.rightmost_leaf = rightmost_leaf;
        }

        Self {
            nodes,
            leaf_count,
            leaf_offset,
        }
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Array-index range of the filled leaves.
    pub fn leaf_range(&self) -> std::ops::Range<usize> {
        self.leaf_offset..self.leaf_offset + self.leaf_count
    }
}
