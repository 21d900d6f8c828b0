//! Broad phase: Morton sort, hierarchy build, and the pairwise overlap query.

use serde::{Deserialize, Serialize};

use crate::collision::bvh::LinearBvh;
use crate::collision::morton::SpatialKeyBuilder;
use crate::collision::radix::IndexedRadixSorter;
use crate::config::SimulationConfig;
use crate::core::types::Volume;
use crate::utils::allocator::EntityId;
use crate::utils::collector::ShardedCollector;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An unordered candidate pair of overlapping volumes. Each unordered pair
/// appears at most once per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionPair {
    pub volume_a: EntityId,
    pub volume_b: EntityId,
}

/// Broad-phase driver: owns the key builder and sort scratch, produces the
/// candidate pair array for one step.
pub struct BroadPhase {
    keys: SpatialKeyBuilder,
    sorter: IndexedRadixSorter,
    key_scratch: Vec<u32>,
    batch_size: usize,
}

impl BroadPhase {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            keys: SpatialKeyBuilder::new(config.scene_bounds),
            sorter: IndexedRadixSorter::new(),
            key_scratch: Vec::new(),
            batch_size: config.broadphase_batch_size.max(1),
        }
    }

    /// Runs the full broad phase: key build, radix sort, hierarchy build,
    /// pair query, compaction. Fewer than two volumes produce no pairs.
    pub fn find_pairs(&mut self, volumes: &[Volume]) -> Vec<CollisionPair> {
        if volumes.len() < 2 {
            return Vec::new();
        }

        self.keys.build_keys(volumes, &mut self.key_scratch);
        self.sorter.sort(&self.key_scratch);
        let bvh = LinearBvh::build(volumes, self.sorter.permutation());
        query_pairs(&bvh, self.batch_size)
    }
}

/// Queries every leaf against the hierarchy, emitting each overlapping
/// unordered leaf pair exactly once.
///
/// The entry points are the two children of the conceptual root (indices 1
/// and 2), never the root slot itself; each leaf only ever matches nodes
/// whose rightmost reachable leaf lies strictly to its right, which is what
/// de-duplicates pairs over the sorted layout.
pub fn query_pairs(bvh: &LinearBvh, batch_size: usize) -> Vec<CollisionPair> {
    // A tree this small has no children-of-root to start from.
    if bvh.nodes().len() < 3 {
        return Vec::new();
    }

    let collector = ShardedCollector::for_worker_threads();

    #[cfg(feature = "parallel")]
    {
        bvh.leaf_range()
            .into_par_iter()
            .with_min_len(batch_size.max(1))
            .for_each(|leaf| {
                query_node(bvh, 1, leaf, &collector);
                query_node(bvh, 2, leaf, &collector);
            });
    }
    #[cfg(not(feature = "parallel"))]
    {
        let _ = batch_size;
        for leaf in bvh.leaf_range() {
            query_node(bvh, 1, leaf, &collector);
            query_node(bvh, 2, leaf, &collector);
        }
    }

    collector.drain()
}

fn query_node(
    bvh: &LinearBvh,
    node_index: usize,
    leaf_index: usize,
    out: &ShardedCollector<CollisionPair>,
) {
    let nodes = bvh.nodes();
    let node = &nodes[node_index];

    if node.rightmost_leaf <= leaf_index
        || !node.valid
        || !nodes[leaf_index].bounds.overlaps(&node.bounds)
    {
        return;
    }

    match node.first_child {
        None => out.push(CollisionPair {
            volume_a: nodes[leaf_index].volume,
            volume_b: node.volume,
        }),
        Some(first_child) => {
            query_node(bvh, first_child, leaf_index, out);
            query_node(bvh, first_child + 1, leaf_index, out);
        }
    }
}
