use std::collections::HashSet;

use momentum_physics::collision::bvh::LinearBvh;
use momentum_physics::collision::morton::SpatialKeyBuilder;
use momentum_physics::collision::radix::IndexedRadixSorter;
use momentum_physics::{Aabb, BroadPhase, EntityId, ShapeKind, SimulationConfig, Vec3, Volume};

/// Deterministic xorshift generator so failures reproduce exactly.
struct XorShift(u32);

impl XorShift {
    fn next_u32(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    fn next_unit_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1 << 24) as f32
    }
}

fn random_volumes(count: usize, seed: u32) -> Vec<Volume> {
    let mut rng = XorShift(seed.max(1));
    (0..count)
        .map(|i| {
            let center = Vec3::new(
                rng.next_unit_f32(),
                rng.next_unit_f32(),
                rng.next_unit_f32(),
            );
            let half_extents = Vec3::new(
                0.01 + rng.next_unit_f32() * 0.08,
                0.01 + rng.next_unit_f32() * 0.08,
                0.01 + rng.next_unit_f32() * 0.08,
            );
            Volume {
                id: EntityId::from_index(i as u32),
                aabb: Aabb::from_center_half_extents(center, half_extents),
                shape: ShapeKind::Sphere,
                body: EntityId::from_index(i as u32),
            }
        })
        .collect()
}

fn brute_force_pairs(volumes: &[Volume]) -> HashSet<(usize, usize)> {
    let mut pairs = HashSet::new();
    for i in 0..volumes.len() {
        for j in i + 1..volumes.len() {
            if volumes[i].aabb.overlaps(&volumes[j].aabb) {
                pairs.insert((i, j));
            }
        }
    }
    pairs
}

fn sorted_order(volumes: &[Volume]) -> (Vec<u32>, Vec<usize>) {
    let builder = SpatialKeyBuilder::new(SimulationConfig::default().scene_bounds);
    let mut keys = Vec::new();
    builder.build_keys(volumes, &mut keys);
    let mut sorter = IndexedRadixSorter::new();
    sorter.sort(&keys);
    (sorter.keys().to_vec(), sorter.permutation().to_vec())
}

#[test]
fn pair_query_matches_brute_force_on_random_sets() {
    for &(count, seed) in &[
        (0usize, 1u32),
        (1, 2),
        (2, 3),
        (3, 4),
        (7, 5),
        (16, 6),
        (33, 7),
        (100, 8),
        (200, 9),
    ] {
        let volumes = random_volumes(count, seed);
        let expected = brute_force_pairs(&volumes);

        let pairs = BroadPhase::new(&SimulationConfig::default()).find_pairs(&volumes);
        let mut actual = HashSet::new();
        for pair in &pairs {
            let (a, b) = (pair.volume_a.index(), pair.volume_b.index());
            let key = (a.min(b), a.max(b));
            assert!(a != b, "self pair for volume {a} (count={count})");
            assert!(
                actual.insert(key),
                "duplicate pair {key:?} (count={count}, seed={seed})"
            );
        }

        assert_eq!(
            actual, expected,
            "pair set mismatch for count={count}, seed={seed}"
        );
    }
}

#[test]
fn sort_produces_non_decreasing_keys_and_a_bijection() {
    for &count in &[1usize, 2, 9, 64, 200] {
        let volumes = random_volumes(count, count as u32 * 31 + 1);
        let (keys, permutation) = sorted_order(&volumes);

        assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));

        let mut seen = vec![false; count];
        for &original in &permutation {
            assert!(original < count);
            assert!(!seen[original], "permutation repeats index {original}");
            seen[original] = true;
        }
        assert!(seen.iter().all(|&hit| hit));
    }
}

#[test]
fn hierarchy_invariants_hold_over_sorted_random_input() {
    for &count in &[1usize, 2, 5, 8, 13, 64, 200] {
        let volumes = random_volumes(count, count as u32 + 77);
        let (_, permutation) = sorted_order(&volumes);
        let bvh = LinearBvh::build(&volumes, &permutation);

        // Every valid internal node's bounds equal the union of its children.
        for node in bvh.nodes().iter().filter(|node| node.valid) {
            if let Some(first_child) = node.first_child {
                let children = bvh.nodes()[first_child]
                    .bounds
                    .union(&bvh.nodes()[first_child + 1].bounds);
                assert_eq!(node.bounds, children);
            }
        }

        // Exactly N valid leaves, bijectively mapped onto the input volumes.
        let mut seen = vec![false; count];
        let mut valid_leaves = 0;
        for (index, node) in bvh.nodes().iter().enumerate() {
            let is_leaf_slot = index >= bvh.nodes().len() / 2;
            if is_leaf_slot && node.valid {
                valid_leaves += 1;
                let original = node.volume.index();
                assert!(!seen[original]);
                seen[original] = true;
                assert_eq!(node.bounds, volumes[original].aabb);
            }
        }
        assert_eq!(valid_leaves, count);
    }
}

#[test]
fn volumes_outside_scene_bounds_still_collide() {
    // Clamped Morton keys degrade the sort, never the query.
    let volumes = [
        Volume::sphere(
            EntityId::from_index(0),
            EntityId::from_index(0),
            Vec3::new(40.0, -3.0, 12.0),
            1.0,
        ),
        Volume::sphere(
            EntityId::from_index(1),
            EntityId::from_index(1),
            Vec3::new(41.0, -3.0, 12.0),
            1.0,
        ),
        Volume::sphere(
            EntityId::from_index(2),
            EntityId::from_index(2),
            Vec3::new(-90.0, 50.0, 0.0),
            1.0,
        ),
    ];
    let pairs = BroadPhase::new(&SimulationConfig::default()).find_pairs(&volumes);
    assert_eq!(pairs.len(), 1);
    let pair = pairs[0];
    let found = [pair.volume_a.index(), pair.volume_b.index()];
    assert!(found.contains(&0) && found.contains(&1));
}
