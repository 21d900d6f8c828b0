//! Morton (Z-order) spatial keys for broad-phase sorting.

use glam::Vec3;

use crate::core::types::{Aabb, Volume};

/// Inserts two zero bits between every bit of the low 10 bits of `v`.
pub fn expand_bits(mut v: u32) -> u32 {
    v = v.wrapping_mul(0x0001_0001) & 0xFF00_00FF;
    v = v.wrapping_mul(0x0000_0101) & 0x0F00_F00F;
    v = v.wrapping_mul(0x0000_0011) & 0xC30C_30C3;
    v = v.wrapping_mul(0x0000_0005) & 0x4924_9249;
    v
}

/// 30-bit Morton code for a point in unit-cube coordinates.
///
/// Each axis is quantized to 10 bits (×1024, clamped to [0, 1023]) and the
/// three codes are interleaved x/y/z from the high bit down. Out-of-range
/// input clamps to the nearest cell; the caller guarantees the working volume
/// is finite.
pub fn morton_key(unit_point: Vec3) -> u32 {
    let x = (unit_point.x * 1024.0).clamp(0.0, 1023.0);
    let y = (unit_point.y * 1024.0).clamp(0.0, 1023.0);
    let z = (unit_point.z * 1024.0).clamp(0.0, 1023.0);
    let xx = expand_bits(x as u32);
    let yy = expand_bits(y as u32);
    let zz = expand_bits(z as u32);
    (xx << 2) | (yy << 1) | zz
}

/// Computes one spatial key per volume from its AABB center, normalizing the
/// configured scene bounds onto the unit cube first.
#[derive(Debug, Clone, Copy)]
pub struct SpatialKeyBuilder {
    origin: Vec3,
    inv_extent: Vec3,
}

impl SpatialKeyBuilder {
    pub fn new(scene_bounds: Aabb) -> Self {
        let extent = (scene_bounds.max - scene_bounds.min).max(Vec3::splat(f32::EPSILON));
        Self {
            origin: scene_bounds.min,
            inv_extent: extent.recip(),
        }
    }

    pub fn key_for_center(&self, center: Vec3) -> u32 {
        morton_key((center - self.origin) * self.inv_extent)
    }

    /// One key per volume, same order as the input.
    pub fn build_keys(&self, volumes: &[Volume], out: &mut Vec<u32>) {
        out.clear();
        out.extend(
            volumes
                .iter()
                .map(|volume| self.key_for_center(volume.aabb.center())),
        );
    }
}
