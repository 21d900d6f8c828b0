//! Least-significant-bit radix sort producing a permutation of volume indices.

/// Number of bit planes processed per sort. Spatial keys are 30 bits wide;
/// the sweep runs one extra plane, which is a no-op on the data but keeps the
/// final ping-pong buffer parity fixed.
pub const SORT_BIT_PLANES: u32 = 31;

/// Which of the two ping-pong buffer pairs holds the latest pass result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ActiveBuffer {
    #[default]
    A,
    B,
}

/// Ascending LSB-first radix sorter over spatial keys.
///
/// Double-buffered: each bit-plane pass scatters keys and their original
/// indices from the current buffer pair into the other, using a stable
/// two-bucket counting pass. The permutation therefore stays a bijection
/// over `[0, N)` after every pass. O(31·N), no comparisons.
///
/// Buffers are retained across steps as scratch capacity.
#[derive(Debug, Default)]
pub struct IndexedRadixSorter {
    keys_a: Vec<u32>,
    keys_b: Vec<u32>,
    perm_a: Vec<usize>,
    perm_b: Vec<usize>,
    bit_values: Vec<u32>,
    offsets: Vec<usize>,
    active: ActiveBuffer,
}

impl IndexedRadixSorter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts `keys` ascending. Results are read back through [`Self::keys`]
    /// and [`Self::permutation`].
    pub fn sort(&mut self, keys: &[u32]) {
        let n = keys.len();

        self.keys_a.clear();
        self.keys_a.extend_from_slice(keys);
        self.keys_b.clear();
        self.keys_b.resize(n, 0);
        self.perm_a.clear();
        self.perm_a.extend(0..n);
        self.perm_b.clear();
        self.perm_b.resize(n, 0);
        self.bit_values.clear();
        self.bit_values.resize(n, 0);
        self.offsets.clear();
        self.offsets.resize(n, 0);

        self.active = ActiveBuffer::A;
        if n < 2 {
            return;
        }

        for bit_position in 0..SORT_BIT_PLANES {
            let even_pass = bit_position % 2 == 0;
            if even_pass {
                scatter_pass(
                    bit_position,
                    &self.keys_a,
                    &self.perm_a,
                    &mut self.keys_b,
                    &mut self.perm_b,
                    &mut self.bit_values,
                    &mut self.offsets,
                );
            } else {
                scatter_pass(
                    bit_position,
                    &self.keys_b,
                    &self.perm_b,
                    &mut self.keys_a,
                    &mut self.perm_a,
                    &mut self.bit_values,
                    &mut self.offsets,
                );
            }
            self.active = if even_pass {
                ActiveBuffer::B
            } else {
                ActiveBuffer::A
            };
        }
    }

    /// The sorted keys from the last [`Self::sort`] call.
    pub fn keys(&self) -> &[u32] {
        match self.active {
            ActiveBuffer::A => &self.keys_a,
            ActiveBuffer::B => &self.keys_b,
        }
    }

    /// Maps sorted rank to the original index of the key that landed there.
    pub fn permutation(&self) -> &[usize] {
        match self.active {
            ActiveBuffer::A => &self.perm_a,
            ActiveBuffer::B => &self.perm_b,
        }
    }
}

/// One stable counting-sort pass over a single bit plane.
fn scatter_pass(
    bit_position: u32,
    src_keys: &[u32],
    src_perm: &[usize],
    dst_keys: &mut [u32],
    dst_perm: &mut [usize],
    bit_values: &mut [u32],
    offsets: &mut [usize],
) {
    // Bucket histogram: running 0-based rank within each bucket.
    let mut zeroes_count = 0usize;
    let mut ones_count = 0usize;
    for (i, &key) in src_keys.iter().enumerate() {
        let bit = (key >> bit_position) & 1;
        bit_values[i] = bit;
        if bit == 0 {
            offsets[i] = zeroes_count;
            zeroes_count += 1;
        } else {
            offsets[i] = ones_count;
            ones_count += 1;
        }
    }

    // Prefix: bucket 0 starts at 0, bucket 1 after all zero-bit keys.
    let ones_prefix = zeroes_count;

    for i in 0..src_keys.len() {
        let dst = if bit_values[i] == 0 {
            offsets[i]
        } else {
            ones_prefix + offsets[i]
        };
        dst_keys[dst] = src_keys[i];
        dst_perm[dst] = src_perm[i];
    }
}
