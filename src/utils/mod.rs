//! Index helpers shared by the domain, commitment and FRI layers.

pub mod parallel;

pub use parallel::{parallelism_enabled, preferred_chunk_size, set_parallelism, ParallelismGuard};

/// Reverses the low `log_size` bits of `i`.
pub const fn bit_reverse_index(i: usize, log_size: u32) -> usize {
    if log_size == 0 {
        return i;
    }
    i.reverse_bits() >> (usize::BITS - log_size)
}

/// Permutes `values` into bit-reversed order in place.
///
/// The length must be a power of two; other lengths are left untouched and
/// reported as `false`.
pub fn bit_reverse<T>(values: &mut [T]) -> bool {
    let n = values.len();
    if !n.is_power_of_two() {
        return false;
    }
    let log_size = n.ilog2();
    for i in 0..n {
        let j = bit_reverse_index(i, log_size);
        if j > i {
            values.swap(i, j);
        }
    }
    true
}

/// Maps a position in a domain of size `2^log_size` onto the domain
/// `2^(log_size - shift)` whose points are the `2^shift`-fold doublings.
///
/// Both domains are in bit-reversed order, so the two halves of every
/// conjugate pair stay adjacent.
pub const fn lifted_index(position: usize, shift: u32) -> usize {
    if shift == 0 {
        return position;
    }
    ((position >> (shift + 1)) << 1) + (position & 1)
}

/// Returns `ceil(log2(n))`, with `0` for `n <= 1`.
pub fn log2_ceil(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}
