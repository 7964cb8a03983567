//! Runtime switch for the rayon-backed hot paths.
//!
//! With the `parallel` feature compiled in, Merkle layer hashing, column
//! extension, quotient accumulation and grinding fan out over the rayon pool
//! unless parallelism was turned off through [`set_parallelism`]. Results are
//! identical either way.

#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
static PARALLEL_ENABLED: AtomicBool = AtomicBool::new(true);

/// Minimum number of items handed to a rayon task.
const DEFAULT_CHUNK_SIZE: usize = 64;

/// Preferred minimum split length for `total_items` work items.
pub fn preferred_chunk_size(total_items: usize) -> usize {
    if total_items == 0 {
        1
    } else {
        DEFAULT_CHUNK_SIZE.min(total_items)
    }
}

#[cfg(feature = "parallel")]
pub fn parallelism_enabled() -> bool {
    PARALLEL_ENABLED.load(Ordering::SeqCst)
}

#[cfg(not(feature = "parallel"))]
pub fn parallelism_enabled() -> bool {
    false
}

/// Overrides the switch until the returned guard is dropped.
#[cfg(feature = "parallel")]
pub fn set_parallelism(enabled: bool) -> ParallelismGuard {
    let previous = PARALLEL_ENABLED.swap(enabled, Ordering::SeqCst);
    ParallelismGuard { previous }
}

#[cfg(not(feature = "parallel"))]
pub fn set_parallelism(_enabled: bool) -> ParallelismGuard {
    ParallelismGuard {}
}

/// Restores the previous parallelism setting on drop.
pub struct ParallelismGuard {
    #[cfg(feature = "parallel")]
    previous: bool,
}

#[cfg(feature = "parallel")]
impl Drop for ParallelismGuard {
    fn drop(&mut self) {
        PARALLEL_ENABLED.store(self.previous, Ordering::SeqCst);
    }
}

#[cfg(not(feature = "parallel"))]
impl Drop for ParallelismGuard {
    fn drop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_is_bounded() {
        assert_eq!(preferred_chunk_size(0), 1);
        assert_eq!(preferred_chunk_size(10), 10);
        assert_eq!(preferred_chunk_size(1 << 20), DEFAULT_CHUNK_SIZE);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn guard_restores_previous_setting() {
        let before = parallelism_enabled();
        {
            let _guard = set_parallelism(!before);
            assert_eq!(parallelism_enabled(), !before);
        }
        assert_eq!(parallelism_enabled(), before);
    }
}
