// ABOUTME: Sequence number allocation for request/response correlation
// ABOUTME: One generator per client instance; wraps on overflow, duplicates are caught by the table

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomically incrementing 64-bit sequence allocator.
///
/// A single `Client` owns one of these. Collisions against outstanding
/// entries after a wraparound are vanishingly unlikely and are caught by
/// `PendingTable::insert`'s duplicate check rather than prevented here.
#[derive(Debug)]
pub struct SequenceGenerator {
    next: AtomicU64,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        SequenceGenerator {
            next: AtomicU64::new(1),
        }
    }

    pub fn starting_at(seed: u64) -> Self {
        SequenceGenerator {
            next: AtomicU64::new(seed),
        }
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_strictly_increasing_sequences() {
        let gen = SequenceGenerator::new();
        let a = gen.next();
        let b = gen.next();
        let c = gen.next();
        assert!(a < b && b < c);
    }

    #[test]
    fn wraps_on_overflow_instead_of_panicking() {
        let gen = SequenceGenerator::starting_at(u64::MAX);
        let last = gen.next();
        let wrapped = gen.next();
        assert_eq!(last, u64::MAX);
        assert_eq!(wrapped, 0);
    }
}
