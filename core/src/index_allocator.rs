//! Generational free list over a bounded index space.
//!
//! [`IndexAllocator`] hands out `(index, generation)` pairs and validates them
//! later. It stores nothing else, which makes it usable both for
//! [`Registry`](crate::registry::Registry) (which keeps values beside it) and
//! for descriptor tables whose storage lives on the GPU.
//!
//! Freed indices are reused in FIFO order. A freed slot is handed out again
//! only after every index freed before it, so a slot has to cycle through the
//! whole free set 256 times before its 8-bit generation can repeat.

use std::collections::VecDeque;

/// Free list with a per-slot generation byte.
#[derive(Debug, Clone)]
pub struct IndexAllocator {
    generations: Vec<u8>,
    live: Vec<bool>,
    free: VecDeque<u32>,
}

impl IndexAllocator {
    /// Create an allocator for indices `0..capacity`, all free.
    pub fn new(capacity: u32) -> Self {
        Self {
            generations: vec![0; capacity as usize],
            live: vec![false; capacity as usize],
            free: (0..capacity).collect(),
        }
    }

    /// Total number of indices.
    pub fn capacity(&self) -> u32 {
        self.generations.len() as u32
    }

    /// Number of allocated indices.
    pub fn len(&self) -> u32 {
        self.capacity() - self.free.len() as u32
    }

    /// Returns true if nothing is allocated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of indices still available.
    pub fn available(&self) -> u32 {
        self.free.len() as u32
    }

    /// Take a free index. Returns `None` when the index space is exhausted.
    pub fn allocate(&mut self) -> Option<(u32, u8)> {
        let index = self.free.pop_front()?;
        self.live[index as usize] = true;
        Some((index, self.generations[index as usize]))
    }

    /// Release `index` if `generation` still matches.
    ///
    /// Bumps the slot's generation so every copy of the old pair becomes
    /// invalid. Returns false (and changes nothing) for a stale or
    /// out-of-range pair.
    pub fn free(&mut self, index: u32, generation: u8) -> bool {
        if !self.is_valid(index, generation) {
            return false;
        }
        let slot = index as usize;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.live[slot] = false;
        self.free.push_back(index);
        true
    }

    /// Returns true if `(index, generation)` names a live allocation.
    pub fn is_valid(&self, index: u32, generation: u8) -> bool {
        let slot = index as usize;
        slot < self.generations.len() && self.live[slot] && self.generations[slot] == generation
    }

    /// Current generation of a slot, live or not.
    pub fn generation(&self, index: u32) -> Option<u8> {
        self.generations.get(index as usize).copied()
    }

    /// Append `additional` fresh indices to the end of the index space.
    ///
    /// Existing allocations keep their indices and generations.
    pub fn grow(&mut self, additional: u32) {
        let start = self.capacity();
        let end = start + additional;
        self.generations.resize(end as usize, 0);
        self.live.resize(end as usize, false);
        self.free.extend(start..end);
    }

    /// Iterate over live `(index, generation)` pairs in index order.
    pub fn iter_live(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(|(index, _)| (index as u32, self.generations[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocates_in_index_order() {
        let mut allocator = IndexAllocator::new(4);
        assert_eq!(allocator.allocate(), Some((0, 0)));
        assert_eq!(allocator.allocate(), Some((1, 0)));
        assert_eq!(allocator.len(), 2);
        assert_eq!(allocator.available(), 2);
    }

    #[test]
    fn test_exhaustion_returns_none() {
        let mut allocator = IndexAllocator::new(1);
        assert!(allocator.allocate().is_some());
        assert_eq!(allocator.allocate(), None);
    }

    #[test]
    fn test_free_bumps_generation() {
        let mut allocator = IndexAllocator::new(2);
        let (index, generation) = allocator.allocate().unwrap();
        assert!(allocator.free(index, generation));
        assert!(!allocator.is_valid(index, generation));
        assert_eq!(allocator.generation(index), Some(generation + 1));
    }

    #[test]
    fn test_double_free_is_rejected() {
        let mut allocator = IndexAllocator::new(2);
        let (index, generation) = allocator.allocate().unwrap();
        assert!(allocator.free(index, generation));
        assert!(!allocator.free(index, generation));
        assert_eq!(allocator.available(), 2);
    }

    #[test]
    fn test_reuse_is_fifo() {
        let mut allocator = IndexAllocator::new(3);
        let a = allocator.allocate().unwrap();
        let b = allocator.allocate().unwrap();
        allocator.free(a.0, a.1);
        allocator.free(b.0, b.1);

        // Index 2 was never used and sits ahead of the freed ones.
        assert_eq!(allocator.allocate(), Some((2, 0)));
        assert_eq!(allocator.allocate(), Some((a.0, 1)));
        assert_eq!(allocator.allocate(), Some((b.0, 1)));
    }

    #[test]
    fn test_stale_pair_invalid_after_reuse() {
        let mut allocator = IndexAllocator::new(1);
        let old = allocator.allocate().unwrap();
        allocator.free(old.0, old.1);
        let new = allocator.allocate().unwrap();
        assert_eq!(old.0, new.0);
        assert!(!allocator.is_valid(old.0, old.1));
        assert!(allocator.is_valid(new.0, new.1));
    }

    #[test]
    fn test_generation_wraps() {
        let mut allocator = IndexAllocator::new(1);
        for _ in 0..256 {
            let (index, generation) = allocator.allocate().unwrap();
            allocator.free(index, generation);
        }
        assert_eq!(allocator.generation(0), Some(0));
    }

    #[test]
    fn test_grow_keeps_live_allocations() {
        let mut allocator = IndexAllocator::new(1);
        let first = allocator.allocate().unwrap();
        allocator.grow(2);
        assert_eq!(allocator.capacity(), 3);
        assert!(allocator.is_valid(first.0, first.1));
        assert_eq!(allocator.allocate(), Some((1, 0)));
        assert_eq!(allocator.iter_live().count(), 2);
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        let allocator = IndexAllocator::new(2);
        assert!(!allocator.is_valid(10, 0));
        assert_eq!(allocator.generation(10), None);
    }
}
