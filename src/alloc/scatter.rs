//! `ScatterAllocator` - a pooled slot allocator that may scatter one request over many ranges.
//!
//! Storage comes from a chain of growing pools. A request for `n` slots is served by
//! first draining the free list of previously released ranges (most recently released
//! first), then bump-allocating from the pools (most recently created first), and only
//! then by adding a new pool twice the size of the last one. A single request can
//! therefore produce several contiguous ranges; each one is reported through a callback.
//!
//! The allocator never constructs or drops values. Slots are `MaybeUninit<T>`; callers
//! write values after allocating and drop them before deallocating.
//!
//! # Liveness
//! Every slot carries a generation counter that is bumped when the slot is handed out
//! and again when it is released, so odd generations mark live slots. Holders of a
//! `SlotId` can record the generation they saw and later check it, which turns a stale
//! reference into a detectable condition instead of a use-after-free.
//!
//! Not thread safe: every mutating operation takes `&mut self`.

use core::fmt;
use core::mem::MaybeUninit;
use core::ptr;
use std::alloc::{handle_alloc_error, Layout};

use crate::alloc::allocator::{AllocError, SlotId, SlotRange};

/// Minimum size of the first pool when no starting size is given.
pub const DEFAULT_STARTING_SIZE: usize = 16;

/// Byte pattern written over released slots.
pub const POISON: u8 = 0xEE;

/// Largest pool the slot addressing scheme can describe.
const MAX_POOL_SLOTS: usize = 1 << 31;

/// A contiguous, bump-allocated block of slots.
struct Pool<T> {
    slots: Box<[MaybeUninit<T>]>,
    generations: Box<[u64]>,
    next_available: usize,
}

impl<T> Pool<T> {
    fn try_new(capacity: usize) -> Result<Self, AllocError> {
        if capacity > MAX_POOL_SLOTS {
            return Err(AllocError::CapacityOverflow);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError::OutOfMemory { slots: capacity })?;
        slots.resize_with(capacity, MaybeUninit::uninit);

        let mut generations = Vec::new();
        generations
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError::OutOfMemory { slots: capacity })?;
        generations.resize(capacity, 0);

        Ok(Self {
            slots: slots.into_boxed_slice(),
            generations: generations.into_boxed_slice(),
            next_available: 0,
        })
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.capacity() - self.next_available
    }
}

/// A pooled allocator of `T`-sized slots.
///
/// `START` is the minimum size of the first pool and must be non-zero.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `allocate_with_callback(n)` | \(O(n + p)\) | `p` = number of pools, \(O(\log n)\) |
/// | `allocate_one` | \(O(p)\) amortized | usually served by the free list |
/// | `deallocate(r)` | \(O(\lvert r \rvert)\) | slots are poisoned |
/// | `get` / `generation` | \(O(1)\) | |
pub struct ScatterAllocator<T, const START: usize = DEFAULT_STARTING_SIZE> {
    pools: Vec<Pool<T>>,
    /// Released ranges; the most recently released range is at the end.
    free_list: Vec<SlotRange>,
    free_slots: usize,
}

impl<T, const START: usize> ScatterAllocator<T, START> {
    const VALID_START: () = assert!(START > 0, "starting pool size must be non-zero");

    /// Creates an allocator with no pools.
    pub fn new() -> Self {
        let () = Self::VALID_START;
        Self {
            pools: Vec::new(),
            free_list: Vec::new(),
            free_slots: 0,
        }
    }

    /// Creates an allocator whose first pool can hold at least `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut alloc = Self::new();
        if capacity > 0 {
            if let Err(err) = alloc.grow(capacity) {
                Self::fail(capacity, err);
            }
        }
        alloc
    }

    /// Allocates `count` slots, returning every range that was produced.
    ///
    /// The range sizes sum to exactly `count`.
    pub fn allocate(&mut self, count: usize) -> Vec<SlotRange> {
        let mut ranges = Vec::new();
        self.allocate_with_callback(count, |range| ranges.push(range));
        ranges
    }

    /// Allocates a single slot.
    ///
    /// # Panics
    /// Panics if the request is not satisfied by exactly one range of one slot.
    pub fn allocate_one(&mut self) -> SlotId {
        let mut slot = None;
        self.allocate_with_callback(1, |range| {
            assert!(
                slot.is_none() && range.len() == 1,
                "single-slot request produced an unexpected range of {} slots",
                range.len()
            );
            slot = range.first();
        });
        slot.unwrap_or_else(|| unreachable!("single-slot request produced no range"))
    }

    /// Allocates `count` slots, invoking `callback` once per contiguous range.
    ///
    /// Aborts through [`handle_alloc_error`] if a new pool cannot be obtained.
    pub fn allocate_with_callback<F>(&mut self, count: usize, callback: F)
    where
        F: FnMut(SlotRange),
    {
        if let Err(err) = self.try_allocate_with_callback(count, callback) {
            Self::fail(count, err);
        }
    }

    /// Fallible form of [`allocate_with_callback`](Self::allocate_with_callback).
    ///
    /// Any pool growth happens before the first callback, so on error no range has been
    /// reported and the allocator is unchanged.
    ///
    /// # Errors
    /// Returns `OutOfMemory` if the backing memory source fails, or `CapacityOverflow`
    /// if the request cannot be described by a single pool.
    pub fn try_allocate_with_callback<F>(&mut self, count: usize, mut callback: F) -> Result<(), AllocError>
    where
        F: FnMut(SlotRange),
    {
        if count == 0 {
            return Ok(());
        }

        let existing = self.pools.len();
        let in_pools: usize = self.pools.iter().map(Pool::remaining).sum();
        let covered = self.free_slots.saturating_add(in_pools);
        if covered < count {
            self.grow(count - covered)?;
        }

        let mut remaining = count;

        // Released ranges first, newest release first.
        while remaining > 0 {
            let Some(block) = self.free_list.last_mut() else {
                break;
            };
            let take = remaining.min(block.len());
            let range = SlotRange::new(block.pool(), block.start(), take);
            if take == block.len() {
                self.free_list.pop();
            } else {
                // Exactly `take` slots leave the block; the rest stays reusable.
                block.start += take as u32;
                block.len -= take as u32;
            }
            self.free_slots -= take;
            remaining -= take;
            self.hand_out(range);
            callback(range);
        }

        // Then pool tails, most recent pool first. A pool added above comes last.
        let order = (0..existing).rev().chain(existing..self.pools.len());
        for pool_index in order {
            if remaining == 0 {
                break;
            }
            let pool = &mut self.pools[pool_index];
            let take = remaining.min(pool.remaining());
            if take == 0 {
                continue;
            }
            let range = SlotRange::new(pool_index, pool.next_available, take);
            pool.next_available += take;
            remaining -= take;
            self.hand_out(range);
            callback(range);
        }

        debug_assert_eq!(remaining, 0, "pool growth did not cover the request");
        Ok(())
    }

    /// Releases a range previously returned by this allocator.
    ///
    /// Any values in the range must already have been dropped. The slots are
    /// overwritten with [`POISON`] and the range is pushed onto the free list.
    ///
    /// # Panics
    /// Panics if the range was not handed out by this allocator or is already released.
    pub fn deallocate(&mut self, range: SlotRange) {
        if let Err(err) = self.try_deallocate(range) {
            panic!("invalid range passed to deallocate(): {err}");
        }
    }

    /// Fallible form of [`deallocate`](Self::deallocate). Releasing an empty range is a no-op.
    ///
    /// # Errors
    /// Returns `ForeignRange` if the range is not inside handed-out pool memory, or
    /// `DoubleFree` if any slot of the range is already released. The allocator is
    /// unchanged on error.
    pub fn try_deallocate(&mut self, range: SlotRange) -> Result<(), AllocError> {
        if range.is_empty() {
            return Ok(());
        }

        let pool = self.pools.get_mut(range.pool()).ok_or(AllocError::ForeignRange)?;
        if range.end() > pool.next_available {
            return Err(AllocError::ForeignRange);
        }

        let generations = &mut pool.generations[range.start()..range.end()];
        if generations.iter().any(|generation| generation % 2 == 0) {
            return Err(AllocError::DoubleFree);
        }
        for generation in generations {
            *generation += 1;
        }

        for slot in &mut pool.slots[range.start()..range.end()] {
            // SAFETY: the caller dropped the slot's value; a `MaybeUninit` may hold any bytes.
            unsafe { ptr::write_bytes(slot.as_mut_ptr(), POISON, 1) };
        }

        self.free_list.push(range);
        self.free_slots += range.len();
        Ok(())
    }

    /// Returns the slot behind `id`, or `None` if no pool covers it.
    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&MaybeUninit<T>> {
        self.pools.get(id.pool())?.slots.get(id.index())
    }

    /// Returns the slot behind `id` mutably, or `None` if no pool covers it.
    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut MaybeUninit<T>> {
        self.pools.get_mut(id.pool())?.slots.get_mut(id.index())
    }

    /// Returns the slots of `range` as a mutable slice, or `None` if no pool covers it.
    pub fn slots_mut(&mut self, range: SlotRange) -> Option<&mut [MaybeUninit<T>]> {
        self.pools.get_mut(range.pool())?.slots.get_mut(range.start()..range.end())
    }

    /// Returns the slot behind `id` without bounds checks.
    ///
    /// # Safety
    /// `id` must have been handed out by this allocator.
    #[inline]
    pub(crate) unsafe fn get_unchecked(&self, id: SlotId) -> &MaybeUninit<T> {
        self.pools.get_unchecked(id.pool()).slots.get_unchecked(id.index())
    }

    /// Mutable counterpart of [`get_unchecked`](Self::get_unchecked).
    ///
    /// # Safety
    /// `id` must have been handed out by this allocator.
    #[inline]
    pub(crate) unsafe fn get_unchecked_mut(&mut self, id: SlotId) -> &mut MaybeUninit<T> {
        self.pools.get_unchecked_mut(id.pool()).slots.get_unchecked_mut(id.index())
    }

    /// Current generation of the slot behind `id`. Odd generations are live.
    ///
    /// Generations are 64-bit and only ever grow, so a released slot never repeats a
    /// generation it has already handed out.
    #[inline]
    pub fn generation(&self, id: SlotId) -> Option<u64> {
        self.pools.get(id.pool())?.generations.get(id.index()).copied()
    }

    /// Overwrites the generation of a released slot.
    #[cfg(test)]
    pub(crate) fn set_generation(&mut self, id: SlotId, generation: u64) {
        debug_assert!(generation % 2 == 0 && !self.is_live(id), "only released slots may be rewound");
        self.pools[id.pool()].generations[id.index()] = generation;
    }

    /// Returns `true` if the slot is currently handed out.
    #[inline]
    pub fn is_live(&self, id: SlotId) -> bool {
        self.generation(id).is_some_and(|generation| generation % 2 == 1)
    }

    /// Number of pools created so far.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Total number of slots across all pools.
    pub fn capacity(&self) -> usize {
        self.pools.iter().map(Pool::capacity).sum()
    }

    /// Number of released slots waiting in the free list.
    pub fn free_slots(&self) -> usize {
        self.free_slots
    }

    /// Slots that can be handed out without creating a new pool.
    pub fn available(&self) -> usize {
        self.free_slots + self.pools.iter().map(Pool::remaining).sum::<usize>()
    }

    fn hand_out(&mut self, range: SlotRange) {
        let pool = &mut self.pools[range.pool()];
        for generation in &mut pool.generations[range.start()..range.end()] {
            debug_assert!(*generation % 2 == 0, "slot handed out twice");
            *generation += 1;
        }
    }

    /// Adds a pool able to hold at least `shortfall` slots.
    fn grow(&mut self, shortfall: usize) -> Result<(), AllocError> {
        let doubled = self.pools.last().and_then(|pool| pool.capacity().checked_mul(2));
        let size = match doubled {
            Some(size) if size >= shortfall && size <= MAX_POOL_SLOTS => size,
            _ => shortfall
                .checked_next_power_of_two()
                .ok_or(AllocError::CapacityOverflow)?
                .max(START),
        };
        if self.pools.len() >= u32::MAX as usize {
            return Err(AllocError::CapacityOverflow);
        }

        let pool = Pool::try_new(size)?;
        trace_event!(debug, pool = self.pools.len(), slots = size, shortfall, "scatter allocator grew");
        self.pools.push(pool);
        Ok(())
    }

    fn fail(count: usize, err: AllocError) -> ! {
        if let AllocError::OutOfMemory { slots } = err {
            if let Ok(layout) = Layout::array::<T>(slots) {
                handle_alloc_error(layout);
            }
        }
        panic!("scatter allocation of {count} slots failed: {err}");
    }
}

impl<T, const START: usize> Default for ScatterAllocator<T, START> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const START: usize> fmt::Debug for ScatterAllocator<T, START> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScatterAllocator")
            .field("pools", &self.pools.len())
            .field("capacity", &self.capacity())
            .field("free_slots", &self.free_slots)
            .field("free_blocks", &self.free_list.len())
            .finish()
    }
}
