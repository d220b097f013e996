//! Slot handles and the allocation error type shared by the pooled allocators.
//!
//! Storage is addressed by `(pool, index)` pairs rather than raw pointers. A pool is
//! never moved or shrunk while its allocator lives, so a `SlotId` stays meaningful for
//! the allocator's whole lifetime; whether the slot is *live* is a separate question
//! answered by the allocator's generation counters.

use core::fmt;

/// Identifies a single storage slot inside a pooled allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId {
    pub(crate) pool: u32,
    pub(crate) index: u32,
}

impl SlotId {
    /// The pool this slot lives in. Pools are numbered in creation order.
    #[inline]
    pub fn pool(&self) -> usize {
        self.pool as usize
    }

    /// The offset of this slot inside its pool.
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// A contiguous run of slots inside a single pool.
///
/// This is the unit handed out by [`ScatterAllocator`](super::ScatterAllocator): one
/// logical request may be satisfied by several ranges, each of which is contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRange {
    pub(crate) pool: u32,
    pub(crate) start: u32,
    pub(crate) len: u32,
}

impl SlotRange {
    pub(crate) fn new(pool: usize, start: usize, len: usize) -> Self {
        debug_assert!(start + len <= u32::MAX as usize);
        Self {
            pool: pool as u32,
            start: start as u32,
            len: len as u32,
        }
    }

    /// The pool this range lives in.
    #[inline]
    pub fn pool(&self) -> usize {
        self.pool as usize
    }

    /// Offset of the first slot inside the pool.
    #[inline]
    pub fn start(&self) -> usize {
        self.start as usize
    }

    /// Number of slots in the range.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` if the range covers no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last slot offset.
    #[inline]
    pub fn end(&self) -> usize {
        self.start() + self.len()
    }

    /// The first slot of the range, if any.
    #[inline]
    pub fn first(&self) -> Option<SlotId> {
        if self.is_empty() {
            None
        } else {
            Some(SlotId { pool: self.pool, index: self.start })
        }
    }

    /// Returns `true` if `id` lies inside this range.
    #[inline]
    pub fn contains(&self, id: SlotId) -> bool {
        id.pool == self.pool && id.index >= self.start && id.index - self.start < self.len
    }

    /// Returns the sub-range starting `offset` slots in and covering `len` slots.
    ///
    /// Returns `None` if the sub-range would extend past the end of `self`.
    pub fn subrange(&self, offset: usize, len: usize) -> Option<SlotRange> {
        let end = offset.checked_add(len)?;
        if end > self.len() {
            return None;
        }
        Some(SlotRange::new(self.pool(), self.start() + offset, len))
    }

    /// Iterates the ids of every slot in the range, in address order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = SlotId> + DoubleEndedIterator {
        let pool = self.pool;
        (self.start..self.start + self.len).map(move |index| SlotId { pool, index })
    }
}

impl From<SlotId> for SlotRange {
    fn from(id: SlotId) -> Self {
        Self { pool: id.pool, start: id.index, len: 1 }
    }
}

/// The error type for pooled allocation and release failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The backing memory source could not supply a new pool of `slots` slots.
    OutOfMemory {
        /// Size of the pool that could not be created.
        slots: usize,
    },
    /// The requested pool size does not fit the slot addressing scheme.
    CapacityOverflow,
    /// A released range does not lie inside memory handed out by this allocator.
    ForeignRange,
    /// A released range contains a slot that is already free.
    DoubleFree,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::OutOfMemory { slots } => {
                write!(f, "memory allocation failed for a pool of {slots} slots")
            }
            AllocError::CapacityOverflow => f.write_str("pool capacity overflow"),
            AllocError::ForeignRange => {
                f.write_str("range was not handed out by this allocator")
            }
            AllocError::DoubleFree => f.write_str("range contains an already released slot"),
        }
    }
}

impl std::error::Error for AllocError {}
