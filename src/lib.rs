//! # `powerlist` - Sorted Lists over Scattered Slot Pools
//!
//! A sorted singly linked list that accelerates lookups with skip links, together with
//! the slot allocator its nodes live in.
//!
//! ## Key Features
//!
//! - **Lazy balancing**: mutations only mark the list dirty; skip links are rebuilt in a
//!   single linear pass, on request or while iterating with [`PowerList::rebalancing_iter`]
//! - **Scatter allocation**: one request may be satisfied by several disjoint slot ranges,
//!   so freed holes are refilled before new memory is reserved
//! - **Checked links**: nodes reference each other by generation-tagged slot ids, so a
//!   stale skip link or cursor is detected instead of followed
//!
//! ## Architecture
//!
//! ### Core Abstractions
//!
//! 1. **Scatter Allocator** (`ScatterAllocator<T, START>`):
//!    - Ordered pools of uninitialised slots
//!    - LIFO free list of released ranges, reused before any bump allocation
//!    - Per-slot generation counters; odd means live
//!
//! 2. **Power List** (`PowerList<T>`):
//!    - Sequential links for order, skip links for speed
//!    - The head's skip link always references the tail
//!    - Detached [`Cursor`] handles for positions
//!
//! ## Example
//!
//! ```rust
//! use powerlist::PowerList;
//!
//! let mut list = PowerList::from_sorted([1, 3, 5, 7]).unwrap();
//! list.insert(4);
//! assert!(list.needs_rebalance());
//!
//! list.rebalance();
//! assert!(list.contains(&4));
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7]);
//! ```
//!
//! ## Features
//!
//! - `tracing`: emits allocator growth and rebalance events through the `tracing` crate
//! - `proptest`: exposes [`strategy`] helpers for property tests in dependent crates

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

/// Emits a `tracing` event when the `tracing` feature is enabled; expands to nothing otherwise.
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::$level!($($arg)+);
        }
    };
}

pub mod alloc;
pub mod collections;
#[cfg(feature = "proptest")]
pub mod strategy;

pub use alloc::{AllocError, ScatterAllocator, SlotId, SlotRange};
pub use collections::{Cursor, PowerList, UnsortedInput};

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // Slot handles are two packed `u32`s.
    assert!(mem::size_of::<SlotId>() == 8);
    assert!(mem::size_of::<SlotRange>() == 12);

    // A cursor is two optional generation-tagged links.
    assert!(mem::size_of::<Cursor>() <= 48);

    // The list header does not grow with the element type.
    assert!(mem::size_of::<PowerList<u8>>() == mem::size_of::<PowerList<[u64; 8]>>());
};
