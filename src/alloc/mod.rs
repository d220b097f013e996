//! Pooled slot allocation.
//!
//! - `allocator`: slot handles and the shared error type
//! - `scatter`: the growing-pool allocator that backs [`PowerList`](crate::PowerList)

pub mod allocator;
pub mod scatter;

pub use allocator::{AllocError, SlotId, SlotRange};
pub use scatter::{ScatterAllocator, DEFAULT_STARTING_SIZE, POISON};
