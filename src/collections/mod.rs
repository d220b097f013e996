//! Collections built on the scatter allocator.
//!
//! - `power_list`: sorted list with lazily rebuilt skip links

pub mod power_list;

pub use power_list::{Cursor, PowerList, UnsortedInput};
