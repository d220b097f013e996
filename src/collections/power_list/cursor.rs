//! Detached positions inside a [`PowerList`](super::PowerList).

use crate::collections::power_list::node::Link;

/// A position inside a `PowerList`, as returned by `find` and `lower_bound`.
///
/// A cursor does not borrow the list; it records the node and its predecessor together
/// with their slot generations. After the node is removed the cursor is *stale*:
/// [`PowerList::get`](super::PowerList::get) returns `None` for it and
/// [`PowerList::erase`](super::PowerList::erase) panics. A stale cursor is never
/// dereferenced.
///
/// Two cursors are equal when they reference the same node; all end cursors are equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    pub(crate) node: Option<Link>,
    pub(crate) prev: Option<Link>,
}

impl Cursor {
    /// The past-the-end cursor.
    pub const fn end() -> Self {
        Self { node: None, prev: None }
    }

    /// Returns `true` if the cursor references no node.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for Cursor {}
