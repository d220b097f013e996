//! `PowerList` - a sorted singly linked list with lazily rebuilt skip links.
//!
//! Every node carries a sequential link (next in sort order) and a skip link that jumps
//! over a block of nodes. The head's skip link always references the tail, which makes
//! `back` O(1) and gives lookups a cheap out-of-range rejection.
//!
//! Skip links are not maintained on every mutation the way a balanced tree maintains its
//! shape. Mutations only mark the list dirty; the links are rebuilt in one linear pass
//! when the caller asks for it, either explicitly through [`PowerList::rebalance`] or as
//! a side effect of a full [`PowerList::rebalancing_iter`] walk. Lookups use whatever
//! links exist and never trust a stale one, so staleness costs speed, never correctness.
//!
//! Nodes live in a [`ScatterAllocator`](crate::alloc::ScatterAllocator) owned by the list
//! and reference each other by generation-checked slot ids instead of pointers.
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `from_sorted` / `assign_range` | \(O(n)\) | built and balanced in one pass |
//! | `insert` | \(O(1)\) at either end, lookup cost otherwise | marks dirty |
//! | `find` / `lower_bound` | \(O(\log n)\) expected when clean | sequential fallback when dirty |
//! | `remove` | lookup cost | marks dirty |
//! | `front` / `back` / `len` | \(O(1)\) | |
//! | `rebalance` | \(O(n)\) | no-op when clean |

mod cursor;
mod iter;
mod node;
mod rebalance;
mod serde_impl;


use core::fmt;
use core::ops::Index;

use crate::alloc::SlotId;

pub use cursor::Cursor;
pub use iter::{IntoIter, Iter, RebalancingIter};

use node::NodeStore;
use rebalance::Rebalancer;

/// Error returned when bulk-building from input that is not sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsortedInput {
    index: usize,
}

impl UnsortedInput {
    /// Position of the first element that is less than its predecessor.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for UnsortedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input is not sorted: element {} is less than its predecessor", self.index)
    }
}

impl std::error::Error for UnsortedInput {}

/// A sorted list with skip-assisted lookup.
///
/// Duplicates are allowed; equal elements keep no particular relative order.
pub struct PowerList<T> {
    head: Option<SlotId>,
    len: usize,
    needs_rebalance: bool,
    nodes: NodeStore<T>,
}

impl<T> PowerList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            head: None,
            len: 0,
            needs_rebalance: false,
            nodes: NodeStore::new(),
        }
    }

    /// Creates an empty list whose node storage can hold `capacity` elements up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            head: None,
            len: 0,
            needs_rebalance: false,
            nodes: NodeStore::with_capacity(capacity),
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the number of node slots currently reserved from the allocator.
    pub fn capacity(&self) -> usize {
        self.nodes.allocator().capacity()
    }

    /// Returns `true` if the skip links may be stale.
    #[inline]
    pub fn needs_rebalance(&self) -> bool {
        self.needs_rebalance
    }

    /// Returns the smallest element.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.head.map(|head| &self.nodes.get(head).value)
    }

    /// Returns the largest element.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.tail().map(|tail| &self.nodes.get(tail).value)
    }

    /// Returns the element at `cursor`, or `None` for an end or stale cursor.
    pub fn get(&self, cursor: Cursor) -> Option<&T> {
        let id = self.nodes.resolve(cursor.node?)?;
        Some(&self.nodes.get(id).value)
    }

    /// Returns the cursor following `cursor`. Stepping an end or stale cursor yields the end.
    pub fn successor(&self, cursor: Cursor) -> Cursor {
        let Some(id) = cursor.node.and_then(|link| self.nodes.resolve(link)) else {
            return Cursor::end();
        };
        match self.nodes.get(id).next {
            Some(next) => self.cursor(Some(id), next),
            None => Cursor {
                node: None,
                prev: Some(self.nodes.link(id)),
            },
        }
    }

    /// Removes the element at `cursor` and returns it. An end cursor removes nothing.
    ///
    /// # Panics
    /// Panics if the cursor is stale: its node was removed, or its predecessor no longer
    /// links to it.
    pub fn erase(&mut self, cursor: Cursor) -> Option<T> {
        cursor.node?;
        let Some((id, prev)) = self.validate(cursor) else {
            panic!("stale cursor passed to erase()");
        };

        let next = self.nodes.get(id).next;
        match prev {
            None => {
                // The successor becomes head and inherits the reference to the tail.
                if let Some(next) = next {
                    let tail = self.nodes.get(id).skip.get();
                    self.nodes.get(next).skip.set(tail);
                }
                self.head = next;
            }
            Some(prev) => {
                if next.is_none() {
                    if let Some(head) = self.head {
                        self.nodes.set_skip(head, prev);
                    }
                }
                self.nodes.get_mut(prev).next = next;
            }
        }

        self.len -= 1;
        self.needs_rebalance = true;
        Some(self.nodes.take(id))
    }

    /// Removes and returns the smallest element.
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        let cursor = self.cursor(None, head);
        self.erase(cursor)
    }

    /// Rebuilds the skip links if they are stale. Does nothing on a clean list.
    pub fn rebalance(&mut self) {
        if !self.needs_rebalance {
            return;
        }
        if let Some(head) = self.head {
            Rebalancer::new(&self.nodes, head, self.len).finish(&self.nodes);
        }
        self.needs_rebalance = false;
    }

    /// Removes every element and releases the node storage.
    pub fn clear(&mut self) {
        self.nodes.drop_chain(self.head.take());
        self.nodes = NodeStore::new();
        self.len = 0;
        self.needs_rebalance = false;
    }

    /// Returns a read-only iterator over the elements in sorted order.
    ///
    /// Plain iteration has no side effects; the skip links stay as they are.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.nodes, self.head, self.len)
    }

    /// Returns an iterator that rebuilds stale skip links while it walks the list.
    ///
    /// On a clean list this behaves like [`iter`](Self::iter).
    pub fn rebalancing_iter(&mut self) -> RebalancingIter<'_, T> {
        let rebalancer = match self.head {
            Some(head) if self.needs_rebalance => Some(Rebalancer::new(&self.nodes, head, self.len)),
            _ => None,
        };
        RebalancingIter::new(
            Iter::new(&self.nodes, self.head, self.len),
            rebalancer,
            &mut self.needs_rebalance,
        )
    }

    #[inline]
    fn tail(&self) -> Option<SlotId> {
        let head = self.head?;
        let tail = self.nodes.get(head).skip.get().map(|link| link.id);
        debug_assert!(tail.is_some(), "head lost its reference to the tail");
        tail
    }

    fn cursor(&self, prev: Option<SlotId>, node: SlotId) -> Cursor {
        Cursor {
            node: Some(self.nodes.link(node)),
            prev: prev.map(|prev| self.nodes.link(prev)),
        }
    }

    /// Resolves a cursor into `(node, predecessor)` if it still describes the chain.
    fn validate(&self, cursor: Cursor) -> Option<(SlotId, Option<SlotId>)> {
        let id = self.nodes.resolve(cursor.node?)?;
        match cursor.prev {
            None => (self.head == Some(id)).then_some((id, None)),
            Some(prev) => {
                let prev = self.nodes.resolve(prev)?;
                (self.nodes.get(prev).next == Some(id)).then_some((id, Some(prev)))
            }
        }
    }

    /// Replaces the contents with already sorted values and balances them.
    fn build(&mut self, values: Vec<T>) {
        if !self.is_empty() {
            self.clear();
        }
        let len = values.len();
        let Some((head, tail)) = self.nodes.build(values) else {
            return;
        };
        debug_assert_eq!(self.nodes.skip_target(head), Some(tail));
        self.head = Some(head);
        self.len = len;
        self.needs_rebalance = false;
        trace_event!(trace, len, "power list built");
    }
}

impl<T: Ord> PowerList<T> {
    /// Builds a list from values in non-decreasing order.
    ///
    /// # Errors
    /// Returns [`UnsortedInput`] if some element is less than its predecessor.
    pub fn from_sorted<I>(values: I) -> Result<Self, UnsortedInput>
    where
        I: IntoIterator<Item = T>,
    {
        let mut list = Self::new();
        list.assign_range(values)?;
        Ok(list)
    }

    /// Replaces the contents with values in non-decreasing order.
    ///
    /// The nodes are taken from a single allocator request and the skip links are built
    /// in the same pass, so the list is clean afterwards.
    ///
    /// # Errors
    /// Returns [`UnsortedInput`] if some element is less than its predecessor. The list
    /// is left unchanged in that case.
    pub fn assign_range<I>(&mut self, values: I) -> Result<(), UnsortedInput>
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        if let Some(index) = values.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(UnsortedInput { index: index + 1 });
        }
        if values.is_empty() {
            self.clear();
        } else {
            self.build(values);
        }
        Ok(())
    }

    /// Inserts `value`, keeping the list sorted.
    pub fn insert(&mut self, value: T) {
        let Some(head) = self.head else {
            self.head = Some(self.nodes.alloc_node(value, None, None));
            self.len = 1;
            self.needs_rebalance = true;
            return;
        };
        let tail = self.tail().unwrap_or(head);

        if value < self.nodes.get(head).value {
            self.push_head(value, head);
        } else if self.nodes.get(tail).value < value {
            self.push_tail(value, head, tail);
        } else {
            match self.descend(&value) {
                (Some(prev), Some(at)) => {
                    let skip = self.nodes.get(at).skip.get();
                    let id = self.nodes.alloc_node(value, Some(at), skip);
                    self.nodes.get_mut(prev).next = Some(id);
                }
                (None, _) => self.push_head(value, head),
                (Some(_), None) => self.push_tail(value, head, tail),
            }
        }

        self.len += 1;
        self.needs_rebalance = true;
    }

    /// Removes one element equal to `value`. Returns `false` if there was none.
    pub fn remove(&mut self, value: &T) -> bool {
        let cursor = self.find(value);
        self.erase(cursor).is_some()
    }

    /// Returns a cursor to an element equal to `value`, or the end cursor.
    pub fn find(&self, value: &T) -> Cursor {
        let (Some(head), Some(tail)) = (self.head, self.tail()) else {
            return Cursor::end();
        };
        if *value < self.nodes.get(head).value || self.nodes.get(tail).value < *value {
            return Cursor::end();
        }
        match self.descend(value) {
            (prev, Some(at)) if self.nodes.get(at).value == *value => self.cursor(prev, at),
            _ => Cursor::end(),
        }
    }

    /// Returns a cursor to the first element not less than `value`.
    ///
    /// If every element is less than `value` the result is an end cursor positioned
    /// after the tail.
    pub fn lower_bound(&self, value: &T) -> Cursor {
        match self.descend(value) {
            (prev, Some(at)) => self.cursor(prev, at),
            (prev, None) => Cursor {
                node: None,
                prev: prev.map(|prev| self.nodes.link(prev)),
            },
        }
    }

    /// Returns `true` if an element equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool {
        !self.find(value).is_end()
    }

    /// Finds the first node not less than `value` together with its predecessor.
    fn descend(&self, value: &T) -> (Option<SlotId>, Option<SlotId>) {
        let (prev, at, _) = self.descend_counting(value);
        (prev, at)
    }

    /// [`descend`](Self::descend), also reporting how many links the walk followed.
    ///
    /// At each node the skip link is taken only if its target is live and its value lies
    /// strictly between the current value and `value`; otherwise the walk takes one
    /// sequential step. A target greater than the current node can only lie ahead of it,
    /// so every move makes progress. A jump never passes a node that could be the answer,
    /// and the final move onto the answer is always sequential, which keeps the
    /// predecessor exact.
    fn descend_counting(&self, value: &T) -> (Option<SlotId>, Option<SlotId>, usize) {
        let Some(head) = self.head else {
            return (None, None, 0);
        };

        let mut prev = None;
        let mut current = head;
        let mut steps = 0;
        loop {
            let node = self.nodes.get(current);
            if node.value >= *value {
                return (prev, Some(current), steps);
            }
            let Some(next) = node.next else {
                return (Some(current), None, steps);
            };
            prev = Some(current);
            steps += 1;
            let ahead = self.nodes.skip_target(current).filter(|&skip| {
                let target = &self.nodes.get(skip).value;
                node.value < *target && *target < *value
            });
            current = ahead.unwrap_or(next);
        }
    }

    fn push_head(&mut self, value: T, head: SlotId) {
        let tail = self.nodes.get(head).skip.get();
        let id = self.nodes.alloc_node(value, Some(head), tail);
        self.head = Some(id);
    }

    fn push_tail(&mut self, value: T, head: SlotId, tail: SlotId) {
        let id = self.nodes.alloc_node(value, None, None);
        self.nodes.get_mut(tail).next = Some(id);
        self.nodes.set_skip(tail, id);
        self.nodes.set_skip(head, id);
    }
}

impl<T> Default for PowerList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for PowerList<T> {
    fn drop(&mut self) {
        if core::mem::needs_drop::<T>() {
            self.nodes.drop_chain(self.head.take());
        }
    }
}

impl<T: Clone> Clone for PowerList<T> {
    fn clone(&self) -> Self {
        let mut list = Self::with_capacity(self.len);
        list.build(self.iter().cloned().collect());
        list
    }
}

impl<T: PartialEq> PartialEq for PowerList<T> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other) || (self.len == other.len && self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for PowerList<T> {}

impl<T: fmt::Debug> fmt::Debug for PowerList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Index<Cursor> for PowerList<T> {
    type Output = T;

    /// # Panics
    /// Panics if the cursor is an end cursor or stale.
    fn index(&self, cursor: Cursor) -> &T {
        match self.get(cursor) {
            Some(value) => value,
            None => panic!("dereferenced an end or stale cursor"),
        }
    }
}

impl<T: Ord> FromIterator<T> for PowerList<T> {
    /// Collects and sorts the input, then bulk-builds the list.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut values: Vec<T> = iter.into_iter().collect();
        values.sort();
        let mut list = Self::new();
        list.build(values);
        list
    }
}

impl<T: Ord> Extend<T> for PowerList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a PowerList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> IntoIterator for PowerList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self)
    }
}
