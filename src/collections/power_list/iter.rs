//! Iterators over a [`PowerList`](super::PowerList).
//!
//! There are two borrowing modes. [`Iter`] is a plain read-only walk along the
//! sequential links. [`RebalancingIter`] is the explicit rebalance-while-scanning pass:
//! it needs `&mut` access to the list and, when the skip links are stale, rebuilds them
//! one node per element it yields.

use core::fmt;
use core::iter::FusedIterator;

use crate::alloc::SlotId;
use crate::collections::power_list::node::NodeStore;
use crate::collections::power_list::rebalance::Rebalancer;
use crate::collections::power_list::PowerList;

/// Read-only iterator over the elements of a `PowerList`, in sorted order.
pub struct Iter<'a, T> {
    nodes: &'a NodeStore<T>,
    current: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(nodes: &'a NodeStore<T>, head: Option<SlotId>, len: usize) -> Self {
        Self {
            nodes,
            current: head,
            remaining: len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.nodes.get(id);
        self.current = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            current: self.current,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator that rebuilds the skip links while walking the list.
///
/// Created by [`PowerList::rebalancing_iter`]. If the list was dirty, every call to
/// `next` advances the embedded rebalancer by one node. Dropping the iterator before the
/// end still completes the pass, so the list is always clean afterwards.
pub struct RebalancingIter<'a, T> {
    inner: Iter<'a, T>,
    rebalancer: Option<Rebalancer>,
    needs_rebalance: &'a mut bool,
}

impl<'a, T> RebalancingIter<'a, T> {
    pub(crate) fn new(inner: Iter<'a, T>, rebalancer: Option<Rebalancer>, needs_rebalance: &'a mut bool) -> Self {
        Self {
            inner,
            rebalancer,
            needs_rebalance,
        }
    }
}

impl<'a, T> Iterator for RebalancingIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        if let Some(rebalancer) = &mut self.rebalancer {
            if rebalancer.is_running(self.inner.nodes) {
                rebalancer.step(self.inner.nodes);
            }
        }
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for RebalancingIter<'_, T> {}

impl<T> FusedIterator for RebalancingIter<'_, T> {}

impl<T> Drop for RebalancingIter<'_, T> {
    fn drop(&mut self) {
        if let Some(rebalancer) = self.rebalancer.take() {
            rebalancer.finish(self.inner.nodes);
        }
        *self.needs_rebalance = false;
    }
}

/// Owning iterator over the elements of a `PowerList`, in sorted order.
pub struct IntoIter<T> {
    list: PowerList<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(list: PowerList<T>) -> Self {
        Self { list }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}
