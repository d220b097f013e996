//! Single-pass reconstruction of the skip links.
//!
//! For a chain of `n` nodes the rebalancer keeps `ceil(log2(n))` lanes. Lane `i` owns
//! blocks of `n >> i` nodes: whenever the traversal reaches the end of a lane's block,
//! the lane's anchor is pointed just past the current node and the anchor moves to the
//! current node. Lanes wait in a min-heap keyed on the index at which they are due, so
//! each step only inspects the lanes that actually fire.
//!
//! Once the traversal reaches the tail every remaining anchor is pointed at the tail.
//! Lanes near the end therefore skip less than they could; lookups still fall back to
//! sequential steps, so this only costs speed close to the tail.

use core::cmp::Reverse;
use core::iter;
use std::collections::BinaryHeap;

use crate::alloc::SlotId;
use crate::collections::power_list::node::NodeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Lane {
    /// Traversal index at which the anchor is redirected next.
    due: usize,
    block: usize,
    anchor: SlotId,
}

/// Number of skip lanes for a chain of `len` nodes.
#[inline]
pub(crate) fn lane_count(len: usize) -> usize {
    if len <= 1 {
        0
    } else {
        (usize::BITS - (len - 1).leading_zeros()) as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Rebalancer {
    lanes: BinaryHeap<Reverse<Lane>>,
    current: SlotId,
    index: usize,
}

impl Rebalancer {
    /// Sets up a pass over the chain of `len` nodes starting at `head`.
    pub(crate) fn new<T>(nodes: &NodeStore<T>, head: SlotId, len: usize) -> Self {
        let chain = iter::successors(Some(head), |&id| nodes.get(id).next);
        Self::with_anchors(head, chain, len)
    }

    /// Sets up a pass whose first lanes are anchored at the leading ids of `chain`.
    ///
    /// `chain` yields the node ids in list order starting at `head`; only its first
    /// `lane_count(len)` ids are read, so the nodes behind them need not exist yet.
    /// Lane `i` is anchored at the `i`-th node and first fires at index `i + (len >> i)`.
    pub(crate) fn with_anchors<I>(head: SlotId, chain: I, len: usize) -> Self
    where
        I: IntoIterator<Item = SlotId>,
    {
        let count = lane_count(len);
        let mut lanes = BinaryHeap::with_capacity(count);
        for (i, anchor) in chain.into_iter().take(count).enumerate() {
            let block = len >> i;
            lanes.push(Reverse(Lane { due: i + block, block, anchor }));
        }

        Self {
            lanes,
            current: head,
            index: 0,
        }
    }

    /// Returns `true` while the pass has not reached the tail.
    #[inline]
    pub(crate) fn is_running<T>(&self, nodes: &NodeStore<T>) -> bool {
        nodes.get(self.current).next.is_some()
    }

    /// Redirects every lane due at the current index, then moves one node forward.
    pub(crate) fn step<T>(&mut self, nodes: &NodeStore<T>) {
        let Some(next) = nodes.get(self.current).next else {
            return;
        };

        while let Some(mut top) = self.lanes.peek_mut() {
            let lane = &mut top.0;
            if lane.due != self.index {
                break;
            }
            nodes.set_skip(lane.anchor, next);
            lane.anchor = self.current;
            lane.due += lane.block;
        }

        self.current = next;
        self.index += 1;
    }

    /// Runs the rest of the pass and points the remaining anchors at the tail.
    pub(crate) fn finish<T>(mut self, nodes: &NodeStore<T>) {
        while self.is_running(nodes) {
            self.step(nodes);
        }
        for Reverse(lane) in &self.lanes {
            nodes.set_skip(lane.anchor, self.current);
        }
        trace_event!(trace, len = self.index + 1, lanes = self.lanes.len(), "rebalance pass finished");
    }
}
