//! Chain nodes and the slot-backed store that owns them.
//!
//! Every live slot of the store's allocator holds exactly one initialised node that is
//! reachable from the list head; released slots hold poison. Sequential links are always
//! trusted. Skip links may outlive their target, so they carry the target's generation
//! and are only followed after [`NodeStore::resolve`] confirms the slot is still the
//! same live node.

use core::cell::Cell;

use crate::alloc::{ScatterAllocator, SlotId, SlotRange};
use crate::collections::power_list::rebalance::Rebalancer;

/// A generation-tagged node reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) id: SlotId,
    pub(crate) generation: u64,
}

pub(crate) struct Node<T> {
    /// Next node in sort order; `None` only for the tail.
    pub(crate) next: Option<SlotId>,
    /// Block skip. On the head this always references the tail.
    pub(crate) skip: Cell<Option<Link>>,
    pub(crate) value: T,
}

pub(crate) struct NodeStore<T> {
    alloc: ScatterAllocator<Node<T>>,
}

impl<T> NodeStore<T> {
    pub(crate) fn new() -> Self {
        Self { alloc: ScatterAllocator::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { alloc: ScatterAllocator::with_capacity(capacity) }
    }

    pub(crate) fn allocator(&self) -> &ScatterAllocator<Node<T>> {
        &self.alloc
    }

    /// Returns the node behind a trusted id (the head, a sequential link, or a resolved link).
    #[inline]
    pub(crate) fn get(&self, id: SlotId) -> &Node<T> {
        debug_assert!(self.alloc.is_live(id), "node slot {id:?} is not live");
        // SAFETY: trusted ids always name live slots, and every live slot is initialised.
        unsafe { self.alloc.get_unchecked(id).assume_init_ref() }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: SlotId) -> &mut Node<T> {
        debug_assert!(self.alloc.is_live(id), "node slot {id:?} is not live");
        // SAFETY: as in `get`.
        unsafe { self.alloc.get_unchecked_mut(id).assume_init_mut() }
    }

    /// Tags `id` with its current generation.
    #[inline]
    pub(crate) fn link(&self, id: SlotId) -> Link {
        Link {
            id,
            generation: self.alloc.generation(id).unwrap_or(0),
        }
    }

    /// Returns the slot behind `link` if it still holds the node the link was made for.
    #[inline]
    pub(crate) fn resolve(&self, link: Link) -> Option<SlotId> {
        let live = link.generation % 2 == 1 && self.alloc.generation(link.id) == Some(link.generation);
        live.then_some(link.id)
    }

    #[cfg(test)]
    pub(crate) fn set_generation(&mut self, id: SlotId, generation: u64) {
        self.alloc.set_generation(id, generation);
    }

    /// The skip target of `id`, if its skip link is still valid.
    #[inline]
    pub(crate) fn skip_target(&self, id: SlotId) -> Option<SlotId> {
        self.get(id).skip.get().and_then(|link| self.resolve(link))
    }

    #[inline]
    pub(crate) fn set_skip(&self, id: SlotId, target: SlotId) {
        self.get(id).skip.set(Some(self.link(target)));
    }

    /// Allocates and initialises a node. A missing `skip` makes the node skip to itself.
    pub(crate) fn alloc_node(&mut self, value: T, next: Option<SlotId>, skip: Option<Link>) -> SlotId {
        let id = self.alloc.allocate_one();
        let skip = skip.unwrap_or_else(|| self.link(id));
        // SAFETY: `id` was just handed out by this allocator.
        let slot = unsafe { self.alloc.get_unchecked_mut(id) };
        slot.write(Node {
            next,
            skip: Cell::new(Some(skip)),
            value,
        });
        id
    }

    /// Moves the value out of `id` and releases its slot.
    pub(crate) fn take(&mut self, id: SlotId) -> T {
        debug_assert!(self.alloc.is_live(id));
        // SAFETY: `id` is live, so the slot is initialised; the slot is released right
        // after, so the node is never read twice.
        let node = unsafe { self.alloc.get_unchecked(id).assume_init_read() };
        self.alloc.deallocate(SlotRange::from(id));
        node.value
    }

    /// Builds a balanced chain out of already sorted values with one allocator request.
    ///
    /// The rebalancer runs alongside the writes: each node is stepped over as soon as it
    /// and its successor's slot are known. Returns the head and tail ids, or `None` for an
    /// empty input.
    pub(crate) fn build(&mut self, values: Vec<T>) -> Option<(SlotId, SlotId)> {
        let len = values.len();
        if len == 0 {
            return None;
        }

        let mut ranges = Vec::new();
        self.alloc.allocate_with_callback(len, |range| ranges.push(range));

        let chain = || ranges.iter().flat_map(SlotRange::ids);
        let head = chain().next()?;
        let mut rebalancer = Rebalancer::with_anchors(head, chain(), len);

        let mut ids = chain().peekable();
        let mut tail = head;
        for value in values {
            let Some(id) = ids.next() else {
                break;
            };
            let next = ids.peek().copied();
            let skip = self.link(next.unwrap_or(id));
            // SAFETY: `id` was handed out by the request above and is written exactly once.
            let slot = unsafe { self.alloc.get_unchecked_mut(id) };
            slot.write(Node {
                next,
                skip: Cell::new(Some(skip)),
                value,
            });
            // Every anchor the step may redirect sits at or before `id`.
            rebalancer.step(self);
            tail = id;
        }

        rebalancer.finish(self);
        Some((head, tail))
    }

    /// Drops every value of the chain starting at `head`. Slots are not released.
    pub(crate) fn drop_chain(&mut self, head: Option<SlotId>) {
        let mut current = head;
        while let Some(id) = current {
            // SAFETY: chain ids are live and initialised; each node is dropped once and
            // its successor is read before the drop.
            unsafe {
                let slot = self.alloc.get_unchecked_mut(id);
                current = slot.assume_init_ref().next;
                slot.assume_init_drop();
            }
        }
    }
}
