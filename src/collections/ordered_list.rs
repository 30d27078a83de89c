//! Doubly-linked ordered list backed by a slot arena
//!
//! Nodes live in a `Vec` of slots and link to each other by slot index, so the
//! list stays free of `unsafe` while still supporting O(1) removal through a
//! [`NodeRef`] handle. Handles carry a generation counter: once a node is
//! removed its handle stops resolving, even if the slot is later reused.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use crate::error::{Error, Result};

/// Handle to a node currently (or formerly) stored in an [`OrderedList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    slot: usize,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
}

/// Generic doubly-linked sequence preserving insertion order
///
/// Removing an element never reorders the remaining ones. Values are owned by
/// the list; removal hands the value back to the caller, and the `*_with`
/// variants pass it to a disposer instead.
#[derive(Clone)]
pub struct OrderedList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedList<T> {
    /// Creates an empty list
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds `value` at the tail in O(1)
    pub fn append(&mut self, value: T) -> NodeRef {
        let slot = self.alloc(Node {
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.set_next(tail, Some(slot)),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
        self.handle(slot)
    }

    /// Inserts `value` before the element currently at `index`
    ///
    /// `index == len()` appends. Anything larger fails with `OutOfRange`.
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<NodeRef> {
        if index > self.len {
            return Err(Error::OutOfRange {
                index,
                len: self.len,
            });
        }
        if index == self.len {
            return Ok(self.append(value));
        }

        let at = self.slot_at(index).ok_or(Error::OutOfRange {
            index,
            len: self.len,
        })?;
        let prev = self.node(at).and_then(|node| node.prev);
        let slot = self.alloc(Node {
            value,
            prev,
            next: Some(at),
        });
        self.set_prev(at, Some(slot));
        match prev {
            Some(prev) => self.set_next(prev, Some(slot)),
            None => self.head = Some(slot),
        }
        self.len += 1;
        Ok(self.handle(slot))
    }

    /// Returns the element at `index`, walking from whichever end is closer
    pub fn get_at(&self, index: usize) -> Result<&T> {
        self.slot_at(index)
            .and_then(|slot| self.node(slot))
            .map(|node| &node.value)
            .ok_or(Error::OutOfRange {
                index,
                len: self.len,
            })
    }

    /// Returns a handle to the node at `index`
    pub fn node_at(&self, index: usize) -> Result<NodeRef> {
        self.slot_at(index)
            .map(|slot| self.handle(slot))
            .ok_or(Error::OutOfRange {
                index,
                len: self.len,
            })
    }

    /// Returns the value behind `node`, or `None` if the handle is stale
    pub fn get(&self, node: NodeRef) -> Option<&T> {
        let slot = self.resolve(node)?;
        self.node(slot).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, node: NodeRef) -> Option<&mut T> {
        let slot = self.resolve(node)?;
        self.node_mut(slot).map(|node| &mut node.value)
    }

    pub fn head(&self) -> Option<NodeRef> {
        self.head.map(|slot| self.handle(slot))
    }

    pub fn tail(&self) -> Option<NodeRef> {
        self.tail.map(|slot| self.handle(slot))
    }

    /// Forward neighbour of `node`
    pub fn next(&self, node: NodeRef) -> Option<NodeRef> {
        let slot = self.resolve(node)?;
        self.node(slot)?.next.map(|next| self.handle(next))
    }

    /// Backward neighbour of `node`
    pub fn prev(&self, node: NodeRef) -> Option<NodeRef> {
        let slot = self.resolve(node)?;
        self.node(slot)?.prev.map(|prev| self.handle(prev))
    }

    pub fn front(&self) -> Option<&T> {
        self.head
            .and_then(|slot| self.node(slot))
            .map(|node| &node.value)
    }

    pub fn back(&self) -> Option<&T> {
        self.tail
            .and_then(|slot| self.node(slot))
            .map(|node| &node.value)
    }

    /// Detaches `node` in O(1) and returns its value
    ///
    /// Fails with `NotFound` if the handle was already removed.
    pub fn remove(&mut self, node: NodeRef) -> Result<T> {
        self.resolve(node)
            .and_then(|slot| self.unlink(slot))
            .ok_or_else(|| Error::not_found("list node", format!("slot {}", node.slot)))
    }

    /// Detaches `node` and passes its value to `disposer` before the slot is freed
    pub fn remove_with<F: FnOnce(T)>(&mut self, node: NodeRef, disposer: F) -> Result<()> {
        let value = self.remove(node)?;
        disposer(value);
        Ok(())
    }

    /// Removes and returns the element at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let len = self.len;
        self.slot_at(index)
            .and_then(|slot| self.unlink(slot))
            .ok_or(Error::OutOfRange { index, len })
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let slot = self.head?;
        self.unlink(slot)
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let slot = self.tail?;
        self.unlink(slot)
    }

    /// Removes every element; the list stays usable afterwards
    pub fn clear(&mut self) {
        self.clear_with(drop);
    }

    /// Removes every element front to back, handing each value to `disposer`
    pub fn clear_with<F: FnMut(T)>(&mut self, mut disposer: F) {
        while let Some(value) = self.pop_front() {
            disposer(value);
        }
    }

    /// Clears the list with `disposer` and consumes it
    pub fn dispose<F: FnMut(T)>(mut self, disposer: F) {
        self.clear_with(disposer);
    }

    /// Keeps only the elements for which `keep` returns `true`, visiting front to back
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let Some(node) = self.node(slot) else {
                break;
            };
            cursor = node.next;
            if !keep(&node.value) {
                self.unlink(slot);
            }
        }
    }

    /// Handle of the first element matching `predicate`
    pub fn find<P: FnMut(&T) -> bool>(&self, mut predicate: P) -> Option<NodeRef> {
        self.nodes()
            .find(|(_, value)| predicate(value))
            .map(|(node, _)| node)
    }

    /// Stable sort by `compare`
    ///
    /// Node order is computed over a materialized slice of slot indices and then
    /// relinked, so existing [`NodeRef`] handles stay valid.
    pub fn sort_by<F: FnMut(&T, &T) -> Ordering>(&mut self, mut compare: F) {
        let mut order: Vec<usize> = self.nodes().map(|(node, _)| node.slot).collect();
        order.sort_by(|&a, &b| match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => compare(&a.value, &b.value),
            _ => Ordering::Equal,
        });
        self.relink(&order);
    }

    /// Front-to-back iterator over values; `.rev()` walks the back-links
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.nodes(),
        }
    }

    /// Iterator over `(handle, value)` pairs, double-ended
    pub fn nodes(&self) -> Nodes<'_, T> {
        Nodes {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot].node = Some(node);
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    fn handle(&self, slot: usize) -> NodeRef {
        NodeRef {
            slot,
            generation: self.slots[slot].generation,
        }
    }

    fn resolve(&self, node: NodeRef) -> Option<usize> {
        let slot = self.slots.get(node.slot)?;
        (slot.generation == node.generation && slot.node.is_some()).then_some(node.slot)
    }

    fn node(&self, slot: usize) -> Option<&Node<T>> {
        self.slots.get(slot)?.node.as_ref()
    }

    fn node_mut(&mut self, slot: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(slot)?.node.as_mut()
    }

    fn set_next(&mut self, slot: usize, next: Option<usize>) {
        if let Some(node) = self.node_mut(slot) {
            node.next = next;
        }
    }

    fn set_prev(&mut self, slot: usize, prev: Option<usize>) {
        if let Some(node) = self.node_mut(slot) {
            node.prev = prev;
        }
    }

    fn slot_at(&self, index: usize) -> Option<usize> {
        if index >= self.len {
            return None;
        }
        if index <= self.len / 2 {
            let mut cursor = self.head;
            for _ in 0..index {
                cursor = cursor.and_then(|slot| self.node(slot)).and_then(|n| n.next);
            }
            cursor
        } else {
            let mut cursor = self.tail;
            for _ in 0..(self.len - 1 - index) {
                cursor = cursor.and_then(|slot| self.node(slot)).and_then(|n| n.prev);
            }
            cursor
        }
    }

    fn unlink(&mut self, slot: usize) -> Option<T> {
        let node = self.slots.get_mut(slot)?.node.take()?;
        match node.prev {
            Some(prev) => self.set_next(prev, node.next),
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.set_prev(next, node.prev),
            None => self.tail = node.prev,
        }
        self.slots[slot].generation += 1;
        self.free.push(slot);
        self.len -= 1;
        Some(node.value)
    }

    fn relink(&mut self, order: &[usize]) {
        self.head = order.first().copied();
        self.tail = order.last().copied();
        for (i, &slot) in order.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| order[p]);
            let next = order.get(i + 1).copied();
            if let Some(node) = self.node_mut(slot) {
                node.prev = prev;
                node.next = next;
            }
        }
    }
}

/// Iterator over `(NodeRef, &T)` pairs of an [`OrderedList`]
pub struct Nodes<'a, T> {
    list: &'a OrderedList<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = (NodeRef, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.front?;
        let node = self.list.node(slot)?;
        self.front = node.next;
        self.remaining -= 1;
        Some((self.list.handle(slot), &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Nodes<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.back?;
        let node = self.list.node(slot)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some((self.list.handle(slot), &node.value))
    }
}

impl<T> ExactSizeIterator for Nodes<'_, T> {}
impl<T> FusedIterator for Nodes<'_, T> {}

/// Iterator over the values of an [`OrderedList`]
pub struct Iter<'a, T> {
    inner: Nodes<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator, draining the list from either end
pub struct IntoIter<T> {
    list: OrderedList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for OrderedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for OrderedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for OrderedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}
