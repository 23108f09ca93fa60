// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Wait Queue
//!
//! FIFO list of waiters used by the mutex and futex queues. The queue owns
//! no lock of its own: it always lives inside the spinlock-protected state
//! of the primitive that uses it.
//!
//! # Design
//!
//! - **Slab storage**: Entries live in a `Vec` of slots linked by index, so
//!   no node is ever allocated per wait once the slab has warmed up
//! - **Stable handles**: [`WaiterHandle`] names a slot plus a generation
//!   counter; a handle to an entry that already left the queue is simply
//!   stale and [`WaitQueue::remove`] returns `None`
//! - **O(1) removal**: A timed-out waiter unlinks itself from the middle
//!   of the queue without scanning
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut queue = WaitQueue::new();
//! let handle = queue.push_back(waiter);
//!
//! // Wake side
//! let first = queue.pop_front();
//!
//! // Timeout side
//! queue.remove(handle);
//! ```

use alloc::vec::Vec;

const NIL: u32 = u32::MAX;

/// Handle to an entry in a [`WaitQueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaiterHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    prev: u32,
    next: u32,
    value: Option<T>,
}

/// ============================================================================
/// Wait Queue
/// ============================================================================

/// FIFO queue of waiters with handle-based removal
#[derive(Debug)]
pub struct WaitQueue<T> {
    slots: Vec<Slot<T>>,

    /// Head of the free slot list (linked through `next`)
    free: u32,

    head: u32,
    tail: u32,
    len: usize,
}

impl<T> Default for WaitQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WaitQueue<T> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: NIL,
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// Number of queued waiters
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no waiter is queued
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a waiter at the tail
    pub fn push_back(&mut self, value: T) -> WaiterHandle {
        let index = if self.free != NIL {
            let index = self.free;
            let slot = &mut self.slots[index as usize];
            self.free = slot.next;
            slot.value = Some(value);
            index
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                prev: NIL,
                next: NIL,
                value: Some(value),
            });
            index
        };

        {
            let tail = self.tail;
            let slot = &mut self.slots[index as usize];
            slot.prev = tail;
            slot.next = NIL;
        }
        if self.tail == NIL {
            self.head = index;
        } else {
            self.slots[self.tail as usize].next = index;
        }
        self.tail = index;
        self.len += 1;

        WaiterHandle {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    /// Oldest waiter, if any
    pub fn front(&self) -> Option<&T> {
        if self.head == NIL {
            return None;
        }
        self.slots[self.head as usize].value.as_ref()
    }

    /// Remove and return the oldest waiter
    pub fn pop_front(&mut self) -> Option<T> {
        if self.head == NIL {
            return None;
        }
        Some(self.unlink(self.head))
    }

    /// Remove the entry named by `handle`
    ///
    /// Returns `None` if the entry already left the queue.
    pub fn remove(&mut self, handle: WaiterHandle) -> Option<T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation || slot.value.is_none() {
            return None;
        }
        Some(self.unlink(handle.index))
    }

    /// Check if `handle` still names a queued entry
    pub fn contains(&self, handle: WaiterHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .map_or(false, |slot| slot.generation == handle.generation && slot.value.is_some())
    }

    /// Remove up to `limit` entries matching `pred`, oldest first
    ///
    /// Non-matching entries keep their position. Each removed entry is
    /// passed to `sink`.
    pub fn drain_filter<P, S>(&mut self, limit: usize, mut pred: P, mut sink: S) -> usize
    where
        P: FnMut(&T) -> bool,
        S: FnMut(T),
    {
        let mut removed = 0;
        let mut cursor = self.head;

        while cursor != NIL && removed < limit {
            let slot = &self.slots[cursor as usize];
            let next = slot.next;
            let matches = slot.value.as_ref().map_or(false, &mut pred);
            if matches {
                sink(self.unlink(cursor));
                removed += 1;
            }
            cursor = next;
        }

        removed
    }

    /// Iterate over queued entries, oldest first
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            queue: self,
            cursor: self.head,
        }
    }

    fn unlink(&mut self, index: u32) -> T {
        let (prev, next) = {
            let slot = &self.slots[index as usize];
            (slot.prev, slot.next)
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev as usize].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next as usize].prev = prev;
        }

        let free = self.free;
        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.prev = NIL;
        slot.next = free;
        self.free = index;
        self.len -= 1;

        match slot.value.take() {
            Some(value) => value,
            None => unreachable!("wait_queue: unlinked empty slot {}", index),
        }
    }
}

/// Iterator over a [`WaitQueue`]
pub struct Iter<'a, T> {
    queue: &'a WaitQueue<T>,
    cursor: u32,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.cursor == NIL {
            return None;
        }
        let slot = &self.queue.slots[self.cursor as usize];
        self.cursor = slot.next;
        slot.value.as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn collect(queue: &WaitQueue<u32>) -> Vec<u32> {
        queue.iter().copied().collect()
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = WaitQueue::new();
        assert!(queue.is_empty());
        queue.push_back(1);
        queue.push_back(2);
        queue.push_back(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.front(), Some(&1));
        assert_eq!(queue.pop_front(), Some(1));
        assert_eq!(queue.pop_front(), Some(2));
        assert_eq!(queue.pop_front(), Some(3));
        assert_eq!(queue.pop_front(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_middle_and_stale_handle() {
        let mut queue = WaitQueue::new();
        let _a = queue.push_back(1);
        let b = queue.push_back(2);
        let c = queue.push_back(3);

        assert_eq!(queue.remove(b), Some(2));
        assert_eq!(queue.remove(b), None);
        assert!(!queue.contains(b));
        assert_eq!(collect(&queue), vec![1, 3]);

        // Slot reuse must not revive the old handle
        let d = queue.push_back(4);
        assert_eq!(queue.remove(b), None);
        assert!(queue.contains(d));
        assert_eq!(collect(&queue), vec![1, 3, 4]);

        assert_eq!(queue.remove(c), Some(3));
        assert_eq!(collect(&queue), vec![1, 4]);
    }

    #[test]
    fn test_drain_filter_limit() {
        let mut queue = WaitQueue::new();
        for i in 1..=6 {
            queue.push_back(i);
        }

        let mut out = Vec::new();
        let n = queue.drain_filter(2, |v| v % 2 == 0, |v| out.push(v));
        assert_eq!(n, 2);
        assert_eq!(out, vec![2, 4]);
        assert_eq!(collect(&queue), vec![1, 3, 5, 6]);

        let n = queue.drain_filter(usize::MAX, |_| true, |_| {});
        assert_eq!(n, 4);
        assert!(queue.is_empty());
        assert_eq!(queue.drain_filter(1, |_| true, |_| {}), 0);
    }
}
