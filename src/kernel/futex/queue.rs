// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Futex Wait Queue
//!
//! One [`FutexQueue`] per active [`FutexKey`]. Each blocked thread owns a
//! [`FutexBlocker`] that sits on exactly one queue at a time; requeue moves
//! blockers between queues and records the move in the blocker's slot so a
//! timed-out waiter can find and unlink itself.
//!
//! # Lock Order
//!
//! ```text
//! registry -> queue -> blocker slot
//! ```
//!
//! Two queues are locked together only through [`lock_pair`], which orders
//! them by address.
//!
//! [`lock_pair`]: crate::kernel::sync::spin::lock_pair

use crate::kernel::futex::FutexKey;
use crate::kernel::sync::spin::{SpinLock, SpinLockGuard};
use crate::kernel::sync::wait_queue::{WaitQueue, WaiterHandle};
use crate::kernel::thread::{ThreadId, WaitCell};
use alloc::sync::Arc;

/// ============================================================================
/// Blocker
/// ============================================================================

/// Where a blocker currently sits
#[derive(Clone)]
pub(crate) struct BlockerSlot {
    pub(crate) queue: Arc<FutexQueue>,
    pub(crate) handle: WaiterHandle,
}

/// One thread blocked in a futex wait
pub struct FutexBlocker {
    /// Wake token
    pub(crate) cell: WaitCell,

    /// Wake mask
    pub(crate) bitset: u32,

    /// Queue and handle, updated on requeue
    pub(crate) slot: SpinLock<Option<BlockerSlot>>,
}

impl FutexBlocker {
    pub(crate) fn new(thread: ThreadId, bitset: u32) -> Self {
        Self {
            cell: WaitCell::new(thread),
            bitset,
            slot: SpinLock::new(None),
        }
    }

    /// Thread blocked on this entry
    pub fn thread(&self) -> ThreadId {
        self.cell.thread()
    }

    /// Claim this blocker for a wake with `mask`
    ///
    /// Marks the cell woken and returns true if the bitsets intersect and
    /// the waiter has not timed out. A claimed blocker must be unlinked and
    /// handed to [`Scheduler::unblock`].
    ///
    /// [`Scheduler::unblock`]: crate::kernel::thread::Scheduler::unblock
    pub(crate) fn try_wake(&self, mask: u32) -> bool {
        self.bitset & mask != 0 && self.cell.wake()
    }

    /// Snapshot of the current slot
    pub(crate) fn slot(&self) -> Option<BlockerSlot> {
        self.slot.lock().clone()
    }

    pub(crate) fn set_slot(&self, queue: &Arc<FutexQueue>, handle: WaiterHandle) {
        *self.slot.lock() = Some(BlockerSlot {
            queue: queue.clone(),
            handle,
        });
    }
}

/// ============================================================================
/// Queue
/// ============================================================================

pub(crate) struct QueueState {
    /// Blocked threads, FIFO
    pub(crate) waiters: WaitQueue<Arc<FutexBlocker>>,

    /// Threads that found this queue and have not blocked yet
    pub(crate) imminent: u32,
}

impl QueueState {
    /// No waiters and no pending waits
    pub(crate) fn is_idle(&self) -> bool {
        self.waiters.is_empty() && self.imminent == 0
    }
}

/// Wait queue for one futex key
pub struct FutexQueue {
    key: FutexKey,
    pub(crate) state: SpinLock<QueueState>,
}

impl FutexQueue {
    pub(crate) fn new(key: FutexKey) -> Self {
        Self {
            key,
            state: SpinLock::new(QueueState {
                waiters: WaitQueue::new(),
                imminent: 0,
            }),
        }
    }

    /// Key this queue serves
    pub fn key(&self) -> FutexKey {
        self.key
    }

    /// Number of blocked threads
    pub fn waiter_count(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Number of threads about to block
    pub fn imminent_waits(&self) -> u32 {
        self.state.lock().imminent
    }

    pub(crate) fn lock(&self) -> SpinLockGuard<'_, QueueState> {
        self.state.lock()
    }

    /// Append `blocker` and record its position
    pub(crate) fn enqueue(
        self: &Arc<Self>,
        state: &mut QueueState,
        blocker: &Arc<FutexBlocker>,
    ) -> WaiterHandle {
        let handle = state.waiters.push_back(blocker.clone());
        blocker.set_slot(self, handle);
        handle
    }
}
