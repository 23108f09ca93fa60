// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Futex Registry
//!
//! [`FutexContext`] maps each active [`FutexKey`] to its [`FutexQueue`] and
//! implements the wait, wake, wake-op and requeue operations on top of it.
//!
//! # Queue Lifetime
//!
//! ```text
//! NoQueue --(first waiter or requeue target)--> QueueExists
//! QueueExists --(no waiters, no imminent waits)--> NoQueue
//! ```
//!
//! A thread that found a queue but has not blocked yet holds an imminent
//! wait on it, which keeps [`FutexContext::remove_if_empty`] from dropping
//! the queue under it. The registry lock is only held for the map lookup
//! itself, never across a suspension.
//!
//! # Usage
//!
//! ```rust,ignore
//! let futexes = FutexContext::new(sched.clone());
//!
//! let word = FutexWord::resolve(aspace, addr, false)?;
//! futexes.wait(&word, 0, None, FUTEX_BITSET_MATCH_ANY, None)?;
//!
//! // From another thread
//! futexes.wake(&word, 1, FUTEX_BITSET_MATCH_ANY)?;
//! ```

use crate::kernel::futex::queue::{FutexBlocker, FutexQueue, QueueState};
use crate::kernel::futex::{FutexError, FutexKey, Result, WakeOp, FUTEX_BITSET_MATCH_ANY};
use crate::kernel::sync::mutex::Mutex;
use crate::kernel::sync::spin::{lock_pair, SpinLock};
use crate::kernel::thread::{block_current, BlockResult, Scheduler};
use crate::kernel::timer::Deadline;
use crate::kernel::usercopy::{AtomicOp, UserPtr};
use crate::kernel::vm::{AddressSpace, VAddr};
use alloc::sync::Arc;
use hashbrown::HashMap;

// Import logging macros
use crate::{log_debug, log_info, log_trace_if};

const LOCAL_TRACE: bool = false;

/// ============================================================================
/// Futex Word
/// ============================================================================

/// A validated user futex word and its resolved key
pub struct FutexWord<'a> {
    aspace: &'a dyn AddressSpace,
    ptr: UserPtr<u32>,
    key: FutexKey,
}

impl<'a> FutexWord<'a> {
    /// Validate `address` and resolve its key
    pub fn resolve(aspace: &'a dyn AddressSpace, address: VAddr, shared: bool) -> Result<Self> {
        let key = FutexKey::resolve(aspace, address, shared)?;
        Ok(Self {
            aspace,
            ptr: UserPtr::new(address),
            key,
        })
    }

    /// Resolved key
    pub fn key(&self) -> FutexKey {
        self.key
    }

    /// User address of the word
    pub fn address(&self) -> VAddr {
        self.ptr.addr()
    }

    /// Atomically read the word
    pub fn load(&self) -> Result<u32> {
        self.aspace.atomic_load(self.ptr).ok_or(FutexError::Fault)
    }

    /// Atomically update the word, returning its old value
    pub fn fetch_op(&self, op: AtomicOp, operand: u32) -> Result<u32> {
        self.aspace
            .atomic_fetch_op(self.ptr, op, operand)
            .ok_or(FutexError::Fault)
    }
}

/// ============================================================================
/// Futex Context
/// ============================================================================

/// Futex subsystem statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FutexStats {
    /// Keys with a live queue
    pub active_queues: usize,

    /// Threads blocked over all queues
    pub waiters: usize,
}

/// Registry of futex wait queues
pub struct FutexContext {
    queues: SpinLock<HashMap<FutexKey, Arc<FutexQueue>>>,
    sched: Arc<dyn Scheduler>,
}

static_assertions::assert_impl_all!(FutexContext: Send, Sync);
static_assertions::assert_impl_all!(FutexQueue: Send, Sync);

impl FutexContext {
    /// Create an empty registry
    pub fn new(sched: Arc<dyn Scheduler>) -> Self {
        Self::with_capacity(sched, 0)
    }

    /// Create a registry with room for `capacity` keys
    pub fn with_capacity(sched: Arc<dyn Scheduler>, capacity: usize) -> Self {
        log_info!("futex: registry initialized (capacity {})", capacity);
        Self {
            queues: SpinLock::new(HashMap::with_capacity(capacity)),
            sched,
        }
    }

    /// Scheduler the registry blocks and wakes through
    pub fn scheduler(&self) -> &dyn Scheduler {
        &*self.sched
    }

    /// Look up the queue for `key`
    pub fn find(&self, key: &FutexKey) -> Option<Arc<FutexQueue>> {
        self.queues.lock().get(key).cloned()
    }

    /// Look up or create the queue for `key` and claim an imminent wait on it
    ///
    /// The caller must release the claim, either by blocking on the queue
    /// or by decrementing it and calling [`FutexContext::remove_if_empty`].
    pub fn find_or_create(&self, key: FutexKey) -> Arc<FutexQueue> {
        let mut queues = self.queues.lock();
        let queue = queues
            .entry(key)
            .or_insert_with(|| Arc::new(FutexQueue::new(key)))
            .clone();
        queue.lock().imminent += 1;
        queue
    }

    /// Drop `queue` from the registry if it is idle
    ///
    /// Returns true if the queue was removed.
    pub fn remove_if_empty(&self, queue: &Arc<FutexQueue>) -> bool {
        let mut queues = self.queues.lock();
        if !queue.lock().is_idle() {
            return false;
        }

        let key = queue.key();
        match queues.get(&key) {
            Some(current) if Arc::ptr_eq(current, queue) => {
                queues.remove(&key);
                log_trace_if!(LOCAL_TRACE, "futex: dropped queue {:?}", key);
                true
            }
            _ => false,
        }
    }

    /// Check if a queue exists for `key`
    pub fn contains(&self, key: &FutexKey) -> bool {
        self.queues.lock().contains_key(key)
    }

    /// Threads blocked on `key`
    pub fn waiter_count(&self, key: &FutexKey) -> usize {
        self.find(key).map_or(0, |queue| queue.waiter_count())
    }

    /// Get futex subsystem statistics
    pub fn stats(&self) -> FutexStats {
        let queues = self.queues.lock();
        FutexStats {
            active_queues: queues.len(),
            waiters: queues.values().map(|queue| queue.waiter_count()).sum(),
        }
    }

    /// ========================================================================
    /// Operations
    /// ========================================================================

    /// Block until woken if `word` holds `expected`
    ///
    /// `big_lock`, if given, is dropped for the duration of the wait and
    /// restored with the same depth afterwards.
    ///
    /// # Returns
    ///
    /// - `Ok(0)` when woken
    /// - `Err(FutexError::WouldBlock)` if the word did not hold `expected`
    /// - `Err(FutexError::TimedOut)` if `deadline` passed first
    /// - `Err(FutexError::InvalidArgs)` for an empty `bitset`
    /// - `Err(FutexError::Fault)` if the word cannot be read
    pub fn wait(
        &self,
        word: &FutexWord<'_>,
        expected: u32,
        deadline: Option<Deadline>,
        bitset: u32,
        big_lock: Option<&Mutex>,
    ) -> Result<usize> {
        if bitset == 0 {
            return Err(FutexError::InvalidArgs);
        }

        if word.load()? != expected {
            return Err(FutexError::WouldBlock);
        }

        let depth = big_lock.map_or(0, Mutex::force_unlock_exclusive_if_locked);
        let result = self.wait_queued(word, expected, deadline, bitset);
        if let Some(big_lock) = big_lock {
            big_lock.restore_exclusive_lock(depth);
        }
        result
    }

    fn wait_queued(
        &self,
        word: &FutexWord<'_>,
        expected: u32,
        deadline: Option<Deadline>,
        bitset: u32,
    ) -> Result<usize> {
        let queue = self.find_or_create(word.key());
        let blocker = Arc::new(FutexBlocker::new(self.sched.current_thread(), bitset));

        let mut state = queue.lock();

        // The word may have changed while the queue was looked up
        let current = word.load();
        if current != Ok(expected) {
            state.imminent -= 1;
            drop(state);
            self.remove_if_empty(&queue);
            return Err(current.err().unwrap_or(FutexError::WouldBlock));
        }

        queue.enqueue(&mut state, &blocker);
        state.imminent -= 1;

        log_trace_if!(
            LOCAL_TRACE,
            "futex: thread {} waiting on {:#x} bitset {:#x}",
            blocker.thread(),
            word.address(),
            bitset
        );

        let result = block_current(&*self.sched, state, &blocker.cell, deadline);
        drop(queue);

        match result {
            BlockResult::Woken => Ok(0),
            BlockResult::TimedOut => {
                self.unlink_timed_out(&blocker);
                log_debug!("futex: thread {} timed out on {:#x}", blocker.thread(), word.address());
                Err(FutexError::TimedOut)
            }
        }
    }

    /// Remove a timed-out blocker from whichever queue it sits on now
    fn unlink_timed_out(&self, blocker: &Arc<FutexBlocker>) {
        loop {
            let Some(slot) = blocker.slot() else {
                return;
            };

            let mut state = slot.queue.lock();
            let unmoved = blocker.slot.lock().as_ref().map_or(false, |now| {
                Arc::ptr_eq(&now.queue, &slot.queue) && now.handle == slot.handle
            });
            if !unmoved {
                // Requeued while we were looking
                continue;
            }

            state.waiters.remove(slot.handle);
            drop(state);
            self.remove_if_empty(&slot.queue);
            return;
        }
    }

    /// Wake up to `count` waiters on `word` whose bitset intersects `bitset`
    ///
    /// Returns the number of threads woken.
    pub fn wake(&self, word: &FutexWord<'_>, count: usize, bitset: u32) -> Result<usize> {
        if bitset == 0 {
            return Err(FutexError::InvalidArgs);
        }
        Ok(self.wake_key(&word.key(), count, bitset))
    }

    fn wake_key(&self, key: &FutexKey, count: usize, bitset: u32) -> usize {
        let Some(queue) = self.find(key) else {
            return 0;
        };

        let woken = self.wake_locked(&mut queue.lock(), count, bitset);
        self.remove_if_empty(&queue);

        log_trace_if!(LOCAL_TRACE, "futex: woke {} of {} on {:?}", woken, count, key);
        woken
    }

    /// Wake up to `count` matching waiters, oldest first
    ///
    /// The cell is claimed while the entry is examined, so a waiter whose
    /// timeout fires first is skipped and does not use up `count`.
    fn wake_locked(&self, state: &mut QueueState, count: usize, bitset: u32) -> usize {
        let sched = &*self.sched;
        state.waiters.drain_filter(
            count,
            |blocker| blocker.try_wake(bitset),
            |blocker| sched.unblock(&blocker.cell),
        )
    }

    /// Update `word2`, wake `count` waiters on `word`, then `count2` on
    /// `word2` if the old value of `word2` satisfies `op`'s condition
    ///
    /// Returns the total number of threads woken. A fault on `word2` wakes
    /// nobody.
    pub fn wake_op(
        &self,
        word: &FutexWord<'_>,
        word2: &FutexWord<'_>,
        count: usize,
        count2: usize,
        op: &WakeOp,
    ) -> Result<usize> {
        let old = word2.fetch_op(op.op, op.oparg)?;

        let mut woken = self.wake_key(&word.key(), count, FUTEX_BITSET_MATCH_ANY);
        if op.should_wake(old) {
            woken += self.wake_key(&word2.key(), count2, FUTEX_BITSET_MATCH_ANY);
        }
        Ok(woken)
    }

    /// Wake `count` waiters on `word` and move up to `limit` more to `word2`
    ///
    /// With `expected` set, fails with `WouldBlock` unless `word` holds it.
    /// Returns woken plus requeued.
    pub fn requeue(
        &self,
        word: &FutexWord<'_>,
        word2: &FutexWord<'_>,
        count: usize,
        limit: usize,
        expected: Option<u32>,
    ) -> Result<usize> {
        if word.key() == word2.key() {
            return Err(FutexError::InvalidArgs);
        }

        let Some(src) = self.find(&word.key()) else {
            check_value(word, expected)?;
            return Ok(0);
        };

        let result = if limit == 0 {
            let mut state = src.lock();
            let woken = check_value(word, expected)
                .map(|()| self.wake_locked(&mut state, count, FUTEX_BITSET_MATCH_ANY));
            drop(state);
            woken
        } else {
            let dst = self.find_or_create(word2.key());
            let result = self.requeue_locked(&src, &dst, word, count, limit, expected);
            self.remove_if_empty(&dst);
            result
        };

        self.remove_if_empty(&src);

        if let Ok(total) = result {
            log_trace_if!(
                LOCAL_TRACE,
                "futex: requeue {:#x} -> {:#x} affected {}",
                word.address(),
                word2.address(),
                total
            );
        }
        result
    }

    /// Requeue with both queues locked; releases the imminent claim on `dst`
    fn requeue_locked(
        &self,
        src: &Arc<FutexQueue>,
        dst: &Arc<FutexQueue>,
        word: &FutexWord<'_>,
        count: usize,
        limit: usize,
        expected: Option<u32>,
    ) -> Result<usize> {
        let (mut from, mut to) = lock_pair(&src.state, &dst.state);
        to.imminent -= 1;

        check_value(word, expected)?;

        let woken = self.wake_locked(&mut from, count, FUTEX_BITSET_MATCH_ANY);

        let mut moved = 0;
        from.waiters.drain_filter(
            limit,
            |blocker| blocker.cell.outcome().is_none(),
            |blocker| {
                dst.enqueue(&mut to, &blocker);
                moved += 1;
            },
        );

        Ok(woken + moved)
    }
}

/// Fail with `WouldBlock` unless `word` holds `expected`
fn check_value(word: &FutexWord<'_>, expected: Option<u32>) -> Result<()> {
    match expected {
        Some(expected) if word.load()? != expected => Err(FutexError::WouldBlock),
        _ => Ok(()),
    }
}
