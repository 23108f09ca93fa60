// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Mutex
//!
//! Recursive shared/exclusive lock for kernel-internal use. A mutex is
//! either a [`MutexBehavior::Regular`] reader/writer lock or a
//! [`MutexBehavior::BigLock`], the process-wide lock that blocking
//! operations drop and later restore with its full recursion depth.
//!
//! # Design
//!
//! - **Ownership tracking**: The exclusive holder and every shared holder
//!   are known, so misuse is caught instead of corrupting state
//! - **Recursion**: The exclusive holder may lock again in any mode; each
//!   lock needs a matching unlock
//! - **Handoff**: On release the unlocker picks the next owners, installs
//!   their state and only then signals them. A woken waiter never retries
//! - **Class promotion**: A vacated exclusive hold prefers the shared
//!   waiters, a vacated shared hold prefers an exclusive waiter
//!
//! # Usage
//!
//! ```rust,ignore
//! let mutex = Mutex::new("vm", MutexBehavior::Regular, sched.clone());
//!
//! mutex.lock(LockMode::Exclusive);
//! // Critical section
//! mutex.unlock();
//!
//! // Big lock around a blocking call
//! let depth = big_lock.force_unlock_exclusive_if_locked();
//! sleep();
//! big_lock.restore_exclusive_lock(depth);
//! ```

use crate::kernel::sync::spin::{SpinLock, SpinLockGuard};
use crate::kernel::sync::wait_queue::WaitQueue;
use crate::kernel::thread::{block_current, wake_thread, BlockResult, Scheduler, ThreadId, WaitCell};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

// Import logging macros
use crate::{log_debug, log_trace_if};

const LOCAL_TRACE: bool = false;

/// Magic number for mutex validation
const MUTEX_MAGIC: u32 = 0x4D555478; // "MUTx" in hex

/// ============================================================================
/// Modes
/// ============================================================================

/// Lock mode
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Not held
    Unlocked = 0,

    /// Held by one or more readers
    Shared = 1,

    /// Held by exactly one thread
    Exclusive = 2,
}

/// Mutex behavior, fixed at construction
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutexBehavior {
    /// Shared/exclusive lock
    Regular = 0,

    /// Exclusive-only lock that can be dropped and restored around sleeps
    BigLock = 1,
}

/// Number of threads waiting on each list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaiterCounts {
    pub shared: usize,
    pub exclusive: usize,
    pub big_lock: usize,
}

impl WaiterCounts {
    /// Total waiters over all lists
    pub fn total(&self) -> usize {
        self.shared + self.exclusive + self.big_lock
    }
}

/// ============================================================================
/// State
/// ============================================================================

/// Blocked lock request
struct MutexWaiter {
    thread: ThreadId,

    /// Recursion count to install on grant
    requested: u32,

    cell: Arc<WaitCell>,
}

struct MutexState {
    mode: LockMode,

    /// Outstanding lock calls over all holders
    times_locked: u32,

    /// Exclusive holder
    holder: Option<ThreadId>,

    /// Outstanding shared acquisitions
    shared_holder_count: u32,

    /// Shared acquisitions per thread
    shared_holds: Vec<(ThreadId, u32)>,

    shared_waiters: WaitQueue<MutexWaiter>,
    exclusive_waiters: WaitQueue<MutexWaiter>,
    big_lock_waiters: WaitQueue<MutexWaiter>,
}

impl MutexState {
    const fn new() -> Self {
        Self {
            mode: LockMode::Unlocked,
            times_locked: 0,
            holder: None,
            shared_holder_count: 0,
            shared_holds: Vec::new(),
            shared_waiters: WaitQueue::new(),
            exclusive_waiters: WaitQueue::new(),
            big_lock_waiters: WaitQueue::new(),
        }
    }

    fn shared_holds_of(&self, thread: ThreadId) -> u32 {
        self.shared_holds
            .iter()
            .find(|(tid, _)| *tid == thread)
            .map_or(0, |(_, count)| *count)
    }

    fn add_shared_hold(&mut self, thread: ThreadId, count: u32) {
        match self.shared_holds.iter_mut().find(|(tid, _)| *tid == thread) {
            Some((_, held)) => *held += count,
            None => self.shared_holds.push((thread, count)),
        }
        self.shared_holder_count += count;
        self.times_locked += count;
    }

    /// Drop one shared hold of `thread`; false if it has none
    fn release_shared_hold(&mut self, thread: ThreadId) -> bool {
        let Some(pos) = self.shared_holds.iter().position(|(tid, _)| *tid == thread) else {
            return false;
        };
        let held = &mut self.shared_holds[pos].1;
        *held -= 1;
        if *held == 0 {
            self.shared_holds.swap_remove(pos);
        }
        self.shared_holder_count -= 1;
        self.times_locked -= 1;
        true
    }

    fn grant_exclusive(&mut self, thread: ThreadId, count: u32) {
        debug_assert_eq!(self.mode, LockMode::Unlocked);
        self.mode = LockMode::Exclusive;
        self.holder = Some(thread);
        self.times_locked = count;
    }

    fn grant_shared(&mut self, thread: ThreadId, count: u32) {
        debug_assert_ne!(self.mode, LockMode::Exclusive);
        self.mode = LockMode::Shared;
        self.add_shared_hold(thread, count);
    }

    fn clear(&mut self) {
        self.mode = LockMode::Unlocked;
        self.times_locked = 0;
        self.holder = None;
        self.shared_holder_count = 0;
        self.shared_holds.clear();
    }

    fn has_waiters(&self) -> bool {
        !self.shared_waiters.is_empty()
            || !self.exclusive_waiters.is_empty()
            || !self.big_lock_waiters.is_empty()
    }

    fn check_invariants(&self) {
        debug_assert_eq!(self.times_locked == 0, self.mode == LockMode::Unlocked);
        debug_assert_eq!(self.holder.is_some(), self.mode == LockMode::Exclusive);
        debug_assert_eq!(self.shared_holder_count > 0, self.mode == LockMode::Shared);
    }
}

/// ============================================================================
/// Mutex
/// ============================================================================

/// Recursive shared/exclusive kernel lock
pub struct Mutex {
    /// Debug name
    name: &'static str,

    behavior: MutexBehavior,

    sched: Arc<dyn Scheduler>,

    state: SpinLock<MutexState>,

    /// Magic number for validation
    magic: u32,
}

static_assertions::assert_impl_all!(Mutex: Send, Sync);

impl Mutex {
    /// Create a new unlocked mutex
    pub fn new(name: &'static str, behavior: MutexBehavior, sched: Arc<dyn Scheduler>) -> Self {
        Self {
            name,
            behavior,
            sched,
            state: SpinLock::new(MutexState::new()),
            magic: MUTEX_MAGIC,
        }
    }

    /// Create a regular shared/exclusive mutex
    pub fn new_regular(name: &'static str, sched: Arc<dyn Scheduler>) -> Self {
        Self::new(name, MutexBehavior::Regular, sched)
    }

    /// Create a big lock
    pub fn new_big_lock(name: &'static str, sched: Arc<dyn Scheduler>) -> Self {
        Self::new(name, MutexBehavior::BigLock, sched)
    }

    /// Acquire the mutex in `mode`
    ///
    /// Blocks the current thread until the lock is granted.
    ///
    /// # Panics
    ///
    /// - `mode` is [`LockMode::Unlocked`]
    /// - `mode` is [`LockMode::Shared`] on a big lock
    /// - The caller holds the lock shared and asks for exclusive
    pub fn lock(&self, mode: LockMode) {
        self.validate();

        match mode {
            LockMode::Unlocked => panic!("mutex {}: lock with Unlocked mode", self.name),
            LockMode::Shared if self.behavior == MutexBehavior::BigLock => {
                panic!("mutex {}: shared lock on a big lock", self.name)
            }
            _ => {}
        }

        let current = self.sched.current_thread();
        let mut state = self.state.lock();
        let held = state.mode;

        match held {
            LockMode::Unlocked => {
                if mode == LockMode::Exclusive {
                    state.grant_exclusive(current, 1);
                } else {
                    state.grant_shared(current, 1);
                }
                return;
            }
            LockMode::Exclusive if state.holder == Some(current) => {
                state.times_locked += 1;
                return;
            }
            LockMode::Shared if mode == LockMode::Shared => {
                state.add_shared_hold(current, 1);
                return;
            }
            LockMode::Shared if state.shared_holds_of(current) > 0 => {
                drop(state);
                panic!("mutex {}: thread {} upgrading shared hold to exclusive", self.name, current);
            }
            _ => {}
        }

        log_trace_if!(
            LOCAL_TRACE,
            "mutex {}: thread {} blocking for {:?} (held {:?})",
            self.name,
            current,
            mode,
            held
        );

        let cell = Arc::new(WaitCell::new(current));
        let waiter = MutexWaiter {
            thread: current,
            requested: 1,
            cell: cell.clone(),
        };
        match (self.behavior, mode) {
            (MutexBehavior::BigLock, _) => state.big_lock_waiters.push_back(waiter),
            (MutexBehavior::Regular, LockMode::Shared) => state.shared_waiters.push_back(waiter),
            (MutexBehavior::Regular, _) => state.exclusive_waiters.push_back(waiter),
        };

        self.block_until_granted(state, &cell);
    }

    /// Release one hold of the mutex
    ///
    /// # Panics
    ///
    /// The mutex is unlocked, or the caller holds it in no mode.
    pub fn unlock(&self) {
        self.validate();

        let current = self.sched.current_thread();
        let mut state = self.state.lock();
        let held = state.mode;

        match held {
            LockMode::Unlocked => {
                drop(state);
                panic!("mutex {}: unlock of unlocked mutex", self.name);
            }
            LockMode::Exclusive => {
                if state.holder != Some(current) {
                    let holder = state.holder;
                    drop(state);
                    panic!(
                        "mutex {}: thread {} unlocking mutex held by {:?}",
                        self.name, current, holder
                    );
                }
                state.times_locked -= 1;
                if state.times_locked > 0 {
                    return;
                }
            }
            LockMode::Shared => {
                if !state.release_shared_hold(current) {
                    drop(state);
                    panic!("mutex {}: thread {} holds no shared lock", self.name, current);
                }
                if state.shared_holder_count > 0 {
                    return;
                }
            }
        }

        state.clear();
        self.wake_next(&mut state, held);
        state.check_invariants();
    }

    /// Drop the caller's exclusive hold on a big lock entirely
    ///
    /// Returns the recursion count that was held, or 0 if the caller did not
    /// hold the lock.
    ///
    /// # Panics
    ///
    /// The mutex is not a big lock.
    pub fn force_unlock_exclusive_if_locked(&self) -> u32 {
        self.validate();
        self.assert_big_lock("force_unlock_exclusive_if_locked");

        let current = self.sched.current_thread();
        let mut state = self.state.lock();

        if state.mode != LockMode::Exclusive || state.holder != Some(current) {
            return 0;
        }

        let count = state.times_locked;
        state.clear();
        self.wake_next(&mut state, LockMode::Exclusive);
        state.check_invariants();

        log_debug!("mutex {}: thread {} released big lock depth {}", self.name, current, count);
        count
    }

    /// Re-take a big lock with recursion `count`
    ///
    /// Counterpart of [`Mutex::force_unlock_exclusive_if_locked`]. A zero
    /// count does nothing. Blocks if another thread holds the lock.
    ///
    /// # Panics
    ///
    /// The mutex is not a big lock.
    pub fn restore_exclusive_lock(&self, count: u32) {
        self.validate();
        self.assert_big_lock("restore_exclusive_lock");

        if count == 0 {
            return;
        }

        let current = self.sched.current_thread();
        let mut state = self.state.lock();

        let held = state.mode;
        match held {
            LockMode::Unlocked => {
                state.grant_exclusive(current, count);
                return;
            }
            LockMode::Exclusive if state.holder == Some(current) => {
                state.times_locked += count;
                return;
            }
            _ => {}
        }

        log_trace_if!(
            LOCAL_TRACE,
            "mutex {}: thread {} waiting to restore depth {}",
            self.name,
            current,
            count
        );

        let cell = Arc::new(WaitCell::new(current));
        state.big_lock_waiters.push_back(MutexWaiter {
            thread: current,
            requested: count,
            cell: cell.clone(),
        });

        self.block_until_granted(state, &cell);
    }

    /// Debug name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Behavior chosen at construction
    pub fn behavior(&self) -> MutexBehavior {
        self.behavior
    }

    /// Current mode
    pub fn mode(&self) -> LockMode {
        self.state.lock().mode
    }

    /// Check if the mutex is held in any mode
    pub fn is_locked(&self) -> bool {
        self.mode() != LockMode::Unlocked
    }

    /// Check if the calling thread holds the mutex in any mode
    pub fn own_lock(&self) -> bool {
        let current = self.sched.current_thread();
        let state = self.state.lock();
        match state.mode {
            LockMode::Unlocked => false,
            LockMode::Exclusive => state.holder == Some(current),
            LockMode::Shared => state.shared_holds_of(current) > 0,
        }
    }

    /// Outstanding lock calls over all holders
    pub fn times_locked(&self) -> u32 {
        self.state.lock().times_locked
    }

    /// Exclusive holder, if any
    pub fn holder(&self) -> Option<ThreadId> {
        self.state.lock().holder
    }

    /// Outstanding shared acquisitions
    pub fn shared_holder_count(&self) -> u32 {
        self.state.lock().shared_holder_count
    }

    /// Number of blocked threads on each list
    pub fn waiter_counts(&self) -> WaiterCounts {
        let state = self.state.lock();
        WaiterCounts {
            shared: state.shared_waiters.len(),
            exclusive: state.exclusive_waiters.len(),
            big_lock: state.big_lock_waiters.len(),
        }
    }

    /// Grant the lock to the next waiters after `vacated` was released
    ///
    /// `state` must be unlocked. Runs with the state spinlock held.
    fn wake_next(&self, state: &mut MutexState, vacated: LockMode) {
        debug_assert_eq!(state.mode, LockMode::Unlocked);

        if self.behavior == MutexBehavior::BigLock {
            if let Some(waiter) = state.big_lock_waiters.pop_front() {
                self.grant_exclusive_to(state, waiter);
            }
            return;
        }

        let prefer_shared = vacated == LockMode::Exclusive;
        if prefer_shared && !state.shared_waiters.is_empty() {
            self.grant_all_shared(state);
        } else if let Some(waiter) = state.exclusive_waiters.pop_front() {
            self.grant_exclusive_to(state, waiter);
        } else if !state.shared_waiters.is_empty() {
            self.grant_all_shared(state);
        }
    }

    fn grant_exclusive_to(&self, state: &mut MutexState, waiter: MutexWaiter) {
        log_trace_if!(
            LOCAL_TRACE,
            "mutex {}: handing exclusive to thread {} depth {}",
            self.name,
            waiter.thread,
            waiter.requested
        );
        state.grant_exclusive(waiter.thread, waiter.requested);
        wake_thread(&*self.sched, &waiter.cell);
    }

    fn grant_all_shared(&self, state: &mut MutexState) {
        while let Some(waiter) = state.shared_waiters.pop_front() {
            state.grant_shared(waiter.thread, waiter.requested);
            wake_thread(&*self.sched, &waiter.cell);
        }
    }

    fn block_until_granted(&self, state: SpinLockGuard<'_, MutexState>, cell: &WaitCell) {
        let result = block_current(&*self.sched, state, cell, None);
        debug_assert_eq!(result, BlockResult::Woken);
    }

    fn assert_big_lock(&self, op: &str) {
        if self.behavior != MutexBehavior::BigLock {
            panic!("mutex {}: {} on a regular mutex", self.name, op);
        }
    }

    /// Validate that this is a valid mutex
    fn validate(&self) {
        debug_assert_eq!(self.magic, MUTEX_MAGIC, "invalid mutex magic");
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        self.validate();

        let state = self.state.get_mut();
        if state.mode != LockMode::Unlocked {
            panic!("mutex {}: destroyed while locked", self.name);
        }
        if state.has_waiters() {
            panic!("mutex {}: destroyed with waiters", self.name);
        }
        self.magic = 0;
    }
}

impl fmt::Debug for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Mutex")
            .field("name", &self.name)
            .field("behavior", &self.behavior)
            .field("mode", &state.mode)
            .field("times_locked", &state.times_locked)
            .field("holder", &state.holder)
            .field("shared_holder_count", &state.shared_holder_count)
            .finish()
    }
}

/// ============================================================================
/// Mutex Locker
/// ============================================================================

/// RAII holder of a [`Mutex`]
///
/// Locks on construction and unlocks on drop if still held.
pub struct MutexLocker<'a> {
    mutex: &'a Mutex,
    mode: LockMode,
    locked: bool,
}

impl<'a> MutexLocker<'a> {
    /// Lock `mutex` in `mode`
    pub fn new(mutex: &'a Mutex, mode: LockMode) -> Self {
        mutex.lock(mode);
        Self {
            mutex,
            mode,
            locked: true,
        }
    }

    /// Release the hold early
    pub fn unlock(&mut self) {
        debug_assert!(self.locked);
        self.mutex.unlock();
        self.locked = false;
    }

    /// Take the hold again after [`MutexLocker::unlock`]
    pub fn relock(&mut self) {
        debug_assert!(!self.locked);
        self.mutex.lock(self.mode);
        self.locked = true;
    }

    /// Whether this locker currently holds the mutex
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for MutexLocker<'_> {
    fn drop(&mut self) {
        if self.locked {
            self.mutex.unlock();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::timer::{Clock, ClockId, Deadline};
    use crate::rustux::types::Nanoseconds;
    use core::sync::atomic::{AtomicU64, Ordering};

    /// Single-threaded scheduler; blocking is a bug in these tests
    struct SoloScheduler {
        tid: AtomicU64,
    }

    impl SoloScheduler {
        fn new(tid: ThreadId) -> Arc<Self> {
            Arc::new(Self {
                tid: AtomicU64::new(tid),
            })
        }

        fn switch_to(&self, tid: ThreadId) {
            self.tid.store(tid, Ordering::SeqCst);
        }
    }

    impl Clock for SoloScheduler {
        fn now(&self, _clock: ClockId) -> Nanoseconds {
            0
        }
    }

    impl Scheduler for SoloScheduler {
        fn current_thread(&self) -> ThreadId {
            self.tid.load(Ordering::SeqCst)
        }

        fn block(&self, _cell: &WaitCell, _deadline: Option<Deadline>) -> BlockResult {
            panic!("unexpected block");
        }

        fn unblock(&self, _cell: &WaitCell) {}
    }

    #[test]
    fn test_recursive_exclusive() {
        let sched = SoloScheduler::new(1);
        let mutex = Mutex::new_regular("test", sched);

        mutex.lock(LockMode::Exclusive);
        mutex.lock(LockMode::Exclusive);
        mutex.lock(LockMode::Shared);
        assert_eq!(mutex.mode(), LockMode::Exclusive);
        assert_eq!(mutex.times_locked(), 3);
        assert_eq!(mutex.holder(), Some(1));
        assert!(mutex.own_lock());

        mutex.unlock();
        mutex.unlock();
        assert!(mutex.is_locked());
        mutex.unlock();
        assert_eq!(mutex.mode(), LockMode::Unlocked);
        assert_eq!(mutex.holder(), None);
        assert_eq!(mutex.times_locked(), 0);
    }

    #[test]
    fn test_shared_holders() {
        let sched = SoloScheduler::new(1);
        let mutex = Mutex::new_regular("test", sched.clone());

        mutex.lock(LockMode::Shared);
        sched.switch_to(2);
        mutex.lock(LockMode::Shared);
        mutex.lock(LockMode::Shared);
        assert_eq!(mutex.mode(), LockMode::Shared);
        assert_eq!(mutex.shared_holder_count(), 3);
        assert_eq!(mutex.times_locked(), 3);
        assert_eq!(mutex.holder(), None);

        sched.switch_to(3);
        assert!(!mutex.own_lock());

        sched.switch_to(1);
        mutex.unlock();
        assert!(!mutex.own_lock());
        sched.switch_to(2);
        mutex.unlock();
        mutex.unlock();
        assert_eq!(mutex.mode(), LockMode::Unlocked);
    }

    #[test]
    fn test_big_lock_force_and_restore() {
        let sched = SoloScheduler::new(1);
        let mutex = Mutex::new_big_lock("big", sched.clone());

        mutex.lock(LockMode::Exclusive);
        mutex.lock(LockMode::Exclusive);
        mutex.lock(LockMode::Exclusive);

        sched.switch_to(2);
        assert_eq!(mutex.force_unlock_exclusive_if_locked(), 0);
        assert_eq!(mutex.times_locked(), 3);

        sched.switch_to(1);
        assert_eq!(mutex.force_unlock_exclusive_if_locked(), 3);
        assert_eq!(mutex.mode(), LockMode::Unlocked);
        assert_eq!(mutex.force_unlock_exclusive_if_locked(), 0);

        mutex.restore_exclusive_lock(0);
        assert_eq!(mutex.mode(), LockMode::Unlocked);

        mutex.restore_exclusive_lock(3);
        assert_eq!(mutex.holder(), Some(1));
        assert_eq!(mutex.times_locked(), 3);

        mutex.restore_exclusive_lock(2);
        assert_eq!(mutex.times_locked(), 5);
        for _ in 0..5 {
            mutex.unlock();
        }
        assert!(!mutex.is_locked());
    }

    #[test]
    fn test_locker() {
        let sched = SoloScheduler::new(1);
        let mutex = Mutex::new_regular("test", sched);
        {
            let mut locker = MutexLocker::new(&mutex, LockMode::Exclusive);
            assert!(mutex.own_lock());
            locker.unlock();
            assert!(!mutex.is_locked());
            locker.relock();
            assert!(locker.is_locked());
            assert!(mutex.is_locked());
        }
        assert!(!mutex.is_locked());
    }

    #[test]
    #[should_panic(expected = "unlock of unlocked mutex")]
    fn test_unlock_unlocked_panics() {
        let sched = SoloScheduler::new(1);
        let mutex = Mutex::new_regular("test", sched);
        mutex.unlock();
    }

    #[test]
    #[should_panic(expected = "shared lock on a big lock")]
    fn test_shared_on_big_lock_panics() {
        let sched = SoloScheduler::new(1);
        let mutex = Mutex::new_big_lock("big", sched);
        mutex.lock(LockMode::Shared);
    }

    #[test]
    #[should_panic(expected = "lock with Unlocked mode")]
    fn test_lock_unlocked_mode_panics() {
        let sched = SoloScheduler::new(1);
        let mutex = Mutex::new_regular("test", sched);
        mutex.lock(LockMode::Unlocked);
    }

    #[test]
    #[should_panic(expected = "on a regular mutex")]
    fn test_force_unlock_on_regular_panics() {
        let sched = SoloScheduler::new(1);
        let mutex = Mutex::new_regular("test", sched);
        mutex.force_unlock_exclusive_if_locked();
    }

    #[test]
    #[should_panic(expected = "unlocking mutex held by")]
    fn test_unlock_by_non_holder_panics() {
        let sched = SoloScheduler::new(1);
        let mutex: &'static Mutex = Box::leak(Box::new(Mutex::new_regular("test", sched.clone())));
        mutex.lock(LockMode::Exclusive);
        sched.switch_to(2);
        mutex.unlock();
    }

    #[test]
    #[should_panic(expected = "upgrading shared hold to exclusive")]
    fn test_self_upgrade_panics() {
        let sched = SoloScheduler::new(1);
        let mutex: &'static Mutex = Box::leak(Box::new(Mutex::new_regular("test", sched)));
        mutex.lock(LockMode::Shared);
        mutex.lock(LockMode::Exclusive);
    }

    #[test]
    #[should_panic(expected = "destroyed while locked")]
    fn test_drop_locked_panics() {
        let sched = SoloScheduler::new(1);
        let mutex = Mutex::new_regular("test", sched);
        mutex.lock(LockMode::Exclusive);
        drop(mutex);
    }
}
