// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Spinlock Implementation
//!
//! Spinlocks guard the short bookkeeping sections of the blocking
//! primitives. No code path in this crate suspends while holding one;
//! guards are released before [`Scheduler::block`] is entered.
//!
//! [`Scheduler::block`]: crate::kernel::thread::Scheduler::block

/// Kernel spinlock
pub type SpinLock<T> = spin::Mutex<T>;

/// RAII guard for a [`SpinLock`]
pub type SpinLockGuard<'a, T> = spin::MutexGuard<'a, T>;

/// Lock two spinlocks in a stable global order
///
/// Locks are ordered by address so that two threads locking the same pair
/// from opposite ends can never deadlock. The guards are returned in
/// argument order. `a` and `b` must be distinct.
pub fn lock_pair<'a, T>(
    a: &'a SpinLock<T>,
    b: &'a SpinLock<T>,
) -> (SpinLockGuard<'a, T>, SpinLockGuard<'a, T>) {
    debug_assert!(!core::ptr::eq(a, b), "lock_pair: same lock twice");

    if (a as *const SpinLock<T>) < (b as *const SpinLock<T>) {
        let ga = a.lock();
        let gb = b.lock();
        (ga, gb)
    } else {
        let gb = b.lock();
        let ga = a.lock();
        (ga, gb)
    }
}
