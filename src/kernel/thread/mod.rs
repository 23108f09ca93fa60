// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Thread Blocking Contract
//!
//! The synchronization core never switches contexts itself. It talks to the
//! scheduler through the [`Scheduler`] trait and hands each blocked thread a
//! [`WaitCell`] that the waker later signals.
//!
//! # Design
//!
//! - A waiter allocates a `WaitCell`, links it into the owner's waiter list
//!   while holding the owner's spinlock, then calls [`block_current`]
//! - `block_current` drops the spinlock guard and suspends. The cell's
//!   signal is sticky, so a wake that lands between the unlock and the
//!   actual suspension is observed by [`Scheduler::block`] and the thread
//!   returns immediately
//! - Timeouts race against wakes through a single CAS on the cell: exactly
//!   one of [`WaitCell::wake`] and [`WaitCell::expire`] succeeds
//!
//! # Cell States
//!
//! ```text
//! Waiting -> Woken      (waker, under the owner's spinlock)
//!         -> TimedOut   (scheduler, when the deadline passes)
//! ```

use crate::kernel::timer::{Clock, Deadline};
use core::sync::atomic::{AtomicU8, Ordering};

/// ============================================================================
/// Thread ID
/// ============================================================================

/// Thread ID type
pub type ThreadId = crate::rustux::types::Tid;

/// ============================================================================
/// Wait Cell
/// ============================================================================

/// Result of a blocking wait
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockResult {
    /// Another thread explicitly woke us
    Woken = 1,

    /// The deadline passed first
    TimedOut = 2,
}

const CELL_WAITING: u8 = 0;
const CELL_WOKEN: u8 = BlockResult::Woken as u8;
const CELL_TIMED_OUT: u8 = BlockResult::TimedOut as u8;

/// Wake token shared between one blocked thread and its waker
#[derive(Debug)]
pub struct WaitCell {
    /// Thread that blocks on this cell
    thread: ThreadId,

    /// One of the CELL_* states
    state: AtomicU8,
}

impl WaitCell {
    /// Create a new cell for `thread`
    pub const fn new(thread: ThreadId) -> Self {
        Self {
            thread,
            state: AtomicU8::new(CELL_WAITING),
        }
    }

    /// Thread waiting on this cell
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Mark the cell woken
    ///
    /// Returns false if the waiter already timed out.
    pub fn wake(&self) -> bool {
        self.state
            .compare_exchange(CELL_WAITING, CELL_WOKEN, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Mark the cell timed out
    ///
    /// Returns false if a waker got there first.
    pub fn expire(&self) -> bool {
        self.state
            .compare_exchange(CELL_WAITING, CELL_TIMED_OUT, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Final outcome, or `None` while still waiting
    pub fn outcome(&self) -> Option<BlockResult> {
        match self.state.load(Ordering::Acquire) {
            CELL_WOKEN => Some(BlockResult::Woken),
            CELL_TIMED_OUT => Some(BlockResult::TimedOut),
            _ => None,
        }
    }
}

/// ============================================================================
/// Scheduler Contract
/// ============================================================================

/// Scheduler services consumed by the blocking primitives
///
/// Implementations must not block in [`Scheduler::unblock`]: it is called
/// with spinlocks held.
pub trait Scheduler: Clock + Send + Sync {
    /// ID of the thread executing the call
    fn current_thread(&self) -> ThreadId;

    /// Suspend the current thread until `cell` leaves the waiting state
    ///
    /// Must return at once if the cell was already signalled. When
    /// `deadline` passes the implementation calls [`WaitCell::expire`]; if
    /// that fails the thread was woken and `Woken` is returned.
    fn block(&self, cell: &WaitCell, deadline: Option<Deadline>) -> BlockResult;

    /// Make the thread blocked on `cell` runnable again
    ///
    /// Called after the cell has been marked woken.
    fn unblock(&self, cell: &WaitCell);
}

/// Release `guard` and suspend the current thread on `cell`
///
/// The cell must already be reachable by wakers (linked into a waiter list
/// protected by the lock `guard` holds).
pub fn block_current<G>(
    sched: &dyn Scheduler,
    guard: G,
    cell: &WaitCell,
    deadline: Option<Deadline>,
) -> BlockResult {
    drop(guard);
    sched.block(cell, deadline)
}

/// Signal `cell` and hand its thread back to the scheduler
///
/// Returns false if the waiter had already timed out.
pub fn wake_thread(sched: &dyn Scheduler, cell: &WaitCell) -> bool {
    if !cell.wake() {
        return false;
    }
    sched.unblock(cell);
    true
}

// ============================================================================
// Tests
// ============================================================================
