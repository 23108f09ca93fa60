// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Synchronization Primitives
//!
//! Blocking primitives built on top of the [`Scheduler`] contract.
//!
//! # Primitives
//!
//! - **Mutex**: Recursive shared/exclusive lock with a big-lock variant
//! - **Wait Queue**: Index-linked FIFO of waiters with O(1) removal
//! - **Spinlock**: Short critical sections guarding the above
//!
//! [`Scheduler`]: crate::kernel::thread::Scheduler

pub mod mutex;
pub mod spin;
pub mod wait_queue;

// Re-exports
pub use mutex::*;
pub use spin::*;
pub use wait_queue::*;
