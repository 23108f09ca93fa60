// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Futex Core
//!
//! Kernel side of the fast userspace mutex. User threads wait on and wake
//! each other through 32-bit words in their own memory; the kernel keeps one
//! wait queue per [`FutexKey`] in a [`FutexContext`].
//!
//! # Design
//!
//! - **Keys, not addresses**: Private futexes are keyed by address space and
//!   virtual address, shared futexes by backing VM object and offset, so
//!   processes mapping the same memory at different addresses meet
//! - **Queues on demand**: A queue exists only while it has waiters or a
//!   thread is about to wait on it
//! - **Owned registry**: The registry is a service object created at kernel
//!   init and passed by reference. There is no global instance
//!
//! # Organization
//!
//! - [`key`] - Key resolution
//! - [`queue`] - Per-key wait queue
//! - [`context`] - Registry and the wait/wake/requeue operations
//! - [`wake_op`] - WAKE_OP operation encoding

pub mod context;
pub mod key;
pub mod queue;
pub mod wake_op;

pub use context::{FutexContext, FutexStats, FutexWord};
pub use key::{FutexKey, PRIVATE_TAG};
pub use queue::FutexQueue;
pub use wake_op::{WakeCmp, WakeOp};

use crate::kernel::vm::VmError;
use crate::rustux::errors::*;
use core::fmt;

/// Bitset that matches every waiter
pub const FUTEX_BITSET_MATCH_ANY: u32 = 0xFFFF_FFFF;

/// Result type for futex operations
pub type Result<T> = core::result::Result<T, FutexError>;

/// ============================================================================
/// Errors
/// ============================================================================

/// Recoverable futex failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutexError {
    /// User word not mapped, not readable, or outside user space
    Fault,

    /// Malformed arguments
    InvalidArgs,

    /// The user word did not hold the expected value
    WouldBlock,

    /// The deadline passed before a wake
    TimedOut,

    /// Unknown or unsupported command
    NotSupported,
}

impl FutexError {
    /// Positive errno for this error
    pub const fn errno(self) -> Errno {
        match self {
            Self::Fault => EFAULT,
            Self::InvalidArgs => EINVAL,
            Self::WouldBlock => EAGAIN,
            Self::TimedOut => ETIMEDOUT,
            Self::NotSupported => ENOSYS,
        }
    }
}

impl From<VmError> for FutexError {
    fn from(err: VmError) -> Self {
        match err {
            VmError::AlignmentError => Self::InvalidArgs,
            VmError::InvalidAddress | VmError::NotMapped | VmError::PageFault => Self::Fault,
        }
    }
}

impl fmt::Display for FutexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(errno_name(self.errno()))
    }
}
