// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! System Call Interface
//!
//! Syscall-facing entry points of the synchronization core. Handlers decode
//! raw register values, run the typed operation and fold its result into a
//! single [`SyscallRet`].
//!
//! # Error Return Convention
//!
//! ```text
//! Success: return value in r0/rax/a0 (positive or zero)
//! Failure: return negative errno
//! ```

use crate::rustux::errors::{errno_to_status, Errno};

pub mod futex;

pub use futex::{futex, sys_futex, FutexCaller, FutexParams};

/// ============================================================================
/// Syscall Return Values
/// ============================================================================

/// System call return value
///
/// Success: positive or zero value
/// Failure: negative error code
pub type SyscallRet = isize;

/// Convert an errno to a negative return value
#[inline]
pub const fn err_to_ret(err: Errno) -> SyscallRet {
    errno_to_status(err) as SyscallRet
}

/// Convert success value to return value
#[inline]
pub const fn ok_to_ret(val: usize) -> SyscallRet {
    val as SyscallRet
}
