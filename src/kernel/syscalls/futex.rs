// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Futex System Call
//!
//! Decodes the `futex(2)` arguments and dispatches to [`FutexContext`].
//! Command numbers and flag bits follow the Linux ABI.
//!
//! # Commands Implemented
//!
//! - `FUTEX_WAIT` - Wait if the word holds `val` (relative timeout)
//! - `FUTEX_WAKE` - Wake up to `val` waiters
//! - `FUTEX_REQUEUE` - Wake `val`, move up to `val2` to the second word
//! - `FUTEX_CMP_REQUEUE` - As `FUTEX_REQUEUE` if the word holds `val3`
//! - `FUTEX_WAKE_OP` - Update the second word and wake conditionally
//! - `FUTEX_WAIT_BITSET` - Wait with a bitset (absolute timeout)
//! - `FUTEX_WAKE_BITSET` - Wake waiters whose bitset intersects `val3`
//!
//! Priority-inheritance commands and `FUTEX_FD` are rejected with `ENOSYS`.
//!
//! # Keys
//!
//! A futex is shared between processes unless `FUTEX_PRIVATE_FLAG` is set.

use crate::kernel::futex::{
    FutexContext, FutexError, FutexWord, Result, WakeOp, FUTEX_BITSET_MATCH_ANY,
};
use crate::kernel::sync::mutex::Mutex;
use crate::kernel::syscalls::{err_to_ret, ok_to_ret, SyscallRet};
use crate::kernel::timer::{ClockId, Deadline, Timespec};
use crate::kernel::vm::{AddressSpace, VAddr};

// Import logging macros
use crate::{log_error, log_trace_if, log_warn};

const LOCAL_TRACE: bool = false;

/// ============================================================================
/// ABI Constants
/// ============================================================================

pub const FUTEX_WAIT: u32 = 0;
pub const FUTEX_WAKE: u32 = 1;
pub const FUTEX_FD: u32 = 2;
pub const FUTEX_REQUEUE: u32 = 3;
pub const FUTEX_CMP_REQUEUE: u32 = 4;
pub const FUTEX_WAKE_OP: u32 = 5;
pub const FUTEX_LOCK_PI: u32 = 6;
pub const FUTEX_UNLOCK_PI: u32 = 7;
pub const FUTEX_TRYLOCK_PI: u32 = 8;
pub const FUTEX_WAIT_BITSET: u32 = 9;
pub const FUTEX_WAKE_BITSET: u32 = 10;
pub const FUTEX_WAIT_REQUEUE_PI: u32 = 11;
pub const FUTEX_CMP_REQUEUE_PI: u32 = 12;

bitflags::bitflags! {
    /// Modifier bits of the futex op word
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FutexFlags: u32 {
        /// Futex is private to the calling process
        const PRIVATE = 128;

        /// Timeout is measured on the realtime clock
        const CLOCK_REALTIME = 256;
    }
}

/// Bits of the op word that select the command
pub const FUTEX_CMD_MASK: u32 = !FutexFlags::all().bits();

/// Supported futex command
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutexCommand {
    Wait = FUTEX_WAIT,
    Wake = FUTEX_WAKE,
    Requeue = FUTEX_REQUEUE,
    CmpRequeue = FUTEX_CMP_REQUEUE,
    WakeOp = FUTEX_WAKE_OP,
    WaitBitset = FUTEX_WAIT_BITSET,
    WakeBitset = FUTEX_WAKE_BITSET,
}

impl FutexCommand {
    /// Decode a command number
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            FUTEX_WAIT => Some(Self::Wait),
            FUTEX_WAKE => Some(Self::Wake),
            FUTEX_REQUEUE => Some(Self::Requeue),
            FUTEX_CMP_REQUEUE => Some(Self::CmpRequeue),
            FUTEX_WAKE_OP => Some(Self::WakeOp),
            FUTEX_WAIT_BITSET => Some(Self::WaitBitset),
            FUTEX_WAKE_BITSET => Some(Self::WakeBitset),
            _ => None,
        }
    }

    /// Check if the command may block
    pub const fn is_wait(self) -> bool {
        matches!(self, Self::Wait | Self::WaitBitset)
    }

    /// Get the command name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wait => "FUTEX_WAIT",
            Self::Wake => "FUTEX_WAKE",
            Self::Requeue => "FUTEX_REQUEUE",
            Self::CmpRequeue => "FUTEX_CMP_REQUEUE",
            Self::WakeOp => "FUTEX_WAKE_OP",
            Self::WaitBitset => "FUTEX_WAIT_BITSET",
            Self::WakeBitset => "FUTEX_WAKE_BITSET",
        }
    }
}

/// ============================================================================
/// Parameters
/// ============================================================================

/// Raw futex syscall arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct FutexParams {
    /// First futex word
    pub userspace_address: VAddr,

    /// Command and flag bits
    pub futex_op: u32,

    /// Expected value or wake count
    pub val: u32,

    /// Requeue limit or second wake count
    pub val2: u32,

    /// Wait timeout, already copied in from user space
    pub timeout: Option<Timespec>,

    /// Second futex word
    pub userspace_address2: VAddr,

    /// Bitset, compare value or WAKE_OP encoding
    pub val3: u32,
}

/// Calling thread's context
pub struct FutexCaller<'a> {
    /// Address space the futex addresses belong to
    pub aspace: &'a dyn AddressSpace,

    /// Process big lock, dropped while waiting
    pub big_lock: Option<&'a Mutex>,
}

/// ============================================================================
/// Dispatch
/// ============================================================================

/// Interpret a count argument; negative values are invalid
fn count_arg(raw: u32) -> Result<usize> {
    let count = raw as i32;
    if count < 0 {
        return Err(FutexError::InvalidArgs);
    }
    Ok(count as usize)
}

/// Convert the user timeout into a deadline
///
/// WAIT timeouts are relative; WAIT_BITSET timeouts are absolute on the
/// selected clock.
fn wait_deadline(
    ctx: &FutexContext,
    timeout: Option<Timespec>,
    clock: ClockId,
    absolute: bool,
) -> Result<Option<Deadline>> {
    let Some(timeout) = timeout else {
        return Ok(None);
    };
    let nanos = timeout.to_nanos().ok_or(FutexError::InvalidArgs)?;
    Ok(Some(if absolute {
        Deadline::new(clock, nanos)
    } else {
        Deadline::after(ctx.scheduler(), clock, nanos)
    }))
}

/// Run one futex operation
///
/// # Returns
///
/// - `WAIT`/`WAIT_BITSET`: 0 when woken
/// - `WAKE`/`WAKE_BITSET`/`WAKE_OP`: threads woken
/// - `REQUEUE`/`CMP_REQUEUE`: threads woken plus threads requeued
pub fn futex(ctx: &FutexContext, caller: &FutexCaller<'_>, params: &FutexParams) -> Result<usize> {
    let flags = FutexFlags::from_bits_truncate(params.futex_op);
    let raw_cmd = params.futex_op & FUTEX_CMD_MASK;

    let Some(cmd) = FutexCommand::from_raw(raw_cmd) else {
        log_error!("futex: unsupported command {}", raw_cmd);
        return Err(FutexError::NotSupported);
    };

    if flags.contains(FutexFlags::CLOCK_REALTIME) && !cmd.is_wait() {
        log_warn!("futex: CLOCK_REALTIME is only valid for waits, got {}", cmd.name());
        return Err(FutexError::NotSupported);
    }

    let shared = !flags.contains(FutexFlags::PRIVATE);
    let clock = if flags.contains(FutexFlags::CLOCK_REALTIME) {
        ClockId::Realtime
    } else {
        ClockId::Monotonic
    };

    log_trace_if!(
        LOCAL_TRACE,
        "futex: {} addr={:#x} val={} val2={} addr2={:#x} val3={:#x}",
        cmd.name(),
        params.userspace_address,
        params.val,
        params.val2,
        params.userspace_address2,
        params.val3
    );

    let word = FutexWord::resolve(caller.aspace, params.userspace_address, shared)?;

    match cmd {
        FutexCommand::Wait => {
            let deadline = wait_deadline(ctx, params.timeout, clock, false)?;
            ctx.wait(&word, params.val, deadline, FUTEX_BITSET_MATCH_ANY, caller.big_lock)
        }
        FutexCommand::WaitBitset => {
            let deadline = wait_deadline(ctx, params.timeout, clock, true)?;
            ctx.wait(&word, params.val, deadline, params.val3, caller.big_lock)
        }
        FutexCommand::Wake => ctx.wake(&word, count_arg(params.val)?, FUTEX_BITSET_MATCH_ANY),
        FutexCommand::WakeBitset => ctx.wake(&word, count_arg(params.val)?, params.val3),
        FutexCommand::Requeue | FutexCommand::CmpRequeue => {
            let count = count_arg(params.val)?;
            let limit = count_arg(params.val2)?;
            let expected = (cmd == FutexCommand::CmpRequeue).then_some(params.val3);
            let word2 = FutexWord::resolve(caller.aspace, params.userspace_address2, shared)?;
            ctx.requeue(&word, &word2, count, limit, expected)
        }
        FutexCommand::WakeOp => {
            let count = count_arg(params.val)?;
            let count2 = count_arg(params.val2)?;
            let op = WakeOp::decode(params.val3)?;
            let word2 = FutexWord::resolve(caller.aspace, params.userspace_address2, shared)?;
            ctx.wake_op(&word, &word2, count, count2, &op)
        }
    }
}

/// Futex syscall handler
///
/// # Returns
///
/// * On success: see [`futex`]
/// * On error: Negative errno
pub fn sys_futex(ctx: &FutexContext, caller: &FutexCaller<'_>, params: &FutexParams) -> SyscallRet {
    log_trace_if!(
        LOCAL_TRACE,
        "sys_futex: addr={:#x} op={:#x}",
        params.userspace_address,
        params.futex_op
    );

    match futex(ctx, caller, params) {
        Ok(value) => ok_to_ret(value),
        Err(err) => err_to_ret(err.errno()),
    }
}
