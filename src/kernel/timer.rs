// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Clocks and Deadlines
//!
//! Blocking operations in this crate take an optional absolute
//! [`Deadline`] on one of the kernel clocks. The clock itself is provided
//! by the platform timer code through the [`Clock`] trait.
//!
//! # Usage
//!
//! ```rust,ignore
//! // Relative timeout of 5ms on the monotonic clock
//! let deadline = Deadline::after(clock, ClockId::Monotonic, 5_000_000);
//!
//! // Absolute deadline taken from a user timespec
//! let deadline = Deadline::new(ClockId::Realtime, timespec.to_nanos()?);
//! ```

use crate::rustux::types::*;

/// ============================================================================
/// Clocks
/// ============================================================================

/// Kernel clock selector
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockId {
    /// Monotonic time since boot; never jumps
    Monotonic = 0,

    /// Wall clock time since the UNIX epoch; may be stepped
    Realtime = 1,
}

/// Source of current time for each [`ClockId`]
pub trait Clock {
    /// Current time on `clock`, in nanoseconds
    fn now(&self, clock: ClockId) -> Nanoseconds;
}

/// ============================================================================
/// Deadline
/// ============================================================================

/// Absolute point in time on a specific clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// Clock the deadline is measured against
    pub clock: ClockId,

    /// Absolute expiry time in nanoseconds
    pub at: Nanoseconds,
}

impl Deadline {
    /// Create an absolute deadline
    pub const fn new(clock: ClockId, at: Nanoseconds) -> Self {
        Self { clock, at }
    }

    /// Create a deadline `timeout` nanoseconds from now on `clock`
    ///
    /// Saturates instead of wrapping for very long timeouts.
    pub fn after<C: Clock + ?Sized>(source: &C, clock: ClockId, timeout: Nanoseconds) -> Self {
        Self {
            clock,
            at: source.now(clock).saturating_add(timeout),
        }
    }

    /// Check whether the deadline has been reached
    pub fn has_passed<C: Clock + ?Sized>(&self, source: &C) -> bool {
        source.now(self.clock) >= self.at
    }

    /// Nanoseconds left until expiry (0 once passed)
    pub fn remaining<C: Clock + ?Sized>(&self, source: &C) -> Nanoseconds {
        self.at.saturating_sub(source.now(self.clock))
    }
}

/// ============================================================================
/// Timespec
/// ============================================================================

/// User-supplied time value (`struct timespec`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timespec {
    /// Seconds
    pub tv_sec: i64,

    /// Nanoseconds, must be in `0..1_000_000_000`
    pub tv_nsec: i64,
}

impl Timespec {
    /// Create a timespec
    pub const fn new(tv_sec: i64, tv_nsec: i64) -> Self {
        Self { tv_sec, tv_nsec }
    }

    /// Create a timespec from a nanosecond count
    pub const fn from_nanos(nanos: Nanoseconds) -> Self {
        Self {
            tv_sec: (nanos / NSEC_PER_SEC) as i64,
            tv_nsec: (nanos % NSEC_PER_SEC) as i64,
        }
    }

    /// Convert to nanoseconds
    ///
    /// Returns `None` for negative or non-normalized values.
    pub fn to_nanos(&self) -> Option<Nanoseconds> {
        if self.tv_sec < 0 || self.tv_nsec < 0 || self.tv_nsec as u64 >= NSEC_PER_SEC {
            return None;
        }
        Some(
            (self.tv_sec as u64)
                .saturating_mul(NSEC_PER_SEC)
                .saturating_add(self.tv_nsec as u64),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
