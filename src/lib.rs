// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Rustux Synchronization Core
//!
//! The blocking half of the Rustux kernel's synchronization story:
//!
//! - [`kernel::sync::Mutex`] - recursive shared/exclusive mutex, including the
//!   process "big lock" flavour that can be dropped and restored around
//!   blocking operations
//! - [`kernel::futex`] - futex keys, the per-key wait queue registry and the
//!   WAIT/WAKE/REQUEUE/WAKE_OP operations
//! - [`kernel::syscalls::futex`] - the `futex` system call entry point
//!
//! The scheduler, user memory access and region lookup are consumed through
//! the traits in [`kernel::thread`], [`kernel::usercopy`] and [`kernel::vm`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// Common types
pub mod rustux;

// Kernel modules
pub mod kernel;
