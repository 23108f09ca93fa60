// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Rustux Microkernel - Synchronization Core
//!
//! This module contains the kernel-side blocking primitives and the
//! narrow interfaces they consume from the rest of the kernel.

// Logging macros, imported by path (`use crate::log_trace`)
pub mod debug;

// Collaborator contracts
pub mod thread;
pub mod timer;
pub mod usercopy;
pub mod vm;

// Blocking primitives
pub mod sync;
pub mod futex;
pub mod syscalls;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use crate::rustux::types::*;
