// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Common type aliases used throughout the kernel

/// Virtual address type
pub type VAddr = usize;

/// Status code type (negative values indicate errors, see [`crate::rustux::errors`])
pub type Status = i32;

/// Thread ID type
pub type Tid = u64;

/// Address space ID type
pub type AspaceId = u64;

/// VM object ID type
pub type VmoId = u64;

/// Time value in nanoseconds
pub type Nanoseconds = u64;

/// Nanoseconds per second
pub const NSEC_PER_SEC: u64 = 1_000_000_000;
