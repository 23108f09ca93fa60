// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Synchronization Core Test Suite
//!
//! Multi-threaded scenario tests that run the mutex and futex code on host
//! threads.
//!
//! # Organization
//!
//! - [`harness`] - Host scheduler and fake address spaces
//! - [`mutex_tests`] - Mutex exclusion, recursion, wake order, big lock
//! - [`futex_tests`] - Futex keys, wait/wake, requeue, wake-op, timeouts
