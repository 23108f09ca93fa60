// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Logging
//!
//! Logging macros used by the synchronization core. With the `logging`
//! feature enabled they forward to the `log` crate facade, so whatever
//! logger the kernel installs at boot (serial, UART, ring buffer) receives
//! the records. Without the feature the macros still type-check their
//! arguments but compile to nothing.
//!
//! # Usage
//!
//! ```rust,ignore
//! // Simple logging
//! log_info!("futex registry initialized");
//! log_error!("futex: bad op {:#x}", op);
//!
//! // Conditional logging
//! log_trace_if!(LOCAL_TRACE, "wake {} at {:#x}", count, addr);
//! ```

/// Target used for all records emitted by this crate
pub const LOG_TARGET: &str = "rustux::sync";

#[cfg(feature = "logging")]
#[doc(hidden)]
pub use log as __log;

/// Log a trace message
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::kernel::debug::__log::trace!(target: $crate::kernel::debug::LOG_TARGET, $($arg)*)
    };
}

/// Log a debug message
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::kernel::debug::__log::debug!(target: $crate::kernel::debug::LOG_TARGET, $($arg)*)
    };
}

/// Log an info message
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::kernel::debug::__log::info!(target: $crate::kernel::debug::LOG_TARGET, $($arg)*)
    };
}

/// Log a warning message
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::kernel::debug::__log::warn!(target: $crate::kernel::debug::LOG_TARGET, $($arg)*)
    };
}

/// Log an error message
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::kernel::debug::__log::error!(target: $crate::kernel::debug::LOG_TARGET, $($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

/// Log a trace message if condition is true
#[macro_export]
macro_rules! log_trace_if {
    ($cond:expr, $($arg:tt)*) => {
        if $cond {
            $crate::log_trace!($($arg)*);
        }
    };
}
