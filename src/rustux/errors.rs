// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Error Codes
//!
//! Syscall-facing error numbers. A failing syscall returns the negated
//! errno as its [`Status`].

use crate::rustux::types::Status;

/// Errno value type
pub type Errno = i32;

/// Resource temporarily unavailable (value changed, retry)
pub const EAGAIN: Errno = 11;

/// Bad address
pub const EFAULT: Errno = 14;

/// Invalid argument
pub const EINVAL: Errno = 22;

/// Function not implemented
pub const ENOSYS: Errno = 38;

/// Timed out
pub const ETIMEDOUT: Errno = 110;

/// Convert an errno into a (negative) status code
#[inline]
pub const fn errno_to_status(errno: Errno) -> Status {
    -errno
}

/// Get the symbolic name of an errno value
pub const fn errno_name(errno: Errno) -> &'static str {
    match errno {
        EAGAIN => "EAGAIN",
        EFAULT => "EFAULT",
        EINVAL => "EINVAL",
        ENOSYS => "ENOSYS",
        ETIMEDOUT => "ETIMEDOUT",
        _ => "E???",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_to_status() {
        assert_eq!(errno_to_status(EFAULT), -14);
        assert_eq!(errno_to_status(ETIMEDOUT), -110);
    }

    #[test]
    fn test_errno_name() {
        assert_eq!(errno_name(EAGAIN), "EAGAIN");
        assert_eq!(errno_name(12345), "E???");
    }
}
