// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! User/Kernel Boundary Safety
//!
//! Futex operations read and modify single 32-bit words in user memory.
//! This module validates those addresses and defines the [`UserAccess`]
//! contract through which the word is actually touched.
//!
//! # Design
//!
//! - **Validation first**: A user word is checked for null, user range and
//!   4-byte alignment before any access
//! - **Fault isolation**: Accessors return `None` on fault instead of
//!   taking the kernel down
//! - **Atomic only**: Every access is a 32-bit atomic, so concurrent user
//!   threads never observe torn values

use crate::kernel::vm::layout::{is_user_vaddr_range, VAddr};
use crate::kernel::vm::{Result, VmError};

// Import logging macros
use crate::log_trace;

/// ============================================================================
/// User Pointer Types
/// ============================================================================

/// User pointer
///
/// Represents a pointer into user address space.
#[repr(transparent)]
#[derive(Debug)]
pub struct UserPtr<T> {
    ptr: usize,
    _phantom: core::marker::PhantomData<T>,
}

impl<T> Clone for UserPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for UserPtr<T> {}

impl<T> PartialEq for UserPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for UserPtr<T> {}

impl<T> UserPtr<T> {
    /// Create a new user pointer from a raw address
    pub const fn new(addr: usize) -> Self {
        Self {
            ptr: addr,
            _phantom: core::marker::PhantomData,
        }
    }

    /// Get the raw address
    pub const fn addr(&self) -> usize {
        self.ptr
    }

    /// Check if the pointer is null
    pub const fn is_null(&self) -> bool {
        self.ptr == 0
    }

    /// Check if the pointer is aligned for `T`
    pub const fn is_aligned(&self) -> bool {
        self.ptr % core::mem::align_of::<T>() == 0
    }

    /// Validate that this is a user pointer
    pub fn is_valid(&self) -> bool {
        // Check if null
        if self.is_null() {
            return false;
        }

        // Whole object must be in user space
        is_user_vaddr_range(self.ptr, core::mem::size_of::<T>())
    }
}

/// Validate a user futex word address
///
/// # Returns
///
/// - `Err(VmError::AlignmentError)` if `addr` is not 4-byte aligned
/// - `Err(VmError::InvalidAddress)` if `addr` is null or not in user space
pub fn validate_user_word(addr: VAddr) -> Result<UserPtr<u32>> {
    let ptr = UserPtr::<u32>::new(addr);

    if !ptr.is_aligned() {
        log_trace!("usercopy: misaligned word {:#x}", addr);
        return Err(VmError::AlignmentError);
    }

    if !ptr.is_valid() {
        log_trace!("usercopy: invalid user word {:#x}", addr);
        return Err(VmError::InvalidAddress);
    }

    Ok(ptr)
}

/// ============================================================================
/// Atomic Operations
/// ============================================================================

/// Read-modify-write operation on a user word
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicOp {
    /// `new = operand`
    Set = 0,

    /// `new = old + operand` (wrapping)
    Add = 1,

    /// `new = old | operand`
    Or = 2,

    /// `new = old & !operand`
    AndNot = 3,

    /// `new = old ^ operand`
    Xor = 4,
}

impl AtomicOp {
    /// Decode an operation number
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Set),
            1 => Some(Self::Add),
            2 => Some(Self::Or),
            3 => Some(Self::AndNot),
            4 => Some(Self::Xor),
            _ => None,
        }
    }

    /// Compute the new value from the old one
    pub const fn apply(self, old: u32, operand: u32) -> u32 {
        match self {
            Self::Set => operand,
            Self::Add => old.wrapping_add(operand),
            Self::Or => old | operand,
            Self::AndNot => old & !operand,
            Self::Xor => old ^ operand,
        }
    }
}

/// ============================================================================
/// User Memory Access
/// ============================================================================

/// Atomic access to 32-bit words of a user address space
///
/// Pointers passed in have already been through [`validate_user_word`].
/// Every method returns `None` if the access faults (unmapped page, no
/// permission).
pub trait UserAccess {
    /// Atomically load the word at `ptr`
    fn atomic_load(&self, ptr: UserPtr<u32>) -> Option<u32>;

    /// Atomically store `value` to `ptr`
    fn atomic_store(&self, ptr: UserPtr<u32>, value: u32) -> Option<()>;

    /// Atomically apply `op` with `operand` to the word at `ptr`
    ///
    /// Returns the value before the update.
    fn atomic_fetch_op(&self, ptr: UserPtr<u32>, op: AtomicOp, operand: u32) -> Option<u32>;

    /// Atomically swap in `value`, returning the previous word
    fn atomic_exchange(&self, ptr: UserPtr<u32>, value: u32) -> Option<u32> {
        self.atomic_fetch_op(ptr, AtomicOp::Set, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::vm::layout::{USER_BASE, USER_MAX};

    #[test]
    fn test_validate_user_word() {
        assert_eq!(validate_user_word(0), Err(VmError::InvalidAddress));
        assert!(validate_user_word(USER_BASE).is_ok());
        assert_eq!(validate_user_word(USER_BASE + 2), Err(VmError::AlignmentError));
        assert_eq!(validate_user_word(8), Err(VmError::InvalidAddress));
        assert_eq!(validate_user_word((USER_MAX & !3) + 4), Err(VmError::InvalidAddress));
    }

    #[test]
    fn test_atomic_op_apply() {
        assert_eq!(AtomicOp::Set.apply(5, 9), 9);
        assert_eq!(AtomicOp::Add.apply(u32::MAX, 2), 1);
        assert_eq!(AtomicOp::Or.apply(0b1010, 0b0101), 0b1111);
        assert_eq!(AtomicOp::AndNot.apply(0b1111, 0b0101), 0b1010);
        assert_eq!(AtomicOp::Xor.apply(0b1100, 0b1010), 0b0110);
        assert_eq!(AtomicOp::from_raw(4), Some(AtomicOp::Xor));
        assert_eq!(AtomicOp::from_raw(5), None);
    }
}
