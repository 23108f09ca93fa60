// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! User Virtual Address Layout
//!
//! User space lives in the low half on every supported architecture. The
//! first 64KB are never mapped so that small integers are never valid user
//! pointers.
//!
//! ## ARM64 (AArch64)
//! - 48-bit virtual address space, TTBR0_EL1 for user
//!
//! ## AMD64 (x86-64)
//! - 48-bit canonical lower half
//!
//! ## RISC-V (RV64GC)
//! - Sv39: 39-bit VA, 256 GB user half

pub use crate::rustux::types::VAddr;

/// Base of user space
pub const USER_BASE: VAddr = 0x1_0000;

/// Highest user address (inclusive)
#[cfg(target_arch = "aarch64")]
pub const USER_MAX: VAddr = 0x0000_FFFF_FFFF_FFFF;

/// Highest user address (inclusive)
#[cfg(target_arch = "riscv64")]
pub const USER_MAX: VAddr = 0x0000_003F_FFFF_FFFF;

/// Highest user address (inclusive)
#[cfg(not(any(target_arch = "aarch64", target_arch = "riscv64")))]
pub const USER_MAX: VAddr = 0x0000_7FFF_FFFF_FFFF;

/// Check if a virtual address is in user space
#[inline]
pub const fn is_user_vaddr(vaddr: VAddr) -> bool {
    vaddr >= USER_BASE && vaddr <= USER_MAX
}

/// Check if `[vaddr, vaddr + len)` lies entirely in user space
pub const fn is_user_vaddr_range(vaddr: VAddr, len: usize) -> bool {
    if len == 0 {
        return is_user_vaddr(vaddr);
    }
    match vaddr.checked_add(len - 1) {
        Some(last) => is_user_vaddr(vaddr) && is_user_vaddr(last),
        None => false,
    }
}
