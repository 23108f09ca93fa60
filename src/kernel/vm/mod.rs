// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Virtual Memory Contract
//!
//! The futex layer needs two things from the VM subsystem: a stable identity
//! for the caller's address space, and for shared futexes, the VM object
//! and offset backing a user address. Both come through [`AddressSpace`].
//!
//! # Identity Rules
//!
//! - [`AspaceId`] and [`VmObjectId`] values are never reused while any
//!   futex waiter can still refer to them
//! - Two mappings of the same VM object report the same `VmObjectId`, no
//!   matter which address space or virtual address they live at
//!
//! # Organization
//!
//! - [`layout`] - User address range per architecture

pub mod layout;

pub use layout::{is_user_vaddr, is_user_vaddr_range, VAddr, USER_BASE, USER_MAX};

use crate::kernel::usercopy::UserAccess;

/// Address space identity
pub type AspaceId = crate::rustux::types::AspaceId;

/// VM object identity
pub type VmObjectId = crate::rustux::types::VmoId;

/// Virtual memory errors
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    /// Invalid address (null or outside user space)
    InvalidAddress = 3,

    /// Not mapped
    NotMapped = 6,

    /// Page fault while touching user memory
    PageFault = 7,

    /// Alignment error
    AlignmentError = 8,
}

/// Result type for VM operations
pub type Result<T = ()> = core::result::Result<T, VmError>;

/// ============================================================================
/// Regions
/// ============================================================================

/// Snapshot of the mapping that covers a user address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmRegion {
    /// Virtual address base
    pub base: VAddr,

    /// Size in bytes
    pub size: usize,

    /// Backing VM object, if the region is object-backed
    pub object: Option<VmObjectId>,

    /// Offset of `base` within the backing object
    pub object_offset: u64,

    /// Whether the mapping is shared with other address spaces
    pub shared: bool,
}

impl VmRegion {
    /// Get the end address (exclusive)
    pub const fn end(&self) -> VAddr {
        self.base + self.size
    }

    /// Check if this region contains a virtual address
    pub fn contains(&self, vaddr: VAddr) -> bool {
        vaddr >= self.base && vaddr < self.end()
    }

    /// Shared backing `(object, offset)` for `vaddr`
    ///
    /// Returns `None` if the region is private, not object-backed, or does
    /// not contain `vaddr`.
    pub fn shared_backing(&self, vaddr: VAddr) -> Option<(VmObjectId, u64)> {
        if !self.shared || !self.contains(vaddr) {
            return None;
        }
        let object = self.object?;
        Some((object, self.object_offset + (vaddr - self.base) as u64))
    }
}

/// ============================================================================
/// Address Space
/// ============================================================================

/// User address space as seen by the synchronization core
pub trait AddressSpace: UserAccess + Send + Sync {
    /// Identity of this address space
    fn id(&self) -> AspaceId;

    /// Find the region mapping `vaddr`
    fn find_region(&self, vaddr: VAddr) -> Option<VmRegion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_shared_backing() {
        let region = VmRegion {
            base: 0x40_0000,
            size: 0x2000,
            object: Some(9),
            object_offset: 0x1000,
            shared: true,
        };
        assert!(region.contains(0x40_0000));
        assert!(!region.contains(0x40_2000));
        assert_eq!(region.shared_backing(0x40_0010), Some((9, 0x1010)));
        assert_eq!(region.shared_backing(0x40_2000), None);

        let private = VmRegion { shared: false, ..region };
        assert_eq!(private.shared_backing(0x40_0010), None);

        let anonymous = VmRegion { object: None, ..region };
        assert_eq!(anonymous.shared_backing(0x40_0010), None);
    }
}
