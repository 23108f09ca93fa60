// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Futex Key Resolution

use crate::kernel::futex::{FutexError, Result};
use crate::kernel::usercopy::validate_user_word;
use crate::kernel::vm::{AddressSpace, AspaceId, VAddr, VmObjectId};

/// Low bit set on private key addresses
///
/// Futex words are 4-byte aligned, so the bit is otherwise always clear.
pub const PRIVATE_TAG: usize = 1;

/// Identity of a futex word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FutexKey {
    /// Word private to one address space
    Private {
        aspace: AspaceId,
        /// Virtual address with [`PRIVATE_TAG`] set
        address: VAddr,
    },

    /// Word in a VM object that may be mapped by several address spaces
    Shared { object: VmObjectId, offset: u64 },
}

impl FutexKey {
    /// Private key for `address` in `aspace`
    pub const fn private(aspace: AspaceId, address: VAddr) -> Self {
        Self::Private {
            aspace,
            address: address | PRIVATE_TAG,
        }
    }

    /// Shared key for `offset` in `object`
    pub const fn shared(object: VmObjectId, offset: u64) -> Self {
        Self::Shared { object, offset }
    }

    /// Resolve the key of the word at `address` in `aspace`
    ///
    /// A shared request on a mapping that is not backed by shareable memory
    /// falls back to a private key.
    ///
    /// # Returns
    ///
    /// - `Err(FutexError::InvalidArgs)` if `address` is misaligned
    /// - `Err(FutexError::Fault)` if `address` is null, not a user address,
    ///   or (shared only) not mapped
    pub fn resolve(aspace: &dyn AddressSpace, address: VAddr, shared: bool) -> Result<Self> {
        validate_user_word(address)?;

        if !shared {
            return Ok(Self::private(aspace.id(), address));
        }

        let region = aspace.find_region(address).ok_or(FutexError::Fault)?;
        Ok(match region.shared_backing(address) {
            Some((object, offset)) => Self::shared(object, offset),
            None => Self::private(aspace.id(), address),
        })
    }

    /// Check if this is a private key
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private { .. })
    }
}
