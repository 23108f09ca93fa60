// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! WAKE_OP Encoding
//!
//! WAKE_OP packs its second-word update and wake condition into one 32-bit
//! argument:
//!
//! ```text
//!  31 30..28 27..24 23......12 11.......0
//! +--+------+------+----------+----------+
//! |S |  op  | cmp  |  oparg   |  cmparg  |
//! +--+------+------+----------+----------+
//! ```
//!
//! `oparg` and `cmparg` are 12-bit two's complement. With `S` set the
//! operand is `1 << oparg`.

use crate::kernel::futex::{FutexError, Result};
use crate::kernel::usercopy::AtomicOp;

/// Operand is a shift count
pub const FUTEX_OP_OPARG_SHIFT: u32 = 8;

/// Comparison applied to the old value of the second word
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCmp {
    Eq = 0,
    Ne = 1,
    Lt = 2,
    Le = 3,
    Gt = 4,
    Ge = 5,
}

impl WakeCmp {
    /// Decode a comparison number
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Eq),
            1 => Some(Self::Ne),
            2 => Some(Self::Lt),
            3 => Some(Self::Le),
            4 => Some(Self::Gt),
            5 => Some(Self::Ge),
            _ => None,
        }
    }

    /// Evaluate `lhs <cmp> rhs` (signed)
    pub const fn eval(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

/// Decoded WAKE_OP argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeOp {
    /// Update applied to the second word
    pub op: AtomicOp,

    /// Operand of `op`, already shifted if requested
    pub oparg: u32,

    /// Condition on the second word's old value
    pub cmp: WakeCmp,

    /// Right-hand side of `cmp`
    pub cmparg: i32,
}

/// Sign-extend the low 12 bits of `raw`
const fn sign_extend_12(raw: u32) -> i32 {
    ((raw << 20) as i32) >> 20
}

impl WakeOp {
    /// Decode a packed WAKE_OP argument
    ///
    /// Unknown `op` or `cmp` values and shift counts outside `0..=31` are
    /// rejected with `InvalidArgs`.
    pub fn decode(encoded: u32) -> Result<Self> {
        let raw_op = (encoded >> 28) & 0xF;
        let raw_cmp = (encoded >> 24) & 0xF;
        let mut oparg = sign_extend_12((encoded >> 12) & 0xFFF);
        let cmparg = sign_extend_12(encoded & 0xFFF);

        let op = AtomicOp::from_raw(raw_op & !FUTEX_OP_OPARG_SHIFT).ok_or(FutexError::InvalidArgs)?;
        let cmp = WakeCmp::from_raw(raw_cmp).ok_or(FutexError::InvalidArgs)?;

        if raw_op & FUTEX_OP_OPARG_SHIFT != 0 {
            if !(0..=31).contains(&oparg) {
                return Err(FutexError::InvalidArgs);
            }
            oparg = 1 << oparg;
        }

        Ok(Self {
            op,
            oparg: oparg as u32,
            cmp,
            cmparg,
        })
    }

    /// Pack an argument the way user space does
    pub const fn encode(op: AtomicOp, shift: bool, oparg: i32, cmp: WakeCmp, cmparg: i32) -> u32 {
        let raw_op = op as u32 | if shift { FUTEX_OP_OPARG_SHIFT } else { 0 };
        (raw_op << 28) | ((cmp as u32) << 24) | (((oparg as u32) & 0xFFF) << 12) | ((cmparg as u32) & 0xFFF)
    }

    /// Check the wake condition against the old value of the second word
    pub const fn should_wake(&self, old: u32) -> bool {
        self.cmp.eval(old as i32, self.cmparg)
    }
}
