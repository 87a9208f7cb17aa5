//! Core wire-level types for P_Key tables

use std::fmt;

/// Number of P_Key entries in one wire block (IBA `P_KeyTable` attribute).
pub const PKEY_BLOCK_SIZE: usize = 32;

/// A 16-bit partition key.
///
/// The high bit is the full-membership flag; the low 15 bits are the base
/// partition identifier. A key whose base is zero is invalid regardless of
/// the membership bit, so both `0x0000` and `0x8000` are invalid.
///
/// Values are held in host byte order; converting from the big-endian wire
/// attribute is the MAD layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pkey(u16);

impl Pkey {
    /// Full-membership flag bit.
    pub const FULL_MEMBER: u16 = 0x8000;

    /// Mask selecting the 15-bit base value.
    pub const BASE_MASK: u16 = 0x7fff;

    /// The invalid sentinel (base zero, limited membership).
    pub const INVALID: Self = Self(0);

    /// Create a key from its raw 16-bit value.
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw 16-bit value, membership flag as the high bit.
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The 15-bit base partition identifier, membership flag masked off.
    pub const fn base(self) -> u16 {
        self.0 & Self::BASE_MASK
    }

    /// Whether this key carries full membership.
    pub const fn is_full_member(self) -> bool {
        self.0 & Self::FULL_MEMBER != 0
    }

    /// Whether this key is the reserved invalid value (base zero).
    pub const fn is_invalid(self) -> bool {
        self.base() == 0
    }
}

impl fmt::Display for Pkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl From<u16> for Pkey {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

/// Coordinates of one committed slot: block index plus slot position.
///
/// The key index stores these instead of references into block storage, so a
/// stale entry can never dangle; it can only fail validation in
/// [`crate::table::PkeyTable::locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    /// Wire block number.
    pub block: u16,
    /// Slot position within the block.
    pub slot: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_masks_membership_flag() {
        assert_eq!(Pkey::new(0x8010).base(), 0x10);
        assert_eq!(Pkey::new(0x0010).base(), 0x10);
        assert_eq!(Pkey::new(0xffff).base(), 0x7fff);
    }

    #[test]
    fn membership_flag_is_high_bit() {
        assert!(Pkey::new(0x8001).is_full_member());
        assert!(!Pkey::new(0x7fff).is_full_member());
    }

    #[test]
    fn base_zero_is_invalid_with_either_membership() {
        assert!(Pkey::new(0x0000).is_invalid());
        assert!(Pkey::new(0x8000).is_invalid());
        assert!(!Pkey::new(0x0001).is_invalid());
        assert!(Pkey::INVALID.is_invalid());
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Pkey::new(0x8010).to_string(), "0x8010");
    }
}
