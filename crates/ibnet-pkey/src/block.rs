//! Fixed-size P_Key wire blocks

use crate::types::{PKEY_BLOCK_SIZE, Pkey};

/// One wire block of P_Key slots.
///
/// Mirrors the IBA `P_KeyTable` management attribute: a fixed-length
/// sequence of 16-bit key entries addressed by the attribute's block-number
/// field. A freshly allocated block holds only invalid keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PkeyBlock {
    entries: [Pkey; PKEY_BLOCK_SIZE],
}

impl PkeyBlock {
    /// Create a zeroed block (all slots invalid).
    pub const fn new() -> Self {
        Self {
            entries: [Pkey::INVALID; PKEY_BLOCK_SIZE],
        }
    }

    /// Key held at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= PKEY_BLOCK_SIZE`.
    pub fn entry(&self, slot: u8) -> Pkey {
        self.entries[usize::from(slot)]
    }

    /// Write `pkey` into `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= PKEY_BLOCK_SIZE`.
    pub fn set_entry(&mut self, slot: u8, pkey: Pkey) {
        self.entries[usize::from(slot)] = pkey;
    }

    /// All slots in wire order.
    pub const fn entries(&self) -> &[Pkey; PKEY_BLOCK_SIZE] {
        &self.entries
    }

    /// Iterate the slots in wire order.
    pub fn iter(&self) -> impl Iterator<Item = Pkey> + '_ {
        self.entries.iter().copied()
    }

    /// Reset every slot to the invalid key, in place.
    pub fn zero(&mut self) {
        self.entries = [Pkey::INVALID; PKEY_BLOCK_SIZE];
    }
}

impl Default for PkeyBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[u16; PKEY_BLOCK_SIZE]> for PkeyBlock {
    fn from(raw: [u16; PKEY_BLOCK_SIZE]) -> Self {
        Self {
            entries: raw.map(Pkey::new),
        }
    }
}
