//! Caller-held cursor for the staged free-slot scan

/// Scan position over the staged blocks.
///
/// Owned by the caller so an allocation pass can resume where the previous
/// search left off; [`crate::table::PkeyTable::find_next_free`] advances it
/// but never writes through it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotCursor {
    /// Next staged block index to examine.
    pub block: u16,
    /// Next slot position within that block.
    pub slot: u8,
}

impl SlotCursor {
    /// Cursor at the origin of the staged table.
    pub const fn new() -> Self {
        Self { block: 0, slot: 0 }
    }

    /// Cursor at an explicit starting position.
    pub const fn at(block: u16, slot: u8) -> Self {
        Self { block, slot }
    }
}
