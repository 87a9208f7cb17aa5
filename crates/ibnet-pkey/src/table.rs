//! Per-port P_Key table: committed and staged block storage plus the
//! derived base-key index and the pending-assignment queue.

use tracing::debug;

use crate::block::PkeyBlock;
use crate::cursor::SlotCursor;
use crate::error::Result;
use crate::index::{IndexEntry, PkeyIndex};
use crate::pending::{PendingPkey, PendingQueue};
use crate::types::{PKEY_BLOCK_SIZE, Pkey, SlotRef};

/// The P_Key table of one physical port.
///
/// Committed blocks are authoritative and feed the index the matching
/// algorithms query; staged blocks hold the assignment the subnet manager is
/// computing before it commits. The two are independent sparse collections:
/// an index that was never written holds no block at all, which is distinct
/// from a written all-invalid block (the free-slot scan treats both as
/// free space, but only the former costs no storage).
///
/// A table belongs to exactly one port and expects all mutation to happen on
/// the single thread driving the configuration sweep; there is no internal
/// locking.
#[derive(Debug, Clone, Default)]
pub struct PkeyTable {
    committed: Vec<Option<PkeyBlock>>,
    staged: Vec<Option<PkeyBlock>>,
    index: PkeyIndex,
    pending: PendingQueue,
    used_blocks: u16,
    max_blocks: u16,
}

fn ensure_block_slot(blocks: &mut Vec<Option<PkeyBlock>>, block: u16) -> Result<()> {
    let needed = usize::from(block) + 1;
    if blocks.len() < needed {
        blocks.try_reserve(needed - blocks.len())?;
        blocks.resize(needed, None);
    }
    Ok(())
}

impl PkeyTable {
    /// Empty table. `max_blocks` starts at zero; callers set it from the
    /// port's capability before running the free-slot scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with the staged-scan block cap already set.
    pub fn with_max_blocks(max_blocks: u16) -> Self {
        Self {
            max_blocks,
            ..Self::default()
        }
    }

    /// Install or replace the committed block at `block`, then rebuild the
    /// index. The wire protocol does not guarantee base uniqueness across
    /// blocks and a change anywhere can change precedence anywhere, so a
    /// full rebuild is the only correct refresh.
    ///
    /// On allocation failure the table is left unchanged.
    pub fn set_block(&mut self, block: u16, contents: PkeyBlock) -> Result<()> {
        ensure_block_slot(&mut self.committed, block)?;
        self.committed[usize::from(block)] = Some(contents);
        self.index.rebuild(&self.committed);
        debug!(
            "committed pkey block {block}: {} bases indexed",
            self.index.len()
        );
        Ok(())
    }

    /// Committed block at `block`, or `None` if never written.
    pub fn block(&self, block: u16) -> Option<&PkeyBlock> {
        self.committed.get(usize::from(block))?.as_ref()
    }

    /// Staged block at `block`, or `None` if never touched.
    pub fn staged_block(&self, block: u16) -> Option<&PkeyBlock> {
        self.staged.get(usize::from(block))?.as_ref()
    }

    /// Write `pkey` into the staged table, allocating a zeroed block on
    /// first touch and advancing the used-block watermark.
    ///
    /// On allocation failure the table is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= PKEY_BLOCK_SIZE`.
    pub fn stage_entry(&mut self, block: u16, slot: u8, pkey: Pkey) -> Result<()> {
        ensure_block_slot(&mut self.staged, block)?;
        self.staged[usize::from(block)]
            .get_or_insert_with(PkeyBlock::new)
            .set_entry(slot, pkey);
        // saturate: block u16::MAX must not wrap the monotonic watermark
        if self.used_blocks <= block {
            self.used_blocks = block.saturating_add(1);
        }
        Ok(())
    }

    /// Zero every allocated staged block in place, keeping the storage for
    /// the next staging pass.
    pub fn reset_staged(&mut self) {
        for block in self.staged.iter_mut().flatten() {
            block.zero();
        }
    }

    /// Validate a slot reference against the committed blocks.
    ///
    /// Returns the coordinates back when the reference names an allocated
    /// committed block and an in-range slot, `None` when it is stale (the
    /// block was never written, or was dropped by [`Self::clear`]).
    pub fn locate(&self, slot: SlotRef) -> Option<(u16, u8)> {
        self.block(slot.block)?;
        if usize::from(slot.slot) >= PKEY_BLOCK_SIZE {
            return None;
        }
        Some((slot.block, slot.slot))
    }

    /// Find the next free staged slot at or after `cursor`, block-ascending
    /// then slot-ascending, up to [`Self::max_blocks`].
    ///
    /// A slot is free when its staged block was never allocated or the slot
    /// holds an invalid key. Pure scan: the cursor is left pointing at the
    /// found slot (not past it) and nothing is written, so the caller
    /// decides whether and how to take the slot.
    pub fn find_next_free(&self, cursor: &mut SlotCursor) -> Option<SlotRef> {
        while cursor.block < self.max_blocks {
            if usize::from(cursor.slot) >= PKEY_BLOCK_SIZE {
                cursor.slot = 0;
                cursor.block += 1;
                if cursor.block >= self.max_blocks {
                    return None;
                }
            }

            let occupied = self
                .staged_block(cursor.block)
                .is_some_and(|block| !block.entry(cursor.slot).is_invalid());
            if occupied {
                cursor.slot += 1;
            } else {
                return Some(SlotRef {
                    block: cursor.block,
                    slot: cursor.slot,
                });
            }
        }
        None
    }

    /// Authoritative committed slot for `base`, if present.
    pub fn lookup(&self, base: u16) -> Option<&IndexEntry> {
        self.index.lookup(base)
    }

    /// The derived base-key index. Read-only; it is rebuilt internally on
    /// every committed-block change.
    pub fn index(&self) -> &PkeyIndex {
        &self.index
    }

    /// Whether no committed key is indexed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of committed block positions tracked (allocated or not).
    /// `usize` on purpose: all 65536 positions can be in use at once.
    pub fn num_blocks(&self) -> usize {
        self.committed.len()
    }

    /// Staged-table watermark: one past the highest block ever staged.
    pub fn used_blocks(&self) -> u16 {
        self.used_blocks
    }

    /// Cap on the staged free-slot scan.
    pub fn max_blocks(&self) -> u16 {
        self.max_blocks
    }

    /// Set the staged-scan cap (from the port's table capability).
    pub fn set_max_blocks(&mut self, max_blocks: u16) {
        self.max_blocks = max_blocks;
    }

    /// Defer a key assignment.
    pub fn enqueue_pending(&mut self, record: PendingPkey) {
        self.pending.enqueue(record);
    }

    /// Remove and return all deferred assignments in insertion order.
    pub fn drain_pending(&mut self) -> Vec<PendingPkey> {
        self.pending.drain_all()
    }

    /// Discard deferred assignments without processing them.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Sweep teardown: drop all block storage, the index, and the pending
    /// queue, and reset the staged watermark. `max_blocks` is kept; it
    /// derives from port hardware, not from sweep state.
    pub fn clear(&mut self) {
        self.committed.clear();
        self.staged.clear();
        self.index.clear();
        self.pending.clear();
        self.used_blocks = 0;
    }
}
