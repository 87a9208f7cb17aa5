//! Derived base-key index over committed blocks

use std::collections::BTreeMap;

use tracing::trace;

use crate::block::PkeyBlock;
use crate::types::{Pkey, SlotRef};

/// The winning committed slot for one base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// The key as stored in the slot, membership flag included.
    pub pkey: Pkey,
    /// Coordinates of the slot holding it.
    pub slot: SlotRef,
}

/// Ordered mapping from base value to the authoritative committed slot.
///
/// The protocol does not guarantee base-key uniqueness across a table, so
/// this is a pure cache over the committed blocks: it is rebuilt whole after
/// every committed-block change and never patched incrementally. Duplicate
/// bases resolve by membership precedence (a full member always beats a
/// limited member); between equal-precedence duplicates the last slot in
/// block-ascending, slot-ascending scan order wins.
///
/// Iteration yields strictly ascending base values, which the merge join in
/// [`crate::matcher::find_common_pkey`] relies on.
#[derive(Debug, Clone, Default)]
pub struct PkeyIndex {
    entries: BTreeMap<u16, IndexEntry>,
}

impl PkeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the index from scratch over `committed`.
    ///
    /// Scans blocks in ascending index order and slots in ascending position
    /// order, skipping absent blocks and invalid keys. With the membership
    /// flag as the high bit of the raw value, a `>=` comparison against the
    /// held entry gives full-member precedence and last-scanned-wins among
    /// duplicates of equal precedence.
    pub fn rebuild(&mut self, committed: &[Option<PkeyBlock>]) {
        self.entries.clear();

        for (block_idx, block) in committed.iter().enumerate() {
            let Some(block) = block else { continue };
            for (slot_idx, pkey) in block.iter().enumerate() {
                if pkey.is_invalid() {
                    continue;
                }
                let entry = IndexEntry {
                    pkey,
                    slot: SlotRef {
                        block: block_idx as u16,
                        slot: slot_idx as u8,
                    },
                };
                match self.entries.get_mut(&pkey.base()) {
                    Some(held) if pkey.raw() < held.pkey.raw() => {}
                    Some(held) => *held = entry,
                    None => {
                        self.entries.insert(pkey.base(), entry);
                    }
                }
            }
        }

        trace!("rebuilt pkey index: {} distinct bases", self.entries.len());
    }

    /// Authoritative slot for `base`, if any committed slot holds it.
    pub fn lookup(&self, base: u16) -> Option<&IndexEntry> {
        self.entries.get(&base)
    }

    /// Entries in strictly ascending base order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, IndexEntry)> + '_ {
        self.entries.iter().map(|(base, entry)| (*base, *entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PKEY_BLOCK_SIZE;

    fn block_with(entries: &[(u8, u16)]) -> PkeyBlock {
        let mut block = PkeyBlock::new();
        for &(slot, raw) in entries {
            block.set_entry(slot, Pkey::new(raw));
        }
        block
    }

    #[test]
    fn skips_invalid_and_absent() {
        let committed = vec![
            None,
            Some(block_with(&[(0, 0x0000), (1, 0x8000), (2, 0x0010)])),
        ];
        let mut index = PkeyIndex::new();
        index.rebuild(&committed);

        assert_eq!(index.len(), 1);
        let entry = index.lookup(0x10).unwrap();
        assert_eq!(entry.slot, SlotRef { block: 1, slot: 2 });
    }

    #[test]
    fn full_member_beats_limited_either_order() {
        // limited first, full second
        let committed = vec![Some(block_with(&[(0, 0x0010), (1, 0x8010)]))];
        let mut index = PkeyIndex::new();
        index.rebuild(&committed);
        assert_eq!(index.lookup(0x10).unwrap().slot.slot, 1);

        // full first, limited second
        let committed = vec![Some(block_with(&[(0, 0x8010), (1, 0x0010)]))];
        index.rebuild(&committed);
        assert_eq!(index.lookup(0x10).unwrap().slot.slot, 0);
    }

    #[test]
    fn equal_precedence_last_scanned_wins() {
        let committed = vec![
            Some(block_with(&[(3, 0x8010)])),
            Some(block_with(&[(1, 0x8010)])),
        ];
        let mut index = PkeyIndex::new();
        index.rebuild(&committed);
        assert_eq!(index.lookup(0x10).unwrap().slot, SlotRef { block: 1, slot: 1 });
    }

    #[test]
    fn rebuild_discards_previous_contents() {
        let mut index = PkeyIndex::new();
        index.rebuild(&[Some(block_with(&[(0, 0x0011)]))]);
        assert!(index.lookup(0x11).is_some());

        index.rebuild(&[Some(block_with(&[(0, 0x0012)]))]);
        assert!(index.lookup(0x11).is_none());
        assert!(index.lookup(0x12).is_some());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        /// Pack raw key values into sparse committed blocks, 32 per block.
        fn blocks_from(raws: &[u16]) -> Vec<Option<PkeyBlock>> {
            let mut blocks: Vec<Option<PkeyBlock>> = Vec::new();
            for (i, &raw) in raws.iter().enumerate() {
                let block_idx = i / PKEY_BLOCK_SIZE;
                let slot_idx = (i % PKEY_BLOCK_SIZE) as u8;
                if blocks.len() <= block_idx {
                    blocks.resize(block_idx + 1, None);
                }
                blocks[block_idx]
                    .get_or_insert_with(PkeyBlock::new)
                    .set_entry(slot_idx, Pkey::new(raw));
            }
            blocks
        }

        proptest! {
            /// One entry per distinct valid base, resolving to a full-member
            /// slot whenever any slot with that base is a full member.
            #[test]
            fn one_entry_per_base_full_member_precedence(
                raws in prop::collection::vec(any::<u16>(), 0..96)
            ) {
                let committed = blocks_from(&raws);
                let mut index = PkeyIndex::new();
                index.rebuild(&committed);

                let keys: Vec<Pkey> = raws
                    .iter()
                    .map(|&raw| Pkey::new(raw))
                    .filter(|k| !k.is_invalid())
                    .collect();

                let distinct: std::collections::BTreeSet<u16> =
                    keys.iter().map(|k| k.base()).collect();
                prop_assert_eq!(index.len(), distinct.len());

                for base in distinct {
                    let entry = index.lookup(base).unwrap();
                    let any_full = keys
                        .iter()
                        .any(|k| k.base() == base && k.is_full_member());
                    prop_assert_eq!(entry.pkey.is_full_member(), any_full);
                }
            }

            /// Iteration order is strictly ascending in base value.
            #[test]
            fn iteration_strictly_ascending(
                raws in prop::collection::vec(any::<u16>(), 0..96)
            ) {
                let committed = blocks_from(&raws);
                let mut index = PkeyIndex::new();
                index.rebuild(&committed);

                let bases: Vec<u16> = index.iter().map(|(base, _)| base).collect();
                for pair in bases.windows(2) {
                    prop_assert!(pair[0] < pair[1]);
                }
            }
        }
    }
}
