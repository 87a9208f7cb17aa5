//! Deferred P_Key assignment records

use std::collections::VecDeque;

use crate::types::{Pkey, SlotRef};

/// A key assignment deferred for later processing by the sweep logic.
///
/// The table treats these as opaque payload: it guarantees ordered insertion
/// and a full drain, nothing more. `target` carries a pre-assigned slot when
/// the allocation pass already picked one; `is_new` marks keys destined for
/// the staged table rather than re-confirmations of committed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPkey {
    pub pkey: Pkey,
    pub target: Option<SlotRef>,
    pub is_new: bool,
}

/// FIFO of deferred assignments. No deduplication, no reordering.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    records: VecDeque<PendingPkey>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the tail.
    pub fn enqueue(&mut self, record: PendingPkey) {
        self.records.push_back(record);
    }

    /// Remove and return every record in insertion order.
    pub fn drain_all(&mut self) -> Vec<PendingPkey> {
        self.records.drain(..).collect()
    }

    /// Discard all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_insertion_order_and_empties() {
        let mut queue = PendingQueue::new();
        for raw in [0x11u16, 0x12, 0x11] {
            queue.enqueue(PendingPkey {
                pkey: Pkey::new(raw),
                target: None,
                is_new: true,
            });
        }

        let drained = queue.drain_all();
        let raws: Vec<u16> = drained.iter().map(|r| r.pkey.raw()).collect();
        assert_eq!(raws, vec![0x11, 0x12, 0x11]);
        assert!(queue.is_empty());
    }
}
