//! Pairwise P_Key matching algorithms
//!
//! These run on every link and path considered during fabric routing, so
//! they only ever consult the derived index, never the raw blocks.

use std::cmp::Ordering;
use std::ptr;

use tracing::debug;

use crate::table::PkeyTable;
use crate::types::Pkey;

/// Two keys match iff their bases are equal and at least one side carries
/// full membership. Two limited members of the same partition are not
/// mutually reachable.
pub fn pkeys_match(a: Pkey, b: Pkey) -> bool {
    if !(a.is_full_member() || b.is_full_member()) {
        return false;
    }
    a.base() == b.base()
}

/// Whether both tables hold `pkey`'s base with compatible membership.
pub fn share_specific_pkey(a: &PkeyTable, b: &PkeyTable, pkey: Pkey) -> bool {
    let (Some(entry_a), Some(entry_b)) = (a.lookup(pkey.base()), b.lookup(pkey.base())) else {
        return false;
    };
    pkeys_match(entry_a.pkey, entry_b.pkey)
}

/// Find a concrete key the two tables share, by sorted merge join over the
/// ascending index iterations.
///
/// O(n+m) and correct only because both indexes iterate in strictly
/// ascending base order with one entry per base: when two equal bases fail
/// the membership test, no other slot pair can share that base either, so
/// both cursors advance. The returned key is table `a`'s entry; the boolean
/// outcome is symmetric in the arguments.
pub fn find_common_pkey(a: &PkeyTable, b: &PkeyTable) -> Option<Pkey> {
    let mut iter_a = a.index().iter();
    let mut iter_b = b.index().iter();
    let mut cur_a = iter_a.next();
    let mut cur_b = iter_b.next();

    while let (Some((base_a, entry_a)), Some((base_b, entry_b))) = (cur_a, cur_b) {
        if pkeys_match(entry_a.pkey, entry_b.pkey) {
            return Some(entry_a.pkey);
        }
        match base_a.cmp(&base_b) {
            Ordering::Equal => {
                cur_a = iter_a.next();
                cur_b = iter_b.next();
            }
            Ordering::Less => {
                cur_a = iter_a.next();
            }
            Ordering::Greater => {
                cur_b = iter_b.next();
            }
        }
    }
    None
}

/// Port-compatibility test: do the two tables share any key?
///
/// A port compared against itself always shares. An empty table also always
/// shares: IBA 10.9.2 does not require every physical port to carry a P_Key
/// table, and the correct fallback would be the default partition of the
/// port's node; until that exists the check stays permissive.
pub fn share_any_pkey(a: &PkeyTable, b: &PkeyTable) -> bool {
    if ptr::eq(a, b) {
        return true;
    }
    if a.is_empty() || b.is_empty() {
        return true;
    }
    find_common_pkey(a, b).is_some()
}

/// Whether `table` holds `pkey`'s base at all, membership ignored.
///
/// The invalid sentinel is treated loosely and always reported present, so
/// an unset default key never blocks a path.
pub fn table_has_pkey(table: &PkeyTable, pkey: Pkey) -> bool {
    debug!("searching port table for pkey {pkey}");

    if pkey.is_invalid() {
        debug!("invalid pkey {pkey} treated loosely, allowing it");
        return true;
    }

    let found = table.lookup(pkey.base()).is_some();
    debug!(
        "pkey {pkey} {}",
        if found { "found" } else { "not found" }
    );
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::PkeyBlock;

    fn table_of(raws: &[u16]) -> PkeyTable {
        let mut block = PkeyBlock::new();
        for (slot, &raw) in raws.iter().enumerate() {
            block.set_entry(slot as u8, Pkey::new(raw));
        }
        let mut table = PkeyTable::new();
        table.set_block(0, block).unwrap();
        table
    }

    #[test]
    fn limited_pair_never_matches() {
        assert!(!pkeys_match(Pkey::new(0x0010), Pkey::new(0x0010)));
        assert!(pkeys_match(Pkey::new(0x8010), Pkey::new(0x0010)));
        assert!(pkeys_match(Pkey::new(0x0010), Pkey::new(0x8010)));
        assert!(pkeys_match(Pkey::new(0x8010), Pkey::new(0x8010)));
    }

    #[test]
    fn different_bases_never_match() {
        assert!(!pkeys_match(Pkey::new(0x8010), Pkey::new(0x8011)));
    }

    #[test]
    fn same_table_always_shares() {
        // even when every key is limited
        let table = table_of(&[0x0010]);
        assert!(share_any_pkey(&table, &table));
    }

    #[test]
    fn merge_join_skips_disjoint_prefixes() {
        let a = table_of(&[0x8001, 0x8002, 0x8003, 0x8050]);
        let b = table_of(&[0x0040, 0x0050]);
        assert_eq!(find_common_pkey(&a, &b), Some(Pkey::new(0x8050)));
        assert!(find_common_pkey(&b, &a).is_some());
    }

    #[test]
    fn equal_base_mismatch_advances_both() {
        // 0x10 limited on both sides fails the membership test; the join
        // must still reach 0x8020.
        let a = table_of(&[0x0010, 0x8020]);
        let b = table_of(&[0x0010, 0x0020]);
        assert_eq!(find_common_pkey(&a, &b), Some(Pkey::new(0x8020)));
    }
}
