//! P_Key (partition key) table management for InfiniBand subnet management
//!
//! Every physical port in an InfiniBand fabric carries a P_Key table that
//! governs which partitions the port may participate in; two ports can
//! exchange traffic only if they share a partition key with compatible
//! membership. This crate implements that table for a subnet manager's
//! control plane:
//!
//! - [`PkeyTable`]: sparse committed and staged block storage mirroring the
//!   wire `P_KeyTable` attribute block layout, plus a pending-assignment
//!   queue and the staged free-slot scan used while computing a fresh
//!   assignment.
//! - [`PkeyIndex`]: the derived base-key index, rebuilt after every
//!   committed-block change, resolving duplicate bases by membership
//!   precedence.
//! - [`matcher`]: the pairwise algorithms routing runs on every link to
//!   decide whether two ports share a key and to find a concrete one.
//!
//! Port, node, and switch object models, MAD transport, and routing itself
//! live elsewhere; this crate owns only the table, its index, and the
//! matching algorithms.

pub mod block;
pub mod cursor;
pub mod error;
pub mod index;
pub mod matcher;
pub mod pending;
pub mod table;
pub mod types;

pub use block::PkeyBlock;
pub use cursor::SlotCursor;
pub use error::{PkeyTableError, Result};
pub use index::{IndexEntry, PkeyIndex};
pub use matcher::{
    find_common_pkey, pkeys_match, share_any_pkey, share_specific_pkey, table_has_pkey,
};
pub use pending::{PendingPkey, PendingQueue};
pub use table::PkeyTable;
pub use types::{PKEY_BLOCK_SIZE, Pkey, SlotRef};
