//! Error types for P_Key table operations

use std::collections::TryReserveError;
use thiserror::Error;

/// Faults a table mutation can surface.
///
/// Lookups that find nothing return `Option::None` instead; an absent block
/// or key is a normal outcome, not an error.
#[derive(Error, Debug)]
pub enum PkeyTableError {
    /// Backing storage for a block could not be obtained. The table is left
    /// in its prior state; the caller decides whether to abort the sweep.
    #[error("block storage allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, PkeyTableError>;
