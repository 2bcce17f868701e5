//! Access to the persistent edge table.
//!
//! The engine never touches row layout; it consumes this interface from the
//! catalog backend. Scans materialise their result set up front, so callers
//! may delete yielded rows while holding the returned vector.

use crate::address::ObjectAddress;
use crate::edge::{DependencyEdge, DependencyKind};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Stable identity of one edge row, valid until the row is deleted and the
/// deletion published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(pub u64);

/// An edge row yielded by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRow {
    pub id: RowId,
    pub edge: DependencyEdge,
}

/// Lock taken on rows returned by a scan.
///
/// Deletion-path scans must use `ForUpdate`: the row-level write lock is
/// what serialises concurrent drops of overlapping graphs. Discovery and
/// recording scans read without locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanLock {
    None,
    ForUpdate,
}

/// The persistent typed-edge table.
///
/// Visibility follows the surrounding transaction's command boundaries:
/// a deleted row keeps appearing in scans until [`publish`](Self::publish)
/// is called. The deletion state machine leans on this: the published
/// removal of outgoing edges is what terminates traversal of cyclic graphs.
pub trait EdgeStore {
    /// Edges whose dependent endpoint is `target`; a whole-object target
    /// (`sub_id == 0`) also matches every sub-object of it.
    fn scan_outgoing(&mut self, target: &ObjectAddress, lock: ScanLock) -> Result<Vec<EdgeRow>>;

    /// Edges whose referenced endpoint matches `target`, with the same
    /// whole-object subsumption rule.
    fn scan_incoming(&mut self, target: &ObjectAddress, lock: ScanLock) -> Result<Vec<EdgeRow>>;

    /// Remove one edge row. The removal stays visible to scans until the
    /// next `publish`.
    fn delete_row(&mut self, row: RowId) -> Result<()>;

    /// Record one edge per referenced address, all with the same dependent
    /// endpoint and kind.
    fn insert_edges(
        &mut self,
        dependent: &ObjectAddress,
        referenced: &[ObjectAddress],
        kind: DependencyKind,
    ) -> Result<()>;

    /// Visibility barrier: make prior in-transaction deletions observable
    /// to subsequent scans.
    fn publish(&mut self);
}
