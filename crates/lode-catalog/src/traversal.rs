//! Lineage traversal queries over edge versions.
//!
//! Edge versions link versions of *different* node items, so the edge
//! graph can contain cycles even though each item's own version DAG is
//! acyclic; traversal tracks discovered ids and never revisits one.

use std::collections::{BTreeSet, VecDeque};

use lode_core::{Predicate, Transaction, VersionId};

use crate::error::{allow_empty, Result};
use crate::{edge, lineage};

/// Returns every node version reachable by following edge versions forward
/// from `start`.
///
/// `start` itself appears in the result only if some path leads back to
/// it. The result is a set; no ordering is guaranteed.
pub(crate) fn transitive_closure(
    txn: &dyn Transaction,
    start: VersionId,
) -> Result<BTreeSet<VersionId>> {
    let mut reached = BTreeSet::new();
    let mut frontier = VecDeque::from([start]);

    while let Some(current) = frontier.pop_front() {
        for to in outgoing(txn, current)? {
            if reached.insert(to) {
                frontier.push_back(to);
            }
        }
    }

    Ok(reached)
}

/// Returns the lineage-edge versions departing the given rich version.
pub(crate) fn adjacent_lineage(
    txn: &dyn Transaction,
    id: VersionId,
) -> Result<BTreeSet<VersionId>> {
    let rows = allow_empty(txn.select(
        lineage::EDGE_VERSION_TABLE,
        &["id"],
        &[Predicate::new("from_rich_version_id", id.as_i64())],
    ))?;

    rows.iter()
        .map(|row| Ok(VersionId::from_raw(row.long("id")?)))
        .collect()
}

fn outgoing(txn: &dyn Transaction, from: VersionId) -> Result<Vec<VersionId>> {
    let rows = allow_empty(txn.select(
        edge::VERSION_TABLE,
        &["to_node_version_id"],
        &[Predicate::new("from_node_version_id", from.as_i64())],
    ))?;

    rows.iter()
        .map(|row| Ok(VersionId::from_raw(row.long("to_node_version_id")?)))
        .collect()
}
