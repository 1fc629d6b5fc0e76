//! Version-history DAG maintenance and leaf computation.
//!
//! Every item owns a DAG of its versions, persisted as append-only
//! successor rows `(item_id, from_version_id, to_version_id)`. A version
//! attached with no resolved parents records a successor from the reserved
//! id 0 instead, so membership stays derivable for roots.
//!
//! Both queries the engine needs fall out of the rows directly:
//!
//! - membership: every `to` id recorded for the item
//! - leaves: `to` ids that never appear as a (non-root) `from` id
//!
//! Recording the child's successors and "updating" the leaf set are the
//! same write, so leaf updates are atomic with the edges on any backend
//! that applies the successor rows of one attach together. Cycles are
//! impossible by construction: a parent must already be a member, and
//! member ids always predate the child id.

use std::collections::BTreeSet;

use lode_core::{ItemId, Predicate, Row, Transaction, VersionId};

use crate::error::{allow_empty, CatalogError, Result};
use crate::item;

const SUCCESSOR_TABLE: &str = "version_successor";

/// Reserved `from` id marking a root successor (a version with no parents).
const ROOT: i64 = 0;

/// Folds a new version into an item's DAG.
///
/// Empty `parents` resolve to the item's current leaf set inside the same
/// transaction, so "append the next version" needs no read-then-write race
/// on the caller's side. Every resolved parent must already belong to the
/// item; [`CatalogError::InvalidParent`] otherwise.
pub(crate) fn attach(
    txn: &mut dyn Transaction,
    item_id: ItemId,
    child: VersionId,
    parents: &[VersionId],
) -> Result<()> {
    item::verify_exists(txn, item_id)?;

    let mut resolved: Vec<VersionId> = parents.to_vec();
    if resolved.is_empty() {
        resolved = leaves(txn, item_id)?.into_iter().collect();
    }

    let members = members(txn, item_id)?;
    for parent in &resolved {
        if !members.contains(parent) {
            return Err(CatalogError::InvalidParent {
                version_id: *parent,
                item_id,
            });
        }
    }

    if resolved.is_empty() {
        insert_successor(txn, item_id, ROOT, child)?;
    } else {
        for parent in resolved {
            insert_successor(txn, item_id, parent.as_i64(), child)?;
        }
    }

    tracing::debug!(%item_id, version = %child, "attached version");
    Ok(())
}

/// Returns the item's current leaf set: versions with no recorded child.
///
/// Empty for an item with no versions yet; never empty afterwards.
pub(crate) fn leaves(txn: &dyn Transaction, item_id: ItemId) -> Result<BTreeSet<VersionId>> {
    let rows = successor_rows(txn, item_id)?;

    let mut to_ids = BTreeSet::new();
    let mut from_ids = BTreeSet::new();
    for row in &rows {
        to_ids.insert(row.long("to_version_id")?);
        let from = row.long("from_version_id")?;
        if from != ROOT {
            from_ids.insert(from);
        }
    }

    Ok(to_ids
        .difference(&from_ids)
        .map(|id| VersionId::from_raw(*id))
        .collect())
}

/// Returns every version recorded as belonging to the item.
pub(crate) fn members(txn: &dyn Transaction, item_id: ItemId) -> Result<BTreeSet<VersionId>> {
    let rows = successor_rows(txn, item_id)?;
    rows.iter()
        .map(|row| Ok(VersionId::from_raw(row.long("to_version_id")?)))
        .collect()
}

fn successor_rows(txn: &dyn Transaction, item_id: ItemId) -> Result<Vec<Row>> {
    allow_empty(txn.select(
        SUCCESSOR_TABLE,
        &[],
        &[Predicate::new("item_id", item_id.as_i64())],
    ))
}

fn insert_successor(
    txn: &mut dyn Transaction,
    item_id: ItemId,
    from: i64,
    to: VersionId,
) -> Result<()> {
    txn.insert(
        SUCCESSOR_TABLE,
        Row::new()
            .with("item_id", item_id.as_i64())
            .with("from_version_id", from)
            .with("to_version_id", to.as_i64()),
    )?;
    Ok(())
}
