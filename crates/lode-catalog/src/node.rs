//! Node versions: snapshots of generic artifacts.

use serde::{Deserialize, Serialize};

use lode_core::{ItemId, Predicate, Row, Transaction, VersionId};

use crate::error::{required, Result};
use crate::rich_version::RichVersion;

const VERSION_TABLE: &str = "node_version";

/// A rich version owned by a node item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeVersion {
    /// The shared rich-version layer.
    pub rich: RichVersion,
    /// The owning node item.
    pub node_id: ItemId,
}

pub(crate) fn insert_version(
    txn: &mut dyn Transaction,
    id: VersionId,
    node_id: ItemId,
) -> Result<()> {
    txn.insert(
        VERSION_TABLE,
        Row::new()
            .with("id", id.as_i64())
            .with("node_id", node_id.as_i64()),
    )?;
    Ok(())
}

/// Joins the kind-specific row onto an already-loaded rich version.
///
/// A missing kind row is a [`crate::CatalogError::NotFound`] even when the
/// rich version exists; that asymmetry is the data-consistency check.
pub(crate) fn retrieve_version(txn: &dyn Transaction, rich: RichVersion) -> Result<NodeVersion> {
    let rows = required(
        txn.select(
            VERSION_TABLE,
            &[],
            &[Predicate::new("id", rich.id.as_i64())],
        ),
        "NodeVersion",
        rich.id,
    )?;
    let node_id = ItemId::from_raw(rows[0].long("node_id")?);

    Ok(NodeVersion { rich, node_id })
}
