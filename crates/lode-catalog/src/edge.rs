//! Edge versions: directed derivation links between node versions.

use serde::{Deserialize, Serialize};

use lode_core::{ItemId, Predicate, Row, Transaction, VersionId};

use crate::error::{required, Result};
use crate::rich_version::RichVersion;

pub(crate) const VERSION_TABLE: &str = "edge_version";

/// A rich version owned by an edge item, linking two node versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeVersion {
    /// The shared rich-version layer.
    pub rich: RichVersion,
    /// The owning edge item.
    pub edge_id: ItemId,
    /// The node version the derivation starts from.
    pub from_node_version_id: VersionId,
    /// The node version the derivation points to.
    pub to_node_version_id: VersionId,
}

pub(crate) fn insert_version(
    txn: &mut dyn Transaction,
    id: VersionId,
    edge_id: ItemId,
    from: VersionId,
    to: VersionId,
) -> Result<()> {
    txn.insert(
        VERSION_TABLE,
        Row::new()
            .with("id", id.as_i64())
            .with("edge_id", edge_id.as_i64())
            .with("from_node_version_id", from.as_i64())
            .with("to_node_version_id", to.as_i64()),
    )?;
    Ok(())
}

pub(crate) fn retrieve_version(txn: &dyn Transaction, rich: RichVersion) -> Result<EdgeVersion> {
    let rows = required(
        txn.select(
            VERSION_TABLE,
            &[],
            &[Predicate::new("id", rich.id.as_i64())],
        ),
        "EdgeVersion",
        rich.id,
    )?;
    let row = &rows[0];

    Ok(EdgeVersion {
        edge_id: ItemId::from_raw(row.long("edge_id")?),
        from_node_version_id: VersionId::from_raw(row.long("from_node_version_id")?),
        to_node_version_id: VersionId::from_raw(row.long("to_node_version_id")?),
        rich,
    })
}
