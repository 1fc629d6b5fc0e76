//! Graph versions: snapshots composed of edge versions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use lode_core::{ItemId, Predicate, Row, Transaction, VersionId};

use crate::error::{allow_empty, required, Result};
use crate::rich_version::RichVersion;

const VERSION_TABLE: &str = "graph_version";
const EDGE_TABLE: &str = "graph_version_edge";

/// A rich version owned by a graph item, composing a set of edge versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphVersion {
    /// The shared rich-version layer.
    pub rich: RichVersion,
    /// The owning graph item.
    pub graph_id: ItemId,
    /// The edge versions composing this snapshot; order-irrelevant.
    pub edge_version_ids: BTreeSet<VersionId>,
}

pub(crate) fn insert_version(
    txn: &mut dyn Transaction,
    id: VersionId,
    graph_id: ItemId,
    edge_version_ids: &BTreeSet<VersionId>,
) -> Result<()> {
    txn.insert(
        VERSION_TABLE,
        Row::new()
            .with("id", id.as_i64())
            .with("graph_id", graph_id.as_i64()),
    )?;

    for edge_version_id in edge_version_ids {
        txn.insert(
            EDGE_TABLE,
            Row::new()
                .with("graph_version_id", id.as_i64())
                .with("edge_version_id", edge_version_id.as_i64()),
        )?;
    }
    Ok(())
}

pub(crate) fn retrieve_version(txn: &dyn Transaction, rich: RichVersion) -> Result<GraphVersion> {
    let rows = required(
        txn.select(
            VERSION_TABLE,
            &[],
            &[Predicate::new("id", rich.id.as_i64())],
        ),
        "GraphVersion",
        rich.id,
    )?;
    let graph_id = ItemId::from_raw(rows[0].long("graph_id")?);

    // An empty edge set is a legal graph snapshot.
    let mut edge_version_ids = BTreeSet::new();
    for row in allow_empty(txn.select(
        EDGE_TABLE,
        &[],
        &[Predicate::new("graph_version_id", rich.id.as_i64())],
    ))? {
        edge_version_ids.insert(VersionId::from_raw(row.long("edge_version_id")?));
    }

    Ok(GraphVersion {
        rich,
        graph_id,
        edge_version_ids,
    })
}
