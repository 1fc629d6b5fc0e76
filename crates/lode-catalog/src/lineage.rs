//! Lineage versions: provenance between pipeline stages.
//!
//! Lineage edges connect arbitrary rich versions (not just node versions),
//! tracking provenance rather than general derivation; lineage graphs
//! compose lineage edge versions the way graphs compose edge versions.
//! Their items additionally carry a stable `source_key`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use lode_core::{ItemId, Predicate, Row, Transaction, VersionId};

use crate::error::{allow_empty, required, Result};
use crate::rich_version::RichVersion;

pub(crate) const EDGE_VERSION_TABLE: &str = "lineage_edge_version";
const GRAPH_VERSION_TABLE: &str = "lineage_graph_version";
const GRAPH_EDGE_TABLE: &str = "lineage_graph_version_edge";

/// A rich version owned by a lineage-edge item, linking two rich versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEdgeVersion {
    /// The shared rich-version layer.
    pub rich: RichVersion,
    /// The owning lineage-edge item.
    pub lineage_edge_id: ItemId,
    /// The rich version provenance flows from.
    pub from_rich_version_id: VersionId,
    /// The rich version provenance flows to.
    pub to_rich_version_id: VersionId,
}

/// A rich version owned by a lineage-graph item, composing lineage edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageGraphVersion {
    /// The shared rich-version layer.
    pub rich: RichVersion,
    /// The owning lineage-graph item.
    pub lineage_graph_id: ItemId,
    /// The lineage edge versions composing this snapshot; order-irrelevant.
    pub lineage_edge_version_ids: BTreeSet<VersionId>,
}

pub(crate) fn insert_edge_version(
    txn: &mut dyn Transaction,
    id: VersionId,
    lineage_edge_id: ItemId,
    from: VersionId,
    to: VersionId,
) -> Result<()> {
    txn.insert(
        EDGE_VERSION_TABLE,
        Row::new()
            .with("id", id.as_i64())
            .with("lineage_edge_id", lineage_edge_id.as_i64())
            .with("from_rich_version_id", from.as_i64())
            .with("to_rich_version_id", to.as_i64()),
    )?;
    Ok(())
}

pub(crate) fn retrieve_edge_version(
    txn: &dyn Transaction,
    rich: RichVersion,
) -> Result<LineageEdgeVersion> {
    let rows = required(
        txn.select(
            EDGE_VERSION_TABLE,
            &[],
            &[Predicate::new("id", rich.id.as_i64())],
        ),
        "LineageEdgeVersion",
        rich.id,
    )?;
    let row = &rows[0];

    Ok(LineageEdgeVersion {
        lineage_edge_id: ItemId::from_raw(row.long("lineage_edge_id")?),
        from_rich_version_id: VersionId::from_raw(row.long("from_rich_version_id")?),
        to_rich_version_id: VersionId::from_raw(row.long("to_rich_version_id")?),
        rich,
    })
}

pub(crate) fn insert_graph_version(
    txn: &mut dyn Transaction,
    id: VersionId,
    lineage_graph_id: ItemId,
    lineage_edge_version_ids: &BTreeSet<VersionId>,
) -> Result<()> {
    txn.insert(
        GRAPH_VERSION_TABLE,
        Row::new()
            .with("id", id.as_i64())
            .with("lineage_graph_id", lineage_graph_id.as_i64()),
    )?;

    for edge_version_id in lineage_edge_version_ids {
        txn.insert(
            GRAPH_EDGE_TABLE,
            Row::new()
                .with("lineage_graph_version_id", id.as_i64())
                .with("lineage_edge_version_id", edge_version_id.as_i64()),
        )?;
    }
    Ok(())
}

pub(crate) fn retrieve_graph_version(
    txn: &dyn Transaction,
    rich: RichVersion,
) -> Result<LineageGraphVersion> {
    let rows = required(
        txn.select(
            GRAPH_VERSION_TABLE,
            &[],
            &[Predicate::new("id", rich.id.as_i64())],
        ),
        "LineageGraphVersion",
        rich.id,
    )?;
    let lineage_graph_id = ItemId::from_raw(rows[0].long("lineage_graph_id")?);

    let mut lineage_edge_version_ids = BTreeSet::new();
    for row in allow_empty(txn.select(
        GRAPH_EDGE_TABLE,
        &[],
        &[Predicate::new("lineage_graph_version_id", rich.id.as_i64())],
    ))? {
        lineage_edge_version_ids.insert(VersionId::from_raw(row.long("lineage_edge_version_id")?));
    }

    Ok(LineageGraphVersion {
        rich,
        lineage_graph_id,
        lineage_edge_version_ids,
    })
}
