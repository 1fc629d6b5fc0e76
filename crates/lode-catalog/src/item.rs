//! Items: named, persistently tracked artifacts.
//!
//! An item is the identity an artifact keeps across its whole version
//! history. The six kinds share one representation; what distinguishes
//! them is which version payload their versions carry and, for the lineage
//! kinds, a stable externally-meaningful source key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use lode_core::{ItemId, Predicate, Row, Tag, Transaction};

use crate::error::{required, CatalogError, Result};
use crate::tag;

/// The item table, one row per item across all kinds.
const ITEM_TABLE: &str = "item";

/// The kinds of items the catalog tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// A node: a generic artifact (dataset, model, file collection).
    Node,
    /// An edge: a directed derivation link between two nodes.
    Edge,
    /// A graph: a snapshot composed of edge versions.
    Graph,
    /// A structure: a schema constraining tag types.
    Structure,
    /// A lineage edge: provenance between pipeline stages.
    LineageEdge,
    /// A lineage graph: a snapshot composed of lineage edge versions.
    LineageGraph,
}

impl ItemKind {
    /// Returns the kind's registry table (one row per named item).
    #[must_use]
    pub(crate) const fn table(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Graph => "graph",
            Self::Structure => "structure",
            Self::LineageEdge => "lineage_edge",
            Self::LineageGraph => "lineage_graph",
        }
    }

    /// Returns the human-readable kind name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "Node",
            Self::Edge => "Edge",
            Self::Graph => "Graph",
            Self::Structure => "Structure",
            Self::LineageEdge => "LineageEdge",
            Self::LineageGraph => "LineageGraph",
        }
    }

    /// Returns `true` for the lineage kinds, which carry a source key.
    #[must_use]
    pub const fn has_source_key(&self) -> bool {
        matches!(self, Self::LineageEdge | Self::LineageGraph)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, persistently tracked artifact.
///
/// Items are created once and never deleted; the only mutable state in the
/// model is the item's leaf set, maintained through append-only version
/// successor rows (see [`crate::dag`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique item ID.
    pub id: ItemId,
    /// The item's kind.
    pub kind: ItemKind,
    /// Human-assigned name, unique within the kind.
    pub name: String,
    /// Stable externally-meaningful key; populated for lineage kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_key: Option<String>,
    /// Tags describing the item itself (not any one version).
    pub tags: BTreeMap<String, Tag>,
}

/// Persists a new item of the given kind.
///
/// Fails with [`CatalogError::DuplicateName`] if the name is already
/// registered for this kind.
pub(crate) fn create(
    txn: &mut dyn Transaction,
    kind: ItemKind,
    id: ItemId,
    name: &str,
    source_key: Option<&str>,
    tags: BTreeMap<String, Tag>,
) -> Result<Item> {
    let existing = txn.select(kind.table(), &["item_id"], &[Predicate::new("name", name)]);
    match existing {
        Ok(_) => {
            return Err(CatalogError::DuplicateName {
                kind,
                name: name.to_string(),
            })
        }
        Err(e) if e.is_empty_result() => {}
        Err(e) => return Err(e.into()),
    }

    txn.insert(ITEM_TABLE, Row::new().with("item_id", id.as_i64()))?;

    let mut row = Row::new().with("name", name).with("item_id", id.as_i64());
    if let Some(key) = source_key {
        row = row.with("source_key", key);
    }
    txn.insert(kind.table(), row)?;

    tag::insert_tags(txn, tag::ITEM_TAG_TABLE, "item_id", id.as_i64(), &tags)?;

    Ok(Item {
        id,
        kind,
        name: name.to_string(),
        source_key: source_key.map(ToString::to_string),
        tags,
    })
}

/// Loads an item by kind and name.
///
/// Fails with [`CatalogError::NotFound`] if no such item exists.
pub(crate) fn retrieve(txn: &dyn Transaction, kind: ItemKind, name: &str) -> Result<Item> {
    let rows = required(
        txn.select(kind.table(), &[], &[Predicate::new("name", name)]),
        kind.as_str(),
        name,
    )?;
    let row = &rows[0];

    let id = ItemId::from_raw(row.long("item_id")?);
    let source_key = row.opt_string("source_key")?;
    let tags = tag::fetch_tags(txn, tag::ITEM_TAG_TABLE, "item_id", id.as_i64())?;

    Ok(Item {
        id,
        kind,
        name: name.to_string(),
        source_key,
        tags,
    })
}

/// Returns an error unless the item ID is registered.
pub(crate) fn verify_exists(txn: &dyn Transaction, id: ItemId) -> Result<()> {
    required(
        txn.select(
            ITEM_TABLE,
            &["item_id"],
            &[Predicate::new("item_id", id.as_i64())],
        ),
        "Item",
        id,
    )?;
    Ok(())
}
