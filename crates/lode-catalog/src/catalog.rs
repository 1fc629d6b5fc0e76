//! The catalog facade: every public operation, one transaction each.
//!
//! A `Catalog` owns a shared storage backend and the process-wide
//! identifier generator. Each logical operation (create or retrieve)
//! opens its own transaction scope, commits on success, and aborts before
//! reporting any failure; a "not found" on a read still aborts the read
//! scope first. The catalog never retries — that is a policy for the
//! layer above.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use lode_core::{Database, IdGenerator, ItemId, Tag, Transaction, ValueType, VersionId};

use crate::edge::EdgeVersion;
use crate::error::{CatalogError, Result};
use crate::graph::GraphVersion;
use crate::item::{Item, ItemKind};
use crate::lineage::{LineageEdgeVersion, LineageGraphVersion};
use crate::node::NodeVersion;
use crate::rich_version::{NewRichVersion, RichVersion};
use crate::structure::StructureVersion;
use crate::{dag, edge, graph, item, lineage, node, rich_version, structure, traversal};

/// The versioned metadata catalog.
///
/// Cheap to clone; clones share the backend and identifier generator.
#[derive(Clone)]
pub struct Catalog {
    db: Arc<dyn Database>,
    ids: Arc<IdGenerator>,
}

impl Catalog {
    /// Creates a catalog over a backend, with a fresh identifier generator.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            ids: Arc::new(IdGenerator::new()),
        }
    }

    /// Creates a catalog sharing an existing identifier generator.
    ///
    /// Use this when several catalogs run against the same backend; the
    /// generator is the single source of identifiers per process.
    #[must_use]
    pub fn with_id_generator(db: Arc<dyn Database>, ids: Arc<IdGenerator>) -> Self {
        Self { db, ids }
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Registers a new node item.
    pub fn create_node(&self, name: &str, tags: BTreeMap<String, Tag>) -> Result<Item> {
        self.create_item(ItemKind::Node, name, None, tags)
    }

    /// Registers a new edge item.
    pub fn create_edge(&self, name: &str, tags: BTreeMap<String, Tag>) -> Result<Item> {
        self.create_item(ItemKind::Edge, name, None, tags)
    }

    /// Registers a new graph item.
    pub fn create_graph(&self, name: &str, tags: BTreeMap<String, Tag>) -> Result<Item> {
        self.create_item(ItemKind::Graph, name, None, tags)
    }

    /// Registers a new structure item.
    pub fn create_structure(&self, name: &str, tags: BTreeMap<String, Tag>) -> Result<Item> {
        self.create_item(ItemKind::Structure, name, None, tags)
    }

    /// Registers a new lineage-edge item under a stable source key.
    pub fn create_lineage_edge(
        &self,
        name: &str,
        source_key: &str,
        tags: BTreeMap<String, Tag>,
    ) -> Result<Item> {
        self.create_item(ItemKind::LineageEdge, name, Some(source_key), tags)
    }

    /// Registers a new lineage-graph item under a stable source key.
    pub fn create_lineage_graph(
        &self,
        name: &str,
        source_key: &str,
        tags: BTreeMap<String, Tag>,
    ) -> Result<Item> {
        self.create_item(ItemKind::LineageGraph, name, Some(source_key), tags)
    }

    /// Loads an item by kind and name.
    ///
    /// # Errors
    ///
    /// Fails with [`CatalogError::NotFound`] if no such item exists.
    pub fn item(&self, kind: ItemKind, name: &str) -> Result<Item> {
        let found = self.in_txn("item", |txn| item::retrieve(txn, kind, name))?;
        tracing::info!(kind = %kind, name, item_id = %found.id, "retrieved item");
        Ok(found)
    }

    /// Returns the current leaf set of the item named `name`: its versions
    /// with no recorded child.
    ///
    /// # Errors
    ///
    /// Fails with [`CatalogError::NotFound`] if no such item exists; an
    /// existing item with no versions yields the empty set.
    pub fn leaves(&self, kind: ItemKind, name: &str) -> Result<BTreeSet<VersionId>> {
        self.in_txn("leaves", |txn| {
            let found = item::retrieve(txn, kind, name)?;
            dag::leaves(txn, found.id)
        })
    }

    fn create_item(
        &self,
        kind: ItemKind,
        name: &str,
        source_key: Option<&str>,
        tags: BTreeMap<String, Tag>,
    ) -> Result<Item> {
        let id = self.ids.next_item_id();
        let created =
            self.in_txn("create_item", |txn| {
                item::create(txn, kind, id, name, source_key, tags)
            })?;
        tracing::info!(kind = %kind, name, item_id = %id, "created item");
        Ok(created)
    }

    // ------------------------------------------------------------------
    // Versions
    // ------------------------------------------------------------------

    /// Creates a node version and folds it into the node's DAG.
    ///
    /// Empty `parents` resolve to the node's current leaves inside the
    /// same transaction.
    pub fn create_node_version(
        &self,
        node_id: ItemId,
        new: NewRichVersion,
        parents: &[VersionId],
    ) -> Result<NodeVersion> {
        let id = self.ids.next_version_id();
        let created = self.in_txn("create_node_version", |txn| {
            rich_version::insert(txn, id, &new)?;
            node::insert_version(txn, id, node_id)?;
            dag::attach(txn, node_id, id, parents)?;
            node::retrieve_version(txn, rich_version::retrieve(txn, id)?)
        })?;
        tracing::info!(version = %id, node = %node_id, "created node version");
        Ok(created)
    }

    /// Creates an edge version linking two node versions.
    pub fn create_edge_version(
        &self,
        edge_id: ItemId,
        from_node_version_id: VersionId,
        to_node_version_id: VersionId,
        new: NewRichVersion,
        parents: &[VersionId],
    ) -> Result<EdgeVersion> {
        let id = self.ids.next_version_id();
        let created = self.in_txn("create_edge_version", |txn| {
            rich_version::insert(txn, id, &new)?;
            edge::insert_version(txn, id, edge_id, from_node_version_id, to_node_version_id)?;
            dag::attach(txn, edge_id, id, parents)?;
            edge::retrieve_version(txn, rich_version::retrieve(txn, id)?)
        })?;
        tracing::info!(version = %id, edge = %edge_id, "created edge version");
        Ok(created)
    }

    /// Creates a graph version composing a set of edge versions.
    pub fn create_graph_version(
        &self,
        graph_id: ItemId,
        edge_version_ids: BTreeSet<VersionId>,
        new: NewRichVersion,
        parents: &[VersionId],
    ) -> Result<GraphVersion> {
        let id = self.ids.next_version_id();
        let created = self.in_txn("create_graph_version", |txn| {
            rich_version::insert(txn, id, &new)?;
            graph::insert_version(txn, id, graph_id, &edge_version_ids)?;
            dag::attach(txn, graph_id, id, parents)?;
            graph::retrieve_version(txn, rich_version::retrieve(txn, id)?)
        })?;
        tracing::info!(version = %id, graph = %graph_id, "created graph version");
        Ok(created)
    }

    /// Creates a structure version whose payload is the schema map itself.
    pub fn create_structure_version(
        &self,
        structure_id: ItemId,
        attributes: BTreeMap<String, ValueType>,
        parents: &[VersionId],
    ) -> Result<StructureVersion> {
        let id = self.ids.next_version_id();
        let created = self.in_txn("create_structure_version", |txn| {
            structure::insert_version(txn, id, structure_id, &attributes)?;
            dag::attach(txn, structure_id, id, parents)?;
            structure::retrieve_version(txn, id)
        })?;
        tracing::info!(version = %id, structure = %structure_id, "created structure version");
        Ok(created)
    }

    /// Creates a lineage-edge version linking two rich versions.
    pub fn create_lineage_edge_version(
        &self,
        lineage_edge_id: ItemId,
        from_rich_version_id: VersionId,
        to_rich_version_id: VersionId,
        new: NewRichVersion,
        parents: &[VersionId],
    ) -> Result<LineageEdgeVersion> {
        let id = self.ids.next_version_id();
        let created = self.in_txn("create_lineage_edge_version", |txn| {
            rich_version::insert(txn, id, &new)?;
            lineage::insert_edge_version(
                txn,
                id,
                lineage_edge_id,
                from_rich_version_id,
                to_rich_version_id,
            )?;
            dag::attach(txn, lineage_edge_id, id, parents)?;
            lineage::retrieve_edge_version(txn, rich_version::retrieve(txn, id)?)
        })?;
        tracing::info!(version = %id, lineage_edge = %lineage_edge_id, "created lineage edge version");
        Ok(created)
    }

    /// Creates a lineage-graph version composing lineage-edge versions.
    pub fn create_lineage_graph_version(
        &self,
        lineage_graph_id: ItemId,
        lineage_edge_version_ids: BTreeSet<VersionId>,
        new: NewRichVersion,
        parents: &[VersionId],
    ) -> Result<LineageGraphVersion> {
        let id = self.ids.next_version_id();
        let created = self.in_txn("create_lineage_graph_version", |txn| {
            rich_version::insert(txn, id, &new)?;
            lineage::insert_graph_version(txn, id, lineage_graph_id, &lineage_edge_version_ids)?;
            dag::attach(txn, lineage_graph_id, id, parents)?;
            lineage::retrieve_graph_version(txn, rich_version::retrieve(txn, id)?)
        })?;
        tracing::info!(version = %id, lineage_graph = %lineage_graph_id, "created lineage graph version");
        Ok(created)
    }

    /// Loads the rich layer of a version.
    pub fn rich_version(&self, id: VersionId) -> Result<RichVersion> {
        self.in_txn("rich_version", |txn| rich_version::retrieve(txn, id))
    }

    /// Loads a node version.
    pub fn node_version(&self, id: VersionId) -> Result<NodeVersion> {
        self.in_txn("node_version", |txn| {
            node::retrieve_version(txn, rich_version::retrieve(txn, id)?)
        })
    }

    /// Loads an edge version.
    pub fn edge_version(&self, id: VersionId) -> Result<EdgeVersion> {
        self.in_txn("edge_version", |txn| {
            edge::retrieve_version(txn, rich_version::retrieve(txn, id)?)
        })
    }

    /// Loads a graph version.
    pub fn graph_version(&self, id: VersionId) -> Result<GraphVersion> {
        self.in_txn("graph_version", |txn| {
            graph::retrieve_version(txn, rich_version::retrieve(txn, id)?)
        })
    }

    /// Loads a structure version.
    pub fn structure_version(&self, id: VersionId) -> Result<StructureVersion> {
        self.in_txn("structure_version", |txn| structure::retrieve_version(txn, id))
    }

    /// Loads a lineage-edge version.
    pub fn lineage_edge_version(&self, id: VersionId) -> Result<LineageEdgeVersion> {
        self.in_txn("lineage_edge_version", |txn| {
            lineage::retrieve_edge_version(txn, rich_version::retrieve(txn, id)?)
        })
    }

    /// Loads a lineage-graph version.
    pub fn lineage_graph_version(&self, id: VersionId) -> Result<LineageGraphVersion> {
        self.in_txn("lineage_graph_version", |txn| {
            lineage::retrieve_graph_version(txn, rich_version::retrieve(txn, id)?)
        })
    }

    // ------------------------------------------------------------------
    // Lineage traversal
    // ------------------------------------------------------------------

    /// Returns every node version reachable by following edge versions
    /// forward from `start`.
    pub fn transitive_closure(&self, start: VersionId) -> Result<BTreeSet<VersionId>> {
        self.in_txn("transitive_closure", |txn| {
            traversal::transitive_closure(txn, start)
        })
    }

    /// Returns the lineage-edge versions departing the given rich version.
    pub fn adjacent_lineage(&self, id: VersionId) -> Result<BTreeSet<VersionId>> {
        self.in_txn("adjacent_lineage", |txn| traversal::adjacent_lineage(txn, id))
    }

    // ------------------------------------------------------------------

    /// Runs one logical operation in its own transaction scope and span.
    ///
    /// Commit on success; abort on any failure before the error
    /// propagates. The abort is best effort — on a backend without real
    /// rollback it only ends the scope — and its own outcome never masks
    /// the original error.
    fn in_txn<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut dyn Transaction) -> Result<T>,
    ) -> Result<T> {
        let _span = lode_core::observability::catalog_span(op).entered();
        let mut txn = self.db.begin().map_err(CatalogError::Storage)?;
        match f(&mut *txn) {
            Ok(value) => {
                txn.commit().map_err(CatalogError::Storage)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = txn.abort() {
                    tracing::warn!(error = %abort_err, "abort failed after operation error");
                }
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}
