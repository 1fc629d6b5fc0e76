//! # lode-catalog
//!
//! The Item/Version DAG engine of the Lode metadata catalog.
//!
//! This crate tracks the version history and lineage of data artifacts:
//!
//! - **Items**: named artifacts (nodes, edges, graphs, structures, and the
//!   lineage kinds), each owning a DAG of immutable versions
//! - **Rich Versions**: versions carrying typed tags, an optional schema
//!   reference, and an optional external reference
//! - **Leaf Tracking**: the current heads of each item's DAG, maintained
//!   on every attach
//! - **Lineage Traversal**: transitive closure over edge versions and
//!   adjacent-lineage lookup
//!
//! All operations run through the storage-adapter contract in
//! [`lode_core`], one transaction per logical operation, so the engine
//! behaves identically over any backend that implements the contract —
//! with the documented exception that a backend without multi-statement
//! transactions can leave partial rows behind on failure.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lode_catalog::prelude::*;
//! use lode_core::TransactionalBackend;
//!
//! # fn main() -> lode_catalog::Result<()> {
//! let catalog = Catalog::new(Arc::new(TransactionalBackend::new()));
//!
//! let node = catalog.create_node("ratings", Default::default())?;
//! let v1 = catalog.create_node_version(node.id, NewRichVersion::new(), &[])?;
//! let v2 = catalog.create_node_version(node.id, NewRichVersion::new(), &[])?;
//!
//! // The chain collapses to a single leaf.
//! let leaves = catalog.leaves(ItemKind::Node, "ratings")?;
//! assert_eq!(leaves.into_iter().collect::<Vec<_>>(), vec![v2.rich.id]);
//! # let _ = v1;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod catalog;
mod dag;
pub mod edge;
pub mod error;
pub mod graph;
pub mod item;
pub mod lineage;
pub mod node;
pub mod rich_version;
pub mod structure;
mod tag;
mod traversal;

// Re-export main types at crate root
pub use catalog::Catalog;
pub use edge::EdgeVersion;
pub use error::{CatalogError, Result};
pub use graph::GraphVersion;
pub use item::{Item, ItemKind};
pub use lineage::{LineageEdgeVersion, LineageGraphVersion};
pub use node::NodeVersion;
pub use rich_version::{NewRichVersion, RichVersion};
pub use structure::StructureVersion;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::edge::EdgeVersion;
    pub use crate::error::{CatalogError, Result};
    pub use crate::graph::GraphVersion;
    pub use crate::item::{Item, ItemKind};
    pub use crate::lineage::{LineageEdgeVersion, LineageGraphVersion};
    pub use crate::node::NodeVersion;
    pub use crate::rich_version::{NewRichVersion, RichVersion};
    pub use crate::structure::StructureVersion;
}
