//! Error types for catalog operations.
//!
//! This is the taxonomy callers of the catalog see. Storage-level errors
//! are wrapped; a raw empty-result from the adapter is always translated
//! into a domain error (usually [`CatalogError::NotFound`]) before it
//! propagates.

use lode_core::{ItemId, ValueType, VersionId};

use crate::item::ItemKind;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur during catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A name or ID did not resolve.
    #[error("not found: {resource_type} '{id}'")]
    NotFound {
        /// The type of resource that was not found.
        resource_type: &'static str,
        /// The name or ID that was looked up.
        id: String,
    },

    /// The name is already registered for this item kind.
    #[error("duplicate name: {kind} '{name}' already exists")]
    DuplicateName {
        /// The item kind the name collided in.
        kind: ItemKind,
        /// The colliding name.
        name: String,
    },

    /// A supplied parent version does not belong to the target item.
    #[error("invalid parent: version {version_id} does not belong to item {item_id}")]
    InvalidParent {
        /// The offending parent version.
        version_id: VersionId,
        /// The item the version was attached to.
        item_id: ItemId,
    },

    /// A tag's value type conflicts with the schema it is validated against.
    #[error("type mismatch for tag '{key}': schema declares {expected}, tag carries {actual}")]
    TypeMismatch {
        /// The offending tag key.
        key: String,
        /// The type the schema declares for this key.
        expected: ValueType,
        /// The type the tag actually carries.
        actual: ValueType,
    },

    /// A declared structure version does not resolve to a schema.
    #[error("structure version {version_id} does not resolve")]
    SchemaNotFound {
        /// The structure version that was declared.
        version_id: VersionId,
    },

    /// A backend failure below the catalog.
    #[error(transparent)]
    Storage(#[from] lode_core::Error),
}

impl CatalogError {
    /// Creates a new not-found error.
    #[must_use]
    pub fn not_found(resource_type: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }
}

/// Translates an empty select result into a not-found error, passing other
/// outcomes through.
pub(crate) fn required<T>(
    result: lode_core::Result<T>,
    resource_type: &'static str,
    id: impl std::fmt::Display,
) -> Result<T> {
    result.map_err(|e| {
        if e.is_empty_result() {
            CatalogError::not_found(resource_type, id)
        } else {
            CatalogError::Storage(e)
        }
    })
}

/// Treats an empty select result as an empty row set, passing other
/// outcomes through.
pub(crate) fn allow_empty(
    result: lode_core::Result<Vec<lode_core::Row>>,
) -> Result<Vec<lode_core::Row>> {
    match result {
        Err(e) if e.is_empty_result() => Ok(Vec::new()),
        other => Ok(other?),
    }
}
