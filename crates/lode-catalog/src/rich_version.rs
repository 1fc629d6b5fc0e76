//! The rich-version layer shared by every specialized version kind.
//!
//! A rich version is a version plus typed tags, an optional schema
//! reference (a structure version its tags are validated against), and an
//! optional external reference with access parameters. Specialized
//! factories insert the rich layer first, then their kind-specific rows,
//! then fold the version into the owning item's DAG.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lode_core::{Predicate, Row, Tag, Transaction, VersionId};

use crate::error::{allow_empty, required, CatalogError, Result};
use crate::structure;
use crate::tag;

const RICH_VERSION_TABLE: &str = "rich_version";
const PARAMETER_TABLE: &str = "rich_version_external_parameter";

/// A version carrying tags, an optional schema reference, and an optional
/// external reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichVersion {
    /// The version's unique ID.
    pub id: VersionId,
    /// Typed tags, keyed by tag key.
    pub tags: BTreeMap<String, Tag>,
    /// Schema the tags were validated against, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure_version_id: Option<VersionId>,
    /// Opaque external locator, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Access parameters for the reference; meaningful only when
    /// `reference` is present.
    pub reference_parameters: BTreeMap<String, String>,
}

/// The caller-supplied fields of a rich version, before an ID is allocated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRichVersion {
    /// Typed tags, keyed by tag key.
    pub tags: BTreeMap<String, Tag>,
    /// Schema to validate the tags against, if any.
    pub structure_version_id: Option<VersionId>,
    /// Opaque external locator, if any.
    pub reference: Option<String>,
    /// Access parameters for the reference.
    pub reference_parameters: BTreeMap<String, String>,
}

impl NewRichVersion {
    /// Creates an empty rich-version payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style tag insertion.
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag.key.clone(), tag);
        self
    }

    /// Builder-style schema declaration.
    #[must_use]
    pub fn with_structure_version(mut self, id: VersionId) -> Self {
        self.structure_version_id = Some(id);
        self
    }

    /// Builder-style external reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Builder-style reference parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.reference_parameters.insert(key.into(), value.into());
        self
    }
}

/// Persists the rich layer of a version under an already-allocated ID.
///
/// If a structure version is declared, its schema is fetched (failing with
/// [`CatalogError::SchemaNotFound`] if it does not resolve) and the tags
/// are validated before anything is written. Tags are stamped with the new
/// owning version ID as they are stored.
pub(crate) fn insert(txn: &mut dyn Transaction, id: VersionId, new: &NewRichVersion) -> Result<()> {
    if let Some(structure_version_id) = new.structure_version_id {
        let schema = structure::schema(txn, structure_version_id)
            .map_err(|e| match e {
                CatalogError::NotFound { .. } => CatalogError::SchemaNotFound {
                    version_id: structure_version_id,
                },
                other => other,
            })?;
        tag::validate_tags(&new.tags, &schema)?;
    }

    let mut row = Row::new().with("id", id.as_i64());
    if let Some(structure_version_id) = new.structure_version_id {
        row = row.with("structure_version_id", structure_version_id.as_i64());
    }
    if let Some(reference) = &new.reference {
        row = row.with("reference", reference.as_str());
    }
    txn.insert(RICH_VERSION_TABLE, row)?;

    tag::insert_tags(
        txn,
        tag::RICH_VERSION_TAG_TABLE,
        "rich_version_id",
        id.as_i64(),
        &new.tags,
    )?;

    for (key, value) in &new.reference_parameters {
        txn.insert(
            PARAMETER_TABLE,
            Row::new()
                .with("rich_version_id", id.as_i64())
                .with("key", key.as_str())
                .with("value", value.as_str()),
        )?;
    }

    Ok(())
}

/// Loads the rich layer of a version.
///
/// Fails with [`CatalogError::NotFound`] if the version is absent.
pub(crate) fn retrieve(txn: &dyn Transaction, id: VersionId) -> Result<RichVersion> {
    let rows = required(
        txn.select(
            RICH_VERSION_TABLE,
            &[],
            &[Predicate::new("id", id.as_i64())],
        ),
        "RichVersion",
        id,
    )?;
    let row = &rows[0];

    let structure_version_id = row.opt_long("structure_version_id")?.map(VersionId::from_raw);
    let reference = row.opt_string("reference")?;

    let tags = tag::fetch_tags(
        txn,
        tag::RICH_VERSION_TAG_TABLE,
        "rich_version_id",
        id.as_i64(),
    )?;

    let mut reference_parameters = BTreeMap::new();
    for row in allow_empty(txn.select(
        PARAMETER_TABLE,
        &[],
        &[Predicate::new("rich_version_id", id.as_i64())],
    ))? {
        reference_parameters.insert(row.string("key")?, row.string("value")?);
    }

    Ok(RichVersion {
        id,
        tags,
        structure_version_id,
        reference,
        reference_parameters,
    })
}
