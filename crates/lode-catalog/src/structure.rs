//! Structure versions: schema snapshots constraining tag types.
//!
//! A structure version's payload is the schema map itself (attribute name
//! to required value type); it is a plain version with no tags or external
//! reference of its own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lode_core::{ItemId, Predicate, Row, Transaction, ValueType, VersionId};

use crate::error::{allow_empty, required, Result};

const VERSION_TABLE: &str = "structure_version";
const ATTRIBUTE_TABLE: &str = "structure_version_attribute";

/// One immutable schema snapshot of a structure item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureVersion {
    /// The version's unique ID.
    pub id: VersionId,
    /// The owning structure item.
    pub structure_id: ItemId,
    /// Required value type per attribute name.
    pub attributes: BTreeMap<String, ValueType>,
}

/// Persists a structure version and its attribute rows.
pub(crate) fn insert_version(
    txn: &mut dyn Transaction,
    id: VersionId,
    structure_id: ItemId,
    attributes: &BTreeMap<String, ValueType>,
) -> Result<()> {
    txn.insert(
        VERSION_TABLE,
        Row::new()
            .with("id", id.as_i64())
            .with("structure_id", structure_id.as_i64()),
    )?;

    for (name, value_type) in attributes {
        txn.insert(
            ATTRIBUTE_TABLE,
            Row::new()
                .with("structure_version_id", id.as_i64())
                .with("key", name.as_str())
                .with("type", value_type.as_str()),
        )?;
    }
    Ok(())
}

/// Loads a structure version.
///
/// Fails with [`crate::CatalogError::NotFound`] if the version is absent.
pub(crate) fn retrieve_version(txn: &dyn Transaction, id: VersionId) -> Result<StructureVersion> {
    let rows = required(
        txn.select(VERSION_TABLE, &[], &[Predicate::new("id", id.as_i64())]),
        "StructureVersion",
        id,
    )?;
    let structure_id = ItemId::from_raw(rows[0].long("structure_id")?);

    Ok(StructureVersion {
        id,
        structure_id,
        attributes: attributes(txn, id)?,
    })
}

/// Fetches the schema map declared by a structure version.
///
/// Fails with [`crate::CatalogError::NotFound`] if the structure version
/// itself does not exist; an existing version with zero attributes yields
/// an empty map.
pub(crate) fn schema(
    txn: &dyn Transaction,
    id: VersionId,
) -> Result<BTreeMap<String, ValueType>> {
    required(
        txn.select(
            VERSION_TABLE,
            &["id"],
            &[Predicate::new("id", id.as_i64())],
        ),
        "StructureVersion",
        id,
    )?;
    attributes(txn, id)
}

fn attributes(txn: &dyn Transaction, id: VersionId) -> Result<BTreeMap<String, ValueType>> {
    let rows = allow_empty(txn.select(
        ATTRIBUTE_TABLE,
        &[],
        &[Predicate::new("structure_version_id", id.as_i64())],
    ))?;

    let mut attributes = BTreeMap::new();
    for row in rows {
        attributes.insert(row.string("key")?, ValueType::parse(&row.string("type")?)?);
    }
    Ok(attributes)
}
