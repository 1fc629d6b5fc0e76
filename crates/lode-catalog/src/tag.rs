//! Tag persistence and schema validation.
//!
//! Tags are stored one row per key with the value in encoded string form
//! plus its type name, so the same codec serves item tags and rich-version
//! tags. Validation against a structure schema is a partial, additive
//! constraint: only keys the schema mentions are checked.

use std::collections::BTreeMap;

use lode_core::{Predicate, Row, Tag, Transaction, Value, ValueType};

use crate::error::{allow_empty, CatalogError, Result};

/// Tag rows describing items.
pub(crate) const ITEM_TAG_TABLE: &str = "item_tag";

/// Tag rows describing rich versions.
pub(crate) const RICH_VERSION_TAG_TABLE: &str = "rich_version_tag";

/// Persists a tag mapping, stamping each row with the owning entity's id.
pub(crate) fn insert_tags(
    txn: &mut dyn Transaction,
    table: &str,
    owner_column: &str,
    owner_id: i64,
    tags: &BTreeMap<String, Tag>,
) -> Result<()> {
    for tag in tags.values() {
        txn.insert(
            table,
            Row::new()
                .with(owner_column, owner_id)
                .with("key", tag.key.as_str())
                .with("value", tag.value.encode())
                .with("type", tag.value.value_type().as_str()),
        )?;
    }
    Ok(())
}

/// Loads the tag mapping owned by an entity; empty if it has no tags.
pub(crate) fn fetch_tags(
    txn: &dyn Transaction,
    table: &str,
    owner_column: &str,
    owner_id: i64,
) -> Result<BTreeMap<String, Tag>> {
    let rows = allow_empty(txn.select(table, &[], &[Predicate::new(owner_column, owner_id)]))?;

    let mut tags = BTreeMap::new();
    for row in rows {
        let key = row.string("key")?;
        let value_type = ValueType::parse(&row.string("type")?)?;
        let value = Value::decode(value_type, &row.string("value")?)?;
        tags.insert(key.clone(), Tag { key, value });
    }
    Ok(tags)
}

/// Validates a tag mapping against a schema.
///
/// For every key present in both, the tag value's type must equal the
/// schema's declared type; any mismatch fails with
/// [`CatalogError::TypeMismatch`] naming the offending key. Tags the
/// schema does not mention pass through unchanged.
pub(crate) fn validate_tags(
    tags: &BTreeMap<String, Tag>,
    schema: &BTreeMap<String, ValueType>,
) -> Result<()> {
    for (key, tag) in tags {
        if let Some(expected) = schema.get(key) {
            let actual = tag.value.value_type();
            if actual != *expected {
                return Err(CatalogError::TypeMismatch {
                    key: key.clone(),
                    expected: *expected,
                    actual,
                });
            }
        }
    }
    Ok(())
}
