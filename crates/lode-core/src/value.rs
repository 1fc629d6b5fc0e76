//! Typed values and tags.
//!
//! Every tag value carries one of a fixed set of primitive kinds. Schemas
//! (structure versions) constrain tag kinds by key, so the kind of a value
//! must be recoverable both from an in-memory [`Value`] and from its stored
//! string form.
//!
//! Floats are intentionally excluded: the original value set is string,
//! integer, boolean, and long.
//!
//! # Example
//!
//! ```rust
//! use lode_core::value::{Tag, Value, ValueType};
//!
//! let tag = Tag::new("row_count", Value::Long(12_000));
//! assert_eq!(tag.value.value_type(), ValueType::Long);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// The primitive value kinds usable in tags and schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    /// Arbitrary UTF-8 string.
    String,
    /// 32-bit signed integer.
    Integer,
    /// Boolean value.
    Boolean,
    /// 64-bit signed integer.
    Long,
}

impl ValueType {
    /// Parses a value type from its stored name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the name is not a known kind.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "long" => Ok(Self::Long),
            other => Err(Error::invalid_value(format!("unknown value type '{other}'"))),
        }
    }

    /// Returns the stored name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value of one of the primitive kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    /// Arbitrary UTF-8 string.
    String(String),
    /// 32-bit signed integer.
    Integer(i32),
    /// Boolean value.
    Boolean(bool),
    /// 64-bit signed integer.
    Long(i64),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Integer(_) => ValueType::Integer,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Long(_) => ValueType::Long,
        }
    }

    /// Encodes this value as its stored string form.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Long(n) => n.to_string(),
        }
    }

    /// Decodes a stored string form back into a value of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the text is not representable as
    /// the requested kind.
    pub fn decode(value_type: ValueType, text: &str) -> Result<Self> {
        match value_type {
            ValueType::String => Ok(Self::String(text.to_string())),
            ValueType::Integer => text.parse::<i32>().map(Self::Integer).map_err(|e| {
                Error::invalid_value(format!("'{text}' is not an integer: {e}"))
            }),
            ValueType::Boolean => text.parse::<bool>().map(Self::Boolean).map_err(|e| {
                Error::invalid_value(format!("'{text}' is not a boolean: {e}"))
            }),
            ValueType::Long => text.parse::<i64>().map(Self::Long).map_err(|e| {
                Error::invalid_value(format!("'{text}' is not a long: {e}"))
            }),
        }
    }

    /// Returns the long value, or an error if this is not a long.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the value is of another kind.
    pub fn as_long(&self) -> Result<i64> {
        match self {
            Self::Long(n) => Ok(*n),
            other => Err(Error::invalid_value(format!(
                "expected long, found {}",
                other.value_type()
            ))),
        }
    }

    /// Returns the string value, or an error if this is not a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the value is of another kind.
    pub fn as_string(&self) -> Result<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(Error::invalid_value(format!(
                "expected string, found {}",
                other.value_type()
            ))),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// A typed key-value attribute attached to an item or a version.
///
/// Tags are supplied keyed by name; the owning entity's ID is stamped at
/// persistence time by the layer doing the write, not carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag key, unique within one owner's tag mapping.
    pub key: String,
    /// Tag value; its kind is recoverable via [`Value::value_type`].
    pub value: Value,
}

impl Tag {
    /// Creates a new tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
