//! Error types and result aliases for the storage layer.
//!
//! These are the storage-level errors. The catalog engine translates them
//! into its own domain taxonomy before they reach a caller; in particular a
//! raw [`Error::EmptyResult`] never crosses the catalog boundary.

/// The result type used throughout the storage layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in storage-adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An equality select matched zero rows.
    ///
    /// This is a normal outcome for many lookups; callers translate it into
    /// a domain error or an empty collection as appropriate.
    #[error("no rows matched in table '{table}'")]
    EmptyResult {
        /// The table that was queried.
        table: String,
    },

    /// A storage operation failed.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A row value had an unexpected type or was missing a required column.
    #[error("invalid value: {message}")]
    InvalidValue {
        /// Description of what made the value invalid.
        message: String,
    },

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new storage error with the given message.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new storage error with a source cause.
    #[must_use]
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new empty-result error for the given table.
    #[must_use]
    pub fn empty_result(table: impl Into<String>) -> Self {
        Self::EmptyResult {
            table: table.into(),
        }
    }

    /// Creates a new invalid-value error.
    #[must_use]
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is an empty select result.
    #[must_use]
    pub const fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_is_detectable() {
        let err = Error::empty_result("node");
        assert!(err.is_empty_result());
        assert!(!Error::storage("boom").is_empty_result());
    }

    #[test]
    fn storage_error_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = Error::storage_with_source("write failed", io);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "storage error: write failed");
    }
}
