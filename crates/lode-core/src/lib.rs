//! # lode-core
//!
//! Core abstractions for the Lode versioned metadata catalog.
//!
//! This crate provides the foundational types and traits used by the catalog
//! engine:
//!
//! - **Identifiers**: Strongly-typed item and version IDs drawn from two
//!   independent monotonic counters
//! - **Typed Values**: The primitive value kinds used by tags and schemas
//! - **Storage Adapter**: The transaction-scoped row-store contract every
//!   backend implements, plus two in-memory reference backends with
//!   differing transaction guarantees
//! - **Error Types**: Storage-level error definitions and result types
//!
//! ## Crate Boundary
//!
//! `lode-core` is the only crate allowed to define shared primitives. The
//! catalog engine in `lode-catalog` builds on these contracts and never
//! reaches around them to a concrete backend.
//!
//! ## Example
//!
//! ```rust
//! use lode_core::prelude::*;
//!
//! let ids = IdGenerator::new();
//! let item = ids.next_item_id();
//! let version = ids.next_version_id();
//!
//! // Item and version IDs are different types - this won't compile:
//! // let wrong: ItemId = version;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;
pub mod observability;
pub mod store;
pub mod value;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use lode_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::id::{IdGenerator, ItemId, VersionId};
    pub use crate::store::{
        Database, Predicate, Row, Transaction, TransactionalBackend, WriteThroughBackend,
    };
    pub use crate::value::{Tag, Value, ValueType};
}

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use id::{IdGenerator, ItemId, VersionId};
pub use observability::{init_logging, LogFormat};
pub use store::{Database, Predicate, Row, Transaction, TransactionalBackend, WriteThroughBackend};
pub use value::{Tag, Value, ValueType};
