//! Storage adapter contract and in-memory reference backends.
//!
//! This module defines the row-store contract the catalog engine runs
//! against: row insertion, equality-predicate selection, and transaction
//! demarcation. Concrete drivers for external storage technologies
//! implement the same traits; they are out of scope here.
//!
//! ## Transaction Strength
//!
//! Backends differ in what `abort` can promise:
//!
//! - [`TransactionalBackend`] buffers writes and applies them atomically on
//!   commit; abort discards everything, so a failed operation leaves no
//!   trace.
//! - [`WriteThroughBackend`] models stores without multi-statement
//!   transactions: writes apply immediately, commit is a no-op, and abort
//!   is advisory only — rows written before a failure remain visible. This
//!   is a documented weaker guarantee, not a bug to be papered over.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::value::Value;

/// One stored row: a mapping from column name to typed value.
///
/// Absent optional columns are simply not present in the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    /// Creates a new empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column setter.
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    /// Returns the value of a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Returns the long value of a required column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the column is absent or not a long.
    pub fn long(&self, column: &str) -> Result<i64> {
        self.required(column)?.as_long()
    }

    /// Returns the string value of a required column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the column is absent or not a string.
    pub fn string(&self, column: &str) -> Result<String> {
        Ok(self.required(column)?.as_string()?.to_string())
    }

    /// Returns the long value of an optional column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the column is present but not a long.
    pub fn opt_long(&self, column: &str) -> Result<Option<i64>> {
        self.get(column).map(Value::as_long).transpose()
    }

    /// Returns the string value of an optional column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the column is present but not a string.
    pub fn opt_string(&self, column: &str) -> Result<Option<String>> {
        self.get(column)
            .map(|v| v.as_string().map(ToString::to_string))
            .transpose()
    }

    fn required(&self, column: &str) -> Result<&Value> {
        self.get(column)
            .ok_or_else(|| Error::invalid_value(format!("missing column '{column}'")))
    }

    fn project(&self, columns: &[&str]) -> Self {
        if columns.is_empty() {
            return self.clone();
        }
        Self(
            self.0
                .iter()
                .filter(|(k, _)| columns.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    fn matches(&self, predicates: &[Predicate]) -> bool {
        predicates
            .iter()
            .all(|p| self.get(&p.column) == Some(&p.value))
    }
}

/// An equality predicate: `column = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Column name to compare.
    pub column: String,
    /// Value the column must equal.
    pub value: Value,
}

impl Predicate {
    /// Creates a new equality predicate.
    #[must_use]
    pub fn new(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            value: value.into(),
        }
    }
}

/// A storage backend that can open transaction scopes.
///
/// The backend instance is shared across concurrent callers; each logical
/// operation opens its own [`Transaction`].
pub trait Database: Send + Sync + 'static {
    /// Begins a new transaction scope.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a scope cannot be established.
    fn begin(&self) -> Result<Box<dyn Transaction>>;
}

/// One transaction scope over a row store.
///
/// A scope ends with exactly one `commit` or `abort`; further operations
/// after that are an internal error. Dropping a scope without committing
/// behaves like `abort` (with this backend's abort strength).
pub trait Transaction: Send {
    /// Appends one row to a table.
    ///
    /// # Errors
    ///
    /// Returns a backend error on constraint violation or I/O failure.
    fn insert(&mut self, table: &str, row: Row) -> Result<()>;

    /// Returns rows matching an AND of equality predicates.
    ///
    /// `columns` projects the result; an empty slice selects all columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyResult`] when zero rows match.
    fn select(&self, table: &str, columns: &[&str], predicates: &[Predicate]) -> Result<Vec<Row>>;

    /// Commits the transaction scope.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the writes cannot be applied.
    fn commit(&mut self) -> Result<()>;

    /// Aborts the transaction scope, best-effort undoing prior writes
    /// where the backend supports it.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the scope cannot be ended.
    fn abort(&mut self) -> Result<()>;
}

type Tables = HashMap<String, Vec<Row>>;

fn read_lock(tables: &RwLock<Tables>) -> Result<std::sync::RwLockReadGuard<'_, Tables>> {
    tables.read().map_err(|_| Error::internal("lock poisoned"))
}

fn write_lock(tables: &RwLock<Tables>) -> Result<std::sync::RwLockWriteGuard<'_, Tables>> {
    tables.write().map_err(|_| Error::internal("lock poisoned"))
}

fn select_from(
    tables: &Tables,
    table: &str,
    columns: &[&str],
    predicates: &[Predicate],
) -> Vec<Row> {
    tables
        .get(table)
        .map(|rows| {
            rows.iter()
                .filter(|row| row.matches(predicates))
                .map(|row| row.project(columns))
                .collect()
        })
        .unwrap_or_default()
}

/// In-memory backend with true multi-statement transactions.
///
/// Writes are buffered inside the transaction and applied atomically under
/// one lock on commit; reads within the scope observe committed state plus
/// the scope's own pending writes.
#[derive(Debug, Default)]
pub struct TransactionalBackend {
    tables: Arc<RwLock<Tables>>,
}

impl TransactionalBackend {
    /// Creates a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Database for TransactionalBackend {
    fn begin(&self) -> Result<Box<dyn Transaction>> {
        Ok(Box::new(BufferedTransaction {
            tables: Arc::clone(&self.tables),
            pending: Vec::new(),
            completed: false,
        }))
    }
}

struct BufferedTransaction {
    tables: Arc<RwLock<Tables>>,
    pending: Vec<(String, Row)>,
    completed: bool,
}

impl BufferedTransaction {
    fn check_open(&self) -> Result<()> {
        if self.completed {
            return Err(Error::internal("transaction scope already ended"));
        }
        Ok(())
    }
}

impl Transaction for BufferedTransaction {
    fn insert(&mut self, table: &str, row: Row) -> Result<()> {
        self.check_open()?;
        self.pending.push((table.to_string(), row));
        Ok(())
    }

    fn select(&self, table: &str, columns: &[&str], predicates: &[Predicate]) -> Result<Vec<Row>> {
        self.check_open()?;
        let tables = read_lock(&self.tables)?;
        let mut rows = select_from(&tables, table, columns, predicates);

        // Read-own-writes: pending inserts are visible inside the scope.
        rows.extend(
            self.pending
                .iter()
                .filter(|(t, row)| t == table && row.matches(predicates))
                .map(|(_, row)| row.project(columns)),
        );

        if rows.is_empty() {
            return Err(Error::empty_result(table));
        }
        Ok(rows)
    }

    fn commit(&mut self) -> Result<()> {
        self.check_open()?;
        self.completed = true;

        let mut tables = write_lock(&self.tables)?;
        for (table, row) in self.pending.drain(..) {
            tables.entry(table).or_default().push(row);
        }
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        self.check_open()?;
        self.completed = true;
        self.pending.clear();
        Ok(())
    }
}

/// In-memory backend modeling stores without multi-statement transactions.
///
/// Writes apply immediately; commit is a no-op and abort is advisory only.
/// A failed multi-step operation may leave some of its rows behind; callers
/// of this backend must tolerate partial application.
#[derive(Debug, Default)]
pub struct WriteThroughBackend {
    tables: Arc<RwLock<Tables>>,
}

impl WriteThroughBackend {
    /// Creates a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Database for WriteThroughBackend {
    fn begin(&self) -> Result<Box<dyn Transaction>> {
        Ok(Box::new(WriteThroughTransaction {
            tables: Arc::clone(&self.tables),
            writes: 0,
            completed: false,
        }))
    }
}

struct WriteThroughTransaction {
    tables: Arc<RwLock<Tables>>,
    writes: usize,
    completed: bool,
}

impl WriteThroughTransaction {
    fn check_open(&self) -> Result<()> {
        if self.completed {
            return Err(Error::internal("transaction scope already ended"));
        }
        Ok(())
    }
}

impl Transaction for WriteThroughTransaction {
    fn insert(&mut self, table: &str, row: Row) -> Result<()> {
        self.check_open()?;
        write_lock(&self.tables)?
            .entry(table.to_string())
            .or_default()
            .push(row);
        self.writes += 1;
        Ok(())
    }

    fn select(&self, table: &str, columns: &[&str], predicates: &[Predicate]) -> Result<Vec<Row>> {
        self.check_open()?;
        let tables = read_lock(&self.tables)?;
        let rows = select_from(&tables, table, columns, predicates);
        if rows.is_empty() {
            return Err(Error::empty_result(table));
        }
        Ok(rows)
    }

    fn commit(&mut self) -> Result<()> {
        self.check_open()?;
        self.completed = true;
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        self.check_open()?;
        self.completed = true;
        if self.writes > 0 {
            tracing::warn!(
                applied_writes = self.writes,
                "abort on write-through backend is advisory; applied writes remain"
            );
        }
        Ok(())
    }
}
