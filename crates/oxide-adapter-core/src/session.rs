//! Database session abstraction.
//!
//! Driver crates (oxide-adapter-pg, etc.) implement [`Session`] over a
//! single connection. The core crate only defines the trait so it stays
//! driver-agnostic.

use crate::error::Result;

/// Result of a read query: column names plus rows of text values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl QueryFrame {
    /// Creates a frame from column names and rows.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the value of `column` in row `row`, if present and not NULL.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }
}

/// A single database connection.
///
/// `is_transaction_active` reports a transaction opened through
/// [`Session::begin`]; drivers may additionally hold an implicit one after a
/// read, which a [`Session::commit`] closes.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Executes a statement that returns no rows.
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Runs a read query with positional text parameters (`$1`, `$2`, ...).
    async fn fetch(&mut self, sql: &str, params: &[&str]) -> Result<QueryFrame>;

    /// Returns whether an explicit transaction is open.
    fn is_transaction_active(&self) -> bool;

    /// Opens an explicit transaction.
    async fn begin(&mut self) -> Result<()>;

    /// Commits the current transaction, explicit or implicit.
    async fn commit(&mut self) -> Result<()>;

    /// Rolls back the explicit transaction.
    async fn rollback(&mut self) -> Result<()>;
}
