//! Postgres wire-protocol session for `oxide-adapter-core`.
//!
//! [`PgSession`] implements [`Session`] over a single sqlx
//! [`PgConnection`], which is what RisingWave clients use. Transactions are
//! driven with plain `BEGIN`/`COMMIT`/`ROLLBACK` statements so that the
//! adapter's transaction scope stays the only owner of transaction state.
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_adapter_core::prelude::*;
//! use oxide_adapter_pg::PgSession;
//!
//! let session = PgSession::connect("postgres://root@localhost:4566/dev").await?;
//! let mut adapter = RisingWaveAdapter::new(session);
//! let kind = adapter.relation_kind(&"public.daily_totals".parse()?).await?;
//! ```

use oxide_adapter_core::error::{AdapterError, Result};
use oxide_adapter_core::session::{QueryFrame, Session};
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column, Connection, Row};
use tracing::debug;

/// SQLSTATE for `duplicate_table`.
const DUPLICATE_TABLE: &str = "42P07";
/// SQLSTATE for `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";

/// A session over one Postgres-protocol connection.
#[derive(Debug)]
pub struct PgSession {
    conn: PgConnection,
    explicit: bool,
}

impl PgSession {
    /// Wraps an open connection.
    #[must_use]
    pub const fn new(conn: PgConnection) -> Self {
        Self {
            conn,
            explicit: false,
        }
    }

    /// Opens a connection from a URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let conn = PgConnection::connect(url).await.map_err(map_error)?;
        debug!("Connected");
        Ok(Self::new(conn))
    }

    /// Closes the connection.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await.map_err(map_error)
    }

    /// Unwraps the connection.
    pub fn into_inner(self) -> PgConnection {
        self.conn
    }
}

/// Maps a driver error onto the adapter's error kinds.
fn map_error(err: sqlx::Error) -> AdapterError {
    if let sqlx::Error::Database(ref db) = err {
        match db.code().as_deref() {
            Some(DUPLICATE_TABLE) => return AdapterError::AlreadyExists(db.message().to_string()),
            Some(UNDEFINED_TABLE) => return AdapterError::NotFound(db.message().to_string()),
            _ => {}
        }
    }
    AdapterError::database(err)
}

fn frame(rows: &[PgRow]) -> Result<QueryFrame> {
    let columns: Vec<String> = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let values = rows
        .iter()
        .map(|row| {
            (0..row.len())
                // Catalog columns are domains over text types; decode the raw text.
                .map(|idx| row.try_get_unchecked::<Option<String>, _>(idx))
                .collect::<std::result::Result<Vec<_>, _>>()
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(map_error)?;

    Ok(QueryFrame::new(columns, values))
}

impl Session for PgSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        sqlx::raw_sql(sql)
            .execute(&mut self.conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    /// Values are decoded as text; callers cast non-text columns in SQL.
    async fn fetch(&mut self, sql: &str, params: &[&str]) -> Result<QueryFrame> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(*param);
        }
        let rows = query.fetch_all(&mut self.conn).await.map_err(map_error)?;
        frame(&rows)
    }

    fn is_transaction_active(&self) -> bool {
        self.explicit
    }

    async fn begin(&mut self) -> Result<()> {
        self.execute("BEGIN").await?;
        self.explicit = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        // A failed COMMIT still ends the transaction.
        self.explicit = false;
        self.execute("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.explicit = false;
        self.execute("ROLLBACK").await
    }
}
