//! Engine capability adapter for Postgres-compatible streaming databases.
//!
//! `oxide-adapter-core` sits between a schema migration pipeline and a
//! database engine that speaks the Postgres wire protocol but departs from
//! Postgres semantics. It currently targets RisingWave and provides:
//!
//! - **Type compatibility** - decides whether a column type change can be
//!   applied with `ALTER COLUMN ... TYPE` or needs a table rebuild
//! - **View replacement** - replaces plain and materialized views by a
//!   drop and create inside one transaction, choosing the `DROP` form from
//!   the catalog
//! - **Catalog introspection** - classifies relations from
//!   `information_schema.tables`
//! - **Transaction scopes** - reentrant scopes over one session, committing
//!   the implicit transaction some drivers leave open after a read
//!
//! The crate is driver-agnostic: connections are reached through the
//! [`session::Session`] trait, implemented for sqlx by `oxide-adapter-pg`.
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_adapter_core::prelude::*;
//!
//! let mut adapter = RisingWaveAdapter::new(session);
//!
//! let view = ViewDefinition::new(
//!     TableName::new("daily_totals").schema("analytics"),
//!     "SELECT day, SUM(amount) AS total FROM sales GROUP BY day",
//! )
//! .materialized();
//! adapter.create_view(&view, true).await?;
//!
//! let from = TypeDescriptor::parse("VARCHAR(64)", Dialect::RisingWave)?;
//! let to = TypeDescriptor::parse("TEXT", Dialect::RisingWave)?;
//! assert!(adapter.can_alter_in_place(&from, &to));
//! ```

pub mod capabilities;
pub mod ddl;
pub mod engine;
pub mod error;
pub mod schema_diff;
pub mod session;
pub mod table_name;
pub mod transaction;
pub mod types;
pub mod view;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::capabilities::{
        CapabilityDescriptor, CatalogSupport, CommentCreationTable, CommentCreationView,
    };
    pub use crate::engine::{CurrentCatalog, EngineAdapter, RelationIntrospector, RisingWaveAdapter};
    pub use crate::error::{AdapterError, Result};
    pub use crate::schema_diff::{DefaultParameterTable, SchemaDiffer, TypeChange, WidenGraph};
    pub use crate::session::{QueryFrame, Session};
    pub use crate::table_name::TableName;
    pub use crate::transaction::TransactionScope;
    pub use crate::types::{Dialect, TypeDescriptor, TypeName};
    pub use crate::view::{DropViewOptions, RelationKind, ViewDefinition};
}
