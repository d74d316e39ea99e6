//! Static per-engine capability flags.
//!
//! Each engine variant builds one [`CapabilityDescriptor`] when the adapter
//! is constructed. It is never mutated afterwards and can be shared freely.

use serde::Serialize;

use crate::types::Dialect;

/// How an engine scopes relations to catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSupport {
    /// Catalogs cannot be named at all.
    Unsupported,
    /// Only the catalog the session is connected to may be named.
    SingleCatalogOnly,
    /// Any catalog may be named.
    FullSupport,
}

/// How table comments are registered.
///
/// Postgres-family DDL has no inline comment clause, so comments are either
/// separate `COMMENT ON` statements or not written at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentCreationTable {
    /// Comments are dropped.
    Unsupported,
    /// Through a separate `COMMENT ON` statement.
    CommentCommandOnly,
}

/// How view comments are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentCreationView {
    /// Comments are dropped.
    Unsupported,
    /// Through a separate `COMMENT ON` statement.
    CommentCommandOnly,
}

impl CommentCreationView {
    /// Returns whether comments are issued as `COMMENT ON` statements.
    #[must_use]
    pub const fn uses_commands(self) -> bool {
        matches!(self, Self::CommentCommandOnly)
    }
}

/// Immutable capability record of an engine adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityDescriptor {
    /// Dialect used for SQL and type parsing.
    pub dialect: Dialect,
    /// Whether `CREATE INDEX` is supported.
    pub supports_indexes: bool,
    /// Whether a native replace-table statement exists.
    pub supports_replace_table: bool,
    /// Whether views are bound to the relations they select from.
    pub has_view_binding: bool,
    /// Whether materialized views exist.
    pub supports_materialized_views: bool,
    /// Catalog scoping mode.
    pub catalog_support: CatalogSupport,
    /// Table comment registration.
    pub comment_creation_table: CommentCreationTable,
    /// View comment registration.
    pub comment_creation_view: CommentCreationView,
    /// Rows per insert batch.
    pub default_batch_size: usize,
}

impl CapabilityDescriptor {
    /// Capabilities of RisingWave.
    #[must_use]
    pub const fn risingwave() -> Self {
        Self {
            dialect: Dialect::RisingWave,
            supports_indexes: true,
            supports_replace_table: false,
            has_view_binding: true,
            supports_materialized_views: true,
            catalog_support: CatalogSupport::SingleCatalogOnly,
            comment_creation_table: CommentCreationTable::CommentCommandOnly,
            comment_creation_view: CommentCreationView::CommentCommandOnly,
            default_batch_size: 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risingwave_flags() {
        let caps = CapabilityDescriptor::risingwave();
        assert!(caps.supports_materialized_views);
        assert!(!caps.supports_replace_table);
        assert_eq!(caps.catalog_support, CatalogSupport::SingleCatalogOnly);
        assert!(caps.comment_creation_view.uses_commands());
        assert!(!CommentCreationView::Unsupported.uses_commands());
    }

    #[test]
    fn test_serializes_to_snake_case() {
        let json = serde_json::to_value(CapabilityDescriptor::risingwave()).unwrap();
        assert_eq!(json["catalog_support"], "single_catalog_only");
        assert_eq!(json["dialect"], "risingwave");
        assert_eq!(json["default_batch_size"], 400);
        assert_eq!(json["comment_creation_view"], "comment_command_only");
        assert_eq!(json["comment_creation_table"], "comment_command_only");
    }
}
