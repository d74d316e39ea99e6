//! Error types for engine adapters.

/// Boxed driver error carried by [`AdapterError::Database`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by adapter operations.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The relation already exists (create without replace).
    #[error("relation already exists: {0}")]
    AlreadyExists(String),

    /// The relation does not exist (drop that must find its target).
    #[error("relation not found: {0}")]
    NotFound(String),

    /// The catalog metadata query failed. DDL never proceeds after this.
    #[error("failed to introspect relation '{relation}': {source}")]
    Introspection {
        /// Relation being looked up.
        relation: String,
        /// Underlying failure.
        #[source]
        source: Box<AdapterError>,
    },

    /// The engine only supports the current catalog.
    #[error("catalog '{requested}' is not supported, the connection is bound to '{current}'")]
    UnsupportedCatalogOperation {
        /// Catalog named by the caller.
        requested: String,
        /// Catalog the session is connected to.
        current: String,
    },

    /// Transaction scope was used out of order.
    #[error("transaction scope error: {0}")]
    TransactionState(String),

    /// A type string could not be turned into a descriptor.
    #[error("invalid type '{0}'")]
    InvalidType(String),

    /// A relation name could not be parsed.
    #[error("invalid relation name '{0}'")]
    InvalidName(String),

    /// Unknown dialect name.
    #[error("unknown dialect '{0}'")]
    InvalidDialect(String),

    /// Error reported by the database driver.
    #[error("database error: {0}")]
    Database(#[source] BoxError),
}

impl AdapterError {
    /// Wraps a driver error.
    pub fn database(err: impl Into<BoxError>) -> Self {
        Self::Database(err.into())
    }
}

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
