//! Engine adapters.
//!
//! [`EngineAdapter`] carries the generic DDL every engine shares. Engine
//! variants such as [`RisingWaveAdapter`] wrap it and add their quirks by
//! implementing the capability traits in this module, delegating to the base
//! adapter for everything they do not override.

mod risingwave;

pub use risingwave::RisingWaveAdapter;

use tracing::{debug, info};

use crate::capabilities::{CapabilityDescriptor, CatalogSupport};
use crate::ddl;
use crate::error::{AdapterError, Result};
use crate::session::{QueryFrame, Session};
use crate::table_name::TableName;
use crate::transaction::TransactionScope;
use crate::view::{RelationKind, ViewDefinition};

/// Resolves the catalog a session is connected to.
#[allow(async_fn_in_trait)]
pub trait CurrentCatalog {
    /// Returns the current catalog, if the engine reports one.
    async fn current_catalog(&mut self) -> Result<Option<String>>;

    /// Applies the engine's catalog scoping rules to a relation name.
    ///
    /// With [`CatalogSupport::SingleCatalogOnly`] a catalog other than the
    /// current one is rejected and a matching one is stripped.
    async fn scope_to_catalog(
        &mut self,
        support: CatalogSupport,
        name: &TableName,
    ) -> Result<TableName> {
        let Some(requested) = name.catalog.as_deref() else {
            return Ok(name.clone());
        };
        match support {
            CatalogSupport::FullSupport => Ok(name.clone()),
            CatalogSupport::Unsupported => Ok(name.without_catalog()),
            CatalogSupport::SingleCatalogOnly => {
                let current = self.current_catalog().await?.unwrap_or_default();
                if current.eq_ignore_ascii_case(requested) {
                    Ok(name.without_catalog())
                } else {
                    Err(AdapterError::UnsupportedCatalogOperation {
                        requested: requested.to_string(),
                        current,
                    })
                }
            }
        }
    }
}

/// Classifies relations from live catalog state.
#[allow(async_fn_in_trait)]
pub trait RelationIntrospector {
    /// Returns the kind of the named relation.
    async fn relation_kind(&mut self, name: &TableName) -> Result<RelationKind>;
}

/// Generic DDL over one session.
#[derive(Debug)]
pub struct EngineAdapter<S> {
    scope: TransactionScope<S>,
    capabilities: CapabilityDescriptor,
}

impl<S: Session> EngineAdapter<S> {
    /// Creates an adapter over a transaction scope.
    pub const fn new(scope: TransactionScope<S>, capabilities: CapabilityDescriptor) -> Self {
        Self {
            scope,
            capabilities,
        }
    }

    /// Returns the capability descriptor.
    #[must_use]
    pub const fn capabilities(&self) -> &CapabilityDescriptor {
        &self.capabilities
    }

    /// Returns the transaction scope.
    #[must_use]
    pub const fn scope(&self) -> &TransactionScope<S> {
        &self.scope
    }

    /// Returns the transaction scope mutably.
    pub fn scope_mut(&mut self) -> &mut TransactionScope<S> {
        &mut self.scope
    }

    /// Unwraps the session.
    pub fn into_session(self) -> S {
        self.scope.into_inner()
    }

    /// Executes a statement.
    pub async fn execute(&mut self, sql: &str) -> Result<()> {
        self.scope.execute(sql).await
    }

    /// Runs a read query.
    pub async fn fetch(&mut self, sql: &str, params: &[&str]) -> Result<QueryFrame> {
        self.scope.fetch(sql, params).await
    }

    /// Enters a transaction scope.
    pub async fn begin(&mut self) -> Result<()> {
        self.scope.begin().await
    }

    /// Leaves a transaction scope with the outcome of its body.
    pub async fn finish<T>(&mut self, outcome: Result<T>) -> Result<T> {
        self.scope.finish(outcome).await
    }

    /// Creates a view, then registers its comments if the engine takes
    /// them as separate commands.
    pub async fn create_view(&mut self, view: &ViewDefinition, replace: bool) -> Result<()> {
        info!(
            view = %view.name,
            materialized = view.materialized,
            replace,
            "Creating view"
        );
        self.execute(&ddl::create_view(view, replace)).await?;

        if !self.capabilities.comment_creation_view.uses_commands() {
            if view.description.is_some() || !view.column_descriptions.is_empty() {
                debug!(view = %view.name, "Engine does not take comment commands, skipping");
            }
            return Ok(());
        }

        if let Some(ref text) = view.description {
            let sql = ddl::comment_on_view(&view.name, view.materialized, text);
            self.execute(&sql).await?;
        }
        for (column, text) in &view.column_descriptions {
            let sql = ddl::comment_on_column(&view.name, column, text);
            self.execute(&sql).await?;
        }
        Ok(())
    }

    /// Drops a view using exactly the form the caller asks for.
    pub async fn drop_view(
        &mut self,
        name: &TableName,
        materialized: bool,
        if_exists: bool,
        cascade: bool,
    ) -> Result<()> {
        info!(view = %name, materialized, cascade, "Dropping view");
        self.execute(&ddl::drop_view(name, materialized, if_exists, cascade))
            .await
    }
}
