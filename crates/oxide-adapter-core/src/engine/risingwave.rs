//! RisingWave engine adapter.
//!
//! RisingWave follows Postgres closely but is stricter about view
//! replacement: `CREATE OR REPLACE` requires the new query to produce the
//! same columns with the same types, and a materialized view cannot be
//! replaced natively at all. Views are therefore replaced by dropping the
//! old relation and creating the new one inside a single transaction scope.
//! Which `DROP` form to use is decided from the catalog, not from the
//! caller, because the wrong form fails.

use std::borrow::Cow;

use tracing::debug;

use super::{CurrentCatalog, EngineAdapter, RelationIntrospector};
use crate::capabilities::CapabilityDescriptor;
use crate::ddl;
use crate::error::{AdapterError, Result};
use crate::schema_diff::{DefaultParameterTable, SchemaDiffer, WidenGraph};
use crate::session::{QueryFrame, Session};
use crate::table_name::TableName;
use crate::transaction::TransactionScope;
use crate::types::{TypeDescriptor, TypeName};
use crate::view::{DropViewOptions, RelationKind, ViewDefinition};

/// `DECIMAL` without precision holds up to 131072 digits before the point
/// and 16383 after it.
const DECIMAL_MAX_SCALE: u32 = 16383;
const DECIMAL_MAX_PRECISION: u32 = 131_072 + DECIMAL_MAX_SCALE;

/// RisingWave adapter.
#[derive(Debug)]
pub struct RisingWaveAdapter<S> {
    base: EngineAdapter<S>,
    differ: SchemaDiffer,
}

impl<S: Session> RisingWaveAdapter<S> {
    /// Creates an adapter over a session.
    pub fn new(session: S) -> Self {
        let scope = TransactionScope::new(session).commit_after_read(true);
        Self {
            base: EngineAdapter::new(scope, CapabilityDescriptor::risingwave()),
            differ: Self::schema_differ(),
        }
    }

    /// Builds the RisingWave type compatibility tables.
    #[must_use]
    pub fn schema_differ() -> SchemaDiffer {
        let defaults = DefaultParameterTable::new()
            .with(
                TypeName::Decimal,
                vec![vec![DECIMAL_MAX_PRECISION, DECIMAL_MAX_SCALE], vec![0]],
            )
            .with(TypeName::Char, vec![vec![1]])
            .with(TypeName::Time, vec![vec![6]])
            .with(TypeName::Timestamp, vec![vec![6]]);

        let widen = WidenGraph::new()
            // Character types all alter to unlimited `TEXT`.
            .allow(
                TypeName::Text,
                [TypeName::Varchar, TypeName::Char, TypeName::Bpchar],
            )
            .allow(
                TypeName::Varchar,
                [
                    TypeName::Varchar,
                    TypeName::Char,
                    TypeName::Bpchar,
                    TypeName::Text,
                ],
            )
            .allow(TypeName::Bpchar, [TypeName::Bpchar]);

        SchemaDiffer::new(defaults, widen).pin_parameterized(TypeName::Bpchar)
    }

    /// Returns the capability descriptor.
    #[must_use]
    pub const fn capabilities(&self) -> &CapabilityDescriptor {
        self.base.capabilities()
    }

    /// Returns the schema differ.
    #[must_use]
    pub const fn differ(&self) -> &SchemaDiffer {
        &self.differ
    }

    /// Returns the base adapter.
    #[must_use]
    pub const fn base(&self) -> &EngineAdapter<S> {
        &self.base
    }

    /// Returns the base adapter mutably.
    pub fn base_mut(&mut self) -> &mut EngineAdapter<S> {
        &mut self.base
    }

    /// Unwraps the session.
    pub fn into_session(self) -> S {
        self.base.into_session()
    }

    /// Returns whether a column can change from `from` to `to` in place.
    #[must_use]
    pub fn can_alter_in_place(&self, from: &TypeDescriptor, to: &TypeDescriptor) -> bool {
        self.differ.can_alter_in_place(from, to)
    }

    /// Runs a read query. Outside a transaction scope the implicit
    /// transaction the driver leaves behind is committed.
    pub async fn fetch(&mut self, sql: &str, params: &[&str]) -> Result<QueryFrame> {
        self.base.fetch(sql, params).await
    }

    /// Creates a view.
    ///
    /// A materialized view is always replaced, whatever `replace` says.
    /// Replacement drops the existing relation and creates the new one in
    /// one transaction scope, so the new definition may change its columns
    /// freely.
    pub async fn create_view(&mut self, view: &ViewDefinition, replace: bool) -> Result<()> {
        let view = self.scope_view(view).await?;

        // TODO: confirm against RisingWave whether forcing replace for
        // materialized views is still required once it supports
        // `CREATE OR REPLACE MATERIALIZED VIEW` with column changes.
        let replace = replace || view.materialized;
        if !replace {
            return self.base.create_view(&view, false).await;
        }

        self.base.begin().await?;
        let outcome = self.replace_view(&view).await;
        self.base.finish(outcome).await
    }

    async fn replace_view(&mut self, view: &ViewDefinition) -> Result<()> {
        let opts = DropViewOptions::default().materialized(view.materialized);
        self.drop_view(&view.name, opts).await?;
        self.base.create_view(view, false).await
    }

    /// Drops a view.
    ///
    /// `opts.materialized` is only a hint: the `DROP` form follows the
    /// catalog. `CASCADE` is on unless `opts.cascade` turns it off.
    pub async fn drop_view(&mut self, name: &TableName, opts: DropViewOptions) -> Result<()> {
        let support = self.capabilities().catalog_support;
        let name = self.scope_to_catalog(support, name).await?;

        let kind = self.relation_kind(&name).await?;
        if !kind.exists() {
            if opts.ignore_if_not_exists {
                debug!(view = %name, "View does not exist, nothing to drop");
                return Ok(());
            }
            return Err(AdapterError::NotFound(name.to_string()));
        }

        let materialized = kind.is_materialized();
        if materialized != opts.materialized {
            debug!(
                view = %name,
                hint = opts.materialized,
                materialized,
                "Catalog overrides materialized hint"
            );
        }

        let cascade = opts.cascade.unwrap_or(true);
        self.base
            .drop_view(&name, materialized, opts.ignore_if_not_exists, cascade)
            .await
    }

    async fn scope_view<'v>(
        &mut self,
        view: &'v ViewDefinition,
    ) -> Result<Cow<'v, ViewDefinition>> {
        if view.name.catalog.is_none() {
            return Ok(Cow::Borrowed(view));
        }
        let support = self.capabilities().catalog_support;
        let name = self.scope_to_catalog(support, &view.name).await?;
        Ok(Cow::Owned(ViewDefinition {
            name,
            ..view.clone()
        }))
    }
}

impl<S: Session> CurrentCatalog for RisingWaveAdapter<S> {
    async fn current_catalog(&mut self) -> Result<Option<String>> {
        let frame = self
            .fetch("SELECT current_catalog AS current_catalog", &[])
            .await?;
        Ok(frame.value(0, "current_catalog").map(str::to_string))
    }
}

impl<S: Session> RelationIntrospector for RisingWaveAdapter<S> {
    async fn relation_kind(&mut self, name: &TableName) -> Result<RelationKind> {
        let (sql, params) = ddl::relation_type_query(name);
        let frame = self
            .fetch(&sql, &params)
            .await
            .map_err(|err| AdapterError::Introspection {
                relation: name.to_string(),
                source: Box::new(err),
            })?;

        let kind = if frame.is_empty() {
            RelationKind::Unknown
        } else {
            let table_type = frame.value(0, "table_type").unwrap_or_default();
            RelationKind::from_table_type(Some(table_type))
        };
        debug!(relation = %name, ?kind, "Introspected relation");
        Ok(kind)
    }
}
