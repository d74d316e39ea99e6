//! View definitions and relation kinds.

use crate::table_name::TableName;
use crate::types::TypeDescriptor;

/// Kind of a relation as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// A plain view (or any other non-materialized relation).
    PlainView,
    /// A materialized view.
    MaterializedView,
    /// No catalog row matched; the relation is absent.
    Unknown,
}

impl RelationKind {
    /// Classifies a catalog `table_type` value.
    #[must_use]
    pub fn from_table_type(table_type: Option<&str>) -> Self {
        match table_type {
            None => Self::Unknown,
            Some("MATERIALIZED VIEW") => Self::MaterializedView,
            Some(_) => Self::PlainView,
        }
    }

    /// Returns whether the relation exists.
    #[must_use]
    pub const fn exists(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns whether the relation is materialized.
    #[must_use]
    pub const fn is_materialized(self) -> bool {
        matches!(self, Self::MaterializedView)
    }
}

/// A view to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDefinition {
    /// View name.
    pub name: TableName,
    /// Defining query.
    pub query: String,
    /// Explicit output columns, in order.
    pub columns: Vec<(String, TypeDescriptor)>,
    /// Whether the view is materialized.
    pub materialized: bool,
    /// View comment.
    pub description: Option<String>,
    /// Column comments, in order.
    pub column_descriptions: Vec<(String, String)>,
    /// Dialect-specific `WITH (...)` properties.
    pub properties: Vec<(String, String)>,
}

impl ViewDefinition {
    /// Creates a plain view definition.
    #[must_use]
    pub fn new(name: TableName, query: impl Into<String>) -> Self {
        Self {
            name,
            query: query.into(),
            columns: Vec::new(),
            materialized: false,
            description: None,
            column_descriptions: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Adds an explicit output column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.columns.push((name.into(), ty));
        self
    }

    /// Marks the view as materialized.
    #[must_use]
    pub fn materialized(mut self) -> Self {
        self.materialized = true;
        self
    }

    /// Sets the view comment.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Adds a column comment.
    #[must_use]
    pub fn column_description(mut self, column: impl Into<String>, text: impl Into<String>) -> Self {
        self.column_descriptions.push((column.into(), text.into()));
        self
    }

    /// Adds a `WITH (...)` property.
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }
}

/// Options for dropping a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropViewOptions {
    /// Succeed silently when the view is absent.
    pub ignore_if_not_exists: bool,
    /// Caller's belief that the view is materialized.
    pub materialized: bool,
    /// `CASCADE` override; `None` uses the adapter default.
    pub cascade: Option<bool>,
}

impl Default for DropViewOptions {
    fn default() -> Self {
        Self {
            ignore_if_not_exists: true,
            materialized: false,
            cascade: None,
        }
    }
}

impl DropViewOptions {
    /// Fails with `NotFound` when the view is absent.
    #[must_use]
    pub const fn must_exist(mut self) -> Self {
        self.ignore_if_not_exists = false;
        self
    }

    /// Sets the materialized hint.
    #[must_use]
    pub const fn materialized(mut self, materialized: bool) -> Self {
        self.materialized = materialized;
        self
    }

    /// Overrides `CASCADE`.
    #[must_use]
    pub const fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = Some(cascade);
        self
    }
}
