//! Qualified relation names.

use core::fmt;
use std::str::FromStr;

use crate::error::{AdapterError, Result};

/// A `[catalog.][schema.]name` identifier.
///
/// Case and quoting are normalized by whoever builds the name; here it is
/// an opaque, comparable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    /// Catalog (database), if qualified.
    pub catalog: Option<String>,
    /// Schema, if qualified.
    pub schema: Option<String>,
    /// Relation name.
    pub name: String,
}

impl TableName {
    /// Creates an unqualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Returns a copy with the catalog removed.
    #[must_use]
    pub fn without_catalog(&self) -> Self {
        Self {
            catalog: None,
            ..self.clone()
        }
    }
}

impl FromStr for TableName {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(AdapterError::InvalidName(s.to_string()));
        }
        match parts.as_slice() {
            [name] => Ok(Self::new(*name)),
            [schema, name] => Ok(Self::new(*name).schema(*schema)),
            [catalog, schema, name] => Ok(Self::new(*name).schema(*schema).catalog(*catalog)),
            _ => Err(AdapterError::InvalidName(s.to_string())),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{catalog}.")?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        f.write_str(&self.name)
    }
}
