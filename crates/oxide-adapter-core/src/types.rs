//! Type descriptors and the dialect-aware type builder.
//!
//! A [`TypeDescriptor`] is a canonical type name plus its ordered numeric
//! parameters, e.g. `VARCHAR(255)` or `DECIMAL(10, 2)`. Descriptors are
//! built from text with [`TypeDescriptor::parse`], which folds the aliases a
//! dialect accepts (`CHARACTER VARYING`, `INT4`, `NUMERIC`, ...) into one
//! canonical [`TypeName`].

use core::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{AdapterError, Result};

/// SQL dialects the type builder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL.
    Postgres,
    /// RisingWave (Postgres wire protocol, its own type quirks).
    RisingWave,
}

impl Dialect {
    /// Returns the dialect name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::RisingWave => "risingwave",
        }
    }
}

impl FromStr for Dialect {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "risingwave" => Ok(Self::RisingWave),
            other => Err(AdapterError::InvalidDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical, dialect-normalized type names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeName {
    // Integer types
    /// 2-byte integer.
    Smallint,
    /// 4-byte integer.
    Int,
    /// 8-byte integer.
    Bigint,

    // Floating point and exact numerics
    /// 4-byte float.
    Real,
    /// 8-byte float.
    Double,
    /// Arbitrary precision decimal (`NUMERIC` folds into this).
    Decimal,

    // Character types
    /// Fixed-length character string.
    Char,
    /// Blank-padded character string.
    Bpchar,
    /// Variable-length character string.
    Varchar,
    /// Unlimited-length text.
    Text,

    // Date/time types
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Timestamp without time zone.
    Timestamp,
    /// Timestamp with time zone.
    Timestamptz,
    /// Time interval.
    Interval,

    // Everything else
    /// Boolean.
    Boolean,
    /// Binary string.
    Bytea,
    /// Binary JSON.
    Jsonb,
    /// Any other type, upper-cased.
    Custom(String),
}

impl TypeName {
    /// Returns the canonical SQL spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Smallint => "SMALLINT",
            Self::Int => "INT",
            Self::Bigint => "BIGINT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE PRECISION",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::Bpchar => "BPCHAR",
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Timestamptz => "TIMESTAMPTZ",
            Self::Interval => "INTERVAL",
            Self::Boolean => "BOOLEAN",
            Self::Bytea => "BYTEA",
            Self::Jsonb => "JSONB",
            Self::Custom(name) => name,
        }
    }

    /// Folds an upper-cased, whitespace-collapsed name into its canonical form.
    fn normalize(name: &str, dialect: Dialect) -> Self {
        match name {
            "SMALLINT" | "INT2" => Self::Smallint,
            "INT" | "INTEGER" | "INT4" => Self::Int,
            "BIGINT" | "INT8" => Self::Bigint,
            "REAL" | "FLOAT4" => Self::Real,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT" | "FLOAT8" => Self::Double,
            "DECIMAL" | "NUMERIC" => Self::Decimal,
            "CHAR" | "CHARACTER" => Self::Char,
            "BPCHAR" => Self::Bpchar,
            "VARCHAR" | "CHARACTER VARYING" => Self::Varchar,
            "TEXT" => Self::Text,
            "DATE" => Self::Date,
            "TIME" | "TIME WITHOUT TIME ZONE" => Self::Time,
            "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" => Self::Timestamp,
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => Self::Timestamptz,
            "INTERVAL" => Self::Interval,
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "BYTEA" => Self::Bytea,
            "JSONB" => Self::Jsonb,
            // Postgres SERIAL is an integer column with a sequence default;
            // RisingWave has a distinct serial type.
            "SMALLSERIAL" | "SERIAL2" if dialect == Dialect::Postgres => Self::Smallint,
            "SERIAL" | "SERIAL4" if dialect == Dialect::Postgres => Self::Int,
            "BIGSERIAL" | "SERIAL8" if dialect == Dialect::Postgres => Self::Bigint,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type name with its ordered numeric parameters.
///
/// An empty parameter list means the type was written without parameters
/// (`VARCHAR`, not `VARCHAR(0)`). Array types keep the element type's name
/// and parameters and count their `[]` suffixes in `dimensions`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: TypeName,
    params: Vec<u32>,
    dimensions: usize,
}

fn type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Z_][A-Z0-9_ ]*?)\s*(?:\(([^)]*)\)\s*([A-Z ]*?))?\s*((?:\[\])*)$")
            .expect("type pattern is valid")
    })
}

impl TypeDescriptor {
    /// Creates an unparameterized descriptor.
    #[must_use]
    pub const fn new(name: TypeName) -> Self {
        Self {
            name,
            params: Vec::new(),
            dimensions: 0,
        }
    }

    /// Creates a descriptor with explicit parameters.
    #[must_use]
    pub fn with_params(name: TypeName, params: impl Into<Vec<u32>>) -> Self {
        Self {
            name,
            params: params.into(),
            dimensions: 0,
        }
    }

    /// Wraps the type in one more array dimension.
    #[must_use]
    pub fn array(mut self) -> Self {
        self.dimensions += 1;
        self
    }

    /// Builds a descriptor from its textual form in the given dialect.
    ///
    /// Accepts `NAME`, `NAME(p1, p2, ...)`, the split forms such as
    /// `TIMESTAMP(3) WITHOUT TIME ZONE`, and any of these followed by `[]`
    /// for arrays. Fixed array bounds (`INT[3]`) are rejected.
    pub fn parse(text: &str, dialect: Dialect) -> Result<Self> {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let upper = collapsed.to_ascii_uppercase();
        let invalid = || AdapterError::InvalidType(text.to_string());

        let caps = type_regex().captures(&upper).ok_or_else(invalid)?;
        let base = caps.get(1).map_or("", |m| m.as_str().trim());
        let suffix = caps.get(3).map_or("", |m| m.as_str().trim());
        if base.is_empty() {
            return Err(invalid());
        }

        let name = if suffix.is_empty() {
            base.to_string()
        } else {
            format!("{base} {suffix}")
        };

        // `BPCHAR()` is the same as `BPCHAR`.
        let params = match caps.get(2).filter(|list| !list.as_str().trim().is_empty()) {
            Some(list) => list
                .as_str()
                .split(',')
                .map(|p| p.trim().parse::<u32>().map_err(|_| invalid()))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let dimensions = caps.get(4).map_or(0, |m| m.as_str().len() / 2);

        Ok(Self {
            name: TypeName::normalize(&name, dialect),
            params,
            dimensions,
        })
    }

    /// Returns the canonical type name.
    #[must_use]
    pub const fn name(&self) -> &TypeName {
        &self.name
    }

    /// Returns the explicit parameters.
    #[must_use]
    pub fn params(&self) -> &[u32] {
        &self.params
    }

    /// Returns the number of array dimensions, 0 for scalars.
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Returns whether the type is an array.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.dimensions > 0
    }

    /// Returns whether the type was written with parameters.
    #[must_use]
    pub fn is_parameterized(&self) -> bool {
        !self.params.is_empty()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, "({})", params.join(", "))?;
        }
        for _ in 0..self.dimensions {
            f.write_str("[]")?;
        }
        Ok(())
    }
}
