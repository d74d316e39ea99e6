//! Column type compatibility for schema diffs.
//!
//! When a column's type changes, the diff pipeline must decide whether a
//! plain `ALTER COLUMN ... TYPE` is safe or the table has to be rebuilt.
//! [`SchemaDiffer`] answers that from two per-dialect tables:
//!
//! - a [`DefaultParameterTable`] supplying the parameters a type has when
//!   they are not written out (`CHAR` is `CHAR(1)`), and
//! - a [`WidenGraph`] listing which types may be altered into an
//!   unparameterized destination type without a rebuild.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::types::{TypeDescriptor, TypeName};

/// Default parameters for types written without (all of) them.
///
/// Candidate `k` fills the trailing parameters of a type written with `k`
/// explicit parameters, so candidate 0 is the stand-in for the bare type.
/// Entries are ordered most conservative first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultParameterTable {
    entries: HashMap<TypeName, Vec<Vec<u32>>>,
}

impl DefaultParameterTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the candidate tuples for a type.
    #[must_use]
    pub fn with(mut self, name: TypeName, candidates: Vec<Vec<u32>>) -> Self {
        self.entries.insert(name, candidates);
        self
    }

    /// Returns the candidates for a type, in declared order.
    #[must_use]
    pub fn candidates(&self, name: &TypeName) -> &[Vec<u32>] {
        self.entries.get(name).map_or(&[][..], Vec::as_slice)
    }

    /// Returns the explicit parameters completed with the matching defaults.
    #[must_use]
    pub fn effective_params(&self, ty: &TypeDescriptor) -> Vec<u32> {
        let explicit = ty.params();
        let mut params = explicit.to_vec();
        if let Some(fill) = self.candidates(ty.name()).get(explicit.len()) {
            params.extend_from_slice(fill);
        }
        params
    }
}

/// Destination type → source types that alter into it in place.
///
/// Keys are type names only. Not symmetric; self-loops are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidenGraph {
    edges: HashMap<TypeName, HashSet<TypeName>>,
}

impl WidenGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows every type in `sources` to widen into `destination`.
    #[must_use]
    pub fn allow(
        mut self,
        destination: TypeName,
        sources: impl IntoIterator<Item = TypeName>,
    ) -> Self {
        self.edges.entry(destination).or_default().extend(sources);
        self
    }

    /// Returns whether `source` may widen into `destination`.
    #[must_use]
    pub fn allows(&self, source: &TypeName, destination: &TypeName) -> bool {
        self.edges
            .get(destination)
            .is_some_and(|sources| sources.contains(source))
    }
}

/// Outcome of a column type change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeChange {
    /// `ALTER COLUMN ... TYPE` is enough.
    InPlace,
    /// No compatible path, the table has to be rebuilt.
    Rebuild,
}

/// Per-dialect type compatibility resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiffer {
    defaults: DefaultParameterTable,
    widen: WidenGraph,
    pinned: HashSet<TypeName>,
}

impl SchemaDiffer {
    /// Creates a differ from its dialect tables.
    #[must_use]
    pub fn new(defaults: DefaultParameterTable, widen: WidenGraph) -> Self {
        Self {
            defaults,
            widen,
            pinned: HashSet::new(),
        }
    }

    /// Restricts a type so that, when parameterized, it only widens into
    /// its own unparameterized form.
    #[must_use]
    pub fn pin_parameterized(mut self, name: TypeName) -> Self {
        self.pinned.insert(name);
        self
    }

    /// Returns the default parameter table.
    #[must_use]
    pub const fn defaults(&self) -> &DefaultParameterTable {
        &self.defaults
    }

    /// Returns the widen graph.
    #[must_use]
    pub const fn widen_graph(&self) -> &WidenGraph {
        &self.widen
    }

    /// Returns whether a column of type `from` can be altered to `to`
    /// without rebuilding the table.
    #[must_use]
    pub fn can_alter_in_place(&self, from: &TypeDescriptor, to: &TypeDescriptor) -> bool {
        if from == to {
            return true;
        }

        // The tables describe scalar types; any other array change rebuilds.
        if from.is_array() || to.is_array() {
            return false;
        }

        if from.name() == to.name() {
            let current = self.defaults.effective_params(from);
            let target = self.defaults.effective_params(to);
            if current.len() == target.len()
                && current.iter().zip(&target).all(|(cur, new)| cur <= new)
            {
                return true;
            }
        }

        // The widen graph only describes unparameterized destinations.
        if to.is_parameterized() {
            return false;
        }

        if from.is_parameterized() && from.name() != to.name() && self.pinned.contains(from.name())
        {
            return false;
        }

        self.widen.allows(from.name(), to.name())
    }

    /// Classifies a column type change.
    #[must_use]
    pub fn type_change(&self, from: &TypeDescriptor, to: &TypeDescriptor) -> TypeChange {
        let change = if self.can_alter_in_place(from, to) {
            TypeChange::InPlace
        } else {
            TypeChange::Rebuild
        };
        debug!(from = %from, to = %to, ?change, "Resolved column type change");
        change
    }
}
