#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::OnceLock;

use oxide_adapter_core::prelude::*;
use regex::Regex;

pub const CATALOG: &str = "dev";
pub const SCHEMA: &str = "public";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub materialized: bool,
    pub columns: usize,
    /// Output column types, read from `CAST(.. AS type)` in the query.
    pub types: Vec<String>,
    pub definition: String,
}

/// In-memory catalog behind a [`Session`].
///
/// Understands the DDL the adapter emits, keeps a statement log and models
/// a driver that leaves an implicit transaction open after every read
/// outside an explicit one.
#[derive(Debug, Default)]
pub struct FakeSession {
    pub relations: HashMap<(String, String), Relation>,
    pub log: Vec<String>,
    pub explicit: bool,
    pub implicit: bool,
    pub fail_fetch: bool,
    pub fail_create: bool,
    pub snapshot: Option<HashMap<(String, String), Relation>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, name: &str, columns: usize) -> Self {
        self.insert(name, false, columns);
        self
    }

    pub fn with_materialized_view(mut self, name: &str, columns: usize) -> Self {
        self.insert(name, true, columns);
        self
    }

    fn insert(&mut self, name: &str, materialized: bool, columns: usize) {
        self.relations.insert(
            (SCHEMA.to_string(), name.to_string()),
            Relation {
                materialized,
                columns,
                types: vec!["INT".to_string(); columns],
                definition: String::new(),
            },
        );
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(&(SCHEMA.to_string(), name.to_string()))
    }

    /// Statements that changed the catalog, in order.
    pub fn ddl(&self) -> Vec<&str> {
        self.log
            .iter()
            .map(String::as_str)
            .filter(|sql| {
                sql.starts_with("CREATE") || sql.starts_with("DROP") || sql.starts_with("COMMENT")
            })
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.log.iter().filter(|sql| sql.starts_with(prefix)).count()
    }

    fn apply(&mut self, sql: &str) -> Result<()> {
        if let Some(rest) = sql.strip_prefix("CREATE ") {
            return self.create(rest, sql);
        }
        if let Some(rest) = sql.strip_prefix("DROP ") {
            return self.drop(rest);
        }
        if sql.starts_with("COMMENT ") {
            return Ok(());
        }
        Err(AdapterError::database(format!("unsupported statement: {sql}")))
    }

    fn create(&mut self, rest: &str, sql: &str) -> Result<()> {
        if self.fail_create {
            return Err(AdapterError::database("create failed"));
        }
        let (replace, rest) = strip(rest, "OR REPLACE ");
        let (materialized, rest) = strip(rest, "MATERIALIZED ");
        let rest = rest
            .strip_prefix("VIEW ")
            .ok_or_else(|| AdapterError::database(format!("unsupported statement: {sql}")))?;
        let (key, rest) = relation_key(rest);
        let columns = rest
            .strip_prefix(" (")
            .and_then(|list| list.split_once(')'))
            .map_or(0, |(list, _)| list.split(", ").count());

        let types = output_types(sql);

        if let Some(existing) = self.relations.get(&key) {
            if !replace {
                return Err(AdapterError::AlreadyExists(key.1));
            }
            if materialized || existing.materialized {
                return Err(AdapterError::database(
                    "CREATE OR REPLACE is not supported for materialized views",
                ));
            }
            if existing.columns != columns {
                return Err(AdapterError::database(
                    "cannot change the columns of a view with CREATE OR REPLACE",
                ));
            }
            if existing.types != types {
                return Err(AdapterError::database(
                    "cannot change the column types of a view with CREATE OR REPLACE",
                ));
            }
        }
        self.relations.insert(
            key,
            Relation {
                materialized,
                columns,
                types,
                definition: sql.to_string(),
            },
        );
        Ok(())
    }

    fn drop(&mut self, rest: &str) -> Result<()> {
        let (materialized, rest) = strip(rest, "MATERIALIZED ");
        let rest = rest
            .strip_prefix("VIEW ")
            .ok_or_else(|| AdapterError::database("unsupported DROP"))?;
        let (if_exists, rest) = strip(rest, "IF EXISTS ");
        let (key, _) = relation_key(rest);

        match self.relations.get(&key) {
            None if if_exists => Ok(()),
            None => Err(AdapterError::NotFound(key.1)),
            Some(existing) if existing.materialized != materialized => Err(
                AdapterError::database(format!("\"{}\" is not of the dropped kind", key.1)),
            ),
            Some(_) => {
                self.relations.remove(&key);
                Ok(())
            }
        }
    }

    fn table_type(&self, params: &[&str]) -> QueryFrame {
        let key = match params {
            [schema, name] => ((*schema).to_string(), (*name).to_string()),
            [name] => (SCHEMA.to_string(), (*name).to_string()),
            _ => return QueryFrame::default(),
        };
        let rows = self
            .relations
            .get(&key)
            .map(|rel| {
                let kind = if rel.materialized { "MATERIALIZED VIEW" } else { "VIEW" };
                vec![vec![Some(kind.to_string())]]
            })
            .unwrap_or_default();
        QueryFrame::new(vec!["table_type".into()], rows)
    }
}

impl Session for FakeSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.log.push(sql.to_string());
        self.apply(sql)
    }

    async fn fetch(&mut self, sql: &str, params: &[&str]) -> Result<QueryFrame> {
        self.log.push(sql.to_string());
        if !self.explicit {
            self.implicit = true;
        }
        if self.fail_fetch {
            return Err(AdapterError::database("connection reset"));
        }
        if sql.contains("current_catalog") {
            return Ok(QueryFrame::new(
                vec!["current_catalog".into()],
                vec![vec![Some(CATALOG.to_string())]],
            ));
        }
        if sql.contains("information_schema.tables") {
            return Ok(self.table_type(params));
        }
        Ok(QueryFrame::default())
    }

    fn is_transaction_active(&self) -> bool {
        self.explicit
    }

    async fn begin(&mut self) -> Result<()> {
        self.log.push("BEGIN".into());
        self.explicit = true;
        self.snapshot = Some(self.relations.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.log.push("COMMIT".into());
        self.explicit = false;
        self.implicit = false;
        self.snapshot = None;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.log.push("ROLLBACK".into());
        self.explicit = false;
        if let Some(snapshot) = self.snapshot.take() {
            self.relations = snapshot;
        }
        Ok(())
    }
}

fn output_types(sql: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"CAST\(\d+ AS (.+?)\) AS \w+").unwrap());
    re.captures_iter(sql).map(|caps| caps[1].to_string()).collect()
}

fn strip<'a>(text: &'a str, prefix: &str) -> (bool, &'a str) {
    text.strip_prefix(prefix).map_or((false, text), |rest| (true, rest))
}

/// Splits a quoted, dot-separated relation name off the front of `text`.
fn relation_key(text: &str) -> ((String, String), &str) {
    let end = text.find(' ').unwrap_or(text.len());
    let (name, rest) = text.split_at(end);
    let parts: Vec<String> = name.split('.').map(|p| p.trim_matches('"').to_string()).collect();
    let key = match parts.as_slice() {
        [.., schema, name] => (schema.clone(), name.clone()),
        [name] => (SCHEMA.to_string(), name.clone()),
        [] => (SCHEMA.to_string(), String::new()),
    };
    (key, rest)
}

pub fn adapter(session: FakeSession) -> RisingWaveAdapter<FakeSession> {
    RisingWaveAdapter::new(session)
}

pub fn session(adapter: &RisingWaveAdapter<FakeSession>) -> &FakeSession {
    adapter.base().scope().session()
}

/// Builds a view over `(column, type)` pairs, each selected as a literal
/// cast to its type.
pub fn view(name: &str, columns: &[(&str, &str)]) -> ViewDefinition {
    let typed: Vec<(&str, TypeDescriptor)> = columns
        .iter()
        .map(|(col, ty)| {
            let ty = TypeDescriptor::parse(ty, Dialect::RisingWave)
                .unwrap_or_else(|e| panic!("Failed to parse: {ty}\nError: {e:?}"));
            (*col, ty)
        })
        .collect();
    let select: Vec<String> = typed
        .iter()
        .enumerate()
        .map(|(i, (col, ty))| format!("CAST({i} AS {ty}) AS {col}"))
        .collect();
    let query = format!("SELECT {}", select.join(", "));
    typed.into_iter().fold(
        ViewDefinition::new(TableName::new(name).schema(SCHEMA), query),
        |view, (col, ty)| view.column(col, ty),
    )
}
