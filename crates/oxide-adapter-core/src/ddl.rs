//! DDL text for the Postgres family of dialects.
//!
//! Identifiers are always double-quoted and string literals single-quoted,
//! with embedded quote characters doubled.

use crate::table_name::TableName;
use crate::view::ViewDefinition;

/// Catalog view holding one row per relation.
pub const RELATION_CATALOG: &str = "information_schema.tables";

/// Quotes an identifier.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a string literal.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders a qualified relation name.
#[must_use]
pub fn relation(name: &TableName) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(ref catalog) = name.catalog {
        parts.push(quote_identifier(catalog));
    }
    if let Some(ref schema) = name.schema {
        parts.push(quote_identifier(schema));
    }
    parts.push(quote_identifier(&name.name));
    parts.join(".")
}

const fn view_keyword(materialized: bool) -> &'static str {
    if materialized {
        "MATERIALIZED VIEW"
    } else {
        "VIEW"
    }
}

/// Generates `CREATE [OR REPLACE] [MATERIALIZED] VIEW`.
#[must_use]
pub fn create_view(view: &ViewDefinition, replace: bool) -> String {
    let mut sql = String::from("CREATE ");
    if replace {
        sql.push_str("OR REPLACE ");
    }
    sql.push_str(view_keyword(view.materialized));
    sql.push(' ');
    sql.push_str(&relation(&view.name));

    if !view.columns.is_empty() {
        let cols: Vec<String> = view
            .columns
            .iter()
            .map(|(name, _)| quote_identifier(name))
            .collect();
        sql.push_str(" (");
        sql.push_str(&cols.join(", "));
        sql.push(')');
    }

    if !view.properties.is_empty() {
        let props: Vec<String> = view
            .properties
            .iter()
            .map(|(key, value)| format!("{key} = {value}"))
            .collect();
        sql.push_str(" WITH (");
        sql.push_str(&props.join(", "));
        sql.push(')');
    }

    sql.push_str(" AS ");
    sql.push_str(&view.query);
    sql
}

/// Generates `DROP [MATERIALIZED] VIEW [IF EXISTS] name [CASCADE]`.
#[must_use]
pub fn drop_view(name: &TableName, materialized: bool, if_exists: bool, cascade: bool) -> String {
    let mut sql = String::from("DROP ");
    sql.push_str(view_keyword(materialized));
    sql.push(' ');
    if if_exists {
        sql.push_str("IF EXISTS ");
    }
    sql.push_str(&relation(name));
    if cascade {
        sql.push_str(" CASCADE");
    }
    sql
}

/// Generates `COMMENT ON [MATERIALIZED] VIEW name IS '...'`.
#[must_use]
pub fn comment_on_view(name: &TableName, materialized: bool, text: &str) -> String {
    format!(
        "COMMENT ON {} {} IS {}",
        view_keyword(materialized),
        relation(name),
        quote_literal(text)
    )
}

/// Generates `COMMENT ON COLUMN name.column IS '...'`.
#[must_use]
pub fn comment_on_column(name: &TableName, column: &str, text: &str) -> String {
    format!(
        "COMMENT ON COLUMN {}.{} IS {}",
        relation(name),
        quote_identifier(column),
        quote_literal(text)
    )
}

/// Builds the relation type lookup and its parameters.
///
/// An unqualified name is looked up in the session's current schema.
#[must_use]
pub fn relation_type_query(name: &TableName) -> (String, Vec<&str>) {
    match name.schema.as_deref() {
        Some(schema) => (
            format!(
                "SELECT table_type FROM {RELATION_CATALOG} \
                 WHERE table_schema = $1 AND table_name = $2"
            ),
            vec![schema, name.name.as_str()],
        ),
        None => (
            format!(
                "SELECT table_type FROM {RELATION_CATALOG} \
                 WHERE table_schema = current_schema() AND table_name = $1"
            ),
            vec![name.name.as_str()],
        ),
    }
}
