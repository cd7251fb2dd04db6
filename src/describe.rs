//! Table definitions derived from cleaned data.
//!
//! [`describe`] looks at the cells each column actually holds and picks the
//! narrowest storage type that fits all of them. The result renders as a
//! `CREATE TABLE` statement that both PostgreSQL and SQLite accept.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::{cell::Cell, table::Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    BigInt,
    Double,
    Text,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: SqlType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }
}

/// Keys declared on top of the inferred columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub table_name: String,
    pub columns: Vec<ColumnDef>,
}

/// Describes `table` under `table_name`, one entry per column in order.
pub fn describe(table: &Table, table_name: &str) -> SchemaDescription {
    let columns = table
        .columns()
        .iter()
        .map(|column| ColumnDef {
            name: column.name.clone(),
            sql_type: infer_sql_type(&column.cells),
        })
        .collect();
    SchemaDescription {
        table_name: table_name.to_string(),
        columns,
    }
}

/// Whole numbers → `BigInt`, any other numbers → `Double`, anything else
/// (text, a mix, or nothing at all) → `Text`. Missing cells are ignored.
pub fn infer_sql_type(cells: &[Cell]) -> SqlType {
    let mut seen_any = false;
    let mut all_integer = true;
    for cell in cells {
        match cell {
            Cell::Missing => continue,
            Cell::Text(_) => return SqlType::Text,
            Cell::Number(_) => {
                seen_any = true;
                if cell.as_integer().is_none() {
                    all_integer = false;
                }
            }
        }
    }
    match (seen_any, all_integer) {
        (false, _) => SqlType::Text,
        (true, true) => SqlType::BigInt,
        (true, false) => SqlType::Double,
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SchemaDescription {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_type(&self, name: &str) -> Option<SqlType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.sql_type)
    }

    /// Renders a single `CREATE TABLE` statement ending in `;`.
    pub fn to_create_table(&self, constraints: &Constraints) -> String {
        let mut lines = self
            .columns
            .iter()
            .map(|c| format!("    {} {}", quote_ident(&c.name), c.sql_type.as_sql()))
            .collect::<Vec<_>>();
        if let Some(pk) = &constraints.primary_key {
            lines.push(format!("    PRIMARY KEY ({})", quote_ident(pk)));
        }
        for fk in &constraints.foreign_keys {
            lines.push(format!(
                "    FOREIGN KEY ({}) REFERENCES {} ({})",
                quote_ident(&fk.column),
                quote_ident(&fk.referenced_table),
                quote_ident(&fk.referenced_column)
            ));
        }
        let mut sql = String::new();
        let _ = writeln!(sql, "CREATE TABLE {} (", quote_ident(&self.table_name));
        let _ = writeln!(sql, "{}", lines.join(",\n"));
        sql.push_str(");");
        sql
    }
}
