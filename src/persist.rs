//! Destination database.
//!
//! [`TableSink`] is what the batch driver writes through. Every table a file
//! produces goes through one [`TableSink::persist_all`] call, which either
//! commits all of them or none. [`SqliteSink`] is the bundled implementation:
//! tables are dropped and recreated, rows are written with multi-row
//! `INSERT`s, and each table gets a public read policy recorded in
//! `_access_policies`.

use std::path::Path;

use log::{debug, info};
use rusqlite::{
    Connection, Transaction, params, params_from_iter,
    types::{Value, ValueRef},
};

use crate::{
    cell::Cell,
    describe::{Constraints, SchemaDescription, SqlType, quote_ident},
    error::{ConfigurationError, PersistenceError},
    table::Table,
};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const ACCESS_POLICY_TABLE: &str = "_access_policies";
pub const PUBLIC_READ_POLICY: &str = "Public Read Access";

/// SQLite refuses statements with more bound parameters than this.
const MAX_BOUND_PARAMETERS: usize = 32_766;

/// One table to write, with everything needed to declare it.
#[derive(Debug, Clone, Copy)]
pub struct PersistRequest<'a> {
    pub name: &'a str,
    pub table: &'a Table,
    pub schema: &'a SchemaDescription,
    pub constraints: &'a Constraints,
}

pub trait TableSink {
    /// Writes `requests` in order inside a single transaction. Tables that
    /// are referenced must come before the tables referencing them.
    fn persist_all(&mut self, requests: &[PersistRequest<'_>]) -> Result<(), PersistenceError>;

    /// Reads a persisted table back.
    fn load_table(&self, name: &str) -> Result<Table, PersistenceError>;
}

pub struct SqliteSink {
    conn: Connection,
    batch_size: usize,
}

impl SqliteSink {
    /// Opens (or creates) the database at `path` and checks it answers.
    pub fn open(path: &Path, batch_size: usize) -> Result<Self, ConfigurationError> {
        let unreachable = |source| ConfigurationError::Unreachable {
            path: path.to_path_buf(),
            source,
        };
        let conn = Connection::open(path).map_err(unreachable)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(unreachable)?;
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE IF NOT EXISTS {ACCESS_POLICY_TABLE} (
                 table_name TEXT NOT NULL,
                 policy_name TEXT NOT NULL,
                 command TEXT NOT NULL,
                 using_expr TEXT NOT NULL,
                 PRIMARY KEY (table_name, policy_name)
             );"
        ))
        .map_err(unreachable)?;
        info!("Connected to destination database {path:?}");
        Ok(Self {
            conn,
            batch_size: batch_size.max(1),
        })
    }

    pub fn table_exists(&self, name: &str) -> Result<bool, PersistenceError> {
        table_exists(&self.conn, name)
    }

    /// Policies recorded for `table`, as `(policy_name, command, using_expr)`.
    pub fn access_policies(
        &self,
        table: &str,
    ) -> Result<Vec<(String, String, String)>, PersistenceError> {
        let db = database_error(table);
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT policy_name, command, using_expr FROM {ACCESS_POLICY_TABLE} \
                 WHERE table_name = ?1 ORDER BY policy_name"
            ))
            .map_err(db)?;
        let policies = stmt
            .query_map(params![table], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .map_err(database_error(table))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(database_error(table))?;
        Ok(policies)
    }
}

impl TableSink for SqliteSink {
    fn persist_all(&mut self, requests: &[PersistRequest<'_>]) -> Result<(), PersistenceError> {
        let batch_size = self.batch_size;
        let tx = self.conn.transaction().map_err(database_error(""))?;
        tx.execute_batch("PRAGMA defer_foreign_keys = ON")
            .map_err(database_error(""))?;
        for request in requests {
            write_table(&tx, request, batch_size)?;
        }
        let names = requests.iter().map(|r| r.name).collect::<Vec<_>>();
        tx.commit().map_err(database_error(&names.join(", ")))?;
        Ok(())
    }

    fn load_table(&self, name: &str) -> Result<Table, PersistenceError> {
        if !table_exists(&self.conn, name)? {
            return Err(PersistenceError::UnknownTable(name.to_string()));
        }
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(name)))
            .map_err(database_error(name))?;
        let headers = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let width = headers.len();
        let mut rows = stmt.query([]).map_err(database_error(name))?;
        let mut grid = Vec::new();
        while let Some(row) = rows.next().map_err(database_error(name))? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                let value = row.get_ref(idx).map_err(database_error(name))?;
                cells.push(cell_from_sql(value));
            }
            grid.push(cells);
        }
        Ok(Table::from_rows(headers, grid)?)
    }
}

fn write_table(
    tx: &Transaction<'_>,
    request: &PersistRequest<'_>,
    batch_size: usize,
) -> Result<(), PersistenceError> {
    let name = request.name;
    let db = || database_error(name);
    for fk in &request.constraints.foreign_keys {
        if fk.referenced_table != name && !table_exists(tx, &fk.referenced_table)? {
            return Err(PersistenceError::MissingReference {
                table: name.to_string(),
                referenced: fk.referenced_table.clone(),
            });
        }
    }

    tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)))
        .map_err(db())?;
    tx.execute_batch(&request.schema.to_create_table(request.constraints))
        .map_err(db())?;

    let columns = &request.schema.columns;
    if !columns.is_empty() && request.table.row_count() > 0 {
        let types = columns.iter().map(|c| c.sql_type).collect::<Vec<_>>();
        let rows_per_statement = batch_size
            .min(MAX_BOUND_PARAMETERS / columns.len())
            .max(1);
        let column_list = columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));

        let types = types.as_slice();
        let rows = request.table.rows().collect::<Vec<_>>();
        for (batch_idx, chunk) in rows.chunks(rows_per_statement).enumerate() {
            let sql = format!(
                "INSERT INTO {} ({column_list}) VALUES {}",
                quote_ident(name),
                vec![placeholders.as_str(); chunk.len()].join(", ")
            );
            let values = chunk.iter().flat_map(move |row| {
                row.iter()
                    .zip(types)
                    .map(|(cell, sql_type)| sql_value(cell, *sql_type))
            });
            let mut stmt = tx.prepare_cached(&sql).map_err(db())?;
            stmt.execute(params_from_iter(values)).map_err(db())?;
            debug!(
                "Inserted batch {} ({} row(s)) into '{name}'",
                batch_idx + 1,
                chunk.len()
            );
        }
    }

    tx.execute(
        &format!(
            "INSERT OR REPLACE INTO {ACCESS_POLICY_TABLE} \
             (table_name, policy_name, command, using_expr) VALUES (?1, ?2, 'SELECT', 'true')"
        ),
        params![name, PUBLIC_READ_POLICY],
    )
    .map_err(db())?;
    info!(
        "Persisted '{name}' ({} row(s), {} column(s))",
        request.table.row_count(),
        columns.len()
    );
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, PersistenceError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )
        .map_err(database_error(name))?;
    Ok(count > 0)
}

fn sql_value(cell: &Cell, sql_type: SqlType) -> Value {
    match (cell, sql_type) {
        (Cell::Missing, _) => Value::Null,
        (Cell::Number(_), SqlType::BigInt) => cell
            .as_integer()
            .map(Value::Integer)
            .unwrap_or(Value::Null),
        (Cell::Number(n), SqlType::Double) => Value::Real(*n),
        (other, _) => Value::Text(other.as_display()),
    }
}

fn cell_from_sql(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Missing,
        ValueRef::Integer(i) => Cell::from(i),
        ValueRef::Real(f) => Cell::Number(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Cell::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn database_error(table: &str) -> impl Fn(rusqlite::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Database {
        table: table.to_string(),
        source,
    }
}
