//! In-memory rectangular table.
//!
//! A [`Table`] is a list of named columns that all hold the same number of
//! cells. Column names are unique within a table; every mutating method
//! enforces both invariants and reports violations as [`TableError`].

use crate::{cell::Cell, error::TableError};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn is_all_missing(&self) -> bool {
        self.cells.iter().all(Cell::is_missing)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut table = Table::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Builds a table from row-major data, padding short rows with `Missing`
    /// and ignoring cells beyond the header width.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.cells.push(cells.next().unwrap_or_default());
            }
        }
        if columns.is_empty() {
            return Ok(Table::new());
        }
        Table::from_columns(columns)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn push_column(&mut self, column: Column) -> Result<(), TableError> {
        let at = self.columns.len();
        self.insert_column(at, column)
    }

    /// Inserts `column` at `index` (clamped to the current width).
    pub fn insert_column(&mut self, index: usize, column: Column) -> Result<(), TableError> {
        if self.column_index(&column.name).is_some() {
            return Err(TableError::DuplicateColumn(column.name));
        }
        if self.columns.is_empty() {
            self.row_count = column.cells.len();
        } else if column.cells.len() != self.row_count {
            return Err(TableError::LengthMismatch {
                name: column.name,
                expected: self.row_count,
                actual: column.cells.len(),
            });
        }
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Result<Column, TableError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        Ok(self.columns.remove(idx))
    }

    /// Moves an existing column to `index`; order only, contents untouched.
    pub fn move_column(&mut self, name: &str, index: usize) -> Result<(), TableError> {
        let column = self.remove_column(name)?;
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
        Ok(())
    }

    /// Drops every listed column that exists and returns the names removed.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let mut dropped = Vec::new();
        self.columns.retain(|column| {
            let remove = names.iter().any(|n| n.as_ref() == column.name);
            if remove {
                dropped.push(column.name.clone());
            }
            !remove
        });
        dropped
    }

    /// Drops columns holding no value at all and returns their names.
    pub fn drop_empty_columns(&mut self) -> Vec<String> {
        let empty = self
            .columns
            .iter()
            .filter(|c| c.is_all_missing())
            .map(|c| c.name.clone())
            .collect::<Vec<_>>();
        self.drop_columns(&empty)
    }

    /// Keeps rows for which `keep` returns true; returns how many were removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[&Cell]) -> bool,
    {
        let mask = (0..self.row_count)
            .map(|idx| keep(&self.row(idx)))
            .collect::<Vec<_>>();
        for column in &mut self.columns {
            let mut flags = mask.iter();
            column.cells.retain(|_| *flags.next().unwrap_or(&true));
        }
        let before = self.row_count;
        self.row_count = mask.iter().filter(|k| **k).count();
        before - self.row_count
    }

    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[index]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.row_count).map(|idx| self.row(idx))
    }
}
