//! Turns raw grids into cleaned tables.
//!
//! Loading takes a grid that was read without any header assumption plus
//! the header row(s) to use. Rows above the header are discarded, labels are
//! sanitized in a single pass, and rows or columns without a single value
//! are dropped.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    cell::Cell,
    error::LoadError,
    sanitize::sanitize_all,
    table::{Column, Table},
};

/// Which row(s) of a grid hold the column labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderSelection {
    Row(usize),
    /// Stacked label rows; each column's label is the space-joined parts.
    Rows(Vec<usize>),
}

impl HeaderSelection {
    fn rows(&self) -> Vec<usize> {
        match self {
            HeaderSelection::Row(row) => vec![*row],
            HeaderSelection::Rows(rows) => rows.clone(),
        }
    }

    /// First grid row holding data.
    pub fn data_start(&self) -> usize {
        self.rows().into_iter().max().map_or(0, |last| last + 1)
    }
}

impl From<usize> for HeaderSelection {
    fn from(row: usize) -> Self {
        HeaderSelection::Row(row)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub rows_dropped: usize,
    pub columns_dropped: Vec<String>,
}

/// Loads a grid using `header` as the label row(s).
pub fn load(grid: Vec<Vec<Cell>>, header: &HeaderSelection) -> Result<LoadedTable, LoadError> {
    let header_rows = header.rows();
    if let Some(&row) = header_rows.iter().find(|&&row| row >= grid.len()) {
        return Err(LoadError::HeaderOutOfRange {
            row,
            rows: grid.len(),
        });
    }
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let labels = (0..width)
        .map(|col| {
            header_rows
                .iter()
                .filter_map(|&row| grid[row].get(col))
                .map(Cell::as_display)
                .filter(|label| !label.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>();
    let names = sanitize_all(&labels);
    let rows = grid.into_iter().skip(header.data_start()).collect::<Vec<_>>();
    let mut table = Table::from_rows(names, rows)?;

    let rows_dropped = drop_blank_rows(&mut table);
    let columns_dropped = table.drop_empty_columns();
    if !columns_dropped.is_empty() {
        debug!("Dropped empty column(s): {}", columns_dropped.join(", "));
    }
    Ok(LoadedTable {
        table,
        rows_dropped,
        columns_dropped,
    })
}

/// Loads several independently extracted regions (e.g. one per PDF page) as
/// one table. Each region's first row is its header.
pub fn load_regions(regions: Vec<Vec<Vec<Cell>>>) -> Result<LoadedTable, LoadError> {
    let regions = regions
        .into_iter()
        .filter(|region| !region.is_empty())
        .collect::<Vec<_>>();
    if regions.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut union: Vec<String> = Vec::new();
    let mut parts = Vec::with_capacity(regions.len());
    for region in regions {
        // Data wider than the header row gets placeholder labels.
        let width = region.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows = region.into_iter();
        let mut labels = rows
            .next()
            .unwrap_or_default()
            .iter()
            .map(Cell::as_display)
            .collect::<Vec<_>>();
        labels.resize(width, String::new());
        let names = sanitize_all(&labels);
        for name in &names {
            if !union.contains(name) {
                union.push(name.clone());
            }
        }
        parts.push(Table::from_rows(names, rows.collect())?);
    }

    let mut merged: Vec<Vec<Cell>> = Vec::new();
    for part in &parts {
        let positions = union
            .iter()
            .map(|name| part.column_index(name))
            .collect::<Vec<_>>();
        for row in part.rows() {
            merged.push(
                positions
                    .iter()
                    .map(|pos| pos.map(|idx| row[idx].clone()).unwrap_or_default())
                    .collect(),
            );
        }
    }

    let names = sanitize_all(&union);
    let mut table = Table::from_rows(names, merged)?;
    let rows_dropped = drop_blank_rows(&mut table);
    let columns_dropped = table.drop_empty_columns();
    if !columns_dropped.is_empty() {
        debug!("Dropped empty region column(s): {}", columns_dropped.join(", "));
    }
    Ok(LoadedTable {
        table,
        rows_dropped,
        columns_dropped,
    })
}

fn drop_blank_rows(table: &mut Table) -> usize {
    table.retain_rows(|row| row.iter().any(|cell| !cell.is_missing()))
}

/// Fills gaps with zero and truncates numbers in every column whose name
/// contains one of `keywords`. Text cells are left untouched.
pub fn coerce_integer_columns<S: AsRef<str>>(table: &mut Table, keywords: &[S]) -> Vec<String> {
    let targets = table
        .columns()
        .iter()
        .map(|c| c.name.clone())
        .filter(|name| keywords.iter().any(|k| name.contains(k.as_ref())))
        .collect::<Vec<_>>();
    for name in &targets {
        if let Some(Column { cells, .. }) = table.column_mut(name) {
            for cell in cells.iter_mut() {
                *cell = match *cell {
                    Cell::Missing => Cell::Number(0.0),
                    Cell::Number(n) => Cell::Number(n.trunc()),
                    Cell::Text(_) => continue,
                };
            }
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Cell {
        Cell::parse(s)
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
        rows.iter().map(|r| r.iter().map(|c| t(c)).collect()).collect()
    }

    #[test]
    fn loads_with_placeholder_for_blank_label() {
        let raw = grid(&[&["", "Header1", "Header2"], &["A", "1", "2"], &["B", "3", "4"]]);
        let loaded = load(raw, &HeaderSelection::Row(0)).unwrap();
        assert_eq!(loaded.table.column_names(), vec!["col_0", "header1", "header2"]);
        assert_eq!(loaded.table.row_count(), 2);
        assert_eq!(loaded.rows_dropped, 0);
    }

    #[test]
    fn skips_rows_above_header_and_drops_blank_rows_and_columns() {
        let raw = grid(&[
            &["Primary Census Abstract"],
            &["State", "Name", "", "Persons"],
            &["1", "Goa", "", "10"],
            &["", "", "", ""],
            &["2", "Kerala", "", "20"],
        ]);
        let loaded = load(raw, &HeaderSelection::Row(1)).unwrap();
        assert_eq!(loaded.table.column_names(), vec!["state", "name", "persons"]);
        assert_eq!(loaded.columns_dropped, vec!["col_2"]);
        assert_eq!(loaded.rows_dropped, 1);
        assert_eq!(loaded.table.row_count(), 2);
    }

    #[test]
    fn stacked_header_rows_are_joined() {
        let raw = grid(&[&["Main", "Main", "Marginal"], &["Workers", "", "Workers"], &["1", "2", "3"]]);
        let loaded = load(raw, &HeaderSelection::Rows(vec![0, 1])).unwrap();
        assert_eq!(
            loaded.table.column_names(),
            vec!["main_workers", "main", "marginal_workers"]
        );
        assert_eq!(loaded.table.row_count(), 1);
    }

    #[test]
    fn header_outside_grid_is_a_load_error() {
        let raw = grid(&[&["a"]]);
        assert!(matches!(
            load(raw, &HeaderSelection::Row(3)),
            Err(LoadError::HeaderOutOfRange { row: 3, rows: 1 })
        ));
    }

    #[test]
    fn regions_concatenate_by_column_name() {
        let first = grid(&[&["Crop", "Area"], &["Rice", "10"]]);
        let second = grid(&[&["Crop", "Yield", "Area"], &["Wheat", "3", "7"]]);
        let loaded = load_regions(vec![first, second]).unwrap();
        assert_eq!(loaded.table.column_names(), vec!["crop", "area", "yield"]);
        assert_eq!(loaded.table.row_count(), 2);
        assert_eq!(
            loaded.table.row(0),
            vec![&Cell::Text("Rice".into()), &Cell::Number(10.0), &Cell::Missing]
        );
        assert_eq!(loaded.table.column("area").unwrap().cells[1], Cell::Number(7.0));
    }

    #[test]
    fn repeated_labels_within_a_region_stay_distinct() {
        let region = grid(&[&["Value", "Value"], &["1", "2"]]);
        let loaded = load_regions(vec![region]).unwrap();
        assert_eq!(loaded.table.column_names(), vec!["value", "value_1"]);
    }

    #[test]
    fn region_cells_beyond_the_header_keep_placeholder_columns() {
        let region = grid(&[&["Crop", "Area"], &["Rice", "10", "extra"], &["Jute", "4"]]);
        let loaded = load_regions(vec![region]).unwrap();
        assert_eq!(loaded.table.column_names(), vec!["crop", "area", "col_2"]);
        assert_eq!(
            loaded.table.column("col_2").unwrap().cells,
            vec![Cell::Text("extra".into()), Cell::Missing]
        );
    }

    #[test]
    fn empty_region_columns_are_dropped_and_reported() {
        let first = grid(&[&["Crop", "Notes", "Area"], &["Rice", "", "10"]]);
        let second = grid(&[&["Crop", "Area"], &["Wheat", "7"], &["", ""]]);
        let loaded = load_regions(vec![first, second]).unwrap();
        assert_eq!(loaded.table.column_names(), vec!["crop", "area"]);
        assert_eq!(loaded.columns_dropped, vec!["notes"]);
        assert_eq!(loaded.rows_dropped, 1);
    }

    #[test]
    fn no_regions_is_empty_error() {
        assert!(matches!(load_regions(Vec::new()), Err(LoadError::Empty)));
    }

    #[test]
    fn integer_coercion_fills_and_truncates() {
        let raw = grid(&[&["age", "total_persons"], &["All ages", ""], &["5", "12.0"]]);
        let mut table = load(raw, &HeaderSelection::Row(0)).unwrap().table;
        let touched = coerce_integer_columns(&mut table, &["persons"]);
        assert_eq!(touched, vec!["total_persons"]);
        assert_eq!(
            table.column("total_persons").unwrap().cells,
            vec![Cell::Number(0.0), Cell::Number(12.0)]
        );
        assert_eq!(table.column("age").unwrap().cells[0], Cell::Text("All ages".into()));
    }
}
