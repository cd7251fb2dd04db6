//! Dimension extraction.
//!
//! A categorical column that repeats the same descriptive text on every row
//! (religion, TRU classification, area name) is moved into a lookup table,
//! and the fact table keeps only a key pointing at it. Surrogate ids are
//! dense, start at 1, and follow first-occurrence order so re-running the
//! same input always yields the same ids.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    cell::{Cell, CellKey},
    describe::ForeignKey,
    error::FactorizationError,
    table::{Column, Table},
};

pub const SURROGATE_KEY_COLUMN: &str = "id";

/// Configuration for one dimension to pull out of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    /// Categorical column holding the descriptive values.
    pub column: String,
    /// Lookup table name; defaults to `<column>s`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Name of the descriptive column inside the lookup table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_column: Option<String>,
    /// Name of the key column added to the fact table; defaults to `<column>_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_column: Option<String>,
    /// Existing code column to use as the key instead of a surrogate id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_key: Option<String>,
    /// Other descriptive columns that belong to this entity and are dropped
    /// from the fact table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop: Vec<String>,
    /// Column index for the key column in the fact table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl DimensionSpec {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            table: None,
            value_column: None,
            key_column: None,
            natural_key: None,
            drop: Vec::new(),
            position: None,
        }
    }

    pub fn lookup_table_name(&self) -> String {
        self.table
            .clone()
            .unwrap_or_else(|| format!("{}s", self.column))
    }

    pub fn lookup_value_column(&self) -> String {
        match (&self.value_column, &self.natural_key) {
            (Some(name), _) => name.clone(),
            (None, Some(_)) => self.column.clone(),
            (None, None) => format!("{}_name", self.column),
        }
    }

    pub fn lookup_key_column(&self) -> String {
        self.natural_key
            .clone()
            .unwrap_or_else(|| SURROGATE_KEY_COLUMN.to_string())
    }

    pub fn fact_key_column(&self) -> String {
        match (&self.key_column, &self.natural_key) {
            (Some(name), _) => name.clone(),
            (None, Some(natural)) => natural.clone(),
            (None, None) => format!("{}_id", self.column),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupTable {
    pub name: String,
    pub key_column: String,
    pub value_column: String,
    pub table: Table,
}

#[derive(Debug, Clone)]
pub struct Factorized {
    pub lookup: LookupTable,
    pub fact: Table,
    /// Link from the fact table's key column to the lookup key.
    pub foreign_key: ForeignKey,
    pub dropped: Vec<String>,
}

/// Splits `table` into a lookup for `spec.column` and the reduced fact table.
pub fn factorize(table: Table, spec: &DimensionSpec) -> Result<Factorized, FactorizationError> {
    match &spec.natural_key {
        Some(natural) => factorize_natural(table, spec, natural),
        None => factorize_surrogate(table, spec),
    }
}

fn factorize_surrogate(
    table: Table,
    spec: &DimensionSpec,
) -> Result<Factorized, FactorizationError> {
    let column = table
        .column(&spec.column)
        .ok_or_else(|| FactorizationError::UnknownColumn(spec.column.clone()))?;

    // A blank category is a value of its own: it gets an id and a lookup
    // row whose label is missing, so every fact row keeps a key.
    let mut ids: HashMap<Option<CellKey>, i64> = HashMap::new();
    let mut values = Vec::new();
    for cell in &column.cells {
        let key = cell.key();
        if !ids.contains_key(&key) {
            values.push(cell.clone());
            ids.insert(key, values.len() as i64);
        }
    }

    let key_cells = column
        .cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            ids.get(&cell.key())
                .map(|id| Cell::from(*id))
                .ok_or_else(|| FactorizationError::UnmappedValue {
                    column: spec.column.clone(),
                    row,
                    value: cell.as_display(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let key_column = spec.lookup_key_column();
    let value_column = spec.lookup_value_column();
    let lookup = Table::from_columns(vec![
        Column::new(
            key_column.clone(),
            (1..=values.len() as i64).map(Cell::from).collect(),
        ),
        Column::new(value_column.clone(), values),
    ])?;

    let fact_key = spec.fact_key_column();
    let (fact, dropped) = reduce_fact(table, spec, Some(Column::new(fact_key.clone(), key_cells)))?;
    debug!(
        "Factorized '{}' into {} distinct value(s); dropped {:?}",
        spec.column,
        lookup.row_count(),
        dropped
    );
    let name = spec.lookup_table_name();
    Ok(Factorized {
        foreign_key: ForeignKey::new(fact_key, name.clone(), key_column.clone()),
        lookup: LookupTable {
            name,
            key_column,
            value_column,
            table: lookup,
        },
        fact,
        dropped,
    })
}

fn factorize_natural(
    table: Table,
    spec: &DimensionSpec,
    natural: &str,
) -> Result<Factorized, FactorizationError> {
    let labels = table
        .column(&spec.column)
        .ok_or_else(|| FactorizationError::UnknownColumn(spec.column.clone()))?;
    let keys = table
        .column(natural)
        .ok_or_else(|| FactorizationError::UnknownColumn(natural.to_string()))?;

    let mut positions: HashMap<CellKey, usize> = HashMap::new();
    let mut pairs: Vec<(Cell, Cell)> = Vec::new();
    for (key, label) in keys.cells.iter().zip(&labels.cells) {
        let Some(identity) = key.key() else {
            continue;
        };
        match positions.get(&identity) {
            None => {
                positions.insert(identity, pairs.len());
                pairs.push((key.clone(), label.clone()));
            }
            Some(&idx) => {
                let existing = &mut pairs[idx].1;
                if existing.is_missing() {
                    *existing = label.clone();
                } else if !label.is_missing() && existing.key() != label.key() {
                    return Err(FactorizationError::ConflictingLabel {
                        column: spec.column.clone(),
                        key: key.as_display(),
                        first: existing.as_display(),
                        second: label.as_display(),
                    });
                }
            }
        }
    }

    let value_column = spec.lookup_value_column();
    let (key_cells, value_cells): (Vec<Cell>, Vec<Cell>) = pairs.into_iter().unzip();
    let lookup = Table::from_columns(vec![
        Column::new(natural, key_cells),
        Column::new(value_column.clone(), value_cells),
    ])?;

    let (mut fact, dropped) = reduce_fact(table, spec, None)?;
    let fact_key = spec.fact_key_column();
    if fact_key != natural {
        let column = fact.remove_column(natural)?;
        let index = spec.position.unwrap_or(fact.column_count());
        fact.insert_column(index, Column::new(fact_key.clone(), column.cells))?;
    } else if let Some(position) = spec.position {
        fact.move_column(natural, position)?;
    }

    let name = spec.lookup_table_name();
    Ok(Factorized {
        foreign_key: ForeignKey::new(fact_key, name.clone(), natural.to_string()),
        lookup: LookupTable {
            name,
            key_column: natural.to_string(),
            value_column,
            table: lookup,
        },
        fact,
        dropped,
    })
}

/// Drops the categorical column and its companions, then places the key
/// column where the categorical column used to sit unless a position is
/// configured.
fn reduce_fact(
    mut table: Table,
    spec: &DimensionSpec,
    key: Option<Column>,
) -> Result<(Table, Vec<String>), FactorizationError> {
    let mut to_drop = vec![spec.column.clone()];
    to_drop.extend(
        spec.drop
            .iter()
            .filter(|name| Some(name.as_str()) != spec.natural_key.as_deref())
            .cloned(),
    );
    let anchor = table
        .columns()
        .iter()
        .take_while(|c| c.name != spec.column)
        .filter(|c| !to_drop.contains(&c.name))
        .count();
    let dropped = table.drop_columns(&to_drop);
    if let Some(key) = key {
        let index = spec.position.unwrap_or(anchor);
        table.insert_column(index, key)?;
    }
    Ok((table, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn religion_table() -> Table {
        Table::from_columns(vec![
            Column::new("state", vec![Cell::from(1i64); 4]),
            Column::new("district", vec![text("North"); 4]),
            Column::new(
                "religion",
                vec![text("Hindu"), text("Muslim"), text("Hindu"), text("Christian")],
            ),
            Column::new(
                "persons",
                vec![Cell::from(10i64), Cell::from(4i64), Cell::from(7i64), Cell::from(1i64)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn surrogate_ids_follow_first_occurrence() {
        let result = factorize(religion_table(), &DimensionSpec::new("religion")).unwrap();
        let lookup = &result.lookup.table;
        assert_eq!(result.lookup.name, "religions");
        assert_eq!(lookup.column_names(), vec!["id", "religion_name"]);
        assert_eq!(
            lookup.column("id").unwrap().cells,
            vec![Cell::from(1i64), Cell::from(2i64), Cell::from(3i64)]
        );
        assert_eq!(
            lookup.column("religion_name").unwrap().cells,
            vec![text("Hindu"), text("Muslim"), text("Christian")]
        );
        assert_eq!(
            result.fact.column("religion_id").unwrap().cells,
            vec![Cell::from(1i64), Cell::from(2i64), Cell::from(1i64), Cell::from(3i64)]
        );
        assert_eq!(
            result.fact.column_names(),
            vec!["state", "district", "religion_id", "persons"]
        );
        assert_eq!(
            result.foreign_key,
            ForeignKey::new("religion_id", "religions", "id")
        );
    }

    #[test]
    fn configured_companions_are_dropped_and_key_repositioned() {
        let spec = DimensionSpec {
            drop: vec!["district".into(), "subdistt".into()],
            position: Some(1),
            ..DimensionSpec::new("religion")
        };
        let result = factorize(religion_table(), &spec).unwrap();
        assert_eq!(result.fact.column_names(), vec!["state", "religion_id", "persons"]);
        assert_eq!(result.dropped, vec!["district", "religion"]);
        assert_eq!(result.fact.row_count(), 4);
    }

    #[test]
    fn blank_category_gets_its_own_id() {
        let table = Table::from_columns(vec![Column::new(
            "tru",
            vec![text("Total"), Cell::Missing, text("Rural"), Cell::Missing],
        )])
        .unwrap();
        let result = factorize(table, &DimensionSpec::new("tru")).unwrap();
        assert_eq!(
            result.lookup.table.column("tru_name").unwrap().cells,
            vec![text("Total"), Cell::Missing, text("Rural")]
        );
        assert_eq!(
            result.lookup.table.column("id").unwrap().cells,
            vec![Cell::from(1i64), Cell::from(2i64), Cell::from(3i64)]
        );
        assert_eq!(
            result.fact.column("tru_id").unwrap().cells,
            vec![Cell::from(1i64), Cell::from(2i64), Cell::from(3i64), Cell::from(2i64)]
        );
    }

    #[test]
    fn every_fact_row_keeps_a_key() {
        let table = Table::from_columns(vec![
            Column::new("religion", vec![text("Hindu"), Cell::Missing]),
            Column::new("persons", vec![Cell::from(3i64), Cell::from(4i64)]),
        ])
        .unwrap();
        let result = factorize(table, &DimensionSpec::new("religion")).unwrap();
        assert_eq!(result.lookup.table.row_count(), 2);
        assert!(
            result
                .fact
                .column("religion_id")
                .unwrap()
                .cells
                .iter()
                .all(|cell| !cell.is_missing())
        );
    }

    #[test]
    fn unknown_column_is_reported() {
        let err = factorize(religion_table(), &DimensionSpec::new("language")).unwrap_err();
        assert!(matches!(err, FactorizationError::UnknownColumn(name) if name == "language"));
    }

    #[test]
    fn sequential_dimensions_each_produce_a_lookup() {
        let table = Table::from_columns(vec![
            Column::new("religion", vec![text("Hindu"), text("Jain")]),
            Column::new("tru", vec![text("Urban"), text("Urban")]),
            Column::new("persons", vec![Cell::from(5i64), Cell::from(6i64)]),
        ])
        .unwrap();
        let first = factorize(table, &DimensionSpec::new("religion")).unwrap();
        let second = factorize(first.fact, &DimensionSpec::new("tru")).unwrap();
        assert_eq!(second.lookup.table.row_count(), 1);
        assert_eq!(
            second.fact.column_names(),
            vec!["religion_id", "tru_id", "persons"]
        );
    }

    #[test]
    fn natural_key_keeps_code_column() {
        let table = Table::from_columns(vec![
            Column::new("state", vec![Cell::from(27i64), Cell::from(32i64), Cell::from(27i64)]),
            Column::new(
                "area_name",
                vec![text("Maharashtra"), text("Kerala"), text("Maharashtra")],
            ),
            Column::new("persons", vec![Cell::from(1i64); 3]),
        ])
        .unwrap();
        let spec = DimensionSpec {
            table: Some("regions".into()),
            natural_key: Some("state".into()),
            ..DimensionSpec::new("area_name")
        };
        let result = factorize(table, &spec).unwrap();
        assert_eq!(result.lookup.table.column_names(), vec!["state", "area_name"]);
        assert_eq!(result.lookup.table.row_count(), 2);
        assert_eq!(result.fact.column_names(), vec!["state", "persons"]);
        assert_eq!(result.foreign_key, ForeignKey::new("state", "regions", "state"));
    }

    #[test]
    fn natural_key_with_two_labels_conflicts() {
        let table = Table::from_columns(vec![
            Column::new("state", vec![Cell::from(1i64), Cell::from(1i64)]),
            Column::new("area_name", vec![text("Goa"), text("Kerala")]),
        ])
        .unwrap();
        let spec = DimensionSpec {
            natural_key: Some("state".into()),
            ..DimensionSpec::new("area_name")
        };
        let err = factorize(table, &spec).unwrap_err();
        assert!(matches!(err, FactorizationError::ConflictingLabel { .. }));
        assert!(!err.is_invariant_breach());
    }
}
