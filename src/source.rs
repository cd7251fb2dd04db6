//! File routing and format adapters.
//!
//! Every adapter produces raw grids of [`Cell`]s with no header assumption;
//! the rest of the pipeline never looks at file formats.
//!
//! - Workbooks (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.ods`) go through
//!   `calamine`. Files carrying a workbook extension that are really
//!   delimited text (a common export quirk) are retried as CSV.
//! - Delimited text (`.csv`, `.tsv`, `.txt`) goes through `csv` after
//!   decoding to UTF-8.
//! - `.pdf` is recognised but has no adapter in this crate.

use std::{fs, path::Path};

use calamine::{Data, Reader, open_workbook_auto};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, warn};

use crate::{cell::Cell, error::LoadError, io_utils};

pub type RawGrid = Vec<Vec<Cell>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Delimited,
    Pdf,
    Unsupported,
}

impl SourceFormat {
    pub fn classify(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("xls" | "xlsx" | "xlsm" | "xlsb" | "ods") => SourceFormat::Workbook,
            Some("csv" | "tsv" | "txt") => SourceFormat::Delimited,
            Some("pdf") => SourceFormat::Pdf,
            _ => SourceFormat::Unsupported,
        }
    }
}

/// What an adapter extracted from one file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSource {
    /// A single grid whose header row still has to be located.
    Grid(RawGrid),
    /// Independent regions, each starting with its own header row.
    Regions(Vec<RawGrid>),
}

#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    /// Sheet name, or zero-based index, to read from workbooks.
    pub sheet: Option<String>,
    /// Read every worksheet as its own region.
    pub combine_sheets: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
            sheet: None,
            combine_sheets: false,
        }
    }
}

pub fn read_source(path: &Path, options: &SourceOptions) -> Result<RawSource, LoadError> {
    match SourceFormat::classify(path) {
        SourceFormat::Workbook => match read_workbook(path, options) {
            Ok(source) => Ok(source),
            Err(err) if is_plain_text(path) => {
                warn!("{path:?} is not a readable workbook ({err}); retrying as delimited text");
                read_delimited(path, options).map(RawSource::Grid)
            }
            Err(err) => Err(err),
        },
        SourceFormat::Delimited => read_delimited(path, options).map(RawSource::Grid),
        SourceFormat::Pdf => Err(LoadError::NoAdapter {
            path: path.to_path_buf(),
            format: "pdf".to_string(),
        }),
        SourceFormat::Unsupported => Err(LoadError::NoAdapter {
            path: path.to_path_buf(),
            format: path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }),
    }
}

pub fn read_delimited(path: &Path, options: &SourceOptions) -> Result<RawGrid, LoadError> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let mut reader = io_utils::open_decoded_reader(path, options.encoding, delimiter)?;
    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        grid.push(record.iter().map(Cell::parse).collect());
    }
    debug!("Read {} raw row(s) from {path:?}", grid.len());
    Ok(grid)
}

pub fn read_workbook(path: &Path, options: &SourceOptions) -> Result<RawSource, LoadError> {
    let workbook_error = |message: String| LoadError::Workbook {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(workbook_error("workbook has no sheets".to_string()));
    }

    if options.combine_sheets {
        let mut regions = Vec::with_capacity(sheet_names.len());
        for name in &sheet_names {
            let range = workbook
                .worksheet_range(name)
                .map_err(|e| workbook_error(format!("sheet '{name}': {e}")))?;
            regions.push(range_to_grid(range.rows()));
        }
        return Ok(RawSource::Regions(regions));
    }

    let name = match options.sheet.as_deref() {
        Some(selector) => select_sheet(&sheet_names, selector)
            .ok_or_else(|| workbook_error(format!("no sheet named or at index '{selector}'")))?,
        None => &sheet_names[0],
    };
    debug!("Reading sheet '{name}' of {path:?}");
    let range = workbook
        .worksheet_range(name)
        .map_err(|e| workbook_error(format!("sheet '{name}': {e}")))?;
    Ok(RawSource::Grid(range_to_grid(range.rows())))
}

/// Sheet named `selector`, or else the sheet at that zero-based index.
fn select_sheet<'a>(sheet_names: &'a [String], selector: &str) -> Option<&'a String> {
    sheet_names
        .iter()
        .find(|name| name.as_str() == selector)
        .or_else(|| {
            selector
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| sheet_names.get(idx))
        })
}

fn range_to_grid<'a>(rows: impl Iterator<Item = &'a [Data]>) -> RawGrid {
    rows.map(|row| row.iter().map(workbook_cell).collect())
        .collect()
}

fn workbook_cell(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::Int(i) => Cell::integer(*i),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::text(s),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(stamp) if stamp.time() == chrono::NaiveTime::MIN => {
                Cell::Text(stamp.date().format("%Y-%m-%d").to_string())
            }
            Some(stamp) => Cell::Text(stamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Number(dt.as_f64()),
        },
        other => Cell::text(&other.to_string()),
    }
}

/// Binary workbooks contain NUL bytes; text masquerading as one does not.
fn is_plain_text(path: &Path) -> bool {
    fs::read(path)
        .map(|bytes| !bytes.is_empty() && !bytes.contains(&0))
        .unwrap_or(false)
}
