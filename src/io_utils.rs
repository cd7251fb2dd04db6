//! I/O helpers for delimited text: delimiter and encoding resolution, reader
//! and writer construction, and CSV export of cleaned tables.
//!
//! Input is decoded to UTF-8 (stripping any byte-order mark) before the CSV
//! parser sees it, so every downstream stage works on `String`s. Output is
//! always UTF-8, comma separated, with a single header row and no index
//! column.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::{error::LoadError, table::Table};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, LoadError> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| LoadError::Encoding(value.to_string()))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Reader over loosely structured text: no header row, ragged rows allowed.
pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_decoded_reader(
    path: &Path,
    encoding: &'static Encoding,
    delimiter: u8,
) -> Result<csv::Reader<Box<dyn Read>>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .build(BufReader::new(file));
    let reader: Box<dyn Read> = Box::new(decoded);
    Ok(open_csv_reader(reader, delimiter))
}

pub fn open_csv_writer(path: &Path) -> Result<csv::Writer<Box<dyn Write>>> {
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let writer: Box<dyn Write> = Box::new(BufWriter::new(file));
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(DEFAULT_CSV_DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(writer))
}

/// Writes `table` as UTF-8 CSV with the column names as header.
pub fn write_table_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = open_csv_writer(path)?;
    writer
        .write_record(table.column_names())
        .with_context(|| format!("Writing header to {path:?}"))?;
    for (idx, row) in table.rows().enumerate() {
        writer
            .write_record(row.iter().map(|cell| cell.as_display()))
            .with_context(|| format!("Writing row {} to {path:?}", idx + 1))?;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing {path:?}"))?;
    Ok(())
}
