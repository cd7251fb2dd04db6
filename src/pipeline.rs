//! Batch normalization.
//!
//! Each input file moves through a fixed sequence of stages:
//!
//! `Pending → HeaderLocated → Loaded → Factorized → Described →
//! LocallySaved → Persisted → Done`
//!
//! A failure at any stage marks that file `Failed` and the batch moves on to
//! the next file. The only exception is a lookup that disagrees with the
//! column it was built from, which stops the whole batch. Files run one after
//! another and share the destination connection.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::{
    cli::NormalizeArgs,
    config::{DatasetConfig, FileRules},
    describe::{Constraints, ForeignKey, SchemaDescription, describe},
    error::{ConfigurationError, FactorizationError, LoadError, PersistenceError},
    factorize::factorize,
    header::{DEFAULT_PREVIEW_ROWS, HeaderLocator},
    io_utils,
    loader::{self, HeaderSelection, LoadedTable},
    persist::{PersistRequest, SqliteSink, TableSink},
    sanitize::table_name_from_file,
    source::{self, RawSource, SourceFormat, SourceOptions},
    table::Table,
};

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStage {
    Pending,
    HeaderLocated,
    Loaded,
    Factorized,
    Described,
    LocallySaved,
    Persisted,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    Lookup,
    Fact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub name: String,
    pub role: TableRole,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Done { tables: Vec<TableReport> },
    Empty,
    Failed { stage: FileStage, reason: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderSelection>,
    pub rows: usize,
    pub rows_dropped: usize,
    pub columns_dropped: Vec<String>,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

impl BatchSummary {
    fn count(&self, matches: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| matches(&f.outcome)).count()
    }

    pub fn done(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Done { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn empty(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Empty))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating summary {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing summary JSON")
    }
}

/// Why a single file failed.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Factorization(#[from] FactorizationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("{0:#}")]
    Output(anyhow::Error),
}

/// Run-wide settings that do not come from the dataset config.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    pub save_local: bool,
    pub source: SourceOptions,
    /// Overrides the preview size of every file's rules.
    pub preview_rows: Option<usize>,
}

/// A file after loading and column cleanup, before factorization.
#[derive(Debug, Clone)]
pub struct CleanedFile {
    pub table_name: String,
    pub header: Option<HeaderSelection>,
    pub loaded: LoadedTable,
}

/// A table ready to be written, with its keys.
#[derive(Debug, Clone)]
pub struct OutputTable {
    pub name: String,
    pub role: TableRole,
    pub table: Table,
    pub constraints: Constraints,
}

impl OutputTable {
    pub fn describe(&self) -> SchemaDescription {
        describe(&self.table, &self.name)
    }
}

pub fn source_options(base: &SourceOptions, rules: &FileRules) -> SourceOptions {
    SourceOptions {
        sheet: rules.sheet.clone(),
        combine_sheets: rules.combine_sheets,
        ..base.clone()
    }
}

pub fn header_locator(rules: &FileRules, preview_override: Option<usize>) -> HeaderLocator {
    HeaderLocator::new()
        .with_keywords(rules.keywords())
        .with_preview_rows(
            preview_override
                .or(rules.preview_rows)
                .unwrap_or(DEFAULT_PREVIEW_ROWS),
        )
}

/// Reads `path`, places the header, and applies the column rules.
pub fn clean_file(
    path: &Path,
    rules: &FileRules,
    options: &PipelineOptions,
    stage: &mut FileStage,
) -> Result<CleanedFile, LoadError> {
    let table_name = rules
        .table_name
        .clone()
        .unwrap_or_else(|| table_name_from_file(path));
    let raw = source::read_source(path, &source_options(&options.source, rules))?;
    let (header, mut loaded) = match raw {
        RawSource::Grid(grid) => {
            let header = match &rules.header_rows {
                Some(fixed) => fixed.clone(),
                None => HeaderSelection::Row(
                    header_locator(rules, options.preview_rows).locate(&grid),
                ),
            };
            debug!("Header for {path:?}: {header:?}");
            *stage = FileStage::HeaderLocated;
            let loaded = loader::load(grid, &header)?;
            (Some(header), loaded)
        }
        RawSource::Regions(regions) => {
            *stage = FileStage::HeaderLocated;
            (None, loader::load_regions(regions)?)
        }
    };
    *stage = FileStage::Loaded;

    let dropped = loaded.table.drop_columns(&rules.drop_columns);
    if !dropped.is_empty() {
        debug!("Dropped configured column(s): {}", dropped.join(", "));
    }
    let coerced = loader::coerce_integer_columns(&mut loaded.table, &rules.integer_columns);
    if !coerced.is_empty() {
        debug!("Coerced integer column(s): {}", coerced.join(", "));
    }
    Ok(CleanedFile {
        table_name,
        header,
        loaded,
    })
}

/// Factors every configured dimension out of `table`. Lookup tables come
/// first in the result, the fact table last.
pub fn build_outputs(
    table_name: &str,
    table: Table,
    rules: &FileRules,
) -> Result<Vec<OutputTable>, FactorizationError> {
    let mut outputs = Vec::with_capacity(rules.dimensions.len() + 1);
    let mut foreign_keys = Vec::new();
    let mut fact = table;
    for dimension in &rules.dimensions {
        let factorized = factorize(fact, dimension)?;
        info!(
            "Extracted '{}' into '{}' ({} value(s))",
            dimension.column,
            factorized.lookup.name,
            factorized.lookup.table.row_count()
        );
        outputs.push(OutputTable {
            name: factorized.lookup.name,
            role: TableRole::Lookup,
            table: factorized.lookup.table,
            constraints: Constraints {
                primary_key: Some(factorized.lookup.key_column),
                foreign_keys: Vec::new(),
            },
        });
        foreign_keys.push(factorized.foreign_key);
        fact = factorized.fact;
    }
    foreign_keys.extend(configured_foreign_keys(&fact, &rules.foreign_keys));
    let primary_key = rules
        .primary_key
        .clone()
        .filter(|pk| fact.column_index(pk).is_some());
    outputs.push(OutputTable {
        name: table_name.to_string(),
        role: TableRole::Fact,
        table: fact,
        constraints: Constraints {
            primary_key,
            foreign_keys,
        },
    });
    Ok(outputs)
}

fn configured_foreign_keys(fact: &Table, configured: &[ForeignKey]) -> Vec<ForeignKey> {
    configured
        .iter()
        .filter(|fk| {
            let present = fact.column_index(&fk.column).is_some();
            if !present {
                warn!(
                    "Ignoring foreign key on missing column '{}' -> {}.{}",
                    fk.column, fk.referenced_table, fk.referenced_column
                );
            }
            present
        })
        .cloned()
        .collect()
}

pub fn save_local(outputs: &[OutputTable], output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Creating output directory {output_dir:?}"))?;
    for output in outputs {
        let csv_path = output_dir.join(format!("{}.csv", output.name));
        io_utils::write_table_csv(&output.table, &csv_path)?;
        let sql_path = output_dir.join(format!("{}.sql", output.name));
        let sql = output.describe().to_create_table(&output.constraints);
        fs::write(&sql_path, format!("{sql}\n"))
            .with_context(|| format!("Writing table definition {sql_path:?}"))?;
        debug!("Saved {csv_path:?} and {sql_path:?}");
    }
    Ok(())
}

pub struct Pipeline<'a> {
    config: &'a DatasetConfig,
    options: &'a PipelineOptions,
    sink: Option<&'a mut dyn TableSink>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a DatasetConfig,
        options: &'a PipelineOptions,
        sink: Option<&'a mut dyn TableSink>,
    ) -> Self {
        Self {
            config,
            options,
            sink,
        }
    }

    /// Processes `files` in order. Returns an error only when a lookup
    /// disagrees with its source column.
    pub fn run(&mut self, files: &[PathBuf]) -> Result<BatchSummary, FactorizationError> {
        let started_at = Utc::now();
        let mut reports = Vec::with_capacity(files.len());
        for (idx, path) in files.iter().enumerate() {
            info!("[{}/{}] {}", idx + 1, files.len(), path.display());
            reports.push(self.process_file(path)?);
        }
        let summary = BatchSummary {
            started_at,
            finished_at: Utc::now(),
            files: reports,
        };
        info!(
            "Batch finished: {} done, {} empty, {} failed, {} skipped",
            summary.done(),
            summary.empty(),
            summary.failed(),
            summary.skipped()
        );
        Ok(summary)
    }

    pub fn process_file(&mut self, path: &Path) -> Result<FileReport, FactorizationError> {
        let config = self.config;
        let rules = config.rules_for(path);
        let mut report = FileReport {
            path: path.to_path_buf(),
            table_name: rules
                .table_name
                .clone()
                .unwrap_or_else(|| table_name_from_file(path)),
            header: None,
            rows: 0,
            rows_dropped: 0,
            columns_dropped: Vec::new(),
            outcome: FileOutcome::Empty,
        };
        if SourceFormat::classify(path) == SourceFormat::Unsupported {
            warn!("Skipping {path:?}: unsupported file type");
            report.outcome = FileOutcome::Skipped {
                reason: "unsupported file type".to_string(),
            };
            return Ok(report);
        }

        let mut stage = FileStage::Pending;
        let result = self.run_stages(path, rules, &mut report, &mut stage);
        report.outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => failure_outcome(path, err, stage)?,
        };
        Ok(report)
    }

    fn run_stages(
        &mut self,
        path: &Path,
        rules: &FileRules,
        report: &mut FileReport,
        stage: &mut FileStage,
    ) -> Result<FileOutcome, FileError> {
        let cleaned = clean_file(path, rules, self.options, stage)?;
        report.header = cleaned.header;
        report.rows = cleaned.loaded.table.row_count();
        report.rows_dropped = cleaned.loaded.rows_dropped;
        report.columns_dropped = cleaned.loaded.columns_dropped;
        let table = cleaned.loaded.table;
        if table.is_empty() || table.column_count() == 0 {
            warn!("{path:?} has no data after cleaning; nothing to save");
            return Ok(FileOutcome::Empty);
        }

        let outputs = build_outputs(&cleaned.table_name, table, rules)?;
        *stage = FileStage::Factorized;
        let schemas = outputs.iter().map(OutputTable::describe).collect::<Vec<_>>();
        *stage = FileStage::Described;

        if self.options.save_local {
            save_local(&outputs, &self.options.output_dir).map_err(FileError::Output)?;
            *stage = FileStage::LocallySaved;
        }
        if let Some(sink) = self.sink.as_deref_mut() {
            let requests = outputs
                .iter()
                .zip(&schemas)
                .map(|(output, schema)| PersistRequest {
                    name: &output.name,
                    table: &output.table,
                    schema,
                    constraints: &output.constraints,
                })
                .collect::<Vec<_>>();
            sink.persist_all(&requests)?;
            *stage = FileStage::Persisted;
        }
        *stage = FileStage::Done;

        info!(
            "{}: {} row(s) processed, {} row(s) dropped, {} table(s) produced",
            path.display(),
            report.rows,
            report.rows_dropped,
            outputs.len()
        );
        Ok(FileOutcome::Done {
            tables: outputs
                .iter()
                .map(|output| TableReport {
                    name: output.name.clone(),
                    role: output.role,
                    rows: output.table.row_count(),
                    columns: output.table.column_count(),
                })
                .collect(),
        })
    }
}

/// Turns a file failure into its report outcome, or stops the batch when
/// the failure means the factorizer broke its own mapping.
fn failure_outcome(
    path: &Path,
    err: FileError,
    stage: FileStage,
) -> Result<FileOutcome, FactorizationError> {
    match err {
        FileError::Factorization(inner) if inner.is_invariant_breach() => {
            error!("Aborting batch at {path:?}: {inner}");
            Err(inner)
        }
        other => {
            error!("Failed {path:?} after stage {stage:?}: {other}");
            Ok(FileOutcome::Failed {
                stage,
                reason: other.to_string(),
            })
        }
    }
}

/// Expands directories (recursively, sorted by name) and drops hidden
/// entries. Explicitly named files are kept as given.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            collect_dir(input, &mut files)?;
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(anyhow!("Input {input:?} does not exist"));
        }
    }
    Ok(files)
}

fn collect_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Listing {dir:?}"))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Listing {dir:?}"))?;
    entries.sort_by_key(|entry| entry.file_name());
    for entry in entries {
        if entry.file_name().to_string_lossy().starts_with('.') {
            debug!("Skipping hidden entry {:?}", entry.path());
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            collect_dir(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

pub fn execute(args: &NormalizeArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => DatasetConfig::load(path)?,
        None => DatasetConfig::default(),
    };
    let mut sink = if args.upload {
        let database = args
            .database
            .as_deref()
            .ok_or(ConfigurationError::MissingDestination)?;
        Some(SqliteSink::open(database, args.batch_size)?)
    } else {
        if args.database.is_some() {
            debug!("Destination configured but --upload not set; tables stay local");
        }
        None
    };
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let files = collect_inputs(&args.inputs)?;
    info!(
        "Normalizing {} file(s) into {:?}{}",
        files.len(),
        args.output_dir,
        if sink.is_some() { " and the destination database" } else { "" }
    );

    let options = PipelineOptions {
        output_dir: args.output_dir.clone(),
        save_local: !args.no_local,
        source: SourceOptions {
            delimiter: args.delimiter,
            encoding,
            ..SourceOptions::default()
        },
        preview_rows: args.preview_rows,
    };
    let summary = {
        let sink = sink.as_mut().map(|s| s as &mut dyn TableSink);
        let mut pipeline = Pipeline::new(&config, &options, sink);
        pipeline.run(&files).context("Batch aborted")?
    };

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Creating output directory {:?}", args.output_dir))?;
    let summary_path = args.output_dir.join(SUMMARY_FILE);
    summary.save(&summary_path)?;
    info!("Summary written to {summary_path:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cell::Cell, factorize::DimensionSpec};
    use tempfile::{TempDir, tempdir};

    #[derive(Default)]
    struct RecordingSink {
        batches: Vec<Vec<String>>,
        fail: bool,
    }

    impl TableSink for RecordingSink {
        fn persist_all(
            &mut self,
            requests: &[PersistRequest<'_>],
        ) -> Result<(), PersistenceError> {
            if self.fail {
                return Err(PersistenceError::UnknownTable("religions".into()));
            }
            self.batches
                .push(requests.iter().map(|r| r.name.to_string()).collect());
            Ok(())
        }

        fn load_table(&self, name: &str) -> Result<Table, PersistenceError> {
            Err(PersistenceError::UnknownTable(name.to_string()))
        }
    }

    fn options(dir: &TempDir) -> PipelineOptions {
        PipelineOptions {
            output_dir: dir.path().join("out"),
            save_local: true,
            source: SourceOptions::default(),
            preview_rows: None,
        }
    }

    fn religion_config() -> DatasetConfig {
        DatasetConfig {
            defaults: FileRules {
                drop_columns: vec!["table".into()],
                dimensions: vec![DimensionSpec::new("religion")],
                ..FileRules::default()
            },
            files: Vec::new(),
        }
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write input");
        path
    }

    const RELIGION_CSV: &str = "Religion by district\n\
        Table,State,Religion,Total Persons,Males\n\
        C01,1,Hindu,10,5\n\
        C01,1,Muslim,4,2\n\
        ,,,,\n\
        C01,2,Hindu,7,3\n";

    #[test]
    fn lookups_are_persisted_before_the_fact_table() {
        let dir = tempdir().expect("temp dir");
        let input = write(&dir, "Religion 2011.csv", RELIGION_CSV);
        let config = religion_config();
        let options = options(&dir);
        let mut sink = RecordingSink::default();
        let summary = Pipeline::new(&config, &options, Some(&mut sink))
            .run(&[input])
            .expect("batch");

        assert_eq!(sink.batches, vec![vec!["religions", "religion_2011"]]);
        let report = &summary.files[0];
        assert_eq!(report.header, Some(HeaderSelection::Row(1)));
        assert_eq!(report.rows, 3);
        assert_eq!(report.rows_dropped, 1);
        match &report.outcome {
            FileOutcome::Done { tables } => {
                assert_eq!(tables[0].rows, 2);
                assert_eq!(tables[1].columns, 4);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        let sql = fs::read_to_string(options.output_dir.join("religion_2011.sql")).unwrap();
        assert!(sql.contains("FOREIGN KEY (\"religion_id\") REFERENCES \"religions\" (\"id\")"));
        let csv = fs::read_to_string(options.output_dir.join("religion_2011.csv")).unwrap();
        assert_eq!(
            csv,
            "state,religion_id,total_persons,males\n1,1,10,5\n1,2,4,2\n2,1,7,3\n"
        );
    }

    #[test]
    fn persistence_failure_fails_only_that_file() {
        let dir = tempdir().expect("temp dir");
        let first = write(&dir, "a.csv", RELIGION_CSV);
        let second = write(&dir, "b.csv", "name,total\nx,1\n");
        let config = DatasetConfig::default();
        let options = options(&dir);
        let mut sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let summary = Pipeline::new(&config, &options, Some(&mut sink))
            .run(&[first, second])
            .expect("batch");
        assert_eq!(summary.failed(), 2);
        assert!(matches!(
            &summary.files[0].outcome,
            FileOutcome::Failed { stage: FileStage::LocallySaved, .. }
        ));
    }

    #[test]
    fn unreadable_file_does_not_stop_the_batch() {
        let dir = tempdir().expect("temp dir");
        let broken = dir.path().join("broken.xlsx");
        fs::write(&broken, [0u8, 1, 2, 3, 0]).unwrap();
        let good = write(&dir, "good.csv", "name,total\nx,1\n");
        let notes = write(&dir, "notes.md", "# notes");
        let config = DatasetConfig::default();
        let options = options(&dir);
        let summary = Pipeline::new(&config, &options, None)
            .run(&[broken, good, notes])
            .expect("batch");
        assert!(matches!(
            &summary.files[0].outcome,
            FileOutcome::Failed { stage: FileStage::Pending, .. }
        ));
        assert!(matches!(&summary.files[1].outcome, FileOutcome::Done { .. }));
        assert!(matches!(&summary.files[2].outcome, FileOutcome::Skipped { .. }));
        assert!(options.output_dir.join("good.csv").exists());
    }

    #[test]
    fn header_only_file_is_empty_not_failed() {
        let dir = tempdir().expect("temp dir");
        let input = write(&dir, "blank.csv", "name,total\n,\n");
        let config = DatasetConfig::default();
        let options = options(&dir);
        let summary = Pipeline::new(&config, &options, None)
            .run(&[input])
            .expect("batch");
        assert_eq!(summary.empty(), 1);
        assert!(!options.output_dir.join("blank.csv").exists());
    }

    #[test]
    fn unknown_dimension_column_fails_the_file() {
        let dir = tempdir().expect("temp dir");
        let input = write(&dir, "crops.csv", "crop,area\nrice,1\n");
        let config = religion_config();
        let options = options(&dir);
        let summary = Pipeline::new(&config, &options, None)
            .run(&[input])
            .expect("batch");
        match &summary.files[0].outcome {
            FileOutcome::Failed { stage, reason } => {
                assert_eq!(*stage, FileStage::Loaded);
                assert!(reason.contains("religion"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn unmapped_value_aborts_the_batch() {
        let err = FactorizationError::UnmappedValue {
            column: "religion".into(),
            row: 3,
            value: "Jain".into(),
        };
        let result = failure_outcome(Path::new("x.csv"), err.into(), FileStage::Loaded);
        assert!(matches!(result, Err(FactorizationError::UnmappedValue { .. })));
    }

    #[test]
    fn configured_keys_on_missing_columns_are_ignored() {
        let table = Table::from_columns(vec![crate::table::Column::new(
            "state",
            vec![Cell::from(1i64)],
        )])
        .unwrap();
        let rules = FileRules {
            primary_key: Some("code".into()),
            foreign_keys: vec![
                ForeignKey::new("state", "regions", "state"),
                ForeignKey::new("district", "districts", "id"),
            ],
            ..FileRules::default()
        };
        let outputs = build_outputs("stats", table, &rules).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(
            outputs[0].constraints,
            Constraints {
                primary_key: None,
                foreign_keys: vec![ForeignKey::new("state", "regions", "state")],
            }
        );
    }

    #[test]
    fn directories_are_walked_in_name_order_without_hidden_files() {
        let dir = tempdir().expect("temp dir");
        fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir, "b.csv", "x\n1\n");
        write(&dir, ".hidden.csv", "x\n1\n");
        write(&dir, "nested/a.csv", "x\n1\n");
        let files = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![PathBuf::from("b.csv"), PathBuf::from("nested/a.csv")]);
    }
}
