pub mod cell;
pub mod cli;
pub mod config;
pub mod describe;
pub mod error;
pub mod factorize;
pub mod header;
pub mod io_utils;
pub mod loader;
pub mod persist;
pub mod pipeline;
pub mod preview;
pub mod sanitize;
pub mod source;
pub mod table;

use std::{env, path::PathBuf, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, DescribeArgs, DetectHeaderArgs, PreviewArgs, SingleFileArgs},
    config::DatasetConfig,
    pipeline::{FileStage, OutputTable, PipelineOptions, TableRole},
    source::{RawSource, SourceOptions},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("table_normalize", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize(args) => pipeline::execute(&args),
        Commands::DetectHeader(args) => handle_detect_header(&args),
        Commands::Preview(args) => handle_preview(&args),
        Commands::Describe(args) => handle_describe(&args),
    }
}

fn single_file_setup(args: &SingleFileArgs) -> Result<(DatasetConfig, PipelineOptions)> {
    let config = match &args.config {
        Some(path) => DatasetConfig::load(path)?,
        None => DatasetConfig::default(),
    };
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let options = PipelineOptions {
        output_dir: PathBuf::new(),
        save_local: false,
        source: SourceOptions {
            delimiter: args.delimiter,
            encoding,
            ..SourceOptions::default()
        },
        preview_rows: args.preview_rows,
    };
    Ok((config, options))
}

fn handle_detect_header(args: &DetectHeaderArgs) -> Result<()> {
    let (config, options) = single_file_setup(&args.file)?;
    let input = &args.file.input;
    let rules = config.rules_for(input);
    if let Some(delimiter) = options.source.delimiter {
        info!(
            "Reading '{}' with delimiter '{}'",
            input.display(),
            printable_delimiter(delimiter)
        );
    }
    let raw = source::read_source(input, &pipeline::source_options(&options.source, rules))
        .with_context(|| format!("Reading {input:?}"))?;
    match raw {
        RawSource::Grid(grid) => {
            let locator = pipeline::header_locator(rules, options.preview_rows);
            let candidates = locator.score_rows(&grid);
            let chosen = locator.locate(&grid);
            print!("{}", preview::render_candidates(&grid, &candidates, chosen));
            if let Some(fixed) = &rules.header_rows {
                println!("configured header: {fixed:?}");
            }
        }
        RawSource::Regions(regions) => {
            println!(
                "{} region(s); each region uses its first row as header",
                regions.len()
            );
        }
    }
    Ok(())
}

fn handle_preview(args: &PreviewArgs) -> Result<()> {
    let (config, options) = single_file_setup(&args.file)?;
    let input = &args.file.input;
    let mut stage = FileStage::Pending;
    let cleaned = pipeline::clean_file(input, config.rules_for(input), &options, &mut stage)
        .with_context(|| format!("Loading {input:?}"))?;
    print!(
        "{}",
        preview::render_table(&cleaned.loaded.table, Some(args.rows))
    );
    info!(
        "Displayed up to {} of {} row(s) from {:?} ({} blank row(s) dropped)",
        args.rows,
        cleaned.loaded.table.row_count(),
        input,
        cleaned.loaded.rows_dropped
    );
    Ok(())
}

fn handle_describe(args: &DescribeArgs) -> Result<()> {
    let (config, options) = single_file_setup(&args.file)?;
    let input = &args.file.input;
    let rules = config.rules_for(input);
    let mut stage = FileStage::Pending;
    let cleaned = pipeline::clean_file(input, rules, &options, &mut stage)
        .with_context(|| format!("Loading {input:?}"))?;
    let outputs = if args.no_dimensions {
        vec![OutputTable {
            name: cleaned.table_name,
            role: TableRole::Fact,
            table: cleaned.loaded.table,
            constraints: Default::default(),
        }]
    } else {
        pipeline::build_outputs(&cleaned.table_name, cleaned.loaded.table, rules)
            .with_context(|| format!("Extracting dimensions from {input:?}"))?
    };
    let statements = outputs
        .iter()
        .map(|output| output.describe().to_create_table(&output.constraints))
        .collect::<Vec<_>>();
    println!("{}", statements.join("\n\n"));
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
