mod common;

use common::{TestWorkspace, fixture_path};
use table_normalize::{
    cell::Cell,
    config::DatasetConfig,
    describe::{Constraints, SqlType, describe},
    factorize::{DimensionSpec, factorize},
    io_utils::write_table_csv,
    header::locate_header,
    loader::{HeaderSelection, load},
    persist::{PersistRequest, SqliteSink, TableSink},
    pipeline::{self, FileStage, PipelineOptions},
    source::{SourceOptions, read_delimited},
};

#[test]
fn blank_leading_label_gets_a_placeholder_end_to_end() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("grid.csv", ",Header1,Header2\nA,1,2\nB,3,4\n");
    let grid = read_delimited(&path, &SourceOptions::default()).expect("read grid");
    let header = locate_header(&grid);
    assert_eq!(header, 0);
    let loaded = load(grid, &HeaderSelection::Row(header)).expect("load");
    assert_eq!(loaded.table.column_names(), vec!["col_0", "header1", "header2"]);
    assert_eq!(loaded.table.row_count(), 2);
}

#[test]
fn religion_column_factors_into_dense_ids() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "religion.csv",
        "Religion,Persons\nHindu,10\nMuslim,4\nHindu,7\nChristian,1\n",
    );
    let grid = read_delimited(&path, &SourceOptions::default()).unwrap();
    let table = load(grid, &HeaderSelection::Row(0)).unwrap().table;
    let result = factorize(table, &DimensionSpec::new("religion")).unwrap();
    let ids = result.fact.column("religion_id").unwrap().cells.clone();
    assert_eq!(
        ids,
        vec![Cell::from(1i64), Cell::from(2i64), Cell::from(1i64), Cell::from(3i64)]
    );
    let names = result.lookup.table.column("religion_name").unwrap().cells.clone();
    assert_eq!(
        names,
        vec![
            Cell::Text("Hindu".into()),
            Cell::Text("Muslim".into()),
            Cell::Text("Christian".into())
        ]
    );
}

#[test]
fn described_table_survives_persist_and_reload() {
    let workspace = TestWorkspace::new();
    let config = DatasetConfig::load(&fixture_path("religion.yaml")).expect("config");
    let input = fixture_path("religion_district.csv");
    let rules = config.rules_for(&input);
    let options = PipelineOptions {
        output_dir: workspace.path().join("out"),
        save_local: false,
        source: SourceOptions::default(),
        preview_rows: None,
    };
    let mut stage = FileStage::Pending;
    let cleaned = pipeline::clean_file(&input, rules, &options, &mut stage).expect("clean");
    assert_eq!(stage, FileStage::Loaded);
    let outputs =
        pipeline::build_outputs(&cleaned.table_name, cleaned.loaded.table, rules).expect("factor");
    let schemas = outputs.iter().map(|o| o.describe()).collect::<Vec<_>>();

    let mut sink = SqliteSink::open(&workspace.path().join("dest.db"), 2).expect("open");
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
    sink.persist_all(&requests).expect("persist");

    for (output, schema) in outputs.iter().zip(&schemas) {
        let back = sink.load_table(&output.name).expect("reload");
        assert_eq!(back.column_names(), schema.column_names());
        assert_eq!(back.row_count(), output.table.row_count());
        assert_eq!(describe(&back, &output.name), *schema);
    }
}

#[test]
fn text_codes_stay_text_through_describe() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("codes.csv", "District Code,Total\n001,5\n002,6.5\n");
    let grid = read_delimited(&path, &SourceOptions::default()).unwrap();
    let table = load(grid, &HeaderSelection::Row(0)).unwrap().table;
    let schema = describe(&table, "codes");
    assert_eq!(schema.column_type("district_code"), Some(SqlType::Text));
    assert_eq!(schema.column_type("total"), Some(SqlType::Double));
    assert!(
        schema
            .to_create_table(&Constraints::default())
            .ends_with(");")
    );
}

#[test]
fn oversized_integer_ids_are_written_back_verbatim() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "households.csv",
        "household_id\n9007199254740993\n12345678901234567890\n",
    );
    let grid = read_delimited(&path, &SourceOptions::default()).unwrap();
    let table = load(grid, &HeaderSelection::Row(0)).unwrap().table;
    assert_eq!(
        describe(&table, "households").column_type("household_id"),
        Some(SqlType::Text)
    );
    let out = workspace.path().join("households_out.csv");
    write_table_csv(&table, &out).expect("write csv");
    assert_eq!(
        workspace.read("households_out.csv"),
        "household_id\n9007199254740993\n12345678901234567890\n"
    );
}
