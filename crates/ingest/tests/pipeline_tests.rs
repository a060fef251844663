// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use ingest::testing::RecordingEngine;
use ingest::{DuckDbEngine, Engine, Error, Plan, ProgramOptions, ResultRow, Store, run};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

// Placeholders only accept word characters and dots, so fixtures referenced
// through `{{ }}` live in the working directory under a bare file name.

/// A CSV fixture in the working directory, removed on drop
struct Fixture {
    file: NamedTempFile,
}

impl Fixture {
    fn new(prefix: &str, content: &str) -> Self {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".csv")
            .rand_bytes(8)
            .tempfile_in(".")
            .expect("create fixture");
        file.write_all(content.as_bytes()).expect("write fixture");
        file.flush().expect("flush fixture");
        Self { file }
    }

    /// Bare file name, usable inside a placeholder
    fn name(&self) -> String {
        self.file
            .path()
            .file_name()
            .expect("fixture has a file name")
            .to_string_lossy()
            .to_string()
    }

    fn table(&self) -> String {
        self.name().trim_end_matches(".csv").to_string()
    }
}

fn run_lines(query: &str, extra: &[String], options: &ProgramOptions) -> Result<Vec<String>, Error> {
    let mut lines = Vec::new();
    run(query, extra, Store::Memory, options, |row| {
        lines.push(row.to_line());
        Ok(())
    })?;
    Ok(lines)
}

fn query_lines(engine: &mut DuckDbEngine, sql: &str) -> Vec<String> {
    let mut lines = Vec::new();
    engine
        .query(sql, &mut |row: &ResultRow| {
            lines.push(row.to_line());
            Ok(())
        })
        .expect("query");
    lines
}

#[test]
fn test_people_end_to_end() {
    let people = Fixture::new("people_", "name,age\nAlice,30\nBob,25");
    let query = format!("SELECT name FROM {{{{{}}}}}", people.name());

    let lines = run_lines(&query, &[people.name()], &ProgramOptions::default()).expect("run");
    assert_eq!(lines, vec!["Alice", "Bob"]);
}

#[test]
fn test_self_join_loads_once() {
    let x = Fixture::new("x_", "name\nA\nB\n");
    let query = format!(
        "SELECT count(*) FROM {{{{{n}}}}} a JOIN {{{{ {n} }}}} b ON a.name = b.name",
        n = x.name()
    );

    let plan = Plan::discover(&query, &[]).expect("discover");
    assert_eq!(plan.files().len(), 1);

    let mut engine = DuckDbEngine::open_in_memory().expect("open");
    let mut lines = Vec::new();
    let summary = plan
        .execute(&mut engine, &ProgramOptions::default(), |row| {
            lines.push(row.to_line());
            Ok(())
        })
        .expect("execute");

    // duplicated rows would give 4 matches
    assert_eq!(lines, vec!["2"]);
    assert_eq!(summary.loads.len(), 1);
}

#[test]
fn test_header_columns_and_row_count() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("cities.csv");
    std::fs::write(&path, "city,country\nOslo,NO\nLima,PE\nPune,IN\n").expect("write");
    let path = path.to_string_lossy().to_string();

    let plan = Plan::discover("SELECT 1", &[path.clone()]).expect("discover");
    let mut engine = DuckDbEngine::open_in_memory().expect("open");
    let summary = plan
        .execute(&mut engine, &ProgramOptions::default(), |_| Ok(()))
        .expect("execute");

    let table = &summary.loads[0].table;
    assert_eq!(table, &path.trim_end_matches(".csv"));
    assert_eq!(summary.loads[0].columns, vec!["city", "country"]);

    let lines = query_lines(&mut engine, &format!("SELECT city, country FROM \"{}\"", table));
    assert_eq!(lines, vec!["Oslo\tNO", "Lima\tPE", "Pune\tIN"]);
}

#[test]
fn test_headerless_file() {
    let data = Fixture::new("raw_", "a,1\nb,2\nc,3\n");
    let query = format!(
        "SELECT Column1, Column2 FROM {{{{{}}}}}",
        data.name()
    );
    let options = ProgramOptions::default().with_header(false);

    let lines = run_lines(&query, &[], &options).expect("run");
    assert_eq!(lines, vec!["a\t1", "b\t2", "c\t3"]);
}

#[test]
fn test_batches_against_real_engine() {
    let mut content = String::from("id\n");
    for i in 0..450 {
        content.push_str(&format!("{}\n", i));
    }
    let data = Fixture::new("many_", &content);

    let mut recorder = RecordingEngine::new();
    let plan = Plan::discover("SELECT 1", &[data.name()]).expect("discover");
    plan.execute(&mut recorder, &ProgramOptions::default(), |_| Ok(()))
        .expect("record");
    assert_eq!(recorder.statements_starting_with("INSERT").len(), 3);

    let query = format!("SELECT id FROM {{{{{}}}}}", data.name());
    let lines = run_lines(&query, &[], &ProgramOptions::default()).expect("run");
    let expected: Vec<String> = (0..450).map(|i| i.to_string()).collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_quoted_fields_load_verbatim() {
    let data = Fixture::new("quoted_", "id,text\n1,\"a, b\"\n2,\"say \"\"hi\"\"\"\n3,\"two\nlines\"\n");
    let query = format!("SELECT text FROM {{{{{}}}}} ORDER BY id", data.name());

    let lines = run_lines(&query, &[], &ProgramOptions::default()).expect("run");
    assert_eq!(lines, vec!["a, b", "say \"hi\"", "two\nlines"]);
}

#[test]
fn test_semicolon_delimiter() {
    let data = Fixture::new("semi_", "k;v\nx;1,5\n");
    let query = format!("SELECT v FROM {{{{{}}}}}", data.name());
    let options = ProgramOptions::new(";", false, true, 200).expect("options");

    let lines = run_lines(&query, &[], &options).expect("run");
    assert_eq!(lines, vec!["1,5"]);
}

#[test]
fn test_positional_file_by_table_name() {
    let data = Fixture::new("extra_", "n\n1\n2\n");
    let query = format!("SELECT count(*) FROM {}", data.table());

    let lines = run_lines(&query, &[data.name()], &ProgramOptions::default()).expect("run");
    assert_eq!(lines, vec!["2"]);
}

#[test]
fn test_keep_extension() {
    let data = Fixture::new("kept_", "n\n7\n");
    let query = format!("SELECT n FROM {{{{{}}}}}", data.name());
    let options = ProgramOptions::default().with_keep_extension(true);

    let mut engine = DuckDbEngine::open_in_memory().expect("open");
    let plan = Plan::discover(&query, &[]).expect("discover");
    let summary = plan.execute(&mut engine, &options, |_| Ok(())).expect("execute");

    assert_eq!(summary.loads[0].table, data.name());
    assert_eq!(summary.query, format!("SELECT n FROM \"{}\"", data.name()));
}

#[test]
fn test_missing_file_before_engine() {
    let dir = TempDir::new().expect("tempdir");
    let db = dir.path().join("never.db");

    let err = run(
        "SELECT * FROM {{ missing_input_file.csv }}",
        &[],
        Store::File(db.clone()),
        &ProgramOptions::default(),
        |_| Ok(()),
    )
    .unwrap_err();

    assert!(matches!(err, Error::MissingFile { ref path, .. } if path == "missing_input_file.csv"));
    assert!(!db.exists(), "the store must not be opened");
}

#[test]
fn test_missing_positional_file() {
    let err = Plan::discover("SELECT 1", &["no_such_positional.csv".to_string()]).unwrap_err();
    assert!(matches!(err, Error::MissingFile { .. }));
}

#[test]
fn test_short_row_is_statement_error() {
    let data = Fixture::new("short_", "a,b,c\n1,2,3\n4,5\n");
    let query = format!("SELECT * FROM {{{{{}}}}}", data.name());

    let err = run_lines(&query, &[], &ProgramOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Statement { .. }), "{err:?}");
}

#[test]
fn test_unknown_table_is_query_error() {
    let err = run_lines("SELECT * FROM no_table_here", &[], &ProgramOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Query { .. }));
}

#[test]
fn test_file_store_persists_tables() {
    let dir = TempDir::new().expect("tempdir");
    let db = dir.path().join("saved.db");
    let data = Fixture::new("persist_", "n\n1\n2\n3\n");

    run(
        "SELECT 1",
        &[data.name()],
        Store::File(db.clone()),
        &ProgramOptions::default(),
        |_| Ok(()),
    )
    .expect("first run");

    let mut engine = DuckDbEngine::open(Store::File(db)).expect("reopen");
    let lines = query_lines(&mut engine, &format!("SELECT count(*) FROM \"{}\"", data.table()));
    assert_eq!(lines, vec!["3"]);
}

#[test]
fn test_reload_appends_rows() {
    let data = Fixture::new("twice_", "n\n1\n");
    let options = ProgramOptions::default();
    let mut engine = DuckDbEngine::open_in_memory().expect("open");

    let plan = Plan::discover("SELECT 1", &[data.name()]).expect("discover");
    plan.load(&mut engine, &options).expect("first load");
    plan.load(&mut engine, &options).expect("second load");

    let lines = query_lines(&mut engine, &format!("SELECT count(*) FROM \"{}\"", data.table()));
    assert_eq!(lines, vec!["2"]);
}

#[test]
fn test_same_table_name_loads_both_files() {
    let dir = TempDir::new().expect("tempdir");
    let csv = dir.path().join("a.csv");
    let tsv = dir.path().join("a.tsv");
    std::fs::write(&csv, "n\n1\n").expect("write csv");
    std::fs::write(&tsv, "n\n2\n").expect("write tsv");
    let files = vec![
        csv.to_string_lossy().to_string(),
        tsv.to_string_lossy().to_string(),
    ];
    let table = dir.path().join("a").to_string_lossy().to_string();

    let plan = Plan::discover("SELECT 1", &files).expect("discover");
    let mut engine = DuckDbEngine::open_in_memory().expect("open");
    let summary = plan
        .execute(&mut engine, &ProgramOptions::default(), |_| Ok(()))
        .expect("execute");

    assert_eq!(summary.loads.len(), 2);
    assert_eq!(summary.loads[0].table, table);
    assert_eq!(summary.loads[1].table, table);

    let lines = query_lines(&mut engine, &format!("SELECT n FROM \"{}\" ORDER BY n", table));
    assert_eq!(lines, vec!["1", "2"]);
}

#[test]
fn test_trailing_delimiter_in_header() {
    let data = Fixture::new("trailing_", "a,b,\n1,2,3\n");
    let query = format!("SELECT a, Column3 FROM {{{{{}}}}}", data.name());

    let lines = run_lines(&query, &[], &ProgramOptions::default()).expect("run");
    assert_eq!(lines, vec!["1\t3"]);
}
