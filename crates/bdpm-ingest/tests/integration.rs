//! End-to-end tests: latin-1 fixture extracts in a temp dir, full rebuild,
//! assertions through a separate DuckDB connection.

use std::path::Path;

use bdpm_core::ProgressContext;
use bdpm_ingest::{
    EXTRACTS, IngestConfig, IngestError, Pipeline, PipelineState, TableOutcome, index_names, run,
    table_rows,
};
use duckdb::Connection;
use tempfile::TempDir;

/// Encode test text as latin-1 bytes (all fixture chars are < U+0100).
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).expect("non latin-1 char in fixture"))
        .collect()
}

fn write_extract(dir: &Path, file: &str, lines: &[&str]) {
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(dir.join(file), latin1(&content)).unwrap();
}

fn write_medicaments(dir: &Path, rows: usize) {
    let lines: Vec<String> = (0..rows)
        .map(|i| {
            format!(
                "6000{i}\tLévothyroxine sodique {i} µg, comprimé sécable\tcomprimé sécable\torale\t\
                 Autorisation active\tProcédure nationale\tCommercialisée\t12/03/2010\t\t\t \
                 Laboratoire Génévrier \tNon"
            )
        })
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_extract(dir, "CIS_bdpm.txt", &refs);
}

fn write_presentations(dir: &Path) {
    write_extract(
        dir,
        "CIS_CIP_bdpm.txt",
        &[
            "60000\t3400001\tplaquette(s) de 30 comprimé(s)\tPrésentation active\t\
             Déclaration de commercialisation\t01/01/2011\t3400930000001\toui\t65%\t2,18\t1,02\t3,20\t",
            "60001\t3400002\tflacon\tPrésentation active\t\
             Déclaration de commercialisation\t01/01/2011\t3400930000002\tnon\t\tNC\t\t\t",
            // orphan: no such product
            "99999\t3400003\tboîte\tPrésentation active\t\
             Déclaration de commercialisation\t01/01/2011\t3400930000003\toui\t100 %\t12,34 EUR\t\t\t",
        ],
    );
}

fn write_compositions(dir: &Path) {
    write_extract(
        dir,
        "CIS_COMPO_bdpm.txt",
        &[
            "60000\tLévothyroxine sodique\t25 µg\tun comprimé\tSA\t1",
            "60001\tLévothyroxine sodique\t50 µg\tun comprimé\tSA\t1",
        ],
    );
}

fn write_conditions(dir: &Path) {
    write_extract(
        dir,
        "CIS_CPD_bdpm.txt",
        &["60000\tliste II", "60001\tréservé à l'usage hospitalier"],
    );
}

fn write_generiques(dir: &Path) {
    write_extract(
        dir,
        "CIS_GENER_bdpm.txt",
        &["Lévothyroxine 25 µg - Lévothyrox\t60000", "generic\t60001"],
    );
}

fn write_all(dir: &Path) {
    write_medicaments(dir, 2);
    write_presentations(dir);
    write_compositions(dir);
    write_conditions(dir);
    write_generiques(dir);
}

fn config(tmp: &TempDir) -> IngestConfig {
    let data_dir = tmp.path().join("files");
    std::fs::create_dir_all(&data_dir).unwrap();
    IngestConfig {
        data_dir,
        db_path: tmp.path().join("store").join("bdpm.duckdb"),
        ..Default::default()
    }
}

fn rows(conn: &Connection, table: &str) -> Option<usize> {
    table_rows(conn, table).unwrap()
}

#[test]
fn full_run_loads_every_table() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_all(&config.data_dir);

    let summary = run(&config, &ProgressContext::hidden()).expect("pipeline should succeed");
    assert_eq!(summary.final_state, PipelineState::Closed);
    assert_eq!(summary.skipped().count(), 0);
    assert_eq!(summary.indexes_created, 3);
    assert!(summary.index_failures.is_empty());
    assert_eq!(summary.table("presentations").unwrap().rows(), 3);

    let conn = Connection::open(&config.db_path).unwrap();
    assert_eq!(rows(&conn, "medicaments"), Some(2));
    assert_eq!(rows(&conn, "presentations"), Some(3));
    assert_eq!(rows(&conn, "compositions"), Some(2));
    assert_eq!(rows(&conn, "conditions_prescription"), Some(2));
    assert_eq!(rows(&conn, "generiques"), Some(2));
}

#[test]
fn text_is_normalized_at_load() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_all(&config.data_dir);
    run(&config, &ProgressContext::hidden()).unwrap();

    let conn = Connection::open(&config.db_path).unwrap();
    let (denomination, titulaire, statut_bdm): (String, String, Option<String>) = conn
        .query_row(
            "SELECT DENOMINATION, TITULAIRES, STATUT_BDM FROM medicaments WHERE CIS = '60000'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(denomination, "LEVOTHYROXINE SODIQUE 0 ΜG, COMPRIME SECABLE");
    assert_eq!(titulaire, "LABORATOIRE GENEVRIER");
    assert_eq!(statut_bdm, None);

    let condition: String = conn
        .query_row(
            "SELECT \"CONDITION\" FROM conditions_prescription WHERE CIS = '60001'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(condition, "RESERVE A L'USAGE HOSPITALIER");

    // stored exactly as normalized, no reclassification
    let generic: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM generiques WHERE DENOMINATION_GEN = 'GENERIC'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(generic, 1);
}

#[test]
fn presentation_numbers_are_coerced() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_all(&config.data_dir);
    run(&config, &ProgressContext::hidden()).unwrap();

    let conn = Connection::open(&config.db_path).unwrap();
    let mut stmt = conn
        .prepare("SELECT CIS, PRIX, REMBOURSEMENT, PRIX_HONO FROM presentations ORDER BY CIS")
        .unwrap();
    let got: Vec<(String, Option<f64>, Option<i64>, Option<String>)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        got,
        vec![
            ("60000".into(), Some(2.18), Some(65), Some("3,20".into())),
            ("60001".into(), None, None, None),
            ("99999".into(), Some(12.34), Some(100), None),
        ]
    );
}

#[test]
fn orphan_presentations_survive_left_join() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_all(&config.data_dir);
    run(&config, &ProgressContext::hidden()).unwrap();

    let conn = Connection::open(&config.db_path).unwrap();
    let unmatched: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM presentations p \
             LEFT JOIN medicaments m ON p.CIS = m.CIS WHERE m.CIS IS NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(unmatched, 1);
}

#[test]
fn malformed_line_is_dropped_not_padded() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_all(&config.data_dir);
    write_extract(
        &config.data_dir,
        "CIS_CPD_bdpm.txt",
        &["60000\tliste I", "60001"],
    );

    let summary = run(&config, &ProgressContext::hidden()).unwrap();
    let report = summary.table("conditions_prescription").unwrap();
    match &report.outcome {
        TableOutcome::Loaded { rows, stats } => {
            assert_eq!(*rows, 1);
            assert_eq!(stats.malformed, 1);
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let conn = Connection::open(&config.db_path).unwrap();
    assert_eq!(rows(&conn, "conditions_prescription"), Some(1));
}

#[test]
fn missing_extract_skips_only_that_table() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_medicaments(&config.data_dir, 2);
    write_presentations(&config.data_dir);
    write_conditions(&config.data_dir);
    write_generiques(&config.data_dir);

    let summary = run(&config, &ProgressContext::hidden()).expect("missing file is not fatal");
    assert_eq!(summary.final_state, PipelineState::Closed);
    let skipped: Vec<_> = summary.skipped().map(|t| t.table).collect();
    assert_eq!(skipped, vec!["compositions"]);
    assert_eq!(summary.indexes_created, 2);
    assert_eq!(summary.index_failures.len(), 1);
    assert_eq!(summary.index_failures[0].index, "idx_substance");

    let conn = Connection::open(&config.db_path).unwrap();
    assert_eq!(rows(&conn, "medicaments"), Some(2));
    assert_eq!(rows(&conn, "presentations"), Some(3));
    assert_eq!(rows(&conn, "compositions"), None);
}

#[test]
fn store_write_failure_names_table_and_keeps_earlier_tables() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_all(&config.data_dir);

    let mut pipeline = Pipeline::open(&config).unwrap();
    // a view under the target name makes DROP TABLE fail
    pipeline
        .connection()
        .execute_batch("CREATE VIEW generiques AS SELECT 1 AS x")
        .unwrap();

    let progress = ProgressContext::hidden();
    let (last, earlier) = EXTRACTS.split_last().unwrap();
    for spec in earlier {
        pipeline.process_table(spec, &progress).unwrap();
    }
    match pipeline.process_table(last, &progress) {
        Err(IngestError::StoreWrite { table, .. }) => assert_eq!(table, "generiques"),
        Err(e) => panic!("unexpected error {e}"),
        Ok(report) => panic!("load should fail, got {report:?}"),
    }

    assert_eq!(rows(pipeline.connection(), "medicaments"), Some(2));
    assert_eq!(rows(pipeline.connection(), "conditions_prescription"), Some(2));
}

#[test]
fn rerun_reflects_only_latest_sources() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_all(&config.data_dir);
    write_medicaments(&config.data_dir, 5);
    run(&config, &ProgressContext::hidden()).unwrap();

    write_medicaments(&config.data_dir, 3);
    std::fs::remove_file(config.data_dir.join("CIS_GENER_bdpm.txt")).unwrap();
    run(&config, &ProgressContext::hidden()).unwrap();

    let conn = Connection::open(&config.db_path).unwrap();
    assert_eq!(rows(&conn, "medicaments"), Some(3));
    // table from the first run does not linger
    assert_eq!(rows(&conn, "generiques"), None);
}

#[test]
fn stale_store_file_is_replaced() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_all(&config.data_dir);
    std::fs::create_dir_all(config.db_path.parent().unwrap()).unwrap();
    std::fs::write(&config.db_path, b"not a database").unwrap();

    run(&config, &ProgressContext::hidden()).expect("old file must be discarded");
    let conn = Connection::open(&config.db_path).unwrap();
    assert_eq!(rows(&conn, "medicaments"), Some(2));
}

#[test]
fn indexes_exist_after_run() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    write_all(&config.data_dir);
    run(&config, &ProgressContext::hidden()).unwrap();

    let conn = Connection::open(&config.db_path).unwrap();
    assert_eq!(index_names(&conn, "medicaments").unwrap(), vec!["idx_cis_med"]);
    assert_eq!(index_names(&conn, "presentations").unwrap(), vec!["idx_cis_pres"]);
    assert_eq!(index_names(&conn, "compositions").unwrap(), vec!["idx_substance"]);
}
