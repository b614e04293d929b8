use rusqlite::OptionalExtension;
use tempfile::TempDir;

use super::*;

fn memory_connection() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    ensure_schema(&connection).unwrap();
    connection
}

fn table_count(connection: &Connection, table: &str) -> i64 {
    count_rows(
        connection,
        &format!("SELECT COUNT(*) FROM {}", schema::quote_ident(table)),
    )
    .unwrap()
}

#[test]
fn ensure_schema_creates_every_registered_table() {
    let connection = memory_connection();

    for table in schema::ALL_TABLES {
        assert_eq!(table_count(&connection, table.name), 0, "{}", table.name);
    }

    let version: String = connection
        .query_row(
            "SELECT value FROM metadata WHERE key='db_schema_version'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(version, DB_SCHEMA_VERSION);
}

#[test]
fn ensure_schema_is_idempotent() {
    let connection = memory_connection();
    ensure_schema(&connection).unwrap();

    let tables = count_rows(
        &connection,
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )
    .unwrap();
    assert_eq!(tables as usize, schema::ALL_TABLES.len() + 1);
}

#[test]
fn ensure_indexes_creates_every_declared_index() {
    let connection = memory_connection();
    ensure_indexes(&connection).unwrap();

    for table in schema::ALL_TABLES {
        for index in table.indexes {
            let found: i64 = connection
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?1",
                    [index.name],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(found, 1, "{} missing", index.name);
        }
    }

    ensure_indexes(&connection).unwrap();
}

#[test]
fn import_reads_bom_and_trims_headers_and_cells() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("JCR2024-UTF8.csv");
    fs::write(
        &csv_path,
        "\u{feff} Journal ,ISSN,eISSN,Category,IF(2024),IF Quartile(2024),IF Rank(2024)\n \
         Nature , 0028-0836 ,1476-4687, MULTIDISCIPLINARY SCIENCES ,64.8,Q1,1/134\n",
    )
    .unwrap();

    let mut connection = memory_connection();
    let imported = import_csv(&mut connection, &csv_path, &schema::JCR2024).unwrap();
    assert_eq!(imported, Some(1));

    let journal: String = connection
        .query_row("SELECT Journal FROM JCR2024", [], |row| row.get(0))
        .unwrap();
    assert_eq!(journal, "Nature");

    let category: String = connection
        .query_row("SELECT Category FROM JCR2024", [], |row| row.get(0))
        .unwrap();
    assert_eq!(category, "MULTIDISCIPLINARY SCIENCES");

    let impact: f64 = connection
        .query_row("SELECT \"IF(2024)\" FROM JCR2024", [], |row| row.get(0))
        .unwrap();
    assert!((impact - 64.8).abs() < 1e-9);
}

#[test]
fn import_nulls_whitespace_only_cells() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("JCR2024-UTF8.csv");
    fs::write(
        &csv_path,
        "Journal,ISSN,eISSN,Category,IF(2024),IF Quartile(2024),IF Rank(2024)\n\
         Science,   ,1095-9203,,,Q1,\n",
    )
    .unwrap();

    let mut connection = memory_connection();
    import_csv(&mut connection, &csv_path, &schema::JCR2024).unwrap();

    let (issn, category, rank): (Option<String>, Option<String>, Option<String>) = connection
        .query_row(
            "SELECT ISSN, Category, \"IF Rank(2024)\" FROM JCR2024",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(issn, None);
    assert_eq!(category, None);
    assert_eq!(rank, None);
}

#[test]
fn import_missing_file_is_skipped() {
    let mut connection = memory_connection();
    let outcome = import_csv(
        &mut connection,
        Path::new("no-such-dir/JCR2020-UTF8.csv"),
        &schema::JCR2020,
    )
    .unwrap();

    assert_eq!(outcome, None);
    assert_eq!(table_count(&connection, "JCR2020"), 0);
}

#[test]
fn import_header_only_file_counts_zero() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("JCR2020-UTF8.csv");
    fs::write(&csv_path, "Journal,IF (2020)\n").unwrap();

    let mut connection = memory_connection();
    let outcome = import_csv(&mut connection, &csv_path, &schema::JCR2020).unwrap();

    assert_eq!(outcome, Some(0));
    assert_eq!(table_count(&connection, "JCR2020"), 0);
}

#[test]
fn reimport_leaves_row_count_unchanged() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("JCR2021-UTF8.csv");
    fs::write(
        &csv_path,
        "Journal,IF(2021)\nNature,69.5\nScience,63.8\n",
    )
    .unwrap();

    let mut connection = memory_connection();
    assert_eq!(
        import_csv(&mut connection, &csv_path, &schema::JCR2021).unwrap(),
        Some(2)
    );
    assert_eq!(
        import_csv(&mut connection, &csv_path, &schema::JCR2021).unwrap(),
        Some(2)
    );
    assert_eq!(table_count(&connection, "JCR2021"), 2);
}

#[test]
fn reimport_replaces_whole_row_on_key_conflict() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("JCR2024-UTF8.csv");
    fs::write(
        &csv_path,
        "Journal,Category,IF Rank(2024)\nNature,MULTIDISCIPLINARY SCIENCES,1/134\n",
    )
    .unwrap();

    let mut connection = memory_connection();
    import_csv(&mut connection, &csv_path, &schema::JCR2024).unwrap();

    fs::write(&csv_path, "Journal,Category,IF Rank(2024)\nNature,GENERAL,\n").unwrap();
    import_csv(&mut connection, &csv_path, &schema::JCR2024).unwrap();

    assert_eq!(table_count(&connection, "JCR2024"), 1);
    let (category, rank): (Option<String>, Option<String>) = connection
        .query_row(
            "SELECT Category, \"IF Rank(2024)\" FROM JCR2024 WHERE Journal='Nature'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(category.as_deref(), Some("GENERAL"));
    assert_eq!(rank, None);
}

#[test]
fn composite_key_keeps_same_journal_across_issns() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("FQBJCR2021-UTF8.csv");
    fs::write(
        &csv_path,
        "Journal,ISSN,大类\nCHEMICAL REVIEWS,0009-2665,化学\nCHEMICAL REVIEWS,1520-6890,化学\n",
    )
    .unwrap();

    let mut connection = memory_connection();
    assert_eq!(
        import_csv(&mut connection, &csv_path, &schema::FQBJCR2021).unwrap(),
        Some(2)
    );
    assert_eq!(table_count(&connection, "FQBJCR2021"), 2);

    import_csv(&mut connection, &csv_path, &schema::FQBJCR2021).unwrap();
    assert_eq!(table_count(&connection, "FQBJCR2021"), 2);
}

#[test]
fn composite_key_rows_without_issn_accumulate_on_reimport() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("FQBJCR2021-UTF8.csv");
    fs::write(&csv_path, "Journal,ISSN,大类\nANNALEN DER PHYSIK,,物理\n").unwrap();

    let mut connection = memory_connection();
    import_csv(&mut connection, &csv_path, &schema::FQBJCR2021).unwrap();
    import_csv(&mut connection, &csv_path, &schema::FQBJCR2021).unwrap();

    // UNIQUE never matches NULL against NULL, so a row with no ISSN inserts
    // fresh on every import instead of replacing its predecessor
    assert_eq!(table_count(&connection, "FQBJCR2021"), 2);
}

#[test]
fn normalize_cell_trims_and_nulls_empties() {
    assert_eq!(normalize_cell("  Nature  "), Value::Text("Nature".into()));
    assert_eq!(
        normalize_cell("Web of Science"),
        Value::Text("Web of Science".into())
    );
    assert_eq!(normalize_cell(""), Value::Null);
    assert_eq!(normalize_cell("   "), Value::Null);
}

#[test]
fn strip_utf8_bom_only_removes_a_leading_marker() {
    assert_eq!(strip_utf8_bom(b"\xef\xbb\xbfJournal"), b"Journal");
    assert_eq!(strip_utf8_bom(b"Journal"), b"Journal");
    assert_eq!(strip_utf8_bom(b"\xef\xbb\xbf"), b"");
}

#[test]
fn rotate_backs_up_then_removes_the_live_file() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jcr.db");
    fs::write(&db_path, b"previous database contents").unwrap();

    let backup = rotate_existing_database(&db_path).unwrap().unwrap();

    assert_eq!(backup, dir.path().join("jcr.db.backup"));
    assert!(!db_path.exists());
    assert_eq!(fs::read(&backup).unwrap(), b"previous database contents");
}

#[test]
fn rotate_removes_stale_wal_sidecars() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jcr.db");
    fs::write(&db_path, b"main database file").unwrap();
    fs::write(dir.path().join("jcr.db-wal"), b"stale wal").unwrap();
    fs::write(dir.path().join("jcr.db-shm"), b"stale shm").unwrap();

    let backup = rotate_existing_database(&db_path).unwrap().unwrap();

    assert_eq!(fs::read(&backup).unwrap(), b"main database file");
    assert!(!db_path.exists());
    assert!(!dir.path().join("jcr.db-wal").exists());
    assert!(!dir.path().join("jcr.db-shm").exists());
}

#[test]
fn rotate_without_existing_database_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jcr.db");

    assert_eq!(rotate_existing_database(&db_path).unwrap(), None);
    assert!(!dir.path().join("jcr.db.backup").exists());
}

#[test]
fn run_fails_without_source_directory() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jcr.db");
    let args = RebuildArgs {
        csv_dir: dir.path().join("missing"),
        db_path: db_path.clone(),
    };

    let err = run(args).unwrap_err();
    assert!(err.to_string().contains("source directory not found"));
    assert!(!db_path.exists());
}

#[test]
fn run_with_partial_sources_creates_every_table() {
    let dir = TempDir::new().unwrap();
    let csv_dir = dir.path().join("jcr_mate");
    fs::create_dir_all(&csv_dir).unwrap();
    fs::write(
        csv_dir.join("JCR2024-UTF8.csv"),
        "\u{feff}Journal,ISSN,eISSN,Category,IF(2024),IF Quartile(2024),IF Rank(2024)\n\
         Nature,0028-0836,1476-4687,MULTIDISCIPLINARY SCIENCES,64.8,Q1,1/134\n\
         Science,0036-8075,1095-9203,MULTIDISCIPLINARY SCIENCES,56.9,Q1,2/134\n",
    )
    .unwrap();
    fs::write(
        csv_dir.join("GJQKYJMD2024.csv"),
        "\u{feff}Journal,预警原因（2024）\nBAD JOURNAL,批量论文工厂\n",
    )
    .unwrap();

    let db_path = dir.path().join("data").join("jcr.db");
    run(RebuildArgs {
        csv_dir,
        db_path: db_path.clone(),
    })
    .unwrap();

    let connection = Connection::open(&db_path).unwrap();
    let mut total = 0_i64;
    for table in schema::ALL_TABLES {
        total += table_count(&connection, table.name);
    }
    assert_eq!(total, 3);
    assert_eq!(table_count(&connection, "JCR2024"), 2);
    assert_eq!(table_count(&connection, "GJQKYJMD2024"), 1);
    assert_eq!(table_count(&connection, "FQBJCR2025"), 0);

    let indexed: i64 = connection
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_jcr2024_journal'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(indexed, 1);

    let digest: Option<String> = connection
        .query_row(
            "SELECT value FROM metadata WHERE key='source_sha256:JCR2024-UTF8.csv'",
            [],
            |row| row.get(0),
        )
        .optional()
        .unwrap();
    assert!(digest.is_some());

    let absent: Option<String> = connection
        .query_row(
            "SELECT value FROM metadata WHERE key='source_sha256:JCR2020-UTF8.csv'",
            [],
            |row| row.get(0),
        )
        .optional()
        .unwrap();
    assert_eq!(absent, None);
}

#[test]
fn run_backs_up_previous_database_byte_for_byte() {
    let dir = TempDir::new().unwrap();
    let csv_dir = dir.path().join("jcr_mate");
    fs::create_dir_all(&csv_dir).unwrap();
    fs::write(
        csv_dir.join("GJQKYJMD2020.csv"),
        "Journal,预警等级（2020）\nBAD JOURNAL,高\n",
    )
    .unwrap();

    let db_path = dir.path().join("jcr.db");
    let args = RebuildArgs {
        csv_dir,
        db_path: db_path.clone(),
    };

    run(args.clone()).unwrap();
    let first_build = fs::read(&db_path).unwrap();

    run(args).unwrap();
    let backup_path = dir.path().join("jcr.db.backup");
    assert_eq!(fs::read(&backup_path).unwrap(), first_build);

    let connection = Connection::open(&db_path).unwrap();
    assert_eq!(table_count(&connection, "GJQKYJMD2020"), 1);
}
