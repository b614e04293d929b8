use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use tracing::{info, warn};

use crate::cli::RebuildArgs;
use crate::schema::{self, TableSchema};
use crate::util::{ensure_directory, megabytes, now_utc_string, sha256_file};

#[cfg(test)]
mod tests;

const DB_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Default)]
struct RebuildStats {
    total_rows: usize,
    imported_sources: usize,
    missing_sources: usize,
}

pub fn run(args: RebuildArgs) -> Result<()> {
    info!(
        csv_dir = %args.csv_dir.display(),
        db_path = %args.db_path.display(),
        "starting rebuild"
    );

    if !args.csv_dir.is_dir() {
        bail!("source directory not found: {}", args.csv_dir.display());
    }

    let backup_path = rotate_existing_database(&args.db_path)?;
    if let Some(parent) = args.db_path.parent() {
        ensure_directory(parent)?;
    }

    let mut connection = Connection::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;

    let stats = import_all_sources(&mut connection, &args.csv_dir)?;
    ensure_indexes(&connection)?;

    let table_count = count_rows(
        &connection,
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
    )?;

    drop(connection);

    let file_size = fs::metadata(&args.db_path)
        .with_context(|| format!("failed to stat {}", args.db_path.display()))?
        .len();
    let size_mb = format!("{:.2}", megabytes(file_size));

    if let Some(backup) = &backup_path {
        info!(backup = %backup.display(), "previous database preserved");
    }
    info!(
        tables = table_count,
        rows = stats.total_rows,
        imported = stats.imported_sources,
        missing = stats.missing_sources,
        size_mb = %size_mb,
        "rebuild completed"
    );

    Ok(())
}

/// Copies an existing database to a `.backup` sibling, then removes the live
/// file together with any leftover `-wal`/`-shm` sidecars, which would
/// otherwise be replayed into the next database created at the same path.
fn rotate_existing_database(db_path: &Path) -> Result<Option<PathBuf>> {
    if !db_path.exists() {
        return Ok(None);
    }

    let backup_path = sibling_with_suffix(db_path, ".backup");
    fs::copy(db_path, &backup_path).with_context(|| {
        format!(
            "failed to back up {} to {}",
            db_path.display(),
            backup_path.display()
        )
    })?;
    fs::remove_file(db_path)
        .with_context(|| format!("failed to remove {}", db_path.display()))?;

    for suffix in ["-wal", "-shm"] {
        let sidecar = sibling_with_suffix(db_path, suffix);
        if sidecar.exists() {
            fs::remove_file(&sidecar)
                .with_context(|| format!("failed to remove {}", sidecar.display()))?;
        }
    }

    info!(backup = %backup_path.display(), "backed up previous database");
    Ok(Some(backup_path))
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );
        ",
    )?;

    for table in schema::ALL_TABLES {
        connection
            .execute(&schema::create_table_sql(table), [])
            .with_context(|| format!("failed to create table {}", table.name))?;
    }

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    info!(tables = schema::ALL_TABLES.len(), "schema ready");
    Ok(())
}

fn ensure_indexes(connection: &Connection) -> Result<()> {
    let mut created = 0_usize;
    for table in schema::ALL_TABLES {
        for index in table.indexes {
            connection
                .execute(&schema::create_index_sql(table, index), [])
                .with_context(|| format!("failed to create index {}", index.name))?;
            created += 1;
        }
    }

    info!(indexes = created, "indexes ready");
    Ok(())
}

fn import_all_sources(connection: &mut Connection, csv_dir: &Path) -> Result<RebuildStats> {
    let mut stats = RebuildStats::default();

    for table in schema::ALL_TABLES {
        let csv_path = csv_dir.join(table.source_file);
        match import_csv(connection, &csv_path, table)? {
            Some(rows) => {
                record_source_digest(connection, table, &csv_path)?;
                info!(table = table.name, rows, "imported");
                stats.total_rows += rows;
                stats.imported_sources += 1;
            }
            None => {
                stats.missing_sources += 1;
            }
        }
    }

    Ok(stats)
}

/// Imports one CSV file into its table. `None` means the file does not
/// exist; `Some(0)` means it had a header but no data rows. Both leave the
/// table empty without failing the run. The insert column list comes from
/// the file's own header, so a source carrying only a subset of the table's
/// columns still loads.
fn import_csv(
    connection: &mut Connection,
    csv_path: &Path,
    table: &TableSchema,
) -> Result<Option<usize>> {
    if !csv_path.exists() {
        warn!(
            table = table.name,
            path = %csv_path.display(),
            "source file missing, table left empty"
        );
        return Ok(None);
    }

    let raw =
        fs::read(csv_path).with_context(|| format!("failed to read {}", csv_path.display()))?;
    let data = strip_utf8_bom(&raw);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .with_context(|| format!("failed to parse header of {}", csv_path.display()))?
        .clone();

    let mut records = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("failed to parse {}", csv_path.display()))?;
        records.push(record);
    }

    if records.is_empty() {
        warn!(
            table = table.name,
            path = %csv_path.display(),
            "source file has no data rows"
        );
        return Ok(Some(0));
    }

    let column_list = headers
        .iter()
        .map(schema::quote_ident)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=headers.len())
        .map(|position| format!("?{position}"))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_sql = format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        schema::quote_ident(table.name),
        column_list,
        placeholders
    );

    let tx = connection.transaction()?;
    {
        let mut statement = tx
            .prepare(&insert_sql)
            .with_context(|| format!("failed to prepare insert for {}", table.name))?;

        for record in &records {
            let values: Vec<Value> = record.iter().map(normalize_cell).collect();
            statement
                .execute(params_from_iter(values))
                .with_context(|| format!("failed to insert row into {}", table.name))?;
        }
    }
    tx.commit()
        .with_context(|| format!("failed to commit import into {}", table.name))?;

    Ok(Some(records.len()))
}

fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data)
}

fn normalize_cell(value: &str) -> Value {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Value::Null
    } else {
        Value::Text(trimmed.to_string())
    }
}

fn record_source_digest(
    connection: &Connection,
    table: &TableSchema,
    csv_path: &Path,
) -> Result<()> {
    let digest = sha256_file(csv_path)?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![format!("source_sha256:{}", table.source_file), digest],
    )?;
    Ok(())
}

fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    connection
        .query_row(sql, [], |row| row.get(0))
        .with_context(|| format!("failed to count rows: {sql}"))
}
