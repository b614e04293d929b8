use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{DatabaseStatus, TableRowCount};
use crate::schema;
use crate::util::megabytes;


pub fn run(args: StatusArgs) -> Result<()> {
    if !args.db_path.exists() {
        warn!(
            path = %args.db_path.display(),
            "database file missing, run a rebuild first"
        );
        return Ok(());
    }

    let status = collect_status(&args.db_path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    info!(
        path = %status.db_path,
        schema_version = status.schema_version.as_deref().unwrap_or("unknown"),
        updated_at = status.updated_at.as_deref().unwrap_or("unknown"),
        "database metadata"
    );

    for entry in &status.tables {
        info!(table = %entry.table, rows = entry.rows, "table rows");
    }

    let size_mb = format!("{:.2}", megabytes(status.file_size_bytes));
    info!(
        tables = status.table_count,
        rows = status.total_rows,
        size_mb = %size_mb,
        "database status"
    );

    Ok(())
}

fn collect_status(db_path: &Path) -> Result<DatabaseStatus> {
    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    let schema_version = metadata_value(&connection, "db_schema_version").unwrap_or(None);
    let updated_at = metadata_value(&connection, "db_updated_at").unwrap_or(None);

    let mut tables = Vec::new();
    let mut total_rows = 0_i64;
    for name in schema::table_names() {
        let sql = format!("SELECT COUNT(*) FROM {}", schema::quote_ident(name));
        let rows = query_count(&connection, &sql).unwrap_or(0);
        total_rows += rows;
        tables.push(TableRowCount {
            table: name.to_string(),
            rows,
        });
    }

    let file_size = fs::metadata(db_path)
        .with_context(|| format!("failed to stat {}", db_path.display()))?
        .len();

    Ok(DatabaseStatus {
        db_path: db_path.display().to_string(),
        schema_version,
        updated_at,
        table_count: tables.len(),
        total_rows,
        file_size_bytes: file_size,
        tables,
    })
}

fn metadata_value(connection: &Connection, key: &str) -> Result<Option<String>> {
    connection
        .query_row("SELECT value FROM metadata WHERE key=?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .with_context(|| format!("failed to read metadata key {key}"))
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
