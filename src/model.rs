use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TableRowCount {
    pub table: String,
    pub rows: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub db_path: String,
    pub schema_version: Option<String>,
    pub updated_at: Option<String>,
    pub table_count: usize,
    pub total_rows: i64,
    pub file_size_bytes: u64,
    pub tables: Vec<TableRowCount>,
}
