use std::path::Path;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use tokio::sync::Mutex;

use super::{ConnectionConfig, DatabaseConnector, DatabaseEngine};
use crate::db::schema::{ColumnInfo, QueryResult, Row, SchemaInfo, TableInfo};
use crate::error::{ConnectionError, ExecutionError, SchemaError};

/// SQLite connector using rusqlite
pub struct SqliteConnector {
    config: ConnectionConfig,
    conn: Option<Mutex<rusqlite::Connection>>,
}

impl SqliteConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config, conn: None }
    }

    fn database_name(&self) -> String {
        self.config
            .file_path
            .as_deref()
            .map(Path::new)
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DatabaseConnector for SqliteConnector {
    async fn connect(&mut self) -> Result<(), ConnectionError> {
        self.config.validate()?;
        let path = self.config.file_path.as_deref().unwrap_or_default();
        let conn = rusqlite::Connection::open(path)?;
        log::info!("connected to sqlite database at {}", path);
        self.conn = Some(Mutex::new(conn));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ConnectionError> {
        if self.conn.take().is_some() {
            log::info!("disconnected from sqlite database");
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn get_schema(&self) -> Result<SchemaInfo, SchemaError> {
        let conn = self.conn.as_ref().ok_or(SchemaError::NotConnected)?;
        let conn = conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let table_names: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        let mut tables = Vec::with_capacity(table_names.len());
        for name in table_names {
            // PRAGMA table_info does not accept bound parameters; the name
            // comes straight out of sqlite_master so quoting it is enough.
            let mut stmt =
                conn.prepare(&format!("PRAGMA table_info(\"{}\")", name.replace('"', "\"\"")))?;
            let columns: Vec<ColumnInfo> = stmt
                .query_map([], |row| {
                    Ok(ColumnInfo {
                        name: row.get::<_, String>("name")?,
                        data_type: row.get::<_, String>("type")?,
                        is_nullable: !row.get::<_, bool>("notnull")?,
                        is_primary_key: row.get::<_, i32>("pk")? > 0,
                        default_value: row.get::<_, Option<String>>("dflt_value")?,
                        is_auto_increment: false,
                    })
                })?
                .collect::<Result<_, _>>()?;
            tables.push(TableInfo { name, columns });
        }

        Ok(SchemaInfo {
            database_name: self.database_name(),
            tables,
        })
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult, ExecutionError> {
        let conn = self.conn.as_ref().ok_or(ExecutionError::NotConnected)?;
        let conn = conn.lock().await;

        let mut stmt = conn.prepare(sql)?;
        if stmt.column_count() == 0 {
            let affected = stmt.execute([])?;
            return Ok(QueryResult {
                columns: vec![],
                rows: vec![],
                rows_affected: affected as u64,
            });
        }

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut out = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (i, col) in columns.iter().enumerate() {
                let value = match row.get_ref(i)? {
                    ValueRef::Null => serde_json::Value::Null,
                    ValueRef::Integer(n) => serde_json::json!(n),
                    ValueRef::Real(f) => serde_json::json!(f),
                    ValueRef::Text(t) => {
                        serde_json::Value::String(String::from_utf8_lossy(t).into_owned())
                    }
                    ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
                };
                record.insert(col.clone(), value);
            }
            out.push(record);
        }

        Ok(QueryResult {
            columns,
            rows: out,
            rows_affected: 0,
        })
    }

    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Sqlite
    }
}
