use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use super::{ConnectionConfig, DatabaseConnector, DatabaseEngine};
use crate::db::schema::{ColumnInfo, QueryResult, Row, SchemaInfo, TableInfo};
use crate::error::{ConnectionError, ExecutionError, SchemaError};

/// PostgreSQL connector using tokio-postgres
pub struct PostgresConnector {
    config: ConnectionConfig,
    client: Option<Client>,
    io_task: Option<JoinHandle<()>>,
}

impl PostgresConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            client: None,
            io_task: None,
        }
    }

    fn client(&self) -> Option<&Client> {
        self.client.as_ref().filter(|c| !c.is_closed())
    }
}

#[async_trait]
impl DatabaseConnector for PostgresConnector {
    async fn connect(&mut self) -> Result<(), ConnectionError> {
        self.config.validate()?;

        let mut pg = tokio_postgres::Config::new();
        pg.host(self.config.host.as_deref().unwrap_or_default())
            .port(self.config.port.unwrap_or(5432))
            .user(self.config.username.as_deref().unwrap_or_default())
            .dbname(self.config.database.as_deref().unwrap_or_default())
            .connect_timeout(Duration::from_secs(self.config.connection_timeout_secs));
        if let Some(password) = &self.config.password {
            pg.password(password);
        }

        let (client, connection) = pg.connect(NoTls).await?;
        // The connection future drives socket I/O and must be polled for
        // the lifetime of the client.
        let io_task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::warn!("postgres connection error: {}", e);
            }
        });

        log::info!(
            "connected to postgres database {}",
            self.config.database.as_deref().unwrap_or_default()
        );
        self.client = Some(client);
        self.io_task = Some(io_task);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ConnectionError> {
        if self.client.take().is_some() {
            log::info!("disconnected from postgres database");
        }
        if let Some(task) = self.io_task.take() {
            task.abort();
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.client().is_some()
    }

    async fn get_schema(&self) -> Result<SchemaInfo, SchemaError> {
        let client = self.client().ok_or(SchemaError::NotConnected)?;

        let table_rows = client
            .query(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
                 ORDER BY table_name",
                &[],
            )
            .await?;

        let mut tables = Vec::with_capacity(table_rows.len());
        for table_row in &table_rows {
            let name: String = table_row.get(0);

            let pk_rows = client
                .query(
                    "SELECT kcu.column_name \
                     FROM information_schema.table_constraints tc \
                     JOIN information_schema.key_column_usage kcu \
                       ON tc.constraint_name = kcu.constraint_name \
                      AND tc.table_schema = kcu.table_schema \
                     WHERE tc.table_schema = 'public' \
                       AND tc.table_name = $1 \
                       AND tc.constraint_type = 'PRIMARY KEY'",
                    &[&name],
                )
                .await?;
            let pk_columns: Vec<String> = pk_rows.iter().map(|r| r.get(0)).collect();

            let column_rows = client
                .query(
                    "SELECT column_name, data_type, is_nullable, column_default \
                     FROM information_schema.columns \
                     WHERE table_schema = 'public' AND table_name = $1 \
                     ORDER BY ordinal_position",
                    &[&name],
                )
                .await?;

            let columns = column_rows
                .iter()
                .map(|row| {
                    let column_name: String = row.get(0);
                    let is_nullable: String = row.get(2);
                    let default_value: Option<String> = row.get(3);
                    // Serial columns show up as nextval() defaults.
                    let is_auto_increment = default_value
                        .as_deref()
                        .map_or(false, |d| d.starts_with("nextval("));
                    ColumnInfo {
                        is_primary_key: pk_columns.contains(&column_name),
                        name: column_name,
                        data_type: row.get(1),
                        is_nullable: is_nullable == "YES",
                        default_value,
                        is_auto_increment,
                    }
                })
                .collect();

            tables.push(TableInfo { name, columns });
        }

        Ok(SchemaInfo {
            database_name: self.config.database.clone().unwrap_or_default(),
            tables,
        })
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult, ExecutionError> {
        let client = self.client().ok_or(ExecutionError::NotConnected)?;

        // simple_query hands every value back as text, which is exactly
        // what a chat transcript needs and sidesteps per-type decoding of
        // arbitrary generated SQL.
        let messages = client.simple_query(sql).await?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        let mut rows_affected = 0;
        for message in messages {
            match message {
                SimpleQueryMessage::Row(row) => {
                    if columns.is_empty() {
                        columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                    }
                    let mut record = Row::new();
                    for (i, col) in columns.iter().enumerate() {
                        let value = match row.try_get(i)? {
                            Some(text) => serde_json::Value::String(text.to_string()),
                            None => serde_json::Value::Null,
                        };
                        record.insert(col.clone(), value);
                    }
                    rows.push(record);
                }
                SimpleQueryMessage::CommandComplete(n) => rows_affected += n,
                _ => {}
            }
        }

        Ok(QueryResult {
            columns,
            rows,
            rows_affected,
        })
    }

    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::PostgreSql
    }
}
