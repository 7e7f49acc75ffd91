use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{OptsBuilder, Pool, Value};

use super::{ConnectionConfig, DatabaseConnector, DatabaseEngine};
use crate::db::schema::{ColumnInfo, QueryResult, Row, SchemaInfo, TableInfo};
use crate::error::{ConnectionError, ExecutionError, SchemaError};

/// MySQL/MariaDB connector using mysql_async
pub struct MySqlConnector {
    config: ConnectionConfig,
    pool: Option<Pool>,
}

impl MySqlConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config, pool: None }
    }
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::NULL => serde_json::Value::Null,
        Value::Bytes(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
        Value::Int(n) => serde_json::json!(n),
        Value::UInt(n) => serde_json::json!(n),
        Value::Float(f) => serde_json::json!(f),
        Value::Double(d) => serde_json::json!(d),
        Value::Date(year, month, day, hour, minute, second, _micros) => {
            serde_json::Value::String(format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ))
        }
        Value::Time(negative, days, hours, minutes, seconds, _micros) => {
            let sign = if *negative { "-" } else { "" };
            serde_json::Value::String(format!(
                "{}{:02}:{:02}:{:02}",
                sign,
                u32::from(*days) * 24 + u32::from(*hours),
                minutes,
                seconds
            ))
        }
    }
}

#[async_trait]
impl DatabaseConnector for MySqlConnector {
    async fn connect(&mut self) -> Result<(), ConnectionError> {
        self.config.validate()?;

        let opts = OptsBuilder::default()
            .ip_or_hostname(self.config.host.clone().unwrap_or_default())
            .tcp_port(self.config.port.unwrap_or(3306))
            .user(self.config.username.clone())
            .pass(self.config.password.clone())
            .db_name(self.config.database.clone());
        let pool = Pool::new(opts);

        // Pool construction is lazy; round-trip once so bad credentials
        // fail here instead of on the first question.
        let mut conn = pool.get_conn().await?;
        conn.ping().await?;
        drop(conn);

        log::info!(
            "connected to mysql database {}",
            self.config.database.as_deref().unwrap_or_default()
        );
        self.pool = Some(pool);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ConnectionError> {
        if let Some(pool) = self.pool.take() {
            pool.disconnect().await?;
            log::info!("disconnected from mysql database");
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_schema(&self) -> Result<SchemaInfo, SchemaError> {
        let pool = self.pool.as_ref().ok_or(SchemaError::NotConnected)?;
        let mut conn = pool.get_conn().await?;

        let table_names: Vec<String> = conn
            .query(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
                 ORDER BY table_name",
            )
            .await?;

        let mut tables = Vec::with_capacity(table_names.len());
        for name in table_names {
            let column_rows: Vec<(String, String, String, String, Option<String>, String)> = conn
                .exec(
                    "SELECT column_name, column_type, is_nullable, column_key, \
                            column_default, extra \
                     FROM information_schema.columns \
                     WHERE table_schema = DATABASE() AND table_name = ? \
                     ORDER BY ordinal_position",
                    (name.as_str(),),
                )
                .await?;

            let columns = column_rows
                .into_iter()
                .map(
                    |(column_name, column_type, is_nullable, column_key, default, extra)| {
                        ColumnInfo {
                            name: column_name,
                            data_type: column_type,
                            is_nullable: is_nullable == "YES",
                            is_primary_key: column_key == "PRI",
                            default_value: default,
                            is_auto_increment: extra.eq_ignore_ascii_case("auto_increment"),
                        }
                    },
                )
                .collect();

            tables.push(TableInfo { name, columns });
        }

        Ok(SchemaInfo {
            database_name: self.config.database.clone().unwrap_or_default(),
            tables,
        })
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult, ExecutionError> {
        let pool = self.pool.as_ref().ok_or(ExecutionError::NotConnected)?;
        let mut conn = pool.get_conn().await?;

        let mut result = conn.query_iter(sql).await?;
        let columns: Vec<String> = result
            .columns()
            .map(|cols| cols.iter().map(|c| c.name_str().into_owned()).collect())
            .unwrap_or_default();
        let raw_rows: Vec<mysql_async::Row> = result.collect().await?;
        let rows_affected = result.affected_rows();
        drop(result);

        let rows = raw_rows
            .iter()
            .map(|raw| {
                let mut record = Row::new();
                for (i, col) in columns.iter().enumerate() {
                    let value = raw.as_ref(i).map(json_value).unwrap_or(serde_json::Value::Null);
                    record.insert(col.clone(), value);
                }
                record
            })
            .collect();

        Ok(QueryResult {
            columns,
            rows,
            rows_affected,
        })
    }

    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::MySql
    }
}
