pub mod mysql;
pub mod postgres;
pub mod sqlite;

use crate::db::schema::{QueryResult, SchemaInfo};
use crate::error::{ConnectionError, ExecutionError, SchemaError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Supported database engines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseEngine {
    Sqlite,
    PostgreSql,
    MySql,
}

impl std::fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseEngine::Sqlite => write!(f, "SQLite"),
            DatabaseEngine::PostgreSql => write!(f, "PostgreSQL"),
            DatabaseEngine::MySql => write!(f, "MySQL"),
        }
    }
}

/// Connection configuration for a database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub engine: DatabaseEngine,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub file_path: Option<String>,
    pub connection_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            engine: DatabaseEngine::Sqlite,
            host: None,
            port: None,
            database: None,
            username: None,
            password: None,
            file_path: None,
            connection_timeout_secs: 30,
        }
    }
}

impl ConnectionConfig {
    /// Check that the fields the engine's driver needs are present.
    ///
    /// SQLite needs a file path; the client-server engines need host,
    /// port, database and username. Passwords may legitimately be empty.
    pub fn validate(&self) -> Result<(), ConnectionError> {
        let missing = |field| ConnectionError::MissingField {
            field,
            engine: self.engine,
        };

        match self.engine {
            DatabaseEngine::Sqlite => {
                if self.file_path.as_deref().map_or(true, str::is_empty) {
                    return Err(missing("file_path"));
                }
            }
            DatabaseEngine::PostgreSql | DatabaseEngine::MySql => {
                if self.host.as_deref().map_or(true, str::is_empty) {
                    return Err(missing("host"));
                }
                if self.port.is_none() {
                    return Err(missing("port"));
                }
                if self.database.as_deref().map_or(true, str::is_empty) {
                    return Err(missing("database"));
                }
                if self.username.as_deref().map_or(true, str::is_empty) {
                    return Err(missing("username"));
                }
            }
        }
        Ok(())
    }
}

/// The core trait that all database connectors must implement
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Connect to the database
    async fn connect(&mut self) -> Result<(), ConnectionError>;

    /// Disconnect from the database
    async fn disconnect(&mut self) -> Result<(), ConnectionError>;

    /// Check if the connection is active
    async fn is_connected(&self) -> bool;

    /// Read the full schema from the catalog. Never reads row data.
    async fn get_schema(&self) -> Result<SchemaInfo, SchemaError>;

    /// Execute exactly one SQL statement and return its result set,
    /// or an empty result with `rows_affected` for non-reading statements.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult, ExecutionError>;

    /// Get the database engine type
    fn engine(&self) -> DatabaseEngine;
}

/// Build the engine-specific connector for a validated config.
pub fn connector_for(config: ConnectionConfig) -> Box<dyn DatabaseConnector> {
    match config.engine {
        DatabaseEngine::Sqlite => Box::new(sqlite::SqliteConnector::new(config)),
        DatabaseEngine::PostgreSql => Box::new(postgres::PostgresConnector::new(config)),
        DatabaseEngine::MySql => Box::new(mysql::MySqlConnector::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_config_requires_file_path() {
        let config = ConnectionConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConnectionError::MissingField {
                field: "file_path",
                ..
            })
        ));

        let config = ConnectionConfig {
            file_path: Some("app.db".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn server_config_requires_host_port_database_username() {
        let mut config = ConnectionConfig {
            engine: DatabaseEngine::PostgreSql,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConnectionError::MissingField { field: "host", .. })
        ));

        config.host = Some("localhost".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConnectionError::MissingField { field: "port", .. })
        ));

        config.port = Some(5432);
        config.database = Some("app".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConnectionError::MissingField {
                field: "username",
                ..
            })
        ));

        config.username = Some("postgres".to_string());
        // Password is allowed to be absent.
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let config = ConnectionConfig {
            engine: DatabaseEngine::MySql,
            host: Some(String::new()),
            port: Some(3306),
            database: Some("app".to_string()),
            username: Some("root".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConnectionError::MissingField { field: "host", .. })
        ));
    }
}
