use crate::db::connectors::DatabaseEngine;

/// Failure to open or authenticate a database connection.
///
/// Session-fatal: the session returns to the disconnected state.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("missing required field `{field}` for {engine}")]
    MissingField {
        field: &'static str,
        engine: DatabaseEngine,
    },
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("postgres: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("mysql: {0}")]
    MySql(#[from] mysql_async::Error),
}

/// Failure to read catalog metadata from a connected database.
///
/// Session-fatal: the session returns to the disconnected state.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("not connected")]
    NotConnected,
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("postgres: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("mysql: {0}")]
    MySql(#[from] mysql_async::Error),
}

/// Failure of the text-generation call, or model output with no
/// extractable SQL statement.
///
/// Turn-local: captured into the chat turn's error field.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation backend returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("generation backend returned an empty response")]
    EmptyResponse,
    #[error("no SQL statement found in model output: {0:?}")]
    NoStatement(String),
}

/// Failure to execute a generated SQL statement.
///
/// Turn-local: captured into the chat turn's error field with the
/// underlying driver message verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("not connected")]
    NotConnected,
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("postgres: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("mysql: {0}")]
    MySql(#[from] mysql_async::Error),
}

/// Session-level failures surfaced by the orchestrator itself, as opposed
/// to turn-local generation/execution failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session is not connected")]
    NotConnected,
    #[error("database connection was lost; reconnect required")]
    ConnectionLost,
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
