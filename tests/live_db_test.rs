//! Integration tests against live PostgreSQL and MySQL servers.
//!
//! Prerequisites:
//!   - PostgreSQL on localhost:5432, user postgres/postgres, database dbchat_test
//!     seeded with at least a `customers` table
//!   - MySQL on localhost:3306, user root (empty password), database dbchat_test
//!     seeded the same way
//!
//! Ignored by default; run with `cargo test -- --ignored` once the servers are up.

use dbchat::db::connectors::mysql::MySqlConnector;
use dbchat::db::connectors::postgres::PostgresConnector;
use dbchat::db::connectors::{ConnectionConfig, DatabaseConnector, DatabaseEngine};

// ─── helpers ───────────────────────────────────────────────────────────────

fn postgres_config() -> ConnectionConfig {
    ConnectionConfig {
        engine: DatabaseEngine::PostgreSql,
        host: Some("localhost".to_string()),
        port: Some(5432),
        database: Some("dbchat_test".to_string()),
        username: Some("postgres".to_string()),
        password: Some("postgres".to_string()),
        ..Default::default()
    }
}

fn mysql_config() -> ConnectionConfig {
    ConnectionConfig {
        engine: DatabaseEngine::MySql,
        host: Some("localhost".to_string()),
        port: Some(3306),
        database: Some("dbchat_test".to_string()),
        username: Some("root".to_string()),
        password: Some(String::new()),
        ..Default::default()
    }
}

// ─── postgresql ────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn postgres_connect_disconnect() {
    let mut conn = PostgresConnector::new(postgres_config());
    assert!(!conn.is_connected().await);

    conn.connect().await.expect("PostgreSQL connect failed");
    assert!(conn.is_connected().await);

    conn.disconnect().await.expect("PostgreSQL disconnect failed");
    assert!(!conn.is_connected().await);
}

#[tokio::test]
#[ignore]
async fn postgres_connect_wrong_database() {
    let mut cfg = postgres_config();
    cfg.database = Some("nonexistent_db_xyz_999".to_string());
    let mut conn = PostgresConnector::new(cfg);

    let result = conn.connect().await;
    assert!(result.is_err(), "Should fail with nonexistent database");
}

#[tokio::test]
#[ignore]
async fn postgres_schema_has_customers() {
    let mut conn = PostgresConnector::new(postgres_config());
    conn.connect().await.expect("connect");

    let schema = conn.get_schema().await.expect("get_schema");
    assert_eq!(schema.database_name, "dbchat_test");
    assert!(
        schema.tables.iter().any(|t| t.name == "customers"),
        "Missing customers table in {:?}",
        schema.tables.iter().map(|t| &t.name).collect::<Vec<_>>()
    );

    let customers = schema.tables.iter().find(|t| t.name == "customers").unwrap();
    assert!(!customers.columns.is_empty());

    conn.disconnect().await.ok();
}

#[tokio::test]
#[ignore]
async fn postgres_schema_is_stable() {
    let mut conn = PostgresConnector::new(postgres_config());
    conn.connect().await.expect("connect");

    let first = conn.get_schema().await.expect("first extraction");
    let second = conn.get_schema().await.expect("second extraction");
    assert_eq!(first, second);

    conn.disconnect().await.ok();
}

#[tokio::test]
#[ignore]
async fn postgres_execute_query() {
    let mut conn = PostgresConnector::new(postgres_config());
    conn.connect().await.expect("connect");

    let result = conn
        .execute_query("SELECT 1 AS one, 'two' AS two")
        .await
        .expect("execute_query");
    assert_eq!(result.columns, vec!["one", "two"]);
    assert_eq!(result.rows.len(), 1);

    conn.disconnect().await.ok();
}

#[tokio::test]
#[ignore]
async fn postgres_execute_invalid_sql() {
    let mut conn = PostgresConnector::new(postgres_config());
    conn.connect().await.expect("connect");

    let err = conn
        .execute_query("SELECT * FROM nonexistent_table_xyz_999")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("nonexistent_table_xyz_999"));

    conn.disconnect().await.ok();
}

// ─── mysql ─────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn mysql_connect_disconnect() {
    let mut conn = MySqlConnector::new(mysql_config());
    assert!(!conn.is_connected().await);

    conn.connect().await.expect("MySQL connect failed");
    assert!(conn.is_connected().await);

    conn.disconnect().await.expect("MySQL disconnect failed");
    assert!(!conn.is_connected().await);
}

#[tokio::test]
#[ignore]
async fn mysql_connect_wrong_password() {
    let mut cfg = mysql_config();
    cfg.password = Some("WrongPassword999".to_string());
    let mut conn = MySqlConnector::new(cfg);

    let result = conn.connect().await;
    assert!(result.is_err(), "Should fail with wrong credentials");
}

#[tokio::test]
#[ignore]
async fn mysql_schema_has_customers() {
    let mut conn = MySqlConnector::new(mysql_config());
    conn.connect().await.expect("connect");

    let schema = conn.get_schema().await.expect("get_schema");
    assert_eq!(schema.database_name, "dbchat_test");
    assert!(schema.tables.iter().any(|t| t.name == "customers"));

    conn.disconnect().await.ok();
}

#[tokio::test]
#[ignore]
async fn mysql_execute_query() {
    let mut conn = MySqlConnector::new(mysql_config());
    conn.connect().await.expect("connect");

    let result = conn
        .execute_query("SELECT 1 AS one")
        .await
        .expect("execute_query");
    assert_eq!(result.columns, vec!["one"]);
    assert_eq!(result.rows.len(), 1);

    conn.disconnect().await.ok();
}
