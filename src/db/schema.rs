use serde::{Deserialize, Serialize};

/// Represents the complete schema of a database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub database_name: String,
    pub tables: Vec<TableInfo>,
}

/// Represents a single database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

/// Represents a column in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub default_value: Option<String>,
    pub is_auto_increment: bool,
}

/// Represents a database row as a map of column names to JSON values
pub type Row = std::collections::HashMap<String, serde_json::Value>;

/// Result of executing a single SQL statement.
///
/// Statements without a result set come back with an empty `rows` and the
/// driver-reported `rows_affected`. `columns` preserves select-list order
/// so callers can render rows in a stable order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub rows_affected: u64,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl SchemaInfo {
    /// Render the schema as a sequence of `CREATE TABLE` statements.
    ///
    /// This is the textual form fed to the language model, reconstructed
    /// from catalog metadata. It is not guaranteed to round-trip through
    /// the original DDL (composite keys and foreign keys are omitted).
    pub fn to_create_statements(&self) -> String {
        let mut statements = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            let mut cols = Vec::with_capacity(table.columns.len());
            for col in &table.columns {
                let mut def = format!("    {} {}", col.name, col.data_type.to_uppercase());
                if !col.is_nullable {
                    def.push_str(" NOT NULL");
                }
                if let Some(default) = &col.default_value {
                    def.push_str(&format!(" DEFAULT {}", default));
                }
                if col.is_auto_increment {
                    def.push_str(" AUTO_INCREMENT");
                }
                if col.is_primary_key {
                    def.push_str(" PRIMARY KEY");
                }
                cols.push(def);
            }
            statements.push(format!(
                "CREATE TABLE {} (\n{}\n);",
                table.name,
                cols.join(",\n")
            ));
        }
        statements.join("\n\n")
    }
}
