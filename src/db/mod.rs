pub mod connectors;
pub mod schema;
