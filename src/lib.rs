pub mod chat;
pub mod db;
pub mod error;
pub mod llm;
pub mod prompt;

pub use chat::{ChatSession, ChatTurn};
pub use db::connectors::{ConnectionConfig, DatabaseEngine};
