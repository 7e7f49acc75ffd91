use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::connectors::{connector_for, ConnectionConfig, DatabaseConnector};
use crate::db::schema::{QueryResult, SchemaInfo};
use crate::error::SessionError;
use crate::llm::{self, TextGenerator};
use crate::prompt;

/// One question/answer exchange. Appended once per question and never
/// mutated afterwards; at most one of `result` / `error` is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: Uuid,
    pub question: String,
    pub generated_sql: Option<String>,
    pub result: Option<QueryResult>,
    pub error: Option<String>,
    pub asked_at: DateTime<Utc>,
}

enum SessionState {
    Disconnected,
    Connected {
        connector: Box<dyn DatabaseConnector>,
        schema: SchemaInfo,
    },
}

/// One user's chat session: a connection, the schema extracted at connect
/// time, and the append-only history of turns. History lives only in
/// memory and is lost with the session.
pub struct ChatSession {
    generator: Box<dyn TextGenerator>,
    state: SessionState,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            generator,
            state: SessionState::Disconnected,
            history: Vec::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected { .. })
    }

    /// The schema in use for prompts, when connected.
    pub fn schema(&self) -> Option<&SchemaInfo> {
        match &self.state {
            SessionState::Connected { schema, .. } => Some(schema),
            SessionState::Disconnected => None,
        }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Connect to a database and extract a fresh schema for prompting.
    ///
    /// Any existing connection is released first, so switching engines or
    /// parameters goes through the disconnected state. Failure leaves the
    /// session disconnected. History is never cleared by reconnecting.
    pub async fn connect(&mut self, config: ConnectionConfig) -> Result<(), SessionError> {
        self.release().await;

        let mut connector = connector_for(config);
        connector.connect().await.map_err(SessionError::Connection)?;

        let schema = match connector.get_schema().await {
            Ok(schema) => schema,
            Err(e) => {
                if let Err(e) = connector.disconnect().await {
                    log::warn!("disconnect after schema failure: {}", e);
                }
                return Err(SessionError::Schema(e));
            }
        };

        log::info!(
            "session connected to {} ({} tables)",
            connector.engine(),
            schema.tables.len()
        );
        self.state = SessionState::Connected { connector, schema };
        Ok(())
    }

    /// Release the connection. History is retained.
    pub async fn disconnect(&mut self) {
        self.release().await;
    }

    async fn release(&mut self) {
        if let SessionState::Connected { mut connector, .. } =
            std::mem::replace(&mut self.state, SessionState::Disconnected)
        {
            if let Err(e) = connector.disconnect().await {
                log::warn!("error releasing connection: {}", e);
            }
        }
    }

    /// Run one question through the pipeline: build prompt, generate SQL,
    /// execute it, append the resulting turn.
    ///
    /// Generation and execution failures are captured into the turn's
    /// error field. Only session-level problems (not connected, connection
    /// lost) surface as errors; a lost connection drops the session back
    /// to disconnected without recording a turn.
    pub async fn ask(&mut self, question: &str) -> Result<ChatTurn, SessionError> {
        let SessionState::Connected { connector, schema } = &self.state else {
            return Err(SessionError::NotConnected);
        };
        if !connector.is_connected().await {
            self.state = SessionState::Disconnected;
            return Err(SessionError::ConnectionLost);
        }

        let prompt = prompt::build_prompt(schema, question);
        let mut turn = ChatTurn {
            id: Uuid::new_v4(),
            question: question.to_string(),
            generated_sql: None,
            result: None,
            error: None,
            asked_at: Utc::now(),
        };

        match llm::generate_sql(self.generator.as_ref(), &prompt).await {
            Ok(sql) => {
                log::debug!("generated SQL: {}", sql);
                match connector.execute_query(&sql).await {
                    Ok(result) => turn.result = Some(result),
                    Err(e) => turn.error = Some(e.to_string()),
                }
                turn.generated_sql = Some(sql);
            }
            Err(e) => turn.error = Some(e.to_string()),
        }

        self.history.push(turn.clone());
        Ok(turn)
    }
}
