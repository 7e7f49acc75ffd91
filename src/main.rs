use std::io::{BufRead, Write};

use anyhow::Context;
use clap::{Parser, ValueEnum};

use dbchat::chat::ChatSession;
use dbchat::db::connectors::{ConnectionConfig, DatabaseEngine};
use dbchat::db::schema::QueryResult;
use dbchat::llm::{gemini::GeminiClient, ollama, ollama::OllamaClient, TextGenerator};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EngineArg {
    Sqlite,
    Postgres,
    Mysql,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Ollama,
    Gemini,
}

/// Chat with a relational database in natural language.
#[derive(Debug, Parser)]
#[command(name = "dbchat", version)]
struct Args {
    /// Database engine to connect to
    #[arg(long, value_enum)]
    engine: EngineArg,

    /// SQLite database file (sqlite only)
    #[arg(long)]
    file: Option<String>,

    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port (defaults to the engine's standard port)
    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    database: Option<String>,

    #[arg(long)]
    user: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Text-generation backend
    #[arg(long, value_enum, default_value = "ollama")]
    backend: BackendArg,

    /// Model name for the chosen backend
    #[arg(long, default_value = "llama3.2:3b")]
    model: String,

    #[arg(long, default_value = ollama::DEFAULT_BASE_URL)]
    ollama_url: String,
}

fn connection_config(args: &Args) -> ConnectionConfig {
    let engine = match args.engine {
        EngineArg::Sqlite => DatabaseEngine::Sqlite,
        EngineArg::Postgres => DatabaseEngine::PostgreSql,
        EngineArg::Mysql => DatabaseEngine::MySql,
    };
    let default_port = match engine {
        DatabaseEngine::Sqlite => None,
        DatabaseEngine::PostgreSql => Some(5432),
        DatabaseEngine::MySql => Some(3306),
    };
    ConnectionConfig {
        engine,
        host: Some(args.host.clone()),
        port: args.port.or(default_port),
        database: args.database.clone(),
        username: args.user.clone(),
        password: args.password.clone(),
        file_path: args.file.clone(),
        ..Default::default()
    }
}

fn generator(args: &Args) -> anyhow::Result<Box<dyn TextGenerator>> {
    match args.backend {
        BackendArg::Ollama => Ok(Box::new(OllamaClient::new(
            args.ollama_url.clone(),
            args.model.clone(),
        ))),
        BackendArg::Gemini => {
            let api_key = std::env::var("GEMINI_API_KEY")
                .context("GEMINI_API_KEY must be set for the gemini backend")?;
            Ok(Box::new(GeminiClient::new(api_key, args.model.clone())))
        }
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn print_result(result: &QueryResult) {
    if result.columns.is_empty() {
        println!("OK, {} row(s) affected", result.rows_affected);
        return;
    }
    if result.rows.is_empty() {
        println!("(no rows)");
        return;
    }
    println!("{}", result.columns.join(" | "));
    println!("{}", "-".repeat(result.columns.join(" | ").len()));
    for row in &result.rows {
        let line: Vec<String> = result
            .columns
            .iter()
            .map(|col| row.get(col).map(display_value).unwrap_or_default())
            .collect();
        println!("{}", line.join(" | "));
    }
    println!("({} rows)", result.rows.len());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut session = ChatSession::new(generator(&args)?);
    session.connect(connection_config(&args)).await?;

    if let Some(schema) = session.schema() {
        println!(
            "Connected to {} ({} tables). Ask a question, `schema` to show the schema, `exit` to quit.",
            schema.database_name,
            schema.tables.len()
        );
    }

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }
        if question == "schema" {
            if let Some(schema) = session.schema() {
                println!("{}", schema.to_create_statements());
            }
            continue;
        }

        let turn = session.ask(question).await?;
        if let Some(sql) = &turn.generated_sql {
            println!("sql> {}", sql);
        }
        if let Some(error) = &turn.error {
            println!("error: {}", error);
        }
        if let Some(result) = &turn.result {
            print_result(result);
        }
    }

    session.disconnect().await;
    Ok(())
}
