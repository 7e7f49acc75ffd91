//! Isolating one SQL statement from free-form model output.
//!
//! Models answer with varying amounts of noise around the statement:
//! code fences, JSON envelopes, surrounding prose. The heuristic here,
//! in order:
//!
//! 1. If the reply (or its first fenced block) is a JSON object with a
//!    `sql` or `query` string field, take that field.
//! 2. Otherwise take the contents of the first fenced code block.
//! 3. Otherwise take the first line beginning with a SQL verb, through
//!    the terminating `;` or the end of the reply.
//!
//! Whatever is isolated must itself begin with a SQL verb.

use crate::error::GenerationError;

const SQL_VERBS: &[&str] = &[
    "SELECT", "WITH", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER", "SHOW", "DESCRIBE",
    "EXPLAIN", "PRAGMA",
];

fn starts_with_sql_verb(text: &str) -> bool {
    let upper = text.trim_start().to_uppercase();
    SQL_VERBS.iter().any(|verb| {
        upper.starts_with(verb)
            && upper[verb.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric() && c != '_')
    })
}

/// The contents of the first ``` fenced block, language tag stripped.
fn first_fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip the language tag line (```sql, ```json, or bare ```).
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let end = body.find("```").unwrap_or(body.len());
    Some(&body[..end])
}

/// A `sql` or `query` field out of a JSON object reply.
fn json_statement(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    let object = value.as_object()?;
    object
        .get("sql")
        .or_else(|| object.get("query"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// First run of lines starting at a SQL verb, cut at the first `;`.
fn scan_for_statement(text: &str) -> Option<String> {
    for line in text.lines() {
        if starts_with_sql_verb(line) {
            let offset = line.as_ptr() as usize - text.as_ptr() as usize;
            let rest = &text[offset..];
            let statement = match rest.find(';') {
                Some(end) => &rest[..=end],
                None => rest,
            };
            return Some(statement.trim().to_string());
        }
    }
    None
}

fn snippet(text: &str) -> String {
    let mut s: String = text.chars().take(200).collect();
    if s.len() < text.len() {
        s.push_str("...");
    }
    s
}

/// Extract a single SQL statement from model output, or fail with
/// [`GenerationError::NoStatement`] when nothing plausible is present.
pub fn extract_sql(text: &str) -> Result<String, GenerationError> {
    let block = first_fenced_block(text);

    // JSON envelope, either fenced or bare.
    for source in block.iter().copied().chain(std::iter::once(text)) {
        if let Some(statement) = json_statement(source) {
            let statement = statement.trim().to_string();
            if starts_with_sql_verb(&statement) {
                return Ok(statement);
            }
        }
    }

    // Bare statement in a fence.
    if let Some(body) = block {
        let body = body.trim();
        if starts_with_sql_verb(body) {
            return Ok(body.to_string());
        }
        if let Some(statement) = scan_for_statement(body) {
            return Ok(statement);
        }
    }

    // Statement buried in prose.
    if let Some(statement) = scan_for_statement(text) {
        return Ok(statement);
    }

    Err(GenerationError::NoStatement(snippet(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_sql_block() {
        let out = extract_sql("```sql\nSELECT 1;\n```").unwrap();
        assert_eq!(out, "SELECT 1;");
    }

    #[test]
    fn fenced_block_without_language_tag() {
        let out = extract_sql("```\nSELECT name FROM users;\n```").unwrap();
        assert_eq!(out, "SELECT name FROM users;");
    }

    #[test]
    fn json_envelope_with_sql_field() {
        let out = extract_sql(r#"{"sql": "SELECT name FROM tshirts LIMIT 10;"}"#).unwrap();
        assert_eq!(out, "SELECT name FROM tshirts LIMIT 10;");
    }

    #[test]
    fn json_envelope_with_query_field_in_fence() {
        let out = extract_sql("```json\n{\"query\": \"SELECT 42;\"}\n```").unwrap();
        assert_eq!(out, "SELECT 42;");
    }

    #[test]
    fn statement_surrounded_by_prose() {
        let out = extract_sql(
            "Sure! Here is the query you asked for:\n\
             SELECT DISTINCT city FROM addresses ORDER BY city;\n\
             Let me know if you need anything else.",
        )
        .unwrap();
        assert_eq!(out, "SELECT DISTINCT city FROM addresses ORDER BY city;");
    }

    #[test]
    fn multi_line_statement_cut_at_semicolon() {
        let out = extract_sql(
            "SELECT name,\n       price\nFROM products\nWHERE price > 10;\nThat should do it.",
        )
        .unwrap();
        assert_eq!(out, "SELECT name,\n       price\nFROM products\nWHERE price > 10;");
    }

    #[test]
    fn statement_without_trailing_semicolon() {
        let out = extract_sql("SELECT count(*) FROM orders").unwrap();
        assert_eq!(out, "SELECT count(*) FROM orders");
    }

    #[test]
    fn no_recognizable_verb_fails() {
        let err = extract_sql("I am sorry, I cannot answer that question.").unwrap_err();
        assert!(matches!(err, GenerationError::NoStatement(_)));
    }

    #[test]
    fn json_without_sql_field_fails() {
        let err = extract_sql(r#"{"answer": "forty-two"}"#).unwrap_err();
        assert!(matches!(err, GenerationError::NoStatement(_)));
    }

    #[test]
    fn verb_prefix_of_identifier_is_not_a_verb() {
        // "SELECTION" must not count as SELECT.
        let err = extract_sql("SELECTION of the data is not possible.").unwrap_err();
        assert!(matches!(err, GenerationError::NoStatement(_)));
    }

    #[test]
    fn with_cte_is_recognized() {
        let out =
            extract_sql("WITH t AS (SELECT 1 AS n) SELECT n FROM t;").unwrap();
        assert!(out.starts_with("WITH"));
    }

    #[test]
    fn fence_takes_priority_over_later_prose() {
        let out = extract_sql(
            "Here you go:\n```sql\nSELECT a FROM b;\n```\nOr alternatively SELECT c FROM d;",
        )
        .unwrap();
        assert_eq!(out, "SELECT a FROM b;");
    }
}
