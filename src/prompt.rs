use crate::db::schema::SchemaInfo;

/// Instruction preamble sent with every question.
const INSTRUCTIONS: &str = "\
You are a helpful assistant specialized in converting natural language questions into SQL queries.\n\
You will be given a database schema as CREATE TABLE statements and a question about the data.\n\
Answer with exactly one SQL statement that answers the question against the given schema.\n\
Do not include any explanations, comments, or additional text.";

/// Build the full prompt for one question.
///
/// Pure and deterministic: the same schema and question always produce the
/// same text. The question is included verbatim.
pub fn build_prompt(schema: &SchemaInfo, question: &str) -> String {
    format!(
        "{}\n\n## Database Schema:\n{}\n\n## Question:\n{}\n",
        INSTRUCTIONS,
        schema.to_create_statements(),
        question.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{ColumnInfo, TableInfo};

    fn sample_schema() -> SchemaInfo {
        SchemaInfo {
            database_name: "shop".to_string(),
            tables: vec![TableInfo {
                name: "tshirts".to_string(),
                columns: vec![ColumnInfo {
                    name: "name".to_string(),
                    data_type: "text".to_string(),
                    is_nullable: true,
                    is_primary_key: false,
                    default_value: None,
                    is_auto_increment: false,
                }],
            }],
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let schema = sample_schema();
        let a = build_prompt(&schema, "Show me all t-shirt names.");
        let b = build_prompt(&schema, "Show me all t-shirt names.");
        assert_eq!(a, b);
    }

    #[test]
    fn prompt_contains_schema_and_verbatim_question() {
        let schema = sample_schema();
        let prompt = build_prompt(&schema, "How many t-shirts are there?");
        assert!(prompt.contains("CREATE TABLE tshirts"));
        assert!(prompt.contains("## Question:\nHow many t-shirts are there?"));
    }

    #[test]
    fn question_whitespace_is_trimmed() {
        let schema = sample_schema();
        let prompt = build_prompt(&schema, "  count them  \n");
        assert!(prompt.ends_with("## Question:\ncount them\n"));
    }
}
