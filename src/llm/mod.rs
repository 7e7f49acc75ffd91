pub mod extract;
pub mod gemini;
pub mod ollama;

use async_trait::async_trait;

use crate::error::GenerationError;

/// The single capability the pipeline needs from a language model:
/// text in, text out. Hosted APIs and locally served models are
/// interchangeable behind this trait.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Run one generation call and isolate a single SQL statement from the
/// free-form reply. No retries, no streaming.
///
/// The returned text is untrusted; executing it is the actual validation.
pub async fn generate_sql(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<String, GenerationError> {
    let raw = generator.generate(prompt).await?;
    if raw.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    extract::extract_sql(&raw)
}
