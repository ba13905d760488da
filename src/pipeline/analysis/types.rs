use futures_util::future::BoxFuture;

use super::AnalysisError;

/// Reasoning service abstraction (allows mocking).
///
/// A single call sends one prompt and resolves to the model's raw text.
/// Implementations make exactly one attempt.
pub trait LlmClient: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AnalysisError>>;

    /// Model identifier, for logging and health output.
    fn model(&self) -> &str;
}
