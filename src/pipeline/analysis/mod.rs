pub mod types;
pub mod units;
pub mod prompt;
pub mod parser;
pub mod validation;
pub mod classify;
pub mod gemini;
pub mod orchestrator;

pub use types::*;
pub use units::*;
pub use prompt::*;
pub use parser::*;
pub use validation::*;
pub use classify::*;
pub use gemini::*;
pub use orchestrator::*;

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid analysis input: {0}")]
    Validation(String),

    #[error("Reasoning service unreachable at {0}")]
    ServiceConnection(String),

    #[error("Reasoning service returned error (status {status}): {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("Reasoning service rejected the request: {0}")]
    ServiceRejected(String),

    #[error("Reasoning service timed out after {0:?}")]
    ServiceTimeout(Duration),

    #[error("Analysis request cancelled")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Reasoning service returned no text")]
    EmptyResponse,

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Response violates result schema: {0}")]
    Schema(String),
}

/// Coarse failure category, used for logging at the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Service,
    Parse,
    Schema,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Service => "service",
            ErrorKind::Parse => "parse",
            ErrorKind::Schema => "schema",
        }
    }
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Validation(_) => ErrorKind::Validation,
            AnalysisError::ServiceConnection(_)
            | AnalysisError::ServiceStatus { .. }
            | AnalysisError::ServiceRejected(_)
            | AnalysisError::ServiceTimeout(_)
            | AnalysisError::Cancelled
            | AnalysisError::HttpClient(_)
            | AnalysisError::EmptyResponse => ErrorKind::Service,
            AnalysisError::MalformedResponse(_) | AnalysisError::JsonParsing(_) => {
                ErrorKind::Parse
            }
            AnalysisError::Schema(_) => ErrorKind::Schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_kinds() {
        assert_eq!(AnalysisError::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(AnalysisError::ServiceTimeout(Duration::from_secs(30)).kind(), ErrorKind::Service);
        assert_eq!(AnalysisError::Cancelled.kind(), ErrorKind::Service);
        assert_eq!(
            AnalysisError::ServiceStatus { status: 429, body: "quota".into() }.kind(),
            ErrorKind::Service
        );
        assert_eq!(AnalysisError::MalformedResponse("x".into()).kind(), ErrorKind::Parse);
        assert_eq!(AnalysisError::JsonParsing("x".into()).kind(), ErrorKind::Parse);
        assert_eq!(AnalysisError::Schema("x".into()).kind(), ErrorKind::Schema);
    }

    #[test]
    fn error_messages_carry_detail() {
        let err = AnalysisError::ServiceStatus { status: 503, body: "overloaded".into() };
        assert_eq!(
            err.to_string(),
            "Reasoning service returned error (status 503): overloaded"
        );
        assert_eq!(ErrorKind::Schema.as_str(), "schema");
        assert_eq!(
            AnalysisError::ServiceTimeout(Duration::from_millis(250)).to_string(),
            "Reasoning service timed out after 250ms"
        );
    }
}
