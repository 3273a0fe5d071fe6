pub mod types;
pub mod request;
pub mod metrics;
pub mod refusal;
pub mod prompt;
pub mod messages;
pub mod openai;
pub mod vision;
pub mod report;
pub mod orchestrator;

pub use types::*;
pub use request::*;
pub use metrics::*;
pub use refusal::*;
pub use openai::*;
pub use vision::*;
pub use report::*;
pub use orchestrator::*;

use std::fmt;

use thiserror::Error;

/// Which model call a provider failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStage {
    Vision,
    Report,
}

impl fmt::Display for ProviderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vision => write!(f, "vision"),
            Self::Report => write!(f, "report"),
        }
    }
}

/// Transport-level failures of the remote model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Model request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Model provider is unreachable at {0}")]
    Connection(String),

    #[error("Model provider returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Inbound payload rejected before any model call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing 'messages' in request body")]
    MissingMessages,

    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("'messages' must contain at least one message")]
    EmptyMessages,

    #[error("Request must contain a '{0}' content block")]
    MissingBlock(&'static str),

    #[error("Request must contain exactly one '{0}' content block")]
    DuplicateBlock(&'static str),

    #[error("Image URL is not a valid absolute URI: {0}")]
    InvalidImageUrl(String),
}

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{stage} model call failed: {source}")]
    Provider {
        stage: ProviderStage,
        #[source]
        source: ProviderError,
    },

    #[error("Report rendering failed: {0}")]
    Render(String),
}

impl EvaluationError {
    pub fn provider(stage: ProviderStage, source: ProviderError) -> Self {
        Self::Provider { stage, source }
    }
}
