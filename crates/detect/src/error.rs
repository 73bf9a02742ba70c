use thiserror::Error;
use veil_core::ProviderError;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid detector endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("detector request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("detector returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed detector response: {0}")]
    Response(#[from] serde_json::Error),
}

impl From<DetectError> for ProviderError {
    fn from(err: DetectError) -> Self {
        ProviderError::new(err.to_string())
    }
}
