use thiserror::Error;

/// Failures surfaced by the ingestion, catalog and detail flows.
///
/// None of these are retried automatically; callers decide whether to try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Failed to parse upload: {0}")]
    ParseFailure(String),

    #[error("File exceeds the maximum upload size of {limit_bytes} bytes")]
    PayloadTooLarge { limit_bytes: u64 },

    #[error("{0}")]
    UpstreamFailure(String),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),
}

impl VideoError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamFailure(message.into())
    }
}
