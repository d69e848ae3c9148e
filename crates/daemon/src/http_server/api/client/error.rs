use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    /// The plugin answered with a non-empty `Err` field.
    #[error("{message}")]
    Plugin { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Reqwest(e) => e.status(),
            ApiError::HttpStatus(status, _) => Some(*status),
            ApiError::Plugin { status, .. } => Some(*status),
        }
    }
}
