// Error types for the infradash proxy
// Author: kelexine (https://github.com/kelexine)

use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported host runtime")]
    UnsupportedRuntime,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProxyError {
    /// HTTP status this error renders as at the dispatcher boundary.
    /// Everything request-scoped that is not an auth or method failure
    /// collapses to 500, upstream causes included.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
