use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("{0}")]
    Invalid(String),
    #[error("response carried no row count")]
    MissingCount,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("realtime: {0}")]
    Realtime(String),
    #[error(transparent)]
    Export(#[from] portal::ExportError),
}

/// Error bodies returned by the REST and auth endpoints use different keys.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

impl ApiError {
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    trimmed.to_string()
                }
            });
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// Transport failures and 5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(e) => !e.is_decode() && !e.is_builder(),
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::NotAuthenticated)
            || matches!(self, ApiError::Status { status: 401, .. })
    }
}
