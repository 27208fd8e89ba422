//! Error types shared across the crate.
//!
//! `ApiError` classifies everything that can go wrong talking to the backend;
//! the rest of the application uses `anyhow` for plumbing errors.

pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// Failure of a single API call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Network failure, or a non-2xx status without a readable message.
    #[error("{0}")]
    Transport(String),
    /// Non-2xx status whose JSON body carried a `message`.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// 2xx response with `success: false`.
    #[error("{0}")]
    Domain(String),
    /// Body was not the JSON we expected.
    #[error("invalid response from server: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: reqwest::StatusCode) -> Self {
        ApiError::Transport(format!("Server returned {status}"))
    }

    /// Text shown in result areas for write failures: server-provided
    /// messages verbatim, everything else prefixed with "Error: ".
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } | ApiError::Domain(message) => message.clone(),
            other => format!("Error: {other}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::status(status)
        } else {
            ApiError::Transport(format!("Network error: {err}"))
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
