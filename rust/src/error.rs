//! Error types for the client library.
//!
//! [`ApiError`] covers everything that can go wrong talking to the backend and
//! knows how to collapse itself into the single user-visible error line.
//! [`ConfigError`] covers settings that fail to parse.

use reqwest::StatusCode;
use thiserror::Error;

pub const INDEX_FALLBACK: &str = "Indexing failed.";
pub const QUERY_FALLBACK: &str = "Query failed.";
pub const UNREACHABLE: &str = "Could not reach the API.";

/// Which backend operation an error belongs to. Selects the fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Index,
    Query,
}

impl Operation {
    fn fallback(self) -> &'static str {
        match self {
            Operation::Index => INDEX_FALLBACK,
            Operation::Query => QUERY_FALLBACK,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("backend rejected request with {status}: {}", .detail.as_deref().unwrap_or("<no detail>"))]
    Rejected {
        status: StatusCode,
        detail: Option<String>,
    },

    /// No response at all (connection refused, DNS, reset...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request task ended without producing an outcome (it panicked or
    /// was cancelled).
    #[error("request task ended without a response: {0}")]
    Interrupted(String),

    /// A response arrived but its body did not match the expected shape.
    #[error("could not decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// The line shown in the error slot for a failed `op`.
    pub fn user_message(&self, op: Operation) -> String {
        match self {
            ApiError::Rejected {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            ApiError::Rejected { .. } => op.fallback().to_string(),
            ApiError::Transport(_) | ApiError::Interrupted(_) | ApiError::Decode { .. } => {
                UNREACHABLE.to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid number in {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("failed to load env file {path}: {reason}")]
    EnvFile { path: String, reason: String },
}
