use std::result;

use crate::retry::RetryableError;
use thiserror::Error;

/// Error types for paper search, classification setup and export
#[derive(Error, Debug)]
pub enum PubMedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing failed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// Invalid PMID format
    #[error("Invalid PMID format: {pmid}")]
    InvalidPmid { pmid: String },

    /// Caller passed a value that violates an API contract
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Indicator configuration could not be read or parsed
    #[error("Invalid indicator configuration: {message}")]
    ConfigError { message: String },

    /// API rate limit exceeded
    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// IO error for file operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Search limit exceeded
    #[error("Search limit exceeded: requested {requested}, maximum is {maximum}")]
    SearchLimitExceeded { requested: usize, maximum: usize },
}

pub type Result<T> = result::Result<T, PubMedError>;

impl RetryableError for PubMedError {
    fn is_retryable(&self) -> bool {
        match self {
            PubMedError::RequestError(err) => {
                if err.is_timeout() || err.is_connect() {
                    return true;
                }

                if let Some(status) = err.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }

                !err.is_builder() && !err.is_redirect() && !err.is_decode()
            }

            PubMedError::RateLimitExceeded => true,

            PubMedError::ApiError { status, message } => {
                (500..600).contains(status) || *status == 429 || {
                    let lower_msg = message.to_lowercase();
                    lower_msg.contains("temporarily unavailable")
                        || lower_msg.contains("timeout")
                }
            }

            PubMedError::JsonError(_)
            | PubMedError::XmlError(_)
            | PubMedError::InvalidPmid { .. }
            | PubMedError::InvalidArgument(_)
            | PubMedError::ConfigError { .. }
            | PubMedError::CsvError(_)
            | PubMedError::IoError(_)
            | PubMedError::SearchLimitExceeded { .. } => false,
        }
    }

    fn retry_reason(&self) -> &str {
        match self {
            PubMedError::RequestError(err) if err.is_timeout() => "Request timeout",
            PubMedError::RequestError(err) if err.is_connect() => "Connection error",
            PubMedError::RequestError(_) => "Network error",
            PubMedError::RateLimitExceeded => "Rate limit exceeded",
            PubMedError::ApiError { status: 429, .. } => "Rate limit exceeded",
            PubMedError::ApiError { status: 500..=599, .. } => "Server error",
            PubMedError::ApiError { .. } => "API error",
            PubMedError::JsonError(_) => "Invalid JSON response",
            PubMedError::XmlError(_) => "Invalid XML response",
            PubMedError::InvalidPmid { .. } | PubMedError::InvalidArgument(_) => "Invalid input",
            PubMedError::ConfigError { .. } => "Invalid configuration",
            PubMedError::CsvError(_) | PubMedError::IoError(_) => "File system error",
            PubMedError::SearchLimitExceeded { .. } => "Invalid query",
        }
    }
}
