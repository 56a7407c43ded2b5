use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("API returned error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed (HTTP {0}), check api_key and api_secret")]
    AuthError(u16),

    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: String },

    #[error("{kind} rejected by OPNsense: {}", format_validations(.messages))]
    Validation {
        kind: String,
        messages: BTreeMap<String, String>,
    },

    #[error("Unexpected result from {operation}: {result:?}")]
    UnexpectedResult { operation: String, result: String },

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound { .. } | ApiError::ApiError { status: 404, .. }
        )
    }
}

fn format_validations(messages: &BTreeMap<String, String>) -> String {
    messages
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_field() {
        let err = ApiError::Validation {
            kind: "backend".to_string(),
            messages: BTreeMap::from([
                ("backend.name".to_string(), "Should be a string".to_string()),
                ("backend.mode".to_string(), "Option not in list".to_string()),
            ]),
        };
        assert_eq!(
            err.to_string(),
            "backend rejected by OPNsense: backend.mode: Option not in list; backend.name: Should be a string"
        );
    }

    #[test]
    fn http_404_counts_as_not_found() {
        let err = ApiError::ApiError {
            status: 404,
            message: "gone".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!ApiError::RateLimited.is_not_found());
    }
}
