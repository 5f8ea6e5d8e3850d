//! Error types for the Microsoft Graph gateway.

use thiserror::Error;
use xavyo_provider::GatewayError;

/// Result type alias using `EntraError`.
pub type EntraResult<T> = Result<T, EntraError>;

/// Errors that can occur when talking to Microsoft Graph.
#[derive(Debug, Error)]
pub enum EntraError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Microsoft Graph API error.
    #[error("Graph API error ({status}): {code} - {message}")]
    GraphApi {
        status: u16,
        code: String,
        message: String,
        inner_error: Option<String>,
    },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Maximum retry attempts exceeded.
    #[error("Maximum retries ({attempts}) exceeded, last status {status}")]
    MaxRetriesExceeded { attempts: u32, status: u16 },
}

impl GatewayError for EntraError {
    fn status(&self) -> Option<u16> {
        match self {
            EntraError::GraphApi { status, .. } | EntraError::MaxRetriesExceeded { status, .. } => {
                Some(*status)
            }
            EntraError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_error(status: u16) -> EntraError {
        EntraError::GraphApi {
            status,
            code: "Request_ResourceNotFound".to_string(),
            message: "Resource does not exist".to_string(),
            inner_error: None,
        }
    }

    #[test]
    fn test_not_found_sentinel() {
        assert!(graph_error(404).is_not_found());
        assert!(!graph_error(400).is_not_found());
        assert!(!EntraError::Auth("denied".to_string()).is_not_found());
    }

    #[test]
    fn test_status_exposed() {
        assert_eq!(graph_error(403).status(), Some(403));
        assert_eq!(
            EntraError::MaxRetriesExceeded {
                attempts: 5,
                status: 429
            }
            .status(),
            Some(429)
        );
        assert_eq!(EntraError::Config("x".to_string()).status(), None);
    }

    #[test]
    fn test_display_includes_code() {
        let text = graph_error(404).to_string();
        assert!(text.contains("404"));
        assert!(text.contains("Request_ResourceNotFound"));
    }
}
