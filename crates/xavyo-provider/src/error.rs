//! Provider error types
//!
//! Errors raised by resource handlers. Each error knows the configuration
//! attribute it relates to (when there is one) so it can be surfaced as a
//! field-level diagnostic.

use std::time::Duration;

use thiserror::Error;

use crate::resource::Operation;

/// Result type alias using `ProviderError`.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Boxed error coming from a remote gateway.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by a remote API gateway.
///
/// Gateways surface the HTTP status of a failed call so handlers can tell a
/// missing object apart from every other failure.
pub trait GatewayError: std::error::Error + Send + Sync + 'static {
    /// HTTP status of the failed call, if the request reached the server.
    fn status(&self) -> Option<u16>;

    /// Whether the remote object does not exist.
    fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Error that can occur while running a resource operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Remote object or sub-resource is absent.
    #[error("{message}")]
    NotFound {
        message: String,
        identifier: String,
        attribute: Option<String>,
    },

    /// Non-2xx response (other than not found) or transport failure.
    #[error("{message}: {source}")]
    Api {
        message: String,
        attribute: Option<String>,
        status: Option<u16>,
        #[source]
        source: BoxError,
    },

    /// A call reported success but returned a null or ID-less object.
    #[error("API error during {operation} of {identifier:?}: {detail}")]
    Integrity {
        operation: Operation,
        identifier: String,
        detail: String,
    },

    /// Declared configuration failed validation.
    #[error("invalid value for {attribute:?}: {message}")]
    Validation { attribute: String, message: String },

    /// A resource ID could not be parsed.
    #[error("invalid resource ID {id:?}: {message}")]
    InvalidId { id: String, message: String },

    /// The operation exceeded its fixed time ceiling.
    #[error("{operation} of {resource_type} timed out after {}s", after.as_secs())]
    Timeout {
        operation: Operation,
        resource_type: String,
        after: Duration,
    },

    /// No handler is registered for the resource type.
    #[error("unsupported resource type: {resource_type}")]
    UnsupportedResource { resource_type: String },
}

impl ProviderError {
    /// Create a not found error for a remote object.
    pub fn not_found(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::NotFound {
            message: message.into(),
            identifier: identifier.into(),
            attribute: None,
        }
    }

    /// Wrap a gateway error, keeping its HTTP status.
    pub fn api<E: GatewayError>(message: impl Into<String>, source: E) -> Self {
        ProviderError::Api {
            message: message.into(),
            attribute: None,
            status: source.status(),
            source: Box::new(source),
        }
    }

    /// Create an integrity error for a null or ID-less object.
    pub fn integrity(
        operation: Operation,
        identifier: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        ProviderError::Integrity {
            operation,
            identifier: identifier.into(),
            detail: detail.into(),
        }
    }

    /// Create a validation error for an attribute.
    pub fn validation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Validation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Create an invalid ID error.
    pub fn invalid_id(id: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::InvalidId {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Attach the attribute path this error relates to.
    ///
    /// Only not found and API errors carry a path; other variants already
    /// name their attribute or have none.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        match &mut self {
            ProviderError::NotFound { attribute, .. } | ProviderError::Api { attribute, .. } => {
                *attribute = Some(path.into());
            }
            _ => {}
        }
        self
    }

    /// The configuration attribute this error relates to, if known.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            ProviderError::NotFound { attribute, .. } | ProviderError::Api { attribute, .. } => {
                attribute.as_deref()
            }
            ProviderError::Validation { attribute, .. } => Some(attribute),
            ProviderError::InvalidId { .. } => Some("id"),
            _ => None,
        }
    }

    /// Check whether this error means the remote object is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ProviderError::NotFound { .. } => "NOT_FOUND",
            ProviderError::Api { .. } => "API_ERROR",
            ProviderError::Integrity { .. } => "INTEGRITY_ERROR",
            ProviderError::Validation { .. } => "VALIDATION_ERROR",
            ProviderError::InvalidId { .. } => "INVALID_ID",
            ProviderError::Timeout { .. } => "TIMEOUT",
            ProviderError::UnsupportedResource { .. } => "UNSUPPORTED_RESOURCE",
        }
    }
}
