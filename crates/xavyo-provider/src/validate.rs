//! Field validators for declared configuration.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::error::{ProviderError, ProviderResult};

/// Schemes accepted for application identifier URIs.
pub const APP_URI_SCHEMES: &[&str] = &["http", "https", "api", "urn", "ms-appx"];

/// Federated identity credential names: URL friendly, 3 to 120 characters.
static CREDENTIAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]{2,119}$").expect("credential name pattern is valid")
});

/// Validates that `value` is a well-formed UUID.
pub fn validate_uuid(attribute: &str, value: &str) -> ProviderResult<()> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|e| ProviderError::validation(attribute, format!("expected a valid UUID, got {value:?}: {e}")))
}

/// Validates that `value` is not empty or whitespace.
pub fn validate_not_empty(attribute: &str, value: &str) -> ProviderResult<()> {
    if value.trim().is_empty() {
        return Err(ProviderError::validation(attribute, "value must not be empty"));
    }
    Ok(())
}

/// Validates an application identifier URI.
///
/// The URI must be absolute with one of [`APP_URI_SCHEMES`], `http`/`https`
/// URIs need a host, and a trailing slash is rejected.
pub fn validate_app_uri(attribute: &str, value: &str) -> ProviderResult<()> {
    validate_not_empty(attribute, value)?;

    let uri = Url::parse(value)
        .map_err(|e| ProviderError::validation(attribute, format!("{value:?} is not a valid URI: {e}")))?;

    if !APP_URI_SCHEMES.contains(&uri.scheme()) {
        return Err(ProviderError::validation(
            attribute,
            format!(
                "{value:?} has unsupported scheme {:?}, expected one of {}",
                uri.scheme(),
                APP_URI_SCHEMES.join(", ")
            ),
        ));
    }

    if matches!(uri.scheme(), "http" | "https") && uri.host_str().is_none_or(str::is_empty) {
        return Err(ProviderError::validation(
            attribute,
            format!("{value:?} has no host"),
        ));
    }

    if value.ends_with('/') {
        return Err(ProviderError::validation(
            attribute,
            format!("{value:?} must not have a trailing slash"),
        ));
    }

    Ok(())
}

/// Validates a federated identity credential name.
pub fn validate_credential_name(attribute: &str, value: &str) -> ProviderResult<()> {
    if !CREDENTIAL_NAME.is_match(value) {
        return Err(ProviderError::validation(
            attribute,
            format!(
                "{value:?} must be 3-120 characters, start with a letter or digit, \
                 and contain only letters, digits, '-' or '_'"
            ),
        ));
    }
    Ok(())
}

/// Validates that `value` is a non-empty JSON document.
pub fn validate_json(attribute: &str, value: &str) -> ProviderResult<()> {
    validate_not_empty(attribute, value)?;
    serde_json::from_str::<serde_json::Value>(value)
        .map(|_| ())
        .map_err(|e| ProviderError::validation(attribute, format!("value is not valid JSON: {e}")))
}

/// Parses a plain object ID supplied for import.
pub fn parse_object_id(id: &str) -> ProviderResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| {
        ProviderError::invalid_id(id, format!("specified object ID is not a valid UUID: {e}"))
    })
}
