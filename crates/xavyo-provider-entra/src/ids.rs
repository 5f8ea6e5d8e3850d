//! Composite resource IDs.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use uuid::Uuid;
use xavyo_provider::{ProviderError, ProviderResult};

const CREDENTIAL_SEGMENT: &str = "federatedIdentityCredential";

/// ID of a federated identity credential:
/// `{objectId}/federatedIdentityCredential/{keyId}`.
///
/// The short form `{objectId}/{keyId}` is also accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FederatedIdentityCredentialId {
    pub object_id: Uuid,
    pub key_id: Uuid,
}

impl FederatedIdentityCredentialId {
    #[must_use]
    pub fn new(object_id: Uuid, key_id: Uuid) -> Self {
        Self { object_id, key_id }
    }

    /// Build from the string IDs Graph returns.
    pub fn from_parts(object_id: &str, key_id: &str) -> ProviderResult<Self> {
        Ok(Self {
            object_id: parse_part(object_id, object_id, "object ID")?,
            key_id: parse_part(key_id, key_id, "credential ID")?,
        })
    }
}

impl Display for FederatedIdentityCredentialId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.object_id, CREDENTIAL_SEGMENT, self.key_id)
    }
}

impl FromStr for FederatedIdentityCredentialId {
    type Err = ProviderError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = id.split('/').collect();
        let (object_id, key_id) = match parts.as_slice() {
            [object_id, segment, key_id] if *segment == CREDENTIAL_SEGMENT => (*object_id, *key_id),
            [object_id, key_id] => (*object_id, *key_id),
            _ => {
                return Err(ProviderError::invalid_id(
                    id,
                    format!("expected {{objectId}}/{CREDENTIAL_SEGMENT}/{{keyId}}"),
                ))
            }
        };

        Ok(Self {
            object_id: parse_part(id, object_id, "object ID")?,
            key_id: parse_part(id, key_id, "credential ID")?,
        })
    }
}

fn parse_part(id: &str, part: &str, what: &str) -> ProviderResult<Uuid> {
    Uuid::parse_str(part)
        .map_err(|e| ProviderError::invalid_id(id, format!("{what} {part:?} is not a valid UUID: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJECT_ID: &str = "6c9e6a8a-0d6e-4c8e-8a5f-3f0c2f1e9b11";
    const KEY_ID: &str = "0f3b2a55-8c7e-4d12-9a1b-7e6f5d4c3b2a";

    #[test]
    fn test_display() {
        let id = FederatedIdentityCredentialId::from_parts(OBJECT_ID, KEY_ID).unwrap();
        assert_eq!(
            id.to_string(),
            format!("{OBJECT_ID}/federatedIdentityCredential/{KEY_ID}")
        );
    }

    #[test]
    fn test_parse_long_and_short_forms() {
        let long: FederatedIdentityCredentialId =
            format!("{OBJECT_ID}/federatedIdentityCredential/{KEY_ID}").parse().unwrap();
        let short: FederatedIdentityCredentialId = format!("{OBJECT_ID}/{KEY_ID}").parse().unwrap();

        assert_eq!(long, short);
        assert_eq!(long.object_id.to_string(), OBJECT_ID);
        assert_eq!(long.key_id.to_string(), KEY_ID);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let malformed = vec![
            String::new(),
            OBJECT_ID.to_string(),
            "not-a-uuid/also-not".to_string(),
            format!("{OBJECT_ID}/password/{KEY_ID}"),
            format!("{OBJECT_ID}/federatedIdentityCredential/{KEY_ID}/extra"),
        ];
        for id in &malformed {
            let err = id.parse::<FederatedIdentityCredentialId>().unwrap_err();
            assert_eq!(err.error_code(), "INVALID_ID", "{id}");
        }
    }
}
