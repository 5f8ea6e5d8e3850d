//! Resource handlers for Entra ID objects.
//!
//! Every handler that mutates an application locks [`APPLICATION_LOCK_SCOPE`]
//! keyed by the application object ID, so identifier URIs and federated
//! credentials of the same application never race.

mod application_federated_identity_credential;
mod application_identifier_uris;
mod claims_mapping_policy;

#[cfg(test)]
pub(crate) mod fake;

pub use application_federated_identity_credential::ApplicationFederatedIdentityCredentialResource;
pub use application_identifier_uris::ApplicationIdentifierUrisResource;
pub use claims_mapping_policy::{ClaimsMappingPolicyResource, POLICY_LOCK_SCOPE};

use tracing::debug;
use uuid::Uuid;
use xavyo_provider::{GatewayError, Operation, ProviderError, ProviderResult, ResourceData};

use crate::api::{ApplicationsApi, ODataQuery};
use crate::models::Application;
use crate::EntraError;

/// Lock scope shared by every resource that mutates an application.
pub const APPLICATION_LOCK_SCOPE: &str = "azuread_application";

/// Lower-case hyphenated form of an application object ID.
///
/// Lock keys and stored identifiers always use this form, so two spellings of
/// the same UUID contend on the same application lock.
pub(crate) fn canonical_object_id(attribute: &str, value: &str) -> ProviderResult<String> {
    Uuid::parse_str(value).map(|id| id.to_string()).map_err(|e| {
        ProviderError::validation(attribute, format!("expected a valid UUID, got {value:?}: {e}"))
    })
}

/// Record the application object ID read back from the remote side.
///
/// A declared value naming the same UUID in another spelling is left as is.
pub(crate) fn set_application_object_id(
    data: &mut ResourceData,
    attribute: &str,
    object_id: &str,
) {
    let same = data
        .get_str(attribute)
        .and_then(|declared| Uuid::parse_str(declared).ok())
        .is_some_and(|declared| declared.to_string() == object_id);
    if !same {
        data.set(attribute, object_id.to_string());
    }
}

/// Fetch an application that a mutating phase is about to modify.
///
/// A missing application is reported against `application_object_id`; a
/// successful call without an application (or without its ID) is an
/// integrity error.
pub(crate) async fn fetch_application(
    client: &dyn ApplicationsApi,
    operation: Operation,
    object_id: &str,
    query: &ODataQuery,
) -> ProviderResult<Application> {
    let app = client
        .get_application(object_id, query)
        .await
        .map_err(|e| application_error(e, object_id))?;

    match app {
        Some(app) if app.id.is_some() => Ok(app),
        _ => Err(ProviderError::integrity(
            operation,
            object_id,
            "nil application or application with nil ID was returned",
        )),
    }
}

/// Map a failed application lookup to a provider error.
pub(crate) fn application_error(err: EntraError, object_id: &str) -> ProviderError {
    if err.is_not_found() {
        ProviderError::not_found(
            object_id,
            format!("Application with object ID {object_id:?} was not found"),
        )
        .at("application_object_id")
    } else {
        ProviderError::api(
            format!("Retrieving application with object ID {object_id:?}"),
            err,
        )
        .at("application_object_id")
    }
}

/// Log that a resource is leaving state because its remote object is gone.
pub(crate) fn removed_from_state(resource_type: &str, id: &str) {
    debug!(resource_type, id, "Remote object was not found, removing from state");
}
