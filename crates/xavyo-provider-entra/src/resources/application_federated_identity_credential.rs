//! `azuread_application_federated_identity_credential`: a federated identity
//! credential owned by an application.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};
use xavyo_provider::schema::{AttributeSchema, ResourceSchema, Validator};
use xavyo_provider::{
    GatewayError, NamedLockRegistry, Operation, ProviderError, ProviderResult, ResourceData,
    ResourceHandler,
};

use super::{
    canonical_object_id, fetch_application, removed_from_state, set_application_object_id,
    APPLICATION_LOCK_SCOPE,
};
use crate::api::{ApplicationsApi, ODataQuery};
use crate::ids::FederatedIdentityCredentialId;
use crate::models::FederatedIdentityCredential;

pub(crate) const RESOURCE_TYPE: &str = "azuread_application_federated_identity_credential";

const APPLICATION_OBJECT_ID: &str = "application_object_id";
const DISPLAY_NAME: &str = "display_name";
const DESCRIPTION: &str = "description";
const AUDIENCES: &str = "audiences";
const ISSUER: &str = "issuer";
const SUBJECT: &str = "subject";
const CREDENTIAL_ID: &str = "credential_id";

/// Manages a federated identity credential of an application.
pub struct ApplicationFederatedIdentityCredentialResource {
    client: Arc<dyn ApplicationsApi>,
    locks: Arc<NamedLockRegistry>,
}

impl ApplicationFederatedIdentityCredentialResource {
    pub fn new(client: Arc<dyn ApplicationsApi>, locks: Arc<NamedLockRegistry>) -> Self {
        Self { client, locks }
    }
}

/// Mutable credential fields from declared configuration.
///
/// An absent description is sent as an empty string so that removing it from
/// configuration clears it remotely.
fn declared_credential(data: &ResourceData) -> ProviderResult<FederatedIdentityCredential> {
    Ok(FederatedIdentityCredential {
        id: None,
        name: None,
        description: Some(data.get_str(DESCRIPTION).unwrap_or_default().to_string()),
        audiences: Some(data.get_list(AUDIENCES)),
        issuer: Some(data.require_str(ISSUER)?.to_string()),
        subject: Some(data.require_str(SUBJECT)?.to_string()),
    })
}

fn credential_error(err: crate::EntraError, id: &str, action: &str) -> ProviderError {
    if err.is_not_found() {
        ProviderError::not_found(
            id,
            format!("Federated identity credential {id:?} was not found"),
        )
        .at("id")
    } else {
        ProviderError::api(format!("{action} federated identity credential {id:?}"), err)
    }
}

#[async_trait]
impl ResourceHandler for ApplicationFederatedIdentityCredentialResource {
    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new()
            .with_attribute(
                APPLICATION_OBJECT_ID,
                AttributeSchema::required_string()
                    .force_new()
                    .with_validator(Validator::Uuid)
                    .with_description("The object ID of the application"),
            )
            .with_attribute(
                DISPLAY_NAME,
                AttributeSchema::required_string()
                    .force_new()
                    .with_validator(Validator::CredentialName)
                    .with_description("A unique display name for the credential"),
            )
            .with_attribute(
                DESCRIPTION,
                AttributeSchema::optional_string()
                    .with_description("A description for the credential"),
            )
            .with_attribute(
                AUDIENCES,
                AttributeSchema::required_list()
                    .with_items(1, 1)
                    .with_validator(Validator::NotEmpty)
                    .with_description("Audience that can appear in the external token"),
            )
            .with_attribute(
                ISSUER,
                AttributeSchema::required_string()
                    .with_validator(Validator::NotEmpty)
                    .with_description("The URL of the external identity provider"),
            )
            .with_attribute(
                SUBJECT,
                AttributeSchema::required_string()
                    .with_validator(Validator::NotEmpty)
                    .with_description("The identifier of the external software workload"),
            )
            .with_attribute(
                CREDENTIAL_ID,
                AttributeSchema::computed_string()
                    .with_description("A UUID used to uniquely identify this credential"),
            )
    }

    fn validate_import_id(&self, id: &str) -> ProviderResult<()> {
        id.parse::<FederatedIdentityCredentialId>().map(|_| ())
    }

    #[instrument(skip(self, data))]
    async fn create(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let object_id =
            canonical_object_id(APPLICATION_OBJECT_ID, data.require_str(APPLICATION_OBJECT_ID)?)?;
        let credential = FederatedIdentityCredential {
            name: Some(data.require_str(DISPLAY_NAME)?.to_string()),
            ..declared_credential(data)?
        };

        let guard = self.locks.acquire(APPLICATION_LOCK_SCOPE, &object_id).await;

        fetch_application(
            self.client.as_ref(),
            Operation::Create,
            &object_id,
            &ODataQuery::select(&["id"]),
        )
        .await?;

        let created = self
            .client
            .create_federated_identity_credential(&object_id, &credential)
            .await
            .map_err(|e| {
                ProviderError::api(
                    format!(
                        "Adding federated identity credential for application with object ID {object_id:?}"
                    ),
                    e,
                )
                .at(APPLICATION_OBJECT_ID)
            })?;

        let key_id = created.and_then(|c| c.id).ok_or_else(|| {
            ProviderError::integrity(
                Operation::Create,
                &object_id,
                "nil credential or credential with nil ID was returned",
            )
        })?;

        let id = FederatedIdentityCredentialId::from_parts(&object_id, &key_id)?;
        data.set_id(id.to_string());
        drop(guard);

        info!(%id, "Federated identity credential created");
        self.read(data).await
    }

    #[instrument(skip(self, data), fields(id = data.id()))]
    async fn read(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let id: FederatedIdentityCredentialId = data.require_id()?.parse()?;
        let (object_id, key_id) = (id.object_id.to_string(), id.key_id.to_string());

        let credential = match self
            .client
            .get_federated_identity_credential(&object_id, &key_id, &ODataQuery::default())
            .await
        {
            Ok(credential) => credential,
            Err(e) if e.is_not_found() => {
                removed_from_state(RESOURCE_TYPE, &id.to_string());
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(credential_error(e, &id.to_string(), "Retrieving")),
        };

        let Some(credential) = credential.filter(|c| c.id.is_some()) else {
            return Err(ProviderError::integrity(
                Operation::Read,
                id.to_string(),
                "nil credential or credential with nil ID was returned",
            ));
        };

        // Normalize a short-form import ID.
        data.set_id(id.to_string());
        set_application_object_id(data, APPLICATION_OBJECT_ID, &object_id);
        data.set(CREDENTIAL_ID, key_id);
        data.set(DISPLAY_NAME, credential.name);
        data.set(DESCRIPTION, credential.description.filter(|d| !d.is_empty()));
        data.set_list(AUDIENCES, credential.audiences.unwrap_or_default());
        data.set(ISSUER, credential.issuer);
        data.set(SUBJECT, credential.subject);
        Ok(())
    }

    #[instrument(skip(self, data), fields(id = data.id()))]
    async fn update(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let id: FederatedIdentityCredentialId = data.require_id()?.parse()?;
        let patch = declared_credential(data)?;
        let object_id = id.object_id.to_string();

        {
            let _guard = self.locks.acquire(APPLICATION_LOCK_SCOPE, &object_id).await;
            self.client
                .update_federated_identity_credential(&object_id, &id.key_id.to_string(), &patch)
                .await
                .map_err(|e| credential_error(e, &id.to_string(), "Updating"))?;
        }

        info!(%id, "Federated identity credential updated");
        self.read(data).await
    }

    /// Removes the credential. One that is already gone counts as deleted.
    #[instrument(skip(self, data), fields(id = data.id()))]
    async fn delete(&self, data: &ResourceData) -> ProviderResult<()> {
        let id: FederatedIdentityCredentialId = data.require_id()?.parse()?;
        let object_id = id.object_id.to_string();

        let _guard = self.locks.acquire(APPLICATION_LOCK_SCOPE, &object_id).await;
        match self
            .client
            .delete_federated_identity_credential(&object_id, &id.key_id.to_string())
            .await
        {
            Ok(()) => {
                info!(%id, "Federated identity credential deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(%id, "Federated identity credential already deleted");
                Ok(())
            }
            Err(e) => Err(credential_error(e, &id.to_string(), "Deleting")),
        }
    }
}
