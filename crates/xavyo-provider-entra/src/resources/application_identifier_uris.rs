//! `azuread_application_identifier_uris`: the identifier URI list of an
//! existing application.
//!
//! The resource owns the application's whole `identifierUris` property. Its ID
//! is the application object ID.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use xavyo_provider::schema::{AttributeSchema, ResourceSchema, Validator};
use xavyo_provider::validate::parse_object_id;
use xavyo_provider::{
    GatewayError, NamedLockRegistry, Operation, ProviderError, ProviderResult, ResourceData,
    ResourceHandler,
};

use super::{
    canonical_object_id, fetch_application, removed_from_state, set_application_object_id,
    APPLICATION_LOCK_SCOPE,
};
use crate::api::{ApplicationsApi, ODataQuery};
use crate::models::Application;

pub(crate) const RESOURCE_TYPE: &str = "azuread_application_identifier_uris";

const APPLICATION_OBJECT_ID: &str = "application_object_id";
const IDENTIFIER_URIS: &str = "identifier_uris";

/// Manages the identifier URIs of an application.
pub struct ApplicationIdentifierUrisResource {
    client: Arc<dyn ApplicationsApi>,
    locks: Arc<NamedLockRegistry>,
}

impl ApplicationIdentifierUrisResource {
    pub fn new(client: Arc<dyn ApplicationsApi>, locks: Arc<NamedLockRegistry>) -> Self {
        Self { client, locks }
    }

    fn query() -> ODataQuery {
        ODataQuery::select(&["id", "identifierUris"])
    }

    /// Replace the application's identifier URIs under the application lock.
    async fn replace_uris(
        &self,
        operation: Operation,
        object_id: &str,
        uris: BTreeSet<String>,
    ) -> ProviderResult<()> {
        let _guard = self.locks.acquire(APPLICATION_LOCK_SCOPE, object_id).await;

        fetch_application(self.client.as_ref(), operation, object_id, &Self::query()).await?;

        let count = uris.len();
        let patch = Application::identifier_uris_patch(object_id, uris.into_iter().collect());
        self.client.update_application(&patch).await.map_err(|e| {
            ProviderError::api(
                format!("Could not update application with object ID {object_id:?}"),
                e,
            )
            .at(IDENTIFIER_URIS)
        })?;

        info!(%operation, object_id, count, "Identifier URIs replaced");
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for ApplicationIdentifierUrisResource {
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
                IDENTIFIER_URIS,
                AttributeSchema::optional_set()
                    .with_validator(Validator::AppUri)
                    .with_description("The user-defined URIs that uniquely identify the application"),
            )
    }

    fn validate_import_id(&self, id: &str) -> ProviderResult<()> {
        parse_object_id(id).map(|_| ())
    }

    #[instrument(skip(self, data))]
    async fn create(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let object_id =
            canonical_object_id(APPLICATION_OBJECT_ID, data.require_str(APPLICATION_OBJECT_ID)?)?;
        self.replace_uris(Operation::Create, &object_id, data.get_set(IDENTIFIER_URIS))
            .await?;

        data.set_id(&object_id);
        self.read(data).await
    }

    #[instrument(skip(self, data), fields(id = data.id()))]
    async fn read(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let object_id = canonical_object_id("id", data.require_id()?)?;

        let app = match self.client.get_application(&object_id, &Self::query()).await {
            Ok(app) => app,
            Err(e) if e.is_not_found() => {
                removed_from_state(RESOURCE_TYPE, &object_id);
                data.clear_id();
                return Ok(());
            }
            Err(e) => {
                return Err(ProviderError::api(
                    format!("Retrieving application with object ID {object_id:?}"),
                    e,
                )
                .at("id"))
            }
        };

        let Some(app) = app.filter(|app| app.id.is_some()) else {
            return Err(ProviderError::integrity(
                Operation::Read,
                object_id,
                "nil application or application with nil ID was returned",
            ));
        };

        set_application_object_id(data, APPLICATION_OBJECT_ID, &object_id);
        data.set_id(object_id);
        data.set_set(IDENTIFIER_URIS, app.identifier_uris.unwrap_or_default());
        Ok(())
    }

    #[instrument(skip(self, data), fields(id = data.id()))]
    async fn update(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let object_id = canonical_object_id("id", data.require_id()?)?;
        self.replace_uris(Operation::Update, &object_id, data.get_set(IDENTIFIER_URIS))
            .await?;

        self.read(data).await
    }

    /// Clears the identifier URIs. A missing application is an error.
    #[instrument(skip(self, data), fields(id = data.id()))]
    async fn delete(&self, data: &ResourceData) -> ProviderResult<()> {
        let object_id = canonical_object_id("id", data.require_id()?)?;
        self.replace_uris(Operation::Delete, &object_id, BTreeSet::new())
            .await
    }
}
