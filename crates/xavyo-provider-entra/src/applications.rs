//! Application registration calls against Microsoft Graph.

use async_trait::async_trait;
use tracing::instrument;

use crate::api::{ApplicationsApi, ODataQuery};
use crate::models::{Application, FederatedIdentityCredential};
use crate::{EntraError, EntraResult, GraphClient};

const APPLICATIONS: &str = "applications";
const CREDENTIALS: &str = "federatedIdentityCredentials";

#[async_trait]
impl ApplicationsApi for GraphClient {
    #[instrument(skip(self, query))]
    async fn get_application(
        &self,
        object_id: &str,
        query: &ODataQuery,
    ) -> EntraResult<Option<Application>> {
        let url = self.url(&[APPLICATIONS, object_id], query)?;
        self.get(url).await
    }

    #[instrument(skip(self, patch), fields(object_id = patch.id.as_deref()))]
    async fn update_application(&self, patch: &Application) -> EntraResult<()> {
        let object_id = patch.id.as_deref().ok_or_else(|| {
            EntraError::Config("cannot update an application without an object ID".to_string())
        })?;
        let url = self.url(&[APPLICATIONS, object_id], &ODataQuery::default())?;
        self.patch(url, patch).await
    }

    #[instrument(skip(self, query))]
    async fn get_federated_identity_credential(
        &self,
        object_id: &str,
        key_id: &str,
        query: &ODataQuery,
    ) -> EntraResult<Option<FederatedIdentityCredential>> {
        let url = self.url(&[APPLICATIONS, object_id, CREDENTIALS, key_id], query)?;
        self.get(url).await
    }

    #[instrument(skip(self, credential))]
    async fn create_federated_identity_credential(
        &self,
        object_id: &str,
        credential: &FederatedIdentityCredential,
    ) -> EntraResult<Option<FederatedIdentityCredential>> {
        let url = self.url(&[APPLICATIONS, object_id, CREDENTIALS], &ODataQuery::default())?;
        self.post(url, credential).await
    }

    #[instrument(skip(self, patch))]
    async fn update_federated_identity_credential(
        &self,
        object_id: &str,
        key_id: &str,
        patch: &FederatedIdentityCredential,
    ) -> EntraResult<()> {
        let url = self.url(
            &[APPLICATIONS, object_id, CREDENTIALS, key_id],
            &ODataQuery::default(),
        )?;
        self.patch(url, patch).await
    }

    #[instrument(skip(self))]
    async fn delete_federated_identity_credential(
        &self,
        object_id: &str,
        key_id: &str,
    ) -> EntraResult<()> {
        let url = self.url(
            &[APPLICATIONS, object_id, CREDENTIALS, key_id],
            &ODataQuery::default(),
        )?;
        self.delete(url).await
    }
}
