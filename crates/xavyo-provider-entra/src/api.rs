//! Gateway traits consumed by the resource handlers.
//!
//! Handlers depend on these traits rather than on [`GraphClient`](crate::GraphClient)
//! directly, so they can be driven by an in-memory directory in tests.
//!
//! Calls that return an object yield `Ok(None)` when Graph answers with a
//! successful but empty (or `null`) body. A missing object is an error whose
//! [`is_not_found`](xavyo_provider::GatewayError::is_not_found) is true.

use async_trait::async_trait;
use url::Url;

use crate::models::{Application, ClaimsMappingPolicy, FederatedIdentityCredential};
use crate::EntraResult;

/// OData query options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataQuery {
    select: Vec<String>,
}

impl ODataQuery {
    /// Query selecting only the given properties.
    #[must_use]
    pub fn select(fields: &[&str]) -> Self {
        Self {
            select: fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    /// Selected properties.
    #[must_use]
    pub fn selected(&self) -> &[String] {
        &self.select
    }

    /// Append the query options to `url`.
    pub fn apply_to(&self, url: &mut Url) {
        if !self.select.is_empty() {
            url.query_pairs_mut()
                .append_pair("$select", &self.select.join(","));
        }
    }
}

/// Application registrations and their federated identity credentials.
#[async_trait]
pub trait ApplicationsApi: Send + Sync {
    /// `GET /applications/{id}`
    async fn get_application(
        &self,
        object_id: &str,
        query: &ODataQuery,
    ) -> EntraResult<Option<Application>>;

    /// `PATCH /applications/{id}` with the fields set on `patch`.
    ///
    /// `patch.id` names the application.
    async fn update_application(&self, patch: &Application) -> EntraResult<()>;

    /// `GET /applications/{id}/federatedIdentityCredentials/{keyId}`
    async fn get_federated_identity_credential(
        &self,
        object_id: &str,
        key_id: &str,
        query: &ODataQuery,
    ) -> EntraResult<Option<FederatedIdentityCredential>>;

    /// `POST /applications/{id}/federatedIdentityCredentials`
    async fn create_federated_identity_credential(
        &self,
        object_id: &str,
        credential: &FederatedIdentityCredential,
    ) -> EntraResult<Option<FederatedIdentityCredential>>;

    /// `PATCH /applications/{id}/federatedIdentityCredentials/{keyId}`
    async fn update_federated_identity_credential(
        &self,
        object_id: &str,
        key_id: &str,
        patch: &FederatedIdentityCredential,
    ) -> EntraResult<()>;

    /// `DELETE /applications/{id}/federatedIdentityCredentials/{keyId}`
    async fn delete_federated_identity_credential(
        &self,
        object_id: &str,
        key_id: &str,
    ) -> EntraResult<()>;
}

/// Claims mapping policies.
#[async_trait]
pub trait ClaimsMappingPoliciesApi: Send + Sync {
    /// `GET /policies/claimsMappingPolicies/{id}`
    async fn get_claims_mapping_policy(
        &self,
        policy_id: &str,
        query: &ODataQuery,
    ) -> EntraResult<Option<ClaimsMappingPolicy>>;

    /// `POST /policies/claimsMappingPolicies`
    async fn create_claims_mapping_policy(
        &self,
        policy: &ClaimsMappingPolicy,
    ) -> EntraResult<Option<ClaimsMappingPolicy>>;

    /// `PATCH /policies/claimsMappingPolicies/{id}`
    async fn update_claims_mapping_policy(
        &self,
        policy_id: &str,
        patch: &ClaimsMappingPolicy,
    ) -> EntraResult<()>;

    /// `DELETE /policies/claimsMappingPolicies/{id}`
    async fn delete_claims_mapping_policy(&self, policy_id: &str) -> EntraResult<()>;
}
