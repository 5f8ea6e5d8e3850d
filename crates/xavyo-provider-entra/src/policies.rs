//! Claims mapping policy calls against Microsoft Graph.

use async_trait::async_trait;
use tracing::instrument;

use crate::api::{ClaimsMappingPoliciesApi, ODataQuery};
use crate::models::ClaimsMappingPolicy;
use crate::{EntraResult, GraphClient};

const POLICIES: &str = "policies";
const CLAIMS_MAPPING_POLICIES: &str = "claimsMappingPolicies";

#[async_trait]
impl ClaimsMappingPoliciesApi for GraphClient {
    #[instrument(skip(self, query))]
    async fn get_claims_mapping_policy(
        &self,
        policy_id: &str,
        query: &ODataQuery,
    ) -> EntraResult<Option<ClaimsMappingPolicy>> {
        let url = self.url(&[POLICIES, CLAIMS_MAPPING_POLICIES, policy_id], query)?;
        self.get(url).await
    }

    #[instrument(skip(self, policy))]
    async fn create_claims_mapping_policy(
        &self,
        policy: &ClaimsMappingPolicy,
    ) -> EntraResult<Option<ClaimsMappingPolicy>> {
        let url = self.url(&[POLICIES, CLAIMS_MAPPING_POLICIES], &ODataQuery::default())?;
        self.post(url, policy).await
    }

    #[instrument(skip(self, patch))]
    async fn update_claims_mapping_policy(
        &self,
        policy_id: &str,
        patch: &ClaimsMappingPolicy,
    ) -> EntraResult<()> {
        let url = self.url(
            &[POLICIES, CLAIMS_MAPPING_POLICIES, policy_id],
            &ODataQuery::default(),
        )?;
        self.patch(url, patch).await
    }

    #[instrument(skip(self))]
    async fn delete_claims_mapping_policy(&self, policy_id: &str) -> EntraResult<()> {
        let url = self.url(
            &[POLICIES, CLAIMS_MAPPING_POLICIES, policy_id],
            &ODataQuery::default(),
        )?;
        self.delete(url).await
    }
}
