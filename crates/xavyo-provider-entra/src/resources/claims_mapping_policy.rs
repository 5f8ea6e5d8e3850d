//! `azuread_claims_mapping_policy`: a standalone claims mapping policy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use xavyo_provider::schema::{AttributeSchema, ResourceSchema, Validator};
use xavyo_provider::validate::parse_object_id;
use xavyo_provider::{
    GatewayError, NamedLockRegistry, Operation, ProviderError, ProviderResult, ResourceData,
    ResourceHandler,
};

use super::removed_from_state;
use crate::api::{ClaimsMappingPoliciesApi, ODataQuery};
use crate::models::ClaimsMappingPolicy;
use crate::EntraError;

pub(crate) const RESOURCE_TYPE: &str = "azuread_claims_mapping_policy";

/// Lock scope for claims mapping policy mutations, keyed by policy ID.
pub const POLICY_LOCK_SCOPE: &str = "azuread_claims_mapping_policy";

const DISPLAY_NAME: &str = "display_name";
const DEFINITION: &str = "definition";

/// Manages a claims mapping policy.
pub struct ClaimsMappingPolicyResource {
    client: Arc<dyn ClaimsMappingPoliciesApi>,
    locks: Arc<NamedLockRegistry>,
}

impl ClaimsMappingPolicyResource {
    pub fn new(client: Arc<dyn ClaimsMappingPoliciesApi>, locks: Arc<NamedLockRegistry>) -> Self {
        Self { client, locks }
    }
}

fn declared_policy(data: &ResourceData) -> ProviderResult<ClaimsMappingPolicy> {
    Ok(ClaimsMappingPolicy {
        id: None,
        display_name: Some(data.require_str(DISPLAY_NAME)?.to_string()),
        definition: Some(data.get_list(DEFINITION)),
    })
}

fn policy_error(err: EntraError, policy_id: &str, action: &str) -> ProviderError {
    if err.is_not_found() {
        ProviderError::not_found(
            policy_id,
            format!("Claims mapping policy with object ID {policy_id:?} was not found"),
        )
        .at("id")
    } else {
        ProviderError::api(
            format!("{action} claims mapping policy with object ID {policy_id:?}"),
            err,
        )
    }
}

#[async_trait]
impl ResourceHandler for ClaimsMappingPolicyResource {
    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new()
            .with_attribute(
                DISPLAY_NAME,
                AttributeSchema::required_string()
                    .with_validator(Validator::NotEmpty)
                    .with_description("The display name for this policy"),
            )
            .with_attribute(
                DEFINITION,
                AttributeSchema::required_list()
                    .with_validator(Validator::Json)
                    .with_description("The claims mapping policy, as JSON strings"),
            )
    }

    fn validate_import_id(&self, id: &str) -> ProviderResult<()> {
        parse_object_id(id).map(|_| ())
    }

    #[instrument(skip(self, data))]
    async fn create(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let policy = declared_policy(data)?;

        let created = self
            .client
            .create_claims_mapping_policy(&policy)
            .await
            .map_err(|e| ProviderError::api("Creating claims mapping policy", e))?;

        let policy_id = created.and_then(|p| p.id).ok_or_else(|| {
            ProviderError::integrity(
                Operation::Create,
                policy.display_name.clone().unwrap_or_default(),
                "nil policy or policy with nil ID was returned",
            )
        })?;

        info!(policy_id, "Claims mapping policy created");
        data.set_id(policy_id);
        self.read(data).await
    }

    #[instrument(skip(self, data), fields(id = data.id()))]
    async fn read(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let policy_id = data.require_id()?.to_string();

        let policy = match self
            .client
            .get_claims_mapping_policy(&policy_id, &ODataQuery::default())
            .await
        {
            Ok(policy) => policy,
            Err(e) if e.is_not_found() => {
                removed_from_state(RESOURCE_TYPE, &policy_id);
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(policy_error(e, &policy_id, "Retrieving")),
        };

        let Some(policy) = policy.filter(|p| p.id.is_some()) else {
            return Err(ProviderError::integrity(
                Operation::Read,
                policy_id,
                "nil policy or policy with nil ID was returned",
            ));
        };

        data.set(DISPLAY_NAME, policy.display_name);
        data.set_list(DEFINITION, policy.definition.unwrap_or_default());
        Ok(())
    }

    #[instrument(skip(self, data), fields(id = data.id()))]
    async fn update(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let policy_id = data.require_id()?.to_string();
        let patch = declared_policy(data)?;

        self.locks
            .with_lock(POLICY_LOCK_SCOPE, &policy_id, || async {
                self.client
                    .update_claims_mapping_policy(&policy_id, &patch)
                    .await
                    .map_err(|e| policy_error(e, &policy_id, "Updating"))
            })
            .await?;

        info!(policy_id, "Claims mapping policy updated");
        self.read(data).await
    }

    /// Deletes the policy. A policy that is already gone is an error.
    #[instrument(skip(self, data), fields(id = data.id()))]
    async fn delete(&self, data: &ResourceData) -> ProviderResult<()> {
        let policy_id = data.require_id()?;

        self.locks
            .with_lock(POLICY_LOCK_SCOPE, policy_id, || async {
                self.client
                    .delete_claims_mapping_policy(policy_id)
                    .await
                    .map_err(|e| policy_error(e, policy_id, "Deleting"))
            })
            .await?;

        info!(policy_id, "Claims mapping policy deleted");
        Ok(())
    }
}
