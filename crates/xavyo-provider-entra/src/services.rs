//! Service registrations contributing Entra resources to the provider.

use std::sync::Arc;

use tracing::info;
use xavyo_provider::{NamedLockRegistry, Provider, ResourceHandler, ServiceRegistration};

use crate::api::{ApplicationsApi, ClaimsMappingPoliciesApi};
use crate::resources::{
    ApplicationFederatedIdentityCredentialResource, ApplicationIdentifierUrisResource,
    ClaimsMappingPolicyResource,
};
use crate::{EntraConfig, EntraCredentials, EntraResult, GraphClient};

/// The "Applications" service.
pub struct ApplicationsRegistration {
    client: Arc<dyn ApplicationsApi>,
    locks: Arc<NamedLockRegistry>,
}

impl ApplicationsRegistration {
    pub fn new(client: Arc<dyn ApplicationsApi>, locks: Arc<NamedLockRegistry>) -> Self {
        Self { client, locks }
    }
}

impl ServiceRegistration for ApplicationsRegistration {
    fn name(&self) -> &'static str {
        "Applications"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Applications"]
    }

    fn supported_resources(&self) -> Vec<Arc<dyn ResourceHandler>> {
        vec![
            Arc::new(ApplicationIdentifierUrisResource::new(
                self.client.clone(),
                self.locks.clone(),
            )) as Arc<dyn ResourceHandler>,
            Arc::new(ApplicationFederatedIdentityCredentialResource::new(
                self.client.clone(),
                self.locks.clone(),
            )),
        ]
    }
}

/// The "Policies" service.
pub struct PoliciesRegistration {
    client: Arc<dyn ClaimsMappingPoliciesApi>,
    locks: Arc<NamedLockRegistry>,
}

impl PoliciesRegistration {
    pub fn new(client: Arc<dyn ClaimsMappingPoliciesApi>, locks: Arc<NamedLockRegistry>) -> Self {
        Self { client, locks }
    }
}

impl ServiceRegistration for PoliciesRegistration {
    fn name(&self) -> &'static str {
        "Policies"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Policies"]
    }

    fn supported_resources(&self) -> Vec<Arc<dyn ResourceHandler>> {
        let handler: Arc<dyn ResourceHandler> = Arc::new(ClaimsMappingPolicyResource::new(
            self.client.clone(),
            self.locks.clone(),
        ));
        vec![handler]
    }
}

/// Register every Entra service against one Graph client and lock registry.
pub fn register_services(client: Arc<GraphClient>, locks: Arc<NamedLockRegistry>) -> Provider {
    Provider::new()
        .with_service(&ApplicationsRegistration::new(client.clone(), locks.clone()))
        .with_service(&PoliciesRegistration::new(client, locks))
}

/// Build a provider talking to the configured tenant.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the Graph client
/// cannot be created.
pub fn build_provider(config: &EntraConfig, credentials: EntraCredentials) -> EntraResult<Provider> {
    config.validate()?;
    let client = Arc::new(GraphClient::new(config, credentials)?);
    let provider = register_services(client, Arc::new(NamedLockRegistry::new()));

    info!(
        tenant_id = %config.tenant_id,
        environment = ?config.environment,
        resource_types = ?provider.resource_types().collect::<Vec<_>>(),
        "Entra provider configured"
    );
    Ok(provider)
}
