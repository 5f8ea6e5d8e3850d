//! Microsoft Entra ID resources for the xavyo directory provider
//!
//! This crate implements the xavyo-provider resource handlers for Microsoft
//! Entra ID (formerly Azure AD), reconciling declared configuration with the
//! tenant through the Microsoft Graph API.
//!
//! # Resources
//!
//! - `azuread_application_identifier_uris` - Identifier URIs of an application
//! - `azuread_application_federated_identity_credential` - Workload identity federation
//! - `azuread_claims_mapping_policy` - Claims mapping policies
//!
//! # Gateway
//!
//! - `OAuth2` client credentials authentication
//! - Retry with backoff on throttling (429) and transient errors (502/503/504)
//! - Multi-cloud support (Global, US Government, China)
//!
//! # Example
//!
//! ```no_run
//! use xavyo_provider::ResourceData;
//! use xavyo_provider_entra::{build_provider, EntraConfig, EntraCredentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = EntraConfig::builder()
//!     .tenant_id("your-tenant-id")
//!     .build()?;
//! config.apply_env_overrides()?;
//! config.logging.init()?;
//!
//! let provider = build_provider(&config, EntraCredentials::from_env()?)?;
//!
//! let mut declared = ResourceData::new()
//!     .with("application_object_id", "6c9e6a8a-0d6e-4c8e-8a5f-3f0c2f1e9b11");
//! declared.set_set("identifier_uris", ["api://my-app"]);
//!
//! let outcome = provider
//!     .apply("azuread_application_identifier_uris", None, declared)
//!     .await?;
//! println!("{:?}", outcome.action);
//! # Ok(())
//! # }
//! ```

mod api;
mod applications;
mod auth;
mod config;
mod error;
mod graph_client;
mod ids;
mod models;
mod policies;
mod resources;
mod retry;
mod services;

// Re-exports
pub use api::{ApplicationsApi, ClaimsMappingPoliciesApi, ODataQuery};
pub use auth::TokenCache;
pub use config::{
    EntraCloudEnvironment, EntraConfig, EntraConfigBuilder, EntraCredentials, LoggingConfig,
    RetryConfig,
};
pub use error::{EntraError, EntraResult};
pub use graph_client::{GraphClient, ODataError, ODataErrorBody};
pub use ids::FederatedIdentityCredentialId;
pub use models::{Application, ClaimsMappingPolicy, FederatedIdentityCredential};
pub use resources::{
    ApplicationFederatedIdentityCredentialResource, ApplicationIdentifierUrisResource,
    ClaimsMappingPolicyResource, APPLICATION_LOCK_SCOPE, POLICY_LOCK_SCOPE,
};
pub use retry::RetryPolicy;
pub use services::{build_provider, register_services, ApplicationsRegistration, PoliciesRegistration};
