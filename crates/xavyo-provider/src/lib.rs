//! # Provider Framework
//!
//! Core abstractions for declaring directory resources and reconciling them
//! with a remote API.
//!
//! Each resource type maps a declared configuration block onto a remote
//! object through four phases (Create, Read, Update, Delete). Mutating phases
//! run under a named lock so two handlers never modify the same remote object
//! at the same time.
//!
//! ## Architecture
//!
//! - [`NamedLockRegistry`] - Per-object exclusive locks, injected into handlers
//! - [`ResourceHandler`] - The four-phase protocol every resource implements
//! - [`ServiceRegistration`] - Groups of resources contributed to the provider
//! - [`Provider`] - Dispatch table with validation, timeouts and diagnostics
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use xavyo_provider::prelude::*;
//!
//! let locks = Arc::new(NamedLockRegistry::new());
//! let provider = Provider::new().with_service(&ApplicationsRegistration::new(client, locks));
//!
//! let mut declared = ResourceData::new()
//!     .with("application_object_id", "6c9e6a8a-0d6e-4c8e-8a5f-3f0c2f1e9b11");
//! declared.set_set("identifier_uris", ["api://my-app"]);
//!
//! let outcome = provider
//!     .apply("azuread_application_identifier_uris", None, declared)
//!     .await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`locks`] - Named lock registry
//! - [`resource`] - Handler trait, operations and timeouts
//! - [`provider`] - Service registration and dispatch
//! - [`state`] - Local resource state
//! - [`schema`] - Declared attribute schema
//! - [`validate`] - Field validators
//! - [`error`] - Error types
//! - [`diagnostics`] - User-facing diagnostics
//! - [`logging`] - Tracing subscriber setup

pub mod diagnostics;
pub mod error;
pub mod locks;
pub mod logging;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod state;
pub mod validate;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{BoxError, GatewayError, ProviderError, ProviderResult};
pub use locks::{LockKey, NamedLockGuard, NamedLockRegistry};
pub use provider::{ApplyOutcome, PlannedAction, Provider, ServiceRegistration};
pub use resource::{Operation, ResourceHandler, ResourceTimeouts};
pub use schema::{AttributeSchema, AttributeType, ResourceSchema, Validator};
pub use state::{AttributeValue, ResourceData};

/// Prelude module for convenient imports.
///
/// ```
/// use xavyo_provider::prelude::*;
/// ```
pub mod prelude {
    pub use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
    pub use crate::error::{GatewayError, ProviderError, ProviderResult};
    pub use crate::locks::NamedLockRegistry;
    pub use crate::provider::{ApplyOutcome, PlannedAction, Provider, ServiceRegistration};
    pub use crate::resource::{Operation, ResourceHandler, ResourceTimeouts};
    pub use crate::schema::{AttributeSchema, ResourceSchema, Validator};
    pub use crate::state::{AttributeValue, ResourceData};
}

// Re-export async_trait for handler implementors
pub use async_trait::async_trait;
