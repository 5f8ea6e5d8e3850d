//! Resource dispatch table
//!
//! [`Provider`] collects the handlers contributed by each service
//! registration and dispatches operations to them by resource type name. It
//! validates declared configuration, enforces the fixed per-operation time
//! ceilings and turns errors into [`Diagnostics`].

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, ProviderResult};
use crate::resource::{Operation, ResourceHandler};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{AttributeValue, ResourceData};

/// A group of related resources contributed to the provider.
pub trait ServiceRegistration: Send + Sync {
    /// Name of this service.
    fn name(&self) -> &'static str;

    /// Categories used to group the service's documentation.
    fn website_categories(&self) -> Vec<&'static str>;

    /// Handlers for the resources this service supports.
    fn supported_resources(&self) -> Vec<Arc<dyn ResourceHandler>>;
}

/// Action taken by [`Provider::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedAction {
    Create,
    Update,
    /// Delete followed by create, because a force-new attribute changed.
    Replace,
    NoOp,
}

/// Result of [`Provider::apply`].
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub action: PlannedAction,
    pub state: ResourceData,
}

/// Difference between refreshed state and declared configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drift {
    InSync,
    InPlace,
    ForcesNew,
}

/// Dispatch table of resource handlers keyed by type name.
#[derive(Default)]
pub struct Provider {
    handlers: BTreeMap<&'static str, Arc<dyn ResourceHandler>>,
    services: Vec<&'static str>,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("services", &self.services)
            .field("resource_types", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Provider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every resource of a service using builder pattern.
    #[must_use]
    pub fn with_service(mut self, service: &dyn ServiceRegistration) -> Self {
        for handler in service.supported_resources() {
            self.register(handler);
        }
        debug!(service = service.name(), "Service registered");
        self.services.push(service.name());
        self
    }

    /// Register a single handler. A later registration replaces an earlier one.
    pub fn register(&mut self, handler: Arc<dyn ResourceHandler>) {
        let type_name = handler.type_name();
        if self.handlers.insert(type_name, handler).is_some() {
            warn!(resource_type = type_name, "Resource handler registered twice, replacing");
        }
    }

    /// Names of the registered services.
    pub fn services(&self) -> &[&'static str] {
        &self.services
    }

    /// Names of every supported resource type.
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Look up the handler for a resource type.
    pub fn handler(&self, resource_type: &str) -> ProviderResult<&Arc<dyn ResourceHandler>> {
        self.handlers
            .get(resource_type)
            .ok_or_else(|| ProviderError::UnsupportedResource {
                resource_type: resource_type.to_string(),
            })
    }

    /// Schema of a resource type.
    pub fn schema(&self, resource_type: &str) -> ProviderResult<ResourceSchema> {
        Ok(self.handler(resource_type)?.schema())
    }

    /// Validate declared configuration for a resource type.
    pub fn validate(&self, resource_type: &str, declared: &ResourceData) -> Result<(), Diagnostics> {
        let errors = self.handler(resource_type)?.schema().validate(declared);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Diagnostics::from(errors))
        }
    }

    /// Create a resource from declared configuration.
    ///
    /// The returned state carries the remote identifier. A handler commits the
    /// identifier only once its mutating call succeeded; if a later step of
    /// the same create fails, the diagnostics carry that state as
    /// [`Diagnostics::partial_state`] so the object is not orphaned.
    #[instrument(skip(self, declared))]
    pub async fn create(
        &self,
        resource_type: &str,
        declared: ResourceData,
    ) -> Result<ResourceData, Diagnostics> {
        let handler = self.handler(resource_type)?;
        self.validate(resource_type, &declared)?;

        let mut data = declared;
        let result = run(handler.as_ref(), Operation::Create, handler.create(&mut data)).await;
        if let Err(diagnostics) = result {
            let Some(id) = data.id() else {
                return Err(diagnostics);
            };
            warn!(resource_type, id, "Resource created but not read back");
            return Err(diagnostics.with_partial_state(data));
        }

        let Some(id) = data.id() else {
            return Err(ProviderError::integrity(
                Operation::Create,
                resource_type,
                "resource was created but could not be read back",
            )
            .into());
        };
        info!(resource_type, id, "Resource created");
        Ok(data)
    }

    /// Refresh state from the remote object.
    ///
    /// If the object no longer exists the returned state has no identifier.
    #[instrument(skip(self, state), fields(id = state.id()))]
    pub async fn read(
        &self,
        resource_type: &str,
        state: ResourceData,
    ) -> Result<ResourceData, Diagnostics> {
        let handler = self.handler(resource_type)?;
        let mut data = state;
        if data.id().is_none() {
            return Ok(data);
        }

        run(handler.as_ref(), Operation::Read, handler.read(&mut data)).await?;
        Ok(data)
    }

    /// Apply declared configuration to an existing resource.
    ///
    /// `state` is the declared configuration carrying the stored identifier.
    #[instrument(skip(self, state), fields(id = state.id()))]
    pub async fn update(
        &self,
        resource_type: &str,
        state: ResourceData,
    ) -> Result<ResourceData, Diagnostics> {
        let handler = self.handler(resource_type)?;
        state.require_id()?;
        self.validate(resource_type, &state)?;

        let mut data = state;
        run(handler.as_ref(), Operation::Update, handler.update(&mut data)).await?;
        info!(resource_type, id = data.id(), "Resource updated");
        Ok(data)
    }

    /// Release the remote state owned by a resource.
    #[instrument(skip(self, state), fields(id = state.id()))]
    pub async fn delete(&self, resource_type: &str, state: &ResourceData) -> Result<(), Diagnostics> {
        let handler = self.handler(resource_type)?;
        let id = state.require_id()?;

        run(handler.as_ref(), Operation::Delete, handler.delete(state)).await?;
        info!(resource_type, id, "Resource deleted");
        Ok(())
    }

    /// Import an existing remote object by identifier.
    #[instrument(skip(self))]
    pub async fn import(&self, resource_type: &str, id: &str) -> Result<ResourceData, Diagnostics> {
        let handler = self.handler(resource_type)?;
        handler.validate_import_id(id)?;

        let mut data = ResourceData::with_id(id);
        run(handler.as_ref(), Operation::Import, handler.read(&mut data)).await?;

        if data.id().is_none() {
            return Err(ProviderError::not_found(
                id,
                format!("Cannot import non-existent remote object with ID {id:?}"),
            )
            .at("id")
            .into());
        }
        info!(resource_type, id, "Resource imported");
        Ok(data)
    }

    /// Converge a resource on its declared configuration.
    ///
    /// Refreshes `prior` (if any), then creates, updates, replaces or leaves
    /// the resource alone. Applying the same configuration twice makes no
    /// mutating call the second time.
    #[instrument(skip(self, prior, declared))]
    pub async fn apply(
        &self,
        resource_type: &str,
        prior: Option<ResourceData>,
        declared: ResourceData,
    ) -> Result<ApplyOutcome, Diagnostics> {
        let schema = self.schema(resource_type)?;

        let current = match prior {
            Some(prior) if prior.id().is_some() => {
                let refreshed = self.read(resource_type, prior).await?;
                if refreshed.id().is_none() {
                    info!(resource_type, "Resource vanished remotely, recreating");
                }
                refreshed.id().is_some().then_some(refreshed)
            }
            _ => None,
        };

        let Some(current) = current else {
            let state = self.create(resource_type, declared).await?;
            return Ok(ApplyOutcome {
                action: PlannedAction::Create,
                state,
            });
        };

        match drift(&schema, &current, &declared) {
            Drift::InSync => {
                debug!(resource_type, id = current.id(), "No changes");
                Ok(ApplyOutcome {
                    action: PlannedAction::NoOp,
                    state: current,
                })
            }
            Drift::InPlace => {
                let mut next = declared;
                next.set_id(current.require_id()?);
                let state = self.update(resource_type, next).await?;
                Ok(ApplyOutcome {
                    action: PlannedAction::Update,
                    state,
                })
            }
            Drift::ForcesNew => {
                self.delete(resource_type, &current).await?;
                let state = self.create(resource_type, declared).await?;
                Ok(ApplyOutcome {
                    action: PlannedAction::Replace,
                    state,
                })
            }
        }
    }
}

/// Run a handler phase under its time ceiling.
async fn run<T>(
    handler: &dyn ResourceHandler,
    operation: Operation,
    phase: impl Future<Output = ProviderResult<T>>,
) -> Result<T, Diagnostics> {
    let ceiling = handler.timeouts().for_operation(operation);

    let result = match tokio::time::timeout(ceiling, phase).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            operation,
            resource_type: handler.type_name().to_string(),
            after: ceiling,
        }),
    };

    result.map_err(|err| {
        warn!(
            resource_type = handler.type_name(),
            %operation,
            code = err.error_code(),
            error = %err,
            "Resource operation failed"
        );
        Diagnostics::from(err)
    })
}

/// Compare configurable attributes; sets compare without regard to order.
fn drift(schema: &ResourceSchema, current: &ResourceData, declared: &ResourceData) -> Drift {
    let mut result = Drift::InSync;

    for (name, attr) in schema.iter().filter(|(_, attr)| attr.is_configurable()) {
        if normalized(attr, current.get(name)) == normalized(attr, declared.get(name)) {
            continue;
        }
        debug!(attribute = name, force_new = attr.force_new, "Attribute changed");
        if attr.force_new {
            return Drift::ForcesNew;
        }
        result = Drift::InPlace;
    }

    result
}

fn normalized(attr: &AttributeSchema, value: Option<&AttributeValue>) -> Option<AttributeValue> {
    let value = value.filter(|v| !v.is_empty())?;
    Some(match attr.attribute_type {
        AttributeType::Set => {
            AttributeValue::Set(value.as_strings().into_iter().map(String::from).collect())
        }
        AttributeType::List => {
            AttributeValue::List(value.as_strings().into_iter().map(String::from).collect())
        }
        AttributeType::String | AttributeType::Bool => value.clone(),
    })
}
