//! Resource handler trait
//!
//! Every resource type implements the same four-phase protocol (Create, Read,
//! Update, Delete) plus import validation. Handlers receive their gateway
//! client and the shared [`NamedLockRegistry`](crate::NamedLockRegistry) at
//! construction time.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderResult;
use crate::schema::ResourceSchema;
use crate::state::ResourceData;

/// Resource operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Import => write!(f, "import"),
        }
    }
}

/// Fixed time ceilings per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTimeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(15 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(5 * 60),
            delete: Duration::from_secs(5 * 60),
        }
    }
}

impl ResourceTimeouts {
    /// Returns the ceiling for an operation. Import is bounded like a read.
    #[must_use]
    pub fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Create => self.create,
            Operation::Read | Operation::Import => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

/// A declared resource type backed by a remote object.
///
/// Implementations must only commit the local identifier (via
/// [`ResourceData::set_id`]) after the mutating remote call has succeeded.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Resource type name, e.g. `azuread_application_identifier_uris`.
    fn type_name(&self) -> &'static str;

    /// Declared configuration schema.
    fn schema(&self) -> ResourceSchema;

    /// Per-operation time ceilings.
    fn timeouts(&self) -> ResourceTimeouts {
        ResourceTimeouts::default()
    }

    /// Validates an ID supplied for import before it is treated as state.
    fn validate_import_id(&self, id: &str) -> ProviderResult<()>;

    /// Creates the remote state described by `data` and records its ID.
    async fn create(&self, data: &mut ResourceData) -> ProviderResult<()>;

    /// Refreshes `data` from the remote object.
    ///
    /// A missing remote object clears the ID and is not an error.
    async fn read(&self, data: &mut ResourceData) -> ProviderResult<()>;

    /// Applies the declared configuration in `data` to the existing object.
    async fn update(&self, data: &mut ResourceData) -> ProviderResult<()>;

    /// Releases the remote state owned by this resource.
    async fn delete(&self, data: &ResourceData) -> ProviderResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = ResourceTimeouts::default();
        assert_eq!(timeouts.for_operation(Operation::Create), Duration::from_secs(900));
        assert_eq!(timeouts.for_operation(Operation::Read), Duration::from_secs(300));
        assert_eq!(timeouts.for_operation(Operation::Update), Duration::from_secs(300));
        assert_eq!(timeouts.for_operation(Operation::Delete), Duration::from_secs(300));
        assert_eq!(timeouts.for_operation(Operation::Import), Duration::from_secs(300));
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "create");
        assert_eq!(Operation::Delete.to_string(), "delete");
    }
}
