//! The contract every Azure resource and data source implements.
//!
//! A [`Resource`] owns its schema and its CRUD mapping. The provider looks
//! resources up by [`Resource::type_name`] and runs each call under the
//! matching entry of [`Resource::timeouts`]. States cross this boundary as
//! plain JSON objects that always carry the ARM resource ID in `id`.

pub mod common;

use std::time::Duration;

use serde_json::Value;

use crate::clients::ArmClient;
use crate::error::ProviderError;
use crate::schema::Schema;

/// Shared handles for one configured provider.
#[derive(Clone)]
pub struct ResourceContext {
    /// Authenticated Resource Manager client.
    pub client: ArmClient,
    /// The subscription new resources are created in.
    pub subscription_id: String,
}

impl ResourceContext {
    /// Bundle a client with its subscription.
    pub fn new(client: ArmClient, subscription_id: impl Into<String>) -> Self {
        Self {
            client,
            subscription_id: subscription_id.into(),
        }
    }
}

/// Per-operation deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Deadline for `create`.
    pub create: Duration,
    /// Deadline for `read`, import and data source reads.
    pub read: Duration,
    /// Deadline for `update`.
    pub update: Duration,
    /// Deadline for `delete`.
    pub delete: Duration,
}

impl Timeouts {
    const fn minutes(n: u64) -> Duration {
        Duration::from_secs(n * 60)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Self::minutes(30),
            read: Self::minutes(5),
            update: Self::minutes(30),
            delete: Self::minutes(30),
        }
    }
}

/// A managed Azure resource type.
///
/// `create` returns the state to record, which should be the result of a
/// fresh read. `read` returns `None` when the resource no longer exists.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// The resource type name, e.g. `azurerm_connected_vmware_host`.
    fn type_name(&self) -> &'static str;

    /// Arguments and attributes.
    fn schema(&self) -> Schema;

    /// Deadlines for each operation.
    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    /// Check that `id` is a well-formed ID for this type. Used by import.
    fn validate_id(&self, id: &str) -> Result<(), ProviderError>;

    /// Create the resource described by `config`.
    async fn create(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError>;

    /// Refresh `state` from the API.
    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Value,
    ) -> Result<Option<Value>, ProviderError>;

    /// Apply the in-place changes between `prior` and `planned`.
    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// Remove the resource. A resource that is already gone is not an error.
    async fn delete(&self, ctx: &ResourceContext, state: Value) -> Result<(), ProviderError>;
}

/// A read-only lookup of existing Azure state.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// The data source type name, e.g. `azurerm_app_service_connection`.
    fn type_name(&self) -> &'static str;

    /// Arguments and attributes.
    fn schema(&self) -> Schema;

    /// Deadline for `read`.
    fn read_timeout(&self) -> Duration {
        Timeouts::default().read
    }

    /// Look up the object described by `config` and return the full state.
    async fn read(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError>;
}

/// One Azure service's resources and data sources.
pub trait ServiceRegistration: Send + Sync {
    /// Display name, e.g. `ConnectedVmware`.
    fn name(&self) -> &'static str;

    /// Documentation categories.
    fn website_categories(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Managed resource types.
    fn resources(&self) -> Vec<Box<dyn Resource>> {
        Vec::new()
    }

    /// Data source types.
    fn data_sources(&self) -> Vec<Box<dyn DataSource>> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.create, Duration::from_secs(1800));
        assert_eq!(timeouts.read, Duration::from_secs(300));
        assert_eq!(timeouts.update, timeouts.create);
        assert_eq!(timeouts.delete, timeouts.create);
    }
}
