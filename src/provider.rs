//! [`AzureProvider`]: the [`ProviderService`] that routes Hemmer calls to
//! the registered Azure resources and data sources.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::clients::build_arm_client;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::plan;
use crate::resources::{DataSource, Resource, ResourceContext};
use crate::schema::{Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::services;
use crate::types::{ImportedResource, PlanResult};
use crate::validation::validate;

/// The Azure Resource Manager provider.
pub struct AzureProvider {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
    context: RwLock<Option<Arc<ResourceContext>>>,
}

impl Default for AzureProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureProvider {
    /// Build a provider with every registered service. It must be
    /// configured before any CRUD call.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Build a provider that is already configured with `context`.
    pub fn with_context(context: ResourceContext) -> Self {
        Self::build(Some(Arc::new(context)))
    }

    fn build(context: Option<Arc<ResourceContext>>) -> Self {
        let mut resources = BTreeMap::new();
        let mut data_sources = BTreeMap::new();
        for service in services::registrations() {
            debug!(
                service = service.name(),
                categories = ?service.website_categories(),
                "Registering service"
            );
            for resource in service.resources() {
                resources.insert(resource.type_name(), resource);
            }
            for data_source in service.data_sources() {
                data_sources.insert(data_source.type_name(), data_source);
            }
        }
        Self {
            resources,
            data_sources,
            context: RwLock::new(context),
        }
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .get(resource_type)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&dyn DataSource, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .map(|d| d.as_ref())
            .ok_or_else(|| {
                ProviderError::UnknownResource(format!("data source {data_source_type}"))
            })
    }

    async fn context(&self) -> Result<Arc<ResourceContext>, ProviderError> {
        self.context.read().await.clone().ok_or_else(|| {
            ProviderError::FailedPrecondition("the provider has not been configured".to_string())
        })
    }
}

/// Run `operation` with a deadline of `limit`.
async fn with_timeout<T>(
    operation: &str,
    limit: Duration,
    fut: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        ProviderError::DeadlineExceeded(format!("{operation} did not finish within {limit:?}"))
    })?
}

/// Collapse error diagnostics into a single validation error.
fn check(diagnostics: Vec<Diagnostic>) -> Result<(), ProviderError> {
    let errors: Vec<String> = diagnostics
        .into_iter()
        .filter(Diagnostic::is_error)
        .map(|d| match (d.attribute, d.detail) {
            (Some(attr), Some(detail)) => format!("{attr}: {detail}"),
            (Some(attr), None) => format!("{attr}: {}", d.summary),
            (None, _) => d.summary,
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::Validation(errors.join("; ")))
    }
}

#[async_trait::async_trait]
impl ProviderService for AzureProvider {
    fn schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        for (name, resource) in &self.resources {
            schema = schema.with_resource(*name, resource.schema());
        }
        for (name, data_source) in &self.data_sources {
            schema = schema.with_data_source(*name, data_source.schema());
        }
        schema
    }

    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&ProviderConfig::schema(), &config))
    }

    #[instrument(skip_all)]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let resolved = match ProviderConfig::from_value(&config)?.with_env_fallback().resolve() {
            Ok(resolved) => resolved,
            Err(diagnostics) => return Ok(diagnostics),
        };
        let client = build_arm_client(&resolved).map_err(|e| {
            ProviderError::Configuration(format!("building Resource Manager client: {e}"))
        })?;

        *self.context.write().await =
            Some(Arc::new(ResourceContext::new(client, resolved.subscription_id.clone())));
        info!(
            subscription_id = %resolved.subscription_id,
            endpoint = %resolved.resource_manager_endpoint,
            "Provider configured"
        );
        Ok(vec![])
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.resource(resource_type)?.schema(), &config))
    }

    #[instrument(skip(self, prior_state, proposed_state, _config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let schema = self.resource(resource_type)?.schema();
        if !proposed_state.is_null() {
            check(validate(&schema, &proposed_state))?;
        }
        Ok(plan::diff(&schema, prior_state.as_ref(), &proposed_state))
    }

    #[instrument(skip(self, planned_state))]
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let ctx = self.context().await?;
        with_timeout(
            "create",
            resource.timeouts().create,
            resource.create(&ctx, planned_state),
        )
        .await
    }

    #[instrument(skip(self, current_state))]
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let ctx = self.context().await?;
        let state = with_timeout(
            "read",
            resource.timeouts().read,
            resource.read(&ctx, current_state),
        )
        .await?;
        Ok(state.unwrap_or(Value::Null))
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let ctx = self.context().await?;
        with_timeout(
            "update",
            resource.timeouts().update,
            resource.update(&ctx, prior_state, planned_state),
        )
        .await
    }

    #[instrument(skip(self, current_state))]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        let ctx = self.context().await?;
        with_timeout(
            "delete",
            resource.timeouts().delete,
            resource.delete(&ctx, current_state),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.validate_id(id)?;
        let ctx = self.context().await?;
        let read = resource.read(&ctx, json!({ "id": id }));
        let state = with_timeout("import", resource.timeouts().read, read)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found")))?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.data_source(data_source_type)?.schema(), &config))
    }

    #[instrument(skip(self, config))]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        check(validate(&data_source.schema(), &config))?;
        let ctx = self.context().await?;
        with_timeout("read", data_source.read_timeout(), data_source.read(&ctx, config)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_arm::FakeArm;

    #[test]
    fn test_schema_lists_every_service() {
        let schema = AzureProvider::new().schema();
        for name in [
            "azurerm_connected_vmware_virtual_machine",
            "azurerm_dev_center_dev_box_definitions",
            "azurerm_dynatrace_single_sign_on",
            "azurerm_hdinsight_cluster_pool_cluster",
            "azurerm_extended_custom_locations",
        ] {
            assert!(schema.resources.contains_key(name), "missing {name}");
        }
        assert!(schema.data_sources.contains_key("azurerm_app_service_connection"));
        assert!(schema.data_sources.contains_key("azurerm_spring_cloud_connection"));
        assert!(schema.provider.block.attributes.contains_key("subscription_id"));
    }

    #[tokio::test]
    async fn test_unknown_types() {
        let arm = FakeArm::start().await;
        let provider = AzureProvider::with_context(arm.context());

        let err = tokio_test::assert_err!(provider.create("azurerm_nope", json!({})).await);
        assert!(matches!(err, ProviderError::UnknownResource(_)));

        let err = provider.read_data_source("azurerm_nope", json!({})).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_data_source_config_is_validated_before_reading() {
        let arm = FakeArm::start().await;
        let provider = AzureProvider::with_context(arm.context());
        let err = provider
            .read_data_source(
                "azurerm_app_service_connection",
                json!({
                    "name": "c1",
                    "app_service_id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/sa"
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(err.message().starts_with("app_service_id"));
    }

    #[tokio::test]
    async fn test_operations_time_out() {
        let err = with_timeout("create", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ProviderError::DeadlineExceeded(_)));
    }
}
