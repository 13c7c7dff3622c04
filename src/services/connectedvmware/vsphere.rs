//! Clusters, datastores, hosts and resource pools.
//!
//! The four types share one schema and one request shape and differ only
//! in their ID, so a single [`VSphereObjectResource`] serves all of them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::models::{common_block, ConnectedVmwareModel, TagsPatch, VSphereResource};
use super::API_VERSION;
use crate::error::{ProviderError, ResultExt};
use crate::resourceids::{ClusterId, DatastoreId, HostId, ResourcePoolId};
use crate::resources::common::{check_requires_import, decode, encode, read_or_gone, state_id};
use crate::resources::{Resource, ResourceContext};
use crate::schema::{Attribute, Schema};

/// Which vSphere object a [`VSphereObjectResource`] manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VSphereObject {
    Cluster,
    Datastore,
    Host,
    ResourcePool,
}

impl VSphereObject {
    fn type_name(self) -> &'static str {
        match self {
            Self::Cluster => "azurerm_connected_vmware_clusters",
            Self::Datastore => "azurerm_connected_vmware_datastore",
            Self::Host => "azurerm_connected_vmware_host",
            Self::ResourcePool => "azurerm_connected_vmware_resourcepool",
        }
    }

    fn id(self, subscription_id: &str, resource_group_name: &str, name: &str) -> String {
        match self {
            Self::Cluster => ClusterId::new(subscription_id, resource_group_name, name).to_string(),
            Self::Datastore => {
                DatastoreId::new(subscription_id, resource_group_name, name).to_string()
            }
            Self::Host => HostId::new(subscription_id, resource_group_name, name).to_string(),
            Self::ResourcePool => {
                ResourcePoolId::new(subscription_id, resource_group_name, name).to_string()
            }
        }
    }

    /// Parse `id` into `(canonical id, resource group, name)`.
    fn parse(self, id: &str) -> Result<(String, String, String), ProviderError> {
        Ok(match self {
            Self::Cluster => {
                let id = ClusterId::parse(id)?;
                (id.to_string(), id.resource_group_name, id.cluster_name)
            }
            Self::Datastore => {
                let id = DatastoreId::parse(id)?;
                (id.to_string(), id.resource_group_name, id.datastore_name)
            }
            Self::Host => {
                let id = HostId::parse(id)?;
                (id.to_string(), id.resource_group_name, id.host_name)
            }
            Self::ResourcePool => {
                let id = ResourcePoolId::parse(id)?;
                (id.to_string(), id.resource_group_name, id.resource_pool_name)
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct VSphereObjectModel {
    id: String,
    #[serde(flatten)]
    common: ConnectedVmwareModel,
}

pub(crate) struct VSphereObjectResource {
    object: VSphereObject,
}

impl VSphereObjectResource {
    pub(crate) fn new(object: VSphereObject) -> Self {
        Self { object }
    }
}

#[async_trait::async_trait]
impl Resource for VSphereObjectResource {
    fn type_name(&self) -> &'static str {
        self.object.type_name()
    }

    fn schema(&self) -> Schema {
        Schema {
            version: 0,
            block: common_block().with_attribute("id", Attribute::computed_string()),
        }
    }

    fn validate_id(&self, id: &str) -> Result<(), ProviderError> {
        self.object.parse(id).map(|_| ())
    }

    async fn create(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let model: VSphereObjectModel = decode(config)?;
        let common = &model.common;
        let id = self
            .object
            .id(&ctx.subscription_id, &common.resource_group_name, &common.name);

        check_requires_import(ctx, &id, API_VERSION).await?;

        let _: Value = ctx
            .client
            .put(&id, API_VERSION, &common.expand())
            .await
            .with_context(|| format!("creating {id}"))?;
        info!(id = %id, resource_type = self.type_name(), "Created resource");

        self.read(ctx, json!({ "id": id }))
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after creation")))
    }

    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let (id, resource_group_name, name) = self.object.parse(state_id(&state)?)?;
        let Some(api) = read_or_gone::<VSphereResource>(ctx, &id, API_VERSION).await? else {
            return Ok(None);
        };

        let common = ConnectedVmwareModel::flatten(
            &name,
            &resource_group_name,
            &api.location,
            api.extended_location.as_ref(),
            api.kind.as_deref(),
            &api.properties,
            api.tags.as_ref(),
        );
        encode(&VSphereObjectModel { id, common }).map(Some)
    }

    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: VSphereObjectModel = decode(prior)?;
        let planned: VSphereObjectModel = decode(planned)?;
        let (id, _, _) = self.object.parse(&prior.id)?;

        if prior.common.tags != planned.common.tags {
            let _: Value = ctx
                .client
                .patch(&id, API_VERSION, &TagsPatch { tags: &planned.common.tags })
                .await
                .with_context(|| format!("updating {id}"))?;
            info!(id = %id, "Updated tags");
        }

        self.read(ctx, json!({ "id": id }))
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after update")))
    }

    async fn delete(&self, ctx: &ResourceContext, state: Value) -> Result<(), ProviderError> {
        let (id, _, _) = self.object.parse(state_id(&state)?)?;
        info!(id = %id, "Deleting resource");
        ctx.client
            .delete(&id, API_VERSION)
            .await
            .with_context(|| format!("deleting {id}"))
    }
}
