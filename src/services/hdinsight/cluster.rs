//! `azurerm_hdinsight_cluster_pool_cluster`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::blocks;
use super::models::{
    ClusterProfile, ClusterProfileModel, ComputeProfile, ComputeProfileModel,
    UpdatableClusterProfile,
};
use super::API_VERSION;
use crate::error::{ProviderError, ResultExt};
use crate::resourceids::HdInsightClusterId;
use crate::resources::common::{
    check_requires_import, decode, encode, location_attribute, name_attribute, normalize_location,
    read_or_gone, resource_group_name_attribute, state_id, Tags,
};
use crate::resources::{Resource, ResourceContext};
use crate::schema::{Attribute, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ClusterModel {
    id: String,
    name: String,
    cluster_pool_name: String,
    resource_group_name: String,
    location: String,
    cluster_type: String,
    cluster_profile: Vec<ClusterProfileModel>,
    compute_profile: Vec<ComputeProfileModel>,
    tags: Tags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Cluster {
    #[serde(default)]
    location: String,
    #[serde(default)]
    properties: ClusterProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterProperties {
    #[serde(default)]
    cluster_type: String,
    #[serde(default)]
    cluster_profile: ClusterProfile,
    #[serde(default)]
    compute_profile: ComputeProfile,
    #[serde(default, skip_serializing)]
    provisioning_state: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClusterPatch {
    properties: ClusterPatchProperties,
    tags: Tags,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClusterPatchProperties {
    cluster_profile: UpdatableClusterProfile,
}

impl ClusterModel {
    fn cluster_profile(&self) -> Result<&ClusterProfileModel, ProviderError> {
        self.cluster_profile
            .first()
            .ok_or_else(|| ProviderError::Validation("no cluster_profile provided".to_string()))
    }

    fn expand(&self) -> Result<Cluster, ProviderError> {
        let compute = self
            .compute_profile
            .first()
            .ok_or_else(|| ProviderError::Validation("no compute_profile provided".to_string()))?;
        Ok(Cluster {
            location: self.location.clone(),
            properties: ClusterProperties {
                cluster_type: self.cluster_type.clone(),
                cluster_profile: self.cluster_profile()?.into(),
                compute_profile: compute.into(),
                provisioning_state: None,
            },
            tags: Some(self.tags.clone()),
        })
    }

    fn expand_patch(&self) -> Result<ClusterPatch, ProviderError> {
        Ok(ClusterPatch {
            properties: ClusterPatchProperties {
                cluster_profile: self.cluster_profile()?.into(),
            },
            tags: self.tags.clone(),
        })
    }

    fn flatten(id: &HdInsightClusterId, api: Cluster) -> Self {
        let props = api.properties;
        Self {
            id: id.to_string(),
            name: id.cluster_name.clone(),
            cluster_pool_name: id.cluster_pool_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            location: normalize_location(&api.location),
            cluster_type: props.cluster_type,
            cluster_profile: vec![props.cluster_profile.into()],
            compute_profile: vec![props.compute_profile.into()],
            tags: api.tags.unwrap_or_default(),
        }
    }

    /// Carry write-only values the API does not echo back over from `prior`.
    fn preserve_secrets(&mut self, prior: &Self) {
        let prior_key = prior
            .cluster_profile
            .first()
            .and_then(|p| p.flink_profile.first())
            .and_then(|f| f.storage.first())
            .map(|s| s.storage_key.clone());
        let storage = self
            .cluster_profile
            .first_mut()
            .and_then(|p| p.flink_profile.first_mut())
            .and_then(|f| f.storage.first_mut());
        if let (Some(storage), Some(key)) = (storage, prior_key) {
            if storage.storage_key.is_empty() {
                storage.storage_key = key;
            }
        }
    }
}

pub(crate) struct ClusterResource;

impl ClusterResource {
    async fn read_model(
        &self,
        ctx: &ResourceContext,
        id: &HdInsightClusterId,
    ) -> Result<Option<ClusterModel>, ProviderError> {
        let cluster = read_or_gone::<Cluster>(ctx, id, API_VERSION).await?;
        Ok(cluster.map(|api| ClusterModel::flatten(id, api)))
    }

    async fn read_back(
        &self,
        ctx: &ResourceContext,
        id: &HdInsightClusterId,
        written: &ClusterModel,
        after: &str,
    ) -> Result<Value, ProviderError> {
        let mut model = self
            .read_model(ctx, id)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after {after}")))?;
        model.preserve_secrets(written);
        encode(&model)
    }
}

#[async_trait::async_trait]
impl Resource for ClusterResource {
    fn type_name(&self) -> &'static str {
        "azurerm_hdinsight_cluster_pool_cluster"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", name_attribute())
            .with_attribute("cluster_pool_name", name_attribute())
            .with_attribute("resource_group_name", resource_group_name_attribute())
            .with_attribute("location", location_attribute())
            .with_attribute("cluster_type", Attribute::required_string().not_empty())
            .with_block("cluster_profile", blocks::cluster_profile())
            .with_block("compute_profile", blocks::compute_profile())
            .with_attribute("tags", Attribute::tags())
    }

    fn validate_id(&self, id: &str) -> Result<(), ProviderError> {
        HdInsightClusterId::validate(id)
    }

    async fn create(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let model: ClusterModel = decode(config)?;
        let id = HdInsightClusterId::new(
            &ctx.subscription_id,
            &model.resource_group_name,
            &model.cluster_pool_name,
            &model.name,
        );

        check_requires_import(ctx, &id, API_VERSION).await?;

        let body = model.expand()?;
        let _: Value = ctx
            .client
            .put_and_wait(&id.to_string(), API_VERSION, &body)
            .await
            .with_context(|| format!("creating {id}"))?;
        info!(id = %id, cluster_type = %model.cluster_type, "Created HDInsight cluster");

        self.read_back(ctx, &id, &model, "creation").await
    }

    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let id = HdInsightClusterId::parse(state_id(&state)?)?;
        let prior: ClusterModel = decode(state)?;
        match self.read_model(ctx, &id).await? {
            Some(mut model) => {
                model.preserve_secrets(&prior);
                encode(&model).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: ClusterModel = decode(prior)?;
        let planned: ClusterModel = decode(planned)?;
        let id = HdInsightClusterId::parse(&prior.id)?;

        if prior.cluster_profile != planned.cluster_profile || prior.tags != planned.tags {
            let body = planned.expand_patch()?;
            let _: Value = ctx
                .client
                .patch_and_wait(&id.to_string(), API_VERSION, &body)
                .await
                .with_context(|| format!("updating {id}"))?;
            info!(id = %id, "Updated HDInsight cluster");
        } else {
            debug!(id = %id, "No updatable changes");
        }

        self.read_back(ctx, &id, &planned, "update").await
    }

    async fn delete(&self, ctx: &ResourceContext, state: Value) -> Result<(), ProviderError> {
        let id = HdInsightClusterId::parse(state_id(&state)?)?;
        info!(id = %id, "Deleting HDInsight cluster");
        ctx.client
            .delete_and_wait(&id.to_string(), API_VERSION)
            .await
            .with_context(|| format!("deleting {id}"))
    }
}
