//! `azurerm_extended_custom_locations`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::API_VERSION;
use crate::error::{ProviderError, ResultExt};
use crate::resourceids::CustomLocationId;
use crate::resources::common::{
    check_requires_import, decode, encode, location_attribute, name_attribute, non_empty,
    normalize_location, read_or_gone, resource_group_name_attribute, state_id, Tags,
};
use crate::resources::{Resource, ResourceContext};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Block, NestedBlock, Schema};

const DEFAULT_HOST_TYPE: &str = "Kubernetes";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct CustomLocationModel {
    id: String,
    name: String,
    resource_group_name: String,
    location: String,
    cluster_extension_ids: Vec<String>,
    display_name: String,
    host_resource_id: String,
    host_type: String,
    namespace: String,
    authentication: Vec<AuthenticationModel>,
    tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct AuthenticationModel {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CustomLocation {
    #[serde(default)]
    location: String,
    #[serde(default)]
    properties: CustomLocationProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomLocationProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authentication: Option<Authentication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cluster_extension_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(default, skip_serializing)]
    provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Authentication {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct CustomLocationPatch {
    properties: CustomLocationProperties,
    tags: Tags,
}

impl CustomLocationModel {
    fn expand_authentication(&self) -> Option<Authentication> {
        self.authentication.first().map(|a| Authentication {
            kind: non_empty(&a.kind),
            value: non_empty(&a.value),
        })
    }

    fn expand(&self) -> CustomLocation {
        CustomLocation {
            location: self.location.clone(),
            properties: CustomLocationProperties {
                authentication: self.expand_authentication(),
                cluster_extension_ids: Some(self.cluster_extension_ids.clone()),
                display_name: non_empty(&self.display_name),
                host_resource_id: Some(self.host_resource_id.clone()),
                host_type: Some(
                    non_empty(&self.host_type).unwrap_or_else(|| DEFAULT_HOST_TYPE.to_string()),
                ),
                namespace: Some(self.namespace.clone()),
                provisioning_state: None,
            },
            tags: Some(self.tags.clone()),
        }
    }

    fn expand_patch(&self) -> CustomLocationPatch {
        CustomLocationPatch {
            properties: CustomLocationProperties {
                authentication: self.expand_authentication(),
                cluster_extension_ids: Some(self.cluster_extension_ids.clone()),
                display_name: non_empty(&self.display_name),
                ..Default::default()
            },
            tags: self.tags.clone(),
        }
    }

    /// The service never echoes the authentication value, so it is kept
    /// from `prior`.
    fn flatten(id: &CustomLocationId, api: CustomLocation, prior: &Self) -> Self {
        let props = api.properties;
        let authentication = match props.authentication {
            Some(auth) => vec![AuthenticationModel {
                kind: auth.kind.unwrap_or_default(),
                value: auth
                    .value
                    .or_else(|| prior.authentication.first().map(|a| a.value.clone()))
                    .unwrap_or_default(),
            }],
            None => prior.authentication.clone(),
        };
        Self {
            id: id.to_string(),
            name: id.custom_location_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            location: normalize_location(&api.location),
            cluster_extension_ids: props.cluster_extension_ids.unwrap_or_default(),
            display_name: props.display_name.unwrap_or_default(),
            host_resource_id: props.host_resource_id.unwrap_or_default(),
            host_type: props.host_type.unwrap_or_default(),
            namespace: props.namespace.unwrap_or_default(),
            authentication,
            tags: api.tags.unwrap_or_default(),
        }
    }
}

pub(crate) struct CustomLocationResource;

#[async_trait::async_trait]
impl Resource for CustomLocationResource {
    fn type_name(&self) -> &'static str {
        "azurerm_extended_custom_locations"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", name_attribute())
            .with_attribute("resource_group_name", resource_group_name_attribute())
            .with_attribute("location", location_attribute())
            .with_attribute(
                "cluster_extension_ids",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::required(),
                )
                .not_empty(),
            )
            .with_attribute("display_name", Attribute::optional_string().not_empty())
            .with_attribute(
                "host_resource_id",
                Attribute::required_string().with_force_new().not_empty(),
            )
            .with_attribute(
                "host_type",
                Attribute::optional_string()
                    .with_force_new()
                    .with_default(json!(DEFAULT_HOST_TYPE))
                    .one_of(&[DEFAULT_HOST_TYPE]),
            )
            .with_attribute("namespace", Attribute::required_string().with_force_new().not_empty())
            .with_block(
                "authentication",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute("type", Attribute::optional_string().not_empty())
                        .with_attribute(
                            "value",
                            Attribute::required_string().sensitive().not_empty(),
                        ),
                ),
            )
            .with_attribute("tags", Attribute::tags())
    }

    fn validate_id(&self, id: &str) -> Result<(), ProviderError> {
        CustomLocationId::validate(id)
    }

    async fn create(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let model: CustomLocationModel = decode(config)?;
        let id =
            CustomLocationId::new(&ctx.subscription_id, &model.resource_group_name, &model.name);

        check_requires_import(ctx, &id, API_VERSION).await?;

        let _: Value = ctx
            .client
            .put_and_wait(&id.to_string(), API_VERSION, &model.expand())
            .await
            .with_context(|| format!("creating {id}"))?;
        info!(id = %id, "Created custom location");

        let mut state = encode(&model)?;
        state["id"] = json!(id.to_string());
        self.read(ctx, state)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after creation")))
    }

    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let id = CustomLocationId::parse(state_id(&state)?)?;
        let prior: CustomLocationModel = decode(state)?;
        match read_or_gone::<CustomLocation>(ctx, &id, API_VERSION).await? {
            Some(api) => encode(&CustomLocationModel::flatten(&id, api, &prior)).map(Some),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: CustomLocationModel = decode(prior)?;
        let planned: CustomLocationModel = decode(planned)?;
        let id = CustomLocationId::parse(&prior.id)?;

        if prior != planned {
            let _: Value = ctx
                .client
                .patch(&id.to_string(), API_VERSION, &planned.expand_patch())
                .await
                .with_context(|| format!("updating {id}"))?;
            info!(id = %id, "Updated custom location");
        }

        self.read(ctx, encode(&planned)?)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after update")))
    }

    async fn delete(&self, ctx: &ResourceContext, state: Value) -> Result<(), ProviderError> {
        let id = CustomLocationId::parse(state_id(&state)?)?;
        info!(id = %id, "Deleting custom location");
        ctx.client
            .delete_and_wait(&id.to_string(), API_VERSION)
            .await
            .with_context(|| format!("deleting {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_arm::{FakeArm, SUBSCRIPTION_ID};
    use crate::validation::validate;

    fn config() -> Value {
        json!({
            "name": "cl1",
            "resource_group_name": "rg",
            "location": "East US",
            "cluster_extension_ids": ["/subscriptions/s/resourceGroups/rg/providers/Microsoft.Kubernetes/connectedClusters/k1/providers/Microsoft.KubernetesConfiguration/extensions/vmware"],
            "display_name": "Custom Location 1",
            "host_resource_id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Kubernetes/connectedClusters/k1",
            "namespace": "ns1",
            "authentication": [{"type": "KubeConfig", "value": "a3ViZWNvbmZpZw=="}],
            "tags": {}
        })
    }

    #[test]
    fn test_schema() {
        let schema = CustomLocationResource.schema();
        assert!(validate(&schema, &config()).is_empty());

        let mut bad = config();
        bad["host_type"] = json!("VMware");
        let diags = validate(&schema, &bad);
        assert_eq!(diags[0].attribute.as_deref(), Some("host_type"));
    }

    #[test]
    fn test_expand_defaults_host_type() {
        let model: CustomLocationModel = decode(config()).unwrap();
        let body = serde_json::to_value(model.expand()).unwrap();
        assert_eq!(body["properties"]["hostType"], "Kubernetes");
        assert_eq!(body["properties"]["authentication"]["type"], "KubeConfig");
    }

    #[tokio::test]
    async fn test_lifecycle_keeps_authentication_value() {
        let arm = FakeArm::start_with_async_operations().await;
        let ctx = arm.context();
        let id = CustomLocationId::new(SUBSCRIPTION_ID, "rg", "cl1").to_string();

        let state = CustomLocationResource.create(&ctx, config()).await.unwrap();
        assert_eq!(state["id"], id);
        assert_eq!(state["host_type"], "Kubernetes");

        let mut stored = arm.get(&id).unwrap();
        stored["properties"]["authentication"]
            .as_object_mut()
            .unwrap()
            .remove("value");
        arm.insert(&id, stored);

        let mut planned = state.clone();
        planned["display_name"] = json!("Renamed");
        let updated = CustomLocationResource.update(&ctx, state, planned).await.unwrap();
        assert_eq!(updated["display_name"], "Renamed");
        assert_eq!(updated["authentication"][0]["value"], "a3ViZWNvbmZpZw==");

        let patch = arm.last_body("PATCH", &id).await;
        assert!(patch["properties"].get("namespace").is_none());
        assert!(patch["properties"].get("hostResourceId").is_none());

        CustomLocationResource.delete(&ctx, updated).await.unwrap();
        assert!(arm.get(&id).is_none());
    }
}
