//! `azurerm_dev_center_dev_box_definitions`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::API_VERSION;
use crate::error::{ProviderError, ResultExt};
use crate::resourceids::DevBoxDefinitionId;
use crate::resources::common::{
    check_requires_import, decode, encode, location_attribute, name_attribute, non_empty,
    non_zero, normalize_location, read_or_gone, resource_group_name_attribute, state_id, Tags,
};
use crate::resources::{Resource, ResourceContext};
use crate::schema::{Attribute, Block, NestedBlock, Schema};

const HIBERNATE_SUPPORT: &[&str] = &["Disabled", "Enabled"];
const SKU_TIERS: &[&str] = &["Free", "Basic", "Standard", "Premium"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DevBoxDefinitionModel {
    id: String,
    name: String,
    dev_center_name: String,
    resource_group_name: String,
    location: String,
    hibernate_support: String,
    image_reference: Vec<ImageReferenceModel>,
    os_storage_type: String,
    sku: Vec<SkuModel>,
    tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ImageReferenceModel {
    id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SkuModel {
    name: String,
    capacity: i64,
    family: String,
    size: String,
    tier: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DevBoxDefinition {
    #[serde(default)]
    location: String,
    #[serde(default)]
    properties: DevBoxDefinitionProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevBoxDefinitionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hibernate_support: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_reference: Option<ImageReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    os_storage_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sku: Option<Sku>,
    #[serde(default, skip_serializing)]
    provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ImageReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Sku {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tier: Option<String>,
}

/// PATCH body. Location is fixed after creation.
#[derive(Debug, Serialize)]
struct DevBoxDefinitionUpdate {
    properties: DevBoxDefinitionProperties,
    tags: Tags,
}

fn expand_sku(input: &[SkuModel]) -> Result<Sku, ProviderError> {
    let sku = input
        .first()
        .ok_or_else(|| ProviderError::Validation("no sku provided".to_string()))?;
    Ok(Sku {
        name: sku.name.clone(),
        capacity: non_zero(sku.capacity),
        family: non_empty(&sku.family),
        size: non_empty(&sku.size),
        tier: non_empty(&sku.tier),
    })
}

fn expand_image_reference(input: &[ImageReferenceModel]) -> Result<ImageReference, ProviderError> {
    let image = input
        .first()
        .ok_or_else(|| ProviderError::Validation("no image_reference provided".to_string()))?;
    Ok(ImageReference {
        id: non_empty(&image.id),
    })
}

impl DevBoxDefinitionModel {
    fn expand_properties(&self) -> Result<DevBoxDefinitionProperties, ProviderError> {
        Ok(DevBoxDefinitionProperties {
            hibernate_support: non_empty(&self.hibernate_support),
            image_reference: Some(
                expand_image_reference(&self.image_reference)
                    .map_err(|e| e.context("expanding image reference"))?,
            ),
            os_storage_type: non_empty(&self.os_storage_type),
            sku: Some(expand_sku(&self.sku).map_err(|e| e.context("expanding sku"))?),
            provisioning_state: None,
        })
    }

    fn flatten(id: &DevBoxDefinitionId, api: DevBoxDefinition) -> Self {
        let props = api.properties;
        Self {
            id: id.to_string(),
            name: id.dev_box_definition_name.clone(),
            dev_center_name: id.dev_center_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            location: normalize_location(&api.location),
            hibernate_support: props.hibernate_support.unwrap_or_default(),
            image_reference: props
                .image_reference
                .map(|i| ImageReferenceModel {
                    id: i.id.unwrap_or_default(),
                })
                .into_iter()
                .collect(),
            os_storage_type: props.os_storage_type.unwrap_or_default(),
            sku: props
                .sku
                .map(|s| SkuModel {
                    name: s.name,
                    capacity: s.capacity.unwrap_or_default(),
                    family: s.family.unwrap_or_default(),
                    size: s.size.unwrap_or_default(),
                    tier: s.tier.unwrap_or_default(),
                })
                .into_iter()
                .collect(),
            tags: api.tags.unwrap_or_default(),
        }
    }
}

pub(crate) struct DevBoxDefinitionResource;

#[async_trait::async_trait]
impl Resource for DevBoxDefinitionResource {
    fn type_name(&self) -> &'static str {
        "azurerm_dev_center_dev_box_definitions"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", name_attribute())
            .with_attribute("dev_center_name", name_attribute())
            .with_attribute("resource_group_name", resource_group_name_attribute())
            .with_attribute("location", location_attribute())
            .with_attribute(
                "hibernate_support",
                Attribute::optional_string().one_of(HIBERNATE_SUPPORT),
            )
            .with_block(
                "image_reference",
                NestedBlock::list_exactly_one(
                    Block::new().with_attribute("id", Attribute::optional_string()),
                ),
            )
            .with_attribute("os_storage_type", Attribute::optional_string().not_empty())
            .with_block(
                "sku",
                NestedBlock::list_exactly_one(
                    Block::new()
                        .with_attribute("name", Attribute::required_string())
                        .with_attribute("capacity", Attribute::optional_int64())
                        .with_attribute("family", Attribute::optional_string())
                        .with_attribute("size", Attribute::optional_string())
                        .with_attribute("tier", Attribute::optional_string().one_of(SKU_TIERS)),
                ),
            )
            .with_attribute("tags", Attribute::tags())
    }

    fn validate_id(&self, id: &str) -> Result<(), ProviderError> {
        DevBoxDefinitionId::validate(id)
    }

    async fn create(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let model: DevBoxDefinitionModel = decode(config)?;
        let id = DevBoxDefinitionId::new(
            &ctx.subscription_id,
            &model.resource_group_name,
            &model.dev_center_name,
            &model.name,
        );

        check_requires_import(ctx, &id, API_VERSION).await?;

        let body = DevBoxDefinition {
            location: model.location.clone(),
            properties: model.expand_properties()?,
            tags: Some(model.tags.clone()),
        };
        let _: Value = ctx
            .client
            .put_and_wait(&id.to_string(), API_VERSION, &body)
            .await
            .with_context(|| format!("creating {id}"))?;
        info!(id = %id, "Created dev box definition");

        self.read(ctx, json!({ "id": id.to_string() }))
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after creation")))
    }

    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let id = DevBoxDefinitionId::parse(state_id(&state)?)?;
        match read_or_gone::<DevBoxDefinition>(ctx, &id, API_VERSION).await? {
            Some(api) => encode(&DevBoxDefinitionModel::flatten(&id, api)).map(Some),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: DevBoxDefinitionModel = decode(prior)?;
        let planned: DevBoxDefinitionModel = decode(planned)?;
        let id = DevBoxDefinitionId::parse(&prior.id)?;

        if prior != planned {
            let body = DevBoxDefinitionUpdate {
                properties: planned.expand_properties()?,
                tags: planned.tags.clone(),
            };
            let _: Value = ctx
                .client
                .patch_and_wait(&id.to_string(), API_VERSION, &body)
                .await
                .with_context(|| format!("updating {id}"))?;
            info!(id = %id, "Updated dev box definition");
        }

        self.read(ctx, json!({ "id": id.to_string() }))
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after update")))
    }

    async fn delete(&self, ctx: &ResourceContext, state: Value) -> Result<(), ProviderError> {
        let id = DevBoxDefinitionId::parse(state_id(&state)?)?;
        info!(id = %id, "Deleting dev box definition");
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

    fn config() -> Value {
        json!({
            "name": "win11-dev",
            "dev_center_name": "contoso",
            "resource_group_name": "rg",
            "location": "East US",
            "hibernate_support": "Enabled",
            "image_reference": [{"id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.DevCenter/devcenters/contoso/galleries/Default/images/win11"}],
            "sku": [{"name": "general_i_8c32gb256ssd_v2"}],
            "tags": {}
        })
    }

    #[test]
    fn test_missing_blocks_fail_expansion() {
        let mut model: DevBoxDefinitionModel = decode(config()).unwrap();
        model.sku.clear();
        let err = model.expand_properties().unwrap_err();
        assert_eq!(err.message(), "expanding sku: no sku provided");

        let mut model: DevBoxDefinitionModel = decode(config()).unwrap();
        model.image_reference.clear();
        let err = model.expand_properties().unwrap_err();
        assert_eq!(err.message(), "expanding image reference: no image_reference provided");
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let arm = FakeArm::start_with_async_operations().await;
        let ctx = arm.context();
        let id = DevBoxDefinitionId::new(SUBSCRIPTION_ID, "rg", "contoso", "win11-dev").to_string();

        let state = DevBoxDefinitionResource.create(&ctx, config()).await.unwrap();
        assert_eq!(state["id"], id);
        assert_eq!(state["location"], "eastus");
        assert_eq!(state["sku"][0]["name"], "general_i_8c32gb256ssd_v2");

        let put = arm.last_body("PUT", &id).await;
        assert_eq!(put["properties"]["hibernateSupport"], "Enabled");
        assert!(put["properties"]["sku"].get("capacity").is_none());

        let mut planned = state.clone();
        planned["hibernate_support"] = json!("Disabled");
        let updated = DevBoxDefinitionResource.update(&ctx, state, planned).await.unwrap();
        assert_eq!(updated["hibernate_support"], "Disabled");
        let patch = arm.last_body("PATCH", &id).await;
        assert!(patch.get("location").is_none());
        assert_eq!(patch["tags"], json!({}));

        DevBoxDefinitionResource.delete(&ctx, updated).await.unwrap();
        assert!(arm.get(&id).is_none());
    }
}
