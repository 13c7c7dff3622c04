//! `azurerm_connected_vmware_vcenter`

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::models::TagsPatch;
use super::API_VERSION;
use crate::error::{ProviderError, ResultExt};
use crate::resourceids::VCenterId;
use crate::resources::common::{
    check_requires_import, decode, encode, expand_extended_location, extended_location_block,
    flatten_extended_location, location_attribute, name_attribute, non_empty, non_zero,
    normalize_location, read_or_gone, resource_group_name_attribute, state_id, ExtendedLocation,
    ExtendedLocationModel, Tags,
};
use crate::resources::{Resource, ResourceContext};
use crate::schema::{Attribute, Block, NestedBlock, Schema, Validator};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct VCenterModel {
    id: String,
    name: String,
    resource_group_name: String,
    location: String,
    fqdn: String,
    extended_location: Vec<ExtendedLocationModel>,
    credential: Vec<CredentialModel>,
    kind: String,
    port: i64,
    tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct CredentialModel {
    username: String,
    password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VCenter {
    #[serde(default)]
    location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extended_location: Option<ExtendedLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default)]
    properties: VCenterProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VCenterProperties {
    #[serde(default)]
    fqdn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<VICredential>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VICredential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

impl VCenterModel {
    fn expand(&self) -> VCenter {
        VCenter {
            location: self.location.clone(),
            extended_location: expand_extended_location(&self.extended_location),
            kind: non_empty(&self.kind),
            properties: VCenterProperties {
                fqdn: self.fqdn.clone(),
                port: non_zero(self.port),
                credentials: self.credential.first().map(|c| VICredential {
                    username: non_empty(&c.username),
                    password: non_empty(&c.password),
                }),
            },
            tags: Some(self.tags.clone()),
        }
    }

    /// The API never returns the password, so it is carried over from
    /// `prior_password`.
    fn flatten(id: &VCenterId, api: VCenter, prior_password: &str) -> Self {
        let props = api.properties;
        Self {
            id: id.to_string(),
            name: id.vcenter_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            location: normalize_location(&api.location),
            fqdn: props.fqdn,
            extended_location: flatten_extended_location(api.extended_location.as_ref()),
            credential: props
                .credentials
                .map(|c| CredentialModel {
                    username: c.username.unwrap_or_default(),
                    password: c.password.unwrap_or_else(|| prior_password.to_string()),
                })
                .into_iter()
                .collect(),
            kind: api.kind.unwrap_or_default(),
            port: props.port.unwrap_or_default(),
            tags: api.tags.unwrap_or_default(),
        }
    }
}

pub(crate) struct VCenterResource;

impl VCenterResource {
    async fn read_with_password(
        &self,
        ctx: &ResourceContext,
        id: &VCenterId,
        prior_password: &str,
    ) -> Result<Option<Value>, ProviderError> {
        match read_or_gone::<VCenter>(ctx, id, API_VERSION).await? {
            Some(api) => encode(&VCenterModel::flatten(id, api, prior_password)).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl Resource for VCenterResource {
    fn type_name(&self) -> &'static str {
        "azurerm_connected_vmware_vcenter"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", name_attribute())
            .with_attribute("resource_group_name", resource_group_name_attribute())
            .with_attribute("location", location_attribute())
            .with_attribute("fqdn", Attribute::required_string().with_force_new().not_empty())
            .with_block("extended_location", extended_location_block().with_min_items(1))
            .with_block(
                "credential",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute("username", Attribute::required_string().not_empty())
                        .with_attribute(
                            "password",
                            Attribute::required_string().not_empty().sensitive(),
                        ),
                )
                .with_force_new(),
            )
            .with_attribute("kind", Attribute::optional_string().with_force_new())
            .with_attribute(
                "port",
                Attribute::optional_int64()
                    .with_force_new()
                    .with_validator(Validator::PortNumber),
            )
            .with_attribute("tags", Attribute::tags())
    }

    fn validate_id(&self, id: &str) -> Result<(), ProviderError> {
        VCenterId::validate(id)
    }

    async fn create(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let model: VCenterModel = decode(config)?;
        let id = VCenterId::new(&ctx.subscription_id, &model.resource_group_name, &model.name);

        check_requires_import(ctx, &id, API_VERSION).await?;

        let _: Value = ctx
            .client
            .put(&id.to_string(), API_VERSION, &model.expand())
            .await
            .with_context(|| format!("creating {id}"))?;
        info!(id = %id, "Created vCenter");

        let password = model.credential.first().map(|c| c.password.as_str()).unwrap_or_default();
        self.read_with_password(ctx, &id, password)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after creation")))
    }

    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let id = VCenterId::parse(state_id(&state)?)?;
        let prior: VCenterModel = decode(state)?;
        let password = prior.credential.first().map(|c| c.password.as_str()).unwrap_or_default();
        self.read_with_password(ctx, &id, password).await
    }

    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: VCenterModel = decode(prior)?;
        let planned: VCenterModel = decode(planned)?;
        let id = VCenterId::parse(&prior.id)?;

        if prior.tags != planned.tags {
            let _: Value = ctx
                .client
                .patch(&id.to_string(), API_VERSION, &TagsPatch { tags: &planned.tags })
                .await
                .with_context(|| format!("updating {id}"))?;
            info!(id = %id, "Updated vCenter tags");
        }

        let password = planned.credential.first().map(|c| c.password.as_str()).unwrap_or_default();
        self.read_with_password(ctx, &id, password)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after update")))
    }

    async fn delete(&self, ctx: &ResourceContext, state: Value) -> Result<(), ProviderError> {
        let id = VCenterId::parse(state_id(&state)?)?;
        info!(id = %id, "Deleting vCenter");
        ctx.client
            .delete(&id.to_string(), API_VERSION)
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
            "name": "vc1",
            "resource_group_name": "rg",
            "location": "eastus",
            "fqdn": "vcenter.contoso.local",
            "extended_location": [{"name": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.ExtendedLocation/customLocations/cl", "type": "CustomLocation"}],
            "credential": [{"username": "administrator@vsphere.local", "password": "P@ssw0rd!"}],
            "port": null,
            "tags": {}
        })
    }

    #[test]
    fn test_port_is_omitted_when_zero() {
        let model: VCenterModel = decode(config()).unwrap();
        let body = serde_json::to_value(model.expand()).unwrap();
        assert!(body["properties"].get("port").is_none());
        assert_eq!(body["properties"]["credentials"]["password"], "P@ssw0rd!");

        let mut with_port = config();
        with_port["port"] = json!(8443);
        let model: VCenterModel = decode(with_port).unwrap();
        assert_eq!(serde_json::to_value(model.expand()).unwrap()["properties"]["port"], 8443);
    }

    #[test]
    fn test_schema_rejects_bad_port_and_missing_location_block() {
        let schema = VCenterResource.schema();
        let mut bad = config();
        bad["port"] = json!(70000);
        bad["extended_location"] = json!([]);
        let diags = validate(&schema, &bad);
        assert!(diags.iter().any(|d| d.attribute.as_deref() == Some("port")));
        assert!(diags.iter().any(|d| d.attribute.as_deref() == Some("extended_location")));
    }

    #[tokio::test]
    async fn test_password_is_kept_from_state() {
        let arm = FakeArm::start().await;
        let ctx = arm.context();
        let id = VCenterId::new(SUBSCRIPTION_ID, "rg", "vc1").to_string();

        let state = VCenterResource.create(&ctx, config()).await.unwrap();
        assert_eq!(state["id"], id);

        // The service does not echo secrets back.
        let mut stored = arm.get(&id).unwrap();
        stored["properties"]["credentials"] = json!({"username": "administrator@vsphere.local"});
        arm.insert(&id, stored);

        let refreshed = VCenterResource.read(&ctx, state).await.unwrap().unwrap();
        assert_eq!(refreshed["credential"][0]["password"], "P@ssw0rd!");
        assert_eq!(refreshed["fqdn"], "vcenter.contoso.local");

        let imported = VCenterResource.read(&ctx, json!({"id": id})).await.unwrap().unwrap();
        assert_eq!(imported["credential"][0]["password"], "");
        assert_eq!(imported["name"], "vc1");
    }

    #[tokio::test]
    async fn test_delete_of_missing_vcenter_succeeds() {
        let arm = FakeArm::start().await;
        let id = VCenterId::new(SUBSCRIPTION_ID, "rg", "gone").to_string();
        VCenterResource
            .delete(&arm.context(), json!({"id": id}))
            .await
            .unwrap();
    }
}
