//! `azurerm_dynatrace_single_sign_on`
//!
//! SSO configurations cannot be deleted. Delete resets the configuration
//! by writing an empty one over it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::API_VERSION;
use crate::error::{ProviderError, ResultExt};
use crate::resourceids::SingleSignOnConfigurationId;
use crate::resources::common::{
    check_requires_import, decode, encode, name_attribute, read_or_gone,
    resource_group_name_attribute, state_id,
};
use crate::resources::{Resource, ResourceContext};
use crate::schema::{Attribute, Schema};

const SINGLE_SIGN_ON_STATES: &[&str] = &["Disable", "Enable", "Existing", "Initial"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SingleSignOnModel {
    id: String,
    name: String,
    resource_group_name: String,
    monitor_name: String,
    aad_domains: Vec<String>,
    enterprise_app_id: String,
    single_sign_on_state: String,
    single_sign_on_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SingleSignOnResourceBody {
    #[serde(default)]
    properties: SingleSignOnProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SingleSignOnProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aad_domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enterprise_app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    single_sign_on_state: Option<String>,
    #[serde(rename = "singleSignOnUrl", default, skip_serializing_if = "Option::is_none")]
    single_sign_on_url: Option<String>,
    #[serde(default, skip_serializing)]
    provisioning_state: Option<String>,
}

impl SingleSignOnModel {
    fn expand(&self) -> SingleSignOnResourceBody {
        SingleSignOnResourceBody {
            properties: SingleSignOnProperties {
                aad_domains: Some(self.aad_domains.clone()),
                enterprise_app_id: Some(self.enterprise_app_id.clone()),
                single_sign_on_state: Some(self.single_sign_on_state.clone()),
                single_sign_on_url: Some(self.single_sign_on_url.clone()),
                provisioning_state: None,
            },
        }
    }

    fn flatten(id: &SingleSignOnConfigurationId, api: SingleSignOnResourceBody) -> Self {
        let props = api.properties;
        Self {
            id: id.to_string(),
            name: id.single_sign_on_configuration_name.clone(),
            resource_group_name: id.resource_group_name.clone(),
            monitor_name: id.monitor_name.clone(),
            aad_domains: props.aad_domains.unwrap_or_default(),
            enterprise_app_id: props.enterprise_app_id.unwrap_or_default(),
            single_sign_on_state: props.single_sign_on_state.unwrap_or_default(),
            single_sign_on_url: props.single_sign_on_url.unwrap_or_default(),
        }
    }

    /// Overwrite the members of `existing` that differ between `prior`
    /// and `self`.
    fn apply_changes(&self, prior: &Self, existing: &mut SingleSignOnProperties) {
        if self.aad_domains != prior.aad_domains {
            existing.aad_domains = Some(self.aad_domains.clone());
        }
        if self.enterprise_app_id != prior.enterprise_app_id {
            existing.enterprise_app_id = Some(self.enterprise_app_id.clone());
        }
        if self.single_sign_on_state != prior.single_sign_on_state {
            existing.single_sign_on_state = Some(self.single_sign_on_state.clone());
        }
        if self.single_sign_on_url != prior.single_sign_on_url {
            existing.single_sign_on_url = Some(self.single_sign_on_url.clone());
        }
    }
}

pub(crate) struct SingleSignOnResource;

#[async_trait::async_trait]
impl Resource for SingleSignOnResource {
    fn type_name(&self) -> &'static str {
        "azurerm_dynatrace_single_sign_on"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", name_attribute())
            .with_attribute("resource_group_name", resource_group_name_attribute())
            .with_attribute("monitor_name", name_attribute())
            .with_attribute("aad_domains", Attribute::string_list().required())
            .with_attribute("enterprise_app_id", Attribute::required_string().not_empty())
            .with_attribute(
                "single_sign_on_state",
                Attribute::required_string().one_of(SINGLE_SIGN_ON_STATES),
            )
            .with_attribute("single_sign_on_url", Attribute::required_string().not_empty())
    }

    fn validate_id(&self, id: &str) -> Result<(), ProviderError> {
        SingleSignOnConfigurationId::validate(id)
    }

    async fn create(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let model: SingleSignOnModel = decode(config)?;
        let id = SingleSignOnConfigurationId::new(
            &ctx.subscription_id,
            &model.resource_group_name,
            &model.monitor_name,
            &model.name,
        );

        check_requires_import(ctx, &id, API_VERSION).await?;

        let _: Value = ctx
            .client
            .put_and_wait(&id.to_string(), API_VERSION, &model.expand())
            .await
            .with_context(|| format!("creating {id}"))?;
        info!(id = %id, "Created single sign-on configuration");

        self.read(ctx, json!({ "id": id.to_string() }))
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after creation")))
    }

    async fn read(
        &self,
        ctx: &ResourceContext,
        state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let id = SingleSignOnConfigurationId::parse(state_id(&state)?)?;
        match read_or_gone::<SingleSignOnResourceBody>(ctx, &id, API_VERSION).await? {
            Some(api) => encode(&SingleSignOnModel::flatten(&id, api)).map(Some),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        ctx: &ResourceContext,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: SingleSignOnModel = decode(prior)?;
        let planned: SingleSignOnModel = decode(planned)?;
        let id = SingleSignOnConfigurationId::parse(&prior.id)?;
        let id_str = id.to_string();

        let mut existing: SingleSignOnResourceBody = ctx
            .client
            .get(&id_str, API_VERSION)
            .await
            .with_context(|| format!("retrieving {id}"))?;
        planned.apply_changes(&prior, &mut existing.properties);

        let _: Value = ctx
            .client
            .put(&id_str, API_VERSION, &existing)
            .await
            .with_context(|| format!("updating {id}"))?;
        info!(id = %id, "Updated single sign-on configuration");

        self.read(ctx, json!({ "id": id_str }))
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("{id} was not found after update")))
    }

    async fn delete(&self, ctx: &ResourceContext, state: Value) -> Result<(), ProviderError> {
        let id = SingleSignOnConfigurationId::parse(state_id(&state)?)?;
        info!(id = %id, "Resetting single sign-on configuration");
        let _: Value = ctx
            .client
            .put(&id.to_string(), API_VERSION, &SingleSignOnResourceBody::default())
            .await
            .with_context(|| format!("deleting {id}"))?;
        Ok(())
    }
}
