//! `azurerm_spring_cloud_connection`
//!
//! Same lookup as the app service data source, scoped to a Spring Cloud
//! deployment. The authentication block is published as `auth_info`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::models::{AuthenticationModel, Connection, SecretStoreModel};
use super::{authentication_block, read_connection, secret_store_block};
use crate::error::ProviderError;
use crate::resourceids::ScopedLinkerId;
use crate::resources::common::{decode, encode};
use crate::resources::{DataSource, ResourceContext};
use crate::schema::{Attribute, Schema, Validator};

const SPRING_DEPLOYMENT: &str = "Microsoft.AppPlatform/Spring/apps/deployments";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpringCloudConnectionConfig {
    name: String,
    spring_cloud_id: String,
}

#[derive(Debug, Serialize)]
struct SpringCloudConnectionModel {
    id: String,
    name: String,
    spring_cloud_id: String,
    target_resource_id: String,
    client_type: String,
    vnet_solution: String,
    secret_store: Vec<SecretStoreModel>,
    auth_info: Vec<AuthenticationModel>,
}

impl SpringCloudConnectionModel {
    fn new(id: &ScopedLinkerId, connection: Connection) -> Self {
        Self {
            id: id.to_string(),
            name: id.linker_name.clone(),
            spring_cloud_id: id.resource_uri.clone(),
            target_resource_id: connection.target_resource_id,
            client_type: connection.client_type,
            vnet_solution: connection.vnet_solution,
            secret_store: connection.secret_store,
            auth_info: connection.authentication,
        }
    }
}

pub(crate) struct SpringCloudConnectionDataSource;

#[async_trait::async_trait]
impl DataSource for SpringCloudConnectionDataSource {
    fn type_name(&self) -> &'static str {
        "azurerm_spring_cloud_connection"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string().not_empty())
            .with_attribute(
                "spring_cloud_id",
                Attribute::required_string()
                    .with_validator(Validator::ResourceId(SPRING_DEPLOYMENT.to_string())),
            )
            .with_attribute("target_resource_id", Attribute::computed_string())
            .with_attribute("client_type", Attribute::computed_string())
            .with_attribute("vnet_solution", Attribute::computed_string())
            .with_block("secret_store", secret_store_block())
            .with_block("auth_info", authentication_block())
    }

    async fn read(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let config: SpringCloudConnectionConfig = decode(config)?;
        let id = ScopedLinkerId::new(&config.spring_cloud_id, &config.name);

        let connection = read_connection(ctx, &id, || {
            format!(
                "Spring Cloud Connection {:?} was not found in Spring Cloud Deployment {:?}",
                config.name, config.spring_cloud_id
            )
        })
        .await?;
        info!(id = %id, "Read spring cloud connection");

        encode(&SpringCloudConnectionModel::new(&id, connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_arm::{FakeArm, SUBSCRIPTION_ID};
    use serde_json::json;

    fn deployment_id() -> String {
        format!(
            "/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/rg/providers/Microsoft.AppPlatform/Spring/spring1/apps/app1/deployments/default"
        )
    }

    #[tokio::test]
    async fn test_read_user_assigned_identity() {
        let arm = FakeArm::start().await;
        let id = ScopedLinkerId::new(deployment_id(), "storage");
        arm.insert(
            &id.to_string(),
            json!({
                "properties": {
                    "authInfo": {
                        "authType": "userAssignedIdentity",
                        "clientId": "2f3c4b5a-6d7e-4f80-9a1b-2c3d4e5f6a7b",
                        "subscriptionId": SUBSCRIPTION_ID
                    },
                    "targetService": {"type": "AzureResource", "id": "/subscriptions/x/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/sa/blobServices/default"},
                    "secretStore": {"keyVaultId": "/subscriptions/x/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv"}
                }
            }),
        );

        let state = SpringCloudConnectionDataSource
            .read(&arm.context(), json!({"name": "storage", "spring_cloud_id": deployment_id()}))
            .await
            .unwrap();
        assert_eq!(state["spring_cloud_id"], deployment_id());
        assert_eq!(state["auth_info"][0]["type"], "userAssignedIdentity");
        assert_eq!(state["auth_info"][0]["subscription_id"], SUBSCRIPTION_ID);
        assert!(state.get("authentication").is_none());
        assert_eq!(
            state["secret_store"][0]["key_vault_id"],
            "/subscriptions/x/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv"
        );
    }

    #[tokio::test]
    async fn test_read_missing_connection() {
        let arm = FakeArm::start().await;
        let err = SpringCloudConnectionDataSource
            .read(&arm.context(), json!({"name": "storage", "spring_cloud_id": deployment_id()}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert!(err.message().starts_with("Spring Cloud Connection \"storage\" was not found"));
    }
}
