//! `azurerm_app_service_connection`

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

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppServiceConnectionConfig {
    name: String,
    app_service_id: String,
}

#[derive(Debug, Serialize)]
struct AppServiceConnectionModel {
    id: String,
    name: String,
    app_service_id: String,
    target_resource_id: String,
    client_type: String,
    vnet_solution: String,
    secret_store: Vec<SecretStoreModel>,
    authentication: Vec<AuthenticationModel>,
}

impl AppServiceConnectionModel {
    fn new(id: &ScopedLinkerId, connection: Connection) -> Self {
        Self {
            id: id.to_string(),
            name: id.linker_name.clone(),
            app_service_id: id.resource_uri.clone(),
            target_resource_id: connection.target_resource_id,
            client_type: connection.client_type,
            vnet_solution: connection.vnet_solution,
            secret_store: connection.secret_store,
            authentication: connection.authentication,
        }
    }
}

pub(crate) struct AppServiceConnectionDataSource;

#[async_trait::async_trait]
impl DataSource for AppServiceConnectionDataSource {
    fn type_name(&self) -> &'static str {
        "azurerm_app_service_connection"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string().not_empty())
            .with_attribute(
                "app_service_id",
                Attribute::required_string()
                    .with_validator(Validator::ResourceId("Microsoft.Web/sites".to_string())),
            )
            .with_attribute("target_resource_id", Attribute::computed_string())
            .with_attribute("client_type", Attribute::computed_string())
            .with_attribute("vnet_solution", Attribute::computed_string())
            .with_block("secret_store", secret_store_block())
            .with_block("authentication", authentication_block())
    }

    async fn read(&self, ctx: &ResourceContext, config: Value) -> Result<Value, ProviderError> {
        let config: AppServiceConnectionConfig = decode(config)?;
        let id = ScopedLinkerId::new(&config.app_service_id, &config.name);

        let connection = read_connection(ctx, &id, || {
            format!(
                "App Service Connection {:?} was not found in App Service {:?}",
                config.name, config.app_service_id
            )
        })
        .await?;
        info!(id = %id, "Read app service connection");

        encode(&AppServiceConnectionModel::new(&id, connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_arm::{FakeArm, SUBSCRIPTION_ID};
    use crate::validation::validate;
    use serde_json::json;

    fn app_service_id() -> String {
        format!("/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/rg/providers/Microsoft.Web/sites/app1")
    }

    #[test]
    fn test_schema_requires_a_web_app_id() {
        let schema = AppServiceConnectionDataSource.schema();
        let config = json!({"name": "conn1", "app_service_id": app_service_id()});
        assert!(validate(&schema, &config).is_empty());

        let spring = format!(
            "/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/rg/providers/Microsoft.AppPlatform/Spring/s1/apps/a1/deployments/d1"
        );
        let diags = validate(&schema, &json!({"name": "conn1", "app_service_id": spring}));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("app_service_id"));
    }

    #[tokio::test]
    async fn test_read() {
        let arm = FakeArm::start().await;
        let ctx = arm.context();
        let id = ScopedLinkerId::new(app_service_id(), "conn1").to_string();
        arm.insert(
            &id,
            json!({
                "properties": {
                    "authInfo": {"authType": "systemAssignedIdentity"},
                    "targetService": {"type": "AzureResource", "id": "/subscriptions/x/resourceGroups/rg/providers/Microsoft.DocumentDB/databaseAccounts/cosmos"},
                    "clientType": "dotnet",
                    "vNetSolution": {"type": "serviceEndpoint"}
                }
            }),
        );

        let state = AppServiceConnectionDataSource
            .read(&ctx, json!({"name": "conn1", "app_service_id": app_service_id()}))
            .await
            .unwrap();
        assert_eq!(state["id"], id);
        assert_eq!(state["client_type"], "dotnet");
        assert_eq!(state["vnet_solution"], "serviceEndpoint");
        assert_eq!(state["authentication"][0]["type"], "systemAssignedIdentity");
        assert_eq!(state["secret_store"], json!([]));
    }

    #[tokio::test]
    async fn test_read_missing_connection() {
        let arm = FakeArm::start().await;
        let err = AppServiceConnectionDataSource
            .read(&arm.context(), json!({"name": "conn1", "app_service_id": app_service_id()}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert_eq!(
            err.message(),
            format!(
                "App Service Connection \"conn1\" was not found in App Service \"{}\"",
                app_service_id()
            )
        );
    }

    #[tokio::test]
    async fn test_read_without_auth_info() {
        let arm = FakeArm::start().await;
        let id = ScopedLinkerId::new(app_service_id(), "conn1");
        arm.insert(
            &id.to_string(),
            json!({"properties": {"targetService": {"type": "AzureResource", "id": "/t"}}}),
        );
        let err = AppServiceConnectionDataSource
            .read(&arm.context(), json!({"name": "conn1", "app_service_id": app_service_id()}))
            .await
            .unwrap_err();
        assert_eq!(err.message(), format!("retrieving {id}: properties were nil"));
    }
}
