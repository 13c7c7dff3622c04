//! Service Connector (Microsoft.ServiceLinker) lookups.
//!
//! Linkers hang off an arbitrary compute resource. Both data sources here
//! read one linker by `{scope}/providers/Microsoft.ServiceLinker/linkers/{name}`
//! and report where it points and how it authenticates.

mod app_service_connection;
mod models;
mod spring_cloud_connection;

use tracing::debug;

use crate::error::ProviderError;
use crate::resourceids::ScopedLinkerId;
use crate::resources::{DataSource, ResourceContext, ServiceRegistration};
use crate::schema::{Attribute, Block, NestedBlock};

use app_service_connection::AppServiceConnectionDataSource;
use models::{Connection, LinkerResource};
use spring_cloud_connection::SpringCloudConnectionDataSource;

pub(crate) const API_VERSION: &str = "2024-04-01";

pub(crate) struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "ServiceConnector"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Service Connector"]
    }

    fn data_sources(&self) -> Vec<Box<dyn DataSource>> {
        vec![
            Box::new(AppServiceConnectionDataSource),
            Box::new(SpringCloudConnectionDataSource),
        ]
    }
}

/// GET a linker. A 404 becomes `NotFound(not_found())`.
async fn read_connection(
    ctx: &ResourceContext,
    id: &ScopedLinkerId,
    not_found: impl FnOnce() -> String,
) -> Result<Connection, ProviderError> {
    let linker: LinkerResource = match ctx.client.get(&id.to_string(), API_VERSION).await {
        Ok(linker) => linker,
        Err(err) if err.is_not_found() => return Err(ProviderError::NotFound(not_found())),
        Err(err) => return Err(ProviderError::from(err).context(format!("retrieving {id}"))),
    };
    debug!(id = %id, "Retrieved service connector");

    Connection::flatten(linker.properties)
        .ok_or_else(|| ProviderError::Sdk(format!("retrieving {id}: properties were nil")))
}

/// The computed `authentication` block.
fn authentication_block() -> NestedBlock {
    NestedBlock::list(
        Block::new()
            .with_attribute("type", Attribute::computed_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("secret", Attribute::computed_string().sensitive())
            .with_attribute("client_id", Attribute::computed_string())
            .with_attribute("subscription_id", Attribute::computed_string())
            .with_attribute("principal_id", Attribute::computed_string())
            .with_attribute("certificate", Attribute::computed_string().sensitive()),
    )
}

fn secret_store_block() -> NestedBlock {
    NestedBlock::list(Block::new().with_attribute("key_vault_id", Attribute::computed_string()))
}
